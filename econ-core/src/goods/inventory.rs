// Per-agent collection of stocks, one per good

use std::collections::HashMap;

use serde::Serialize;

use crate::error::StockError;

use super::{Good, Stock};

/// All stocks owned by one agent, indexed by good.
///
/// The money stock always exists; other stocks are created on first use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inventory {
    money: Stock,
    goods: HashMap<Good, Stock>,
}

impl Inventory {
    pub fn new(money: Good) -> Self {
        Self {
            money: Stock::empty(money),
            goods: HashMap::new(),
        }
    }

    /// Build an inventory by absorbing the given stocks.
    pub fn with_stocks(
        money: Good,
        stocks: impl IntoIterator<Item = Stock>,
    ) -> Result<Self, StockError> {
        let mut inventory = Self::new(money);
        for mut stock in stocks {
            inventory.absorb(&mut stock)?;
        }
        Ok(inventory)
    }

    pub fn money_good(&self) -> Good {
        self.money.good()
    }

    pub fn money(&self) -> &Stock {
        &self.money
    }

    pub fn money_mut(&mut self) -> &mut Stock {
        &mut self.money
    }

    pub fn stock(&self, good: Good) -> Option<&Stock> {
        if good == self.money.good() {
            Some(&self.money)
        } else {
            self.goods.get(&good)
        }
    }

    /// Amount held of `good`, zero if there is no such stock.
    pub fn amount(&self, good: Good) -> f64 {
        self.stock(good).map(Stock::amount).unwrap_or(0.0)
    }

    pub fn stock_mut(&mut self, good: Good) -> &mut Stock {
        if good == self.money.good() {
            &mut self.money
        } else {
            self.goods.entry(good).or_insert_with(|| Stock::empty(good))
        }
    }

    /// Merge `stock` into the matching stock of this inventory, emptying it.
    pub fn absorb(&mut self, stock: &mut Stock) -> Result<(), StockError> {
        self.stock_mut(stock.good()).absorb(stock)
    }

    /// Merge every stock of `other` into this inventory, leaving `other` empty.
    pub fn absorb_all(&mut self, other: &mut Inventory) -> Result<(), StockError> {
        self.absorb(&mut other.money)?;
        for stock in other.goods.values_mut() {
            self.absorb(stock)?;
        }
        Ok(())
    }

    /// Move all holdings out, leaving an empty inventory with the same money good.
    pub fn take_all(&mut self) -> Inventory {
        let money = self.money.good();
        std::mem::replace(self, Inventory::new(money))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stock> {
        std::iter::once(&self.money).chain(self.goods.values())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(Stock::is_empty)
    }
}
