//! Narrow interfaces to the external market.
//!
//! Matching and clearing live outside this crate. Firms only submit orders
//! and later receive [`Fill`]s through their settlement hook.

pub mod orders;
pub mod stats;

pub use orders::*;
pub use stats::*;

use crate::goods::Good;
use crate::types::Price;

/// Market where agents post their own prices (the daily offer round).
pub trait PriceMakerMarket {
    fn submit(&mut self, order: Order);
}

/// Market where agents accept prices already on the book (investment purchases).
pub trait PriceTakerMarket {
    /// Lowest ask currently available for `good`, if anyone is selling.
    fn best_ask(&self, good: Good) -> Option<Price>;

    fn submit_purchase(&mut self, order: Order);
}

/// A clearing engine: collects both kinds of orders and settles them into fills.
pub trait Exchange: PriceMakerMarket + PriceTakerMarket {
    /// Match everything submitted since the last call. Each fill is addressed to
    /// exactly one agent; a trade between two agents yields two fills.
    fn settle(&mut self) -> Vec<Fill>;
}

/// Records orders without matching them.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    pub offers: Vec<Order>,
    pub purchases: Vec<Order>,
    pub asks: Vec<(Good, Price)>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise a standing ask for price-taking buyers.
    pub fn with_ask(mut self, good: Good, price: Price) -> Self {
        self.asks.push((good, price));
        self
    }

    pub fn offers_for(&self, good: Good) -> impl Iterator<Item = &Order> {
        self.offers.iter().filter(move |o| o.good == good)
    }
}

impl PriceMakerMarket for OrderBook {
    fn submit(&mut self, order: Order) {
        self.offers.push(order);
    }
}

impl PriceTakerMarket for OrderBook {
    fn best_ask(&self, good: Good) -> Option<Price> {
        self.asks
            .iter()
            .filter(|(g, _)| *g == good)
            .map(|(_, p)| *p)
            .min_by(|a, b| a.total_cmp(b))
    }

    fn submit_purchase(&mut self, order: Order) {
        self.purchases.push(order);
    }
}
