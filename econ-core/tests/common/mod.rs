//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::rc::Rc;

use econ_core::market::{Exchange, Fill, Order, PriceMakerMarket, PriceTakerMarket, Side};
use econ_core::production::{CobbDouglasProduction, Weight};
use econ_core::{Good, Price, Quantity};

pub const MONEY: Good = Good::new(0, "money");
pub const LAND: Good = Good::new(1, "land");
pub const MAN_HOUR: Good = Good::new(2, "man-hour");
pub const POTATO: Good = Good::new(3, "potato");

/// The farm used throughout: `Y = K^0.2 * (L - 14)^0.6`.
pub fn farm_production() -> Rc<CobbDouglasProduction> {
    let production = CobbDouglasProduction::new(
        POTATO,
        1.0,
        vec![Weight::capital(LAND, 0.2), Weight::variable(MAN_HOUR, 0.6)],
    )
    .unwrap()
    .with_fixed_cost(Quantity::new(MAN_HOUR, 14.0))
    .unwrap();
    Rc::new(production)
}

/// Fills a fixed share of every offer at its limit price and every purchase
/// in full at the standing ask.
#[derive(Debug, Clone)]
pub struct ScriptedExchange {
    pub buy_ratio: f64,
    pub sell_ratio: f64,
    pub asks: Vec<(Good, Price)>,
    pub offers: Vec<Order>,
    pub purchases: Vec<Order>,
    /// Every order seen, in submission order.
    pub history: Vec<Order>,
    /// Delivered as-is with the next settlement.
    pub injected: Vec<Fill>,
}

impl ScriptedExchange {
    pub fn new(buy_ratio: f64, sell_ratio: f64) -> Self {
        Self {
            buy_ratio,
            sell_ratio,
            asks: Vec::new(),
            offers: Vec::new(),
            purchases: Vec::new(),
            history: Vec::new(),
            injected: Vec::new(),
        }
    }

    /// Nothing ever trades.
    pub fn dead() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn with_ask(mut self, good: Good, price: Price) -> Self {
        self.asks.push((good, price));
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.injected.push(fill);
        self
    }

    pub fn orders_for(&self, good: Good, side: Side) -> impl Iterator<Item = &Order> {
        self.history
            .iter()
            .filter(move |o| o.good == good && o.side == side)
    }
}

impl PriceMakerMarket for ScriptedExchange {
    fn submit(&mut self, order: Order) {
        self.history.push(order.clone());
        self.offers.push(order);
    }
}

impl PriceTakerMarket for ScriptedExchange {
    fn best_ask(&self, good: Good) -> Option<Price> {
        self.asks
            .iter()
            .filter(|(g, _)| *g == good)
            .map(|(_, p)| *p)
            .min_by(|a, b| a.total_cmp(b))
    }

    fn submit_purchase(&mut self, order: Order) {
        self.history.push(order.clone());
        self.purchases.push(order);
    }
}

impl Exchange for ScriptedExchange {
    fn settle(&mut self) -> Vec<Fill> {
        let (buy_ratio, sell_ratio) = (self.buy_ratio, self.sell_ratio);
        let offers = self.offers.drain(..).filter_map(|order| {
            let ratio = match order.side {
                Side::Buy => buy_ratio,
                Side::Sell => sell_ratio,
            };
            let fill = order.fill(order.quantity * ratio);
            (fill.quantity > 0.0).then_some(fill)
        });
        let mut fills: Vec<Fill> = offers.collect();
        fills.extend(self.purchases.drain(..).map(|order| order.fill(order.quantity)));
        fills.append(&mut self.injected);
        fills
    }
}
