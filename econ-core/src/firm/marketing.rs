//! Offers, fill bookkeeping and price learning for the firm's two traded goods.

use serde::Serialize;

use crate::goods::{Good, Inventory};
use crate::market::{Fill, MarketSnapshot, Order, PriceMakerMarket, Side};
use crate::types::{AgentId, Price};

use super::{Financials, PriceBelief};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketingDepartment {
    input: PriceBelief,
    output: PriceBelief,
}

impl MarketingDepartment {
    /// Seed beliefs from the published snapshot, falling back to the given
    /// prices for goods the market has never priced.
    pub fn new(
        input: Good,
        output: Good,
        market: &MarketSnapshot,
        fallback_input_price: Price,
        fallback_output_price: Price,
    ) -> Self {
        let input_price = market.price_belief(input).unwrap_or(fallback_input_price);
        let output_price = market.price_belief(output).unwrap_or(fallback_output_price);
        Self {
            input: PriceBelief::new(input, Side::Buy, input_price),
            output: PriceBelief::new(output, Side::Sell, output_price),
        }
    }

    pub fn input(&self) -> &PriceBelief {
        &self.input
    }

    pub fn output(&self) -> &PriceBelief {
        &self.output
    }

    pub fn price_belief(&self, good: Good) -> Option<Price> {
        if good == self.input.good() {
            Some(self.input.price())
        } else if good == self.output.good() {
            Some(self.output.price())
        } else {
            None
        }
    }

    /// Day boundary: yesterday's proposals take effect.
    pub fn begin_day(&mut self) {
        self.input.begin_day();
        self.output.begin_day();
    }

    /// Bid for the input with `budget` and ask for the whole output stock.
    ///
    /// The bid never commits more than the budget or the money held, even
    /// after rounding. Stocks are left alone; they change when fills arrive.
    pub fn create_offers(
        &mut self,
        market: &mut dyn PriceMakerMarket,
        firm: AgentId,
        inventory: &Inventory,
        budget: f64,
    ) -> Vec<Order> {
        let mut orders = Vec::with_capacity(2);

        let spend = budget.min(inventory.money().amount()).max(0.0);
        let bid_quantity = Order::affordable_quantity(spend, self.input.price());
        if bid_quantity > 0.0 && bid_quantity.is_finite() {
            orders.push(Order::buy(firm, self.input.good(), bid_quantity, self.input.price()));
            self.input.record_offer(bid_quantity);
        }

        let supply = inventory.amount(self.output.good());
        if supply > 0.0 {
            orders.push(Order::sell(firm, self.output.good(), supply, self.output.price()));
            self.output.record_offer(supply);
        }

        for order in &orders {
            market.submit(order.clone());
        }
        orders
    }

    /// Count a settled fill against today's offers. Fills for other goods are ignored.
    pub fn record_fill(&mut self, fill: &Fill) {
        match fill.side {
            Side::Buy if fill.good == self.input.good() => self.input.record_fill(fill.quantity),
            Side::Sell if fill.good == self.output.good() => self.output.record_fill(fill.quantity),
            _ => {}
        }
    }

    pub fn adapt_prices(&mut self) {
        self.input.adapt();
        self.output.adapt();
    }

    pub fn financials(&self, inventory: &Inventory) -> Financials {
        let revenue = inventory.amount(self.output.good()) * self.output.price();
        let costs = self.input.filled() * self.input.price();
        Financials::new(revenue, costs, inventory.money().amount())
    }

    /// Financials valuing the output offered today rather than what is left
    /// of it, so a firm that sold out still sees the revenue it earned.
    pub fn offered_financials(&self, inventory: &Inventory) -> Financials {
        let revenue = self.output.offered() * self.output.price();
        let costs = self.input.filled() * self.input.price();
        Financials::new(revenue, costs, inventory.money().amount())
    }
}
