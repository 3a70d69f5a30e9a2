use serde::Serialize;

use crate::goods::Good;
use crate::types::{AgentId, Price};

// === ORDERS & FILLS ===

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Order {
    pub agent: AgentId,
    pub good: Good,
    pub side: Side,
    pub quantity: f64,
    pub limit_price: Price,
}

impl Order {
    pub fn buy(agent: AgentId, good: Good, quantity: f64, limit_price: Price) -> Self {
        Self {
            agent,
            good,
            side: Side::Buy,
            quantity,
            limit_price,
        }
    }

    pub fn sell(agent: AgentId, good: Good, quantity: f64, limit_price: Price) -> Self {
        Self {
            agent,
            good,
            side: Side::Sell,
            quantity,
            limit_price,
        }
    }

    /// Largest quantity whose value at `price` stays within `budget`.
    ///
    /// `budget / price` can round up, so the quotient is walked down until
    /// paying for it no longer exceeds the budget.
    pub fn affordable_quantity(budget: f64, price: Price) -> f64 {
        if !(budget > 0.0 && price > 0.0 && price.is_finite()) {
            return 0.0;
        }
        let mut quantity = budget / price;
        while quantity > 0.0 && quantity * price > budget {
            quantity -= quantity * f64::EPSILON;
        }
        quantity
    }

    /// Money committed (buy) or asked for (sell) if the order fills completely.
    pub fn value(&self) -> f64 {
        self.quantity * self.limit_price
    }

    /// A fill of `quantity` units at the order's limit price, capped at the order size.
    pub fn fill(&self, quantity: f64) -> Fill {
        Fill {
            agent: self.agent,
            good: self.good,
            side: self.side,
            quantity: quantity.clamp(0.0, self.quantity),
            price: self.limit_price,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Buy,
    Sell,
}

/// Settlement notice for one side of a trade, addressed to the trading agent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Fill {
    pub agent: AgentId,
    pub good: Good,
    pub side: Side,
    pub quantity: f64,
    pub price: Price,
}

impl Fill {
    pub fn value(&self) -> f64 {
        self.quantity * self.price
    }
}
