//! Capacity investment.
//!
//! Land earns its factor share of revenue. The firm buys more of it while the
//! marginal return per unit of money beats the discount rate, aiming for the
//! holding at which the two are equal.

use std::rc::Rc;

use serde::Serialize;

use crate::goods::Inventory;
use crate::market::{Order, PriceTakerMarket};
use crate::production::{ProductionFunction, Weight};
use crate::types::{AgentId, Price};

use super::Financials;

#[derive(Debug, Clone)]
pub struct FinanceDepartment {
    production: Rc<dyn ProductionFunction>,
    capacity: Option<Weight>,
    discount_rate: f64,
}

/// What the investment policy saw when it last looked at the market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InvestmentAppraisal {
    pub held: f64,
    pub price: Price,
    pub marginal_return: f64,
    pub target: f64,
}

impl FinanceDepartment {
    pub fn new(production: Rc<dyn ProductionFunction>, discount_rate: f64) -> Self {
        let capacity = production.capital_inputs().first().copied();
        Self {
            production,
            capacity,
            discount_rate,
        }
    }

    pub fn production(&self) -> &dyn ProductionFunction {
        self.production.as_ref()
    }

    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    /// Return per unit of money on the marginal unit of capacity, and the
    /// holding that would bring it down to the discount rate.
    ///
    /// Revenue scales with `held^weight`, so the marginal return is
    /// `weight * revenue / (held * price)`.
    pub fn appraise(&self, inventory: &Inventory, financials: &Financials, price: Price) -> Option<InvestmentAppraisal> {
        let capacity = self.capacity?;
        let held = inventory.amount(capacity.good);
        if held <= 0.0 || price <= 0.0 || financials.revenue <= 0.0 || capacity.weight <= 0.0 {
            return None;
        }
        let c = capacity.weight;
        let marginal_return = c * financials.revenue / (held * price);
        let target = (c * financials.revenue * held.powf(-c) / (self.discount_rate * price)).powf(1.0 / (1.0 - c));
        Some(InvestmentAppraisal {
            held,
            price,
            marginal_return,
            target,
        })
    }

    /// Buy capacity if it pays more than the discount rate.
    ///
    /// Money set aside in `reserve` (tomorrow's input budget) is never spent.
    /// Returns the purchase order submitted, if any.
    pub fn invest(
        &self,
        firm: AgentId,
        inventory: &Inventory,
        financials: &Financials,
        market: &mut dyn PriceTakerMarket,
        reserve: f64,
    ) -> Option<Order> {
        let capacity = self.capacity?;
        let price = market.best_ask(capacity.good)?;
        let appraisal = self.appraise(inventory, financials, price)?;
        if appraisal.marginal_return <= self.discount_rate {
            return None;
        }
        let affordable = Order::affordable_quantity(inventory.money().amount() - reserve, price);
        let quantity = (appraisal.target - appraisal.held).min(affordable);
        if !(quantity > 0.0) {
            return None;
        }
        let order = Order::buy(firm, capacity.good, quantity, price);
        market.submit_purchase(order.clone());
        Some(order)
    }
}
