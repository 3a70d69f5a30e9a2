//! Spending and payout decisions.

use serde::Serialize;

use super::Financials;

pub trait FirmDecisions {
    /// Money to spend on the variable input tomorrow. Never negative.
    fn calc_cogs(&self, financials: &Financials) -> f64;

    /// Money to pay out to the owner today. Never negative.
    fn calc_dividend(&self, financials: &Financials) -> f64;
}

/// Targets input spending at the input's factor share of expected revenue
/// and pays out every unit of cash above that target, up to today's profit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpectedRevenueStrategy {
    input_weight: f64,
}

impl ExpectedRevenueStrategy {
    pub fn new(input_weight: f64) -> Self {
        Self { input_weight }
    }

    pub fn input_weight(&self) -> f64 {
        self.input_weight
    }
}

impl FirmDecisions for ExpectedRevenueStrategy {
    fn calc_cogs(&self, financials: &Financials) -> f64 {
        (financials.revenue * self.input_weight).max(0.0)
    }

    fn calc_dividend(&self, financials: &Financials) -> f64 {
        let excess_cash = financials.cash - self.calc_cogs(financials);
        financials.profits.min(excess_cash).max(0.0)
    }
}
