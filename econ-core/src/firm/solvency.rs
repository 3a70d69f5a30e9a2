//! Stochastic exit after a run of unprofitable days.
//!
//! A firm becomes a liquidation candidate once its streak of days with
//! non-positive profit strictly exceeds the grace period. From then on it
//! draws once per day and exits when the draw falls below the hazard.

use rand::Rng;
use serde::Serialize;

pub const DEFAULT_GRACE_DAYS: u32 = 5;
pub const DEFAULT_EXIT_PROBABILITY: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LossTracker {
    days_without_profit: u32,
    grace_days: u32,
    exit_probability: f64,
}

impl Default for LossTracker {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_DAYS, DEFAULT_EXIT_PROBABILITY)
    }
}

impl LossTracker {
    pub fn new(grace_days: u32, exit_probability: f64) -> Self {
        Self {
            days_without_profit: 0,
            grace_days,
            exit_probability,
        }
    }

    pub fn days_without_profit(&self) -> u32 {
        self.days_without_profit
    }

    /// Update the streak with today's profit. Returns the new streak length.
    pub fn record(&mut self, profits: f64) -> u32 {
        if profits <= 0.0 {
            self.days_without_profit += 1;
        } else {
            self.days_without_profit = 0;
        }
        self.days_without_profit
    }

    /// Whether a draw is due today.
    pub fn at_risk(&self) -> bool {
        self.days_without_profit > self.grace_days
    }

    /// Record today's profit and decide on exit.
    ///
    /// The generator is only touched on days the firm is at risk, so firms in
    /// good standing do not shift the shared draw sequence.
    pub fn check_exit<R: Rng>(&mut self, rng: &mut R, profits: f64) -> bool {
        self.record(profits);
        if !self.at_risk() {
            return false;
        }
        let roll: f64 = rng.random();
        roll < self.exit_probability
    }
}
