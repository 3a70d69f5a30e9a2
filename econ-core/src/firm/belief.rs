//! Adaptive price belief for one side of one good.
//!
//! The belief moves by a multiplicative step after each trading day:
//! - Sell side: sold out -> raise; unsold residual -> lower
//! - Buy side: unfilled residual -> raise; fully filled -> lower
//!
//! The step grows while the direction repeats and halves when it reverses,
//! which lets the belief cross large gaps quickly and then settle.
//!
//! Adaptation never edits the committed price. It writes a proposal that
//! becomes effective at the next day boundary ([`PriceBelief::begin_day`]).

use serde::Serialize;

use crate::goods::Good;
use crate::market::Side;
use crate::types::Price;

pub const INITIAL_STEP: f64 = 0.05;
pub const MIN_STEP: f64 = 0.001;
pub const MAX_STEP: f64 = 0.3;
const STEP_GROWTH: f64 = 2.0;

/// Relative slack below which an order counts as completely filled.
const FILL_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct Proposal {
    price: Price,
    step: f64,
    direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBelief {
    good: Good,
    side: Side,
    price: Price,
    step: f64,
    last_direction: Option<Direction>,
    proposal: Option<Proposal>,
    offered: f64,
    filled: f64,
}

impl PriceBelief {
    pub fn new(good: Good, side: Side, price: Price) -> Self {
        Self {
            good,
            side,
            price,
            step: INITIAL_STEP,
            last_direction: None,
            proposal: None,
            offered: 0.0,
            filled: 0.0,
        }
    }

    pub fn good(&self) -> Good {
        self.good
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Price in effect today.
    pub fn price(&self) -> Price {
        self.price
    }

    /// Price that will take effect tomorrow, if today's outcome moved it.
    pub fn proposed_price(&self) -> Option<Price> {
        self.proposal.map(|p| p.price)
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn offered(&self) -> f64 {
        self.offered
    }

    pub fn filled(&self) -> f64 {
        self.filled
    }

    /// Day boundary: commit yesterday's proposal and clear the trading record.
    pub fn begin_day(&mut self) {
        if let Some(proposal) = self.proposal.take() {
            self.price = proposal.price;
            self.step = proposal.step;
            self.last_direction = Some(proposal.direction);
        }
        self.offered = 0.0;
        self.filled = 0.0;
    }

    pub fn record_offer(&mut self, quantity: f64) {
        self.offered += quantity;
    }

    pub fn record_fill(&mut self, quantity: f64) {
        self.filled += quantity;
    }

    /// Propose tomorrow's price from today's trading record.
    ///
    /// Reads only committed state, so calling it again on the same day yields
    /// the same proposal. Without an offer today there is nothing to learn from.
    pub fn adapt(&mut self) {
        if self.offered <= 0.0 {
            self.proposal = None;
            return;
        }
        let complete = self.filled >= self.offered * (1.0 - FILL_TOLERANCE);
        let direction = match (self.side, complete) {
            (Side::Sell, true) | (Side::Buy, false) => Direction::Up,
            (Side::Sell, false) | (Side::Buy, true) => Direction::Down,
        };
        let step = match self.last_direction {
            Some(last) if last == direction => (self.step * STEP_GROWTH).min(MAX_STEP),
            Some(_) => (self.step / 2.0).max(MIN_STEP),
            None => self.step,
        };
        let price = match direction {
            Direction::Up => self.price * (1.0 + step),
            Direction::Down => self.price / (1.0 + step),
        };
        self.proposal = Some(Proposal {
            price,
            step,
            direction,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POTATO: Good = Good::new(3, "potato");
    const MAN_HOUR: Good = Good::new(2, "man-hour");

    fn trade(belief: &mut PriceBelief, offered: f64, filled: f64) {
        belief.begin_day();
        belief.record_offer(offered);
        belief.record_fill(filled);
        belief.adapt();
    }

    #[test]
    fn sold_out_raises_and_residual_lowers() {
        let mut sell = PriceBelief::new(POTATO, Side::Sell, 10.0);
        trade(&mut sell, 5.0, 5.0);
        assert!((sell.proposed_price().unwrap() - 10.5).abs() < 1e-12);
        // Proposal only takes effect tomorrow.
        assert_eq!(sell.price(), 10.0);

        let mut unsold = PriceBelief::new(POTATO, Side::Sell, 10.0);
        trade(&mut unsold, 5.0, 2.0);
        assert!(unsold.proposed_price().unwrap() < 10.0);
    }

    #[test]
    fn unfilled_bid_raises_and_filled_bid_lowers() {
        let mut short = PriceBelief::new(MAN_HOUR, Side::Buy, 1.0);
        trade(&mut short, 20.0, 12.0);
        assert!(short.proposed_price().unwrap() > 1.0);

        let mut filled = PriceBelief::new(MAN_HOUR, Side::Buy, 1.0);
        trade(&mut filled, 20.0, 20.0);
        assert!(filled.proposed_price().unwrap() < 1.0);
    }

    #[test]
    fn repeated_adapt_on_same_feedback_is_idempotent() {
        let mut belief = PriceBelief::new(POTATO, Side::Sell, 10.0);
        trade(&mut belief, 5.0, 5.0);
        let first = belief.proposed_price();
        belief.adapt();
        belief.adapt();
        assert_eq!(belief.proposed_price(), first);
        assert_eq!(belief.price(), 10.0);
    }

    #[test]
    fn no_offer_means_no_change() {
        let mut belief = PriceBelief::new(POTATO, Side::Sell, 10.0);
        trade(&mut belief, 0.0, 0.0);
        assert_eq!(belief.proposed_price(), None);
        belief.begin_day();
        assert_eq!(belief.price(), 10.0);
    }

    #[test]
    fn step_grows_on_repeat_and_halves_on_reversal() {
        let mut belief = PriceBelief::new(POTATO, Side::Sell, 10.0);
        trade(&mut belief, 1.0, 1.0);
        trade(&mut belief, 1.0, 1.0);
        assert!((belief.step() - INITIAL_STEP).abs() < 1e-12);
        belief.begin_day();
        assert!((belief.step() - INITIAL_STEP * STEP_GROWTH).abs() < 1e-12);

        trade(&mut belief, 1.0, 0.0);
        belief.begin_day();
        assert!((belief.step() - INITIAL_STEP).abs() < 1e-12);

        for _ in 0..20 {
            trade(&mut belief, 1.0, 1.0);
        }
        belief.begin_day();
        assert_eq!(belief.step(), MAX_STEP);

        for i in 0..40 {
            let filled = if i % 2 == 0 { 0.0 } else { 1.0 };
            trade(&mut belief, 1.0, filled);
        }
        belief.begin_day();
        assert_eq!(belief.step(), MIN_STEP);
    }
}
