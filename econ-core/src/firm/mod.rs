//! The farm firm and the departments it delegates to.
//!
//! A firm runs the same sequence every day:
//!
//! ```text
//! Offering -> Trading -> Production -> PriceAdaptation -> DividendDecision -> SolvencyCheck
//!     ^                                                                            |
//!     +------------------------------------ (survives) ---------------------------+
//!                                                    (exits) -> Exited
//! ```
//!
//! Fills from the external market may be applied while the firm is in the
//! `Trading` or `Production` phase. Calling an operation out of order is an
//! error; so is calling anything on a firm that has exited.

pub mod belief;
pub mod farm;
pub mod finance;
pub mod financials;
pub mod marketing;
pub mod solvency;
pub mod strategy;

pub use belief::PriceBelief;
pub use farm::{Firm, FirmConfig, MINIMUM_TARGET_INPUT};
pub use finance::FinanceDepartment;
pub use financials::Financials;
pub use marketing::MarketingDepartment;
pub use solvency::LossTracker;
pub use strategy::{ExpectedRevenueStrategy, FirmDecisions};

use serde::Serialize;

use crate::error::{FirmError, StockError};
use crate::goods::{Good, Inventory, Quantity, Stock};
use crate::market::{Fill, MarketStatistics, Order, PriceMakerMarket, PriceTakerMarket};
use crate::types::{AgentId, Day};

// === DAY PHASES ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DayPhase {
    Offering,
    Trading,
    Production,
    PriceAdaptation,
    DividendDecision,
    SolvencyCheck,
    Exited,
}

// === CAPABILITIES ===

/// Takes part in the daily market rounds.
pub trait MarketParticipant {
    /// Post today's buy and sell offers. Returns the input budget used.
    fn offer(&mut self, market: &mut dyn PriceMakerMarket) -> Result<f64, FirmError>;

    /// Settlement hook: the market delivers a fill addressed to this agent.
    fn apply_fill(&mut self, fill: &Fill) -> Result<(), FirmError>;

    /// Buy from sellers already on the book. Returns the purchase order, if any.
    fn trade_goods(&mut self, market: &mut dyn PriceTakerMarket) -> Result<Option<Order>, FirmError>;

    fn produce(&mut self) -> Result<Quantity, FirmError>;

    fn adapt_prices(&mut self) -> Result<(), FirmError>;
}

pub trait DividendPaying {
    /// Withdraw today's dividend and hand it to `owner`. Returns the amount paid.
    fn calculate_dividends(&mut self, day: Day, owner: &mut dyn Shareholder) -> Result<f64, FirmError>;
}

pub trait Liquidatable {
    /// End-of-day exit check. `true` means the firm has left the market for good.
    fn consider_bankruptcy(&mut self, stats: &mut MarketStatistics) -> Result<bool, FirmError>;

    /// Hand every remaining stock of an exited firm to `owner`.
    fn liquidate(&mut self, owner: &mut dyn Shareholder) -> Result<(), FirmError>;
}

// === OWNERS ===

/// Receives dividends while the firm lives and its assets when it exits.
pub trait Shareholder {
    fn id(&self) -> AgentId;

    fn receive_dividend(&mut self, firm: AgentId, day: Day, dividend: Stock) -> Result<(), StockError>;

    fn receive_assets(&mut self, firm: AgentId, assets: Inventory) -> Result<(), StockError>;
}

/// A plain owner that keeps everything it is paid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Founder {
    id: AgentId,
    inventory: Inventory,
    dividends_received: f64,
    firms_liquidated: u32,
}

impl Founder {
    pub fn new(id: AgentId, money: Good) -> Self {
        Self {
            id,
            inventory: Inventory::new(money),
            dividends_received: 0.0,
            firms_liquidated: 0,
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Total money received as dividends over the founder's life.
    pub fn dividends_received(&self) -> f64 {
        self.dividends_received
    }

    pub fn firms_liquidated(&self) -> u32 {
        self.firms_liquidated
    }
}

impl Shareholder for Founder {
    fn id(&self) -> AgentId {
        self.id
    }

    fn receive_dividend(&mut self, _firm: AgentId, _day: Day, mut dividend: Stock) -> Result<(), StockError> {
        self.dividends_received += dividend.amount();
        self.inventory.absorb(&mut dividend)
    }

    fn receive_assets(&mut self, _firm: AgentId, mut assets: Inventory) -> Result<(), StockError> {
        self.firms_liquidated += 1;
        self.inventory.absorb_all(&mut assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONEY: Good = Good::new(0, "money");
    const LAND: Good = Good::new(1, "land");

    #[test]
    fn founder_keeps_dividends_and_assets() {
        let mut founder = Founder::new(AgentId(9), MONEY);
        founder
            .receive_dividend(AgentId(1), 3, Stock::new(MONEY, 4.0).unwrap())
            .unwrap();

        let mut assets = Inventory::new(MONEY);
        assets.stock_mut(LAND).add(100.0).unwrap();
        assets.money_mut().add(6.0).unwrap();
        founder.receive_assets(AgentId(1), assets).unwrap();

        assert_eq!(founder.dividends_received(), 4.0);
        assert_eq!(founder.firms_liquidated(), 1);
        assert_eq!(founder.inventory().amount(MONEY), 10.0);
        assert_eq!(founder.inventory().amount(LAND), 100.0);
    }

    #[test]
    fn dividend_in_kind_lands_in_its_own_stock() {
        let mut founder = Founder::new(AgentId(9), MONEY);
        founder
            .receive_dividend(AgentId(1), 0, Stock::new(LAND, 1.0).unwrap())
            .unwrap();
        assert_eq!(founder.inventory().amount(LAND), 1.0);
        assert_eq!(founder.inventory().amount(MONEY), 0.0);
    }
}
