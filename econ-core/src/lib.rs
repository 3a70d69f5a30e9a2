//! Firm decision engine for an agent-based market economy.
//!
//! A [`Firm`] owns land, hires a variable input, produces with a
//! [`CobbDouglasProduction`] function and trades through the market traits
//! in [`market`]. Each day it offers, trades, produces, adapts its prices,
//! pays dividends to its owner and may go bankrupt after a run of losses.
//! [`Economy`] drives a population of firms through those phases and
//! [`BenchmarkValidator`] compares what emerges with the analytic optimum.

pub mod benchmark;
pub mod economy;
pub mod error;
pub mod firm;
pub mod goods;
pub mod market;
pub mod production;
pub mod scenario;
pub mod types;

#[cfg(feature = "instrument")]
pub use instrument;

pub use benchmark::{BenchmarkReport, BenchmarkValidator, Observed};
pub use economy::{DayReport, Economy};
pub use error::{ConfigError, FirmError, PriceUnknown, StockError};
pub use firm::{
    DayPhase, DividendPaying, Firm, FirmConfig, Founder, Liquidatable, MarketParticipant,
    Shareholder,
};
pub use goods::{Good, Inventory, Quantity, Stock};
pub use market::{
    Exchange, Fill, MarketSnapshot, MarketStatistics, Order, PriceMakerMarket, PriceTakerMarket,
    Side,
};
pub use production::{CobbDouglasProduction, ProductionFunction, Weight};
pub use types::{AgentId, AgentIdGenerator, Day, Price};
