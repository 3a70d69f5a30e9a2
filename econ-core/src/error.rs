//! Error types shared across the firm engine.
//!
//! Bankruptcy is not an error: it is reported as a plain `bool` by the solvency
//! check and never travels through these types.

use serde::Serialize;
use thiserror::Error;

use crate::firm::DayPhase;
use crate::goods::Good;
use crate::types::{AgentId, Day};

/// Violations of the non-negative stock invariant.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StockError {
    #[error("cannot remove {requested} {good}: only {available} held")]
    Overdraw {
        good: Good,
        requested: f64,
        available: f64,
    },

    #[error("cannot merge a {found} stock into a {expected} stock")]
    GoodMismatch { expected: Good, found: Good },

    #[error("invalid amount {amount} for a {good} stock")]
    InvalidAmount { good: Good, amount: f64 },
}

/// The market has never established a price for this good.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize)]
#[error("no price belief established for {0}")]
pub struct PriceUnknown(pub Good);

/// Configuration-time faults. These are never expected during day-to-day operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not an input of the production function")]
    UnknownInput(Good),

    #[error("invalid output elasticity {weight} for {good}")]
    InvalidWeight { good: Good, weight: f64 },

    #[error("input weights sum to {0}; must stay below 1 for diminishing returns")]
    ReturnsToScale(f64),

    #[error("total factor productivity must be positive and finite, got {0}")]
    InvalidProductivity(f64),

    #[error("production function allows at most one capital input, found {0}")]
    CapitalInputs(usize),

    #[error("production function needs exactly one variable input, found {0}")]
    VariableInputs(usize),

    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("scenario defines no production function")]
    NoProduction,

    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Failures of the firm's daily operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FirmError {
    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{operation} called during {phase:?}")]
    OutOfPhase {
        operation: &'static str,
        phase: DayPhase,
    },

    #[error("firm {0} has exited the market")]
    Exited(AgentId),

    #[error("firm {firm} was founded without money")]
    NoStartingCapital { firm: AgentId },

    #[error("fill addressed to {addressee} delivered to firm {firm}")]
    ForeignFill { firm: AgentId, addressee: AgentId },

    #[error("firm {firm} is owned by {owner}, not {presented}")]
    WrongOwner {
        firm: AgentId,
        owner: AgentId,
        presented: AgentId,
    },

    #[error("owner {0} is not registered")]
    UnknownOwner(AgentId),

    #[error("economy halted by a failure on day {day}")]
    Halted { day: Day },
}
