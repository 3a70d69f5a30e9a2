// Non-negative holding of a single good

use std::fmt;

use serde::Serialize;

use crate::error::StockError;

use super::{Good, Quantity};

/// A quantity of one good owned by exactly one agent.
///
/// The amount never goes negative. Subtracting more than is held fails
/// instead of clamping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stock {
    good: Good,
    amount: f64,
}

impl Stock {
    pub fn empty(good: Good) -> Self {
        Self { good, amount: 0.0 }
    }

    pub fn new(good: Good, amount: f64) -> Result<Self, StockError> {
        let mut stock = Self::empty(good);
        stock.add(amount)?;
        Ok(stock)
    }

    pub fn good(&self) -> Good {
        self.good
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn is_empty(&self) -> bool {
        self.amount <= 0.0
    }

    pub fn add(&mut self, amount: f64) -> Result<(), StockError> {
        self.check_amount(amount)?;
        self.amount += amount;
        Ok(())
    }

    pub fn subtract(&mut self, amount: f64) -> Result<(), StockError> {
        self.check_amount(amount)?;
        if amount > self.amount {
            return Err(StockError::Overdraw {
                good: self.good,
                requested: amount,
                available: self.amount,
            });
        }
        self.amount -= amount;
        Ok(())
    }

    /// Move the whole content of `other` into this stock, leaving `other` empty.
    pub fn absorb(&mut self, other: &mut Stock) -> Result<(), StockError> {
        if other.good != self.good {
            return Err(StockError::GoodMismatch {
                expected: self.good,
                found: other.good,
            });
        }
        self.amount += other.amount;
        other.amount = 0.0;
        Ok(())
    }

    /// Remove `amount` and hand it out as a separate stock.
    pub fn split_off(&mut self, amount: f64) -> Result<Stock, StockError> {
        self.subtract(amount)?;
        Ok(Stock {
            good: self.good,
            amount,
        })
    }

    /// Empty this stock, returning everything it held.
    pub fn take_all(&mut self) -> Stock {
        let amount = std::mem::take(&mut self.amount);
        Stock {
            good: self.good,
            amount,
        }
    }

    pub fn to_quantity(&self) -> Quantity {
        Quantity::new(self.good, self.amount)
    }

    fn check_amount(&self, amount: f64) -> Result<(), StockError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(StockError::InvalidAmount {
                good: self.good,
                amount,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} {}", self.amount, self.good)
    }
}
