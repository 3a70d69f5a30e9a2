pub mod cobb_douglas;

pub use cobb_douglas::CobbDouglasProduction;

use std::fmt::Debug;

use serde::Serialize;

use crate::error::{ConfigError, PriceUnknown, StockError};
use crate::goods::{Good, Inventory, Quantity};
use crate::market::MarketSnapshot;

// === WEIGHTS ===

/// Output elasticity of one input.
///
/// Capital inputs (land) are held across days and never consumed; variable
/// inputs (man-hours) are bought each day and used up by production.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Weight {
    pub good: Good,
    pub weight: f64,
    pub capital: bool,
}

impl Weight {
    pub fn variable(good: Good, weight: f64) -> Self {
        Self {
            good,
            weight,
            capital: false,
        }
    }

    pub fn capital(good: Good, weight: f64) -> Self {
        Self {
            good,
            weight,
            capital: true,
        }
    }
}

// === PRODUCTION FUNCTION ===

/// Converts an inventory of inputs into output.
pub trait ProductionFunction: Debug {
    fn output(&self) -> Good;

    fn inputs(&self) -> &[Weight];

    /// Elasticity of `good`. Asking for a good outside the model is a configuration fault.
    fn weight(&self, good: Good) -> Result<Weight, ConfigError>;

    /// Amount of `good` burnt before anything is produced; zero for all other goods.
    fn fixed_cost(&self, good: Good) -> f64;

    /// Output obtainable from `inventory`. Does not touch the inventory.
    fn produce(&self, inventory: &Inventory) -> Quantity;

    /// Produce from `inventory`, using up every variable input and crediting the output stock.
    fn consume_inputs(&self, inventory: &mut Inventory) -> Result<Quantity, StockError> {
        let produced = self.produce(inventory);
        for input in self.inputs().iter().filter(|w| !w.capital) {
            inventory.stock_mut(input.good).take_all();
        }
        inventory.stock_mut(produced.good()).add(produced.amount())?;
        Ok(produced)
    }

    /// Total spending on variable inputs that maximizes profit, given the
    /// capital held in `inventory` and the published price beliefs.
    fn cost_of_maximum_profit(
        &self,
        inventory: &Inventory,
        market: &MarketSnapshot,
    ) -> Result<f64, PriceUnknown>;

    fn variable_weight_sum(&self) -> f64 {
        self.inputs()
            .iter()
            .filter(|w| !w.capital)
            .map(|w| w.weight)
            .sum()
    }

    fn capital_inputs(&self) -> Vec<Weight> {
        self.inputs().iter().filter(|w| w.capital).copied().collect()
    }

    fn variable_inputs(&self) -> Vec<Weight> {
        self.inputs().iter().filter(|w| !w.capital).copied().collect()
    }
}
