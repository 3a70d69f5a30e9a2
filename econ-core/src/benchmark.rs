//! Analytic cross-check of a simulated farming economy.
//!
//! From yesterday's aggregate statistics alone, derive the number of firms and
//! the per-firm allocation a competitive market with free entry would settle
//! on, and put them next to what the simulation actually produced.
//!
//! Every price-dependent figure is optional: a good the market has not priced
//! yet marks that figure unavailable and the rest of the report still runs.

use std::fmt;
use std::io;
use std::rc::Rc;

use serde::Serialize;

use crate::error::{ConfigError, PriceUnknown};
use crate::goods::{Good, Inventory, Stock};
use crate::market::MarketSnapshot;
use crate::production::{ProductionFunction, Weight};
use crate::types::AgentId;

/// Labor used by the counterfactual single firm.
pub const ALTERNATIVE_INPUT: f64 = 12.0;
/// Land held by the counterfactual single firm.
pub const ALTERNATIVE_LAND: f64 = 100.0;
/// Relative gap between the two profit formulas that counts as a real discrepancy.
pub const PROFIT_TOLERANCE: f64 = 1e-6;

// === INPUTS ===

/// What the simulation looks like right now, beyond market statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Observed {
    pub firm_count: usize,
    /// Every agent holding land, with the amount held.
    pub land_holdings: Vec<(AgentId, f64)>,
}

impl Observed {
    pub fn total_land(&self) -> f64 {
        self.land_holdings.iter().map(|(_, land)| land).sum()
    }
}

// === REPORT ===

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimalFirm {
    pub land: f64,
    /// Spending on labor including the fixed cost.
    pub cost: f64,
    pub input: f64,
    pub output: f64,
    /// Revenue minus cost, evaluating the production function directly.
    pub profit: f64,
    /// Profit from the factor-share identity.
    pub profit_from_shares: f64,
}

impl OptimalFirm {
    pub fn profits_diverge(&self) -> bool {
        let scale = self.profit.abs().max(self.profit_from_shares.abs()).max(1.0);
        (self.profit - self.profit_from_shares).abs() > PROFIT_TOLERANCE * scale
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub day: u32,
    pub labor: Good,
    pub output_good: Good,
    pub labor_volume: f64,
    pub optimal_firm_count: Option<f64>,
    pub observed_firm_count: usize,
    pub optimal_firm: Option<OptimalFirm>,
    /// Output if yesterday's labor and all land were split over the optimal number of firms.
    pub counterfactual_output: Option<f64>,
    pub observed_output: f64,
    pub alternative_profit: Option<f64>,
    pub land_holdings: Vec<(AgentId, f64)>,
    /// Figures that could not be computed and the price that was missing.
    pub unavailable: Vec<(&'static str, PriceUnknown)>,
}

impl BenchmarkReport {
    pub fn is_complete(&self) -> bool {
        self.unavailable.is_empty()
    }

    pub fn profits_diverge(&self) -> bool {
        self.optimal_firm.is_some_and(|f| f.profits_diverge())
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Benchmark on day {}", self.day)?;
        match self.optimal_firm_count {
            Some(k) => writeln!(
                f,
                "{:.4} {} traded implies optimal number of firms k={:.4}, actual number of firms is {}",
                self.labor_volume, self.labor, k, self.observed_firm_count
            )?,
            None => writeln!(
                f,
                "optimal number of firms unavailable, actual number of firms is {}",
                self.observed_firm_count
            )?,
        }
        if let Some(firm) = &self.optimal_firm {
            writeln!(
                f,
                "Firm with {:.4} land should use {:.4} {} to produce {:.4} {} and yield a profit of {:.4} ({:.4})",
                firm.land, firm.input, self.labor, firm.output, self.output_good, firm.profit, firm.profit_from_shares
            )?;
            if firm.profits_diverge() {
                writeln!(f, "WARNING: profit formulas disagree beyond tolerance")?;
            }
        }
        if let (Some(k), Some(output)) = (self.optimal_firm_count, self.counterfactual_output) {
            writeln!(
                f,
                "With {:.4} firms the {:.4} {} could have produced {:.4} instead of {:.4}",
                k, self.labor_volume, self.labor, output, self.observed_output
            )?;
        }
        if let Some(profit) = self.alternative_profit {
            writeln!(
                f,
                "Using only {ALTERNATIVE_INPUT} {} would yield a profit of {profit:.4}",
                self.labor
            )?;
        }
        for (agent, land) in &self.land_holdings {
            writeln!(f, "{agent} owns {land:.4} land")?;
        }
        for (what, missing) in &self.unavailable {
            writeln!(f, "{what} unavailable: {missing}")?;
        }
        Ok(())
    }
}

// === VALIDATOR ===

#[derive(Debug, Clone)]
pub struct BenchmarkValidator {
    production: Rc<dyn ProductionFunction>,
    money: Good,
    labor: Weight,
    land: Option<Good>,
}

impl BenchmarkValidator {
    /// `labor` must be a variable input carrying a positive fixed cost.
    pub fn new(production: Rc<dyn ProductionFunction>, money: Good, labor: Good) -> Result<Self, ConfigError> {
        let labor = production.weight(labor)?;
        if labor.capital || labor.weight <= 0.0 {
            return Err(ConfigError::InvalidWeight {
                good: labor.good,
                weight: labor.weight,
            });
        }
        let fixed = production.fixed_cost(labor.good);
        if fixed <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "fixed_cost",
                value: fixed,
            });
        }
        let land = production.capital_inputs().first().map(|w| w.good);
        Ok(Self {
            production,
            money,
            labor,
            land,
        })
    }

    /// `labor_volume / fixed_cost * (1 - labor_weight)`.
    pub fn optimal_firm_count(&self, labor_volume: f64) -> f64 {
        labor_volume / self.production.fixed_cost(self.labor.good) * (1.0 - self.labor.weight)
    }

    /// Inventory holding `land` and `labor`. Amounts that are not finite are left out.
    fn inventory(&self, land: f64, labor: f64) -> Inventory {
        let stocks = self
            .land
            .map(|good| (good, land))
            .into_iter()
            .chain([(self.labor.good, labor)])
            .filter_map(|(good, amount)| Stock::new(good, amount.max(0.0)).ok());
        Inventory::with_stocks(self.money, stocks).unwrap_or_else(|_| Inventory::new(self.money))
    }

    /// Profit-maximizing firm holding `land`.
    pub fn optimal_firm(&self, market: &MarketSnapshot, land: f64) -> Result<OptimalFirm, PriceUnknown> {
        let output_price = market.price_belief(self.production.output())?;
        let labor_price = market.price_belief(self.labor.good)?;
        let cost = self.production.cost_of_maximum_profit(&self.inventory(land, 0.0), market)?;
        let input = cost / labor_price;
        let output = self.production.produce(&self.inventory(land, input)).amount();
        let fixed_value = self.production.fixed_cost(self.labor.good) * labor_price;
        let w = self.labor.weight;
        Ok(OptimalFirm {
            land,
            cost,
            input,
            output,
            profit: output * output_price - cost,
            profit_from_shares: (cost - fixed_value) / w * (1.0 - w) - fixed_value,
        })
    }

    /// Profit of a firm with `land` that buys `input` units of labor.
    pub fn profit_at(&self, market: &MarketSnapshot, input: f64, land: f64) -> Result<f64, PriceUnknown> {
        let output_price = market.price_belief(self.production.output())?;
        let labor_price = market.price_belief(self.labor.good)?;
        let output = self.production.produce(&self.inventory(land, input)).amount();
        Ok(output * output_price - input * labor_price)
    }

    pub fn diagnose(
        &self,
        market: &MarketSnapshot,
        observed: &Observed,
        out: &mut impl io::Write,
    ) -> io::Result<BenchmarkReport> {
        let labor_volume = market.yesterday_volume(self.labor.good);
        let total_land = observed.total_land();
        let mut unavailable = Vec::new();

        let k = self.optimal_firm_count(labor_volume);
        let optimal_firm_count = k.is_finite().then_some(k);
        let land_per_firm = match optimal_firm_count {
            Some(k) if k > 0.0 => total_land / k,
            _ => 0.0,
        };

        let optimal_firm = match self.optimal_firm(market, land_per_firm) {
            Ok(firm) => Some(firm),
            Err(missing) => {
                unavailable.push(("optimal firm", missing));
                None
            }
        };

        let counterfactual_output = optimal_firm_count.filter(|k| *k > 0.0).map(|k| {
            let per_firm = self.inventory(total_land / k, labor_volume / k);
            self.production.produce(&per_firm).amount() * k
        });

        let alternative_profit = match self.profit_at(market, ALTERNATIVE_INPUT, ALTERNATIVE_LAND) {
            Ok(profit) => Some(profit),
            Err(missing) => {
                unavailable.push(("alternative profit", missing));
                None
            }
        };

        let mut land_holdings: Vec<_> = observed
            .land_holdings
            .iter()
            .copied()
            .filter(|(_, land)| *land > 0.0)
            .collect();
        land_holdings.sort_by_key(|(agent, _)| *agent);

        let report = BenchmarkReport {
            day: market.day(),
            labor: self.labor.good,
            output_good: self.production.output(),
            labor_volume,
            optimal_firm_count,
            observed_firm_count: observed.firm_count,
            optimal_firm,
            counterfactual_output,
            observed_output: market.yesterday_volume(self.production.output()),
            alternative_profit,
            land_holdings,
            unavailable,
        };

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "benchmark",
            day = report.day,
            labor_volume = report.labor_volume,
            optimal_firms = report.optimal_firm_count.unwrap_or(f64::NAN),
            observed_firms = report.observed_firm_count as u64,
            optimal_profit = report.optimal_firm.map_or(f64::NAN, |f| f.profit),
            optimal_profit_from_shares = report.optimal_firm.map_or(f64::NAN, |f| f.profit_from_shares),
            counterfactual_output = report.counterfactual_output.unwrap_or(f64::NAN),
            observed_output = report.observed_output,
        );

        write!(out, "{report}")?;
        Ok(report)
    }
}
