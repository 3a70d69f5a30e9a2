// Cobb-Douglas production with a fixed cost in one input

use serde::Serialize;

use crate::error::{ConfigError, PriceUnknown};
use crate::goods::{Good, Inventory, Quantity};
use crate::market::MarketSnapshot;

use super::{ProductionFunction, Weight};

/// `output = productivity * prod(effective_i ^ weight_i)`.
///
/// The effective amount of the fixed-cost input is what remains after the
/// fixed cost has been burnt, clamped at zero. Weights sum to less than one,
/// so returns to scale are diminishing and the profit maximum is interior.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CobbDouglasProduction {
    output: Good,
    productivity: f64,
    inputs: Vec<Weight>,
    fixed_cost: Option<Quantity>,
}

impl CobbDouglasProduction {
    pub fn new(output: Good, productivity: f64, inputs: Vec<Weight>) -> Result<Self, ConfigError> {
        if !productivity.is_finite() || productivity <= 0.0 {
            return Err(ConfigError::InvalidProductivity(productivity));
        }
        for input in &inputs {
            if !input.weight.is_finite() || input.weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    good: input.good,
                    weight: input.weight,
                });
            }
        }
        let total: f64 = inputs.iter().map(|w| w.weight).sum();
        if total >= 1.0 {
            return Err(ConfigError::ReturnsToScale(total));
        }
        Ok(Self {
            output,
            productivity,
            inputs,
            fixed_cost: None,
        })
    }

    /// Burn `fixed` units of one of the inputs before producing anything.
    pub fn with_fixed_cost(mut self, fixed: Quantity) -> Result<Self, ConfigError> {
        self.weight(fixed.good())?;
        if !fixed.amount().is_finite() || fixed.amount() < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "fixed_cost",
                value: fixed.amount(),
            });
        }
        self.fixed_cost = Some(fixed);
        Ok(self)
    }

    pub fn productivity(&self) -> f64 {
        self.productivity
    }

    pub fn fixed_cost_quantity(&self) -> Option<Quantity> {
        self.fixed_cost
    }

    fn effective_input(&self, inventory: &Inventory, good: Good) -> f64 {
        (inventory.amount(good) - self.fixed_cost(good)).max(0.0)
    }
}

impl ProductionFunction for CobbDouglasProduction {
    fn output(&self) -> Good {
        self.output
    }

    fn inputs(&self) -> &[Weight] {
        &self.inputs
    }

    fn weight(&self, good: Good) -> Result<Weight, ConfigError> {
        self.inputs
            .iter()
            .find(|w| w.good == good)
            .copied()
            .ok_or(ConfigError::UnknownInput(good))
    }

    fn fixed_cost(&self, good: Good) -> f64 {
        match self.fixed_cost {
            Some(fixed) if fixed.good() == good => fixed.amount(),
            _ => 0.0,
        }
    }

    fn produce(&self, inventory: &Inventory) -> Quantity {
        let mut output = self.productivity;
        for input in self.inputs.iter().filter(|w| w.weight > 0.0) {
            let effective = self.effective_input(inventory, input.good);
            if effective <= 0.0 {
                return Quantity::zero(self.output);
            }
            output *= effective.powf(input.weight);
        }
        Quantity::new(self.output, output)
    }

    // First-order conditions give spending p_i * x_i = w_i * R on each variable
    // input, where R is revenue. Substituting back into the production function
    // yields R^(1 - W) = P * A * prod_capital(K^c) * prod_variable((w/p)^w).
    fn cost_of_maximum_profit(
        &self,
        inventory: &Inventory,
        market: &MarketSnapshot,
    ) -> Result<f64, PriceUnknown> {
        let output_price = market.price_belief(self.output)?;
        let mut scale = output_price * self.productivity;
        let mut variable_weight = 0.0;
        let mut fixed_value = 0.0;
        for input in &self.inputs {
            if input.capital {
                scale *= self.effective_input(inventory, input.good).powf(input.weight);
            } else {
                let price = market.price_belief(input.good)?;
                if input.weight > 0.0 {
                    scale *= (input.weight / price).powf(input.weight);
                }
                variable_weight += input.weight;
                fixed_value += self.fixed_cost(input.good) * price;
            }
        }
        let revenue = scale.powf(1.0 / (1.0 - variable_weight));
        Ok(variable_weight * revenue + fixed_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::GoodStats;
    use proptest::prelude::*;

    const MONEY: Good = Good::new(0, "money");
    const LAND: Good = Good::new(1, "land");
    const MAN_HOUR: Good = Good::new(2, "man-hour");
    const POTATO: Good = Good::new(3, "potato");

    fn labor_only(fixed: f64) -> CobbDouglasProduction {
        CobbDouglasProduction::new(POTATO, 1.0, vec![Weight::variable(MAN_HOUR, 0.6)])
            .unwrap()
            .with_fixed_cost(Quantity::new(MAN_HOUR, fixed))
            .unwrap()
    }

    fn farm(fixed: f64) -> CobbDouglasProduction {
        CobbDouglasProduction::new(
            POTATO,
            1.0,
            vec![Weight::capital(LAND, 0.2), Weight::variable(MAN_HOUR, 0.6)],
        )
        .unwrap()
        .with_fixed_cost(Quantity::new(MAN_HOUR, fixed))
        .unwrap()
    }

    fn inventory(land: f64, labor: f64) -> Inventory {
        let mut inv = Inventory::new(MONEY);
        inv.stock_mut(LAND).add(land).unwrap();
        inv.stock_mut(MAN_HOUR).add(labor).unwrap();
        inv
    }

    fn prices(potato: f64, labor: f64) -> MarketSnapshot {
        MarketSnapshot::new(0)
            .with_good(POTATO, GoodStats::priced(potato, 0.0))
            .with_good(MAN_HOUR, GoodStats::priced(labor, 0.0))
    }

    #[test]
    fn fixed_cost_is_burnt_before_producing() {
        let out = labor_only(14.0).produce(&inventory(0.0, 20.0));
        assert_eq!(out.good(), POTATO);
        assert!((out.amount() - 6f64.powf(0.6)).abs() < 1e-12);
    }

    #[test]
    fn no_output_below_fixed_cost_or_without_land() {
        assert_eq!(labor_only(14.0).produce(&inventory(0.0, 10.0)).amount(), 0.0);
        assert_eq!(labor_only(14.0).produce(&inventory(0.0, 14.0)).amount(), 0.0);
        assert_eq!(farm(14.0).produce(&inventory(0.0, 40.0)).amount(), 0.0);
        assert!(farm(14.0).produce(&inventory(100.0, 40.0)).amount() > 0.0);
    }

    #[test]
    fn fixed_cost_only_applies_to_its_good() {
        let prod = farm(14.0);
        assert_eq!(prod.fixed_cost(MAN_HOUR), 14.0);
        assert_eq!(prod.fixed_cost(LAND), 0.0);
        assert_eq!(prod.fixed_cost(MONEY), 0.0);
    }

    #[test]
    fn weight_of_unknown_good_is_a_config_fault() {
        let prod = farm(14.0);
        assert_eq!(prod.weight(LAND).unwrap().weight, 0.2);
        assert!(prod.weight(LAND).unwrap().capital);
        assert_eq!(prod.weight(MONEY), Err(ConfigError::UnknownInput(MONEY)));
        assert!((prod.variable_weight_sum() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn construction_rejects_bad_parameters() {
        assert!(matches!(
            CobbDouglasProduction::new(
                POTATO,
                1.0,
                vec![Weight::variable(MAN_HOUR, 0.7), Weight::capital(LAND, 0.4)]
            ),
            Err(ConfigError::ReturnsToScale(_))
        ));
        assert!(matches!(
            CobbDouglasProduction::new(POTATO, 1.0, vec![Weight::variable(MAN_HOUR, -0.1)]),
            Err(ConfigError::InvalidWeight { .. })
        ));
        assert_eq!(
            CobbDouglasProduction::new(POTATO, 0.0, vec![]),
            Err(ConfigError::InvalidProductivity(0.0))
        );
        assert_eq!(
            labor_only(0.0).with_fixed_cost(Quantity::new(LAND, 1.0)),
            Err(ConfigError::UnknownInput(LAND))
        );
    }

    #[test]
    fn consume_inputs_uses_labor_and_keeps_land() {
        let prod = farm(14.0);
        let mut inv = inventory(100.0, 40.0);
        let expected = prod.produce(&inv).amount();
        let produced = prod.consume_inputs(&mut inv).unwrap();
        assert_eq!(produced.amount(), expected);
        assert_eq!(inv.amount(MAN_HOUR), 0.0);
        assert_eq!(inv.amount(LAND), 100.0);
        assert_eq!(inv.amount(POTATO), expected);
    }

    #[test]
    fn optimal_cost_matches_first_order_condition() {
        // Labor only, no fixed cost: R = (P * (w/p)^w)^(1/(1-w)), cost = w * R.
        let prod = labor_only(0.0);
        let cost = prod.cost_of_maximum_profit(&Inventory::new(MONEY), &prices(2.0, 1.0)).unwrap();
        let revenue = (2.0 * 0.6f64.powf(0.6)).powf(1.0 / 0.4);
        assert!((cost - 0.6 * revenue).abs() < 1e-9);

        // Marginal product of labor equals its price at the optimum.
        let labor = cost / 1.0;
        let mp = 2.0 * 0.6 * labor.powf(-0.4);
        assert!((mp - 1.0).abs() < 1e-9);
    }

    #[test]
    fn optimal_cost_includes_fixed_cost_value() {
        let base = labor_only(0.0)
            .cost_of_maximum_profit(&Inventory::new(MONEY), &prices(2.0, 1.5))
            .unwrap();
        let fixed = labor_only(14.0)
            .cost_of_maximum_profit(&Inventory::new(MONEY), &prices(2.0, 1.5))
            .unwrap();
        assert!((fixed - base - 14.0 * 1.5).abs() < 1e-9);
    }

    #[test]
    fn missing_prices_are_reported() {
        let prod = farm(14.0);
        let inv = inventory(100.0, 0.0);
        let no_output = MarketSnapshot::new(0).with_good(MAN_HOUR, GoodStats::priced(1.0, 0.0));
        assert_eq!(
            prod.cost_of_maximum_profit(&inv, &no_output),
            Err(PriceUnknown(POTATO))
        );
        let no_labor = MarketSnapshot::new(0).with_good(POTATO, GoodStats::priced(1.0, 0.0));
        assert_eq!(
            prod.cost_of_maximum_profit(&inv, &no_labor),
            Err(PriceUnknown(MAN_HOUR))
        );
    }

    fn not_below(a: f64, b: f64) -> bool {
        a >= b - 1e-9 * b.abs().max(1.0)
    }

    proptest! {
        #[test]
        fn output_is_never_negative(
            land in 0.0f64..500.0,
            labor in 0.0f64..200.0,
            fixed in 0.0f64..30.0,
        ) {
            let out = farm(fixed).produce(&inventory(land, labor)).amount();
            prop_assert!(out >= 0.0);
            if labor <= fixed || land == 0.0 {
                prop_assert_eq!(out, 0.0);
            }
        }

        #[test]
        fn optimal_cost_grows_with_fixed_cost_and_output_price(
            land in 1.0f64..500.0,
            fixed in 0.0f64..30.0,
            extra in 0.0f64..10.0,
            potato in 0.1f64..10.0,
            labor in 0.1f64..10.0,
            markup in 0.0f64..5.0,
        ) {
            let inv = inventory(land, 0.0);
            let base = farm(fixed).cost_of_maximum_profit(&inv, &prices(potato, labor)).unwrap();
            let more_fixed = farm(fixed + extra).cost_of_maximum_profit(&inv, &prices(potato, labor)).unwrap();
            let dearer_output = farm(fixed).cost_of_maximum_profit(&inv, &prices(potato + markup, labor)).unwrap();
            prop_assert!(not_below(more_fixed, base));
            prop_assert!(not_below(dearer_output, base));
        }

        #[test]
        fn optimal_cost_falls_with_price_of_unburdened_input(
            land in 1.0f64..500.0,
            potato in 0.1f64..10.0,
            labor in 0.1f64..10.0,
            markup in 0.0f64..5.0,
        ) {
            let inv = inventory(land, 0.0);
            let prod = farm(0.0);
            let cheap = prod.cost_of_maximum_profit(&inv, &prices(potato, labor)).unwrap();
            let dear = prod.cost_of_maximum_profit(&inv, &prices(potato, labor + markup)).unwrap();
            prop_assert!(not_below(cheap, dear));
        }
    }
}
