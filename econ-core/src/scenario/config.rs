use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::firm::FirmConfig;
use crate::firm::solvency::{DEFAULT_EXIT_PROBABILITY, DEFAULT_GRACE_DAYS};
use crate::firm::MINIMUM_TARGET_INPUT;
use crate::types::Price;

/// Parameters of the farming economy. Missing JSON fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmingConfig {
    /// Seed of the generator shared by exit draws and scheduled events.
    pub seed: u64,
    pub discount_rate: f64,

    /// Total factor productivity of a farm.
    pub productivity: f64,
    pub land_weight: f64,
    pub labor_weight: f64,
    /// Man-hours burnt each day before a farm produces anything.
    pub fixed_cost: f64,

    pub minimum_target_input: f64,
    pub grace_days: u32,
    pub exit_probability: f64,
    pub initial_labor_price: Price,
    pub initial_potato_price: Price,

    pub firms: u32,
    pub firm_money: f64,
    pub firm_land: f64,

    pub consumers: u32,
    pub consumer_money: f64,
    /// Man-hours each consumer can sell per day.
    pub daily_man_hours: f64,

    /// Daily probability that a new consumer arrives.
    pub growth_rate: f64,
    pub max_age: u32,
}

impl Default for FarmingConfig {
    fn default() -> Self {
        Self {
            seed: 13,
            discount_rate: 0.001,
            productivity: 1.0,
            land_weight: 0.2,
            labor_weight: 0.6,
            fixed_cost: 14.0,
            minimum_target_input: MINIMUM_TARGET_INPUT,
            grace_days: DEFAULT_GRACE_DAYS,
            exit_probability: DEFAULT_EXIT_PROBABILITY,
            initial_labor_price: 10.0,
            initial_potato_price: 10.0,
            firms: 10,
            firm_money: 1_000.0,
            firm_land: 100.0,
            consumers: 30,
            consumer_money: 100.0,
            daily_man_hours: 24.0,
            growth_rate: 0.002,
            max_age: 500,
        }
    }
}

impl FarmingConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("discount_rate", self.discount_rate),
            ("fixed_cost", self.fixed_cost),
            ("firm_money", self.firm_money),
            ("firm_land", self.firm_land),
            ("consumer_money", self.consumer_money),
            ("daily_man_hours", self.daily_man_hours),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        if !(0.0..=1.0).contains(&self.growth_rate) {
            return Err(ConfigError::InvalidParameter {
                name: "growth_rate",
                value: self.growth_rate,
            });
        }
        if self.max_age == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_age",
                value: 0.0,
            });
        }
        self.firm_config().validate()
    }

    pub fn firm_config(&self) -> FirmConfig {
        FirmConfig {
            minimum_target_input: self.minimum_target_input,
            grace_days: self.grace_days,
            exit_probability: self.exit_probability,
            initial_input_price: self.initial_labor_price,
            initial_output_price: self.initial_potato_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(FarmingConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config = FarmingConfig::from_json(r#"{ "firms": 4, "seed": 99 }"#).unwrap();
        assert_eq!(config.firms, 4);
        assert_eq!(config.seed, 99);
        assert_eq!(config.fixed_cost, 14.0);
        assert_eq!(config.max_age, 500);
    }

    #[test]
    fn json_round_trip() {
        let config = FarmingConfig {
            growth_rate: 0.01,
            ..FarmingConfig::default()
        };
        let back = FarmingConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert!((back.growth_rate - 0.01).abs() < 1e-15);
        assert_eq!(back.firms, config.firms);
        assert_eq!(back.seed, config.seed);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            FarmingConfig::from_json(r#"{ "exit_probability": 1.5 }"#),
            Err(ConfigError::InvalidParameter {
                name: "exit_probability",
                value: 1.5
            })
        );
        assert!(matches!(
            FarmingConfig::from_json(r#"{ "firms": "many" }"#),
            Err(ConfigError::Parse(_))
        ));
    }
}
