//! Scenario builders.
//!
//! Each layer is a plain function from one [`Setup`] to a richer one, so
//! scenarios compose by calling them in sequence:
//!
//! ```
//! use econ_core::scenario::{FarmingConfig, base, farming, growth};
//!
//! let setup = growth(farming(base(FarmingConfig::default())).unwrap());
//! assert_eq!(setup.events.len(), 1);
//! ```

pub mod config;
pub mod events;

pub use config::FarmingConfig;
pub use events::{AgentSpawn, Endowment, ScheduledEvent, SpawnPolicy, Trigger};

use std::rc::Rc;

use crate::benchmark::BenchmarkValidator;
use crate::economy::Economy;
use crate::error::{ConfigError, FirmError};
use crate::goods::{Good, Quantity};
use crate::market::MarketStatistics;
use crate::production::{CobbDouglasProduction, ProductionFunction, Weight};

// === GOODS ===

pub const MONEY: Good = Good::new(0, "money");
pub const LAND: Good = Good::new(1, "land");
pub const MAN_HOUR: Good = Good::new(2, "man-hour");
pub const POTATO: Good = Good::new(3, "potato");

// === SETUP ===

#[derive(Debug, Clone)]
pub struct Setup {
    pub config: FarmingConfig,
    pub money: Good,
    pub goods: Vec<Good>,
    pub production: Option<Rc<dyn ProductionFunction>>,
    /// Agents created before the first day.
    pub agents: Vec<AgentSpawn>,
    pub events: Vec<ScheduledEvent>,
}

impl Setup {
    pub fn production(&self) -> Result<Rc<dyn ProductionFunction>, ConfigError> {
        self.production.clone().ok_or(ConfigError::NoProduction)
    }

    /// Fresh statistics with no prices known yet, seeded from the config.
    pub fn statistics(&self) -> MarketStatistics {
        MarketStatistics::new(self.money, self.config.discount_rate, self.config.seed)
    }

    pub fn benchmark(&self) -> Result<BenchmarkValidator, ConfigError> {
        BenchmarkValidator::new(self.production()?, self.money, MAN_HOUR)
    }

    /// Build the economy and create the initial agents, in order.
    pub fn into_economy(self, stats: &MarketStatistics) -> Result<Economy, FirmError> {
        let production = self.production()?;
        let mut economy = Economy::new(self.money, production, self.config.firm_config());
        for event in self.events {
            economy = economy.with_event(event);
        }
        for spawn in self.agents {
            economy.spawn(spawn, stats)?;
        }
        Ok(economy)
    }
}

/// Money only: no goods, no agents, no events.
pub fn base(config: FarmingConfig) -> Setup {
    Setup {
        config,
        money: MONEY,
        goods: vec![MONEY],
        production: None,
        agents: Vec::new(),
        events: Vec::new(),
    }
}

/// Potato farms on land worked with man-hours, and consumers who sell their labor.
pub fn farming(mut setup: Setup) -> Result<Setup, ConfigError> {
    let config = &setup.config;
    config.validate()?;
    let production = CobbDouglasProduction::new(
        POTATO,
        config.productivity,
        vec![
            Weight::capital(LAND, config.land_weight),
            Weight::variable(MAN_HOUR, config.labor_weight),
        ],
    )?
    .with_fixed_cost(Quantity::new(MAN_HOUR, config.fixed_cost))?;

    let firms = (0..config.firms).map(|_| AgentSpawn::Firm {
        endowment: Endowment::new(config.firm_money).with_stock(Quantity::new(LAND, config.firm_land)),
    });
    let consumers = (0..config.consumers).map(|_| AgentSpawn::Consumer {
        max_age: config.max_age,
        endowment: Endowment::new(config.consumer_money)
            .with_daily(Quantity::new(MAN_HOUR, config.daily_man_hours)),
    });
    let agents: Vec<_> = consumers.chain(firms).collect();

    setup.agents.extend(agents);
    setup.goods.extend([LAND, MAN_HOUR, POTATO]);
    setup.production = Some(Rc::new(production));
    Ok(setup)
}

/// Staggered consumer ages and a steady trickle of newcomers.
///
/// The `i`-th of `n` initial consumers (counting from one) lives to
/// `i * max_age / n`, so they do not all retire on the same day.
pub fn growth(mut setup: Setup) -> Setup {
    let max_age = setup.config.max_age;
    let n = setup
        .agents
        .iter()
        .filter(|a| matches!(a, AgentSpawn::Consumer { .. }))
        .count() as u64;
    let mut number = 0u64;
    for agent in &mut setup.agents {
        if let AgentSpawn::Consumer { max_age: age, .. } = agent {
            number += 1;
            // number <= n, so the quotient never exceeds max_age.
            *age = u32::try_from(number * u64::from(max_age) / n).unwrap_or(max_age);
        }
    }

    let newcomer = Endowment::new(0.0).with_daily(Quantity::new(MAN_HOUR, setup.config.daily_man_hours));
    setup.events.push(ScheduledEvent::new(
        "growth",
        Trigger::Recurring {
            from_day: 0,
            probability: setup.config.growth_rate,
        },
        move |_| AgentSpawn::Consumer {
            max_age,
            endowment: newcomer.clone(),
        },
    ));
    setup
}
