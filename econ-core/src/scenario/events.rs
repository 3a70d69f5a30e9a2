//! Agents injected into a running economy.
//!
//! An event is data: when it fires ([`Trigger`]) and a function value that
//! decides what to create ([`SpawnPolicy`]). The policy is captured when the
//! scenario is built.

use std::fmt;
use std::rc::Rc;

use rand::Rng;
use serde::Serialize;

use crate::goods::Quantity;
use crate::types::Day;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Trigger {
    /// Fires once, on the given day.
    OnDay(Day),
    /// From `from_day` on, fires each day with the given probability.
    Recurring { from_day: Day, probability: f64 },
}

impl Trigger {
    /// Whether the trigger fires on `day`. Draws only for recurring triggers
    /// that are active.
    pub fn fires<R: Rng>(&self, day: Day, rng: &mut R) -> bool {
        match *self {
            Trigger::OnDay(on) => day == on,
            Trigger::Recurring {
                from_day,
                probability,
            } => day >= from_day && rng.random::<f64>() < probability,
        }
    }
}

/// What a new agent starts with.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Endowment {
    pub money: f64,
    /// Stocks handed over once, on arrival.
    pub stocks: Vec<Quantity>,
    /// Stocks received again every day.
    pub daily: Vec<Quantity>,
}

impl Endowment {
    pub fn new(money: f64) -> Self {
        Self {
            money,
            ..Self::default()
        }
    }

    pub fn with_stock(mut self, stock: Quantity) -> Self {
        self.stocks.push(stock);
        self
    }

    pub fn with_daily(mut self, daily: Quantity) -> Self {
        self.daily.push(daily);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AgentSpawn {
    Firm { endowment: Endowment },
    Consumer { max_age: u32, endowment: Endowment },
}

/// Decides, on the day an event fires, which agent to create.
pub type SpawnPolicy = Rc<dyn Fn(Day) -> AgentSpawn>;

#[derive(Clone)]
pub struct ScheduledEvent {
    name: &'static str,
    trigger: Trigger,
    spawn: SpawnPolicy,
}

impl ScheduledEvent {
    pub fn new(name: &'static str, trigger: Trigger, spawn: impl Fn(Day) -> AgentSpawn + 'static) -> Self {
        Self {
            name,
            trigger,
            spawn: Rc::new(spawn),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// The agent to create today, if the event fires.
    pub fn due<R: Rng>(&self, day: Day, rng: &mut R) -> Option<AgentSpawn> {
        self.trigger.fires(day, rng).then(|| (self.spawn)(day))
    }
}

impl fmt::Debug for ScheduledEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledEvent")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .finish_non_exhaustive()
    }
}
