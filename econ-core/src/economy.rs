//! Reference day driver for a population of farms.
//!
//! Runs every live firm through the day in founding order, routes fills from
//! the exchange to the firms they are addressed to, and retires firms that
//! exit. Matching itself is left to the [`Exchange`] passed in.

use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use slotmap::{SlotMap, new_key_type};

use crate::benchmark::Observed;
use crate::error::FirmError;
use crate::firm::{
    DividendPaying, Firm, FirmConfig, Founder, Liquidatable, MarketParticipant, Shareholder,
};
use crate::goods::{Good, Stock};
use crate::market::{Exchange, Fill, MarketStatistics, Order};
use crate::production::ProductionFunction;
use crate::scenario::events::{AgentSpawn, Endowment, ScheduledEvent};
use crate::types::{AgentId, AgentIdGenerator, Day};

new_key_type! {
    pub struct FirmKey;
}

/// A consumer created by a scheduled event, waiting to be picked up by
/// whatever models consumer behavior.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumerArrival {
    pub id: AgentId,
    pub day: Day,
    pub max_age: u32,
    pub endowment: Endowment,
}

/// What happened during one call to [`Economy::run_day`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayReport {
    pub day: Day,
    pub firms: usize,
    pub budgets: f64,
    pub fills: usize,
    pub investments: Vec<Order>,
    pub output: f64,
    pub dividends: f64,
    pub exits: Vec<AgentId>,
    pub founded: Vec<AgentId>,
    pub arrivals: usize,
    /// Fills addressed to agents this economy does not manage.
    pub unrouted: Vec<Fill>,
}

#[derive(Debug)]
pub struct Economy {
    money: Good,
    land: Option<Good>,
    production: Rc<dyn ProductionFunction>,
    firm_config: FirmConfig,
    ids: AgentIdGenerator,
    firms: SlotMap<FirmKey, Firm>,
    order: Vec<FirmKey>,
    by_agent: HashMap<AgentId, FirmKey>,
    owners: HashMap<AgentId, Founder>,
    events: Vec<ScheduledEvent>,
    arrivals: Vec<ConsumerArrival>,
    day: Day,
    halted: Option<Day>,
}

impl Economy {
    pub fn new(money: Good, production: Rc<dyn ProductionFunction>, firm_config: FirmConfig) -> Self {
        let land = production.capital_inputs().first().map(|w| w.good);
        Self {
            money,
            land,
            production,
            firm_config,
            ids: AgentIdGenerator::new(),
            firms: SlotMap::with_key(),
            order: Vec::new(),
            by_agent: HashMap::new(),
            owners: HashMap::new(),
            events: Vec::new(),
            arrivals: Vec::new(),
            day: 0,
            halted: None,
        }
    }

    pub fn with_event(mut self, event: ScheduledEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn day(&self) -> Day {
        self.day
    }

    /// The day whose failure stopped this economy, if any.
    pub fn halted(&self) -> Option<Day> {
        self.halted
    }

    pub fn firm_count(&self) -> usize {
        self.firms.len()
    }

    /// Live firms in the order they act each day.
    pub fn firms(&self) -> impl Iterator<Item = &Firm> {
        self.order.iter().filter_map(|key| self.firms.get(*key))
    }

    pub fn firm(&self, id: AgentId) -> Option<&Firm> {
        self.by_agent.get(&id).and_then(|key| self.firms.get(*key))
    }

    pub fn owner(&self, id: AgentId) -> Option<&Founder> {
        self.owners.get(&id)
    }

    pub fn owners(&self) -> impl Iterator<Item = &Founder> {
        self.owners.values()
    }

    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    /// Consumers created since the last call.
    pub fn take_arrivals(&mut self) -> Vec<ConsumerArrival> {
        std::mem::take(&mut self.arrivals)
    }

    pub fn add_owner(&mut self) -> AgentId {
        let id = self.ids.next_id();
        self.owners.insert(id, Founder::new(id, self.money));
        id
    }

    /// Found a firm for a registered owner, moving the given stocks into it.
    pub fn found_firm(
        &mut self,
        owner: AgentId,
        money: &mut Stock,
        land: &mut Stock,
        stats: &MarketStatistics,
    ) -> Result<AgentId, FirmError> {
        let firm = self.new_firm(owner, money, land, stats)?;
        Ok(self.insert_firm(firm))
    }

    fn new_firm(
        &mut self,
        owner: AgentId,
        money: &mut Stock,
        land: &mut Stock,
        stats: &MarketStatistics,
    ) -> Result<Firm, FirmError> {
        if !self.owners.contains_key(&owner) {
            return Err(FirmError::UnknownOwner(owner));
        }
        Firm::new(
            &mut self.ids,
            owner,
            money,
            land,
            Rc::clone(&self.production),
            stats,
            self.firm_config,
        )
    }

    fn insert_firm(&mut self, firm: Firm) -> AgentId {
        let id = firm.id();
        let key = self.firms.insert(firm);
        self.order.push(key);
        self.by_agent.insert(id, key);
        id
    }

    /// Create the agent described by `spawn`. Firms get a fresh owner; consumers
    /// are queued as arrivals. Returns the new agent's id.
    pub fn spawn(&mut self, spawn: AgentSpawn, stats: &MarketStatistics) -> Result<AgentId, FirmError> {
        match spawn {
            AgentSpawn::Firm { endowment } => {
                let owner = self.add_owner();
                let land_good = self.land.unwrap_or(self.money);
                let mut money = Stock::new(self.money, endowment.money)?;
                let mut land = Stock::empty(land_good);
                let mut extra = Vec::new();
                for quantity in &endowment.stocks {
                    let mut stock = Stock::new(quantity.good(), quantity.amount())?;
                    if quantity.good() == land_good {
                        land.absorb(&mut stock)?;
                    } else {
                        extra.push(stock);
                    }
                }
                let mut firm = self.new_firm(owner, &mut money, &mut land, stats)?;
                for mut stock in extra {
                    firm = firm.with_starting_stock(&mut stock)?;
                }
                Ok(self.insert_firm(firm))
            }
            AgentSpawn::Consumer { max_age, endowment } => {
                let id = self.ids.next_id();
                self.arrivals.push(ConsumerArrival {
                    id,
                    day: self.day,
                    max_age,
                    endowment,
                });
                Ok(id)
            }
        }
    }

    /// Land held by every firm and owner, plus the live firm count.
    pub fn observed(&self) -> Observed {
        let Some(land) = self.land else {
            return Observed {
                firm_count: self.firms.len(),
                land_holdings: Vec::new(),
            };
        };
        let firms = self.firms().map(|f| (f.id(), f.inventory().amount(land)));
        let mut owners: Vec<_> = self
            .owners
            .values()
            .map(|o| (o.id(), o.inventory().amount(land)))
            .collect();
        owners.sort_by_key(|(id, _)| *id);
        Observed {
            firm_count: self.firms.len(),
            land_holdings: firms.chain(owners).filter(|(_, amount)| *amount > 0.0).collect(),
        }
    }

    /// Run one day: scheduled events, then every firm's daily sequence, then
    /// retire exits and publish statistics.
    ///
    /// An error leaves firms partway through their day, with the stocks and
    /// fills already applied kept as they are. The economy is halted from
    /// then on: every later call returns [`FirmError::Halted`] naming the
    /// failed day instead of touching any firm.
    pub fn run_day<E: Exchange>(
        &mut self,
        exchange: &mut E,
        stats: &mut MarketStatistics,
    ) -> Result<DayReport, FirmError> {
        if let Some(day) = self.halted {
            return Err(FirmError::Halted { day });
        }
        let result = self.step_day(exchange, stats);
        if result.is_err() {
            self.halted = Some(self.day);
        }
        result
    }

    fn step_day<E: Exchange>(
        &mut self,
        exchange: &mut E,
        stats: &mut MarketStatistics,
    ) -> Result<DayReport, FirmError> {
        let day = self.day;
        let mut report = DayReport {
            day,
            ..DayReport::default()
        };

        let events = std::mem::take(&mut self.events);
        let due: Vec<_> = events
            .iter()
            .filter_map(|event| event.due(day, stats.rng()))
            .collect();
        self.events = events;
        for spawn in due {
            match spawn {
                AgentSpawn::Firm { .. } => report.founded.push(self.spawn(spawn, stats)?),
                AgentSpawn::Consumer { .. } => {
                    self.spawn(spawn, stats)?;
                    report.arrivals += 1;
                }
            }
        }

        let keys = self.order.clone();
        report.firms = keys.len();

        for key in &keys {
            report.budgets += self.firms[*key].offer(exchange)?;
        }
        self.settle(exchange, stats, &mut report)?;

        for key in &keys {
            if let Some(order) = self.firms[*key].trade_goods(exchange)? {
                report.investments.push(order);
            }
        }
        self.settle(exchange, stats, &mut report)?;

        for key in &keys {
            report.output += self.firms[*key].produce()?.amount();
        }
        for key in &keys {
            self.firms[*key].adapt_prices()?;
        }
        for key in &keys {
            let firm = &mut self.firms[*key];
            let owner = self
                .owners
                .get_mut(&firm.owner())
                .ok_or(FirmError::UnknownOwner(firm.owner()))?;
            report.dividends += firm.calculate_dividends(day, owner)?;
        }

        let mut exited = Vec::new();
        for key in &keys {
            if self.firms[*key].consider_bankruptcy(stats)? {
                exited.push(*key);
            }
        }
        for key in exited {
            self.retire(key)?;
            if let Some(firm) = self.firms.remove(key) {
                report.exits.push(firm.id());
            }
        }

        stats.publish(day);
        self.day += 1;
        Ok(report)
    }

    fn settle<E: Exchange>(
        &mut self,
        exchange: &mut E,
        stats: &mut MarketStatistics,
        report: &mut DayReport,
    ) -> Result<(), FirmError> {
        for fill in exchange.settle() {
            stats.record_fill(&fill);
            match self.by_agent.get(&fill.agent) {
                Some(key) => {
                    self.firms[*key].apply_fill(&fill)?;
                    report.fills += 1;
                }
                None => report.unrouted.push(fill),
            }
        }
        Ok(())
    }

    fn retire(&mut self, key: FirmKey) -> Result<(), FirmError> {
        let firm = &mut self.firms[key];
        let owner = self
            .owners
            .get_mut(&firm.owner())
            .ok_or(FirmError::UnknownOwner(firm.owner()))?;
        firm.liquidate(owner)?;
        self.by_agent.remove(&firm.id());
        self.order.retain(|k| *k != key);
        Ok(())
    }
}
