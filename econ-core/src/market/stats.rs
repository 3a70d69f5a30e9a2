//! Daily market statistics.
//!
//! Fills are accumulated during the day; at the day boundary they are folded
//! into an immutable [`MarketSnapshot`] that every agent reads the next day.

use std::collections::HashMap;
use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::PriceUnknown;
use crate::goods::Good;
use crate::types::{Day, Price};

use super::{Fill, Side};

/// Weight of the latest volume-weighted price when blending into the belief.
pub const PRICE_EMA_ALPHA: f64 = 0.3;

// === PER-GOOD STATS ===

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GoodStats {
    /// Believed clearing price, `None` until the good has traded or been seeded.
    pub price_belief: Option<Price>,
    /// Units traded yesterday.
    pub yesterday_volume: f64,
    /// Money that changed hands for this good yesterday.
    pub yesterday_value: f64,
}

impl GoodStats {
    pub fn priced(price: Price, volume: f64) -> Self {
        Self {
            price_belief: Some(price),
            yesterday_volume: volume,
            yesterday_value: price * volume,
        }
    }
}

// === SNAPSHOT ===

/// Read-only view of the market published once per day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketSnapshot {
    day: Day,
    goods: HashMap<Good, GoodStats>,
}

impl MarketSnapshot {
    pub fn new(day: Day) -> Self {
        Self {
            day,
            goods: HashMap::new(),
        }
    }

    pub fn with_good(mut self, good: Good, stats: GoodStats) -> Self {
        self.goods.insert(good, stats);
        self
    }

    pub fn day(&self) -> Day {
        self.day
    }

    pub fn stats(&self, good: Good) -> GoodStats {
        self.goods.get(&good).copied().unwrap_or_default()
    }

    /// Current price belief for `good`.
    ///
    /// Non-positive or non-finite beliefs are treated as unknown.
    pub fn price_belief(&self, good: Good) -> Result<Price, PriceUnknown> {
        match self.stats(good).price_belief {
            Some(p) if p.is_finite() && p > 0.0 => Ok(p),
            _ => Err(PriceUnknown(good)),
        }
    }

    pub fn yesterday_volume(&self, good: Good) -> f64 {
        self.stats(good).yesterday_volume
    }

    pub fn goods(&self) -> impl Iterator<Item = (&Good, &GoodStats)> {
        self.goods.iter()
    }
}

impl fmt::Display for MarketSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut goods: Vec<_> = self.goods.iter().collect();
        goods.sort_by_key(|(good, _)| **good);
        write!(f, "Market on day {}:", self.day)?;
        for (good, stats) in goods {
            match stats.price_belief {
                Some(p) => write!(
                    f,
                    "\n  {good}: price {p:.4}, traded {:.4}",
                    stats.yesterday_volume
                )?,
                None => write!(f, "\n  {good}: price unknown")?,
            }
        }
        Ok(())
    }
}

// === STATISTICS COLLABORATOR ===

/// Owns the published snapshot, the discount rate and the shared random generator.
///
/// The generator is seeded once and threaded through every stochastic decision
/// so that a run is reproducible for a fixed seed and agent order.
#[derive(Debug, Clone)]
pub struct MarketStatistics {
    money: Good,
    discount_rate: f64,
    snapshot: MarketSnapshot,
    today: HashMap<Good, (f64, f64)>,
    rng: StdRng,
}

impl MarketStatistics {
    pub fn new(money: Good, discount_rate: f64, seed: u64) -> Self {
        Self {
            money,
            discount_rate,
            snapshot: MarketSnapshot::new(0),
            today: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_snapshot(mut self, snapshot: MarketSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Set an initial belief before any trading has happened.
    pub fn seed_price(&mut self, good: Good, price: Price) {
        let entry = self.snapshot.goods.entry(good).or_default();
        entry.price_belief = Some(price);
    }

    pub fn money(&self) -> Good {
        self.money
    }

    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    pub fn snapshot(&self) -> &MarketSnapshot {
        &self.snapshot
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Count a settled trade. Each trade is counted once, from the buyer's fill.
    pub fn record_fill(&mut self, fill: &Fill) {
        if fill.side != Side::Buy || fill.quantity <= 0.0 {
            return;
        }
        let (volume, value) = self.today.entry(fill.good).or_insert((0.0, 0.0));
        *volume += fill.quantity;
        *value += fill.value();
    }

    /// Fold today's trades into the snapshot agents will read tomorrow.
    pub fn publish(&mut self, day: Day) {
        let mut next = MarketSnapshot::new(day + 1);
        for (good, stats) in &self.snapshot.goods {
            next.goods.insert(
                *good,
                GoodStats {
                    price_belief: stats.price_belief,
                    yesterday_volume: 0.0,
                    yesterday_value: 0.0,
                },
            );
        }
        for (good, (volume, value)) in self.today.drain() {
            let entry = next.goods.entry(good).or_default();
            entry.yesterday_volume = volume;
            entry.yesterday_value = value;
            if volume > 0.0 {
                let vwap = value / volume;
                entry.price_belief = Some(match entry.price_belief {
                    Some(prev) => PRICE_EMA_ALPHA * vwap + (1.0 - PRICE_EMA_ALPHA) * prev,
                    None => vwap,
                });
            }
        }
        self.snapshot = next;
    }
}
