// Core ID types and type aliases

use std::fmt;

use serde::{Deserialize, Serialize};

// === TYPE ALIASES ===

pub type Price = f64;
pub type Day = u32;

// === AGENT IDS ===

/// Identity of any agent taking part in the economy (firms, owners, consumers).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// Hands out agent ids in creation order. Ids are never reused.
#[derive(Debug, Clone, Default)]
pub struct AgentIdGenerator {
    next: u32,
}

impl AgentIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start numbering at `first`, e.g. to leave room for externally created agents.
    pub fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> AgentId {
        let id = AgentId::new(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far (including any skipped prefix).
    pub fn issued(&self) -> u32 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_and_unique() {
        let mut ids = AgentIdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_eq!(a, AgentId(0));
        assert_eq!(b, AgentId(1));
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn generator_can_skip_reserved_prefix() {
        let mut ids = AgentIdGenerator::starting_at(100);
        assert_eq!(ids.next_id(), AgentId(100));
        assert_eq!(format!("{}", AgentId(7)), "agent#7");
    }
}
