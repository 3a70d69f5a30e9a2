// Good identity and produced/traded quantities

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

// === GOOD ===

/// Identity of a tradable commodity (land, man-hours, potatoes, money...).
///
/// Goods compare by id only; the name is for display.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Good {
    id: u32,
    name: &'static str,
}

impl Good {
    pub const fn new(id: u32, name: &'static str) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Good {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Good {}

impl Hash for Good {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Good {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Good {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for Good {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// === QUANTITY ===

/// An immutable amount of one good, e.g. a production result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quantity {
    good: Good,
    amount: f64,
}

impl Quantity {
    pub fn new(good: Good, amount: f64) -> Self {
        Self { good, amount }
    }

    pub fn zero(good: Good) -> Self {
        Self::new(good, 0.0)
    }

    pub fn good(&self) -> Good {
        self.good
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} {}", self.amount, self.good)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn goods_compare_by_identity() {
        let a = Good::new(1, "land");
        let renamed = Good::new(1, "acre");
        let b = Good::new(2, "land");
        assert_eq!(a, renamed);
        assert_ne!(a, b);

        let set: HashSet<Good> = [a, renamed, b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn quantity_displays_amount_and_good() {
        let q = Quantity::new(Good::new(3, "potato"), 2.5);
        assert_eq!(q.to_string(), "2.5000 potato");
        assert_eq!(Quantity::zero(q.good()).amount(), 0.0);
    }
}
