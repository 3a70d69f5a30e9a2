use serde::Serialize;

/// A firm's view of its own day, valued at its current price beliefs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Financials {
    /// Output stock valued at the output belief.
    pub revenue: f64,
    /// Input bought today valued at the input belief.
    pub costs: f64,
    pub profits: f64,
    /// Money held.
    pub cash: f64,
}

impl Financials {
    pub fn new(revenue: f64, costs: f64, cash: f64) -> Self {
        Self {
            revenue,
            costs,
            profits: revenue - costs,
            cash,
        }
    }
}
