pub mod good;
pub mod inventory;
pub mod stock;

pub use good::*;
pub use inventory::*;
pub use stock::*;
