//! Port traits the domain depends on.

pub mod config_port;
pub mod constituents_port;
pub mod holdings_port;
pub mod price_port;
