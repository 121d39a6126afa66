//! Concrete adapter implementations for ports.

#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
#[cfg(feature = "web")]
pub mod web;
pub mod alpha_vantage_adapter;
pub mod constituent_price_adapter;
pub mod csv_adapter;
pub mod file_config_adapter;
