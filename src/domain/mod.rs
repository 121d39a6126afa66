//! Core domain types and logic.

pub mod holding;
pub mod valuation;
pub mod price_fanout;
pub mod service;
pub mod constituent;
pub mod config_validation;
pub mod error;
