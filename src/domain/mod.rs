//! Core domain types and logic.

pub mod prices;
pub mod returns;
pub mod portfolio;
pub mod metrics;
pub mod monte_carlo;
pub mod tickers;
pub mod analysis;
pub mod session;
pub mod config_validation;
pub mod error;
