//! Core domain types and logic.

pub mod calculator;
pub mod config_validation;
pub mod error;
pub mod portfolio;
pub mod position;
pub mod price_history;
pub mod quote;
pub mod settings;
pub mod symbol;
