//! stockdigest: daily profit/loss digest for a stock portfolio.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], orchestration in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
