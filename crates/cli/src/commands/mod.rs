//! CLI command implementations.

pub mod fixture;
pub mod search;
pub mod simulate;
pub mod strategies;
