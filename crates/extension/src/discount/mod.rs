//! Segment pricing: policies, the strategy registry and the executor that
//! applies a policy to the terminal order.

mod executor;
mod policy;
mod registry;

pub use executor::{ExecutionReport, SkipReason, Toggle, execute};
pub use policy::{DiscountPolicy, DiscountScope, Guard, LineRule};
pub use registry::{LOYALTY_THRESHOLD, RegistryError, StrategyFactory, StrategyRegistry};
