//! Core types for the concierge.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod amount;
pub mod email;
pub mod id;
pub mod integration;
pub mod segment;

pub use amount::Amount;
pub use email::{Email, EmailError};
pub use id::*;
pub use integration::{BookingPlatform, EcommercePlatform, IntegrationParseError};
pub use segment::Segment;
