//! Concierge Core - Shared domain types.
//!
//! This crate provides the types shared by every concierge component:
//! - `extension` - Session workflow, profile mapping and discount engine
//! - `cli` - Simulator and operator tooling
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no terminal bridge, no
//! profile store clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for emails, segments, IDs, amounts and integration selectors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
