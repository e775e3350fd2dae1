//! Concierge Extension library.
//!
//! Runs inside a point-of-sale terminal session. Identifies the shopper on the
//! open order, loads their profile, lets staff search for or create a
//! customer, and applies the discount policy of the shopper's segment before
//! closing.
//!
//! # Modules
//!
//! - [`workflow`] - The session workflow [`Orchestrator`]
//! - [`session`] - Session store and UI flags
//! - [`bridge`] - Terminal bridge trait, future-based client, simulated terminal
//! - [`profile`] - Profile records, profile store and customer search
//! - [`mapping`] - Profile record to session customer pipeline
//! - [`discount`] - Discount policies, strategy registry and executor
//! - [`sink`] - Form submission sinks
//! - [`config`] - Environment configuration
//! - [`error`] - Workflow errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod bridge;
pub mod config;
pub mod discount;
pub mod error;
pub mod mapping;
pub mod models;
pub mod profile;
pub mod session;
pub mod sink;
pub mod workflow;

pub use config::ExtensionConfig;
pub use error::{WorkflowError, WorkflowStep};
pub use session::SessionStore;
pub use workflow::{Collaborators, Orchestrator};
