//! Terminal bridge: the host point-of-sale surface the extension drives.
//!
//! The host exposes callback-style functions. [`TerminalBridge`] models that
//! surface directly; [`BridgeClient`] wraps each callback in a single-shot
//! future so workflow steps can `await` the answer.

mod client;
mod simulated;

pub use client::{BridgeClient, BridgeError, DEFAULT_TOGGLE_ACK_TIMEOUT};
pub use simulated::{BridgeCall, SimulatedTerminal};

use concierge_core::LineId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AccountSnapshot, Consumer};

/// Error reported by the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct PosError {
    pub message: String,
}

impl PosError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response delivered to a bridge callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosResponse<T> {
    pub error: Option<PosError>,
    pub data: Option<T>,
}

impl<T> PosResponse<T> {
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            error: None,
            data: Some(data),
        }
    }

    #[must_use]
    pub const fn err(error: PosError) -> Self {
        Self {
            error: Some(error),
            data: None,
        }
    }
}

/// One-shot callback handed to the terminal.
pub type PosCallback<T> = Box<dyn FnOnce(PosResponse<T>) + Send + 'static>;

/// The host terminal's function surface.
///
/// Every call returns immediately. Calls that produce a result answer through
/// their callback, exactly once. A synchronous `Err` means the call could not
/// be dispatched at all.
pub trait TerminalBridge: Send + Sync {
    /// Fetch the current order.
    ///
    /// # Errors
    ///
    /// Returns `PosError` if the call could not be dispatched.
    fn get_current_account(&self, callback: PosCallback<AccountSnapshot>) -> Result<(), PosError>;

    /// Attach a consumer to the current order.
    ///
    /// # Errors
    ///
    /// Returns `PosError` if the call could not be dispatched.
    fn set_consumer(&self, consumer: &Consumer) -> Result<(), PosError>;

    /// Attach an external reference (`prefix` names its kind).
    ///
    /// # Errors
    ///
    /// Returns `PosError` if the call could not be dispatched.
    fn add_external_reference(&self, value: &str, prefix: &str) -> Result<(), PosError>;

    /// Apply or remove `code` on one line.
    ///
    /// # Errors
    ///
    /// Returns `PosError` if the call could not be dispatched.
    fn toggle_discount(
        &self,
        code: &str,
        line_id: &LineId,
        callback: PosCallback<serde_json::Value>,
    ) -> Result<(), PosError>;

    /// Apply or remove an order-level `code`.
    ///
    /// # Errors
    ///
    /// Returns `PosError` if the call could not be dispatched.
    fn toggle_global_discount(
        &self,
        code: &str,
        callback: PosCallback<serde_json::Value>,
    ) -> Result<(), PosError>;

    /// Hand control back to the host and close the extension.
    fn close(&self);
}
