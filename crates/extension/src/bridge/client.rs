//! Future-based wrapper over the callback bridge.

use std::sync::Arc;
use std::time::Duration;

use concierge_core::LineId;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use super::{PosCallback, PosError, PosResponse, TerminalBridge};
use crate::models::{AccountSnapshot, Consumer};

/// Errors from terminal bridge calls.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The call never reached the terminal.
    #[error("{call} could not be dispatched: {source}")]
    Dispatch {
        call: &'static str,
        #[source]
        source: PosError,
    },

    /// The terminal answered with an error.
    #[error("{call} was rejected by the terminal: {source}")]
    Rejected {
        call: &'static str,
        #[source]
        source: PosError,
    },

    /// The terminal answered without data.
    #[error("{0} returned no data")]
    MissingData(&'static str),

    /// The callback was dropped without being invoked.
    #[error("{0} was never answered")]
    Unanswered(&'static str),
}

impl BridgeError {
    /// Whether the terminal received the call and refused it.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// How long a toggle waits for the terminal's answer by default.
pub const DEFAULT_TOGGLE_ACK_TIMEOUT: Duration = Duration::from_secs(2);

/// Async client for a [`TerminalBridge`].
///
/// Cheap to clone.
#[derive(Clone)]
pub struct BridgeClient {
    bridge: Arc<dyn TerminalBridge>,
    toggle_ack_timeout: Duration,
}

impl std::fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeClient")
            .field("toggle_ack_timeout", &self.toggle_ack_timeout)
            .finish_non_exhaustive()
    }
}

impl BridgeClient {
    pub fn new(bridge: Arc<dyn TerminalBridge>) -> Self {
        Self {
            bridge,
            toggle_ack_timeout: DEFAULT_TOGGLE_ACK_TIMEOUT,
        }
    }

    /// Wait at most `timeout` for a toggle's answer.
    #[must_use]
    pub const fn with_toggle_ack_timeout(mut self, timeout: Duration) -> Self {
        self.toggle_ack_timeout = timeout;
        self
    }

    /// Fetch the current order.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the call fails or the terminal sends no data.
    #[instrument(skip(self))]
    pub async fn current_account(&self) -> Result<AccountSnapshot, BridgeError> {
        const CALL: &str = "get_current_account";
        let response = self
            .call(CALL, |callback| self.bridge.get_current_account(callback))
            .await?;
        if let Some(source) = response.error {
            return Err(BridgeError::Rejected { call: CALL, source });
        }
        response.data.ok_or(BridgeError::MissingData(CALL))
    }

    /// Toggle `code` on one line.
    ///
    /// The terminal's answer is advisory. It is awaited for at most the
    /// toggle ack timeout; a late or dropped answer counts as accepted.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Dispatch` if the call could not be sent, or
    /// `BridgeError::Rejected` if the terminal answered with an error in time.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn toggle_discount(&self, code: &str, line_id: &LineId) -> Result<(), BridgeError> {
        const CALL: &str = "toggle_discount";
        let answer = self.send(CALL, |callback| {
            self.bridge.toggle_discount(code, line_id, callback)
        })?;
        self.acknowledge(CALL, answer).await
    }

    /// Toggle an order-level `code`. Answers are handled as for
    /// [`toggle_discount`](Self::toggle_discount).
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Dispatch` if the call could not be sent, or
    /// `BridgeError::Rejected` if the terminal answered with an error in time.
    #[instrument(skip(self))]
    pub async fn toggle_global_discount(&self, code: &str) -> Result<(), BridgeError> {
        const CALL: &str = "toggle_global_discount";
        let answer = self.send(CALL, |callback| {
            self.bridge.toggle_global_discount(code, callback)
        })?;
        self.acknowledge(CALL, answer).await
    }

    /// Attach the consumer to the order.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Dispatch` if the call could not be sent.
    pub fn set_consumer(&self, consumer: &Consumer) -> Result<(), BridgeError> {
        self.bridge
            .set_consumer(consumer)
            .map_err(|source| BridgeError::Dispatch {
                call: "set_consumer",
                source,
            })
    }

    /// Attach an external reference to the order.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Dispatch` if the call could not be sent.
    pub fn add_external_reference(&self, value: &str, prefix: &str) -> Result<(), BridgeError> {
        self.bridge
            .add_external_reference(value, prefix)
            .map_err(|source| BridgeError::Dispatch {
                call: "add_external_reference",
                source,
            })
    }

    /// Close the extension.
    pub fn close(&self) {
        debug!("Closing extension");
        self.bridge.close();
    }

    async fn call<T: Send + 'static>(
        &self,
        name: &'static str,
        dispatch: impl FnOnce(PosCallback<T>) -> Result<(), PosError>,
    ) -> Result<PosResponse<T>, BridgeError> {
        let answer = self.send(name, dispatch)?;
        answer.await.map_err(|_| BridgeError::Unanswered(name))
    }

    fn send<T: Send + 'static>(
        &self,
        name: &'static str,
        dispatch: impl FnOnce(PosCallback<T>) -> Result<(), PosError>,
    ) -> Result<oneshot::Receiver<PosResponse<T>>, BridgeError> {
        let (tx, rx) = oneshot::channel();
        let callback: PosCallback<T> = Box::new(move |response| {
            // The receiver is gone only if the waiting step was dropped.
            let _ = tx.send(response);
        });
        dispatch(callback).map_err(|source| BridgeError::Dispatch { call: name, source })?;
        Ok(rx)
    }

    async fn acknowledge(
        &self,
        call: &'static str,
        answer: oneshot::Receiver<PosResponse<serde_json::Value>>,
    ) -> Result<(), BridgeError> {
        match tokio::time::timeout(self.toggle_ack_timeout, answer).await {
            Ok(Ok(PosResponse {
                error: Some(source),
                ..
            })) => Err(BridgeError::Rejected { call, source }),
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => {
                warn!(call, "Toggle callback dropped, assuming applied");
                Ok(())
            }
            Err(_) => {
                warn!(call, timeout = ?self.toggle_ack_timeout, "Toggle not answered in time, assuming applied");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::bridge::SimulatedTerminal;

    #[tokio::test]
    async fn test_current_account_resolves_callback() {
        let terminal = Arc::new(SimulatedTerminal::with_account(AccountSnapshot {
            name: Some("Table 2".to_string()),
            ..AccountSnapshot::default()
        }));
        let client = BridgeClient::new(terminal);

        let account = client.current_account().await.unwrap();
        assert_eq!(account.name.as_deref(), Some("Table 2"));
    }

    #[tokio::test]
    async fn test_current_account_without_data() {
        let client = BridgeClient::new(Arc::new(SimulatedTerminal::empty()));
        let err = client.current_account().await.unwrap_err();
        assert!(matches!(err, BridgeError::MissingData("get_current_account")));
    }

    #[tokio::test]
    async fn test_rejected_account_query() {
        let terminal = Arc::new(SimulatedTerminal::empty());
        terminal.fail_account_query(PosError::new("offline"));
        let client = BridgeClient::new(terminal);

        let err = client.current_account().await.unwrap_err();
        assert!(err.is_rejection());
        assert!(err.to_string().contains("offline"));
    }

    #[tokio::test]
    async fn test_dispatch_failure() {
        let terminal = Arc::new(SimulatedTerminal::empty());
        terminal.fail_dispatch("set_consumer");
        let client = BridgeClient::new(terminal);

        let err = client.set_consumer(&Consumer::default()).unwrap_err();
        assert!(matches!(err, BridgeError::Dispatch { call: "set_consumer", .. }));
    }

    struct SilentTerminal;

    impl TerminalBridge for SilentTerminal {
        fn get_current_account(
            &self,
            callback: PosCallback<AccountSnapshot>,
        ) -> Result<(), PosError> {
            drop(callback);
            Ok(())
        }
        fn set_consumer(&self, _: &Consumer) -> Result<(), PosError> {
            Ok(())
        }
        fn add_external_reference(&self, _: &str, _: &str) -> Result<(), PosError> {
            Ok(())
        }
        fn toggle_discount(
            &self,
            _: &str,
            _: &LineId,
            _: PosCallback<serde_json::Value>,
        ) -> Result<(), PosError> {
            Ok(())
        }
        fn toggle_global_discount(
            &self,
            _: &str,
            _: PosCallback<serde_json::Value>,
        ) -> Result<(), PosError> {
            Ok(())
        }
        fn close(&self) {}
    }

    #[tokio::test]
    async fn test_dropped_callback_is_unanswered() {
        let client = BridgeClient::new(Arc::new(SilentTerminal));
        let err = client.current_account().await.unwrap_err();
        assert!(matches!(err, BridgeError::Unanswered("get_current_account")));
    }

    #[tokio::test]
    async fn test_dropped_toggle_callback_counts_as_applied() {
        let client = BridgeClient::new(Arc::new(SilentTerminal));
        client.toggle_global_discount("VIP").await.unwrap();
        client.toggle_discount("ClubGold", &LineId::new("L1")).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_held_toggle_answer_times_out() {
        let terminal = Arc::new(SimulatedTerminal::with_account(AccountSnapshot::default()));
        terminal.hold_toggle_answers();
        let client = BridgeClient::new(terminal.clone())
            .with_toggle_ack_timeout(Duration::from_millis(250));

        let started = tokio::time::Instant::now();
        client.toggle_global_discount("VIP").await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(250));
        assert_eq!(terminal.account().unwrap().discounts, vec!["VIP".to_string()]);
    }

    #[tokio::test]
    async fn test_toggle_dispatch_failure() {
        let terminal = Arc::new(SimulatedTerminal::with_account(AccountSnapshot::default()));
        terminal.fail_dispatch("toggle_global_discount");
        let client = BridgeClient::new(terminal);

        let err = client.toggle_global_discount("VIP").await.unwrap_err();
        assert!(matches!(err, BridgeError::Dispatch { call: "toggle_global_discount", .. }));
    }
}
