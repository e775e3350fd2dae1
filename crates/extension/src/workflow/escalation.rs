//! Soft error reporting and the forced close.

use concierge_core::SessionId;
use serde::Serialize;
use tracing::{error, warn};

use super::Orchestrator;
use crate::error::WorkflowError;

/// How an error was surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EscalationOutcome {
    /// The error banner is showing and the extension stays open.
    Reported { message: String },
    /// Nothing could show the error, so the extension was closed.
    ForcedClose,
    /// The error belonged to a session that has since been replaced.
    Dropped,
}

impl Orchestrator {
    /// Report `error` on the soft path.
    ///
    /// Sets the error banner and clears `loading`. Without an active session
    /// there is nowhere to show the error and the extension is force closed.
    pub fn raise_error(&self, error: &WorkflowError) -> EscalationOutcome {
        self.report(error.to_string())
    }

    /// Close the extension after an error. Never fails.
    pub fn close_after_error(&self) {
        let session = &self.inner.session;
        warn!(session_id = ?session.session_id(), "Force closing extension");
        if session.is_active() || session.get().is_some() {
            session.clear_all();
        }
        self.inner.bridge.close();
    }

    /// Soft path for a plain message.
    pub(crate) fn report(&self, message: String) -> EscalationOutcome {
        let session = &self.inner.session;
        if !session.is_active() {
            let failure = WorkflowError::EscalationFailure(format!(
                "no active session to report \"{message}\""
            ));
            error!(error = %failure, "Falling back to forced close");
            self.close_after_error();
            return EscalationOutcome::ForcedClose;
        }

        error!(message = %message, "Workflow error");
        session.update_flags(|flags| flags.raise_error(message.clone()));
        EscalationOutcome::Reported { message }
    }

    /// Soft path for an error raised by `session_id`.
    ///
    /// Errors from a replaced session are logged and dropped so they never
    /// reach the live session's banner.
    pub(crate) fn report_for(&self, session_id: SessionId, error: &WorkflowError) -> EscalationOutcome {
        if self.inner.session.is_active() && !self.is_current(session_id) {
            warn!(%session_id, error = %error, "Dropping error from replaced session");
            return EscalationOutcome::Dropped;
        }
        self.raise_error(error)
    }
}

#[cfg(test)]
mod tests {
    use concierge_core::SessionId;

    use super::*;
    use crate::bridge::BridgeCall;
    use crate::models::SessionCustomer;
    use crate::workflow::fixtures::Harness;

    #[test]
    fn test_soft_path_sets_banner() {
        let harness = Harness::new();
        harness
            .session()
            .begin_session(SessionCustomer::new(SessionId::generate()));

        let outcome = harness
            .orchestrator
            .raise_error(&WorkflowError::DependencyMissing("session customer"));

        assert_eq!(
            outcome,
            EscalationOutcome::Reported {
                message: "Missing dependency: session customer".to_string()
            }
        );
        let flags = harness.session().flags();
        assert!(flags.error);
        assert!(!flags.loading);
        assert_eq!(flags.error_message, "Missing dependency: session customer");
        assert!(!harness.terminal.is_closed());
    }

    #[test]
    fn test_soft_path_without_session_force_closes() {
        let harness = Harness::new();

        let outcome = harness
            .orchestrator
            .raise_error(&WorkflowError::DependencyMissing("session customer"));

        assert_eq!(outcome, EscalationOutcome::ForcedClose);
        assert_eq!(harness.terminal.calls(), vec![BridgeCall::Close]);
    }

    #[test]
    fn test_close_after_error_clears_session() {
        let harness = Harness::new();
        harness
            .session()
            .begin_session(SessionCustomer::new(SessionId::generate()));

        harness.orchestrator.close_after_error();

        assert!(harness.session().get().is_none());
        assert!(!harness.session().is_active());
        assert!(harness.terminal.is_closed());
    }

    #[test]
    fn test_errors_from_replaced_session_are_dropped() {
        let harness = Harness::new();
        let stale = SessionId::generate();
        harness
            .session()
            .begin_session(SessionCustomer::new(SessionId::generate()));

        let outcome = harness
            .orchestrator
            .report_for(stale, &WorkflowError::DependencyMissing("session customer"));

        assert_eq!(outcome, EscalationOutcome::Dropped);
        assert!(!harness.session().flags().error);
    }
}
