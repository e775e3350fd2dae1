//! Session workflow orchestrator.
//!
//! The [`Orchestrator`] drives one terminal session through its steps:
//!
//! - [`startup`] - Begin a session, query the terminal's order, settle the UI
//! - [`resolve`] - Account resolved, profile resolution and manual resolution
//! - [`submit`] - Create/update customer form submission
//! - [`close`] - Finalize the consumer, apply the segment's discounts, close
//! - [`escalation`] - Soft error reporting and the forced close
//!
//! Every step works on a snapshot of the session aggregate and commits it back
//! with a single `set`. Steps started by a session that has since been
//! replaced have their commits discarded by the [`SessionStore`].

pub mod close;
pub mod escalation;
pub mod resolve;
pub mod startup;
pub mod submit;

#[cfg(test)]
pub(crate) mod fixtures;

use std::sync::Arc;

use concierge_core::SessionId;

use crate::bridge::{BridgeClient, TerminalBridge};
use crate::config::ExtensionConfig;
use crate::discount::StrategyRegistry;
use crate::profile::ProfileStore;
use crate::session::{SessionFlags, SessionStore};
use crate::sink::FormSubmissionSink;

pub use close::CloseOutcome;
pub use escalation::EscalationOutcome;
pub use resolve::Resolution;
pub use submit::CustomerForm;

/// External collaborators the orchestrator talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub bridge: Arc<dyn TerminalBridge>,
    pub profiles: Arc<dyn ProfileStore>,
    pub sink: Arc<dyn FormSubmissionSink>,
    pub registry: Arc<StrategyRegistry>,
}

/// Runs the session workflow against injected collaborators.
///
/// Cheap to clone; clones share the same session store and collaborators.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<OrchestratorInner>,
}

struct OrchestratorInner {
    config: ExtensionConfig,
    session: SessionStore,
    bridge: BridgeClient,
    profiles: Arc<dyn ProfileStore>,
    sink: Arc<dyn FormSubmissionSink>,
    registry: Arc<StrategyRegistry>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.inner.config)
            .field("session", &self.inner.session)
            .field("registry", &self.inner.registry)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    #[must_use]
    pub fn new(config: ExtensionConfig, session: SessionStore, collaborators: Collaborators) -> Self {
        let bridge =
            BridgeClient::new(collaborators.bridge).with_toggle_ack_timeout(config.toggle_ack_timeout);
        Self {
            inner: Arc::new(OrchestratorInner {
                config,
                session,
                bridge,
                profiles: collaborators.profiles,
                sink: collaborators.sink,
                registry: collaborators.registry,
            }),
        }
    }

    /// The session store the UI renders from.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn config(&self) -> &ExtensionConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn registry(&self) -> &StrategyRegistry {
        &self.inner.registry
    }

    /// Whether `session_id` is still the live session.
    fn is_current(&self, session_id: SessionId) -> bool {
        self.inner.session.session_id() == Some(session_id)
    }

    /// Update the flags only while `session_id` is live.
    fn update_flags_for(&self, session_id: SessionId, update: impl FnOnce(&mut SessionFlags)) {
        if self.is_current(session_id) {
            self.inner.session.update_flags(update);
        }
    }
}
