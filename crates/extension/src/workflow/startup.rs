//! Startup: begin a session and query the terminal's order.

use concierge_core::SessionId;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{Orchestrator, Resolution};
use crate::error::WorkflowError;
use crate::models::SessionCustomer;

impl Orchestrator {
    /// Begin a new session.
    ///
    /// Installs a fresh aggregate, asks the terminal for its current order and
    /// returns immediately. The returned handle resolves once account and
    /// profile resolution have finished. A separate settle task clears the
    /// loading flag after the configured delay.
    ///
    /// A session started while another is running replaces it; results that
    /// arrive for the older session are discarded.
    pub fn startup(&self) -> JoinHandle<Result<Resolution, WorkflowError>> {
        let session_id = SessionId::generate();
        info!(%session_id, "Starting session");
        self.inner
            .session
            .begin_session(SessionCustomer::new(session_id));

        let settle = self.clone();
        tokio::spawn(async move { settle.settle(session_id).await });

        let this = self.clone();
        tokio::spawn(async move {
            let response = this.inner.bridge.current_account().await;
            this.on_account_resolved(session_id, response).await
        })
    }

    async fn settle(&self, session_id: SessionId) {
        tokio::time::sleep(self.inner.config.settle_delay).await;
        if self.is_current(session_id) {
            debug!(%session_id, "Session settled");
            self.update_flags_for(session_id, |flags| flags.loading = false);
        }
    }
}
