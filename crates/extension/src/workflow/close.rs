//! Close: finalize the consumer, apply the segment's discounts, close.

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::Orchestrator;
use crate::discount::{ExecutionReport, execute};
use crate::error::{DISCOUNT_FAILED_MESSAGE, WorkflowError, WorkflowStep};
use crate::models::SessionCustomer;

/// Prefix of the external reference carrying the consumer's email.
pub const EMAIL_REFERENCE_PREFIX: &str = "Email";

/// What closing the session did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CloseOutcome {
    /// The consumer was pushed to the terminal.
    pub consumer_set: bool,
    /// Present when the segment's strategy ran.
    pub discounts: Option<ExecutionReport>,
    /// Messages reported on the soft path while closing.
    pub reported: Vec<String>,
}

impl Orchestrator {
    /// Close the session.
    ///
    /// Failures of the individual sub-steps are reported on the soft path and
    /// do not stop the close; the terminal is always told to close and the
    /// session always ends.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::DependencyMissing` when there is no session
    /// aggregate. The error goes to the soft path, which force closes when no
    /// session is live.
    #[instrument(skip(self))]
    pub async fn close(&self) -> Result<CloseOutcome, WorkflowError> {
        let Some(customer) = self.inner.session.snapshot() else {
            let e = WorkflowError::DependencyMissing("session customer").in_step(WorkflowStep::Close);
            self.raise_error(&e);
            return Err(e);
        };

        let mut outcome = CloseOutcome::default();
        match self.finalize_consumer(&customer) {
            Ok(set) => outcome.consumer_set = set,
            Err(e) => outcome.reported.push(self.report_close(e)),
        }

        if !customer.segment.is_unresolved() {
            match self.apply_strategy(&customer).await {
                Ok(report) => {
                    if !report.rejected.is_empty() {
                        self.report(DISCOUNT_FAILED_MESSAGE.to_string());
                        outcome.reported.push(DISCOUNT_FAILED_MESSAGE.to_string());
                    }
                    outcome.discounts = Some(report);
                }
                Err(e) => outcome.reported.push(self.report_close(e)),
            }
        }

        self.inner.bridge.close();
        self.inner.session.end_session();
        info!(
            consumer_set = outcome.consumer_set,
            reported = outcome.reported.len(),
            "Extension closed"
        );
        Ok(outcome)
    }

    /// Push the consumer to the terminal. Skipped unless the identity is complete.
    fn finalize_consumer(&self, customer: &SessionCustomer) -> Result<bool, WorkflowError> {
        if !customer.identity.is_complete() {
            let missing = customer.identity.missing_fields();
            warn!(?missing, "Identity incomplete, consumer not set");
            return Ok(false);
        }
        self.inner.bridge.set_consumer(&customer.consumer())?;
        self.inner
            .bridge
            .add_external_reference(&customer.identity.email, EMAIL_REFERENCE_PREFIX)?;
        Ok(true)
    }

    async fn apply_strategy(&self, customer: &SessionCustomer) -> Result<ExecutionReport, WorkflowError> {
        let policy = self
            .inner
            .registry
            .get_strategy(&customer.segment)
            .map_err(|_| WorkflowError::StrategyNotFound(customer.segment.clone()))?;
        Ok(execute(&policy, &self.inner.session, &self.inner.bridge).await?)
    }

    fn report_close(&self, error: WorkflowError) -> String {
        let error = error.in_step(WorkflowStep::Close);
        let message = error.to_string();
        self.raise_error(&error);
        message
    }
}
