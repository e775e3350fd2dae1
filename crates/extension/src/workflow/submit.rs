//! Customer form submission.

use concierge_core::{Email, Segment};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{CloseOutcome, Orchestrator};
use crate::error::{WorkflowError, WorkflowStep};
use crate::mapping::patch_str;
use crate::models::{Address, Identity, SessionCustomer};
use crate::sink::FormPayload;

/// Details entered in the create/update customer form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// Segment picked in the form. Blank keeps the session's segment and is
    /// only accepted when one is already resolved.
    pub group: String,
    pub address: Address,
}

impl CustomerForm {
    fn identity(&self) -> Identity {
        Identity {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
        }
    }
}

impl Orchestrator {
    /// Submit the customer form, then close.
    ///
    /// With a segment set the details are sent to the form sink first. A sink
    /// failure is reported on the soft path and the close still runs.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::ValidationFailed` when a required field is
    /// blank, including the segment when the session has none; the extension
    /// stays open so the form can be corrected. Errors
    /// from the close step are returned as well.
    #[instrument(skip_all, fields(email = %form.email))]
    pub async fn submit(&self, form: CustomerForm) -> Result<CloseOutcome, WorkflowError> {
        let customer = self.apply_form(&form).map_err(|e| {
            let e = e.in_step(WorkflowStep::Submission);
            self.raise_error(&e);
            e
        })?;

        if customer.segment.is_unresolved() {
            debug!("No segment set, skipping form sink");
        } else if let Err(e) = self.inner.sink.submit(&FormPayload::from(&customer)).await {
            let e = WorkflowError::from(e).in_step(WorkflowStep::Submission);
            self.raise_error(&e);
        }

        self.close().await
    }

    /// Validate the form and patch it onto the session aggregate.
    fn apply_form(&self, form: &CustomerForm) -> Result<SessionCustomer, WorkflowError> {
        let mut customer = self
            .inner
            .session
            .snapshot()
            .ok_or(WorkflowError::DependencyMissing("session customer"))?;

        let identity = form.identity();
        let group = form.group.trim();
        let mut missing = identity.missing_fields();
        if group.is_empty() && customer.segment.is_unresolved() {
            missing.push("segment");
        }
        if !missing.is_empty() {
            return Err(WorkflowError::ValidationFailed(missing));
        }
        Email::parse(&identity.email).map_err(|_| WorkflowError::ValidationFailed(vec!["email"]))?;

        customer.identity = identity;
        if !group.is_empty() {
            customer.segment = Segment::new(group);
        }
        let address = &mut customer.address;
        patch_str(&mut address.line1, Some(&form.address.line1));
        patch_str(&mut address.line2, Some(&form.address.line2));
        patch_str(&mut address.city, Some(&form.address.city));
        patch_str(&mut address.state, Some(&form.address.state));
        patch_str(&mut address.postcode, Some(&form.address.postcode));
        patch_str(&mut address.country, Some(&form.address.country));

        if !self.inner.session.commit(customer.clone()) {
            return Err(WorkflowError::DependencyMissing("live session"));
        }
        Ok(customer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::bridge::BridgeCall;
    use crate::workflow::fixtures::{Harness, account, record};

    fn form(group: &str) -> CustomerForm {
        CustomerForm {
            first_name: " Sam ".to_string(),
            last_name: "Lee".to_string(),
            email: "sam@example.com".to_string(),
            phone: "0400 333 444".to_string(),
            group: group.to_string(),
            address: Address {
                state: "VIC".to_string(),
                postcode: "3000".to_string(),
                ..Address::default()
            },
        }
    }

    async fn started() -> Harness {
        let harness = Harness::with_account(account("sam@example.com", 5_000));
        harness.orchestrator.startup().await.unwrap().unwrap();
        harness
    }

    #[tokio::test]
    async fn test_submit_sends_form_and_closes() {
        let harness = started().await;

        let outcome = harness.orchestrator.submit(form("VIP")).await.unwrap();

        let submitted = harness.sink.submitted();
        assert_eq!(submitted.len(), 1);
        let payload = submitted.first().unwrap();
        assert_eq!(payload.first_name, "Sam");
        assert_eq!(payload.group, "VIP");
        assert_eq!(payload.postcode, "3000");

        assert!(outcome.consumer_set);
        assert_eq!(outcome.discounts.unwrap().applied.len(), 1);
        assert!(harness.terminal.calls().contains(&BridgeCall::SetConsumer(
            crate::models::Consumer {
                first_name: "Sam".to_string(),
                last_name: "Lee".to_string(),
                phone_number1: "0400 333 444".to_string(),
                email: "sam@example.com".to_string(),
            }
        )));
        assert!(harness.terminal.is_closed());
    }

    #[tokio::test]
    async fn test_blank_segment_is_required_for_new_customer() {
        let harness = started().await;

        let err = harness.orchestrator.submit(form("  ")).await.unwrap_err();

        assert!(matches!(
            err.root(),
            WorkflowError::ValidationFailed(fields) if fields == &vec!["segment"]
        ));
        assert!(harness.sink.submitted().is_empty());
        assert!(!harness.terminal.is_closed());
        assert!(harness.session().is_active());
        assert!(harness.session().get().unwrap().segment.is_unresolved());
    }

    #[tokio::test]
    async fn test_blank_segment_keeps_resolved_segment() {
        let harness = Harness::with_account(account("sam@example.com", 5_000));
        harness.profiles.insert(record("sam@example.com", "VIP"));
        harness.orchestrator.startup().await.unwrap().unwrap();

        let outcome = harness.orchestrator.submit(form("")).await.unwrap();

        let submitted = harness.sink.submitted();
        assert_eq!(submitted.first().unwrap().group, "VIP");
        assert_eq!(outcome.discounts.unwrap().applied.len(), 1);
        assert!(harness.terminal.is_closed());
    }

    #[tokio::test]
    async fn test_missing_fields_keep_extension_open() {
        let harness = started().await;
        let mut incomplete = form("VIP");
        incomplete.phone = "  ".to_string();
        incomplete.last_name = String::new();

        let err = harness.orchestrator.submit(incomplete).await.unwrap_err();

        assert!(matches!(
            err.root(),
            WorkflowError::ValidationFailed(fields) if fields == &vec!["last name", "phone"]
        ));
        assert!(harness.sink.submitted().is_empty());
        assert!(!harness.terminal.is_closed());
        let flags = harness.session().flags();
        assert!(flags.error);
        assert_eq!(
            flags.error_message,
            "Form submission failed: Missing required fields: last name, phone"
        );
    }
}
