//! Account resolution, profile resolution and manual resolution.

use concierge_core::{Email, SessionId};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::Orchestrator;
use crate::bridge::BridgeError;
use crate::error::{WorkflowError, WorkflowStep};
use crate::mapping::map_profile;
use crate::models::{AccountSnapshot, ActiveTransaction};
use crate::profile::StoreKey;
use crate::session::SessionFlags;

/// Where a resolution step left the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// No usable email; the shopper search is open.
    Search,
    /// No profile for the email; the create form is open.
    Create,
    /// A profile was mapped onto the session.
    Ready,
    /// The session was replaced while the step ran; nothing was committed.
    Superseded,
}

impl Orchestrator {
    #[instrument(skip(self, response), fields(%session_id))]
    pub(crate) async fn on_account_resolved(
        &self,
        session_id: SessionId,
        response: Result<AccountSnapshot, BridgeError>,
    ) -> Result<Resolution, WorkflowError> {
        match self.apply_account(session_id, response) {
            Ok(true) => {}
            Ok(false) => return Ok(Resolution::Superseded),
            Err(e) => {
                let e = e.in_step(WorkflowStep::AccountResolution);
                self.report_for(session_id, &e);
                return Err(e);
            }
        }
        self.resolve_profile_for(session_id).await
    }

    /// Re-run profile resolution for the live session.
    ///
    /// # Errors
    ///
    /// Returns the error that was reported on the soft path.
    pub async fn resolve_profile(&self) -> Result<Resolution, WorkflowError> {
        let Some(session_id) = self.inner.session.session_id() else {
            let e = WorkflowError::DependencyMissing("session").in_step(WorkflowStep::ProfileResolution);
            self.raise_error(&e);
            return Err(e);
        };
        self.resolve_profile_for(session_id).await
    }

    /// Load the profile picked from the search results.
    ///
    /// The shopper is re-identified: profile data of the previous aggregate is
    /// dropped and the order mirror is kept. When no profile exists the create
    /// form opens with the email filled in.
    ///
    /// # Errors
    ///
    /// Returns the error that was reported on the soft path.
    #[instrument(skip(self))]
    pub async fn select_search_result(&self, email: &str) -> Result<Resolution, WorkflowError> {
        self.load_selected(email).await.map_err(|e| {
            let e = e.in_step(WorkflowStep::ManualResolution);
            self.raise_error(&e);
            e
        })
    }

    /// Patch the terminal's order into the session aggregate.
    ///
    /// Returns `false` when the session was replaced in the meantime.
    fn apply_account(
        &self,
        session_id: SessionId,
        response: Result<AccountSnapshot, BridgeError>,
    ) -> Result<bool, WorkflowError> {
        let snapshot = response?;
        let session = &self.inner.session;
        let Some(mut customer) = session.snapshot().filter(|c| c.session_id == session_id) else {
            if session.is_active() {
                debug!("Account resolved for a replaced session");
                return Ok(false);
            }
            return Err(WorkflowError::DependencyMissing("session customer"));
        };

        match customer.active_transaction.as_mut() {
            Some(transaction) => transaction.apply_snapshot(snapshot),
            None => customer.active_transaction = Some(ActiveTransaction::from_snapshot(snapshot)),
        }
        Ok(session.commit(customer))
    }

    async fn resolve_profile_for(&self, session_id: SessionId) -> Result<Resolution, WorkflowError> {
        self.lookup_profile(session_id).await.map_err(|e| {
            let e = e.in_step(WorkflowStep::ProfileResolution);
            self.report_for(session_id, &e);
            e
        })
    }

    #[instrument(skip(self), fields(%session_id))]
    async fn lookup_profile(&self, session_id: SessionId) -> Result<Resolution, WorkflowError> {
        let session = &self.inner.session;
        let Some(mut customer) = session.snapshot().filter(|c| c.session_id == session_id) else {
            if session.is_active() {
                return Ok(Resolution::Superseded);
            }
            return Err(WorkflowError::DependencyMissing("session customer"));
        };
        self.update_flags_for(session_id, |flags| flags.loading = true);

        let Some(email) = customer
            .active_transaction
            .as_ref()
            .and_then(ActiveTransaction::consumer_email)
            .map(str::to_owned)
        else {
            info!("Order has no consumer email, opening search");
            self.update_flags_for(session_id, SessionFlags::enter_search);
            return Ok(Resolution::Search);
        };

        let key = StoreKey::by_email(&self.inner.config.profile_table, &email);
        let Some(record) = self.inner.profiles.get(&key).await? else {
            info!(email = %email, "No profile found, opening create form");
            self.update_flags_for(session_id, SessionFlags::enter_create);
            return Ok(Resolution::Create);
        };

        map_profile(&record, &mut customer, &self.inner.config.integrations);
        if !session.commit(customer) {
            return Ok(Resolution::Superseded);
        }
        info!(email = %email, "Profile resolved");
        self.update_flags_for(session_id, SessionFlags::mark_ready);
        Ok(Resolution::Ready)
    }

    async fn load_selected(&self, email: &str) -> Result<Resolution, WorkflowError> {
        let email = Email::parse(email).map_err(|_| WorkflowError::ValidationFailed(vec!["email"]))?;
        let session = &self.inner.session;
        let current = session
            .snapshot()
            .ok_or(WorkflowError::DependencyMissing("session customer"))?;
        let session_id = current.session_id;
        self.update_flags_for(session_id, |flags| flags.loading = true);

        let key = StoreKey::by_email(&self.inner.config.profile_table, &email);
        let record = self.inner.profiles.get(&key).await?;

        let mut customer = current.reidentified();
        let resolution = match record {
            Some(record) => {
                map_profile(&record, &mut customer, &self.inner.config.integrations);
                Resolution::Ready
            }
            None => {
                customer.identity.email = email.as_str().to_owned();
                Resolution::Create
            }
        };
        if !session.commit(customer) {
            return Ok(Resolution::Superseded);
        }

        info!(email = %email, ?resolution, "Search result loaded");
        match resolution {
            Resolution::Ready => self.update_flags_for(session_id, SessionFlags::mark_ready),
            _ => self.update_flags_for(session_id, SessionFlags::enter_create),
        }
        Ok(resolution)
    }
}
