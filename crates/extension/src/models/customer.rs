//! The session customer aggregate.

use concierge_core::{Segment, SessionId};
use serde::{Deserialize, Serialize};

use super::facets::{BookingFacet, CrmFacet, CustomFields, ECommerceFacet, PlatformFacet};
use super::transaction::{ActiveTransaction, Consumer};

/// Shopper identity. The email is the canonical lookup key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl Identity {
    /// Names of the required identity fields that are blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Whether all four required fields are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
}

/// The shopper for the current terminal session.
///
/// One aggregate lives per session. Workflow steps take a snapshot, change
/// it, and commit it back to the [`SessionStore`](crate::session::SessionStore)
/// in a single `set`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCustomer {
    /// The Startup run this aggregate belongs to.
    pub session_id: SessionId,
    pub segment: Segment,
    pub identity: Identity,
    pub address: Address,
    /// `None` until the terminal has answered the account query.
    pub active_transaction: Option<ActiveTransaction>,
    pub ecommerce: Option<ECommerceFacet>,
    pub crm: Option<CrmFacet>,
    pub booking: Option<BookingFacet>,
    pub custom_fields: Option<CustomFields>,
    pub platform: Option<PlatformFacet>,
}

impl SessionCustomer {
    /// A blank aggregate for a new session.
    #[must_use]
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            segment: Segment::unresolved(),
            identity: Identity::default(),
            address: Address::default(),
            active_transaction: None,
            ecommerce: None,
            crm: None,
            booking: None,
            custom_fields: None,
            platform: None,
        }
    }

    /// A fresh aggregate for a re-identified shopper.
    ///
    /// Profile data is dropped; the session and the mirrored order are kept.
    #[must_use]
    pub fn reidentified(&self) -> Self {
        Self {
            active_transaction: self.active_transaction.clone(),
            ..Self::new(self.session_id)
        }
    }

    /// The consumer record pushed to the terminal on close.
    #[must_use]
    pub fn consumer(&self) -> Consumer {
        Consumer {
            first_name: self.identity.first_name.clone(),
            last_name: self.identity.last_name.clone(),
            phone_number1: self.identity.phone.clone(),
            email: self.identity.email.clone(),
        }
    }
}
