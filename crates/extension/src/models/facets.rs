//! Optional integration facets of the session customer.
//!
//! Each facet is populated independently by its mapper unit and only when
//! the matching integration is enabled.

use serde::{Deserialize, Serialize};

/// Loyalty / e-commerce facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ECommerceFacet {
    pub customer_id: String,
    pub tags: Vec<String>,
    pub subscription: Subscription,
    /// Stored payment instruments.
    pub cards: Vec<CreditCard>,
}

/// Club or subscription membership state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub status: String,
    pub next_date: String,
    pub joined_date: String,
    pub cancelled_date: String,
    pub level: String,
}

/// A stored card, masked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    pub card_id: String,
    pub card_brand: String,
    pub masked_card_number: String,
    pub expiry_month: u32,
    pub expiry_year: u32,
    pub is_default: bool,
}

/// CRM facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmFacet {
    pub customer_id: String,
    pub email_status: String,
    pub notes: String,
}

/// Reservation attributes from the booking platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingFacet {
    pub status: String,
    pub date_time: String,
    pub party_size: u32,
    pub notes: String,
    pub service_name: String,
    pub table_name_number: String,
    pub table_section: String,
    /// Minutes.
    pub duration: u32,
    pub tags: Vec<String>,
    pub is_vip: bool,
}

/// Five free-text custom field slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFields {
    pub field_1: String,
    pub field_2: String,
    pub field_3: String,
    pub field_4: String,
    pub field_5: String,
}

/// Platform-specific e-commerce facet. Exactly one variant per deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform")]
pub enum PlatformFacet {
    Commerce7(Commerce7Facet),
    Shopify(ShopifyFacet),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commerce7Facet {
    pub clubs: Vec<String>,
    pub flags: Vec<String>,
    pub groups: Vec<String>,
    pub notifications: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopifyFacet {
    pub customer_state: String,
    pub marketing_opt_in_level: String,
    pub marketing_state: String,
}

impl Default for ShopifyFacet {
    fn default() -> Self {
        Self {
            customer_state: "UNKNOWN".to_string(),
            marketing_opt_in_level: "UNKNOWN".to_string(),
            marketing_state: "INVALID".to_string(),
        }
    }
}
