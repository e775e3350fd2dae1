//! Raw profile records as stored in the profile table.
//!
//! Field names follow the table's snake_case attribute names. Every field is
//! optional; the mapping pipeline only copies values that are present.

use serde::{Deserialize, Serialize};

/// One customer item from the profile table, keyed by email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// Customer group; selects the discount strategy.
    pub group: Option<String>,
    pub customer_id: Option<u64>,
    pub crm_customer_id: Option<String>,
    pub email_status: Option<String>,
    pub notes: Option<String>,
    pub address: Option<AddressRecord>,
    pub booking: Option<BookingRecord>,
    pub commerce_seven: Option<Commerce7Record>,
    pub shopify: Option<ShopifyRecord>,
    pub ecommerce: Option<EcommerceRecord>,
    pub custom_fields: Option<CustomFieldsRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressRecord {
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingRecord {
    pub booking_date_time: Option<String>,
    /// Minutes.
    pub booking_duration: Option<u32>,
    /// `"true"` or `"false"`.
    pub booking_is_vip: Option<String>,
    pub booking_notes: Option<String>,
    pub booking_no_people: Option<u32>,
    pub booking_service_name: Option<String>,
    pub booking_status: Option<String>,
    pub booking_table_name_number: Option<String>,
    pub booking_table_section: Option<String>,
    pub booking_tags_list: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Commerce7Record {
    pub clubs: Option<Vec<String>>,
    pub flags: Option<Vec<String>>,
    pub groups: Option<Vec<String>>,
    pub notifications: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopifyRecord {
    pub customer_state: Option<String>,
    pub marketing_opt_in_level: Option<String>,
    pub marketing_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcommerceRecord {
    pub e_commerce_customer_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub subscription: Option<SubscriptionRecord>,
    pub credit_cards: Option<Vec<CreditCardRecord>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionRecord {
    pub next_subscription_date: Option<String>,
    pub subscription_cancelled_date: Option<String>,
    pub subscription_joined_date: Option<String>,
    pub subscription_status: Option<String>,
    pub subscription_level: Option<String>,
}

/// A stored card. Older items spell the masked number `masked_Card_Number`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditCardRecord {
    pub card_id: Option<String>,
    pub card_brand: Option<String>,
    #[serde(alias = "masked_Card_Number")]
    pub masked_card_number: Option<String>,
    pub expiry_month: Option<u32>,
    pub expiry_year: Option<u32>,
    /// `"true"` or `"false"`.
    pub is_default: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomFieldsRecord {
    pub custom_field_1: Option<String>,
    pub custom_field_2: Option<String>,
    pub custom_field_3: Option<String>,
    pub custom_field_4: Option<String>,
    pub custom_field_5: Option<String>,
}

/// Parse a stored boolean flag. Anything but `true` is false.
pub(crate) fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
