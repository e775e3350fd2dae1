use concierge_core::Segment;

use super::patch_str;
use crate::config::IntegrationConfig;
use crate::models::{CustomFields, SessionCustomer};
use crate::profile::ProfileRecord;

/// Identity, segment, address and custom fields. Always runs first.
pub(super) fn map_base(
    record: &ProfileRecord,
    customer: &mut SessionCustomer,
    _integrations: &IntegrationConfig,
) {
    let identity = &mut customer.identity;
    patch_str(&mut identity.email, record.email.as_ref());
    patch_str(&mut identity.first_name, record.first_name.as_ref());
    patch_str(&mut identity.last_name, record.last_name.as_ref());
    patch_str(&mut identity.phone, record.phone.as_ref());

    if let Some(group) = record.group.as_deref().filter(|g| !g.trim().is_empty()) {
        customer.segment = Segment::new(group);
    }

    if let Some(address) = &record.address {
        let target = &mut customer.address;
        patch_str(&mut target.line1, address.street1.as_ref());
        patch_str(&mut target.line2, address.street2.as_ref());
        patch_str(&mut target.city, address.city.as_ref());
        patch_str(&mut target.state, address.state.as_ref());
        patch_str(&mut target.postcode, address.postcode.as_ref());
        patch_str(&mut target.country, address.country.as_ref());
    }

    if let Some(fields) = &record.custom_fields {
        let target = customer
            .custom_fields
            .get_or_insert_with(CustomFields::default);
        patch_str(&mut target.field_1, fields.custom_field_1.as_ref());
        patch_str(&mut target.field_2, fields.custom_field_2.as_ref());
        patch_str(&mut target.field_3, fields.custom_field_3.as_ref());
        patch_str(&mut target.field_4, fields.custom_field_4.as_ref());
        patch_str(&mut target.field_5, fields.custom_field_5.as_ref());
    }
}
