use super::patch_str;
use crate::config::IntegrationConfig;
use crate::models::{CrmFacet, SessionCustomer};
use crate::profile::ProfileRecord;

pub(super) fn map_crm(
    record: &ProfileRecord,
    customer: &mut SessionCustomer,
    integrations: &IntegrationConfig,
) {
    if !integrations.crm {
        return;
    }
    let present = [&record.crm_customer_id, &record.email_status, &record.notes]
        .into_iter()
        .flatten()
        .any(|value| !value.trim().is_empty());
    if !present {
        return;
    }

    let target = customer.crm.get_or_insert_with(CrmFacet::default);
    patch_str(&mut target.customer_id, record.crm_customer_id.as_ref());
    patch_str(&mut target.email_status, record.email_status.as_ref());
    patch_str(&mut target.notes, record.notes.as_ref());
}
