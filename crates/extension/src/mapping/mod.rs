//! Profile mapping pipeline.
//!
//! A profile record is copied onto the session customer by an ordered list of
//! patch functions. The base unit always runs first; the e-commerce, booking
//! and CRM units follow when their integration is enabled. Every unit reads
//! only its own part of the record and only overwrites a target field when
//! the source value is present and non-empty, so running the pipeline twice
//! gives the same result as running it once.

mod base;
mod booking;
mod crm;
mod ecommerce;

use tracing::debug;

use crate::config::IntegrationConfig;
use crate::models::SessionCustomer;
use crate::profile::ProfileRecord;

/// One mapper unit.
pub type MapperFn = fn(&ProfileRecord, &mut SessionCustomer, &IntegrationConfig);

/// The units to run for `integrations`, in order.
#[must_use]
pub fn pipeline(integrations: &IntegrationConfig) -> Vec<MapperFn> {
    let mut units: Vec<MapperFn> = vec![base::map_base];
    if integrations.ecommerce.is_some() {
        units.push(ecommerce::map_ecommerce);
    }
    if integrations.bookings.is_some() {
        units.push(booking::map_booking);
    }
    if integrations.crm {
        units.push(crm::map_crm);
    }
    units
}

/// Patch `record` onto `customer`.
pub fn map_profile(
    record: &ProfileRecord,
    customer: &mut SessionCustomer,
    integrations: &IntegrationConfig,
) {
    let units = pipeline(integrations);
    debug!(units = units.len(), "Mapping profile record");
    for unit in units {
        unit(record, customer, integrations);
    }
}

/// Overwrite `target` when `source` holds a non-empty string.
pub(crate) fn patch_str(target: &mut String, source: Option<&String>) {
    if let Some(value) = source.filter(|value| !value.trim().is_empty()) {
        target.clone_from(value);
    }
}

/// Overwrite `target` when `source` holds a non-empty list.
fn patch_list(target: &mut Vec<String>, source: Option<&Vec<String>>) {
    if let Some(values) = source.filter(|values| !values.is_empty()) {
        target.clone_from(values);
    }
}

/// Overwrite `target` when `source` holds a non-zero number.
fn patch_num(target: &mut u32, source: Option<u32>) {
    if let Some(value) = source.filter(|value| *value != 0) {
        *target = value;
    }
}
