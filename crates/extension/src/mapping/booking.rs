use super::{patch_list, patch_num, patch_str};
use crate::config::IntegrationConfig;
use crate::models::{BookingFacet, SessionCustomer};
use crate::profile::{ProfileRecord, parse_flag};

/// Reservation details. Some attributes only exist on some platforms.
pub(super) fn map_booking(
    record: &ProfileRecord,
    customer: &mut SessionCustomer,
    integrations: &IntegrationConfig,
) {
    let (Some(platform), Some(source)) = (integrations.bookings, &record.booking) else {
        return;
    };

    let target = customer.booking.get_or_insert_with(BookingFacet::default);
    patch_str(&mut target.status, source.booking_status.as_ref());
    patch_str(&mut target.date_time, source.booking_date_time.as_ref());
    patch_num(&mut target.party_size, source.booking_no_people);
    patch_str(&mut target.notes, source.booking_notes.as_ref());
    patch_str(
        &mut target.table_name_number,
        source.booking_table_name_number.as_ref(),
    );
    patch_str(&mut target.table_section, source.booking_table_section.as_ref());
    patch_list(&mut target.tags, source.booking_tags_list.as_ref());

    if platform.has_service_name() {
        patch_str(&mut target.service_name, source.booking_service_name.as_ref());
    }
    if platform.has_vip_flag() {
        if let Some(flag) = source.booking_is_vip.as_deref() {
            target.is_vip = parse_flag(flag);
        }
    }
    if platform.has_duration() {
        patch_num(&mut target.duration, source.booking_duration);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use concierge_core::{BookingPlatform, SessionId};

    use super::*;
    use crate::profile::BookingRecord;

    fn record() -> ProfileRecord {
        ProfileRecord {
            booking: Some(BookingRecord {
                booking_status: Some("Seated".to_string()),
                booking_no_people: Some(4),
                booking_service_name: Some("Dinner".to_string()),
                booking_is_vip: Some("true".to_string()),
                booking_duration: Some(90),
                booking_tags_list: Some(vec!["Anniversary".to_string()]),
                ..BookingRecord::default()
            }),
            ..ProfileRecord::default()
        }
    }

    fn mapped(platform: BookingPlatform) -> BookingFacet {
        let mut customer = SessionCustomer::new(SessionId::generate());
        let integrations = IntegrationConfig {
            bookings: Some(platform),
            ..IntegrationConfig::default()
        };
        map_booking(&record(), &mut customer, &integrations);
        customer.booking.unwrap()
    }

    #[test]
    fn test_common_fields() {
        let facet = mapped(BookingPlatform::OpenTable);
        assert_eq!(facet.status, "Seated");
        assert_eq!(facet.party_size, 4);
        assert_eq!(facet.tags, vec!["Anniversary".to_string()]);
    }

    #[test]
    fn test_open_table_fields() {
        let facet = mapped(BookingPlatform::OpenTable);
        assert_eq!(facet.service_name, "Dinner");
        assert!(!facet.is_vip);
        assert_eq!(facet.duration, 0);
    }

    #[test]
    fn test_seven_rooms_fields() {
        let facet = mapped(BookingPlatform::SevenRooms);
        assert!(facet.service_name.is_empty());
        assert!(facet.is_vip);
        assert_eq!(facet.duration, 90);
    }

    #[test]
    fn test_now_book_it_fields() {
        let facet = mapped(BookingPlatform::NowBookIt);
        assert_eq!(facet.service_name, "Dinner");
        assert!(!facet.is_vip);
        assert_eq!(facet.duration, 90);
    }
}
