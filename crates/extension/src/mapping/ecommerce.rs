use concierge_core::EcommercePlatform;

use super::{patch_list, patch_str};
use crate::config::IntegrationConfig;
use crate::models::{
    Commerce7Facet, CreditCard, ECommerceFacet, PlatformFacet, SessionCustomer, ShopifyFacet,
};
use crate::profile::{CreditCardRecord, ProfileRecord, parse_flag};

/// Loyalty data and the platform facet of the configured e-commerce platform.
pub(super) fn map_ecommerce(
    record: &ProfileRecord,
    customer: &mut SessionCustomer,
    integrations: &IntegrationConfig,
) {
    let Some(platform) = integrations.ecommerce else {
        return;
    };

    if let Some(source) = &record.ecommerce {
        let target = customer
            .ecommerce
            .get_or_insert_with(ECommerceFacet::default);
        patch_str(&mut target.customer_id, source.e_commerce_customer_id.as_ref());
        patch_list(&mut target.tags, source.tags.as_ref());

        if let Some(subscription) = &source.subscription {
            let sub = &mut target.subscription;
            patch_str(&mut sub.next_date, subscription.next_subscription_date.as_ref());
            patch_str(&mut sub.joined_date, subscription.subscription_joined_date.as_ref());
            patch_str(
                &mut sub.cancelled_date,
                subscription.subscription_cancelled_date.as_ref(),
            );
            patch_str(&mut sub.status, subscription.subscription_status.as_ref());
            patch_str(&mut sub.level, subscription.subscription_level.as_ref());
        }

        if let Some(cards) = source.credit_cards.as_ref().filter(|c| !c.is_empty()) {
            target.cards = cards.iter().map(card).collect();
        }
    }

    match platform {
        EcommercePlatform::Commerce7 => map_commerce7(record, customer),
        EcommercePlatform::Shopify => map_shopify(record, customer),
    }
}

fn card(source: &CreditCardRecord) -> CreditCard {
    CreditCard {
        card_id: source.card_id.clone().unwrap_or_default(),
        card_brand: source.card_brand.clone().unwrap_or_default(),
        masked_card_number: source.masked_card_number.clone().unwrap_or_default(),
        expiry_month: source.expiry_month.unwrap_or_default(),
        expiry_year: source.expiry_year.unwrap_or_default(),
        is_default: source.is_default.as_deref().is_some_and(parse_flag),
    }
}

fn map_commerce7(record: &ProfileRecord, customer: &mut SessionCustomer) {
    let Some(source) = &record.commerce_seven else {
        return;
    };
    if !matches!(customer.platform, Some(PlatformFacet::Commerce7(_))) {
        customer.platform = Some(PlatformFacet::Commerce7(Commerce7Facet::default()));
    }
    if let Some(PlatformFacet::Commerce7(target)) = customer.platform.as_mut() {
        patch_list(&mut target.clubs, source.clubs.as_ref());
        patch_list(&mut target.flags, source.flags.as_ref());
        patch_list(&mut target.groups, source.groups.as_ref());
        patch_list(&mut target.notifications, source.notifications.as_ref());
    }
}

fn map_shopify(record: &ProfileRecord, customer: &mut SessionCustomer) {
    let Some(source) = &record.shopify else {
        return;
    };
    if !matches!(customer.platform, Some(PlatformFacet::Shopify(_))) {
        customer.platform = Some(PlatformFacet::Shopify(ShopifyFacet::default()));
    }
    if let Some(PlatformFacet::Shopify(target)) = customer.platform.as_mut() {
        patch_str(&mut target.customer_state, source.customer_state.as_ref());
        patch_str(
            &mut target.marketing_opt_in_level,
            source.marketing_opt_in_level.as_ref(),
        );
        patch_str(&mut target.marketing_state, source.marketing_state.as_ref());
    }
}
