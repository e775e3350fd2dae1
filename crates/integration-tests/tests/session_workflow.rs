//! Session workflow scenarios, Startup through Close.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use concierge_extension::bridge::BridgeCall;
use concierge_extension::discount::Toggle;
use concierge_extension::models::{Address, Consumer};
use concierge_extension::profile::{CustomerSearch, SearchOutcome};
use concierge_extension::workflow::{CustomerForm, Resolution};
use concierge_integration_tests::{TestContext, wine_and_food};

// ============================================================================
// Known shopper
// ============================================================================

#[tokio::test]
async fn test_known_member_gets_club_discount_on_close() {
    let ctx = TestContext::new(wine_and_food(Some("jane@example.com"), 10_000));

    let resolution = ctx.orchestrator.startup().await.unwrap().unwrap();
    assert_eq!(resolution, Resolution::Ready);

    let customer = ctx.session().get().unwrap();
    assert_eq!(customer.segment.as_str(), "Club Gold");
    assert_eq!(customer.identity.last_name, "Doe");
    assert_eq!(customer.address.line1, "1 Vine St");

    let outcome = ctx.orchestrator.close().await.unwrap();
    assert!(outcome.consumer_set);
    assert!(outcome.reported.is_empty());

    let account = ctx.terminal.account().unwrap();
    let lines = account.transaction_lines.unwrap();
    assert_eq!(lines.first().unwrap().discounts, vec!["ClubGold".to_string()]);
    assert!(lines.get(1).unwrap().discounts.is_empty());
    assert_eq!(
        account.consumer,
        Some(Consumer {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone_number1: "0400 111 222".to_string(),
            email: "jane@example.com".to_string(),
        })
    );
    assert_eq!(ctx.terminal.calls().last(), Some(&BridgeCall::Close));
    assert!(!ctx.session().is_active());
}

#[tokio::test]
async fn test_close_without_phone_still_applies_strategy() {
    let ctx = TestContext::new(wine_and_food(Some("no.phone@example.com"), 10_000));
    ctx.orchestrator.startup().await.unwrap().unwrap();

    let outcome = ctx.orchestrator.close().await.unwrap();

    assert!(!outcome.consumer_set);
    let calls = ctx.terminal.calls();
    assert!(!calls.iter().any(|call| matches!(
        call,
        BridgeCall::SetConsumer(_) | BridgeCall::AddExternalReference { .. }
    )));
    assert_eq!(
        outcome.discounts.unwrap().applied,
        vec![Toggle {
            code: "VIP".to_string(),
            line_id: None,
        }]
    );
    assert!(ctx.terminal.is_closed());
}

// ============================================================================
// Walk-in shopper
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_search_then_select_resolves_profile() {
    let ctx = TestContext::new(wine_and_food(None, 10_000));

    let resolution = ctx.orchestrator.startup().await.unwrap().unwrap();
    assert_eq!(resolution, Resolution::Search);
    let flags = ctx.session().flags();
    assert!(!flags.loading);
    assert!(flags.search_mode);

    let search = CustomerSearch::new(ctx.profiles.clone(), Duration::from_millis(500));
    let outcome = search.input("jane@example.com").await;
    let SearchOutcome::Completed(results) = outcome else {
        panic!("expected a completed search, got {outcome:?}");
    };
    assert_eq!(results.len(), 1);
    let selected = results.first().unwrap();
    assert_eq!(selected.first_name, "Jane");

    let resolution = ctx
        .orchestrator
        .select_search_result(&selected.email)
        .await
        .unwrap();

    assert_eq!(resolution, Resolution::Ready);
    let flags = ctx.session().flags();
    assert!(!flags.create_mode);
    assert!(!flags.search_mode);
    assert!(flags.ready);
    let customer = ctx.session().get().unwrap();
    assert_eq!(customer.segment.as_str(), "Club Gold");
    assert!(customer.active_transaction.is_some());
}

#[tokio::test]
async fn test_new_customer_form_submitted_and_closed() {
    let ctx = TestContext::new(wine_and_food(Some("sam@example.com"), 10_000));

    let resolution = ctx.orchestrator.startup().await.unwrap().unwrap();
    assert_eq!(resolution, Resolution::Create);
    assert!(ctx.session().flags().create_mode);

    let outcome = ctx
        .orchestrator
        .submit(CustomerForm {
            first_name: "Sam".to_string(),
            last_name: "Lee".to_string(),
            email: "sam@example.com".to_string(),
            phone: "0400 333 444".to_string(),
            group: "Club Silver".to_string(),
            address: Address {
                state: "VIC".to_string(),
                postcode: "3000".to_string(),
                ..Address::default()
            },
        })
        .await
        .unwrap();

    let submitted = ctx.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted.first().unwrap().group, "Club Silver");
    assert_eq!(submitted.first().unwrap().state, "VIC");

    assert!(outcome.consumer_set);
    assert_eq!(outcome.discounts.unwrap().applied.len(), 1);
    assert!(ctx.terminal.is_closed());
}

// ============================================================================
// Overlapping sessions
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_second_startup_discards_first_session_results() {
    let ctx = TestContext::new(wine_and_food(Some("jane@example.com"), 10_000));
    ctx.terminal.hold_account_responses();

    let first = ctx.orchestrator.startup();
    tokio::time::sleep(Duration::from_millis(1)).await;
    let first_session = ctx.session().session_id().unwrap();

    let second = ctx.orchestrator.startup();
    tokio::time::sleep(Duration::from_millis(1)).await;
    let second_session = ctx.session().session_id().unwrap();
    assert_ne!(first_session, second_session);

    ctx.terminal.release_account_responses();

    assert_eq!(first.await.unwrap().unwrap(), Resolution::Superseded);
    assert_eq!(second.await.unwrap().unwrap(), Resolution::Ready);
    let customer = ctx.session().get().unwrap();
    assert_eq!(customer.session_id, second_session);
    assert_eq!(customer.segment.as_str(), "Club Gold");
}

#[tokio::test]
async fn test_subscribers_see_every_commit() {
    let ctx = TestContext::new(wine_and_food(Some("jane@example.com"), 10_000));
    let changes = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = changes.clone();
    let subscription = ctx.session().subscribe(move || {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    });

    ctx.orchestrator.startup().await.unwrap().unwrap();

    assert!(changes.load(std::sync::atomic::Ordering::SeqCst) >= 3);
    subscription.unsubscribe();
    assert_eq!(ctx.session().subscriber_count(), 0);
}
