//! Integration tests for the concierge extension.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p concierge-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_workflow` - Startup through Close on a simulated terminal
//! - `discounts` - Segment strategies applied through the workflow
//! - `error_escalation` - Soft and forced-close error paths
//! - `customer_search` - Debounced search against the profile store
//!
//! Every test runs in-process against [`SimulatedTerminal`] and
//! [`InMemoryProfileStore`]; nothing external needs to be running.

use std::sync::Arc;

use concierge_core::{Amount, LineId};
use concierge_extension::bridge::SimulatedTerminal;
use concierge_extension::discount::StrategyRegistry;
use concierge_extension::models::{AccountSnapshot, Consumer, TransactionLine};
use concierge_extension::profile::{InMemoryProfileStore, ProfileRecord};
use concierge_extension::sink::{FormPayload, FormSubmissionSink, LoggingFormSink};
use concierge_extension::{Collaborators, ExtensionConfig, Orchestrator, SessionStore};
use serde::Deserialize;

/// Profiles shared by the scenarios.
const PROFILES_YAML: &str = r#"
- email: jane@example.com
  first_name: Jane
  last_name: Doe
  phone: "0400 111 222"
  group: Club Gold
  address:
    street1: 1 Vine St
    state: WA
    postcode: "6285"
- email: janet@example.com
  first_name: Janet
  last_name: Dow
  phone: "0400 555 666"
  group: Loyalty
- email: no.phone@example.com
  first_name: Nora
  last_name: Fone
  group: VIP
- email: gold@example.com
  first_name: Goldie
  last_name: Hawn
  phone: "0400 777 888"
  group: Gold
"#;

/// Wrapper so the profile list can be parsed as one document.
#[derive(Deserialize)]
#[serde(transparent)]
struct Profiles(Vec<ProfileRecord>);

/// The shared scenario profiles.
///
/// # Panics
///
/// Panics if the embedded YAML is invalid.
#[must_use]
pub fn profiles() -> Vec<ProfileRecord> {
    serde_yaml::from_str::<Profiles>(PROFILES_YAML)
        .map(|profiles| profiles.0)
        .unwrap_or_else(|e| panic!("invalid profile fixture: {e}"))
}

/// A line in `group`.
#[must_use]
pub fn line(id: &str, group: &str, amount: i64) -> TransactionLine {
    TransactionLine {
        identifier: LineId::new(id),
        accounting_group_name: group.to_string(),
        amount: Amount::from(amount),
        ..TransactionLine::default()
    }
}

/// An order holding `lines`, with an optional consumer email.
#[must_use]
pub fn order(email: Option<&str>, total: i64, lines: Vec<TransactionLine>) -> AccountSnapshot {
    AccountSnapshot {
        identifier: Some("ACC-1".into()),
        total_amount: Some(Amount::from(total)),
        transaction_lines: Some(lines),
        consumer: email.map(|email| Consumer {
            email: email.to_string(),
            ..Consumer::default()
        }),
        ..AccountSnapshot::default()
    }
}

/// A wine line and a food line.
#[must_use]
pub fn wine_and_food(email: Option<&str>, total: i64) -> AccountSnapshot {
    order(
        email,
        total,
        vec![line("L1", "Wine", total / 2), line("L2", "Food", total / 2)],
    )
}

/// Orchestrator wired to in-memory collaborators.
pub struct TestContext {
    pub terminal: Arc<SimulatedTerminal>,
    pub profiles: Arc<InMemoryProfileStore>,
    pub registry: Arc<StrategyRegistry>,
    pub orchestrator: Orchestrator,
    logging_sink: Option<Arc<LoggingFormSink>>,
}

impl TestContext {
    /// Terminal holding `account`, the shared profiles, built-in strategies and
    /// a logging form sink.
    #[must_use]
    pub fn new(account: AccountSnapshot) -> Self {
        let sink = Arc::new(LoggingFormSink::new());
        let mut context = Self::build(
            SimulatedTerminal::with_account(account),
            sink.clone(),
            Arc::new(StrategyRegistry::with_builtins()),
        );
        context.logging_sink = Some(sink);
        context
    }

    /// Fully custom wiring.
    #[must_use]
    pub fn build(
        terminal: SimulatedTerminal,
        sink: Arc<dyn FormSubmissionSink>,
        registry: Arc<StrategyRegistry>,
    ) -> Self {
        let config = ExtensionConfig::default();
        let terminal = Arc::new(terminal);
        let profiles = Arc::new(InMemoryProfileStore::with_records(
            config.profile_table.clone(),
            profiles(),
        ));
        let orchestrator = Orchestrator::new(
            config,
            SessionStore::new(),
            Collaborators {
                bridge: terminal.clone(),
                profiles: profiles.clone(),
                sink,
                registry: registry.clone(),
            },
        );
        Self {
            terminal,
            profiles,
            registry,
            orchestrator,
            logging_sink: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        self.orchestrator.session()
    }

    /// Forms received by the logging sink.
    #[must_use]
    pub fn submitted(&self) -> Vec<FormPayload> {
        self.logging_sink
            .as_ref()
            .map(|sink| sink.submitted())
            .unwrap_or_default()
    }
}
