//! Shared setup for workflow tests.

use std::sync::Arc;

use concierge_core::{Amount, LineId};

use super::{Collaborators, Orchestrator};
use crate::bridge::SimulatedTerminal;
use crate::config::ExtensionConfig;
use crate::discount::StrategyRegistry;
use crate::models::{AccountSnapshot, Consumer, TransactionLine};
use crate::profile::{InMemoryProfileStore, ProfileRecord};
use crate::session::SessionStore;
use crate::sink::LoggingFormSink;

pub(crate) struct Harness {
    pub terminal: Arc<SimulatedTerminal>,
    pub profiles: Arc<InMemoryProfileStore>,
    pub sink: Arc<LoggingFormSink>,
    pub orchestrator: Orchestrator,
}

impl Harness {
    /// A terminal without an order.
    pub fn new() -> Self {
        Self::with_terminal(SimulatedTerminal::empty())
    }

    pub fn with_account(account: AccountSnapshot) -> Self {
        Self::with_terminal(SimulatedTerminal::with_account(account))
    }

    fn with_terminal(terminal: SimulatedTerminal) -> Self {
        let config = ExtensionConfig::default();
        let terminal = Arc::new(terminal);
        let profiles = Arc::new(InMemoryProfileStore::new(config.profile_table.clone()));
        let sink = Arc::new(LoggingFormSink::new());
        let orchestrator = Orchestrator::new(
            config,
            SessionStore::new(),
            Collaborators {
                bridge: terminal.clone(),
                profiles: profiles.clone(),
                sink: sink.clone(),
                registry: Arc::new(StrategyRegistry::with_builtins()),
            },
        );
        Self {
            terminal,
            profiles,
            sink,
            orchestrator,
        }
    }

    pub fn session(&self) -> &SessionStore {
        self.orchestrator.session()
    }
}

pub(crate) fn line(id: &str, group: &str) -> TransactionLine {
    TransactionLine {
        identifier: LineId::new(id),
        accounting_group_name: group.to_string(),
        ..TransactionLine::default()
    }
}

/// An order with two lines (one wine, one food) and the given consumer email.
pub(crate) fn account(email: &str, total: i64) -> AccountSnapshot {
    AccountSnapshot {
        total_amount: Some(Amount::from(total)),
        transaction_lines: Some(vec![line("L1", "Wine"), line("L2", "Food")]),
        consumer: Some(Consumer {
            email: email.to_string(),
            ..Consumer::default()
        }),
        ..AccountSnapshot::default()
    }
}

pub(crate) fn record(email: &str, group: &str) -> ProfileRecord {
    ProfileRecord {
        email: Some(email.to_string()),
        first_name: Some("Jane".to_string()),
        last_name: Some("Doe".to_string()),
        phone: Some("0400 111 222".to_string()),
        group: Some(group.to_string()),
        ..ProfileRecord::default()
    }
}
