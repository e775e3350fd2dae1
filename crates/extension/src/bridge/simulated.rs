//! In-memory terminal used by the simulator and by tests.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use concierge_core::LineId;
use serde::Serialize;
use tracing::{debug, warn};

use super::{PosCallback, PosError, PosResponse, TerminalBridge};
use crate::models::{AccountSnapshot, Consumer};

/// A call received by the [`SimulatedTerminal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum BridgeCall {
    GetCurrentAccount,
    SetConsumer(Consumer),
    AddExternalReference { value: String, prefix: String },
    ToggleDiscount { code: String, line_id: LineId },
    ToggleGlobalDiscount { code: String },
    Close,
}

/// Terminal that holds one order in memory.
///
/// Toggles really toggle: a code present on the line (or order) is removed,
/// an absent one is added. Callbacks run inline unless account responses or
/// toggle answers are being held.
#[derive(Debug, Default)]
pub struct SimulatedTerminal {
    state: Mutex<TerminalState>,
}

#[derive(Default)]
struct TerminalState {
    account: Option<AccountSnapshot>,
    calls: Vec<BridgeCall>,
    account_error: Option<PosError>,
    reject_toggles: Option<PosError>,
    dispatch_failures: HashSet<&'static str>,
    hold_account: bool,
    held: Vec<PosCallback<AccountSnapshot>>,
    hold_toggles: bool,
    held_toggles: Vec<(PosCallback<serde_json::Value>, PosResponse<serde_json::Value>)>,
}

impl std::fmt::Debug for TerminalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalState")
            .field("account", &self.account)
            .field("calls", &self.calls.len())
            .field("held", &self.held.len())
            .field("held_toggles", &self.held_toggles.len())
            .finish_non_exhaustive()
    }
}

impl SimulatedTerminal {
    /// A terminal with an open order.
    #[must_use]
    pub fn with_account(account: AccountSnapshot) -> Self {
        Self {
            state: Mutex::new(TerminalState {
                account: Some(account),
                ..TerminalState::default()
            }),
        }
    }

    /// A terminal that answers the account query without data.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Answer every following account query with `error`.
    pub fn fail_account_query(&self, error: PosError) {
        self.lock().account_error = Some(error);
    }

    /// Answer every following toggle with `error` and leave the order untouched.
    pub fn reject_toggles(&self, error: PosError) {
        self.lock().reject_toggles = Some(error);
    }

    /// Refuse to dispatch the named call (`set_consumer`, `toggle_discount`, ...).
    pub fn fail_dispatch(&self, call: &'static str) {
        self.lock().dispatch_failures.insert(call);
    }

    /// Hold account responses until [`release_account_responses`](Self::release_account_responses).
    pub fn hold_account_responses(&self) {
        self.lock().hold_account = true;
    }

    /// Answer every held account query, oldest first, with the current order.
    pub fn release_account_responses(&self) {
        let (held, response) = {
            let mut state = self.lock();
            state.hold_account = false;
            (std::mem::take(&mut state.held), state.account_response())
        };
        debug!(count = held.len(), "Releasing held account responses");
        for callback in held {
            callback(response.clone());
        }
    }

    /// Apply toggles but keep their callbacks unanswered until
    /// [`release_toggle_answers`](Self::release_toggle_answers).
    pub fn hold_toggle_answers(&self) {
        self.lock().hold_toggles = true;
    }

    /// Answer every held toggle callback, oldest first.
    pub fn release_toggle_answers(&self) {
        let held = {
            let mut state = self.lock();
            state.hold_toggles = false;
            std::mem::take(&mut state.held_toggles)
        };
        debug!(count = held.len(), "Releasing held toggle answers");
        for (callback, response) in held {
            callback(response);
        }
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<BridgeCall> {
        self.lock().calls.clone()
    }

    /// The order as the terminal currently sees it.
    #[must_use]
    pub fn account(&self) -> Option<AccountSnapshot> {
        self.lock().account.clone()
    }

    /// Number of toggle calls received.
    #[must_use]
    pub fn toggle_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    BridgeCall::ToggleDiscount { .. } | BridgeCall::ToggleGlobalDiscount { .. }
                )
            })
            .count()
    }

    /// Whether `close` was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().calls.contains(&BridgeCall::Close)
    }

    fn lock(&self) -> MutexGuard<'_, TerminalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn answer_toggle(
        mut state: MutexGuard<'_, TerminalState>,
        callback: PosCallback<serde_json::Value>,
        response: PosResponse<serde_json::Value>,
    ) {
        if state.hold_toggles {
            state.held_toggles.push((callback, response));
            return;
        }
        drop(state);
        callback(response);
    }

    fn dispatch(&self, name: &'static str, call: BridgeCall) -> Result<MutexGuard<'_, TerminalState>, PosError> {
        let mut state = self.lock();
        if state.dispatch_failures.contains(name) {
            warn!(call = name, "Simulated dispatch failure");
            return Err(PosError::new(format!("{name} is unavailable")));
        }
        state.calls.push(call);
        Ok(state)
    }
}

impl TerminalState {
    fn account_response(&self) -> PosResponse<AccountSnapshot> {
        if let Some(error) = &self.account_error {
            return PosResponse::err(error.clone());
        }
        PosResponse {
            error: None,
            data: self.account.clone(),
        }
    }

    fn toggle_response(&self) -> PosResponse<serde_json::Value> {
        PosResponse::ok(serde_json::to_value(&self.account).unwrap_or_default())
    }
}

fn toggle(codes: &mut Vec<String>, code: &str) {
    if let Some(index) = codes.iter().position(|c| c == code) {
        codes.remove(index);
    } else {
        codes.push(code.to_owned());
    }
}

impl TerminalBridge for SimulatedTerminal {
    fn get_current_account(&self, callback: PosCallback<AccountSnapshot>) -> Result<(), PosError> {
        let mut state = self.dispatch("get_current_account", BridgeCall::GetCurrentAccount)?;
        if state.hold_account {
            state.held.push(callback);
            return Ok(());
        }
        let response = state.account_response();
        drop(state);
        callback(response);
        Ok(())
    }

    fn set_consumer(&self, consumer: &Consumer) -> Result<(), PosError> {
        let mut state = self.dispatch("set_consumer", BridgeCall::SetConsumer(consumer.clone()))?;
        if let Some(account) = state.account.as_mut() {
            account.consumer = Some(consumer.clone());
        }
        Ok(())
    }

    fn add_external_reference(&self, value: &str, prefix: &str) -> Result<(), PosError> {
        let mut state = self.dispatch(
            "add_external_reference",
            BridgeCall::AddExternalReference {
                value: value.to_owned(),
                prefix: prefix.to_owned(),
            },
        )?;
        if let Some(account) = state.account.as_mut() {
            account.external_references.push(value.to_owned());
        }
        Ok(())
    }

    fn toggle_discount(
        &self,
        code: &str,
        line_id: &LineId,
        callback: PosCallback<serde_json::Value>,
    ) -> Result<(), PosError> {
        let mut state = self.dispatch(
            "toggle_discount",
            BridgeCall::ToggleDiscount {
                code: code.to_owned(),
                line_id: line_id.clone(),
            },
        )?;
        let response = if let Some(error) = state.reject_toggles.clone() {
            PosResponse::err(error)
        } else {
            let line = state
                .account
                .as_mut()
                .and_then(|account| account.transaction_lines.as_mut())
                .and_then(|lines| lines.iter_mut().find(|line| &line.identifier == line_id));
            match line {
                Some(line) => {
                    toggle(&mut line.discounts, code);
                    state.toggle_response()
                }
                None => PosResponse::err(PosError::new(format!("unknown line {line_id}"))),
            }
        };
        Self::answer_toggle(state, callback, response);
        Ok(())
    }

    fn toggle_global_discount(
        &self,
        code: &str,
        callback: PosCallback<serde_json::Value>,
    ) -> Result<(), PosError> {
        let mut state = self.dispatch(
            "toggle_global_discount",
            BridgeCall::ToggleGlobalDiscount {
                code: code.to_owned(),
            },
        )?;
        let response = if let Some(error) = state.reject_toggles.clone() {
            PosResponse::err(error)
        } else if let Some(account) = state.account.as_mut() {
            toggle(&mut account.discounts, code);
            state.toggle_response()
        } else {
            PosResponse::err(PosError::new("no open account"))
        };
        Self::answer_toggle(state, callback, response);
        Ok(())
    }

    fn close(&self) {
        self.lock().calls.push(BridgeCall::Close);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::TransactionLine;

    fn account() -> AccountSnapshot {
        AccountSnapshot {
            transaction_lines: Some(vec![TransactionLine {
                identifier: LineId::new("L1"),
                accounting_group_name: "Wine".to_string(),
                ..TransactionLine::default()
            }]),
            ..AccountSnapshot::default()
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let terminal = SimulatedTerminal::with_account(account());
        let line = LineId::new("L1");

        terminal.toggle_discount("ClubGold", &line, Box::new(|_| {})).unwrap();
        let lines = terminal.account().unwrap().transaction_lines.unwrap();
        assert_eq!(lines[0].discounts, vec!["ClubGold".to_string()]);

        terminal.toggle_discount("ClubGold", &line, Box::new(|_| {})).unwrap();
        let lines = terminal.account().unwrap().transaction_lines.unwrap();
        assert!(lines[0].discounts.is_empty());
        assert_eq!(terminal.toggle_count(), 2);
    }

    #[test]
    fn test_unknown_line_answers_with_error() {
        let terminal = SimulatedTerminal::with_account(account());
        let answer = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&answer);

        terminal
            .toggle_discount(
                "ClubGold",
                &LineId::new("nope"),
                Box::new(move |response| *sink.lock().unwrap() = response.error),
            )
            .unwrap();
        assert!(answer.lock().unwrap().is_some());
    }

    #[test]
    fn test_held_account_responses() {
        let terminal = SimulatedTerminal::with_account(account());
        terminal.hold_account_responses();

        let answered = Arc::new(Mutex::new(0));
        for _ in 0..2 {
            let answered = Arc::clone(&answered);
            terminal
                .get_current_account(Box::new(move |_| *answered.lock().unwrap() += 1))
                .unwrap();
        }
        assert_eq!(*answered.lock().unwrap(), 0);

        terminal.release_account_responses();
        assert_eq!(*answered.lock().unwrap(), 2);
    }

    #[test]
    fn test_held_toggle_answers() {
        let terminal = SimulatedTerminal::with_account(account());
        terminal.hold_toggle_answers();

        let answer = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&answer);
        terminal
            .toggle_global_discount(
                "VIP",
                Box::new(move |response| *sink.lock().unwrap() = Some(response.error.is_none())),
            )
            .unwrap();
        assert_eq!(terminal.account().unwrap().discounts, vec!["VIP".to_string()]);
        assert!(answer.lock().unwrap().is_none());

        terminal.release_toggle_answers();
        assert_eq!(*answer.lock().unwrap(), Some(true));
    }

    #[test]
    fn test_close_is_recorded() {
        let terminal = SimulatedTerminal::empty();
        assert!(!terminal.is_closed());
        terminal.close();
        assert!(terminal.is_closed());
    }
}
