//! Applies a [`DiscountPolicy`] to the session's order.

use concierge_core::LineId;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::policy::{DiscountPolicy, DiscountScope, LineRule};
use crate::bridge::{BridgeClient, BridgeError};
use crate::models::ActiveTransaction;
use crate::session::SessionStore;

/// Why a policy ran without touching the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The terminal has not reported an order yet.
    NoTransaction,
    /// The order has no lines.
    EmptyOrder,
    /// The policy's guard rejected the order.
    GuardNotMet,
}

/// One toggle sent to the terminal. `line_id` is `None` for order codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toggle {
    pub code: String,
    pub line_id: Option<LineId>,
}

/// What an execution did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub skipped: Option<SkipReason>,
    /// Toggles the terminal accepted; recorded on the session's order.
    pub applied: Vec<Toggle>,
    /// Toggles the terminal answered with an error within the ack timeout.
    pub rejected: Vec<Toggle>,
}

impl ExecutionReport {
    const fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            applied: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Number of toggles sent.
    #[must_use]
    pub fn toggle_count(&self) -> usize {
        self.applied.len() + self.rejected.len()
    }
}

/// Apply `policy` to the order held by `session`.
///
/// Codes already present are not toggled again, so executing twice sends no
/// new toggles. Accepted codes are recorded on a snapshot that is committed
/// once at the end, including when a toggle fails part way through.
///
/// # Errors
///
/// Returns `BridgeError` if a toggle could not be dispatched. Toggles the
/// terminal rejects are reported, not returned. A toggle whose answer is late
/// or dropped counts as applied, so execution never waits on the terminal for
/// longer than the client's toggle ack timeout per toggle.
#[instrument(skip_all, fields(policy = %policy.name))]
pub async fn execute(
    policy: &DiscountPolicy,
    session: &SessionStore,
    bridge: &BridgeClient,
) -> Result<ExecutionReport, BridgeError> {
    let Some(mut snapshot) = session.snapshot() else {
        return Ok(ExecutionReport::skipped(SkipReason::NoTransaction));
    };
    let Some(transaction) = snapshot.active_transaction.as_mut() else {
        return Ok(ExecutionReport::skipped(SkipReason::NoTransaction));
    };
    if transaction.is_empty() {
        return Ok(ExecutionReport::skipped(SkipReason::EmptyOrder));
    }
    if !policy.applies_to(transaction) {
        info!(total = %transaction.total_amount, "Discount guard not met");
        return Ok(ExecutionReport::skipped(SkipReason::GuardNotMet));
    }

    let mut report = ExecutionReport::default();
    let result = match &policy.scope {
        DiscountScope::Lines { rules } => apply_lines(rules, transaction, bridge, &mut report).await,
        DiscountScope::Order { code } => apply_order(code, transaction, bridge, &mut report).await,
    };

    if !report.applied.is_empty() {
        session.commit(snapshot);
    }
    info!(
        applied = report.applied.len(),
        rejected = report.rejected.len(),
        "Discount policy executed"
    );
    result.map(|()| report)
}

async fn apply_lines(
    rules: &[LineRule],
    transaction: &mut ActiveTransaction,
    bridge: &BridgeClient,
    report: &mut ExecutionReport,
) -> Result<(), BridgeError> {
    for rule in rules {
        let targets = transaction
            .lines
            .iter_mut()
            .filter(|line| line.accounting_group_name == rule.accounting_group)
            .filter(|line| !line.has_discount(&rule.code));
        for line in targets {
            let toggle = Toggle {
                code: rule.code.clone(),
                line_id: Some(line.identifier.clone()),
            };
            match bridge.toggle_discount(&rule.code, &line.identifier).await {
                Ok(()) => {
                    line.record_discount(&rule.code);
                    report.applied.push(toggle);
                }
                Err(e) if e.is_rejection() => {
                    warn!(error = %e, code = %rule.code, line_id = %line.identifier, "Line discount rejected");
                    report.rejected.push(toggle);
                }
                Err(e) => return Err(e),
            }
        }
    }
    Ok(())
}

async fn apply_order(
    code: &str,
    transaction: &mut ActiveTransaction,
    bridge: &BridgeClient,
    report: &mut ExecutionReport,
) -> Result<(), BridgeError> {
    if transaction.has_order_discount(code) {
        return Ok(());
    }
    let toggle = Toggle {
        code: code.to_owned(),
        line_id: None,
    };
    match bridge.toggle_global_discount(code).await {
        Ok(()) => {
            transaction.record_order_discount(code);
            report.applied.push(toggle);
            Ok(())
        }
        Err(e) if e.is_rejection() => {
            warn!(error = %e, code, "Order discount rejected");
            report.rejected.push(toggle);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
