//! Discount policies as data.

use concierge_core::Amount;
use serde::{Deserialize, Serialize};

use crate::models::ActiveTransaction;

/// A line-scoped discount: apply `code` to lines in `accounting_group`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRule {
    pub code: String,
    pub accounting_group: String,
}

impl LineRule {
    pub fn new(code: impl Into<String>, accounting_group: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            accounting_group: accounting_group.into(),
        }
    }
}

/// Where a policy applies its codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum DiscountScope {
    /// Per line, rules applied in order.
    Lines { rules: Vec<LineRule> },
    /// One code on the whole order.
    Order { code: String },
}

/// Precondition checked before any code is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    /// The order total must be strictly greater than the amount.
    TotalAbove(Amount),
}

impl Guard {
    #[must_use]
    pub fn allows(self, transaction: &ActiveTransaction) -> bool {
        match self {
            Self::TotalAbove(threshold) => transaction.total_amount > threshold,
        }
    }
}

/// Pricing policy of one customer segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountPolicy {
    pub name: String,
    pub scope: DiscountScope,
    pub guard: Option<Guard>,
}

impl DiscountPolicy {
    /// A line-scoped policy.
    pub fn lines(name: impl Into<String>, rules: Vec<LineRule>) -> Self {
        Self {
            name: name.into(),
            scope: DiscountScope::Lines { rules },
            guard: None,
        }
    }

    /// An order-scoped policy.
    pub fn order(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: DiscountScope::Order { code: code.into() },
            guard: None,
        }
    }

    #[must_use]
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Whether the guard (if any) lets the policy run on `transaction`.
    #[must_use]
    pub fn applies_to(&self, transaction: &ActiveTransaction) -> bool {
        self.guard.is_none_or(|guard| guard.allows(transaction))
    }
}
