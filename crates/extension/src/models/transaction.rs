//! The host terminal's order, as mirrored into the session.

use concierge_core::{AccountId, Amount, LineId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The consumer attached to the terminal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Consumer {
    pub first_name: String,
    pub last_name: String,
    pub phone_number1: String,
    pub email: String,
}

/// One line item of the terminal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionLine {
    /// Stable line identifier used when toggling a line discount.
    pub identifier: LineId,
    pub quantity: Decimal,
    /// Line total.
    pub amount: Amount,
    pub unit_amount: Amount,
    /// Product category tag targeted by line-scoped discounts.
    pub accounting_group_name: String,
    pub accounting_group_id: String,
    /// Discount codes applied to this line.
    pub discounts: Vec<String>,
    pub item_sku: String,
    pub text: String,
    pub parent_line: Option<String>,
}

impl TransactionLine {
    /// Whether the line already carries `code`.
    #[must_use]
    pub fn has_discount(&self, code: &str) -> bool {
        self.discounts.iter().any(|d| d == code)
    }

    /// Record `code` as applied. Never introduces a duplicate.
    pub fn record_discount(&mut self, code: &str) {
        if !self.has_discount(code) {
            self.discounts.push(code.to_owned());
        }
    }
}

/// Account snapshot returned by the terminal's "get current account" call.
///
/// Every field is optional on the wire; absent values leave the session's
/// mirror untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountSnapshot {
    pub external_references: Vec<String>,
    pub client_count: u32,
    pub total_amount: Option<Amount>,
    pub paid_amount: Option<Amount>,
    pub transaction_lines: Option<Vec<TransactionLine>>,
    pub consumer: Option<Consumer>,
    pub discounts: Vec<String>,
    pub is_draft: bool,
    pub identifier: Option<AccountId>,
    pub name: Option<String>,
    pub current_insertion_phase: Option<u32>,
}

/// The session's mirror of the host order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTransaction {
    pub external_references: Vec<String>,
    pub total_amount: Amount,
    pub paid_amount: Amount,
    pub lines: Vec<TransactionLine>,
    /// Order-level discount codes.
    pub discounts: Vec<String>,
    /// Consumer reference assigned by the terminal.
    pub consumer: Option<Consumer>,
    pub identifier: AccountId,
    pub name: String,
    pub insertion_phase: u32,
}

impl ActiveTransaction {
    /// Build a mirror from the first account snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: AccountSnapshot) -> Self {
        let mut transaction = Self::default();
        transaction.apply_snapshot(snapshot);
        transaction
    }

    /// Copy the fields the terminal supplied. Empty values are skipped.
    pub fn apply_snapshot(&mut self, snapshot: AccountSnapshot) {
        if !snapshot.external_references.is_empty() {
            self.external_references = snapshot.external_references;
        }
        if let Some(total) = snapshot.total_amount.filter(|a| !a.is_zero()) {
            self.total_amount = total;
        }
        if let Some(paid) = snapshot.paid_amount.filter(|a| !a.is_zero()) {
            self.paid_amount = paid;
        }
        if let Some(lines) = snapshot.transaction_lines {
            self.lines = lines;
        }
        if let Some(consumer) = snapshot.consumer {
            self.consumer = Some(consumer);
        }
        if !snapshot.discounts.is_empty() {
            self.discounts = snapshot.discounts;
        }
        if let Some(identifier) = snapshot.identifier.filter(|id| !id.is_empty()) {
            self.identifier = identifier;
        }
        if let Some(name) = snapshot.name.filter(|n| !n.is_empty()) {
            self.name = name;
        }
        if let Some(phase) = snapshot.current_insertion_phase.filter(|p| *p != 0) {
            self.insertion_phase = phase;
        }
    }

    /// The consumer email, trimmed, if the terminal supplied a non-blank one.
    #[must_use]
    pub fn consumer_email(&self) -> Option<&str> {
        self.consumer
            .as_ref()
            .map(|c| c.email.trim())
            .filter(|email| !email.is_empty())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn has_order_discount(&self, code: &str) -> bool {
        self.discounts.iter().any(|d| d == code)
    }

    /// Record an order-level code as applied. Never introduces a duplicate.
    pub fn record_order_discount(&mut self, code: &str) {
        if !self.has_order_discount(code) {
            self.discounts.push(code.to_owned());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ACCOUNT_JSON: &str = r#"{
        "externalReferences": ["table-4"],
        "clientCount": 2,
        "totalAmount": 12550,
        "paidAmount": 0,
        "transactionLines": [{
            "identifier": "L1",
            "quantity": 2,
            "amount": 9000,
            "unitAmount": 4500,
            "accountingGroupName": "Wine",
            "accountingGroupId": "AG-7",
            "discounts": [],
            "itemSku": "SHZ-2019",
            "text": "Shiraz 2019",
            "parentLine": null
        }],
        "consumer": {
            "firstName": "Jane",
            "lastName": "Doe",
            "phoneNumber1": "0400 000 000",
            "email": "jane@example.com"
        },
        "discounts": [],
        "isDraft": false,
        "identifier": "A-991",
        "name": "Table 4",
        "currentInsertionPhase": 1
    }"#;

    #[test]
    fn test_snapshot_deserialization() {
        let snapshot: AccountSnapshot = serde_json::from_str(ACCOUNT_JSON).unwrap();
        let lines = snapshot.transaction_lines.as_ref().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].identifier, LineId::new("L1"));
        assert_eq!(lines[0].accounting_group_name, "Wine");
        assert_eq!(snapshot.total_amount, Some(Amount::from(12_550)));
        assert_eq!(snapshot.consumer.unwrap().phone_number1, "0400 000 000");
    }

    #[test]
    fn test_apply_snapshot_skips_empty_values() {
        let mut transaction = ActiveTransaction {
            name: "Bar tab".to_string(),
            total_amount: Amount::from(500),
            ..ActiveTransaction::default()
        };

        transaction.apply_snapshot(AccountSnapshot {
            total_amount: Some(Amount::ZERO),
            name: Some(String::new()),
            discounts: vec!["VIP".to_string()],
            ..AccountSnapshot::default()
        });

        assert_eq!(transaction.name, "Bar tab");
        assert_eq!(transaction.total_amount, Amount::from(500));
        assert_eq!(transaction.discounts, vec!["VIP".to_string()]);
    }

    #[test]
    fn test_consumer_email_requires_non_blank_value() {
        let snapshot: AccountSnapshot = serde_json::from_str(ACCOUNT_JSON).unwrap();
        let transaction = ActiveTransaction::from_snapshot(snapshot);
        assert_eq!(transaction.consumer_email(), Some("jane@example.com"));

        let malformed = ActiveTransaction {
            consumer: Some(Consumer {
                email: " jane@ ".to_string(),
                ..Consumer::default()
            }),
            ..ActiveTransaction::default()
        };
        assert_eq!(malformed.consumer_email(), Some("jane@"));

        let blank = ActiveTransaction {
            consumer: Some(Consumer {
                email: "  ".to_string(),
                ..Consumer::default()
            }),
            ..ActiveTransaction::default()
        };
        assert!(blank.consumer_email().is_none());
    }

    #[test]
    fn test_record_discount_is_idempotent() {
        let mut line = TransactionLine::default();
        line.record_discount("ClubGold");
        line.record_discount("ClubGold");
        assert_eq!(line.discounts, vec!["ClubGold".to_string()]);

        let mut transaction = ActiveTransaction::default();
        transaction.record_order_discount("VIP");
        transaction.record_order_discount("VIP");
        assert_eq!(transaction.discounts, vec!["VIP".to_string()]);
    }
}
