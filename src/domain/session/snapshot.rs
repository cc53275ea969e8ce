//! Aggregate dashboard read model.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::UserIdentity;
use crate::domain::foundation::Timestamp;

/// Balance totals across all of the user's accounts.
///
/// Amounts are carried exactly as the API sent them (number or decimal
/// string) since the session core never does arithmetic on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    #[serde(default)]
    pub total_balance: Value,

    #[serde(default)]
    pub total_available: Value,

    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for FinancialSummary {
    fn default() -> Self {
        Self {
            total_balance: Value::from(0),
            total_available: Value::from(0),
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Everything the dashboard needs, fetched from the API as a single unit.
///
/// Accounts, transactions and any further sections the API adds are passed
/// through untouched. Once received a snapshot is never edited, only
/// replaced by the next successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub user: UserIdentity,

    #[serde(default)]
    pub financial_summary: FinancialSummary,

    #[serde(default)]
    pub accounts: Vec<Value>,

    #[serde(default)]
    pub recent_transactions: Vec<Value>,

    #[serde(default)]
    pub verification_required: bool,

    /// Remaining sections (profile, KYC information, login history, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// When this snapshot arrived. Set locally, never read from the wire.
    #[serde(skip, default)]
    pub received_at: Timestamp,
}

impl DashboardSnapshot {
    /// How long ago this snapshot was received.
    pub fn age(&self) -> Duration {
        self.received_at.elapsed()
    }

    /// Looks up a pass-through section by name.
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "user": {
                "id": 5,
                "username": "jdoe",
                "email": "jane@example.com",
                "first_name": "Jane",
                "last_name": "Doe"
            },
            "financial_summary": {
                "total_balance": "1520.40",
                "total_available": 1500,
                "currency": "USD"
            },
            "accounts": [{ "id": "a1", "account_type": "savings" }],
            "recent_transactions": [],
            "kyc_information": { "status": "approved", "completion_percentage": 100 },
            "verification_required": false
        })
    }

    #[test]
    fn deserializes_dashboard_payload() {
        let snapshot: DashboardSnapshot = serde_json::from_value(payload()).unwrap();

        assert_eq!(snapshot.user.id, UserId::new(5));
        assert_eq!(snapshot.account_count(), 1);
        assert_eq!(snapshot.financial_summary.total_balance, json!("1520.40"));
        assert!(!snapshot.verification_required);
    }

    #[test]
    fn unknown_sections_are_kept_opaque() {
        let snapshot: DashboardSnapshot = serde_json::from_value(payload()).unwrap();

        assert_eq!(
            snapshot.section("kyc_information"),
            Some(&json!({ "status": "approved", "completion_percentage": 100 }))
        );
        assert!(snapshot.section("user").is_none());
    }

    #[test]
    fn missing_sections_default() {
        let snapshot: DashboardSnapshot = serde_json::from_value(json!({
            "user": { "id": 1, "email": "a@b.c" }
        }))
        .unwrap();

        assert!(snapshot.accounts.is_empty());
        assert_eq!(snapshot.financial_summary.currency, "USD");
    }

    #[test]
    fn received_at_is_stamped_locally() {
        let before = Timestamp::now();
        let snapshot: DashboardSnapshot = serde_json::from_value(payload()).unwrap();

        assert!(snapshot.received_at >= before);
        assert!(snapshot.age() >= Duration::zero());
    }
}
