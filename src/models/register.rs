use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cash-drawer session between opening and closing. Read-only here.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterSession {
    pub id: String,
    pub opened_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub opening_amount: Option<f64>,
    #[serde(default)]
    pub closing_amount: Option<f64>,
    #[serde(default)]
    pub difference: Option<f64>,
}

impl RegisterSession {
    /// Last eight characters of the identifier, or the whole id when shorter.
    pub fn short_id(&self) -> String {
        let count = self.id.chars().count();
        self.id.chars().skip(count.saturating_sub(8)).collect()
    }
}

/// Aggregated totals computed by the backend for one register session.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RegisterSummary {
    pub sales_total: f64,
    pub delivery_total: f64,
    pub other_income_total: f64,
    pub total_expense: f64,
    pub expected_balance: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Income => "ENTRADA",
            EntryKind::Expense => "SAÍDA",
        }
    }

    pub fn sign(self) -> char {
        match self {
            EntryKind::Income => '+',
            EntryKind::Expense => '-',
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LedgerEntry {
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub payment_method: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str) -> RegisterSession {
        RegisterSession {
            id: id.to_string(),
            opened_at: Utc::now(),
            closed_at: None,
            opening_amount: None,
            closing_amount: None,
            difference: None,
        }
    }

    #[test]
    fn test_short_id_keeps_last_eight_chars() {
        assert_eq!(
            session("3f2b9c1e-aaaa-bbbb-cccc-1234abcd5678").short_id(),
            "abcd5678"
        );
        assert_eq!(session("abc").short_id(), "abc");
    }

    #[test]
    fn test_entry_deserializes_type_field() {
        let entry: LedgerEntry = serde_json::from_str(
            r#"{"created_at":"2024-05-10T13:00:00+00:00","type":"expense","description":"Gelo","amount":12.5,"payment_method":"pix"}"#,
        )
        .unwrap();
        assert_eq!(entry.kind, EntryKind::Expense);
        assert_eq!(entry.kind.sign(), '-');
        assert_eq!(entry.kind.label(), "SAÍDA");
    }

    #[test]
    fn test_summary_defaults_missing_totals_to_zero() {
        let summary: RegisterSummary = serde_json::from_str(r#"{"sales_total": 10.0}"#).unwrap();
        assert_eq!(summary.sales_total, 10.0);
        assert_eq!(summary.expected_balance, 0.0);
    }
}
