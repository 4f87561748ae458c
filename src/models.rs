//! Core data models for the ledger tracker

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TrackerError;

//
// ================= Identity =================
//

/// Opaque, stable chat user identifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Income,
    Expense,
}

/// The fixed expense category set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Vehicle,
    Food,
    Connectivity,
    Housing,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 4] = [
        ExpenseCategory::Vehicle,
        ExpenseCategory::Housing,
        ExpenseCategory::Connectivity,
        ExpenseCategory::Food,
    ];

    /// Label stored on records and shown to the user
    pub fn label(self) -> &'static str {
        match self {
            ExpenseCategory::Vehicle => "Car",
            ExpenseCategory::Food => "Food",
            ExpenseCategory::Connectivity => "Internet",
            ExpenseCategory::Housing => "Flat",
        }
    }

    fn name(self) -> &'static str {
        match self {
            ExpenseCategory::Vehicle => "vehicle",
            ExpenseCategory::Food => "food",
            ExpenseCategory::Connectivity => "connectivity",
            ExpenseCategory::Housing => "housing",
        }
    }
}

impl FromStr for ExpenseCategory {
    type Err = TrackerError;

    /// Accepts either the variant name or the label, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ExpenseCategory::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted) || c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TrackerError::InvalidIntent(format!("unknown expense category {:?}", wanted)))
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordKind::Income => "Income",
            RecordKind::Expense => "Expense",
        };
        write!(f, "{}", s)
    }
}

/// Income categories offered by the menus; any other label is accepted too
pub const INCOME_PRESETS: &[&str] = &["Office work", "Side hustle"];

//
// ================= Record =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub value: u64,
    pub kind: RecordKind,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl Record {
    pub fn new(value: u64, kind: RecordKind, category: impl Into<String>) -> Self {
        Self::at(value, kind, category, Utc::now())
    }

    pub fn at(value: u64, kind: RecordKind, category: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            value,
            kind,
            category: category.into(),
            created_at,
        }
    }

    pub fn income(value: u64, category: impl Into<String>) -> Self {
        Self::new(value, RecordKind::Income, category)
    }

    pub fn expense(value: u64, category: ExpenseCategory) -> Self {
        Self::new(value, RecordKind::Expense, category.label())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} : {}",
            self.kind,
            self.created_at.format("%Y-%m-%d %H:%M:%S"),
            self.category,
            self.value
        )
    }
}

//
// ================= Conversation =================
//

/// The multi-step flow a user is in, with the parameter it carries
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingIncomeValue { category: String },
    AwaitingExpenseValue { category: ExpenseCategory },
    AwaitingDeleteIndex,
    AwaitingStatPeriodDays,
    AwaitingRecPeriodDays,
}

impl ConversationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ConversationState::Idle)
    }
}

/// Named actions requested by the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Intent {
    AddIncome { category: String },
    AddExpense { category: ExpenseCategory },
    ListAll,
    ListByCategory { category: String },
    ListByPeriod,
    StatAll,
    StatByCategory { category: String },
    StatByPeriod,
    DeleteByIndex,
}

//
// ================= Results =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    AllTime,
    Category { category: String },
    Period { days: u32 },
}

/// Plain result data handed back to the transport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// A flow started; `records` is filled when the user picks from a list
    Awaiting {
        state: ConversationState,
        records: Vec<Record>,
    },
    Recorded {
        position: usize,
        record: Record,
    },
    Deleted {
        position: usize,
        record: Record,
    },
    Records {
        scope: Scope,
        records: Vec<Record>,
    },
    Totals {
        scope: Scope,
        income: u64,
        expense: u64,
    },
    /// `total` mixes both kinds, `income` and `expense` are split
    CategoryTotal {
        category: String,
        total: u64,
        income: u64,
        expense: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_expense_category_parsing() {
        assert_eq!("food".parse::<ExpenseCategory>().unwrap(), ExpenseCategory::Food);
        assert_eq!("Car".parse::<ExpenseCategory>().unwrap(), ExpenseCategory::Vehicle);
        assert_eq!(" internet ".parse::<ExpenseCategory>().unwrap(), ExpenseCategory::Connectivity);
        assert_eq!("HOUSING".parse::<ExpenseCategory>().unwrap(), ExpenseCategory::Housing);
        assert!(matches!(
            "boat".parse::<ExpenseCategory>(),
            Err(TrackerError::InvalidIntent(_))
        ));
    }

    #[test]
    fn test_record_display() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let record = Record::at(120, RecordKind::Expense, "Food", at);
        assert_eq!(record.to_string(), "Expense | 2024-03-05 14:07:09 | Food : 120");
    }

    #[test]
    fn test_record_wire_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        let record = Record::at(100, RecordKind::Income, "Office work", at);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "Income");
        assert_eq!(json["category"], "Office work");
        assert_eq!(json["createdAt"], "2024-03-05T14:07:09Z");
    }

    #[test]
    fn test_intent_wire_format() {
        let intent: Intent =
            serde_json::from_str(r#"{"action":"add_expense","category":"food"}"#).unwrap();
        assert_eq!(intent, Intent::AddExpense { category: ExpenseCategory::Food });

        let intent: Intent = serde_json::from_str(r#"{"action":"stat_all"}"#).unwrap();
        assert_eq!(intent, Intent::StatAll);
    }
}
