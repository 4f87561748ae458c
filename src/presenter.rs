//! Reply texts for chat transports

use crate::error::TrackerError;
use crate::models::{ConversationState, Outcome, Record, RecordKind, Scope};

const NO_RECORDS: &str = "You don't have any records.";

fn numbered(records: &[Record]) -> String {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {}", i + 1, r))
        .collect::<Vec<_>>()
        .join("\n")
}

fn plain(records: &[Record]) -> String {
    records
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Awaiting { state, records } => match state {
            ConversationState::AwaitingIncomeValue { .. } => "Please enter your income:".to_string(),
            ConversationState::AwaitingExpenseValue { .. } => "Please enter your expense:".to_string(),
            ConversationState::AwaitingDeleteIndex => {
                format!("Type record number to delete:\n{}", numbered(records))
            }
            _ => "Please enter amount of days:".to_string(),
        },

        Outcome::Recorded { record, .. } => match record.kind {
            RecordKind::Income => format!(
                "Received your income in category '{}': {}",
                record.category, record.value
            ),
            RecordKind::Expense => {
                format!("Received your expense in '{}': {}", record.category, record.value)
            }
        },

        Outcome::Deleted { record, .. } => format!("Record: {}\nWas deleted.", record),

        Outcome::Records { scope, records } => match scope {
            Scope::AllTime if records.is_empty() => NO_RECORDS.to_string(),
            Scope::AllTime => format!("Your records:\n{}", numbered(records)),
            Scope::Category { category } => {
                format!("Your records in {} category:\n{}", category, plain(records))
            }
            Scope::Period { days } => {
                format!("Your records for the last {} day(s):\n{}", days, plain(records))
            }
        },

        Outcome::Totals { scope, income, expense } => match scope {
            Scope::Period { days } => format!(
                "Your income for the last {} day(s): {} \nYour expenses for the last {} day(s): {}",
                days, income, days, expense
            ),
            _ => format!(
                "Your all time income: {} \nYour all time expenses: {}",
                income, expense
            ),
        },

        Outcome::CategoryTotal { category, total, .. } => {
            format!("Your all time expenses in {} category: {}", category, total)
        }
    }
}

pub fn render_error(error: &TrackerError) -> String {
    match error {
        TrackerError::InvalidInput(_) => "Incorrect input. Try again.".to_string(),
        TrackerError::InsufficientBalance { .. } => "Not enough money. Cut your expenses.".to_string(),
        TrackerError::IndexOutOfRange { position, len } => format!(
            "There is no record number {}. You have {} record(s).",
            position, len
        ),
        TrackerError::NothingPending => "Nothing is pending. Use /menu to choose an action.".to_string(),
        TrackerError::InvalidIntent(reason) => format!("Cannot do that: {}", reason),
        TrackerError::StorageFailure(_) => {
            "Saved for now, but it could not be written to disk and may be lost on restart.".to_string()
        }
        TrackerError::ConfigError(reason) => format!("Configuration problem: {}", reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(value: u64, kind: RecordKind, category: &str) -> Record {
        Record::at(value, kind, category, Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())
    }

    #[test]
    fn test_listing_texts() {
        let records = vec![
            record(100, RecordKind::Income, "Office work"),
            record(20, RecordKind::Expense, "Food"),
        ];

        let all = Outcome::Records { scope: Scope::AllTime, records: records.clone() };
        assert_eq!(
            render_outcome(&all),
            "Your records:\n\
             1. Income | 2024-05-01 09:30:00 | Office work : 100\n\
             2. Expense | 2024-05-01 09:30:00 | Food : 20"
        );

        let empty = Outcome::Records { scope: Scope::AllTime, records: vec![] };
        assert_eq!(render_outcome(&empty), NO_RECORDS);

        let period = Outcome::Records { scope: Scope::Period { days: 3 }, records };
        assert!(render_outcome(&period).starts_with("Your records for the last 3 day(s):\nIncome |"));
    }

    #[test]
    fn test_prompt_and_stat_texts() {
        let offer = Outcome::Awaiting {
            state: ConversationState::AwaitingDeleteIndex,
            records: vec![record(5, RecordKind::Income, "Side hustle")],
        };
        assert_eq!(
            render_outcome(&offer),
            "Type record number to delete:\n1. Income | 2024-05-01 09:30:00 | Side hustle : 5"
        );

        let totals = Outcome::Totals { scope: Scope::AllTime, income: 150, expense: 120 };
        assert_eq!(
            render_outcome(&totals),
            "Your all time income: 150 \nYour all time expenses: 120"
        );

        let category = Outcome::CategoryTotal {
            category: "Food".into(),
            total: 35,
            income: 5,
            expense: 30,
        };
        assert_eq!(render_outcome(&category), "Your all time expenses in Food category: 35");
    }

    #[test]
    fn test_period_texts() {
        for state in [
            ConversationState::AwaitingStatPeriodDays,
            ConversationState::AwaitingRecPeriodDays,
        ] {
            let prompt = Outcome::Awaiting { state, records: Vec::new() };
            assert_eq!(render_outcome(&prompt), "Please enter amount of days:");
        }

        let totals = Outcome::Totals { scope: Scope::Period { days: 7 }, income: 40, expense: 15 };
        assert_eq!(
            render_outcome(&totals),
            "Your income for the last 7 day(s): 40 \nYour expenses for the last 7 day(s): 15"
        );
    }

    #[test]
    fn test_error_texts() {
        assert_eq!(
            render_error(&TrackerError::InsufficientBalance { requested: 5, balance: 1 }),
            "Not enough money. Cut your expenses."
        );
        assert_eq!(
            render_error(&TrackerError::InvalidInput("x".into())),
            "Incorrect input. Try again."
        );
    }
}
