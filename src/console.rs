//! Line commands for the console bot

use crate::error::TrackerError;
use crate::models::{ExpenseCategory, Intent, INCOME_PRESETS};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    Intent(Intent),
    /// Raw text for the pending flow
    Text(String),
    Menu,
    Quit,
}

/// Expense labels resolve to their canonical label, anything else is kept as typed
fn category_label(raw: &str) -> String {
    raw.parse::<ExpenseCategory>()
        .map(|c| c.label().to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn parse_line(line: &str) -> Result<ConsoleLine> {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return Ok(ConsoleLine::Text(line.to_string()));
    };

    let (name, argument) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };

    let intent = match (name.to_lowercase().as_str(), argument) {
        ("menu" | "help" | "start", _) => return Ok(ConsoleLine::Menu),
        ("quit" | "exit", _) => return Ok(ConsoleLine::Quit),
        ("income", "") => {
            return Err(TrackerError::InvalidIntent(format!(
                "/income needs a category, e.g. {}",
                INCOME_PRESETS.join(" or ")
            )))
        }
        ("income", category) => Intent::AddIncome { category: category.to_string() },
        ("expense", category) => Intent::AddExpense { category: category.parse()? },
        ("list", "") => Intent::ListAll,
        ("list", "period") => Intent::ListByPeriod,
        ("list", category) => Intent::ListByCategory { category: category_label(category) },
        ("stats", "") => Intent::StatAll,
        ("stats", "period") => Intent::StatByPeriod,
        ("stats", category) => Intent::StatByCategory { category: category_label(category) },
        ("delete", "") => Intent::DeleteByIndex,
        (other, _) => {
            return Err(TrackerError::InvalidIntent(format!("unknown command /{}", other)))
        }
    };

    Ok(ConsoleLine::Intent(intent))
}

pub fn menu_text() -> String {
    let expense = ExpenseCategory::ALL
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Please choose:\n\
         /income <category>   add income ({})\n\
         /expense <category>  add expense ({})\n\
         /list [category|period]\n\
         /stats [category|period]\n\
         /delete\n\
         /quit",
        INCOME_PRESETS.join(", "),
        expense
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(line: &str) -> Intent {
        match parse_line(line).unwrap() {
            ConsoleLine::Intent(intent) => intent,
            other => panic!("expected intent, got {:?}", other),
        }
    }

    #[test]
    fn test_commands_map_to_intents() {
        assert_eq!(intent("/income Office work"), Intent::AddIncome { category: "Office work".into() });
        assert_eq!(intent("/expense car"), Intent::AddExpense { category: ExpenseCategory::Vehicle });
        assert_eq!(intent("/list"), Intent::ListAll);
        assert_eq!(intent("/list period"), Intent::ListByPeriod);
        assert_eq!(intent("/list internet"), Intent::ListByCategory { category: "Internet".into() });
        assert_eq!(intent("/stats"), Intent::StatAll);
        assert_eq!(intent("/stats period"), Intent::StatByPeriod);
        assert_eq!(intent("/stats Side hustle"), Intent::StatByCategory { category: "Side hustle".into() });
        assert_eq!(intent("/delete"), Intent::DeleteByIndex);
    }

    #[test]
    fn test_plain_text_and_controls() {
        assert_eq!(parse_line(" 120 ").unwrap(), ConsoleLine::Text("120".into()));
        assert_eq!(parse_line("/menu").unwrap(), ConsoleLine::Menu);
        assert_eq!(parse_line("/quit").unwrap(), ConsoleLine::Quit);
    }

    #[test]
    fn test_bad_commands_fail() {
        for line in ["/income", "/expense boat", "/expense", "/frobnicate", "/delete 3"] {
            assert!(
                matches!(parse_line(line), Err(TrackerError::InvalidIntent(_))),
                "{} should be rejected",
                line
            );
        }
    }
}
