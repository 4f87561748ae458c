//! Aggregation engine
//!
//! Stateless functions over a ledger snapshot. Every function takes any
//! iterator of record references, so a filtered result can be fed back in.

use crate::models::{Record, RecordKind};
use chrono::{DateTime, Duration, Utc};

pub fn sum_by_kind<'a, I>(records: I, kind: RecordKind) -> u64
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|r| r.kind == kind)
        .fold(0, |acc, r| acc.saturating_add(r.value))
}

/// Sum of every record in `category`, income and expense alike.
///
/// Kept for parity with the category statistics the bot has always shown.
/// Use [`sum_by_category_and_kind`] when the kinds must not be mixed.
pub fn sum_by_category<'a, I>(records: I, category: &str) -> u64
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|r| r.category == category)
        .fold(0, |acc, r| acc.saturating_add(r.value))
}

pub fn sum_by_category_and_kind<'a, I>(records: I, category: &str, kind: RecordKind) -> u64
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|r| r.category == category && r.kind == kind)
        .fold(0, |acc, r| acc.saturating_add(r.value))
}

pub fn filter_by_category<'a, I>(records: I, category: &str) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|r| r.category == category)
        .collect()
}

/// Records created no earlier than `days` days before `now`
pub fn filter_since<'a, I>(records: I, days: u32, now: DateTime<Utc>) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let cutoff = now
        .checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    records
        .into_iter()
        .filter(|r| r.created_at >= cutoff)
        .collect()
}

/// Income and expense totals, in that order
pub fn totals<'a, I>(records: I) -> (u64, u64)
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .fold((0, 0), |(income, expense), r| match r.kind {
            RecordKind::Income => (income.saturating_add(r.value), expense),
            RecordKind::Expense => (income, expense.saturating_add(r.value)),
        })
}

/// Cumulative income minus cumulative expenses.
///
/// Can be negative once an income record has been deleted.
pub fn balance<'a, I>(records: I) -> i64
where
    I: IntoIterator<Item = &'a Record>,
{
    let (income, expense) = totals(records);
    i64::try_from(i128::from(income) - i128::from(expense)).unwrap_or(if income > expense {
        i64::MAX
    } else {
        i64::MIN
    })
}
