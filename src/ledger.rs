//! A single user's ordered record sequence
//!
//! Positions are 1-based for every user-facing operation and shift down
//! after a deletion. Records are never modified once appended.

use crate::error::TrackerError;
use crate::models::Record;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    records: Vec<Record>,
}

impl Ledger {
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Append a record and return its 1-based position
    pub fn append(&mut self, record: Record) -> usize {
        self.records.push(record);
        self.records.len()
    }

    /// Remove the record at 1-based `position`
    pub fn delete_at(&mut self, position: usize) -> Result<Record> {
        if position == 0 || position > self.records.len() {
            return Err(TrackerError::IndexOutOfRange {
                position: i64::try_from(position).unwrap_or(i64::MAX),
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(position - 1))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
