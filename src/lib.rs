//! Pocket Ledger
//!
//! A chat-driven personal finance tracker:
//! - Records income and expense events per user
//! - Refuses expenses that would overdraw the balance
//! - Lists, deletes and aggregates records by kind, category or day window
//! - Tracks each user's pending multi-step input flow
//! - Snapshots every committed change to durable storage
//!
//! FLOW:
//! INTENT → BEGIN STATE → TEXT → ADVANCE → MUTATE → SAVE → OUTCOME

pub mod api;
pub mod config;
pub mod console;
pub mod conversation;
pub mod error;
pub mod ledger;
pub mod models;
pub mod persistence;
pub mod presenter;
pub mod query;
pub mod state;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use conversation::ConversationEngine;
pub use error::TrackerError;
