//! Conversation state machine
//!
//! Intents either answer directly from the ledger or start a flow that waits
//! for one number. `advance` consumes that number and completes the flow.

use crate::error::TrackerError;
use crate::models::{ConversationState, Intent, Outcome, Record, RecordKind, Scope, UserId};
use crate::query;
use crate::state::{Commit, LedgerStore, UserSession};
use crate::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ConversationEngine {
    store: Arc<LedgerStore>,
}

impl ConversationEngine {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Put the user into `state`, replacing whatever was pending
    pub async fn begin(&self, user: UserId, state: ConversationState) {
        debug!(user_id = %user, ?state, "Conversation state set");
        self.store.set_state(user, state).await;
    }

    pub async fn state(&self, user: UserId) -> ConversationState {
        self.store.state(user).await
    }

    pub async fn dispatch(&self, user: UserId, intent: Intent) -> Result<Outcome> {
        debug!(user_id = %user, ?intent, "Dispatching intent");

        let awaiting = match intent {
            Intent::AddIncome { category } => {
                let category = category.trim();
                if category.is_empty() {
                    return Err(TrackerError::InvalidIntent(
                        "income category must not be blank".to_string(),
                    ));
                }
                ConversationState::AwaitingIncomeValue {
                    category: category.to_string(),
                }
            }
            Intent::AddExpense { category } => ConversationState::AwaitingExpenseValue { category },
            Intent::ListByPeriod => ConversationState::AwaitingRecPeriodDays,
            Intent::StatByPeriod => ConversationState::AwaitingStatPeriodDays,
            Intent::DeleteByIndex => return self.begin_delete(user).await,
            Intent::ListAll => {
                let records = self.store.list(user).await;
                return Ok(Outcome::Records {
                    scope: Scope::AllTime,
                    records,
                });
            }
            Intent::ListByCategory { category } => {
                let records = self
                    .store
                    .view(user, |s| {
                        query::filter_by_category(s.ledger.records(), &category)
                            .into_iter()
                            .cloned()
                            .collect::<Vec<_>>()
                    })
                    .await;
                return Ok(Outcome::Records {
                    scope: Scope::Category { category },
                    records,
                });
            }
            Intent::StatAll => {
                let (income, expense) = self.store.view(user, |s| query::totals(s.ledger.records())).await;
                return Ok(Outcome::Totals {
                    scope: Scope::AllTime,
                    income,
                    expense,
                });
            }
            Intent::StatByCategory { category } => {
                let (total, income, expense) = self
                    .store
                    .view(user, |s| {
                        let records = s.ledger.records();
                        (
                            query::sum_by_category(records, &category),
                            query::sum_by_category_and_kind(records, &category, RecordKind::Income),
                            query::sum_by_category_and_kind(records, &category, RecordKind::Expense),
                        )
                    })
                    .await;
                return Ok(Outcome::CategoryTotal {
                    category,
                    total,
                    income,
                    expense,
                });
            }
        };

        self.begin(user, awaiting.clone()).await;
        Ok(Outcome::Awaiting {
            state: awaiting,
            records: Vec::new(),
        })
    }

    /// Offer the numbered ledger for deletion; nothing to pick leaves the state alone
    async fn begin_delete(&self, user: UserId) -> Result<Outcome> {
        self.store
            .with_session(user, |session| {
                if session.ledger.is_empty() {
                    return Ok((
                        Outcome::Records {
                            scope: Scope::AllTime,
                            records: Vec::new(),
                        },
                        Commit::Skip,
                    ));
                }

                session.state = ConversationState::AwaitingDeleteIndex;
                Ok((
                    Outcome::Awaiting {
                        state: ConversationState::AwaitingDeleteIndex,
                        records: session.ledger.records().to_vec(),
                    },
                    Commit::Skip,
                ))
            })
            .await
    }

    /// Feed raw user text into the pending flow
    pub async fn advance(&self, user: UserId, text: &str) -> Result<Outcome> {
        let now = Utc::now();
        let result = self
            .store
            .with_session(user, |session| step(session, text, now))
            .await;

        match &result {
            Ok(outcome) => debug!(user_id = %user, ?outcome, "Flow completed"),
            Err(e) if e.is_recoverable() => warn!(user_id = %user, "Input rejected: {}", e),
            Err(e) => debug!(user_id = %user, "Flow failed: {}", e),
        }

        result
    }
}

fn parse_number(text: &str) -> Result<i64> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| TrackerError::InvalidInput(text.to_string()))
}

fn non_negative(text: &str) -> Result<u64> {
    u64::try_from(parse_number(text)?).map_err(|_| TrackerError::InvalidInput(text.to_string()))
}

fn days(text: &str) -> Result<u32> {
    u32::try_from(parse_number(text)?).map_err(|_| TrackerError::InvalidInput(text.to_string()))
}

/// One transition. Errors leave the ledger untouched.
fn step(session: &mut UserSession, text: &str, now: DateTime<Utc>) -> Result<(Outcome, Commit)> {
    match session.state.clone() {
        ConversationState::Idle => Err(TrackerError::NothingPending),

        ConversationState::AwaitingIncomeValue { category } => {
            let value = non_negative(text)?;
            let record = Record::at(value, RecordKind::Income, category, now);
            let position = session.ledger.append(record.clone());
            session.state = ConversationState::Idle;
            info!(value, category = %record.category, "Income recorded");
            Ok((Outcome::Recorded { position, record }, Commit::Save))
        }

        ConversationState::AwaitingExpenseValue { category } => {
            let value = non_negative(text)?;
            let balance = query::balance(session.ledger.records());
            if i128::from(value) > i128::from(balance) {
                return Err(TrackerError::InsufficientBalance {
                    requested: value,
                    balance,
                });
            }
            let record = Record::at(value, RecordKind::Expense, category.label(), now);
            let position = session.ledger.append(record.clone());
            session.state = ConversationState::Idle;
            info!(value, category = %record.category, "Expense recorded");
            Ok((Outcome::Recorded { position, record }, Commit::Save))
        }

        ConversationState::AwaitingDeleteIndex => {
            let position = parse_number(text)?;
            session.state = ConversationState::Idle;
            let out_of_range = TrackerError::IndexOutOfRange {
                position,
                len: session.ledger.len(),
            };
            let index = usize::try_from(position).map_err(|_| out_of_range.clone())?;
            let record = session.ledger.delete_at(index).map_err(|_| out_of_range)?;
            info!(position, "Record deleted");
            Ok((Outcome::Deleted { position: index, record }, Commit::Save))
        }

        ConversationState::AwaitingStatPeriodDays => {
            let days = days(text)?;
            let (income, expense) = query::totals(query::filter_since(session.ledger.records(), days, now));
            session.state = ConversationState::Idle;
            Ok((
                Outcome::Totals {
                    scope: Scope::Period { days },
                    income,
                    expense,
                },
                Commit::Skip,
            ))
        }

        ConversationState::AwaitingRecPeriodDays => {
            let days = days(text)?;
            let records: Vec<Record> = query::filter_since(session.ledger.records(), days, now)
                .into_iter()
                .cloned()
                .collect();
            session.state = ConversationState::Idle;
            Ok((
                Outcome::Records {
                    scope: Scope::Period { days },
                    records,
                },
                Commit::Skip,
            ))
        }
    }
}
