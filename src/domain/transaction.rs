use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, Cents, serialize_units};

pub type TransactionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Withdraw,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdraw => "WITHDRAW",
            TransactionType::Transfer => "TRANSFER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DEPOSIT" => Some(TransactionType::Deposit),
            "WITHDRAW" => Some(TransactionType::Withdraw),
            "TRANSFER" => Some(TransactionType::Transfer),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A journal entry for one balance-affecting event. Entries are append-only.
///
/// A transfer is journaled once, against the source account; the destination
/// is kept in `counterparty_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub counterparty_id: Option<AccountId>,
    /// Amount in cents (always positive)
    #[serde(rename = "amount", serialize_with = "serialize_units")]
    pub amount_cents: Cents,
    pub transaction_type: TransactionType,
    /// When the operation ran, not when the row was written
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Create a new entry. The id is assigned by the repository.
    pub fn new(
        account_id: AccountId,
        amount_cents: Cents,
        transaction_type: TransactionType,
    ) -> Self {
        debug_assert!(amount_cents > 0, "Transaction amount must be positive");
        Self {
            id: 0,
            account_id,
            counterparty_id: None,
            amount_cents,
            transaction_type,
            timestamp: Utc::now(),
        }
    }

    pub fn deposit(account_id: AccountId, amount_cents: Cents) -> Self {
        Self::new(account_id, amount_cents, TransactionType::Deposit)
    }

    pub fn withdraw(account_id: AccountId, amount_cents: Cents) -> Self {
        Self::new(account_id, amount_cents, TransactionType::Withdraw)
    }

    pub fn transfer(from: AccountId, to: AccountId, amount_cents: Cents) -> Self {
        Self::new(from, amount_cents, TransactionType::Transfer).with_counterparty(to)
    }

    pub fn with_counterparty(mut self, counterparty_id: AccountId) -> Self {
        self.counterparty_id = Some(counterparty_id);
        self
    }
}
