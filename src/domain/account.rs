use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, serialize_units};

/// Account identifiers are assigned by the store on insert.
pub type AccountId = i64;

/// Kind of account. Parsed case-insensitively; always written in lowercase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum AccountType {
    #[default]
    Checking,
    Savings,
    Business,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
            AccountType::Business => "business",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "checking" => Some(AccountType::Checking),
            "savings" => Some(AccountType::Savings),
            "business" => Some(AccountType::Business),
            _ => None,
        }
    }
}

impl TryFrom<String> for AccountType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| {
            format!(
                "unknown account type `{}`, expected checking, savings or business",
                value
            )
        })
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored bank account. The balance lives on the row and is mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    #[serde(rename = "accountHolderName")]
    pub holder_name: String,
    pub account_type: AccountType,
    #[serde(rename = "balance", serialize_with = "serialize_units")]
    pub balance_cents: Cents,
    pub created_at: DateTime<Utc>,
}

/// Attributes for an account that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub holder_name: String,
    pub account_type: AccountType,
    pub opening_balance: Cents,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    pub fn new(holder_name: impl Into<String>) -> Self {
        Self {
            holder_name: holder_name.into(),
            account_type: AccountType::default(),
            opening_balance: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_account_type(mut self, account_type: AccountType) -> Self {
        self.account_type = account_type;
        self
    }

    pub fn with_opening_balance(mut self, cents: Cents) -> Self {
        self.opening_balance = cents;
        self
    }
}
