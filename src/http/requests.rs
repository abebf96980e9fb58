use serde::Deserialize;
use serde_json::Number;

use crate::application::AppError;
use crate::domain::{AccountId, AccountType, Cents, NewAccount, parse_cents};

/// Body of `POST /api/accounts`. Any `id` sent by the client is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub account_holder_name: String,
    #[serde(default)]
    pub account_type: AccountType,
    pub balance: Option<Number>,
}

impl CreateAccountRequest {
    pub fn into_new_account(self) -> Result<NewAccount, AppError> {
        let opening_balance = match &self.balance {
            Some(balance) => number_to_cents(balance)?,
            None => 0,
        };
        Ok(NewAccount::new(self.account_holder_name)
            .with_account_type(self.account_type)
            .with_opening_balance(opening_balance))
    }
}

/// Body of the deposit and withdraw endpoints: `{"amount": 50.25}`.
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: Number,
}

impl AmountRequest {
    pub fn amount_cents(&self) -> Result<Cents, AppError> {
        number_to_cents(&self.amount)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Number,
}

impl TransferRequest {
    pub fn amount_cents(&self) -> Result<Cents, AppError> {
        number_to_cents(&self.amount)
    }
}

/// JSON numbers arrive in currency units. `Number` keeps the digits exactly as
/// sent, so 0.1 means ten cents and 90071992547409.93 is not rounded.
fn number_to_cents(number: &Number) -> Result<Cents, AppError> {
    parse_cents(&number.to_string())
        .map_err(|e| AppError::InvalidAmount(format!("{}: {}", number, e)))
}
