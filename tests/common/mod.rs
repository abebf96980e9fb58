// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use bursar::application::AccountService;
use bursar::domain::{Account, AccountType, Cents, NewAccount};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(AccountService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = AccountService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to open an account with an opening balance in cents
pub async fn open_account(
    service: &AccountService,
    name: &str,
    balance: Cents,
) -> Result<Account> {
    let account = service
        .create_account(NewAccount::new(name).with_opening_balance(balance))
        .await?;
    Ok(account)
}

/// Test fixture: the two accounts most scenarios start from
pub struct StandardAccounts {
    pub alice: Account,
    pub bob: Account,
}

impl StandardAccounts {
    /// Alice holds 100.00 in checking, Bob holds nothing in savings
    pub async fn create(service: &AccountService) -> Result<Self> {
        let alice = open_account(service, "Alice", 10000).await?;
        let bob = service
            .create_account(NewAccount::new("Bob").with_account_type(AccountType::Savings))
            .await?;
        Ok(Self { alice, bob })
    }
}
