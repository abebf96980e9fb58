use tracing::{info, warn};

use crate::domain::{Account, AccountId, Cents, NewAccount, Transaction, format_cents};
use crate::storage::{BalanceChange, Repository};

use super::AppError;

/// Application service for the account ledger.
/// This is the primary interface for any client (HTTP, CLI, ...).
///
/// Every balance-affecting operation runs in a single unit of work: the
/// balance guard, the mutation and the journal entry commit together.
pub struct AccountService {
    repo: Repository,
}

impl AccountService {
    /// Create a new account service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open the database at the given path, creating and migrating it if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Account operations
    // ========================

    /// Create a new account.
    pub async fn create_account(&self, account: NewAccount) -> Result<Account, AppError> {
        if account.holder_name.trim().is_empty() {
            return Err(AppError::InvalidAccount(
                "Account holder name must not be empty".to_string(),
            ));
        }
        if account.opening_balance < 0 {
            return Err(AppError::InvalidAmount(
                "Opening balance must not be negative".to_string(),
            ));
        }

        let account = self.repo.save_account(&account).await?;
        info!(
            account_id = account.id,
            balance = %format_cents(account.balance_cents),
            "account created"
        );
        Ok(account)
    }

    /// Get an account by id.
    pub async fn get_account(&self, id: AccountId) -> Result<Account, AppError> {
        self.repo
            .get_account(id)
            .await?
            .ok_or(AppError::AccountNotFound(id))
    }

    /// List all accounts.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.repo.list_accounts().await?)
    }

    /// Delete an account. Its journal entries are kept.
    pub async fn delete_account(&self, id: AccountId) -> Result<(), AppError> {
        if !self.repo.delete_account(id).await? {
            return Err(AppError::AccountNotFound(id));
        }
        info!(account_id = id, "account deleted");
        Ok(())
    }

    // ========================
    // Balance operations
    // ========================

    /// Add funds to an account and journal a DEPOSIT.
    pub async fn deposit(&self, id: AccountId, amount_cents: Cents) -> Result<Account, AppError> {
        validate_amount(amount_cents)?;

        let mut uow = self.repo.begin().await?;
        let account = match uow.credit(id, amount_cents).await? {
            BalanceChange::Applied(account) => account,
            BalanceChange::Rejected(_) => return Err(overflow()),
            BalanceChange::Missing => return Err(AppError::AccountNotFound(id)),
        };
        uow.append_transaction(&mut Transaction::deposit(id, amount_cents))
            .await?;
        uow.commit().await?;

        info!(
            account_id = id,
            amount = %format_cents(amount_cents),
            balance = %format_cents(account.balance_cents),
            "deposit recorded"
        );
        Ok(account)
    }

    /// Take funds out of an account and journal a WITHDRAW.
    pub async fn withdraw(&self, id: AccountId, amount_cents: Cents) -> Result<Account, AppError> {
        validate_amount(amount_cents)?;

        let mut uow = self.repo.begin().await?;
        let account = match uow.debit(id, amount_cents).await? {
            BalanceChange::Applied(account) => account,
            BalanceChange::Rejected(account) => {
                warn!(account_id = id, amount = %format_cents(amount_cents), "withdrawal rejected");
                return Err(insufficient_funds(&account, amount_cents));
            }
            BalanceChange::Missing => return Err(AppError::AccountNotFound(id)),
        };
        uow.append_transaction(&mut Transaction::withdraw(id, amount_cents))
            .await?;
        uow.commit().await?;

        info!(
            account_id = id,
            amount = %format_cents(amount_cents),
            balance = %format_cents(account.balance_cents),
            "withdrawal recorded"
        );
        Ok(account)
    }

    /// Move funds between two accounts.
    ///
    /// Debit, credit and the single TRANSFER entry (attributed to the source)
    /// commit atomically. A missing account is reported before a short balance.
    pub async fn transfer_funds(
        &self,
        from: AccountId,
        to: AccountId,
        amount_cents: Cents,
    ) -> Result<(), AppError> {
        validate_amount(amount_cents)?;
        if from == to {
            return Err(AppError::InvalidTransfer(
                "Source and destination accounts must differ".to_string(),
            ));
        }

        let mut uow = self.repo.begin().await?;
        match uow.debit(from, amount_cents).await? {
            BalanceChange::Applied(_) => {}
            BalanceChange::Rejected(source) => {
                if uow.get_account(to).await?.is_none() {
                    return Err(AppError::AccountNotFound(to));
                }
                warn!(from, to, amount = %format_cents(amount_cents), "transfer rejected");
                return Err(insufficient_funds(&source, amount_cents));
            }
            BalanceChange::Missing => return Err(AppError::AccountNotFound(from)),
        }
        match uow.credit(to, amount_cents).await? {
            BalanceChange::Applied(_) => {}
            BalanceChange::Rejected(_) => return Err(overflow()),
            BalanceChange::Missing => return Err(AppError::AccountNotFound(to)),
        }
        uow.append_transaction(&mut Transaction::transfer(from, to, amount_cents))
            .await?;
        uow.commit().await?;

        info!(from, to, amount = %format_cents(amount_cents), "transfer recorded");
        Ok(())
    }

    // ========================
    // Journal operations
    // ========================

    /// History of an account: entries it owns plus transfers it received.
    pub async fn list_transactions(&self, id: AccountId) -> Result<Vec<Transaction>, AppError> {
        self.get_account(id).await?;
        self.list_journal_entries(id).await
    }

    /// Journal entries naming an account, whether or not the account still exists.
    pub async fn list_journal_entries(
        &self,
        id: AccountId,
    ) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions_for_account(id).await?)
    }

    /// The full journal, including entries of deleted accounts.
    pub async fn list_all_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions().await?)
    }
}

fn validate_amount(amount_cents: Cents) -> Result<(), AppError> {
    if amount_cents <= 0 {
        return Err(AppError::InvalidAmount(
            "Amount must be positive".to_string(),
        ));
    }
    Ok(())
}

fn insufficient_funds(account: &Account, required: Cents) -> AppError {
    AppError::InsufficientFunds {
        account_id: account.id,
        balance: account.balance_cents,
        required,
    }
}

fn overflow() -> AppError {
    AppError::InvalidAmount("Resulting balance is out of range".to_string())
}
