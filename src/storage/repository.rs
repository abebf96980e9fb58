use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool};

use crate::domain::{
    Account, AccountId, AccountType, Cents, NewAccount, Transaction, TransactionType,
};

use super::MIGRATION_001_INITIAL;

const ACCOUNT_COLUMNS: &str = "id, holder_name, account_type, balance_cents, created_at";
const TRANSACTION_COLUMNS: &str =
    "id, account_id, counterparty_id, amount_cents, transaction_type, timestamp";

/// Outcome of a conditional balance update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceChange {
    /// The update was applied; holds the account as it is now.
    Applied(Account),
    /// The account exists but the guard failed; holds the untouched account.
    Rejected(Account),
    /// No account with that id.
    Missing,
}

/// Repository for persisting and querying accounts and their transactions.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run against an initialized database.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Start a unit of work. Everything done through it commits or rolls back together.
    pub async fn begin(&self) -> Result<UnitOfWork> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin database transaction")?;
        Ok(UnitOfWork { tx })
    }

    // ========================
    // Account operations
    // ========================

    /// Insert a new account and return it with its assigned id.
    pub async fn save_account(&self, account: &NewAccount) -> Result<Account> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO accounts (holder_name, account_type, balance_cents, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(&account.holder_name)
        .bind(account.account_type.as_str())
        .bind(account.opening_balance)
        .bind(account.created_at.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .context("Failed to save account")?;

        Self::row_to_account(&row)
    }

    /// Get an account by ID.
    pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account")?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    /// List all accounts, ordered by id.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts")?;

        rows.iter().map(Self::row_to_account).collect()
    }

    /// Delete an account. Returns false if there was nothing to delete.
    pub async fn delete_account(&self, id: AccountId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete account")?;
        Ok(result.rows_affected() > 0)
    }

    // ========================
    // Transaction operations
    // ========================

    /// List the whole journal, ordered by id.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// List entries owned by an account or naming it as counterparty.
    pub async fn list_transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE account_id = ? OR counterparty_id = ?
            ORDER BY id
            "#
        ))
        .bind(account_id)
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions for account")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    fn row_to_account(row: &SqliteRow) -> Result<Account> {
        let account_type_str: String = row.get("account_type");
        let created_at_str: String = row.get("created_at");

        Ok(Account {
            id: row.get("id"),
            holder_name: row.get("holder_name"),
            account_type: AccountType::parse(&account_type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid account type: {}", account_type_str))?,
            balance_cents: row.get("balance_cents"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
        let type_str: String = row.get("transaction_type");
        let timestamp_str: String = row.get("timestamp");

        Ok(Transaction {
            id: row.get("id"),
            account_id: row.get("account_id"),
            counterparty_id: row.get("counterparty_id"),
            amount_cents: row.get("amount_cents"),
            transaction_type: TransactionType::parse(&type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction type: {}", type_str))?,
            timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                .context("Invalid timestamp")?
                .with_timezone(&Utc),
        })
    }
}

/// A database transaction scoped to one service operation.
///
/// Dropping it without calling [`UnitOfWork::commit`] rolls everything back.
pub struct UnitOfWork {
    tx: sqlx::Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    /// Add `amount` to the balance unless that would overflow.
    pub async fn credit(&mut self, id: AccountId, amount: Cents) -> Result<BalanceChange> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE accounts
            SET balance_cents = balance_cents + ?
            WHERE id = ? AND balance_cents <= ?
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(amount)
        .bind(id)
        .bind(Cents::MAX - amount)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to credit account")?;

        self.resolve(id, row).await
    }

    /// Subtract `amount` from the balance unless the balance is lower than `amount`.
    pub async fn debit(&mut self, id: AccountId, amount: Cents) -> Result<BalanceChange> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE accounts
            SET balance_cents = balance_cents - ?
            WHERE id = ? AND balance_cents >= ?
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(amount)
        .bind(id)
        .bind(amount)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to debit account")?;

        self.resolve(id, row).await
    }

    /// Look up an account inside this unit of work.
    pub async fn get_account(&mut self, id: AccountId) -> Result<Option<Account>> {
        Self::fetch_account(&mut self.tx, id).await
    }

    /// Append a journal entry, assigning its id.
    pub async fn append_transaction(&mut self, transaction: &mut Transaction) -> Result<()> {
        let row = sqlx::query(
            r#"
            INSERT INTO transactions (account_id, counterparty_id, amount_cents, transaction_type, timestamp)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(transaction.account_id)
        .bind(transaction.counterparty_id)
        .bind(transaction.amount_cents)
        .bind(transaction.transaction_type.as_str())
        .bind(transaction.timestamp.to_rfc3339())
        .fetch_one(&mut *self.tx)
        .await
        .context("Failed to save transaction")?;

        transaction.id = row.get("id");
        Ok(())
    }

    pub async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .context("Failed to commit database transaction")
    }

    async fn resolve(
        &mut self,
        id: AccountId,
        updated: Option<SqliteRow>,
    ) -> Result<BalanceChange> {
        if let Some(row) = updated {
            return Ok(BalanceChange::Applied(Repository::row_to_account(&row)?));
        }
        Ok(match Self::fetch_account(&mut self.tx, id).await? {
            Some(account) => BalanceChange::Rejected(account),
            None => BalanceChange::Missing,
        })
    }

    async fn fetch_account(conn: &mut SqliteConnection, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
        .context("Failed to fetch account")?;

        row.as_ref().map(Repository::row_to_account).transpose()
    }
}
