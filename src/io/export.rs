use anyhow::Result;
use std::io::Write;

use crate::application::AccountService;
use crate::domain::{AccountId, Transaction, format_cents};

/// Exporter for writing the transaction journal as CSV
pub struct Exporter<'a> {
    service: &'a AccountService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a AccountService) -> Self {
        Self { service }
    }

    /// Export the journal, or one account's history, to CSV.
    /// Deleted accounts keep their history. Returns the number of rows written.
    pub async fn export_transactions_csv<W: Write>(
        &self,
        account: Option<AccountId>,
        writer: W,
    ) -> Result<usize> {
        let transactions = match account {
            Some(id) => self.service.list_journal_entries(id).await?,
            None => self.service.list_all_transactions().await?,
        };
        write_transactions_csv(&transactions, writer)
    }

    /// Export all accounts with their current balance to CSV.
    pub async fn export_accounts_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let accounts = self.service.list_accounts().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "holder_name", "account_type", "balance", "created_at"])?;

        for account in &accounts {
            csv_writer.write_record([
                account.id.to_string(),
                account.holder_name.clone(),
                account.account_type.as_str().to_string(),
                format_cents(account.balance_cents),
                account.created_at.to_rfc3339(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(accounts.len())
    }
}

fn write_transactions_csv<W: Write>(transactions: &[Transaction], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "id",
        "timestamp",
        "account_id",
        "counterparty_id",
        "transaction_type",
        "amount",
    ])?;

    for transaction in transactions {
        csv_writer.write_record([
            transaction.id.to_string(),
            transaction.timestamp.to_rfc3339(),
            transaction.account_id.to_string(),
            transaction
                .counterparty_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            transaction.transaction_type.as_str().to_string(),
            format_cents(transaction.amount_cents),
        ])?;
    }

    csv_writer.flush()?;
    Ok(transactions.len())
}
