use std::fs::File;
use std::io::{Write, stderr, stdout};
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

use crate::application::AccountService;
use crate::domain::AccountId;
use crate::http;
use crate::io::Exporter;

/// Bursar - bank-account ledger over HTTP
#[derive(Parser)]
#[command(name = "bursar")]
#[command(about = "A bank-account ledger: accounts, deposits, withdrawals and transfers over HTTP")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "bursar.db", global = true)]
    pub database: String,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, default_value = "info", global = true)]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Serve the HTTP API (initializes the database if needed)
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,
    },

    /// Export data to CSV
    Export {
        /// What to export
        #[arg(value_enum)]
        export_type: ExportType,

        /// Only export the history of this account (transactions only)
        #[arg(long)]
        account: Option<AccountId>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ExportType {
    /// The transaction journal
    Transactions,
    /// Accounts with their balances
    Accounts,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        setup_logging(self.log_level);

        match self.command {
            Commands::Init => {
                AccountService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Serve { bind } => {
                let service = AccountService::init(&self.database).await?;
                info!(database = %self.database, "database ready");
                http::serve(service, bind).await?;
            }

            Commands::Export {
                export_type,
                account,
                output,
            } => {
                let service = AccountService::connect(&self.database).await?;
                run_export_command(&service, export_type, account, output).await?;
            }
        }

        Ok(())
    }
}

async fn run_export_command(
    service: &AccountService,
    export_type: ExportType,
    account: Option<AccountId>,
    output: Option<PathBuf>,
) -> Result<()> {
    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match export_type {
        ExportType::Transactions => exporter.export_transactions_csv(account, writer).await?,
        ExportType::Accounts => {
            if account.is_some() {
                anyhow::bail!("--account only applies to transaction exports");
            }
            exporter.export_accounts_csv(writer).await?
        }
    };

    if output.is_some() {
        eprintln!("Exported {} rows", count);
    }
    Ok(())
}

fn setup_logging(level: LevelFilter) {
    // stdout is reserved for command output (CSV exports)
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry().with(terminal_log).init();
}
