//! CLI entry point for Birthday Finder.
//!
//! This binary provides the `bfinder` command: dataset encryption tooling,
//! the three birthday views, allowlist management, and the daily email job
//! (one-shot or scheduled).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bfinder_auth::AuthStore;
use bfinder_notify::{DailyEmailJob, Mailer, SmtpConfig};
use bfinder_notify::job::{DEFAULT_SEND_TIME, SEND_TIME_ENV, SENDER_NAME_ENV};
use bfinder_query::{QueryEngine, SystemClock};
use bfinder_records::cipher::{self, CellCipher};
use bfinder_records::dataset;
use bfinder_records::{RecordStore, StoreConfig};

/// Environment variable holding the auth database path.
const DB_ENV: &str = "BFINDER_DB";

/// Default auth database path.
const DEFAULT_DB: &str = "data/auth.db";

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Birthday Finder — encrypted birthday records and daily reminders.
#[derive(Parser)]
#[command(
    name = "bfinder",
    version,
    about = "Birthday Finder — encrypted birthday records and daily reminders"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh base64 dataset key.
    Keygen,

    /// Encrypt a plaintext dataset cell-for-cell with the configured key.
    Encrypt {
        /// Plaintext CSV to read.
        input: PathBuf,
        /// Encrypted CSV to write.
        output: PathBuf,
    },

    /// Print today's birthdays as JSON.
    Today,

    /// Print birthdays on the next N distinct future days as JSON.
    Upcoming {
        /// Number of distinct future calendar days to include.
        #[arg(long, default_value_t = 7)]
        days: usize,
    },

    /// Print yesterday's missed birthdays as JSON.
    Missed,

    /// Run the daily email job once, right now.
    SendDaily,

    /// Run the daily email job on its cron schedule, forever.
    Schedule,

    /// Manage the authorization allowlist and schedule flags.
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Add an email to the allowlist.
    Add { email: String },
    /// Remove an email from the allowlist.
    Remove { email: String },
    /// List the allowlist, marking users with the daily email enabled.
    List,
    /// Enable the daily email for a user.
    Enable { email: String },
    /// Disable the daily email for a user.
    Disable { email: String },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("info");

    let cli = Cli::parse();
    match cli.command {
        Commands::Keygen => cmd_keygen(),
        Commands::Encrypt { input, output } => cmd_encrypt(&input, &output),
        Commands::Today => cmd_today(),
        Commands::Upcoming { days } => cmd_upcoming(days),
        Commands::Missed => cmd_missed(),
        Commands::SendDaily => cmd_send_daily().await,
        Commands::Schedule => cmd_schedule().await,
        Commands::Auth { command } => cmd_auth(command),
    }
}

/// Initialize the tracing subscriber, honoring `RUST_LOG` when set.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn engine() -> Result<QueryEngine> {
    let config = StoreConfig::from_env().context("record store configuration")?;
    Ok(QueryEngine::new(Arc::new(RecordStore::new(config))))
}

fn auth_store() -> Result<AuthStore> {
    let path = std::env::var(DB_ENV).unwrap_or_else(|_| DEFAULT_DB.to_string());
    if let Some(parent) = std::path::Path::new(&path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context("creating auth database directory")?;
    }
    AuthStore::open(&path).context("opening auth database")
}

fn print_json<T: serde::Serialize>(rows: &[T]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn cmd_keygen() -> Result<()> {
    let key = cipher::generate_key()?;
    println!("{}", cipher::encode_key(&key));
    Ok(())
}

fn cmd_encrypt(input: &PathBuf, output: &PathBuf) -> Result<()> {
    let config = StoreConfig::from_env().context("record store configuration")?;
    let cipher = CellCipher::new(&config.key)?;
    let rows = dataset::encrypt_dataset(&cipher, input, output)?;
    println!("Encrypted {rows} rows into {}", output.display());
    Ok(())
}

fn cmd_today() -> Result<()> {
    print_json(&engine()?.today(&SystemClock)?)
}

fn cmd_upcoming(days: usize) -> Result<()> {
    print_json(&engine()?.upcoming(&SystemClock, days)?)
}

fn cmd_missed() -> Result<()> {
    print_json(&engine()?.missed(&SystemClock)?)
}

fn daily_job() -> Result<DailyEmailJob<Mailer>> {
    let smtp = SmtpConfig::from_env().context("smtp configuration")?;
    let sender_name =
        std::env::var(SENDER_NAME_ENV).unwrap_or_else(|_| "Birthday Reminder".to_string());
    Ok(DailyEmailJob::new(
        engine()?,
        auth_store()?,
        Mailer::new(smtp),
        sender_name,
    ))
}

async fn cmd_send_daily() -> Result<()> {
    let report = daily_job()?.run_once(&SystemClock).await?;
    info!(
        birthdays = report.birthdays,
        recipients = report.recipients,
        sent = report.sent,
        "daily email run complete"
    );
    Ok(())
}

async fn cmd_schedule() -> Result<()> {
    let send_time =
        std::env::var(SEND_TIME_ENV).unwrap_or_else(|_| DEFAULT_SEND_TIME.to_string());
    daily_job()?.run_scheduled(&send_time).await?;
    Ok(())
}

fn cmd_auth(command: AuthCommands) -> Result<()> {
    let store = auth_store()?;
    match command {
        AuthCommands::Add { email } => {
            store.add(&email)?;
            println!("added {email}");
        }
        AuthCommands::Remove { email } => {
            store.remove(&email)?;
            println!("removed {email}");
        }
        AuthCommands::List => {
            for email in store.list_authorized()? {
                let flag = if store.schedule_enabled(&email)? {
                    " [daily email]"
                } else {
                    ""
                };
                println!("{email}{flag}");
            }
        }
        AuthCommands::Enable { email } => {
            store.set_schedule_enabled(&email, true)?;
            println!("daily email enabled for {email}");
        }
        AuthCommands::Disable { email } => {
            store.set_schedule_enabled(&email, false)?;
            println!("daily email disabled for {email}");
        }
    }
    Ok(())
}
