//! # SaleGuard dedupe
//!
//! Operator CLI that finds sales recorded more than once and removes the
//! extra copies.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          dedupe                                         │
//! │                                                                         │
//! │  main.rs ──► init_tracing() ──► Cli::parse() ──► run(cli)              │
//! │                                                    │                    │
//! │                        Settings::load(--config) ◄──┤                    │
//! │                        Database::new(db_config) ◄──┤                    │
//! │                                                    ▼                    │
//! │                    ┌──────────────┬──────────────┬──────────────┐       │
//! │                    │   import     │    scan      │    purge     │       │
//! │                    │ feed → DB    │ detect +     │ detect +     │       │
//! │                    │              │ report       │ delete +     │       │
//! │                    │              │              │ rescan       │       │
//! │                    └──────────────┴──────────────┴──────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod config;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use saleguard_db::Database;

use crate::cli::{Cli, Command};
use crate::config::Settings;

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. Logs go to stderr so that
/// stdout stays clean for `scan --json`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,saleguard=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads settings, opens the database and runs one subcommand.
pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(path) = cli.database {
        settings.database_path = path;
    }

    info!(
        database = %settings.database_path.display(),
        tenant_id = %settings.tenant_id,
        "Settings loaded"
    );

    let db = Database::new(settings.db_config())
        .await
        .with_context(|| format!("Failed to open {}", settings.database_path.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let outcome = match &cli.command {
        Command::Scan(args) => commands::scan(&db, &settings, args, &mut out)
            .await
            .map(|_| ()),
        Command::Purge(args) => commands::purge(&db, &settings, args, &mut out)
            .await
            .map(|_| ()),
        Command::Import(args) => commands::import(&db, &settings, &args.file, &mut out)
            .await
            .map(|_| ()),
    };

    db.close().await;
    outcome
}
