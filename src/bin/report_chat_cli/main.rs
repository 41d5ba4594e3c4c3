// ABOUTME: Report chat CLI - operate on chat threads stored in the chat memory database
// ABOUTME: Migrations, report registration, appends, compaction, views and live questions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Create the schema
//! report-chat-cli migrate
//!
//! # Register a report owned by a user
//! report-chat-cli register-report --report r-1 --user u-1 --title "ACME Q3"
//!
//! # Append a message
//! report-chat-cli append --report r-1 --user u-1 --role user --content "Why did margin fall?"
//!
//! # Compact the thread (uses Gemini when GEMINI_API_KEY is set)
//! report-chat-cli compact --report r-1 --user u-1
//!
//! # Show the live summary and the latest 10 messages
//! report-chat-cli show --report r-1 --user u-1 --limit 10
//! ```

mod commands;

use std::path::Path;

use clap::{Parser, Subcommand};
use report_chat_memory::{
    config::{AppConfig, DatabaseUrl},
    database::Database,
    errors::{AppError, AppResult},
    logging::{LogFormat, LoggingConfig},
};
use tracing::info;

type Result<T> = AppResult<T>;

#[derive(Parser)]
#[command(
    name = "report-chat-cli",
    about = "Report chat memory management CLI",
    long_about = "Command-line tool for inspecting and maintaining bounded report chat threads."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Create or update the chat schema
    Migrate,

    /// Register a report and its owner
    RegisterReport {
        /// Report id
        #[arg(long)]
        report: String,

        /// Owning user id
        #[arg(long)]
        user: String,

        /// Optional report title
        #[arg(long)]
        title: Option<String>,
    },

    /// Append a message to a thread
    Append {
        /// Report id
        #[arg(long)]
        report: String,

        /// Caller user id
        #[arg(long)]
        user: String,

        /// Message role (user, assistant, system)
        #[arg(long, default_value = "user")]
        role: String,

        /// Message text
        #[arg(long)]
        content: String,

        /// Model tag for a newly created session
        #[arg(long)]
        model: Option<String>,
    },

    /// Run a compaction check on a thread
    Compact {
        /// Report id
        #[arg(long)]
        report: String,

        /// Caller user id
        #[arg(long)]
        user: String,
    },

    /// Print the summary and recent messages as JSON
    Show {
        /// Report id
        #[arg(long)]
        report: String,

        /// Caller user id
        #[arg(long)]
        user: String,

        /// Number of messages (clamped to the configured maximum)
        #[arg(long)]
        limit: Option<i64>,
    },

    /// List sessions of a thread, newest first
    Sessions {
        /// Report id
        #[arg(long)]
        report: String,

        /// Caller user id
        #[arg(long)]
        user: String,
    },

    /// Ask a question and store the exchange (requires GEMINI_API_KEY)
    Ask {
        /// Report id
        #[arg(long)]
        report: String,

        /// Caller user id
        #[arg(long)]
        user: String,

        /// Question text
        #[arg(long)]
        question: String,

        /// Instruction block overriding the default report chat prompt
        #[arg(long)]
        instructions: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable JSON
    let logging = LoggingConfig::from_env().with_format(LogFormat::Compact);
    let logging = if cli.verbose {
        logging.with_level("debug")
    } else {
        logging
    };
    logging.init()?;

    let mut config = AppConfig::from_env()?;
    config.memory.validate()?;
    if let Some(url) = cli.database_url.as_deref() {
        config.database.url = DatabaseUrl::parse_url(url);
    }

    ensure_parent_dir(&config.database.url)?;
    info!(database = %config.database.url, "Opening chat database");
    let database = Database::connect(&config.database.url).await?;

    match cli.command {
        Command::Migrate => commands::thread::migrate(&database).await?,
        Command::RegisterReport {
            report,
            user,
            title,
        } => {
            commands::thread::register_report(&database, &config, &report, &user, title.as_deref())
                .await?;
        }
        Command::Append {
            report,
            user,
            role,
            content,
            model,
        } => {
            commands::thread::append(&database, &config, report, user, role, content, model).await?;
        }
        Command::Compact { report, user } => {
            commands::thread::compact(&database, &config, &report, &user).await?;
        }
        Command::Show {
            report,
            user,
            limit,
        } => {
            commands::thread::show(&database, &config, &report, &user, limit).await?;
        }
        Command::Sessions { report, user } => {
            commands::thread::sessions(&database, &config, &report, &user).await?;
        }
        Command::Ask {
            report,
            user,
            question,
            instructions,
        } => {
            commands::ask::ask(&database, &config, report, user, question, instructions).await?;
        }
    }

    Ok(())
}

/// `SQLite` creates the file but not its directory
fn ensure_parent_dir(url: &DatabaseUrl) -> Result<()> {
    if let DatabaseUrl::SQLite { path } = url {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir(parent)?;
        }
    }
    Ok(())
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| {
        AppError::config(format!("Cannot create database directory {}: {e}", path.display()))
    })
}
