// SPDX-License-Identifier: MIT
// grocerd binary — a local console transport around the bot core.
//
// Reads utterances line by line from stdin as a single user and prints the
// bot's replies. Useful for poking at the core without a chat connection:
//
//   grocerd
//   grocerd --memory --user U-test
//   GROCERD_LOG=debug grocerd --data-dir /tmp/grocerd

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::AsyncBufReadExt as _;
use tracing::{info, warn};

use grocerd::config::BotConfig;
use grocerd::retry::RetryConfig;
use grocerd::store::{MemoryStore, SqliteStore, UserStore};
use grocerd::{Action, BotService};

#[derive(Parser)]
#[command(
    name = "grocerd",
    about = "Grocery-list bot — console session",
    version
)]
struct Args {
    /// Data directory for the SQLite database and config.toml
    #[arg(long, env = "GROCERD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "GROCERD_LOG")]
    log: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "GROCERD_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,

    /// User id this console session speaks as
    #[arg(long, env = "GROCERD_USER", default_value = "console")]
    user: String,

    /// Keep records in memory only (nothing written to disk)
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = BotConfig::new(args.data_dir.clone(), args.log.clone());
    let _log_guard = init_logging(&config.log, &config.log_format, args.log_file.as_deref());

    let store: Arc<dyn UserStore> = if args.memory {
        info!("using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(SqliteStore::new_with_slow_query(&config.data_dir, config.slow_query_ms).await?)
    };

    let service = BotService::new(store, config.bot_name.clone())
        .with_retry(RetryConfig::with_attempts(config.retry_attempts));

    info!(user = %args.user, data_dir = %config.data_dir.display(), "console session started");
    eprintln!("grocerd console — speaking as '{}'. Try: add milk, eggs", args.user);

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match service.handle(&args.user, &line).await {
            Ok(Some(reply)) => {
                println!("{}", reply.text);
                if reply.action == Some(Action::Shutdown) {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(err = ?e, "command failed");
                println!("Something went wrong on my end. Please try again.");
            }
        }
    }

    info!("console session ended");
    Ok(())
}

/// Initialise tracing. Returns the appender guard when logging to a file —
/// dropping it would lose buffered log lines.
fn init_logging(
    log_level: &str,
    log_format: &str,
    log_file: Option<&std::path::Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("grocerd.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            // Fall back to stderr-only — don't panic on a bad log path.
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stderr",
                dir.display()
            );
            init_stderr_logging(log_level, use_json);
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().with_writer(non_blocking))
                .init();
        }
        Some(guard)
    } else {
        init_stderr_logging(log_level, use_json);
        None
    }
}

fn init_stderr_logging(log_level: &str, use_json: bool) {
    use tracing_subscriber::EnvFilter;

    // stderr keeps log lines apart from the bot's replies on stdout.
    if use_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::new(log_level))
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(log_level))
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
