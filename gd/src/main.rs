//! Guardian - conversational planner
//!
//! CLI entry point for chatting, one-shot exchanges and record inspection.

use std::fs;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use guardian::cli::{Cli, Command};
use guardian::clock::SystemClock;
use guardian::config::Config;
use guardian::dialogue::{Guardian, GuardianSettings, Request};
use guardian::domain::{RecordKind, find_record_id};
use guardian::llm::create_client;
use guardian::repl;
use guardian::store::{ContractRepository, RecordStore};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Logging isn't initialized yet, so nothing here can log
    let log_path = guardian::cli::log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(provider = %config.llm.provider, store = %config.storage.store_dir.display(), "Guardian loaded config");

    let store = RecordStore::spawn(&config.storage.store_dir).context("Failed to open record store")?;

    debug!(command = ?cli.command, "main: dispatching command");
    let result = match cli.command {
        None | Some(Command::Chat) => cmd_chat(&config, store.clone()).await,
        Some(Command::Exchange) => cmd_exchange(&config, store.clone()).await,
        Some(Command::Show { id }) => cmd_show(&store, &id).await,
        Some(Command::List { kind }) => cmd_list(&store, kind).await,
    };

    if let Err(e) = store.shutdown().await {
        debug!(error = %e, "main: store already stopped");
    }
    result
}

fn rng_from(config: &Config) -> StdRng {
    match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn build_guardian(config: &Config, store: RecordStore) -> Result<Guardian> {
    config.validate()?;
    let chat = create_client(&config.llm).map_err(|e| eyre::eyre!("Failed to create chat client: {}", e))?;
    let settings = GuardianSettings {
        user_name: config.user_name.clone(),
        chat_timeout: Duration::from_millis(config.llm.timeout_ms),
    };
    Ok(Guardian::new(
        Arc::new(store),
        chat,
        Arc::new(SystemClock),
        rng_from(config),
        settings,
    ))
}

async fn cmd_chat(config: &Config, store: RecordStore) -> Result<()> {
    debug!("cmd_chat: called");
    let guardian = Arc::new(build_guardian(config, store)?);
    // separate stream so the REPL's spins don't shift the Guardian's draws
    let spin_rng = StdRng::seed_from_u64(rng_from(config).random());
    repl::run_interactive(guardian, spin_rng).await
}

async fn cmd_exchange(config: &Config, store: RecordStore) -> Result<()> {
    debug!("cmd_exchange: called");
    let guardian = build_guardian(config, store)?;

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read request from stdin")?;
    let request: Request = serde_json::from_str(&input).context("Request is not valid JSON")?;

    let response = guardian.handle(request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn cmd_show(store: &RecordStore, id: &str) -> Result<()> {
    debug!(%id, "cmd_show: called");
    let Some(id) = find_record_id(id) else {
        return Err(eyre::eyre!("'{}' is not a record id (expected e.g. CTR-4KQ2)", id));
    };
    match store.get(&id).await? {
        Some(record) => {
            println!("{}", record.render());
            Ok(())
        }
        None => Err(eyre::eyre!("No record with id {}", id)),
    }
}

async fn cmd_list(store: &RecordStore, kind: Option<RecordKind>) -> Result<()> {
    debug!(?kind, "cmd_list: called");
    let records = store.list(kind).await?;
    if records.is_empty() {
        println!("{}", "No records sealed yet.".dimmed());
        return Ok(());
    }
    for record in &records {
        println!(
            "{}  {:8}  {}  {}",
            record.id().bright_cyan(),
            record.kind().tipo(),
            record.sealed_at().format("%Y-%m-%d %H:%M"),
            record.headline()
        );
    }
    println!();
    println!("{} record(s)", records.len());
    Ok(())
}
