use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use serde_json::Value;

use sealstore::SealStore;
use sealstore::cli::{Cli, Command};
use sealstore::config::Config;

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();
    Ok(())
}

fn field<'a>(record: &'a Value, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or("-")
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let store_path = cli.store.unwrap_or(config.store_path);

    info!("sealstore opening {}", store_path.display());
    let store = SealStore::open(&store_path)?;

    match cli.command {
        Command::List { tipo } => {
            let records = store.list(tipo.as_deref());
            if records.is_empty() {
                println!("No records found");
            } else {
                for record in records {
                    println!(
                        "{} {:9} {} {}",
                        field(record, "id").cyan(),
                        field(record, "tipo"),
                        field(record, "fecha_sellado").dimmed(),
                        field(record, "hora_sellado").dimmed()
                    );
                }
            }
        }
        Command::Show { id } => match store.get(&id) {
            Some(record) => {
                println!("{}", serde_json::to_string_pretty(record)?);
            }
            None => {
                eyre::bail!("No record with id {}", id);
            }
        },
        Command::Stats => {
            let stats = store.stats();
            println!("Store: {}", store.log_path().display().to_string().cyan());
            println!("  Records: {}", stats.records);
            println!("  Log lines: {}", stats.log_lines);
            println!("  Skipped lines: {}", stats.skipped_lines);
        }
    }

    Ok(())
}
