//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::RecordKind;

/// Guardian - conversational planner
#[derive(Parser)]
#[command(
    name = "gd",
    about = "Forge contracts, transition plans and tickets through conversation",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/guardian/logs/guardian.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level override (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Talk to the Guardian interactively (default)
    Chat,

    /// Read one request JSON on stdin and print the response JSON
    Exchange,

    /// Print a sealed record
    Show {
        /// Record ID, e.g. CTR-4KQ2
        id: String,
    },

    /// List sealed records
    List {
        /// Only records of this kind (contract, transition, ticket)
        #[arg(short, long)]
        kind: Option<RecordKind>,
    },
}

pub fn log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("guardian")
        .join("logs")
        .join("guardian.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["gd"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_exchange() {
        let cli = Cli::parse_from(["gd", "exchange"]);
        assert!(matches!(cli.command, Some(Command::Exchange)));
    }

    #[test]
    fn test_cli_parse_show() {
        let cli = Cli::parse_from(["gd", "show", "CTR-4KQ2"]);
        if let Some(Command::Show { id }) = cli.command {
            assert_eq!(id, "CTR-4KQ2");
        } else {
            panic!("Expected Show command");
        }
    }

    #[test]
    fn test_cli_parse_list_kind() {
        let cli = Cli::parse_from(["gd", "list", "--kind", "transition"]);
        assert!(matches!(
            cli.command,
            Some(Command::List {
                kind: Some(RecordKind::Transition)
            })
        ));
        assert!(Cli::try_parse_from(["gd", "list", "--kind", "poem"]).is_err());
    }

    #[test]
    fn test_cli_with_config_and_level() {
        let cli = Cli::parse_from(["gd", "-c", "/path/to/guardian.yml", "--log-level", "debug", "chat"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/guardian.yml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Some(Command::Chat)));
    }
}
