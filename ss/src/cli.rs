//! CLI argument parsing for sealstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ss")]
#[command(author, version, about = "Inspect sealed planning records", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Store directory (overrides config)
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List sealed records
    List {
        /// Only records of this tipo (Contrato, Bache, Ticket)
        #[arg(short, long)]
        tipo: Option<String>,
    },

    /// Print one record as pretty JSON
    Show {
        /// Record ID, e.g. CTR-4KQ2
        #[arg(required = true)]
        id: String,
    },

    /// Show log statistics
    Stats,
}
