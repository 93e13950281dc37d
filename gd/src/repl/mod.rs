//! Interactive terminal front end
//!
//! The REPL is the presentation layer: it renders messages, spins roulettes
//! and feeds the winning option back to the Guardian as the next command.

mod session;

pub use session::{ReplSession, spin};

use std::sync::Arc;

use eyre::Result;
use rand::rngs::StdRng;

use crate::dialogue::Guardian;

/// Run the interactive REPL
///
/// This is the main entry point for `gd chat`.
pub async fn run_interactive(guardian: Arc<Guardian>, rng: StdRng) -> Result<()> {
    let mut session = ReplSession::new(guardian, rng);
    session.run().await
}
