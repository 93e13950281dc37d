//! REPL session management

use std::sync::Arc;

use colored::Colorize;
use eyre::Result;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info};

use crate::dialogue::{ConversationState, GREETING_COMMAND, Guardian, Request, Response, UiAction};

/// Roulettes spun back to back before the REPL hands control to the user
const MAX_CHAINED_SPINS: usize = 8;

/// Pick the winning option uniformly
pub fn spin<R: Rng + ?Sized>(options: &[String], rng: &mut R) -> Option<String> {
    options.choose(rng).cloned()
}

/// Interactive REPL session
pub struct ReplSession {
    guardian: Arc<Guardian>,
    state: ConversationState,
    rng: StdRng,
}

impl ReplSession {
    pub fn new(guardian: Arc<Guardian>, rng: StdRng) -> Self {
        Self {
            guardian,
            state: ConversationState::default(),
            rng,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();
        self.send(GREETING_COMMAND).await;

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    match self.handle_slash_command(input) {
                        Some(SlashResult::Continue) => continue,
                        Some(SlashResult::Quit) => break,
                        None => {
                            self.send(input).await;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Send one command, then spin any roulette that comes back
    ///
    /// Returns the last response seen.
    pub async fn send(&mut self, command: &str) -> Response {
        debug!(%command, "send: called");
        let mut response = self.exchange(command).await;

        for _ in 0..MAX_CHAINED_SPINS {
            if response.accion_ui != Some(UiAction::ShowRoulette) {
                break;
            }
            let options = response.opciones_ruleta.clone().unwrap_or_default();
            let Some(winner) = spin(&options, &mut self.rng) else {
                break;
            };
            self.print_roulette(&options, &winner);
            info!(%winner, options = options.len(), "Roulette spun");
            response = self.exchange(&winner).await;
        }
        response
    }

    async fn exchange(&mut self, command: &str) -> Response {
        let response = self.guardian.handle(Request::new(command, &self.state)).await;
        self.state = response.nuevo_estado.clone();
        if let Some(message) = &response.mensaje_para_ui {
            println!();
            println!("{}", message.bright_white());
            println!();
        }
        response
    }

    fn print_roulette(&self, options: &[String], winner: &str) {
        println!("{}", "Spinning the roulette...".bright_magenta());
        for option in options {
            if option == winner {
                println!("  {} {}", "▶".bright_magenta(), option.bold());
            } else {
                println!("    {}", option.dimmed());
            }
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Guardian".bright_cyan().bold());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    /// REPL-local commands; anything else goes to the Guardian
    fn handle_slash_command(&mut self, input: &str) -> Option<SlashResult> {
        let cmd = input.split_whitespace().next().unwrap_or("");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                Some(SlashResult::Continue)
            }
            "/quit" | "/q" | "/exit" => Some(SlashResult::Quit),
            "/state" => {
                println!("{} {}", "Mode:".bright_cyan(), self.state.flow.name());
                println!("{} {} turn(s)", "History:".bright_cyan(), self.state.history.len());
                Some(SlashResult::Continue)
            }
            _ => None,
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:22} Show this help", "/help".yellow());
        println!("  {:22} Exit the REPL", "/quit".yellow());
        println!("  {:22} Show the current mode", "/state".yellow());
        println!("  {:22} Leave the current mode", "/cancel".yellow());
        println!();
        println!("{}", "Things to ask for:".bright_cyan());
        println!("  {:22} Design and seal a contract", "forge a contract".yellow());
        println!("  {:22} Up to three contracts in a row", "combo".yellow());
        println!("  {:22} Fill the gap before an activity", "transition".yellow());
        println!("  {:22} Permission for a free activity", "ticket".yellow());
        println!("  {:22} Look up a sealed record", "CTR-4KQ2".yellow());
        println!();
    }
}

enum SlashResult {
    Continue,
    Quit,
}
