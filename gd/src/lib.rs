//! Guardian - conversational planning core
//!
//! Guardian turns a chat into sealed commitments. From a free-form
//! conversation the user can forge a **contract** (mission, kickoff,
//! duration), negotiate a **transition plan** that fills the gap before a
//! fixed "mother" activity with time-boxed tasks and rests, or issue a
//! **ticket** for a free activity.
//!
//! # Core Concepts
//!
//! - **State travels with the call**: every command carries the conversation
//!   state and gets the next one back; nothing is kept per session
//! - **Roulette**: when several candidates are offered, the UI spins and
//!   feeds the winner back as the next command
//! - **Sealed records**: confirmed plans are filed in an append-only store and
//!   can be looked up by ID (`CTR-4KQ2`)
//!
//! # Modules
//!
//! - [`dialogue`] - Router, flows and wire format
//! - [`schedule`] - Duration parsing, allocation and calendarizing
//! - [`domain`] - Records, IDs and mission layering
//! - [`store`] - Repository trait and the store actor
//! - [`llm`] - Chat collaborator clients
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//! - [`repl`] - Interactive terminal front end

pub mod cli;
pub mod clock;
pub mod config;
pub mod dialogue;
pub mod domain;
pub mod llm;
pub mod repl;
pub mod schedule;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use dialogue::{ConversationState, Guardian, GuardianSettings, Request, Response};
pub use domain::{RecordKind, SealedRecord};
pub use store::{ContractRepository, MemoryRepository, RecordStore};
