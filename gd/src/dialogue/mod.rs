//! Dialogue engine
//!
//! Each call maps (conversation state, command) to (new state, UI message,
//! optional roulette directive). The flows here are synchronous and pure
//! apart from the injected clock and RNG; `Guardian` in `router` wraps them
//! with the chat fallback and the repository.

mod combo;
mod contract;
mod input;
mod intent;
mod persona;
mod reply;
mod router;
mod state;
mod ticket;
mod transition;
mod wire;

use tracing::{debug, info};

pub use combo::{ComboSession, ComboStep, MAX_COMBO_TASKS};
pub use contract::{ContractDraft, ContractSession, ContractStep, Field};
pub use intent::{GREETING_COMMAND, Intent, ModeKind, classify};
pub use persona::{APOLOGY, chat_prompt, greeting, part_of_day};
pub use reply::{Reply, Turn, TurnContext};
pub use router::{Guardian, GuardianSettings};
pub use state::{ChatRole, ChatTurn, ConversationState, Flow, HISTORY_LIMIT};
pub use ticket::{MAX_TICKET_MINUTES, TicketSession, TicketStep};
pub use transition::{
    MIN_GAP_MINUTES, MIN_USABLE_MINUTES, SAFETY_MARGIN_RANGE, TransitionDraft, TransitionSession, TransitionStep,
    minutes_until,
};
pub use wire::{Request, Response, UiAction};

use crate::domain::SealedRecord;

/// Switch from idle into `kind`
pub fn enter(kind: ModeKind) -> Turn {
    info!(?kind, "Entering mode");
    match kind {
        ModeKind::Contract => Turn::stay(
            Flow::DesigningContract(ContractSession::start()),
            ContractSession::start_prompt(),
        ),
        ModeKind::Combo => Turn::stay(Flow::DesigningCombo(ComboSession::start()), ComboSession::start_prompt()),
        ModeKind::Transition => Turn::stay(
            Flow::NegotiatingTransition(TransitionSession::start()),
            TransitionSession::start_prompt(),
        ),
        ModeKind::Ticket => Turn::stay(Flow::IssuingTicket(TicketSession::start()), TicketSession::start_prompt()),
    }
}

/// Hand `command` to the active flow
pub fn advance(flow: Flow, command: &str, ctx: &mut TurnContext<'_>) -> Turn {
    debug!(mode = flow.name(), "advance: called");
    match flow {
        Flow::Idle => Turn::idle(Reply::default()),
        Flow::DesigningContract(session) => match session.advance(command, ctx) {
            contract::Progress::Continue(session, reply) => Turn::stay(Flow::DesigningContract(session), reply),
            contract::Progress::Sealed(contract) => Turn::sealed(
                Flow::DesigningContract(ContractSession::chain_next()),
                Reply::say("Forge another contract? (yes/no)"),
                SealedRecord::Contract(contract),
            ),
            contract::Progress::Exit(reply) => Turn::idle(reply),
        },
        Flow::DesigningCombo(session) => session.advance(command, ctx),
        Flow::NegotiatingTransition(session) => session.advance(command, ctx),
        Flow::IssuingTicket(session) => session.advance(command, ctx),
    }
}
