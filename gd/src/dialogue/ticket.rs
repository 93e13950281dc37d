//! Ticket issuance: a permission slip for a free activity

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::input::minute_count;
use super::reply::{Reply, Turn, TurnContext};
use super::state::Flow;
use crate::domain::{RecordKind, SealedRecord, Ticket, generate_id, seal_stamp};
use crate::schedule::normalize_minutes;

/// Longest allowance a ticket grants
pub const MAX_TICKET_MINUTES: u32 = 240;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStep {
    AwaitTicketActivity,
    AwaitTicketMinutes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSession {
    pub step: TicketStep,
    #[serde(default)]
    pub activity: String,
}

impl TicketSession {
    pub fn start() -> Self {
        Self {
            step: TicketStep::AwaitTicketActivity,
            activity: String::new(),
        }
    }

    pub fn start_prompt() -> Reply {
        Reply::say("Ticket mode on.\nWhat activity is the ticket for?")
    }

    pub fn advance(self, command: &str, ctx: &mut TurnContext<'_>) -> Turn {
        debug!(step = ?self.step, "TicketSession::advance: called");
        match self.step {
            TicketStep::AwaitTicketActivity => {
                let activity = command.trim();
                if activity.is_empty() {
                    return Turn::stay(Flow::IssuingTicket(self), Reply::say("Name the activity."));
                }
                let reply = Reply::say(format!(
                    "How many minutes for **{}**? (1-{})",
                    activity, MAX_TICKET_MINUTES
                ));
                let session = Self {
                    step: TicketStep::AwaitTicketMinutes,
                    activity: activity.to_string(),
                };
                Turn::stay(Flow::IssuingTicket(session), reply)
            }
            TicketStep::AwaitTicketMinutes => match minute_count(command)
                .filter(|m| (1..=MAX_TICKET_MINUTES).contains(m))
            {
                Some(minutes) => {
                    let (sealed_date, sealed_time) = seal_stamp(ctx.now);
                    let ticket = Ticket {
                        id: generate_id(RecordKind::Ticket.prefix(), &mut *ctx.rng),
                        activity: self.activity,
                        minutes: normalize_minutes(minutes),
                        sealed_date,
                        sealed_time,
                    };
                    info!(id = %ticket.id, minutes = ticket.minutes, "Ticket issued");
                    Turn::sealed(Flow::Idle, Reply::say("Enjoy it. Back to chat mode."), SealedRecord::Ticket(ticket))
                }
                None => {
                    let reply = Reply::say(format!(
                        "I need a whole number of minutes between 1 and {}.",
                        MAX_TICKET_MINUTES
                    ));
                    Turn::stay(Flow::IssuingTicket(self), reply)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn step(session: TicketSession, command: &str) -> Turn {
        let now = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(21, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let mut ctx = TurnContext { now, rng: &mut rng };
        session.advance(command, &mut ctx)
    }

    fn minutes_step() -> TicketSession {
        TicketSession {
            step: TicketStep::AwaitTicketMinutes,
            activity: "Games".to_string(),
        }
    }

    #[test]
    fn test_issue_ticket() {
        let turn = step(TicketSession::start(), "Games");
        assert_eq!(turn.flow, Flow::IssuingTicket(minutes_step()));

        let turn = step(minutes_step(), "32 min");
        assert!(turn.flow.is_idle());
        let Some(SealedRecord::Ticket(ticket)) = turn.seal else {
            panic!("expected a ticket");
        };
        assert_eq!(ticket.minutes, 30);
        assert_eq!(ticket.activity, "Games");
        assert!(ticket.id.starts_with("TKT-"));
    }

    #[test]
    fn test_small_allowance_rounds_up_to_five() {
        let turn = step(minutes_step(), "2");
        let Some(SealedRecord::Ticket(ticket)) = turn.seal else {
            panic!("expected a ticket");
        };
        assert_eq!(ticket.minutes, 5);
    }

    #[test]
    fn test_out_of_range_reprompts() {
        for bad in ["0", "241", "lots", ""] {
            let turn = step(minutes_step(), bad);
            assert_eq!(turn.flow, Flow::IssuingTicket(minutes_step()), "input {:?}", bad);
            assert!(turn.seal.is_none());
        }
    }
}
