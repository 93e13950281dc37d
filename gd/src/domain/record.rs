//! Sealed records: the immutable output of each planning flow
//!
//! Records are persisted as flat JSON objects tagged by `tipo`, with
//! Spanish field names shared with the rest of the guardian tooling.

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::schedule::{Itinerary, ItineraryItem};

/// Stored in place of a duration the user chose not to set
pub const UNDEFINED_DURATION: &str = "undefined";

/// Which flow sealed a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Contract,
    Transition,
    Ticket,
}

impl RecordKind {
    /// Uppercase ID prefix
    pub fn prefix(self) -> &'static str {
        match self {
            RecordKind::Contract => "CTR",
            RecordKind::Transition => "BCH",
            RecordKind::Ticket => "TKT",
        }
    }

    /// Value of the persisted `tipo` tag
    pub fn tipo(self) -> &'static str {
        match self {
            RecordKind::Contract => "Contrato",
            RecordKind::Transition => "Bache",
            RecordKind::Ticket => "Ticket",
        }
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contract" | "contrato" | "ctr" => Ok(RecordKind::Contract),
            "transition" | "bache" | "bch" => Ok(RecordKind::Transition),
            "ticket" | "tkt" => Ok(RecordKind::Ticket),
            other => Err(format!("Unknown record kind '{}'. Expected contract, transition or ticket", other)),
        }
    }
}

/// Date and time a record was sealed, at second precision
pub fn seal_stamp(now: NaiveDateTime) -> (NaiveDate, NaiveTime) {
    let time = now.time();
    (now.date(), time.with_nanosecond(0).unwrap_or(time))
}

/// A single committed task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    #[serde(rename = "mision")]
    pub mission: String,
    #[serde(rename = "horario")]
    pub kickoff: String,
    #[serde(rename = "duracion")]
    pub duration: String,
    #[serde(rename = "fecha_sellado")]
    pub sealed_date: NaiveDate,
    #[serde(rename = "hora_sellado")]
    pub sealed_time: NaiveTime,
}

/// A calendarized itinerary packed before a mother activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionPlan {
    pub id: String,
    #[serde(rename = "actividad_madre")]
    pub mother_activity: String,
    #[serde(rename = "inicio_madre")]
    pub mother_start: NaiveDateTime,
    #[serde(rename = "minutos_utiles")]
    pub usable_minutes: u32,
    #[serde(rename = "tareas")]
    pub wishlist: Vec<String>,
    #[serde(rename = "itinerario")]
    pub itinerary: Vec<ItineraryItem>,
    #[serde(rename = "minutos_planificados")]
    pub planned_minutes: u32,
    #[serde(rename = "minutos_descanso")]
    pub rest_minutes: u32,
    /// `usable - planned - rest`; the transition flow holds back buffer and
    /// rests before allocating, so this stays at or above zero
    #[serde(rename = "minutos_libres")]
    pub unassigned_minutes: i64,
    #[serde(rename = "fecha_sellado")]
    pub sealed_date: NaiveDate,
    #[serde(rename = "hora_sellado")]
    pub sealed_time: NaiveTime,
}

impl TransitionPlan {
    /// Assemble a plan from its calendarized itinerary, deriving the totals
    pub fn from_itinerary(
        id: String,
        mother_activity: String,
        mother_start: NaiveDateTime,
        usable_minutes: u32,
        wishlist: Vec<String>,
        itinerary: Itinerary,
        sealed_at: NaiveDateTime,
    ) -> Self {
        let planned_minutes = itinerary.planned_minutes();
        let rest_minutes = itinerary.total_rest_minutes;
        let (sealed_date, sealed_time) = seal_stamp(sealed_at);
        Self {
            id,
            mother_activity,
            mother_start,
            usable_minutes,
            wishlist,
            itinerary: itinerary.items,
            planned_minutes,
            rest_minutes,
            unassigned_minutes: usable_minutes as i64 - planned_minutes as i64 - rest_minutes as i64,
            sealed_date,
            sealed_time,
        }
    }
}

/// Permission slip for a free activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    #[serde(rename = "actividad")]
    pub activity: String,
    #[serde(rename = "minutos")]
    pub minutes: u32,
    #[serde(rename = "fecha_sellado")]
    pub sealed_date: NaiveDate,
    #[serde(rename = "hora_sellado")]
    pub sealed_time: NaiveTime,
}

/// Any record kept by the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tipo")]
pub enum SealedRecord {
    #[serde(rename = "Contrato")]
    Contract(Contract),
    #[serde(rename = "Bache")]
    Transition(TransitionPlan),
    #[serde(rename = "Ticket")]
    Ticket(Ticket),
}

impl SealedRecord {
    pub fn id(&self) -> &str {
        match self {
            SealedRecord::Contract(c) => &c.id,
            SealedRecord::Transition(t) => &t.id,
            SealedRecord::Ticket(t) => &t.id,
        }
    }

    pub fn set_id(&mut self, id: String) {
        match self {
            SealedRecord::Contract(c) => c.id = id,
            SealedRecord::Transition(t) => t.id = id,
            SealedRecord::Ticket(t) => t.id = id,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            SealedRecord::Contract(_) => RecordKind::Contract,
            SealedRecord::Transition(_) => RecordKind::Transition,
            SealedRecord::Ticket(_) => RecordKind::Ticket,
        }
    }

    pub fn sealed_at(&self) -> NaiveDateTime {
        let (date, time) = match self {
            SealedRecord::Contract(c) => (c.sealed_date, c.sealed_time),
            SealedRecord::Transition(t) => (t.sealed_date, t.sealed_time),
            SealedRecord::Ticket(t) => (t.sealed_date, t.sealed_time),
        };
        date.and_time(time)
    }

    /// One-line summary for listings
    pub fn headline(&self) -> String {
        match self {
            SealedRecord::Contract(c) => format!("{} at {}", c.mission, c.kickoff),
            SealedRecord::Transition(t) => format!(
                "{} block(s) before {} at {}",
                t.itinerary.iter().filter(|i| matches!(i, ItineraryItem::Task(_))).count(),
                t.mother_activity,
                t.mother_start.format("%H:%M")
            ),
            SealedRecord::Ticket(t) => format!("{} for {} min", t.activity, t.minutes),
        }
    }

    /// Full card shown on seal and on lookup
    pub fn render(&self) -> String {
        match self {
            SealedRecord::Contract(c) => render_contract(c),
            SealedRecord::Transition(t) => render_transition(t),
            SealedRecord::Ticket(t) => render_ticket(t),
        }
    }
}

fn render_contract(c: &Contract) -> String {
    format!(
        "**CONTRACT {}**\n\
         --------------------\n\
         **Mission:** {}\n\
         **Kickoff:** {}\n\
         **Duration:** {}\n\
         --------------------\n\
         Sealed {} {}.",
        c.id,
        c.mission,
        c.kickoff,
        c.duration,
        c.sealed_date,
        c.sealed_time.format("%H:%M")
    )
}

/// Numbered itinerary lines, rests indented between blocks
pub fn render_itinerary(items: &[ItineraryItem]) -> String {
    let mut out = String::new();
    let mut n = 0;
    for item in items {
        match item {
            ItineraryItem::Task(entry) => {
                n += 1;
                let _ = writeln!(
                    out,
                    "{}. {}-{}  {} ({} min)",
                    n,
                    entry.start.format("%H:%M"),
                    entry.end.format("%H:%M"),
                    entry.label,
                    entry.duration_minutes
                );
            }
            ItineraryItem::Rest(rest) => {
                let _ = writeln!(out, "   rest {} min", rest.duration_minutes);
            }
        }
    }
    out
}

fn render_transition(t: &TransitionPlan) -> String {
    format!(
        "**TRANSITION PLAN {}**\n\
         Before *{}* at {}\n\
         --------------------\n\
         {}\
         --------------------\n\
         Planned: {} min | Rest: {} min | Unassigned: {} min (of {} usable)\n\
         Sealed {} {}.",
        t.id,
        t.mother_activity,
        t.mother_start.format("%H:%M"),
        render_itinerary(&t.itinerary),
        t.planned_minutes,
        t.rest_minutes,
        t.unassigned_minutes,
        t.usable_minutes,
        t.sealed_date,
        t.sealed_time.format("%H:%M")
    )
}

fn render_ticket(t: &Ticket) -> String {
    format!(
        "**TICKET {}**\n\
         --------------------\n\
         **Activity:** {}\n\
         **Allowance:** {} min\n\
         --------------------\n\
         Issued {} {}.",
        t.id,
        t.activity,
        t.minutes,
        t.sealed_date,
        t.sealed_time.format("%H:%M")
    )
}
