//! Domain types: record IDs, mission layering, sealed records

mod id;
mod mission;
mod record;

pub use id::{SUFFIX_LEN, find_record_id, generate_id, is_record_id};
pub use mission::{LAYER_SEPARATOR, MissionSpec};
pub use record::{
    Contract, RecordKind, SealedRecord, Ticket, TransitionPlan, UNDEFINED_DURATION, render_itinerary, seal_stamp,
};
