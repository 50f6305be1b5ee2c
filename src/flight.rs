use crate::time::Minute;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type FlightId = Arc<str>;

/// Sentinel for an absent pad field. Records carrying it stay in the flat
/// list and in the global conflict input but are excluded from grouped
/// rows.
pub const UNKNOWN_PAD: &str = "Unknown";

/// One parsed schedule leg. Immutable once emitted by the parser; every
/// downstream structure is recomputed from the current record list.
///
/// `duration` may be zero or negative when the source times are inverted,
/// and `start`/`end` are whatever the time codec decoded, clock-valid or
/// not. Both are deliberate tolerance of messy source data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub id: FlightId,
    pub from: String,
    pub to: String,
    pub start: Minute,
    pub end: Minute,
    pub duration: Minute,
    pub aircraft: String,
    pub takeoff_pad: String,
    pub landing_pad: String,
    pub operator: String,
    pub crew: String,
    /// Original matched tokens, kept for traceability.
    pub raw_etd: String,
    pub raw_eta: String,
}
