use crate::flight::{FlightRecord, UNKNOWN_PAD};
use crate::time::Minute;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The fixed transfer hub all occupancy analysis is relative to.
pub const HUB_ID: &str = "PDR";

/// Symmetric occupancy window around each scheduled time.
pub const BUFFER_MINS: Minute = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Departure,
    Arrival,
}

/// Grouping dimension for rows: by pad identifier or by aircraft.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Pad,
    Aircraft,
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pad" => Ok(ViewMode::Pad),
            "aircraft" => Ok(ViewMode::Aircraft),
            other => Err(format!("unknown view mode: {}", other)),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Pad => write!(f, "pad"),
            ViewMode::Aircraft => write!(f, "aircraft"),
        }
    }
}

/// A hub-relative timed event derived from one leg of a record. `flight`
/// is the index of the originating record in the parse output; records
/// own the data, events are recomputed views.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HubEvent {
    pub kind: EventKind,
    pub time: Minute,
    pub pad: String,
    pub flight: usize,
    pub start_buffer: Minute,
    pub end_buffer: Minute,
}

impl HubEvent {
    fn new(kind: EventKind, time: Minute, pad: &str, flight: usize) -> Self {
        HubEvent {
            kind,
            time,
            pad: pad.to_string(),
            flight,
            start_buffer: time - BUFFER_MINS,
            end_buffer: time + BUFFER_MINS,
        }
    }
}

/// A grouped timeline row: all events sharing one grouping key, sorted
/// ascending by buffer start.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Row {
    pub label: String,
    pub events: Vec<HubEvent>,
}

/// Expands records into buffered hub events. A record contributes a
/// departure when its origin is the hub and an arrival when its
/// destination is, so zero, one, or two events per record. A leg whose
/// pad field is empty contributes nothing.
pub fn hub_events(flights: &[FlightRecord]) -> Vec<HubEvent> {
    let mut events = Vec::new();
    for (index, f) in flights.iter().enumerate() {
        if f.from == HUB_ID && !f.takeoff_pad.is_empty() {
            events.push(HubEvent::new(
                EventKind::Departure,
                f.start,
                &f.takeoff_pad,
                index,
            ));
        }
        if f.to == HUB_ID && !f.landing_pad.is_empty() {
            events.push(HubEvent::new(
                EventKind::Arrival,
                f.end,
                &f.landing_pad,
                index,
            ));
        }
    }
    events
}

/// Groups hub events into rows keyed by pad or aircraft. Keys sort
/// lexicographically. Events on an unknown pad appear in no row in either
/// view mode, though they still feed the global conflict input.
pub fn group_rows(flights: &[FlightRecord], mode: ViewMode) -> Vec<Row> {
    let mut groups: BTreeMap<String, Vec<HubEvent>> = BTreeMap::new();

    for event in hub_events(flights) {
        if event.pad == UNKNOWN_PAD {
            continue;
        }
        let key = match mode {
            ViewMode::Pad => event.pad.clone(),
            ViewMode::Aircraft => flights[event.flight].aircraft.clone(),
        };
        if key.is_empty() || key == UNKNOWN_PAD {
            continue;
        }
        groups.entry(key).or_default().push(event);
    }

    groups
        .into_iter()
        .map(|(label, mut events)| {
            events.sort_by_key(|e| e.start_buffer);
            Row { label, events }
        })
        .collect()
}
