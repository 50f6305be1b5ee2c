use crate::flight::{FlightId, FlightRecord, UNKNOWN_PAD};
use crate::time::decode_time;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Section-header rows (e.g. `"Pickup/ Delivery",,,,`) separate blocks of
/// schedule rows and never carry data. Case-sensitive prefix match.
const SECTION_HEADER_PREFIX: &str = "Pickup";

/// Pad sentinel for unstructured extraction when a capture is absent.
const PAD_TBD: &str = "TBD";
/// Personnel sentinel for unstructured extraction.
const PERSONNEL_EXTRACTED: &str = "Extracted";

/// Which recognition pass produced the records. The unstructured pass runs
/// only when the structured pass extracts zero records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Structured,
    Unstructured,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Structured => write!(f, "structured"),
            Strategy::Unstructured => write!(f, "unstructured"),
        }
    }
}

pub struct ParseOutcome {
    pub flights: Vec<FlightRecord>,
    pub strategy: Strategy,
}

struct Patterns {
    /// ETD column: 3 uppercase letters, optional separator, 4 digits,
    /// anywhere in the column value.
    etd_column: Regex,
    /// Leading 3-letter location code of a time token.
    location_prefix: Regex,
    /// Free-text scan: two location+time tokens, an aircraft code, then up
    /// to four optional positional tokens (takeoff pad, landing pad,
    /// operator, crew).
    freeform: Regex,
}

impl Patterns {
    fn new() -> Self {
        Self {
            etd_column: Regex::new(r"[A-Z]{3}\s*-?\s*\d{4}").unwrap(),
            location_prefix: Regex::new(r"^([A-Z]{3})").unwrap(),
            freeform: Regex::new(
                r"([A-Z]{3}\s*-?\s*\d{3,4})\s+([A-Z]{3}\s*-?\s*\d{3,4})\s+([A-Z]{2}\d+)(?:\s+([0-9A-Z]+))?(?:\s+([0-9A-Z]+))?(?:\s+([A-Za-z]+))?(?:\s+([A-Za-z]+))?",
            )
            .unwrap(),
        }
    }
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(Patterns::new)
}

/// Parses raw schedule text into records, structured pass first, falling
/// back to the whole-text scan when it finds nothing. Output is sorted
/// ascending by `start`; the sort is stable, so equal starts keep their
/// discovery order.
pub fn parse_schedule(text: &str) -> ParseOutcome {
    let mut flights: Vec<FlightRecord> = text
        .lines()
        .enumerate()
        .filter_map(|(index, line)| parse_structured_line(line, index))
        .collect();

    let mut strategy = Strategy::Structured;
    if flights.is_empty() {
        let extracted = extract_unstructured(text);
        if !extracted.is_empty() {
            flights = extracted;
            strategy = Strategy::Unstructured;
        }
    }

    flights.sort_by_key(|f| f.start);
    ParseOutcome { flights, strategy }
}

/// Splits a delimited row into column values. Quoted substrings become
/// single tokens with the quotes stripped, kept even when empty; unquoted
/// values are split on commas, trimmed, and dropped when empty.
fn split_columns(line: &str) -> Vec<String> {
    let mut cols = Vec::new();
    let mut buf = String::new();
    let mut in_quotes = false;
    let mut was_quoted = false;

    let flush = |buf: &mut String, was_quoted: &mut bool| {
        let value = if *was_quoted {
            buf.trim().to_string()
        } else {
            let trimmed = buf.trim();
            if trimmed.is_empty() {
                buf.clear();
                *was_quoted = false;
                return None;
            }
            trimmed.to_string()
        };
        buf.clear();
        *was_quoted = false;
        Some(value)
    };

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                if in_quotes {
                    was_quoted = true;
                }
            }
            ',' if !in_quotes => {
                if let Some(value) = flush(&mut buf, &mut was_quoted) {
                    cols.push(value);
                }
            }
            _ => buf.push(ch),
        }
    }
    if let Some(value) = flush(&mut buf, &mut was_quoted) {
        cols.push(value);
    }
    cols
}

/// Structured pass over a single row. The ETD column anchors the layout;
/// everything else is positional relative to it. Returns None for blank
/// lines, section headers, rows without an ETD column, rows whose times do
/// not decode, and rows without an aircraft value.
fn parse_structured_line(line: &str, index: usize) -> Option<FlightRecord> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let bare = trimmed.strip_prefix('"').unwrap_or(trimmed);
    if bare.starts_with(SECTION_HEADER_PREFIX) {
        return None;
    }

    let p = patterns();
    let cols = split_columns(trimmed);
    let etd_index = cols.iter().position(|c| p.etd_column.is_match(c))?;

    let raw_etd = cols[etd_index].clone();
    let raw_eta = cols.get(etd_index + 1).filter(|c| !c.is_empty())?.clone();
    let aircraft = cols.get(etd_index + 2).filter(|c| !c.is_empty())?.clone();

    let start = decode_time(&raw_etd)?;
    let end = decode_time(&raw_eta)?;

    let location_of = |raw: &str, fallback: Option<usize>| {
        p.location_prefix
            .captures(raw)
            .map(|c| c[1].to_string())
            .or_else(|| {
                fallback
                    .and_then(|i| cols.get(i))
                    .filter(|c| !c.is_empty())
                    .cloned()
            })
            .unwrap_or_else(|| "UNK".to_string())
    };
    let from = location_of(&raw_etd, etd_index.checked_sub(2));
    let to = location_of(&raw_eta, etd_index.checked_sub(1));

    let column = |offset: usize, default: &str| {
        cols.get(etd_index + offset)
            .filter(|c| !c.is_empty())
            .cloned()
            .unwrap_or_else(|| default.to_string())
    };

    Some(FlightRecord {
        id: FlightId::from(index.to_string()),
        from,
        to,
        start,
        end,
        duration: end - start,
        aircraft,
        takeoff_pad: column(3, UNKNOWN_PAD),
        landing_pad: column(4, UNKNOWN_PAD),
        operator: column(5, ""),
        crew: column(6, ""),
        raw_etd,
        raw_eta,
    })
}

/// Fallback pass over the whole text with newlines collapsed to spaces.
/// Matches are non-overlapping, scanning left to right; a match whose
/// times fail to decode is skipped and consumes no id.
fn extract_unstructured(text: &str) -> Vec<FlightRecord> {
    let p = patterns();
    let normalized = text.replace('\n', " ");
    let mut flights = Vec::new();

    for caps in p.freeform.captures_iter(&normalized) {
        let raw_etd = caps[1].to_string();
        let raw_eta = caps[2].to_string();
        let (Some(start), Some(end)) = (decode_time(&raw_etd), decode_time(&raw_eta)) else {
            continue;
        };

        let location_of = |raw: &str| {
            p.location_prefix
                .captures(raw)
                .map(|c| c[1].to_string())
                .unwrap_or_else(|| "UNK".to_string())
        };
        let group = |n: usize, default: &str| {
            caps.get(n)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| default.to_string())
        };

        flights.push(FlightRecord {
            id: Arc::from(format!("extracted-{}", flights.len())),
            from: location_of(&raw_etd),
            to: location_of(&raw_eta),
            start,
            end,
            duration: end - start,
            aircraft: caps[3].to_string(),
            takeoff_pad: group(4, PAD_TBD),
            landing_pad: group(5, PAD_TBD),
            operator: group(6, PERSONNEL_EXTRACTED),
            crew: group(7, PERSONNEL_EXTRACTED),
            raw_etd,
            raw_eta,
        });
    }
    flights
}
