use crate::conflict::{GlobalConflict, detect_conflicts};
use crate::events::{HUB_ID, HubEvent, Row, ViewMode, group_rows, hub_events};
use crate::flight::FlightRecord;
use crate::parser::{ParseOutcome, Strategy, parse_schedule};
use serde::Serialize;
use std::collections::HashSet;
use std::io;

/// The full pipeline over one text blob: parse → project → detect. All
/// derived structures are recomputed wholesale from the record list; a
/// new text means a new HubSchedule.
pub struct HubSchedule {
    pub flights: Vec<FlightRecord>,
    pub strategy: Strategy,
}

impl HubSchedule {
    pub fn from_text(text: &str) -> HubSchedule {
        let ParseOutcome { flights, strategy } = parse_schedule(text);
        HubSchedule { flights, strategy }
    }

    pub fn load_from_file(path: &str) -> io::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(HubSchedule::from_text(&data))
    }

    pub fn events(&self) -> Vec<HubEvent> {
        hub_events(&self.flights)
    }

    pub fn rows(&self, mode: ViewMode) -> Vec<Row> {
        group_rows(&self.flights, mode)
    }

    pub fn conflicts(&self) -> Vec<GlobalConflict> {
        detect_conflicts(&self.events())
    }

    pub fn hub_departures(&self) -> usize {
        self.flights.iter().filter(|f| f.from == HUB_ID).count()
    }

    pub fn hub_arrivals(&self) -> usize {
        self.flights.iter().filter(|f| f.to == HUB_ID).count()
    }

    /// Distinct operator and crew names across all records.
    pub fn personnel(&self) -> usize {
        self.flights
            .iter()
            .flat_map(|f| [f.operator.as_str(), f.crew.as_str()])
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn export_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Export<'a> {
            strategy: Strategy,
            flights: &'a [FlightRecord],
            conflicts: Vec<GlobalConflict>,
        }
        serde_json::to_string_pretty(&Export {
            strategy: self.strategy,
            flights: &self.flights,
            conflicts: self.conflicts(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::UNKNOWN_PAD;

    const SAMPLE: &str = r#","PDR","ARK","PDR-0930","ARK-1000","AS04","08L","59N","Chandra","krupa"
,"PDR","CHP","PDR-0935","CHP-1030","AS05","08L","59N","Krupa","Mohan"
,"ARK","PDR","ARK-1015","PDR-1045","AS04","59N","08L","Shivaji","Sundar"
,"CHP","PDR","CHP-1045","PDR-1120","AS05","59N","16D","Milan","John""#;

    #[test]
    fn test_pipeline_is_idempotent() {
        let first = HubSchedule::from_text(SAMPLE);
        let second = HubSchedule::from_text(SAMPLE);

        assert_eq!(first.flights, second.flights);
        assert_eq!(first.strategy, second.strategy);
        assert_eq!(first.events(), second.events());
        assert_eq!(first.rows(ViewMode::Pad), second.rows(ViewMode::Pad));
        assert_eq!(
            first.rows(ViewMode::Aircraft),
            second.rows(ViewMode::Aircraft)
        );
        assert_eq!(first.conflicts(), second.conflicts());
    }

    #[test]
    fn test_summary_statistics() {
        let schedule = HubSchedule::from_text(SAMPLE);
        assert_eq!(4, schedule.flights.len());
        assert_eq!(2, schedule.hub_departures());
        assert_eq!(2, schedule.hub_arrivals());
        // Chandra, krupa, Krupa, Mohan, Shivaji, Sundar, Milan, John
        assert_eq!(8, schedule.personnel());
    }

    #[test]
    fn test_buffered_departures_five_minutes_apart_conflict() {
        // 09:30 and 09:35 departures: windows [565,575] and [570,580]
        // share [570,575)
        let schedule = HubSchedule::from_text(SAMPLE);
        let conflicts = schedule.conflicts();
        assert_eq!(1, conflicts.len());
        assert_eq!(570, conflicts[0].start);
        assert_eq!(575, conflicts[0].end);
        assert_eq!(5, conflicts[0].duration);
    }

    #[test]
    fn test_unknown_pad_record_feeds_conflicts_but_no_row() {
        let text = "\
,\"PDR\",\"ARK\",\"PDR-0930\",\"ARK-1000\",\"AS04\",\"08L\",\"59N\"
,\"PDR\",\"CHP\",\"PDR-0932\",\"CHP-1030\",\"AS05\",\"\",\"59N\"";
        let schedule = HubSchedule::from_text(text);
        assert_eq!(2, schedule.flights.len());
        assert_eq!(UNKNOWN_PAD, schedule.flights[1].takeoff_pad);

        // only the known-pad departure shows up in rows
        let rows = schedule.rows(ViewMode::Pad);
        assert_eq!(1, rows.len());
        assert_eq!("08L", rows[0].label);
        assert_eq!(1, rows[0].events.len());

        // but both buffered windows count toward congestion
        assert_eq!(2, schedule.events().len());
        assert_eq!(1, schedule.conflicts().len());
    }

    #[test]
    fn test_export_json_round_trips_record_fields() {
        let schedule = HubSchedule::from_text(SAMPLE);
        let json = schedule.export_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!("structured", value["strategy"]);
        assert_eq!(4, value["flights"].as_array().unwrap().len());
        assert_eq!("PDR", value["flights"][0]["from"]);
        assert_eq!(570, value["flights"][0]["start"]);
        assert_eq!(1, value["conflicts"].as_array().unwrap().len());
    }

    #[test]
    fn test_missing_file_surfaces_io_error() {
        assert!(HubSchedule::load_from_file("no/such/schedule.csv").is_err());
    }
}
