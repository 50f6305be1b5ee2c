use crate::events::HubEvent;
use crate::time::Minute;
use serde::Serialize;

/// Fixed analysis range shared by all views: 08:00 to 17:00.
pub const DAY_START: Minute = 480;
pub const DAY_END: Minute = 1020;

/// A maximal interval where two or more buffered events were active at
/// once, regardless of resource. A congestion signal, not a same-resource
/// double-booking check; the grouped rows carry the resource-scoped view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GlobalConflict {
    pub start: Minute,
    pub end: Minute,
    pub duration: Minute,
}

/// Scans minute-resolution occupancy over the day range and reports every
/// maximal run with two or more overlapping buffer windows. Each window
/// increments the half-open index range `[s, e)` after clamping, so a
/// window that merely touches the next at an endpoint never conflicts
/// with it. A run still open at the end of the range closes at DAY_END.
pub fn detect_conflicts(events: &[HubEvent]) -> Vec<GlobalConflict> {
    let len = (DAY_END - DAY_START + 1) as usize;
    let mut occupancy = vec![0u32; len];

    for event in events {
        let from = (event.start_buffer - DAY_START).max(0);
        let to = (event.end_buffer - DAY_START).min(len as Minute - 1);
        if from < to {
            for slot in &mut occupancy[from as usize..to as usize] {
                *slot += 1;
            }
        }
    }

    let mut conflicts = Vec::new();
    let mut run_start: Option<Minute> = None;

    for (offset, &count) in occupancy.iter().enumerate() {
        match (count > 1, run_start) {
            (true, None) => run_start = Some(offset as Minute),
            (false, Some(start)) => {
                conflicts.push(GlobalConflict {
                    start: start + DAY_START,
                    end: offset as Minute + DAY_START,
                    duration: offset as Minute - start,
                });
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        conflicts.push(GlobalConflict {
            start: start + DAY_START,
            end: DAY_END,
            duration: DAY_END - (start + DAY_START),
        });
    }
    conflicts
}
