use crate::events::{HUB_ID, ViewMode};
use crate::flight::FlightRecord;
use crate::schedule::HubSchedule;
use crate::time::format_time;
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tabled::Tabled;
use tabled::settings::Style;

mod conflict;
mod events;
mod flight;
mod parser;
mod schedule;
mod time;

#[derive(Parser)]
struct Args {
    /// Path to the schedule text file (delimited rows or free text)
    #[arg(short, long, value_name = "FILE", default_value = "data/sample.csv")]
    schedule: PathBuf,
}

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let mut candidates = Vec::new();

        for cmd in &self.commands {
            if cmd.starts_with(line) {
                candidates.push(Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                });
            }
        }

        Ok((0, candidates))
    }
}

fn paginate(content: String) {
    let mut pager = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        // Fallback to 'more' if 'less' isn't available
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn())
        .expect("Failed to spawn pager");

    let mut stdin = pager.stdin.take().expect("Failed to open stdin for pager");

    if let Err(e) = stdin.write_all(content.as_bytes()) {
        // Broken pipe is common if the user quits the pager early
        if e.kind() != std::io::ErrorKind::BrokenPipe {
            eprintln!("Error writing to pager: {}", e);
        }
    }

    // Wait for the user to close the pager before returning to the ">> " prompt
    let _ = pager.wait();
}

#[derive(Tabled)]
struct FlightLine {
    id: String,
    route: String,
    etd: String,
    eta: String,
    duration: String,
    aircraft: String,
    pads: String,
    operator: String,
    crew: String,
}

impl From<&FlightRecord> for FlightLine {
    fn from(f: &FlightRecord) -> Self {
        FlightLine {
            id: f.id.to_string(),
            route: format!("{} -> {}", f.from, f.to),
            etd: format_time(Some(f.start)),
            eta: format_time(Some(f.end)),
            duration: format!("{}m", f.duration),
            aircraft: f.aircraft.clone(),
            pads: format!("{} / {}", f.takeoff_pad, f.landing_pad),
            operator: f.operator.clone(),
            crew: f.crew.clone(),
        }
    }
}

#[derive(Tabled)]
struct RowLine {
    key: String,
    events: usize,
    windows: String,
}

fn print_table<T: Tabled>(lines: Vec<T>) {
    let count = lines.len();
    let mut table = tabled::Table::new(lines);
    table.with(Style::rounded());
    table.with(tabled::settings::Alignment::left());
    if count > 20 {
        paginate(table.to_string());
    } else {
        println!("{}", table);
    }
}

fn list_flights(schedule: &HubSchedule, filter: &str) {
    let filtered: Vec<FlightLine> = schedule
        .flights
        .iter()
        .filter(|f| match filter {
            "d" | "departures" => f.from == HUB_ID,
            "a" | "arrivals" => f.to == HUB_ID,
            _ => true, // 'ls' or 'ls all'
        })
        .map(FlightLine::from)
        .collect();
    if filtered.is_empty() {
        println!("No matching flights found.");
    } else {
        print_table(filtered);
    }
}

fn list_rows(schedule: &HubSchedule, mode: ViewMode) {
    let rows = schedule.rows(mode);
    if rows.is_empty() {
        println!("No flight operations found at hub ({}).", HUB_ID);
        return;
    }
    let lines: Vec<RowLine> = rows
        .iter()
        .map(|row| RowLine {
            key: row.label.clone(),
            events: row.events.len(),
            windows: row
                .events
                .iter()
                .map(|e| {
                    let marker = match e.kind {
                        events::EventKind::Departure => "D",
                        events::EventKind::Arrival => "A",
                    };
                    format!(
                        "{} {} [{}-{}]",
                        marker,
                        format_time(Some(e.time)),
                        format_time(Some(e.start_buffer)),
                        format_time(Some(e.end_buffer))
                    )
                })
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();
    println!("Grouped by {}:", mode);
    print_table(lines);
}

fn list_conflicts(schedule: &HubSchedule) {
    let conflicts = schedule.conflicts();
    if conflicts.is_empty() {
        println!("{}", "No overlapping occupancy windows.".green());
        return;
    }
    for c in &conflicts {
        println!(
            "{} {} - {} ({} min)",
            "OVERLAP".yellow().bold(),
            format_time(Some(c.start)),
            format_time(Some(c.end)),
            c.duration
        );
    }
}

fn print_stats(schedule: &HubSchedule) {
    println!("Total flights:  {}", schedule.flights.len());
    println!("Hub departures: {}", schedule.hub_departures());
    println!("Hub arrivals:   {}", schedule.hub_arrivals());
    println!("Personnel:      {}", schedule.personnel());
    println!("Parsed via:     {}", schedule.strategy.to_string().cyan());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut schedule = HubSchedule::load_from_file(args.schedule.to_str().unwrap())?;
    println!(
        "Hub watch online. {} flights parsed from {} ({}).",
        schedule.flights.len(),
        args.schedule.display(),
        schedule.strategy
    );

    let mut view_mode = ViewMode::Pad;

    let config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let helper = CompleteHelper {
        commands: vec![
            "ls".to_string(),
            "rows".to_string(),
            "conflicts".to_string(),
            "stats".to_string(),
            "view".to_string(),
            "load".to_string(),
            "export".to_string(),
            "help".to_string(),
            "exit".to_string(),
        ],
    };

    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                rl.add_history_entry(trimmed)?;

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                match parts[0] {
                    "ls" => {
                        let filter = parts.get(1).copied().unwrap_or("all");
                        list_flights(&schedule, filter);
                    }
                    "rows" => {
                        let mode = match parts.get(1) {
                            Some(arg) => match arg.parse::<ViewMode>() {
                                Ok(mode) => mode,
                                Err(e) => {
                                    println!("{}", e);
                                    continue;
                                }
                            },
                            None => view_mode,
                        };
                        list_rows(&schedule, mode);
                    }
                    "conflicts" => list_conflicts(&schedule),
                    "stats" => print_stats(&schedule),
                    "view" => {
                        if let Some(arg) = parts.get(1) {
                            match arg.parse::<ViewMode>() {
                                Ok(mode) => {
                                    view_mode = mode;
                                    println!("View mode set to {}.", view_mode);
                                }
                                Err(e) => println!("{}", e),
                            }
                        } else {
                            println!("Usage: view <pad|aircraft>");
                        }
                    }
                    "load" => {
                        if let Some(path) = parts.get(1) {
                            match HubSchedule::load_from_file(path) {
                                Ok(loaded) => {
                                    println!(
                                        "Loaded {} flights from {} ({}).",
                                        loaded.flights.len(),
                                        path,
                                        loaded.strategy
                                    );
                                    schedule = loaded;
                                }
                                Err(e) => println!("Failed to load {}: {}", path, e),
                            }
                        } else {
                            println!("Usage: load <file>");
                        }
                    }
                    "export" => {
                        if let Some(path) = parts.get(1) {
                            match schedule.export_json() {
                                Ok(json) => match std::fs::write(path, json) {
                                    Ok(()) => println!("Exported schedule to {}.", path),
                                    Err(e) => println!("Failed to write {}: {}", path, e),
                                },
                                Err(e) => println!("Failed to serialize schedule: {}", e),
                            }
                        } else {
                            println!("Usage: export <file>");
                        }
                    }
                    "help" | "?" => {
                        println!("\nAvailable Commands:");
                        println!("  ls [d|a]              - List flights, optionally only hub departures (d) or arrivals (a)");
                        println!("  rows [pad|aircraft]   - Show grouped occupancy rows (defaults to current view mode)");
                        println!("  conflicts             - Show hub-wide overlapping occupancy windows");
                        println!("  stats                 - Summary counts and parse strategy");
                        println!("  view <pad|aircraft>   - Switch the default grouping dimension");
                        println!("  load <file>           - Re-run the pipeline on another schedule file");
                        println!("  export <file>         - Write records and conflicts as JSON");
                        println!("  help / ?              - Show this help menu");
                        println!("  exit / quit           - Exit\n");
                    }
                    "exit" | "quit" => break,
                    _ => println!("Unknown command: {}", parts[0]),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
