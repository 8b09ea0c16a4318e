//! Presentation state for a single search: what the user asked, what came
//! back, and how to show it.

use std::process::ExitCode;
use std::time::Duration;

use crate::instruction::EVENT_FIELDS;
use crate::models::{EventCollection, EventRecord, Query};
use crate::processor::ExtractionError;
use crate::utils;

const MAX_COLUMN_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    EmptyQuery,
    Found(EventCollection),
    NoEvents(Query),
    Failed(ExtractionError),
    TimedOut(Duration),
    Cancelled,
}

impl SearchOutcome {
    pub fn from_result(query: Query, result: Result<EventCollection, ExtractionError>) -> Self {
        match result {
            Ok(events) if events.is_empty() => SearchOutcome::NoEvents(query),
            Ok(events) => SearchOutcome::Found(events),
            Err(err) => SearchOutcome::Failed(err),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SearchOutcome::Found(_) => Severity::Success,
            SearchOutcome::NoEvents(_) => Severity::Info,
            SearchOutcome::EmptyQuery | SearchOutcome::Cancelled => Severity::Warning,
            SearchOutcome::Failed(_) | SearchOutcome::TimedOut(_) => Severity::Error,
        }
    }

    pub fn message(&self) -> String {
        match self {
            SearchOutcome::EmptyQuery => "Please enter a search query.".to_string(),
            SearchOutcome::Found(_) => "Events found!".to_string(),
            SearchOutcome::NoEvents(query) => {
                format!("No events found for '{query}' with the specified keywords.")
            }
            SearchOutcome::Failed(ExtractionError::MalformedResponse(_)) => {
                "Failed to parse the response from the AI agent.".to_string()
            }
            SearchOutcome::Failed(ExtractionError::Unavailable(detail)) => {
                format!("The AI agent could not be reached: {detail}")
            }
            SearchOutcome::TimedOut(after) => {
                format!("The search timed out after {}s.", after.as_secs())
            }
            SearchOutcome::Cancelled => "Search cancelled.".to_string(),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            SearchOutcome::Found(_) | SearchOutcome::NoEvents(_) => ExitCode::SUCCESS,
            SearchOutcome::EmptyQuery => ExitCode::from(2),
            SearchOutcome::Failed(_) | SearchOutcome::TimedOut(_) => ExitCode::from(1),
            SearchOutcome::Cancelled => ExitCode::from(130),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Owns everything the user currently sees. The processor never touches it.
#[derive(Debug, Default)]
pub struct SearchView {
    state: SearchState,
    outcome: Option<SearchOutcome>,
}

impl SearchView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn outcome(&self) -> Option<&SearchOutcome> {
        self.outcome.as_ref()
    }

    /// Starts a search for the raw input. Whatever the previous search showed
    /// is dropped first. Blank input records a warning and returns `None`;
    /// the view stays idle.
    pub fn begin(&mut self, raw: &str) -> Option<Query> {
        self.outcome = None;
        match Query::new(raw) {
            Some(query) => {
                self.state = SearchState::Running;
                Some(query)
            }
            None => {
                self.state = SearchState::Idle;
                self.outcome = Some(SearchOutcome::EmptyQuery);
                None
            }
        }
    }

    pub fn finish(&mut self, outcome: SearchOutcome) {
        self.state = match outcome.severity() {
            Severity::Success | Severity::Info => SearchState::Succeeded,
            Severity::Warning | Severity::Error => SearchState::Failed,
        };
        self.outcome = Some(outcome);
    }

    /// Returns to idle once the result has been shown.
    pub fn acknowledge(&mut self) {
        self.state = SearchState::Idle;
    }

    /// Body printed after the status message, if the outcome has one.
    pub fn body(&self, format: OutputFormat) -> Option<String> {
        match (self.outcome.as_ref()?, format) {
            (SearchOutcome::Found(events), OutputFormat::Table) => Some(format!(
                "{}\n{}",
                render_table(events),
                summary_line(events)
            )),
            (SearchOutcome::Found(events), OutputFormat::Json) => Some(events.to_wire_json()),
            (SearchOutcome::NoEvents(_), OutputFormat::Json) => {
                Some(EventCollection::default().to_wire_json())
            }
            _ => None,
        }
    }
}

fn cells(record: &EventRecord) -> [&str; 5] {
    [
        record.title.as_str(),
        record.location.as_str(),
        record.date.as_str(),
        record.time.as_str(),
        record.price.as_str(),
    ]
}

pub fn render_table(events: &EventCollection) -> String {
    let rows: Vec<[String; 5]> = events
        .iter()
        .map(|record| cells(record).map(|cell| utils::truncate_chars(cell, MAX_COLUMN_WIDTH)))
        .collect();

    let mut widths = EVENT_FIELDS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = EVENT_FIELDS.map(str::to_string);
    let mut lines = vec![format_row(&header, &widths)];
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rows {
        lines.push(format_row(row, &widths));
    }
    lines.join("\n")
}

fn format_row(cells: &[String; 5], widths: &[usize; 5]) -> String {
    cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

fn summary_line(events: &EventCollection) -> String {
    let total = events.len();
    let noun = if total == 1 { "event" } else { "events" };
    format!("{total} {noun}, {} free", events.free_count())
}
