//! Output → human/json string formatting.
//!
//! Two modes:
//! - **Human** (default): one line per event, `x2: 20` style dump
//!   lines, a compact multi-line state block
//! - **JSON** (`--json`): one `serde_json` document per output

use avail_executor::{
    AbortedEntry, DumpReport, Error, Event, Output, SiteDump, SiteStatus, StateReport,
    TransactionClass, VariableDump,
};
use std::fmt::Display;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Plain text for people.
    Human,
    /// One JSON document per output.
    Json,
}

/// Format a successful output. Empty string means print nothing (a
/// command that caused no events).
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => format_json(output),
        OutputMode::Human => format_human(output),
    }
}

/// Format a validation error.
pub fn format_error(error: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::json!({ "error": error.to_string() }).to_string(),
        OutputMode::Human => format!("(error) {error}"),
    }
}

fn format_json(output: &Output) -> String {
    serde_json::to_string(output)
        .unwrap_or_else(|error| serde_json::json!({ "error": error.to_string() }).to_string())
}

fn format_human(output: &Output) -> String {
    match output {
        Output::Events(events) => join_lines(events.iter().map(event_line)),
        Output::Dump(report) => dump_lines(report),
        Output::Site(dump) => site_lines(dump),
        Output::Variable(dump) => variable_lines(dump),
        Output::State(state) => state_lines(state),
    }
}

fn event_line(event: &Event) -> String {
    match event {
        Event::TransactionStarted {
            transaction,
            class,
            at,
        } => match class {
            TransactionClass::ReadWrite => format!("{transaction} started (ts {at})"),
            TransactionClass::ReadOnly => format!("{transaction} started read-only (ts {at})"),
        },
        Event::ReadCompleted {
            transaction,
            variable,
            value,
            site,
        } => format!("{variable}: {value} ({transaction}, site {site})"),
        Event::WriteAccepted {
            transaction,
            variable,
            value,
            sites,
        } => format!(
            "{transaction} wrote {variable}={value} at {} site(s)",
            sites.len()
        ),
        Event::Parked { operation } => format!("{operation} waits"),
        Event::TransactionCommitted { transaction, at } => {
            format!("{transaction} committed (ts {at})")
        }
        Event::TransactionAborted {
            transaction,
            reason,
        } => format!("{transaction} aborted: {reason}"),
        Event::SiteFailed { site } => format!("site {site} failed"),
        Event::SiteRecovered { site } => format!("site {site} recovered"),
    }
}

fn dump_lines(report: &DumpReport) -> String {
    join_lines(report.sites.iter().map(site_lines))
}

fn site_lines(dump: &SiteDump) -> String {
    let mut lines = vec![format!("site {} ({})", dump.site, dump.status)];
    for (variable, value) in &dump.values {
        lines.push(format!("{variable}: {value}"));
    }
    lines.join("\n")
}

fn variable_lines(dump: &VariableDump) -> String {
    join_lines(
        dump.values
            .iter()
            .map(|(site, value)| format!("{}: {value} (site {site})", dump.variable)),
    )
}

fn state_lines(state: &StateReport) -> String {
    let mut lines = vec![format!("clock {}", state.clock)];

    let up = ids_with_status(state, SiteStatus::Up);
    let down = ids_with_status(state, SiteStatus::Down);
    lines.push(format!("up: {}", join(&up)));
    if !down.is_empty() {
        lines.push(format!("down: {}", join(&down)));
    }
    if !state.running.is_empty() {
        lines.push(format!("running: {}", join(&state.running)));
    }
    if !state.committed.is_empty() {
        lines.push(format!("committed: {}", join(&state.committed)));
    }
    if !state.aborted.is_empty() {
        lines.push(format!("aborted: {}", join_aborted(&state.aborted)));
    }
    if !state.parked.is_empty() {
        lines.push(format!("waiting: {}", join(&state.parked)));
    }
    lines.join("\n")
}

fn ids_with_status(state: &StateReport, status: SiteStatus) -> Vec<String> {
    state
        .sites
        .iter()
        .filter(|(_, s)| *s == status)
        .map(|(site, _)| site.to_string())
        .collect()
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_aborted(entries: &[AbortedEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{} ({})", entry.transaction, entry.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_lines(lines: impl Iterator<Item = String>) -> String {
    lines.collect::<Vec<_>>().join("\n")
}
