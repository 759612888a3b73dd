//! Output enum for command execution results.
//!
//! Every command produces exactly one output variant. The mapping is
//! deterministic: mutating commands produce `Events`, each inspection
//! command produces its report type.

use avail_engine::{DumpReport, Event, SiteDump, StateReport, VariableDump};
use serde::{Deserialize, Serialize};

/// Successful command execution results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// What a mutating command caused: reads completed, writes
    /// accepted, operations parked, transactions finished, sites
    /// changing status. Includes effects of retry sweeps the command
    /// triggered. May be empty (a no-op command).
    Events(Vec<Event>),

    /// Answer to [`Command::Dump`](crate::Command::Dump).
    Dump(DumpReport),

    /// Answer to [`Command::DumpSite`](crate::Command::DumpSite).
    Site(SiteDump),

    /// Answer to
    /// [`Command::DumpVariable`](crate::Command::DumpVariable).
    Variable(VariableDump),

    /// Answer to [`Command::QueryState`](crate::Command::QueryState).
    State(StateReport),
}

impl Output {
    /// The events of an `Events` output, if that is what this is.
    pub fn events(&self) -> Option<&[Event]> {
        match self {
            Output::Events(events) => Some(events),
            _ => None,
        }
    }
}
