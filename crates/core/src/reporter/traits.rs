//! Trait definitions for the reporter module.

use serde::{Deserialize, Serialize};

use crate::dispatch::{LedgerSnapshot, Outcome, RunStart, RunSummary};

/// How much a reporter prints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// Nothing at all.
    Silent,
    /// A progress bar, then failed files and totals.
    #[default]
    Normal,
    /// One line per file, every result at the end, optional log file.
    Verbose,
}

/// Consumes run events.
///
/// Implementations must not block for long: `on_progress` runs inside the
/// critical section every worker goes through to get its next item.
pub trait Reporter: Send + Sync {
    fn on_start(&self, start: &RunStart);

    fn on_progress(&self, outcome: &Outcome, snapshot: &LedgerSnapshot);

    fn on_finish(&self, summary: &RunSummary);
}

/// Reporter that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn on_start(&self, _start: &RunStart) {}

    fn on_progress(&self, _outcome: &Outcome, _snapshot: &LedgerSnapshot) {}

    fn on_finish(&self, _summary: &RunSummary) {}
}
