//! Aggregated upload results.

use serde::Serialize;

use super::item::Outcome;

/// Point-in-time view of the ledger counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
    pub percent: u8,
}

impl LedgerSnapshot {
    pub fn succeeded(&self) -> usize {
        self.completed - self.failed
    }
}

/// Outcomes in completion order plus the running failure counter.
#[derive(Debug)]
pub struct Ledger {
    outcomes: Vec<Outcome>,
    failed: usize,
    total: usize,
}

impl Ledger {
    pub fn new(total: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(total),
            failed: 0,
            total,
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        debug_assert!(self.outcomes.len() < self.total, "more outcomes than items");
        if !outcome.succeeded() {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.len() - self.failed
    }

    /// Share of items completed, rounded down. An empty run reports 0.
    pub fn percent_complete(&self) -> u8 {
        Self::percent_of(self.count(), self.total, 100) as u8
    }

    /// `completed * scale / total`, rounded down, without dividing by zero.
    pub fn percent_of(completed: usize, total: usize, scale: usize) -> usize {
        if total == 0 {
            return 0;
        }
        completed * scale / total
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn last(&self) -> Option<&Outcome> {
        self.outcomes.last()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            completed: self.count(),
            failed: self.failed,
            total: self.total,
            percent: self.percent_complete(),
        }
    }

    pub fn into_outcomes(self) -> Vec<Outcome> {
        self.outcomes
    }
}
