//! Configuration for the dispatch engine.

use serde::{Deserialize, Serialize};

/// Worker pool settings (the `[dispatch]` config section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Number of concurrent upload workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Delay between starting consecutive workers, in milliseconds.
    /// Only spreads out early progress output; 0 starts them all at once.
    #[serde(default = "default_start_stagger")]
    pub start_stagger_ms: u64,
}

fn default_workers() -> usize {
    3
}

fn default_start_stagger() -> u64 {
    100
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            start_stagger_ms: default_start_stagger(),
        }
    }
}

impl DispatchConfig {
    /// Sets the worker pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the delay between worker starts.
    pub fn with_start_stagger(mut self, millis: u64) -> Self {
        self.start_stagger_ms = millis;
        self
    }
}
