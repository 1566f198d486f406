use serde::{Deserialize, Serialize};
use tokio::time::{Duration, Instant};

/// Why retrieval stopped before exhausting its query list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    WallClock,
    FetchLimit,
}

/// Wall-clock and fetch-count limits for a single run.
///
/// Uses `tokio::time::Instant` so paused-clock tests can drive it.
#[derive(Debug)]
pub struct RunBudget {
    started: Instant,
    wall_clock: Duration,
    fetch_limit: usize,
    fetches: usize,
}

impl RunBudget {
    #[must_use]
    pub fn new(wall_clock: Duration, fetch_limit: usize) -> Self {
        Self {
            started: Instant::now(),
            wall_clock,
            fetch_limit,
            fetches: 0,
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    #[must_use]
    pub fn fetch_limit(&self) -> usize {
        self.fetch_limit
    }

    /// Fetch attempts reserved so far.
    #[must_use]
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    /// The limit that currently forbids new work, wall clock first.
    #[must_use]
    pub fn check(&self) -> Option<HaltReason> {
        if self.elapsed() > self.wall_clock {
            Some(HaltReason::WallClock)
        } else if self.fetches >= self.fetch_limit {
            Some(HaltReason::FetchLimit)
        } else {
            None
        }
    }

    /// Reserve one fetch slot. Call only after [`check`](Self::check) returned `None`.
    pub fn record_fetch(&mut self) {
        self.fetches += 1;
    }
}
