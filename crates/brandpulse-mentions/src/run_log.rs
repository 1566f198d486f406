use std::sync::{Mutex, PoisonError};

/// Append-only, per-run log sink.
///
/// Every line is also emitted through `tracing` with the run id attached, so
/// the same events show up in the process log and in the run report.
#[derive(Debug)]
pub struct RunLog {
    run_id: String,
    lines: Mutex<Vec<String>>,
}

impl RunLog {
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            lines: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn push(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(run_id = %self.run_id, "{line}");
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
