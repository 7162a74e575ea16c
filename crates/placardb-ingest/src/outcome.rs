//! Per-match outcomes and batch aggregation.

use std::fmt;

/// Pipeline stage a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Parse,
    Orient,
    Normalize,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Parse => "parse",
            Stage::Orient => "orient",
            Stage::Normalize => "normalize",
            Stage::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// One match's terminal failure. `transient` records whether the underlying
/// error class was retryable — by this point the budget is spent either way,
/// but the distinction matters for operators deciding whether to re-run.
#[derive(Debug)]
pub struct TaskFailure {
    pub url: String,
    pub stage: Stage,
    pub transient: bool,
    pub message: String,
}

/// Terminal outcome of one match task. One match never aborts the batch;
/// every task resolves to exactly one of these.
#[derive(Debug)]
pub enum TaskOutcome {
    /// Fetched, validated, and written in this run.
    Persisted { url: String },
    /// A complete record already existed; nothing was fetched or written.
    Skipped { url: String },
    Failed(TaskFailure),
}

/// Aggregated result of one round run.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub persisted: usize,
    pub skipped: usize,
    pub failures: Vec<TaskFailure>,
}

impl BatchResult {
    pub fn record(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Persisted { url } => {
                tracing::info!(%url, "match persisted");
                self.persisted += 1;
            }
            TaskOutcome::Skipped { url } => {
                tracing::debug!(%url, "match already persisted, skipped");
                self.skipped += 1;
            }
            TaskOutcome::Failed(failure) => {
                tracing::error!(
                    url = %failure.url,
                    stage = %failure.stage,
                    transient = failure.transient,
                    error = %failure.message,
                    "match failed"
                );
                self.failures.push(failure);
            }
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.persisted + self.skipped + self.failures.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
