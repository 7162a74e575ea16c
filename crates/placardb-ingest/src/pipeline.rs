//! Per-match ingest pipeline: guard → fetch → parse → orient → normalize →
//! persist.
//!
//! Each stage's failure maps to a [`TaskOutcome::Failed`] tagged with the
//! stage; the pipeline never panics and never lets one match's error escape
//! to the batch level.

use std::sync::Arc;

use placardb_core::MatchLocator;
use placardb_db::{DbError, PersistResult};
use placardb_scraper::{
    normalize_match, parse_match, retry_with_backoff, validate_orientation, ScraperError,
};

use crate::outcome::{Stage, TaskFailure, TaskOutcome};
use crate::traits::{DocumentFetcher, MatchStore};

/// Retry budget applied around the fetcher.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

pub struct IngestPipeline {
    fetcher: Arc<dyn DocumentFetcher>,
    store: Arc<dyn MatchStore>,
    retry: RetryPolicy,
}

impl IngestPipeline {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        store: Arc<dyn MatchStore>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            store,
            retry,
        }
    }

    /// Runs one match end to end. Infallible by construction: every error
    /// becomes a [`TaskOutcome::Failed`].
    pub async fn process(&self, locator: &MatchLocator) -> TaskOutcome {
        match self.try_process(locator).await {
            Ok(outcome) => outcome,
            Err(failure) => TaskOutcome::Failed(failure),
        }
    }

    async fn try_process(&self, locator: &MatchLocator) -> Result<TaskOutcome, TaskFailure> {
        let url = &locator.url;

        // Idempotency guard: a complete record means no fetch at all.
        let already = self
            .store
            .is_complete(url)
            .await
            .map_err(|e| db_failure(url, Stage::Persist, &e))?;
        if already {
            return Ok(TaskOutcome::Skipped { url: url.clone() });
        }

        let doc = retry_with_backoff(self.retry.max_retries, self.retry.backoff_base_ms, || {
            self.fetcher.fetch(url)
        })
        .await
        .map_err(|e| scraper_failure(url, Stage::Fetch, &e))?;

        let mut fields =
            parse_match(&doc).map_err(|e| scraper_failure(url, Stage::Parse, &e))?;

        validate_orientation(&mut fields, locator)
            .map_err(|e| scraper_failure(url, Stage::Orient, &e))?;

        let record = normalize_match(fields, locator)
            .map_err(|e| scraper_failure(url, Stage::Normalize, &e))?;

        let result = self
            .store
            .persist(&locator.league_slug, locator.season_year, &record)
            .await
            .map_err(|e| db_failure(url, Stage::Persist, &e))?;

        Ok(match result {
            PersistResult::Inserted { .. } => TaskOutcome::Persisted { url: url.clone() },
            // Lost the insert race to a concurrent run; same end state.
            PersistResult::AlreadyPersisted => TaskOutcome::Skipped { url: url.clone() },
        })
    }
}

fn scraper_failure(url: &str, stage: Stage, err: &ScraperError) -> TaskFailure {
    let transient = match err {
        // The budget is spent, but the class of the underlying error is what
        // tells an operator whether a re-run can help.
        ScraperError::FetchExhausted { source, .. } => source.is_transient(),
        other => other.is_transient(),
    };
    TaskFailure {
        url: url.to_owned(),
        stage,
        transient,
        message: err.to_string(),
    }
}

fn db_failure(url: &str, stage: Stage, err: &DbError) -> TaskFailure {
    TaskFailure {
        url: url.to_owned(),
        stage,
        transient: db_error_is_transient(err),
        message: err.to_string(),
    }
}

/// Only connection-level failures are worth a re-run. Constraint and
/// integrity violations (`sqlx::Error::Database`), row/type mismatches, and
/// an unseeded league reproduce identically on the next attempt.
fn db_error_is_transient(err: &DbError) -> bool {
    match err {
        DbError::Sqlx(e) => matches!(
            e,
            sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn connection_level_db_errors_are_transient() {
        assert!(db_error_is_transient(&DbError::Sqlx(
            sqlx::Error::PoolTimedOut
        )));
        assert!(db_error_is_transient(&DbError::Sqlx(sqlx::Error::Io(
            io::Error::new(io::ErrorKind::ConnectionReset, "reset")
        ))));
    }

    #[test]
    fn query_and_integrity_db_errors_are_fatal() {
        assert!(!db_error_is_transient(&DbError::Sqlx(
            sqlx::Error::RowNotFound
        )));
        assert!(!db_error_is_transient(&DbError::UnknownLeague {
            slug: "brasileirao".to_owned(),
        }));
        assert!(!db_error_is_transient(&DbError::NotFound));
    }
}
