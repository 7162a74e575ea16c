//! Bounded-concurrency round orchestration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use placardb_core::{LeagueEntry, MatchLocator};
use placardb_scraper::ScraperError;

use crate::outcome::BatchResult;
use crate::pipeline::IngestPipeline;
use crate::traits::RoundSource;

/// Cooperative cancellation shared between the orchestrator and a signal
/// handler. Once set, no further match is dispatched; in-flight matches run
/// to completion so no partial write is ever abandoned mid-transaction.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct BatchOrchestrator {
    pipeline: IngestPipeline,
    round_source: Arc<dyn RoundSource>,
    max_concurrent: usize,
    cancel: CancellationFlag,
}

impl BatchOrchestrator {
    pub fn new(
        pipeline: IngestPipeline,
        round_source: Arc<dyn RoundSource>,
        max_concurrent: usize,
        cancel: CancellationFlag,
    ) -> Self {
        Self {
            pipeline,
            round_source,
            max_concurrent: max_concurrent.max(1),
            cancel,
        }
    }

    /// Discovers one round's matches and runs them all.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] only when round discovery itself fails;
    /// per-match failures are collected in the [`BatchResult`].
    pub async fn run_round(
        &self,
        league: &LeagueEntry,
        season_year: i32,
        round: i32,
    ) -> Result<BatchResult, ScraperError> {
        let locators = self
            .round_source
            .discover(league, season_year, round)
            .await?;
        Ok(self.run_locators(&locators).await)
    }

    /// Runs a set of match locators with bounded concurrency. One match's
    /// failure never aborts the batch; cancellation stops dispatching new
    /// matches but lets in-flight ones finish.
    pub async fn run_locators(&self, locators: &[MatchLocator]) -> BatchResult {
        let started = std::time::Instant::now();
        let outcomes: Vec<_> = stream::iter(locators)
            .filter(|_| {
                let cancelled = self.cancel.is_cancelled();
                if cancelled {
                    tracing::warn!("cancellation requested, not dispatching further matches");
                }
                async move { !cancelled }
            })
            .map(|locator| self.pipeline.process(locator))
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut result = BatchResult::default();
        for outcome in outcomes {
            result.record(outcome);
        }

        tracing::info!(
            total = locators.len(),
            persisted = result.persisted,
            skipped = result.skipped,
            failed = result.failures.len(),
            duration = ?started.elapsed(),
            "round run finished"
        );
        if !result.is_clean() {
            for failure in &result.failures {
                tracing::warn!(
                    url = %failure.url,
                    stage = %failure.stage,
                    transient = failure.transient,
                    "unresolved match in this run"
                );
            }
        }
        result
    }
}
