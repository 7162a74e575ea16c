//! Seams between orchestration and the outside world.
//!
//! The pipeline and orchestrator only see these traits; production wires in
//! the HTTP client and Postgres store, tests wire in mocks. Retry policy is
//! applied *around* [`DocumentFetcher`] by the pipeline, so implementations
//! stay single-attempt.

use async_trait::async_trait;
use placardb_core::{LeagueEntry, MatchLocator, MatchRecord};
use placardb_db::{DbError, PersistResult};
use placardb_scraper::{RawDocument, ScraperError};

/// Fetches one rendered document. One call, one attempt.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RawDocument, ScraperError>;
}

// Lets the pipeline and the round source share one fetcher (and with it one
// throttle history).
#[async_trait]
impl<T: DocumentFetcher + ?Sized> DocumentFetcher for std::sync::Arc<T> {
    async fn fetch(&self, url: &str) -> Result<RawDocument, ScraperError> {
        (**self).fetch(url).await
    }
}

/// Discovers the match locators for one round of a league season.
#[async_trait]
pub trait RoundSource: Send + Sync {
    async fn discover(
        &self,
        league: &LeagueEntry,
        season_year: i32,
        round: i32,
    ) -> Result<Vec<MatchLocator>, ScraperError>;
}

/// Persistence backend for canonical match records.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Idempotency pre-check: is a complete record already stored for this
    /// source URL?
    async fn is_complete(&self, source_url: &str) -> Result<bool, DbError>;

    /// Atomically persists one record; must be safe to call for an already
    /// persisted URL.
    async fn persist(
        &self,
        league_slug: &str,
        season_year: i32,
        record: &MatchRecord,
    ) -> Result<PersistResult, DbError>;

    /// Highest complete round for the season, for round auto-detection.
    async fn last_round(
        &self,
        league_slug: &str,
        season_year: i32,
    ) -> Result<Option<i32>, DbError>;
}
