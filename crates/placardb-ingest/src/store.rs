//! Postgres-backed [`MatchStore`].

use async_trait::async_trait;
use placardb_core::MatchRecord;
use placardb_db::{DbError, PersistResult};
use sqlx::PgPool;

use crate::traits::MatchStore;

pub struct PgMatchStore {
    pool: PgPool,
}

impl PgMatchStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn is_complete(&self, source_url: &str) -> Result<bool, DbError> {
        placardb_db::match_is_complete(&self.pool, source_url).await
    }

    async fn persist(
        &self,
        league_slug: &str,
        season_year: i32,
        record: &MatchRecord,
    ) -> Result<PersistResult, DbError> {
        placardb_db::insert_full_match(&self.pool, league_slug, season_year, record).await
    }

    async fn last_round(
        &self,
        league_slug: &str,
        season_year: i32,
    ) -> Result<Option<i32>, DbError> {
        placardb_db::last_processed_round(&self.pool, league_slug, season_year).await
    }
}
