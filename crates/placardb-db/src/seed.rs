use placardb_core::LeagueEntry;
use sqlx::PgPool;

use crate::DbError;

/// Upsert leagues from the catalog file into the database.
///
/// Returns the number of leagues processed (inserted or updated). All
/// upserts run inside a single transaction; if any operation fails the
/// entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_leagues(pool: &PgPool, leagues: &[LeagueEntry]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for league in leagues {
        sqlx::query(
            "INSERT INTO leagues (slug, name, country, fixture_url) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (slug) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 country = EXCLUDED.country, \
                 fixture_url = EXCLUDED.fixture_url, \
                 updated_at = NOW()",
        )
        .bind(&league.slug)
        .bind(&league.name)
        .bind(&league.country)
        .bind(&league.fixture_url)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
