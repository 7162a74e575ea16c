//! Reference-entity resolution: teams, stadiums, referees, players, seasons.
//!
//! Every function takes a transaction handle, not a pool: entity resolution
//! always runs inside the same transaction as the match insert, so that a
//! failed persist never leaves freshly created entities dangling.

use sqlx::PgConnection;

use crate::DbError;

/// Resolves the season row for `(league_slug, year)`, creating the season on
/// first sight. The league itself must already be seeded.
///
/// # Errors
///
/// Returns [`DbError::UnknownLeague`] when the league slug has no row, or
/// [`DbError::Sqlx`] on query failure.
pub async fn resolve_season(
    conn: &mut PgConnection,
    league_slug: &str,
    year: i32,
) -> Result<i64, DbError> {
    let league_id: Option<i64> = sqlx::query_scalar("SELECT id FROM leagues WHERE slug = $1")
        .bind(league_slug)
        .fetch_optional(&mut *conn)
        .await?;
    let Some(league_id) = league_id else {
        return Err(DbError::UnknownLeague {
            slug: league_slug.to_owned(),
        });
    };

    let season_id: i64 = sqlx::query_scalar(
        "INSERT INTO seasons (league_id, year) \
         VALUES ($1, $2) \
         ON CONFLICT (league_id, year) DO UPDATE SET year = EXCLUDED.year \
         RETURNING id",
    )
    .bind(league_id)
    .bind(year)
    .fetch_one(&mut *conn)
    .await?;
    Ok(season_id)
}

/// Name-keyed get-or-create. The no-op `DO UPDATE` makes `RETURNING id` yield
/// the existing row's id on conflict.
async fn get_or_create_named(
    conn: &mut PgConnection,
    table: &'static str,
    name: &str,
) -> Result<i64, DbError> {
    let sql = format!(
        "INSERT INTO {table} (name) VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id"
    );
    let id: i64 = sqlx::query_scalar(&sql)
        .bind(name)
        .fetch_one(conn)
        .await?;
    Ok(id)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn get_or_create_team(conn: &mut PgConnection, name: &str) -> Result<i64, DbError> {
    get_or_create_named(conn, "teams", name).await
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn get_or_create_stadium(conn: &mut PgConnection, name: &str) -> Result<i64, DbError> {
    get_or_create_named(conn, "stadiums", name).await
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn get_or_create_referee(conn: &mut PgConnection, name: &str) -> Result<i64, DbError> {
    get_or_create_named(conn, "referees", name).await
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn get_or_create_player(conn: &mut PgConnection, name: &str) -> Result<i64, DbError> {
    get_or_create_named(conn, "players", name).await
}
