//! Atomic match persistence and idempotency queries.

use chrono::{DateTime, NaiveDateTime, Utc};
use placardb_core::{LineupBlock, MatchRecord, Side, StatBlock};
use sqlx::{PgConnection, PgPool};

use crate::catalog;
use crate::DbError;

/// A row from the `matches` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MatchRow {
    pub id: i64,
    pub season_id: i64,
    pub round: i32,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub home_score: i32,
    pub away_score: i32,
    pub halftime_home_score: Option<i32>,
    pub halftime_away_score: Option<i32>,
    pub kickoff: NaiveDateTime,
    pub stadium_id: Option<i64>,
    pub referee_id: Option<i64>,
    pub attendance: Option<i32>,
    pub status: String,
    pub source_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of one persistence attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistResult {
    /// The match and all child rows were written in this call.
    Inserted { match_id: i64 },
    /// A complete record with this source URL already existed; nothing was
    /// written.
    AlreadyPersisted,
}

/// Fetches the persisted row for one source document, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn find_match(pool: &PgPool, source_url: &str) -> Result<Option<MatchRow>, DbError> {
    let row = sqlx::query_as::<_, MatchRow>(
        "SELECT id, season_id, round, home_team_id, away_team_id, home_score, away_score, \
                halftime_home_score, halftime_away_score, kickoff, stadium_id, referee_id, \
                attendance, status, source_url, created_at, updated_at \
         FROM matches WHERE source_url = $1",
    )
    .bind(source_url)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// True when a finished record for `source_url` already exists. Used as the
/// cheap pre-fetch idempotency check; the insert itself re-checks under the
/// unique constraint, so a race between the two never double-writes.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn match_is_complete(pool: &PgPool, source_url: &str) -> Result<bool, DbError> {
    let row = find_match(pool, source_url).await?;
    Ok(row.is_some_and(|row| row.status == "finished"))
}

/// Highest round with at least one complete match for the season, or `None`
/// when the season has no data yet. Drives round auto-detection.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn last_processed_round(
    pool: &PgPool,
    league_slug: &str,
    season_year: i32,
) -> Result<Option<i32>, DbError> {
    let round: Option<i32> = sqlx::query_scalar(
        "SELECT MAX(m.round) \
         FROM matches m \
         JOIN seasons s ON s.id = m.season_id \
         JOIN leagues l ON l.id = s.league_id \
         WHERE l.slug = $1 AND s.year = $2 AND m.status = 'finished'",
    )
    .bind(league_slug)
    .bind(season_year)
    .fetch_one(pool)
    .await?;
    Ok(round)
}

/// Persists one match record with all child rows in a single transaction.
///
/// Entity resolution (teams, stadium, referee, players) happens inside the
/// transaction, so a failure at any point rolls back everything including
/// freshly created entities. The `source_url` unique constraint makes the
/// write idempotent: a concurrent or repeated insert of the same match
/// resolves to [`PersistResult::AlreadyPersisted`] without touching rows.
///
/// # Errors
///
/// Returns [`DbError::UnknownLeague`] when the league is not seeded, or
/// [`DbError::Sqlx`] on any query failure (the transaction rolls back).
pub async fn insert_full_match(
    pool: &PgPool,
    league_slug: &str,
    season_year: i32,
    record: &MatchRecord,
) -> Result<PersistResult, DbError> {
    let mut tx = pool.begin().await?;

    let season_id = catalog::resolve_season(&mut tx, league_slug, season_year).await?;
    let home_team_id = catalog::get_or_create_team(&mut tx, &record.home_team).await?;
    let away_team_id = catalog::get_or_create_team(&mut tx, &record.away_team).await?;
    let stadium_id = match &record.stadium {
        Some(name) => Some(catalog::get_or_create_stadium(&mut tx, name).await?),
        None => None,
    };
    let referee_id = match &record.referee {
        Some(name) => Some(catalog::get_or_create_referee(&mut tx, name).await?),
        None => None,
    };

    let match_id: Option<i64> = sqlx::query_scalar(
        "INSERT INTO matches \
             (season_id, round, home_team_id, away_team_id, home_score, away_score, \
              halftime_home_score, halftime_away_score, kickoff, stadium_id, referee_id, \
              attendance, home_coach, away_coach, status, source_url) \
         VALUES ($1, $2, $3, $4, $5, $6, \
                 $7, $8, $9, $10, $11, \
                 $12, $13, $14, 'finished', $15) \
         ON CONFLICT (source_url) DO NOTHING \
         RETURNING id",
    )
    .bind(season_id)
    .bind(record.round)
    .bind(home_team_id)
    .bind(away_team_id)
    .bind(record.home_score)
    .bind(record.away_score)
    .bind(record.halftime_home_score)
    .bind(record.halftime_away_score)
    .bind(record.kickoff)
    .bind(stadium_id)
    .bind(referee_id)
    .bind(record.attendance)
    .bind(&record.home_lineup.coach)
    .bind(&record.away_lineup.coach)
    .bind(&record.source_url)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(match_id) = match_id else {
        tx.rollback().await?;
        return Ok(PersistResult::AlreadyPersisted);
    };

    insert_stats(&mut tx, match_id, Side::Home, &record.home_stats).await?;
    insert_stats(&mut tx, match_id, Side::Away, &record.away_stats).await?;
    insert_events(&mut tx, match_id, record).await?;
    insert_lineup(&mut tx, match_id, Side::Home, &record.home_lineup).await?;
    insert_lineup(&mut tx, match_id, Side::Away, &record.away_lineup).await?;

    tx.commit().await?;
    Ok(PersistResult::Inserted { match_id })
}

async fn insert_stats(
    conn: &mut PgConnection,
    match_id: i64,
    side: Side,
    stats: &StatBlock,
) -> Result<(), DbError> {
    if stats.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO match_stats \
             (match_id, side, possession_pct, shots, shots_on_target, shots_blocked, corners, \
              expected_goals, expected_goals_on_target, passes, pass_accuracy_pct, fouls, \
              offsides, saves, tackles, duels_won, yellow_cards, red_cards) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, \
                 $8, $9, $10, $11, $12, \
                 $13, $14, $15, $16, $17, $18)",
    )
    .bind(match_id)
    .bind(side.as_str())
    .bind(stats.possession_pct)
    .bind(stats.shots)
    .bind(stats.shots_on_target)
    .bind(stats.shots_blocked)
    .bind(stats.corners)
    .bind(stats.expected_goals)
    .bind(stats.expected_goals_on_target)
    .bind(stats.passes)
    .bind(stats.pass_accuracy_pct)
    .bind(stats.fouls)
    .bind(stats.offsides)
    .bind(stats.saves)
    .bind(stats.tackles)
    .bind(stats.duels_won)
    .bind(stats.yellow_cards)
    .bind(stats.red_cards)
    .execute(conn)
    .await?;
    Ok(())
}

async fn insert_events(
    conn: &mut PgConnection,
    match_id: i64,
    record: &MatchRecord,
) -> Result<(), DbError> {
    for (ordinal, event) in record.events.iter().enumerate() {
        let player_id = catalog::get_or_create_player(&mut *conn, &event.player).await?;
        let secondary_player_id = match &event.secondary_player {
            Some(name) => Some(catalog::get_or_create_player(&mut *conn, name).await?),
            None => None,
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let ordinal = ordinal as i32;
        sqlx::query(
            "INSERT INTO match_events \
                 (match_id, ordinal, minute, added_time, period, kind, side, \
                  player_id, secondary_player_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(match_id)
        .bind(ordinal)
        .bind(event.minute)
        .bind(event.added_time)
        .bind(event.period)
        .bind(event.kind.as_str())
        .bind(event.side.as_str())
        .bind(player_id)
        .bind(secondary_player_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn insert_lineup(
    conn: &mut PgConnection,
    match_id: i64,
    side: Side,
    lineup: &LineupBlock,
) -> Result<(), DbError> {
    for (players, is_starter) in [(&lineup.starters, true), (&lineup.bench, false)] {
        for player in players {
            let player_id = catalog::get_or_create_player(&mut *conn, &player.name).await?;
            sqlx::query(
                "INSERT INTO match_lineups \
                     (match_id, side, player_id, shirt_number, is_starter, is_captain, rating) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (match_id, side, player_id) DO NOTHING",
            )
            .bind(match_id)
            .bind(side.as_str())
            .bind(player_id)
            .bind(player.shirt_number)
            .bind(is_starter)
            .bind(player.is_captain)
            .bind(player.rating)
            .execute(&mut *conn)
            .await?;
        }
    }
    Ok(())
}
