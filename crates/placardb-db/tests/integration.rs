//! Offline unit tests for placardb-db pool configuration and row types.
//! These tests do not require a live database connection.

use placardb_core::{AppConfig, Environment};
use placardb_db::{MatchRow, PersistResult, PoolConfig};
use std::path::PathBuf;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        leagues_path: PathBuf::from("./config/leagues.yaml"),
        render_endpoint: None,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        fetch_timeout_secs: 30,
        user_agent: "ua".to_string(),
        max_concurrent_matches: 1,
        min_request_delay_ms: 250,
        max_request_delay_ms: 1000,
        fetch_max_retries: 3,
        fetch_backoff_base_ms: 500,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`MatchRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn match_row_has_expected_fields() {
    use chrono::{NaiveDate, Utc};

    let row = MatchRow {
        id: 1_i64,
        season_id: 2_i64,
        round: 13_i32,
        home_team_id: 3_i64,
        away_team_id: 4_i64,
        home_score: 2_i32,
        away_score: 1_i32,
        halftime_home_score: Some(1),
        halftime_away_score: Some(0),
        kickoff: NaiveDate::from_ymd_opt(2025, 7, 13)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap(),
        stadium_id: Some(5),
        referee_id: None,
        attendance: Some(38_512),
        status: "finished".to_string(),
        source_url: "https://example.com/jogo/2025-07-13-palmeiras-sao-paulo/123".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.round, 13);
    assert_eq!(row.home_score, 2);
    assert_eq!(row.status, "finished");
    assert!(row.referee_id.is_none());
}

#[test]
fn persist_result_distinguishes_insert_from_skip() {
    let inserted = PersistResult::Inserted { match_id: 7 };
    assert_ne!(inserted, PersistResult::AlreadyPersisted);
    assert!(matches!(
        inserted,
        PersistResult::Inserted { match_id: 7 }
    ));
}
