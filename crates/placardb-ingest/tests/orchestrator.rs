//! Orchestration tests over mock seams: no network, no database.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use placardb_core::{LeagueEntry, MatchLocator, MatchRecord};
use placardb_db::{DbError, PersistResult};
use placardb_ingest::{
    BatchOrchestrator, CancellationFlag, DocumentFetcher, IngestPipeline, MatchStore, RetryPolicy,
    RoundSource, Stage, TaskOutcome,
};
use placardb_scraper::{RawDocument, ScraperError};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn match_html(home: &str, away: &str, score: (u32, u32)) -> String {
    format!(
        r#"<html><body>
          <div class="match-header">
            <div class="match-header-team left home"><div class="match-header-team-name"><a href="/equipa/h">{home}</a></div></div>
            <div class="match-header-vs"><a>{}-{}</a></div>
            <div class="match-header-team right"><div class="match-header-team-name"><a href="/equipa/a">{away}</a></div></div>
          </div>
          <div class="dateauthor">13/07/2025 16:00</div>
        </body></html>"#,
        score.0, score.1
    )
}

fn scoreless_html() -> String {
    r#"<html><body>
      <div class="match-header">
        <div class="match-header-team left home"><div class="match-header-team-name"><a href="/equipa/h">Bahia</a></div></div>
        <div class="match-header-team right"><div class="match-header-team-name"><a href="/equipa/a">Vitória</a></div></div>
      </div>
      <div class="dateauthor">13/07/2025 16:00</div>
    </body></html>"#
        .to_owned()
}

fn locator(n: usize) -> MatchLocator {
    MatchLocator {
        league_slug: "brasileirao".to_owned(),
        season_year: 2025,
        round: 13,
        url: format!("https://example.com/jogo/m{n}/{n}"),
    }
}

// ---------------------------------------------------------------------------
// Mock seams
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum FetchStep {
    Ok(String),
    Status(u16),
    NotFound,
}

/// Scripted fetcher: per-URL response sequences, repeating the final step
/// once the script is exhausted. Counts attempts per URL.
#[derive(Default)]
struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, VecDeque<FetchStep>>>,
    attempts: Mutex<HashMap<String, u32>>,
}

impl ScriptedFetcher {
    fn script(&self, url: &str, steps: Vec<FetchStep>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_owned(), steps.into());
    }

    fn attempts(&self, url: &str) -> u32 {
        *self.attempts.lock().unwrap().get(url).unwrap_or(&0)
    }
}

#[async_trait]
impl DocumentFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<RawDocument, ScraperError> {
        *self
            .attempts
            .lock()
            .unwrap()
            .entry(url.to_owned())
            .or_insert(0) += 1;

        let step = {
            let mut scripts = self.scripts.lock().unwrap();
            let queue = scripts.get_mut(url).unwrap_or_else(|| {
                panic!("no script for {url}");
            });
            if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue.front().cloned().unwrap()
            }
        };

        match step {
            FetchStep::Ok(html) => Ok(RawDocument {
                url: url.to_owned(),
                html,
                status: 200,
                fetched_at: Utc::now(),
                render_ms: 5,
            }),
            FetchStep::Status(status) => Err(ScraperError::UnexpectedStatus {
                status,
                url: url.to_owned(),
            }),
            FetchStep::NotFound => Err(ScraperError::NotFound {
                url: url.to_owned(),
            }),
        }
    }
}

/// Failure classes the store can be scripted to produce, mirroring the two
/// kinds of database trouble a run can hit.
#[derive(Clone, Copy)]
enum PersistFault {
    /// Connection-level: the pool timed out.
    Timeout,
    /// Integrity-level: the league catalog was never seeded.
    UnseededLeague,
}

/// In-memory store with optional one-shot persist failure per URL.
#[derive(Default)]
struct MemoryStore {
    complete: Mutex<HashSet<String>>,
    persisted: Mutex<Vec<MatchRecord>>,
    fail_once: Mutex<HashMap<String, PersistFault>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    fn fail_persist_once(&self, url: &str, fault: PersistFault) {
        self.fail_once.lock().unwrap().insert(url.to_owned(), fault);
    }

    fn persisted_count(&self) -> usize {
        self.persisted.lock().unwrap().len()
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn is_complete(&self, source_url: &str) -> Result<bool, DbError> {
        Ok(self.complete.lock().unwrap().contains(source_url))
    }

    async fn persist(
        &self,
        _league_slug: &str,
        _season_year: i32,
        record: &MatchRecord,
    ) -> Result<PersistResult, DbError> {
        if let Some(fault) = self.fail_once.lock().unwrap().remove(&record.source_url) {
            return Err(match fault {
                PersistFault::Timeout => DbError::Sqlx(sqlx::Error::PoolTimedOut),
                PersistFault::UnseededLeague => DbError::UnknownLeague {
                    slug: "brasileirao".to_owned(),
                },
            });
        }
        if !self
            .complete
            .lock()
            .unwrap()
            .insert(record.source_url.clone())
        {
            return Ok(PersistResult::AlreadyPersisted);
        }
        self.persisted.lock().unwrap().push(record.clone());
        Ok(PersistResult::Inserted {
            match_id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        })
    }

    async fn last_round(
        &self,
        _league_slug: &str,
        _season_year: i32,
    ) -> Result<Option<i32>, DbError> {
        Ok(None)
    }
}

struct FixedSource(Vec<MatchLocator>);

#[async_trait]
impl RoundSource for FixedSource {
    async fn discover(
        &self,
        _league: &LeagueEntry,
        _season_year: i32,
        _round: i32,
    ) -> Result<Vec<MatchLocator>, ScraperError> {
        Ok(self.0.clone())
    }
}

fn pipeline(fetcher: Arc<ScriptedFetcher>, store: Arc<MemoryStore>) -> IngestPipeline {
    IngestPipeline::new(
        fetcher,
        store,
        RetryPolicy {
            max_retries: 2,
            backoff_base_ms: 1,
        },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_run_skips_without_fetching() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let store = Arc::new(MemoryStore::default());
    let locators = vec![locator(1), locator(2)];
    for (i, loc) in locators.iter().enumerate() {
        fetcher.script(
            &loc.url,
            vec![FetchStep::Ok(match_html("Palmeiras", "Santos", (i as u32, 1)))],
        );
    }

    let pipeline = pipeline(Arc::clone(&fetcher), Arc::clone(&store));
    let orchestrator = BatchOrchestrator::new(
        pipeline,
        Arc::new(FixedSource(locators.clone())),
        2,
        CancellationFlag::new(),
    );

    let first = orchestrator.run_locators(&locators).await;
    assert_eq!(first.persisted, 2);
    assert!(first.is_clean());

    let second = orchestrator.run_locators(&locators).await;
    assert_eq!(second.persisted, 0);
    assert_eq!(second.skipped, 2);
    // The guard fires before the fetcher: no second fetch happened.
    assert_eq!(fetcher.attempts(&locators[0].url), 1);
    assert_eq!(fetcher.attempts(&locators[1].url), 1);
    assert_eq!(store.persisted_count(), 2);
}

#[tokio::test]
async fn transient_failures_are_retried_within_budget() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let store = Arc::new(MemoryStore::default());
    let loc = locator(1);
    fetcher.script(
        &loc.url,
        vec![
            FetchStep::Status(502),
            FetchStep::Status(503),
            FetchStep::Ok(match_html("Flamengo", "Vasco", (3, 0))),
        ],
    );

    let outcome = pipeline(Arc::clone(&fetcher), store).process(&loc).await;
    assert!(matches!(outcome, TaskOutcome::Persisted { .. }));
    assert_eq!(fetcher.attempts(&loc.url), 3);
}

#[tokio::test]
async fn budget_exhaustion_is_a_transient_tagged_failure() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let store = Arc::new(MemoryStore::default());
    let loc = locator(1);
    fetcher.script(&loc.url, vec![FetchStep::Status(502)]);

    let outcome = pipeline(Arc::clone(&fetcher), store).process(&loc).await;
    match outcome {
        TaskOutcome::Failed(failure) => {
            assert_eq!(failure.stage, Stage::Fetch);
            assert!(failure.transient, "operator should know a re-run may help");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    // max_retries = 2 means exactly three attempts, never more.
    assert_eq!(fetcher.attempts(&loc.url), 3);
}

#[tokio::test]
async fn not_found_is_never_retried() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let store = Arc::new(MemoryStore::default());
    let loc = locator(1);
    fetcher.script(&loc.url, vec![FetchStep::NotFound]);

    let outcome = pipeline(Arc::clone(&fetcher), store).process(&loc).await;
    match outcome {
        TaskOutcome::Failed(failure) => {
            assert_eq!(failure.stage, Stage::Fetch);
            assert!(!failure.transient);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(fetcher.attempts(&loc.url), 1);
}

#[tokio::test]
async fn structurally_broken_page_fails_at_parse() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let store = Arc::new(MemoryStore::default());
    let loc = locator(1);
    fetcher.script(&loc.url, vec![FetchStep::Ok(scoreless_html())]);

    let outcome = pipeline(fetcher, Arc::clone(&store)).process(&loc).await;
    match outcome {
        TaskOutcome::Failed(failure) => {
            assert_eq!(failure.stage, Stage::Parse);
            assert!(!failure.transient);
            assert!(failure.message.contains("score"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(store.persisted_count(), 0);
}

#[tokio::test]
async fn failed_persist_leaves_the_match_retryable() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let store = Arc::new(MemoryStore::default());
    let loc = locator(1);
    fetcher.script(
        &loc.url,
        vec![FetchStep::Ok(match_html("Cruzeiro", "Atlético", (1, 1)))],
    );
    store.fail_persist_once(&loc.url, PersistFault::Timeout);

    let pipeline = pipeline(Arc::clone(&fetcher), Arc::clone(&store));

    let first = pipeline.process(&loc).await;
    match first {
        TaskOutcome::Failed(failure) => {
            assert_eq!(failure.stage, Stage::Persist);
            assert!(failure.transient, "a timed-out pool is worth a re-run");
        }
        other => panic!("expected persist failure, got {other:?}"),
    }
    assert_eq!(store.persisted_count(), 0, "nothing half-written");

    // Next run starts over: the guard finds no complete record, the match is
    // re-fetched and lands.
    let second = pipeline.process(&loc).await;
    assert!(matches!(second, TaskOutcome::Persisted { .. }));
    assert_eq!(store.persisted_count(), 1);
}

#[tokio::test]
async fn integrity_failure_at_persist_is_reported_fatal() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let store = Arc::new(MemoryStore::default());
    let loc = locator(1);
    fetcher.script(
        &loc.url,
        vec![FetchStep::Ok(match_html("Cruzeiro", "Atlético", (1, 1)))],
    );
    store.fail_persist_once(&loc.url, PersistFault::UnseededLeague);

    let outcome = pipeline(fetcher, store).process(&loc).await;
    match outcome {
        TaskOutcome::Failed(failure) => {
            assert_eq!(failure.stage, Stage::Persist);
            assert!(
                !failure.transient,
                "an integrity failure reproduces identically on re-run"
            );
        }
        other => panic!("expected persist failure, got {other:?}"),
    }
}

#[tokio::test]
async fn one_bad_match_never_aborts_the_round() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let store = Arc::new(MemoryStore::default());
    let locators: Vec<MatchLocator> = (1..=10).map(locator).collect();

    for loc in locators.iter().take(8) {
        fetcher.script(
            &loc.url,
            vec![FetchStep::Ok(match_html("Time A", "Time B", (2, 0)))],
        );
    }
    // Ninth recovers after two transient failures, tenth is structurally bad.
    fetcher.script(
        &locators[8].url,
        vec![
            FetchStep::Status(502),
            FetchStep::Status(502),
            FetchStep::Ok(match_html("Time A", "Time B", (0, 1))),
        ],
    );
    fetcher.script(&locators[9].url, vec![FetchStep::Ok(scoreless_html())]);

    let league = LeagueEntry {
        slug: "brasileirao".to_owned(),
        name: "Campeonato Brasileiro Série A".to_owned(),
        country: "Brasil".to_owned(),
        fixture_url: "https://example.com/fixtures".to_owned(),
    };
    let orchestrator = BatchOrchestrator::new(
        pipeline(Arc::clone(&fetcher), Arc::clone(&store)),
        Arc::new(FixedSource(locators.clone())),
        3,
        CancellationFlag::new(),
    );

    let result = orchestrator.run_round(&league, 2025, 13).await.unwrap();
    assert_eq!(result.persisted, 9);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].url, locators[9].url);
    assert_eq!(result.total(), 10);
    assert_eq!(store.persisted_count(), 9);
}

#[tokio::test]
async fn cancellation_stops_dispatching() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let store = Arc::new(MemoryStore::default());
    let locators = vec![locator(1), locator(2)];

    let cancel = CancellationFlag::new();
    cancel.cancel();
    let orchestrator = BatchOrchestrator::new(
        pipeline(Arc::clone(&fetcher), Arc::clone(&store)),
        Arc::new(FixedSource(locators.clone())),
        2,
        cancel,
    );

    let result = orchestrator.run_locators(&locators).await;
    assert_eq!(result.total(), 0);
    assert_eq!(fetcher.attempts(&locators[0].url), 0);
}
