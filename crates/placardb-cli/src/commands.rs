//! Command handlers, called from `main` after config and logging are set up.

use std::sync::Arc;

use placardb_core::{AppConfig, LeagueCatalog, LeagueEntry, MatchLocator};
use placardb_ingest::{
    BatchOrchestrator, BatchResult, CancellationFlag, DocumentFetcher, FixturePageSource,
    IngestPipeline, MatchStore, PgMatchStore, RenderFetcher, RetryPolicy,
};
use placardb_scraper::{AdaptiveThrottle, RenderClient};
use sqlx::PgPool;

async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool = placardb_db::connect_pool(
        &config.database_url,
        placardb_db::PoolConfig::from_app_config(config),
    )
    .await?;
    placardb_db::ping(&pool).await?;
    Ok(pool)
}

fn load_league(config: &AppConfig, slug: &str) -> anyhow::Result<LeagueEntry> {
    let catalog = LeagueCatalog::load(&config.leagues_path)?;
    Ok(catalog.get(slug)?.clone())
}

struct Wiring {
    orchestrator: BatchOrchestrator,
    store: Arc<PgMatchStore>,
}

fn build_wiring(config: &AppConfig, pool: &PgPool) -> anyhow::Result<Wiring> {
    let throttle = AdaptiveThrottle::new(config.min_request_delay_ms, config.max_request_delay_ms);
    let client = RenderClient::new(
        config.fetch_timeout_secs,
        &config.user_agent,
        config.render_endpoint.clone(),
        throttle,
    )?;
    let fetcher: Arc<dyn DocumentFetcher> = Arc::new(RenderFetcher::new(client));
    let store = Arc::new(PgMatchStore::new(pool.clone()));

    let pipeline = IngestPipeline::new(
        Arc::clone(&fetcher),
        Arc::clone(&store) as Arc<dyn MatchStore>,
        RetryPolicy {
            max_retries: config.fetch_max_retries,
            backoff_base_ms: config.fetch_backoff_base_ms,
        },
    );
    let source = Arc::new(FixturePageSource::new(fetcher));

    let cancel = CancellationFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, finishing in-flight matches");
                cancel.cancel();
            }
        });
    }

    Ok(Wiring {
        orchestrator: BatchOrchestrator::new(
            pipeline,
            source,
            config.max_concurrent_matches,
            cancel,
        ),
        store,
    })
}

fn print_summary(result: &BatchResult) {
    println!(
        "done: {} persisted, {} skipped, {} failed",
        result.persisted,
        result.skipped,
        result.failures.len()
    );
    for failure in &result.failures {
        println!("  failed [{}] {}: {}", failure.stage, failure.url, failure.message);
    }
}

pub async fn run_round(
    config: &AppConfig,
    league_slug: &str,
    year: i32,
    round: Option<i32>,
) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let league = load_league(config, league_slug)?;
    let wiring = build_wiring(config, &pool)?;

    let round = match round {
        Some(round) => round,
        None => {
            let next = wiring
                .store
                .last_round(league_slug, year)
                .await?
                .map_or(1, |last| last + 1);
            tracing::info!(round = next, "no round given, continuing after last stored round");
            next
        }
    };

    let result = wiring.orchestrator.run_round(&league, year, round).await?;
    print_summary(&result);
    if !result.is_clean() {
        anyhow::bail!("{} of {} matches failed", result.failures.len(), result.total());
    }
    Ok(())
}

pub async fn run_match(
    config: &AppConfig,
    league_slug: &str,
    year: i32,
    round: i32,
    url: String,
) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    // Validate the slug even though discovery is skipped.
    let _ = load_league(config, league_slug)?;
    let wiring = build_wiring(config, &pool)?;

    let locator = MatchLocator {
        league_slug: league_slug.to_owned(),
        season_year: year,
        round,
        url,
    };
    let result = wiring.orchestrator.run_locators(&[locator]).await;
    print_summary(&result);
    if !result.is_clean() {
        anyhow::bail!("match ingestion failed");
    }
    Ok(())
}

pub async fn run_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let applied = placardb_db::run_migrations(&pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

pub async fn run_seed(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let catalog = LeagueCatalog::load(&config.leagues_path)?;
    let count = placardb_db::seed_leagues(&pool, &catalog.leagues).await?;
    println!("seeded {count} league(s)");
    Ok(())
}
