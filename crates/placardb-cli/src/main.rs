use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "placardb")]
#[command(about = "Match ingestion pipeline for Brazilian league data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ingest one round of a league season
    Round {
        /// League slug from config/leagues.yaml
        #[arg(long, default_value = "brasileirao")]
        league: String,

        /// Season year, e.g. 2025
        #[arg(long)]
        year: i32,

        /// Round number; omitted means the round after the last one stored
        #[arg(long)]
        round: Option<i32>,
    },
    /// Ingest a single match page by URL
    Match {
        /// League slug from config/leagues.yaml
        #[arg(long, default_value = "brasileirao")]
        league: String,

        /// Season year, e.g. 2025
        #[arg(long)]
        year: i32,

        /// Round the match belongs to
        #[arg(long)]
        round: i32,

        /// Match page URL
        url: String,
    },
    /// Run pending database migrations
    Migrate,
    /// Seed the league catalog from config/leagues.yaml
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = placardb_core::load_app_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Round {
            league,
            year,
            round,
        } => commands::run_round(&config, &league, year, round).await,
        Commands::Match {
            league,
            year,
            round,
            url,
        } => commands::run_match(&config, &league, year, round, url).await,
        Commands::Migrate => commands::run_migrate(&config).await,
        Commands::Seed => commands::run_seed(&config).await,
    }
}
