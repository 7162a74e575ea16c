//! Shared configuration and canonical data model for placardb.
//!
//! The canonical [`MatchRecord`] produced by the scraper and consumed by the
//! persistence layer lives here, together with the env-driven [`AppConfig`]
//! and the YAML league catalog.

pub mod app_config;
pub mod config;
pub mod leagues;
pub mod model;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use leagues::{LeagueCatalog, LeagueCatalogError, LeagueEntry};
pub use model::{
    EventKind, EventRecord, LineupBlock, LineupPlayer, MatchLocator, MatchRecord, Side, StatBlock,
};
