use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub leagues_path: PathBuf,
    /// Optional headless rendering service. When unset, pages are fetched
    /// with a plain GET, which is enough for fixtures and tests.
    pub render_endpoint: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    /// Worker-pool bound for concurrent match pipelines within a batch.
    pub max_concurrent_matches: usize,
    pub min_request_delay_ms: u64,
    pub max_request_delay_ms: u64,
    /// Additional fetch attempts after the first failure.
    pub fetch_max_retries: u32,
    pub fetch_backoff_base_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("leagues_path", &self.leagues_path)
            .field("database_url", &"[redacted]")
            .field("render_endpoint", &self.render_endpoint)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_concurrent_matches", &self.max_concurrent_matches)
            .field("min_request_delay_ms", &self.min_request_delay_ms)
            .field("max_request_delay_ms", &self.max_request_delay_ms)
            .field("fetch_max_retries", &self.fetch_max_retries)
            .field("fetch_backoff_base_ms", &self.fetch_backoff_base_ms)
            .finish()
    }
}
