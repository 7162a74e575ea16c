//! HTTP client for retrieving rendered match pages.
//!
//! Match pages load their statistics and lineups asynchronously, so
//! production deployments route requests through a headless rendering
//! service (browserless-style `POST /content {"url": …}`) that returns the
//! settled DOM. Without a configured endpoint the client falls back to a
//! plain GET, which is what fixtures and tests use.

use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::error::ScraperError;
use crate::throttle::AdaptiveThrottle;
use crate::types::RawDocument;

/// Body markers the source serves with a 200 status when a match page does
/// not exist. Treated as fatal not-found, same as a real 404.
const NOT_FOUND_MARKERS: &[&str] = &["Página não encontrada", "page-error-404"];

#[derive(Serialize)]
struct RenderRequest<'a> {
    url: &'a str,
}

/// Single-attempt document fetcher. Retry policy lives with the caller
/// (see [`crate::retry::retry_with_backoff`]) so that batch orchestration
/// owns the attempt budget.
pub struct RenderClient {
    client: Client,
    render_endpoint: Option<String>,
    throttle: AdaptiveThrottle,
}

impl RenderClient {
    /// Creates a `RenderClient` with per-attempt timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        render_endpoint: Option<String>,
        throttle: AdaptiveThrottle,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            render_endpoint,
            throttle,
        })
    }

    /// Fetches one page's rendered HTML. One attempt, one timeout.
    ///
    /// Applies the shared adaptive politeness delay after the response so
    /// that concurrent pipelines collectively back off when the source slows
    /// down.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::NotFound`] — 404, or a 200 carrying a not-found
    ///   marker (not retried).
    /// - [`ScraperError::RateLimited`] — 429 with the server's `Retry-After`.
    /// - [`ScraperError::RendererBusy`] — the rendering service reports 503.
    /// - [`ScraperError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`ScraperError::Http`] — network, TLS, or timeout failure.
    pub async fn fetch_document(&self, url: &str) -> Result<RawDocument, ScraperError> {
        let started = Instant::now();
        let response = match &self.render_endpoint {
            Some(endpoint) => {
                self.client
                    .post(endpoint)
                    .json(&RenderRequest { url })
                    .send()
                    .await?
            }
            None => {
                self.client
                    .get(url)
                    .header(
                        reqwest::header::ACCEPT,
                        "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::ACCEPT_LANGUAGE, "pt-BR,pt;q=0.9,en;q=0.8")
                    .send()
                    .await?
            }
        };

        let status = response.status();
        let from_renderer = self.render_endpoint.is_some();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ScraperError::RateLimited {
                url: url.to_owned(),
                retry_after_secs,
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }

        if from_renderer && status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(ScraperError::RendererBusy {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let html = response.text().await?;
        #[allow(clippy::cast_possible_truncation)]
        let render_ms = started.elapsed().as_millis() as u64;

        if NOT_FOUND_MARKERS.iter().any(|m| html.contains(m)) {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }

        self.throttle.pause_after(render_ms).await;

        Ok(RawDocument {
            url: url.to_owned(),
            html,
            status: status.as_u16(),
            fetched_at: Utc::now(),
            render_ms,
        })
    }
}
