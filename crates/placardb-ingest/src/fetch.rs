//! Production implementations of the fetch-side traits, backed by
//! [`RenderClient`].

use async_trait::async_trait;
use placardb_core::{LeagueEntry, MatchLocator};
use placardb_scraper::{
    crawl, RawDocument, RenderClient, ScraperError,
};

use crate::traits::{DocumentFetcher, RoundSource};

/// [`DocumentFetcher`] over the rendering client. Single attempt per call;
/// the pipeline owns the retry budget.
pub struct RenderFetcher {
    client: RenderClient,
}

impl RenderFetcher {
    #[must_use]
    pub fn new(client: RenderClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentFetcher for RenderFetcher {
    async fn fetch(&self, url: &str) -> Result<RawDocument, ScraperError> {
        self.client.fetch_document(url).await
    }
}

/// [`RoundSource`] that fetches the league's fixture page for the round and
/// extracts the match links.
pub struct FixturePageSource<F: DocumentFetcher> {
    fetcher: F,
}

impl<F: DocumentFetcher> FixturePageSource<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl<F: DocumentFetcher> RoundSource for FixturePageSource<F> {
    async fn discover(
        &self,
        league: &LeagueEntry,
        season_year: i32,
        round: i32,
    ) -> Result<Vec<MatchLocator>, ScraperError> {
        let listing_url = crawl::round_listing_url(&league.fixture_url, season_year, round);
        let doc = self.fetcher.fetch(&listing_url).await?;
        let links = crawl::extract_match_links(&doc.html, &listing_url)?;

        tracing::info!(
            league = %league.slug,
            season_year,
            round,
            matches = links.len(),
            "discovered round match links"
        );

        Ok(links
            .into_iter()
            .map(|url| MatchLocator {
                league_slug: league.slug.clone(),
                season_year,
                round,
                url,
            })
            .collect())
    }
}
