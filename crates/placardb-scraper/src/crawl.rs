//! Round discovery: extracting the ordered list of match URLs from a
//! competition fixture page.

use scraper::{Html, Selector};

use crate::error::ScraperError;
use crate::parse::sel;

/// Builds the fixture-listing URL for one round of a season.
#[must_use]
pub fn round_listing_url(fixture_url: &str, season_year: i32, round: i32) -> String {
    format!(
        "{}?epoca={season_year}&jornada={round}",
        fixture_url.trim_end_matches('/')
    )
}

/// Extracts the round's match links from the fixture page, in document order
/// and deduplicated.
///
/// Strategies, first success wins:
/// 1. result cells inside the fixture table (`#fixture_games td.result a`);
/// 2. any match link inside the fixture table;
/// 3. any match link anywhere in the document (layout drifted, but the links
///    survive).
///
/// # Errors
///
/// Returns [`ScraperError::Discovery`] when no strategy finds a single match
/// link — the listing layout has changed and retrying will not help.
pub fn extract_match_links(html: &str, page_url: &str) -> Result<Vec<String>, ScraperError> {
    let document = Html::parse_document(html);

    let strategies: &[fn(&Html) -> Vec<String>] = &[
        links_from_result_cells,
        links_from_fixture_table,
        links_anywhere,
    ];

    for strategy in strategies {
        let links = strategy(&document);
        if !links.is_empty() {
            return Ok(dedupe_preserving_order(
                links
                    .into_iter()
                    .map(|href| absolutize(&href, page_url))
                    .collect(),
            ));
        }
    }

    Err(ScraperError::Discovery {
        url: page_url.to_owned(),
        reason: "no match links found by any strategy (fixture table missing?)".to_owned(),
    })
}

fn collect_hrefs(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains("/jogo/"))
        .map(str::to_owned)
        .collect()
}

fn links_from_result_cells(document: &Html) -> Vec<String> {
    collect_hrefs(document, &sel("#fixture_games td.result a[href*=\"/jogo/\"]"))
}

fn links_from_fixture_table(document: &Html) -> Vec<String> {
    collect_hrefs(document, &sel("#fixture_games a[href*=\"/jogo/\"]"))
}

fn links_anywhere(document: &Html) -> Vec<String> {
    collect_hrefs(document, &sel("a[href*=\"/jogo/\"]"))
}

fn dedupe_preserving_order(links: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

/// Resolves a relative href against the listing page's origin.
fn absolutize(href: &str, page_url: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_owned();
    }
    let origin = page_url
        .find("://")
        .and_then(|scheme_end| {
            page_url[scheme_end + 3..]
                .find('/')
                .map(|path_start| &page_url[..scheme_end + 3 + path_start])
        })
        .unwrap_or(page_url);
    format!("{}/{}", origin.trim_end_matches('/'), href.trim_start_matches('/'))
}
