//! Structural parsing of a rendered match page into [`RawMatchFields`].
//!
//! The source site ships at least two generations of match-page markup and
//! drifts between them without notice, so every field category is extracted
//! by an ordered list of strategies — first success wins, and a best-effort
//! linear scan closes each list. Optional fields that no strategy finds stay
//! absent; only the fields needed to key the match (both team names, the
//! score, the kickoff date) are mandatory.

mod events;
mod header;
mod lineups;
mod stats;

use scraper::{Html, Selector};

use crate::error::ScraperError;
use crate::types::{RawDocument, RawMatchFields};

/// Parses a static CSS selector. All call sites pass compile-time literals
/// that are covered by tests, so a parse failure is a programming error.
pub(crate) fn sel(css: &'static str) -> Selector {
    #[allow(clippy::expect_used)]
    Selector::parse(css).expect("static selector must parse")
}

pub(crate) fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}

/// Extracts all raw field values from one match document.
///
/// # Errors
///
/// Returns [`ScraperError::MandatoryFieldMissing`] when no strategy can
/// locate both team names, a score, or the kickoff date — without those the
/// record cannot be keyed or deduplicated, so the page is structurally
/// unusable.
pub fn parse_match(doc: &RawDocument) -> Result<RawMatchFields, ScraperError> {
    let document = Html::parse_document(&doc.html);
    let mut fields = RawMatchFields::default();

    let missing = |field: &'static str| ScraperError::MandatoryFieldMissing {
        field,
        url: doc.url.clone(),
        snippet: body_snippet(&document),
    };

    let (home_team, away_team) = header::extract_teams(&document).ok_or_else(|| missing("teams"))?;
    fields.home_team = home_team;
    fields.away_team = away_team;
    fields.declared_home = header::extract_declared_home(&document);

    let (home_score, away_score) = header::extract_score(&document).ok_or_else(|| missing("score"))?;
    fields.home_score = home_score;
    fields.away_score = away_score;
    fields.halftime = header::extract_halftime(&document);

    fields.kickoff = header::extract_kickoff(&document).ok_or_else(|| missing("kickoff"))?;
    fields.round = header::extract_round(&document);
    fields.stadium = header::extract_stadium(&document);
    fields.referee = header::extract_referee(&document);
    fields.attendance = header::extract_attendance(&document);

    let (home_stats, away_stats) = stats::extract_stats(&document);
    fields.home_stats = home_stats;
    fields.away_stats = away_stats;

    fields.events = events::extract_events(&document);

    let (home_lineup, away_lineup) = lineups::extract_lineups(&document);
    fields.home_lineup = home_lineup;
    fields.away_lineup = away_lineup;

    tracing::debug!(
        url = %doc.url,
        home = %fields.home_team,
        away = %fields.away_team,
        stats = fields.home_stats.len(),
        events = fields.events.len(),
        starters = fields.home_lineup.starters.len(),
        "parsed match document"
    );

    Ok(fields)
}

/// First chunk of visible body text, kept on fatal-structural errors so a
/// layout change can be diagnosed without re-fetching the page.
fn body_snippet(document: &Html) -> String {
    let text = document
        .select(&sel("body"))
        .next()
        .map(|body| body.text().collect::<String>())
        .unwrap_or_default();
    let compact = text.split_whitespace().collect::<Vec<_>>().join(" ");
    compact.chars().take(160).collect()
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
