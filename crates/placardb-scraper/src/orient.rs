//! Home/away orientation validation.
//!
//! Page layout puts one team on the left and one on the right, but the left
//! column is not always the home side. Three independent signals decide:
//!
//! 1. the home-team declaration inside the document itself (strongest);
//! 2. the URL slug convention (`/jogo/<date>-<home>-<away>/<id>`);
//! 3. the goal tally — side-tagged goal events re-summed against the score.
//!
//! When the document declaration and the slug disagree, the declaration wins:
//! the slug is an external naming convention, the declaration is the page
//! describing itself. With no usable signal the record is rejected rather
//! than persisted with a coin-flip orientation.

use placardb_core::{MatchLocator, Side};

use crate::error::ScraperError;
use crate::types::RawMatchFields;

/// Verdict of one orientation signal (or of the combined decision).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Parse order already matches home/away.
    Confirmed,
    /// Parse order was inverted and the fields have been swapped.
    Corrected,
}

/// Validates and, when necessary, corrects the home/away assignment of
/// `fields` in place.
///
/// # Errors
///
/// Returns [`ScraperError::OrientationAmbiguous`] when no signal yields a
/// verdict — the record cannot be safely attributed to either side.
pub fn validate_orientation(
    fields: &mut RawMatchFields,
    locator: &MatchLocator,
) -> Result<Orientation, ScraperError> {
    let declared = declared_home_verdict(fields);
    let slug = slug_verdict(fields, &locator.url);
    let tally = goal_tally_verdict(fields);
    let slug_contradicts = matches!((declared, slug), (Some(d), Some(s)) if d != s);

    let verdict = declared.or(slug).or(tally).ok_or_else(|| {
        ScraperError::OrientationAmbiguous {
            url: locator.url.clone(),
        }
    })?;

    // One log event per correction, with the slug contradiction folded in
    // rather than reported separately.
    if verdict == Orientation::Corrected {
        tracing::warn!(
            url = %locator.url,
            left = %fields.home_team,
            right = %fields.away_team,
            slug_contradicts,
            "parsed columns were away-first, swapping sides"
        );
        fields.swap_sides();
    } else if slug_contradicts {
        tracing::warn!(
            url = %locator.url,
            declared_home = fields.declared_home.as_deref().unwrap_or(""),
            "URL slug contradicts document home declaration, trusting document"
        );
    }
    Ok(verdict)
}

fn declared_home_verdict(fields: &RawMatchFields) -> Option<Orientation> {
    let declared = normalize_name(fields.declared_home.as_deref()?);
    if declared.is_empty() {
        return None;
    }
    if declared == normalize_name(&fields.home_team) {
        Some(Orientation::Confirmed)
    } else if declared == normalize_name(&fields.away_team) {
        Some(Orientation::Corrected)
    } else {
        None
    }
}

/// Match URLs follow `/jogo/YYYY-MM-DD-<home-slug>-<away-slug>/<id>`. The
/// team slugs themselves contain dashes, so the check is prefix-based: which
/// parsed team's slug the remainder starts with decides the verdict.
fn slug_verdict(fields: &RawMatchFields, url: &str) -> Option<Orientation> {
    let tail = url.split("/jogo/").nth(1)?;
    let slug_part = tail.split('/').next()?;
    // Strip the leading YYYY-MM-DD.
    let teams_part = slug_part
        .splitn(4, '-')
        .nth(3)
        .map_or(slug_part, |rest| rest);

    let home_slug = slugify(&fields.home_team);
    let away_slug = slugify(&fields.away_team);
    if home_slug.is_empty() || away_slug.is_empty() || home_slug == away_slug {
        return None;
    }

    if teams_part.starts_with(&home_slug) {
        Some(Orientation::Confirmed)
    } else if teams_part.starts_with(&away_slug) {
        Some(Orientation::Corrected)
    } else {
        None
    }
}

/// Re-sums side-tagged goal events and compares against the parsed score.
/// Own goals credit the opposite side. Only a tally that exactly matches one
/// of the two orderings counts; anything else (untagged events, partial
/// timelines) yields no verdict.
fn goal_tally_verdict(fields: &RawMatchFields) -> Option<Orientation> {
    let home_score: u32 = fields.home_score.trim().parse().ok()?;
    let away_score: u32 = fields.away_score.trim().parse().ok()?;
    if home_score == away_score {
        return None;
    }

    let mut left = 0u32;
    let mut right = 0u32;
    for event in &fields.events {
        if !is_goal_kind(&event.kind) {
            continue;
        }
        let side = event.side?;
        let credited = if event.kind == "own_goal" {
            side.flipped()
        } else {
            side
        };
        match credited {
            Side::Home => left += 1,
            Side::Away => right += 1,
        }
    }

    if (left, right) == (home_score, away_score) {
        Some(Orientation::Confirmed)
    } else if (left, right) == (away_score, home_score) {
        Some(Orientation::Corrected)
    } else {
        None
    }
}

fn is_goal_kind(kind: &str) -> bool {
    matches!(kind, "goal" | "penalty_goal" | "own_goal")
}

/// Accent-folded, lowercased comparison form of a team name.
fn normalize_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(fold_accent)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn slugify(raw: &str) -> String {
    let folded = normalize_name(raw);
    let mut slug = String::with_capacity(folded.len());
    for ch in folded.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_owned()
}

fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}
