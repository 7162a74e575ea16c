//! Header metadata: teams, score, round, kickoff, venue, referee, attendance.

use scraper::Html;

use super::{element_text, sel};

/// Team-name pairs in parse order (left column first, right column second).
///
/// Strategies:
/// 1. game-report lineup columns (`#game_report .zz-tpl-col .subtitle`);
/// 2. match-header left/right team links;
/// 3. first two distinct team links anywhere in the main container.
pub(super) fn extract_teams(document: &Html) -> Option<(String, String)> {
    let strategies: &[fn(&Html) -> Option<(String, String)>] = &[
        teams_from_game_report,
        teams_from_match_header,
        teams_from_team_links,
    ];
    strategies.iter().find_map(|strategy| strategy(document))
}

fn teams_from_game_report(document: &Html) -> Option<(String, String)> {
    let subtitles: Vec<String> = document
        .select(&sel("#game_report .zz-tpl-col .subtitle"))
        .map(|el| element_text(&el))
        .filter(|name| !name.is_empty())
        .collect();
    match subtitles.as_slice() {
        [home, away, ..] => Some((home.clone(), away.clone())),
        _ => None,
    }
}

fn teams_from_match_header(document: &Html) -> Option<(String, String)> {
    let left = document
        .select(&sel(".match-header-team.left .match-header-team-name a"))
        .next()?;
    let right = document
        .select(&sel(".match-header-team.right .match-header-team-name a"))
        .next()?;
    let home = element_text(&left);
    let away = element_text(&right);
    (!home.is_empty() && !away.is_empty()).then_some((home, away))
}

fn teams_from_team_links(document: &Html) -> Option<(String, String)> {
    let mut names: Vec<String> = Vec::new();
    for link in document.select(&sel("a[href*=\"/equipa/\"]")) {
        let name = element_text(&link);
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
        if names.len() == 2 {
            break;
        }
    }
    match names.as_slice() {
        [home, away] => Some((home.clone(), away.clone())),
        _ => None,
    }
}

/// The home team the document itself declares, independent of page layout.
/// This is the strongest orientation signal (§ the in-document declaration
/// outranks the URL slug convention).
pub(super) fn extract_declared_home(document: &Html) -> Option<String> {
    // Newer layout tags the home column explicitly.
    if let Some(el) = document
        .select(&sel(".match-header-team.home .match-header-team-name a"))
        .next()
    {
        let name = element_text(&el);
        if !name.is_empty() {
            return Some(name);
        }
    }
    // Older layout carries the declaration as a data attribute on the report.
    document
        .select(&sel("#game_report[data-home-team]"))
        .next()
        .and_then(|el| el.value().attr("data-home-team"))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}

pub(super) fn extract_score(document: &Html) -> Option<(String, String)> {
    let strategies = [".match-header-vs a", ".match-header-vs .result"];
    for css in strategies {
        for el in document.select(&sel_dyn(css)) {
            if let Some(pair) = split_score(&element_text(&el)) {
                return Some(pair);
            }
        }
    }
    None
}

pub(super) fn extract_halftime(document: &Html) -> Option<(String, String)> {
    document
        .select(&sel(".match-header-vs .halftime"))
        .next()
        .and_then(|el| split_score(&element_text(&el)))
}

fn split_score(text: &str) -> Option<(String, String)> {
    let re = score_regex();
    let caps = re.captures(text)?;
    Some((caps[1].to_owned(), caps[2].to_owned()))
}

fn score_regex() -> &'static regex::Regex {
    static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"(\d+)\s*[-–]\s*(\d+)").unwrap())
}

pub(super) fn extract_round(document: &Html) -> Option<String> {
    static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let re = RE.get_or_init(|| regex::Regex::new(r"[Rr]odada\s*(\d+)").unwrap());
    let body = body_text(document);
    re.captures(&body).map(|caps| caps[1].to_owned())
}

pub(super) fn extract_kickoff(document: &Html) -> Option<String> {
    document
        .select(&sel(".dateauthor"))
        .next()
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
}

pub(super) fn extract_stadium(document: &Html) -> Option<String> {
    first_link_text(document, "a[href*=\"/estadio/\"]")
}

pub(super) fn extract_referee(document: &Html) -> Option<String> {
    first_link_text(document, "a[href*=\"/arbitro/\"]").map(|raw| collapse_whitespace(&raw))
}

pub(super) fn extract_attendance(document: &Html) -> Option<String> {
    static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let re = RE.get_or_init(|| regex::Regex::new(r"[Ll]otação[:\s]*([\d.\s]+)").unwrap());
    let body = body_text(document);
    re.captures(&body)
        .map(|caps| caps[1].chars().filter(char::is_ascii_digit).collect())
}

fn first_link_text(document: &Html, css: &str) -> Option<String> {
    document
        .select(&sel_dyn(css))
        .next()
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn body_text(document: &Html) -> String {
    document
        .select(&sel("body"))
        .next()
        .map(|body| body.text().collect::<String>())
        .unwrap_or_default()
}

/// Runtime variant of [`sel`] for selectors assembled from small tables.
fn sel_dyn(css: &str) -> scraper::Selector {
    #[allow(clippy::expect_used)]
    scraper::Selector::parse(css).expect("table selector must parse")
}
