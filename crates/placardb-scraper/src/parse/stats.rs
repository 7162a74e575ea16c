//! Statistics table extraction.
//!
//! Two layouts exist in the wild: an inline table inside `.zz-container`
//! (labels in the first row, combined "home ● away" values in the second) and
//! the legacy `.graph-bar` blocks with one numeric span per side.

use std::collections::BTreeMap;

use scraper::Html;

use super::{element_text, sel};

/// Lowercased source label → canonical stat key. Portuguese labels first,
/// with the English synonyms the site occasionally ships.
const STAT_LABELS: &[(&str, &str)] = &[
    ("posse de bola", "possession_pct"),
    ("possession", "possession_pct"),
    ("chutes", "shots"),
    ("chutes (a gol)", "shots"),
    ("chutes a gol", "shots_on_target"),
    ("chutes bloqueados", "shots_blocked"),
    ("escanteios", "corners"),
    ("gols esperados", "expected_goals"),
    ("expected goals", "expected_goals"),
    ("gols esperados no alvo", "expected_goals_on_target"),
    ("total passes", "passes"),
    ("passes certos", "pass_accuracy_pct"),
    ("precisão de passes", "pass_accuracy_pct"),
    ("faltas", "fouls"),
    ("impedimentos", "offsides"),
    ("defesas", "saves"),
    ("total cortes", "tackles"),
    ("divididas ganhas", "duels_won"),
    ("cartões amarelos", "yellow_cards"),
    ("cartões vermelhos", "red_cards"),
];

type StatMap = BTreeMap<&'static str, String>;

/// Extracts both sides' raw stat values. Missing layouts yield empty maps —
/// statistics are optional data.
pub(super) fn extract_stats(document: &Html) -> (StatMap, StatMap) {
    let strategies: &[fn(&Html) -> (StatMap, StatMap)] =
        &[stats_from_inline_table, stats_from_graph_bars];
    for strategy in strategies {
        let (home, away) = strategy(document);
        if !home.is_empty() {
            return (home, away);
        }
    }
    (StatMap::new(), StatMap::new())
}

fn canonical_key(label: &str) -> Option<&'static str> {
    let folded = label.trim().to_lowercase();
    STAT_LABELS
        .iter()
        .find(|(source, _)| *source == folded)
        .map(|(_, key)| *key)
}

fn stats_from_inline_table(document: &Html) -> (StatMap, StatMap) {
    let mut home = StatMap::new();
    let mut away = StatMap::new();

    let Some(table) = document.select(&sel(".zz-container table")).next() else {
        return (home, away);
    };
    let rows: Vec<_> = table.select(&sel("tr")).collect();
    if rows.len() < 2 {
        return (home, away);
    }

    let labels: Vec<String> = rows[0].select(&sel("td, th")).map(|c| element_text(&c)).collect();
    let values: Vec<String> = rows[1].select(&sel("td, th")).map(|c| element_text(&c)).collect();

    for (label, value) in labels.iter().zip(values.iter()) {
        let Some(key) = canonical_key(label) else {
            continue;
        };
        if home.contains_key(key) {
            continue;
        }
        if let Some((home_value, away_value)) = split_pair(value) {
            home.insert(key, home_value);
            away.insert(key, away_value);
        }
    }
    (home, away)
}

/// Splits a combined "home ● away" cell. Falls back to taking the first and
/// last numeric tokens when no separator survives rendering.
fn split_pair(cell: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = cell
        .split(['●', '○'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() >= 2 {
        return Some(((*parts.first()?).to_owned(), (*parts.last()?).to_owned()));
    }

    static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let re = RE.get_or_init(|| regex::Regex::new(r"[\d.,]+%?").unwrap());
    let numbers: Vec<&str> = re.find_iter(cell).map(|m| m.as_str()).collect();
    if numbers.len() >= 2 {
        return Some(((*numbers.first()?).to_owned(), (*numbers.last()?).to_owned()));
    }
    None
}

fn stats_from_graph_bars(document: &Html) -> (StatMap, StatMap) {
    let mut home = StatMap::new();
    let mut away = StatMap::new();

    for bar in document.select(&sel(".graph-bar")) {
        let Some(title) = bar.select(&sel(".bars-title")).next() else {
            continue;
        };
        let Some(key) = canonical_key(&element_text(&title)) else {
            continue;
        };
        if home.contains_key(key) {
            continue;
        }
        let values: Vec<String> = bar
            .select(&sel(".bar-header .num"))
            .map(|el| element_text(&el))
            .collect();
        if let (Some(first), Some(last)) = (values.first(), values.last()) {
            if values.len() >= 2 {
                home.insert(key, first.clone());
                away.insert(key, last.clone());
            }
        }
    }
    (home, away)
}
