//! Lineup extraction: starters, bench, coach, one block per side.

use scraper::{ElementRef, Html};

use super::{element_text, sel};
use crate::types::{RawLineup, RawPlayer};

/// Extracts both lineups in parse order (left column = as-parsed home).
///
/// Strategies:
/// 1. game-report lineup columns (`#game_report .zz-tpl-col`);
/// 2. the legacy matchup module with explicit home/away panels;
/// 3. a linear scan over numbered player entries, split 11/11 with the rest
///    as bench — the last-resort reading of a degraded layout.
pub(super) fn extract_lineups(document: &Html) -> (RawLineup, RawLineup) {
    let strategies: &[fn(&Html) -> Option<(RawLineup, RawLineup)>] = &[
        lineups_from_game_report,
        lineups_from_matchup_module,
        lineups_from_linear_scan,
    ];
    for strategy in strategies {
        if let Some((mut home, mut away)) = strategy(document) {
            apply_pitch_ratings(document, &mut home, &mut away);
            return (home, away);
        }
    }
    (RawLineup::default(), RawLineup::default())
}

fn parse_player(name_el: &ElementRef<'_>, number_el: Option<&ElementRef<'_>>) -> RawPlayer {
    RawPlayer {
        name: element_text(name_el),
        number: number_el.map(element_text).filter(|n| !n.is_empty()),
        rating: None,
    }
}

fn players_in(scope: &ElementRef<'_>, container_css: &'static str) -> Vec<RawPlayer> {
    let container = scope.select(&sel(container_css)).next();
    let Some(container) = container else {
        return Vec::new();
    };
    container
        .select(&sel(".player"))
        .filter_map(|player_el| {
            let name_el = player_el.select(&sel("a[href*=\"/jogador/\"]")).next()?;
            let number_el = player_el.select(&sel(".number")).next();
            let player = parse_player(&name_el, number_el.as_ref());
            (!player.name.is_empty()).then_some(player)
        })
        .collect()
}

fn coach_of(scope: &ElementRef<'_>) -> Option<String> {
    scope
        .select(&sel("a[href*=\"/treinador/\"]"))
        .next()
        .map(|el| element_text(&el))
        .filter(|name| !name.is_empty())
}

fn lineups_from_game_report(document: &Html) -> Option<(RawLineup, RawLineup)> {
    let cols: Vec<ElementRef<'_>> = document
        .select(&sel("#game_report .zz-tpl-col"))
        .take(2)
        .collect();
    let [home_col, away_col] = cols.as_slice() else {
        return None;
    };

    let home = lineup_from_column(home_col);
    let away = lineup_from_column(away_col);
    (!home.starters.is_empty()).then_some((home, away))
}

fn lineup_from_column(col: &ElementRef<'_>) -> RawLineup {
    let mut starters = players_in(col, ".lineup");
    let mut bench = players_in(col, ".bench");

    // Older report columns list everyone in one run; the first eleven are
    // the starting side.
    if starters.is_empty() && bench.is_empty() {
        let mut all: Vec<RawPlayer> = col
            .select(&sel(".player"))
            .filter_map(|player_el| {
                let name_el = player_el.select(&sel("a[href*=\"/jogador/\"]")).next()?;
                let number_el = player_el.select(&sel(".number")).next();
                let player = parse_player(&name_el, number_el.as_ref());
                (!player.name.is_empty()).then_some(player)
            })
            .collect();
        if all.len() > 11 {
            bench = all.split_off(11);
        }
        starters = all;
    }

    RawLineup {
        starters,
        bench,
        coach: coach_of(col),
    }
}

fn lineups_from_matchup_module(document: &Html) -> Option<(RawLineup, RawLineup)> {
    let module = document.select(&sel(".game_matchup")).next()?;
    let home_panel = module.select(&sel(".home")).next()?;
    let away_panel = module.select(&sel(".away")).next()?;

    let lineup_of = |panel: &ElementRef<'_>| RawLineup {
        starters: players_in(panel, ".lineup"),
        bench: players_in(panel, ".bench"),
        coach: coach_of(panel),
    };

    let home = lineup_of(&home_panel);
    let away = lineup_of(&away_panel);
    (!home.starters.is_empty()).then_some((home, away))
}

/// Merges per-player match ratings from the tactical pitch widget onto the
/// starters. The widget lists the two elevens as `table.team` blocks in
/// home-then-away visual order, which matches parse order, so the merge is
/// orientation-safe: a later side swap carries the ratings along.
fn apply_pitch_ratings(document: &Html, home: &mut RawLineup, away: &mut RawLineup) {
    let tables: Vec<ElementRef<'_>> = document
        .select(&sel(
            ".pitch table.team, .pitch_eleven_horizontal table.team",
        ))
        .take(2)
        .collect();
    let [home_table, away_table] = tables.as_slice() else {
        return;
    };
    assign_ratings(home_table, home);
    assign_ratings(away_table, away);
}

fn assign_ratings(table: &ElementRef<'_>, lineup: &mut RawLineup) {
    for block in table.select(&sel(".campo_onze_bloco_jogador")) {
        let Some(name_el) = block.select(&sel(".player_name .player span")).next() else {
            continue;
        };
        let name = element_text(&name_el);
        let Some(rating) = rating_badge(&block) else {
            continue;
        };
        if let Some(player) = lineup
            .starters
            .iter_mut()
            .find(|p| base_name(&p.name) == name)
        {
            player.rating = Some(rating);
        }
    }
}

/// The rating is the only background-colored badge on a player block whose
/// text reads as a 0–10 number; other badges carry shirt styling.
fn rating_badge(block: &ElementRef<'_>) -> Option<String> {
    block
        .select(&sel("span[style*=\"background-color\"]"))
        .map(|el| element_text(&el))
        .find(|text| {
            text.replace(',', ".")
                .parse::<f64>()
                .is_ok_and(|v| (0.0..=10.0).contains(&v))
        })
}

/// Lineup entries may carry the captain marker; pitch blocks never do.
fn base_name(name: &str) -> &str {
    name.trim()
        .trim_end_matches("(C)")
        .trim_end_matches("(c)")
        .trim()
}

/// Last resort: every numbered player link in document order. Only accepted
/// when at least the 22 starters are present, so a partial render never
/// produces a half-invented lineup.
fn lineups_from_linear_scan(document: &Html) -> Option<(RawLineup, RawLineup)> {
    let mut players: Vec<RawPlayer> = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for player_el in document.select(&sel(".player")) {
        let Some(name_el) = player_el.select(&sel("a[href*=\"/jogador/\"]")).next() else {
            continue;
        };
        let Some(number_el) = player_el.select(&sel(".number")).next() else {
            continue;
        };
        let player = parse_player(&name_el, Some(&number_el));
        if player.name.is_empty() || player.number.is_none() {
            continue;
        }
        let key = format!("{}#{}", player.name, player.number.as_deref().unwrap_or(""));
        if seen.insert(key) {
            players.push(player);
        }
    }

    if players.len() < 22 {
        return None;
    }

    let bench: Vec<RawPlayer> = players.split_off(22);
    let away_starters = players.split_off(11);
    let mid = bench.len().div_ceil(2);
    let (home_bench, away_bench) = bench.split_at(mid);

    let coaches: Vec<String> = document
        .select(&sel("a[href*=\"/treinador/\"]"))
        .map(|el| element_text(&el))
        .filter(|name| !name.is_empty())
        .collect();

    Some((
        RawLineup {
            starters: players,
            bench: home_bench.to_vec(),
            coach: coaches.first().cloned(),
        },
        RawLineup {
            starters: away_starters,
            bench: away_bench.to_vec(),
            coach: coaches.get(1).cloned(),
        },
    ))
}
