//! Coercion of raw extracted strings into the typed [`MatchRecord`].
//!
//! Every numeric value is range-checked here, not in the parser: the parser's
//! job is to find text, the normalizer's job is to refuse text that cannot be
//! true. The two failure classes are handled differently: text that parses to
//! an impossible value (negative counts, possession over 100%, minute 480)
//! fails the whole record, while optional text that cannot be parsed at all
//! is dropped with a warning — a decorated cell is noise, a number out of
//! range is a corrupted document.

use chrono::NaiveDateTime;
use placardb_core::{
    EventKind, EventRecord, LineupBlock, LineupPlayer, MatchLocator, MatchRecord, Side, StatBlock,
};
use rust_decimal::Decimal;

use crate::error::ScraperError;
use crate::types::{RawEvent, RawLineup, RawMatchFields};

const MAX_SCORE: i32 = 99;
const MAX_MINUTE: i32 = 130;

/// Builds the canonical record from oriented raw fields.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] when a mandatory field (score,
/// kickoff, round) cannot be coerced, or when any field — mandatory or not —
/// parses to an out-of-range value.
pub fn normalize_match(
    fields: RawMatchFields,
    locator: &MatchLocator,
) -> Result<MatchRecord, ScraperError> {
    let home_score = parse_score(&fields.home_score).map_err(|e| fail("home_score", e))?;
    let away_score = parse_score(&fields.away_score).map_err(|e| fail("away_score", e))?;

    let (halftime_home_score, halftime_away_score) = match &fields.halftime {
        Some((home, away)) => {
            // A halftime score that exceeds the final score is a parse
            // artifact, not data; drop the pair.
            let ht_home = parse_score(home).map_err(|e| fail("halftime_home", e))?;
            let ht_away = parse_score(away).map_err(|e| fail("halftime_away", e))?;
            if ht_home > home_score || ht_away > away_score {
                tracing::warn!(
                    url = %locator.url,
                    "halftime score exceeds final score, dropping"
                );
                (None, None)
            } else {
                (Some(ht_home), Some(ht_away))
            }
        }
        None => (None, None),
    };

    let round = match &fields.round {
        Some(raw) => parse_count(raw).map_err(|e| fail("round", e))?,
        None => locator.round,
    };
    if round != locator.round {
        tracing::warn!(
            url = %locator.url,
            page_round = round,
            expected = locator.round,
            "page round disagrees with crawl round, keeping page value"
        );
    }

    let kickoff = parse_kickoff(&fields.kickoff)?;

    let attendance = match &fields.attendance {
        Some(raw) => coerce_optional_count("attendance", raw, locator)?,
        None => None,
    };

    let home_lineup = normalize_lineup(&fields.home_lineup, locator);
    let away_lineup = normalize_lineup(&fields.away_lineup, locator);

    let events = normalize_events(&fields.events, &home_lineup, &away_lineup, locator)?;

    let record = MatchRecord {
        round,
        home_team: fields.home_team,
        away_team: fields.away_team,
        home_score,
        away_score,
        halftime_home_score,
        halftime_away_score,
        kickoff,
        stadium: fields.stadium,
        referee: fields.referee,
        attendance,
        home_stats: normalize_stats(&fields.home_stats, locator)?,
        away_stats: normalize_stats(&fields.away_stats, locator)?,
        events,
        home_lineup,
        away_lineup,
        source_url: locator.url.clone(),
    };
    Ok(record)
}

/// Why one raw value failed coercion. The distinction drives the policy in
/// the callers: out-of-range poisons the record, unparseable text only drops
/// optional fields.
enum CoerceError {
    Unparseable(String),
    OutOfRange(String),
}

impl CoerceError {
    fn reason(self) -> String {
        match self {
            CoerceError::Unparseable(r) | CoerceError::OutOfRange(r) => r,
        }
    }
}

fn fail(field: &str, err: CoerceError) -> ScraperError {
    normalization(field, err.reason())
}

fn normalization(field: &str, reason: impl Into<String>) -> ScraperError {
    ScraperError::Normalization {
        field: field.to_owned(),
        reason: reason.into(),
    }
}

fn parse_score(raw: &str) -> Result<i32, CoerceError> {
    let value = parse_count(raw)?;
    if value > MAX_SCORE {
        return Err(CoerceError::OutOfRange(format!("score {value} out of range")));
    }
    Ok(value)
}

/// Non-negative integer with pt-BR thousands separators stripped
/// (`38.512` → `38512`, `1 204` → `1204`).
fn parse_count(raw: &str) -> Result<i32, CoerceError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '.' | ' ' | '\u{a0}'))
        .collect();
    if cleaned.starts_with('-') {
        return Err(CoerceError::OutOfRange(format!("negative count {raw:?}")));
    }
    cleaned
        .parse::<i32>()
        .map_err(|_| CoerceError::Unparseable(format!("not a count: {raw:?}")))
}

/// Percentage between 0 and 100, with or without the `%` sign.
fn parse_percent(raw: &str) -> Result<i32, CoerceError> {
    let value = parse_count(raw.trim_end_matches('%'))?;
    if value > 100 {
        return Err(CoerceError::OutOfRange(format!("{value}% out of range")));
    }
    Ok(value)
}

/// Decimal with the pt-BR comma separator accepted (`2,14` → `2.14`).
fn parse_decimal(raw: &str) -> Result<Decimal, CoerceError> {
    let cleaned = raw.trim().replace(',', ".");
    let value: Decimal = cleaned
        .parse()
        .map_err(|_| CoerceError::Unparseable(format!("not a decimal: {raw:?}")))?;
    if value.is_sign_negative() {
        return Err(CoerceError::OutOfRange(format!("negative value {raw:?}")));
    }
    Ok(value)
}

/// Kickoff formats observed in the wild, tried in order:
/// `13/07/2025 16:00`, `13/07/2025`, `2 agosto 2025 18:30`, ISO datetime.
fn parse_kickoff(raw: &str) -> Result<NaiveDateTime, ScraperError> {
    let compact = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    for format in ["%d/%m/%Y %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&compact, format) {
            return Ok(dt);
        }
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(&compact, "%d/%m/%Y") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    if let Some(dt) = parse_pt_long_date(&compact) {
        return Ok(dt);
    }
    Err(normalization("kickoff", format!("unrecognized date {raw:?}")))
}

const PT_MONTHS: &[(&str, u32)] = &[
    ("janeiro", 1),
    ("fevereiro", 2),
    ("março", 3),
    ("marco", 3),
    ("abril", 4),
    ("maio", 5),
    ("junho", 6),
    ("julho", 7),
    ("agosto", 8),
    ("setembro", 9),
    ("outubro", 10),
    ("novembro", 11),
    ("dezembro", 12),
];

/// `2 agosto 2025 18:30` (time optional, `de` connectors tolerated).
fn parse_pt_long_date(text: &str) -> Option<NaiveDateTime> {
    let tokens: Vec<&str> = text
        .split_whitespace()
        .filter(|t| !t.eq_ignore_ascii_case("de"))
        .collect();
    if tokens.len() < 3 {
        return None;
    }

    let day: u32 = tokens[0].parse().ok()?;
    let month_name = tokens[1].to_lowercase();
    let month = PT_MONTHS
        .iter()
        .find(|(name, _)| *name == month_name)
        .map(|(_, n)| *n)?;
    let year: i32 = tokens[2].parse().ok()?;

    let (hour, minute) = tokens
        .get(3)
        .and_then(|t| t.split_once(':'))
        .and_then(|(h, m)| Some((h.parse::<u32>().ok()?, m.parse::<u32>().ok()?)))
        .unwrap_or((0, 0));

    chrono::NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
}

/// Coerces one side's raw stat map. Unparseable cell text drops the single
/// value with a warning; a value that parses but fails its range check fails
/// the record.
fn normalize_stats(
    raw: &std::collections::BTreeMap<&'static str, String>,
    locator: &MatchLocator,
) -> Result<StatBlock, ScraperError> {
    let mut block = StatBlock::default();
    for (key, value) in raw {
        let result = match *key {
            "possession_pct" | "pass_accuracy_pct" => parse_percent(value).map(Coerced::Int),
            "expected_goals" | "expected_goals_on_target" => {
                parse_decimal(value).map(Coerced::Dec)
            }
            _ => parse_count(value).map(Coerced::Int),
        };
        match result {
            Ok(coerced) => assign_stat(&mut block, key, coerced),
            Err(CoerceError::Unparseable(reason)) => {
                tracing::warn!(url = %locator.url, field = *key, reason, "dropping unparseable stat value");
            }
            Err(err @ CoerceError::OutOfRange(_)) => return Err(fail(key, err)),
        }
    }
    Ok(block)
}

enum Coerced {
    Int(i32),
    Dec(Decimal),
}

fn assign_stat(block: &mut StatBlock, key: &str, value: Coerced) {
    let slot = match key {
        "possession_pct" => &mut block.possession_pct,
        "shots" => &mut block.shots,
        "shots_on_target" => &mut block.shots_on_target,
        "shots_blocked" => &mut block.shots_blocked,
        "corners" => &mut block.corners,
        "passes" => &mut block.passes,
        "pass_accuracy_pct" => &mut block.pass_accuracy_pct,
        "fouls" => &mut block.fouls,
        "offsides" => &mut block.offsides,
        "saves" => &mut block.saves,
        "tackles" => &mut block.tackles,
        "duels_won" => &mut block.duels_won,
        "yellow_cards" => &mut block.yellow_cards,
        "red_cards" => &mut block.red_cards,
        "expected_goals" => {
            if let Coerced::Dec(d) = value {
                block.expected_goals = Some(d);
            }
            return;
        }
        "expected_goals_on_target" => {
            if let Coerced::Dec(d) = value {
                block.expected_goals_on_target = Some(d);
            }
            return;
        }
        _ => return,
    };
    if let Coerced::Int(n) = value {
        *slot = Some(n);
    }
}

fn coerce_optional_count(
    field: &str,
    raw: &str,
    locator: &MatchLocator,
) -> Result<Option<i32>, ScraperError> {
    match parse_count(raw) {
        Ok(value) => Ok(Some(value)),
        Err(CoerceError::Unparseable(reason)) => {
            tracing::warn!(url = %locator.url, field, reason, "dropping unparseable optional field");
            Ok(None)
        }
        Err(err @ CoerceError::OutOfRange(_)) => Err(fail(field, err)),
    }
}

fn normalize_lineup(raw: &RawLineup, locator: &MatchLocator) -> LineupBlock {
    let player_of = |p: &crate::types::RawPlayer| {
        let (name, is_captain) = strip_captain_marker(&p.name);
        let shirt_number = p.number.as_deref().and_then(|n| match n.trim().parse() {
            Ok(num) => Some(num),
            Err(_) => {
                tracing::warn!(url = %locator.url, number = %n, "dropping non-numeric shirt number");
                None
            }
        });
        let rating = p.rating.as_deref().and_then(|raw| {
            let rating = parse_rating(raw);
            if rating.is_none() {
                tracing::warn!(url = %locator.url, rating = %raw, "dropping unusable player rating");
            }
            rating
        });
        LineupPlayer {
            name,
            shirt_number,
            is_captain,
            rating,
        }
    };
    LineupBlock {
        starters: raw.starters.iter().map(player_of).collect(),
        bench: raw.bench.iter().map(player_of).collect(),
        coach: raw.coach.clone(),
    }
}

/// Match ratings live on a 0–10 scale; anything outside it is not a rating
/// (the pitch widget reuses the same badge markup for other numbers).
fn parse_rating(raw: &str) -> Option<Decimal> {
    let value: Decimal = raw.trim().replace(',', ".").parse().ok()?;
    (value >= Decimal::ZERO && value <= Decimal::from(10)).then_some(value)
}

/// `"Raphael Veiga (C)"` → (`"Raphael Veiga"`, true).
fn strip_captain_marker(name: &str) -> (String, bool) {
    let trimmed = name.trim();
    for marker in ["(C)", "(c)"] {
        if let Some(stripped) = trimmed.strip_suffix(marker) {
            return (stripped.trim().to_owned(), true);
        }
    }
    (trimmed.to_owned(), false)
}

/// Coerces the raw timeline. Unknown kinds, unparseable minutes, and events
/// whose side can be neither read nor inferred are skipped with a warning; a
/// minute or added time that parses out of range fails the record. The
/// survivors are stably sorted by (minute, added time).
fn normalize_events(
    raw: &[RawEvent],
    home_lineup: &LineupBlock,
    away_lineup: &LineupBlock,
    locator: &MatchLocator,
) -> Result<Vec<EventRecord>, ScraperError> {
    let mut events = Vec::new();
    for raw_event in raw {
        if let Some(event) = normalize_event(raw_event, home_lineup, away_lineup, locator)? {
            events.push(event);
        }
    }
    events.sort_by_key(|e| (e.minute, e.added_time));
    Ok(events)
}

fn normalize_event(
    raw: &RawEvent,
    home_lineup: &LineupBlock,
    away_lineup: &LineupBlock,
    locator: &MatchLocator,
) -> Result<Option<EventRecord>, ScraperError> {
    let Some(kind) = event_kind(&raw.kind) else {
        tracing::warn!(url = %locator.url, kind = %raw.kind, "skipping unknown event kind");
        return Ok(None);
    };

    let minute = match raw.minute.as_deref().map(parse_count) {
        Some(Ok(minute)) if minute <= MAX_MINUTE => minute,
        Some(Ok(minute)) => {
            return Err(normalization("minute", format!("minute {minute} out of range")));
        }
        Some(Err(err @ CoerceError::OutOfRange(_))) => return Err(fail("minute", err)),
        Some(Err(CoerceError::Unparseable(_))) | None => {
            tracing::warn!(
                url = %locator.url,
                minute = raw.minute.as_deref().unwrap_or(""),
                "skipping event with unusable minute"
            );
            return Ok(None);
        }
    };
    let added_time = match raw.added_time.as_deref().map(parse_count) {
        None | Some(Err(CoerceError::Unparseable(_))) => 0,
        Some(Ok(value)) => value,
        Some(Err(err @ CoerceError::OutOfRange(_))) => return Err(fail("added_time", err)),
    };

    let side = match raw.side {
        Some(side) => side,
        None => match infer_side(&raw.player, home_lineup, away_lineup) {
            Some(side) => side,
            None => {
                tracing::warn!(
                    url = %locator.url,
                    player = %raw.player,
                    "skipping event with unresolvable side"
                );
                return Ok(None);
            }
        },
    };

    Ok(Some(EventRecord {
        minute,
        added_time,
        period: period_of(minute),
        kind,
        player: strip_captain_marker(&raw.player).0,
        secondary_player: raw.secondary.as_deref().map(|s| strip_captain_marker(s).0),
        side,
    }))
}

fn event_kind(tag: &str) -> Option<EventKind> {
    Some(match tag {
        "goal" => EventKind::Goal,
        "own_goal" => EventKind::OwnGoal,
        "penalty_goal" => EventKind::PenaltyGoal,
        "yellow_card" => EventKind::YellowCard,
        "red_card" => EventKind::RedCard,
        "second_yellow" => EventKind::SecondYellow,
        "substitution" => EventKind::Substitution,
        "missed_penalty" => EventKind::MissedPenalty,
        "var_review" => EventKind::VarReview,
        _ => return None,
    })
}

/// Side inference for events the page does not tag: lineup membership, with
/// the captain marker tolerated on either side of the comparison.
fn infer_side(player: &str, home: &LineupBlock, away: &LineupBlock) -> Option<Side> {
    let name = strip_captain_marker(player).0;
    let in_home = home.contains_player(&name);
    let in_away = away.contains_player(&name);
    match (in_home, in_away) {
        (true, false) => Some(Side::Home),
        (false, true) => Some(Side::Away),
        _ => None,
    }
}

fn period_of(minute: i32) -> i16 {
    match minute {
        ..=45 => 1,
        46..=90 => 2,
        91..=105 => 3,
        _ => 4,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
