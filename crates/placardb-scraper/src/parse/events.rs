//! Timeline event extraction: goals, cards, substitutions.

use placardb_core::Side;
use scraper::{ElementRef, Html};

use super::{element_text, sel};
use crate::types::RawEvent;

/// Event-class → parser tag for the event-summary layout.
const EVENT_CLASSES: &[(&str, &str)] = &[
    ("goal", "goal"),
    ("own-goal", "own_goal"),
    ("penalty-goal", "penalty_goal"),
    ("yellow-card", "yellow_card"),
    ("red-card", "red_card"),
    ("yellow-red", "second_yellow"),
    ("second-yellow", "second_yellow"),
    ("substitution", "substitution"),
    ("missed-penalty", "missed_penalty"),
    ("var-review", "var_review"),
];

/// Extracts events in document order.
///
/// Strategy 1 is the consolidated `#event_summary` timeline (complete, with
/// side tags). When it is absent the header scorer columns plus a card scan
/// over player containers reconstruct what they can.
pub(super) fn extract_events(document: &Html) -> Vec<RawEvent> {
    let from_summary = events_from_summary(document);
    if !from_summary.is_empty() {
        return from_summary;
    }

    let mut events = events_from_header_scorers(document);
    events.extend(cards_from_player_scan(document));
    events
}

fn events_from_summary(document: &Html) -> Vec<RawEvent> {
    let mut events = Vec::new();
    for row in document.select(&sel("#event_summary .event")) {
        let classes: Vec<&str> = row.value().classes().collect();
        let Some(kind) = EVENT_CLASSES
            .iter()
            .find(|(class, _)| classes.contains(class))
            .map(|(_, kind)| (*kind).to_owned())
        else {
            continue;
        };

        let side = if classes.contains(&"left") {
            Some(Side::Home)
        } else if classes.contains(&"right") {
            Some(Side::Away)
        } else {
            None
        };

        let players: Vec<String> = row
            .select(&sel("a[href*=\"/jogador/\"]"))
            .map(|a| element_text(&a))
            .filter(|name| !name.is_empty())
            .collect();
        let Some(player) = players.first().cloned() else {
            continue;
        };

        let (minute, added_time) = minute_of(&row);
        events.push(RawEvent {
            kind,
            player,
            secondary: players.get(1).cloned(),
            minute,
            added_time,
            side,
        });
    }
    events
}

/// Header scorer columns: left column is the as-parsed home side. Goal lines
/// look like `Raphael Veiga 12'` / `Calleri 45'+2 (p)`.
fn events_from_header_scorers(document: &Html) -> Vec<RawEvent> {
    let mut events = Vec::new();
    for (css, side) in [
        (".match-header-scorers.left", Side::Home),
        (".match-header-scorers.right", Side::Away),
    ] {
        #[allow(clippy::expect_used)]
        let selector = scraper::Selector::parse(css).expect("static selector must parse");
        let Some(container) = document.select(&selector).next() else {
            continue;
        };
        let text = container.text().collect::<String>();
        for caps in scorer_regex().captures_iter(&text) {
            let trailing = caps.get(4).map_or("", |m| m.as_str());
            let kind = if trailing.contains("(p)") {
                "penalty_goal"
            } else if trailing.contains("(gc)") || trailing.contains("(og)") {
                "own_goal"
            } else {
                "goal"
            };
            events.push(RawEvent {
                kind: kind.to_owned(),
                player: caps[1].trim().to_owned(),
                secondary: None,
                minute: Some(caps[2].to_owned()),
                added_time: caps.get(3).map(|m| m.as_str().to_owned()),
                side: Some(side),
            });
        }
    }
    events
}

fn scorer_regex() -> &'static regex::Regex {
    static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"([A-ZÀ-Úa-zà-ú][A-ZÀ-Úa-zà-ú .'-]*?)\s*(\d+)'(?:\+(\d+))?\s*(\((?:p|gc|og)\))?")
            .unwrap()
    })
}

/// Cards attached to player containers. These rows carry no side marker; the
/// normalizer infers the side from lineup membership.
fn cards_from_player_scan(document: &Html) -> Vec<RawEvent> {
    let mut events = Vec::new();
    for player_el in document.select(&sel(".player")) {
        let Some(name_el) = player_el.select(&sel("a[href*=\"/jogador/\"]")).next() else {
            continue;
        };
        let name = element_text(&name_el);
        if name.is_empty() {
            continue;
        }
        for (card_css, kind) in [
            (".yellow-card", "yellow_card"),
            (".red-card", "red_card"),
            (".yellow-red", "second_yellow"),
        ] {
            #[allow(clippy::expect_used)]
            let selector = scraper::Selector::parse(card_css).expect("static selector must parse");
            if player_el.select(&selector).next().is_some() {
                let (minute, added_time) = minute_of(&player_el);
                events.push(RawEvent {
                    kind: kind.to_owned(),
                    player: name.clone(),
                    secondary: None,
                    minute,
                    added_time,
                    side: None,
                });
            }
        }
    }
    events
}

fn minute_of(element: &ElementRef<'_>) -> (Option<String>, Option<String>) {
    static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let re = RE.get_or_init(|| regex::Regex::new(r"(\d+)'(?:\+(\d+))?").unwrap());
    let text = element.text().collect::<String>();
    re.captures(&text).map_or((None, None), |caps| {
        (
            Some(caps[1].to_owned()),
            caps.get(2).map(|m| m.as_str().to_owned()),
        )
    })
}
