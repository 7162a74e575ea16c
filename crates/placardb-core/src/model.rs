//! Canonical match model.
//!
//! [`MatchRecord`] is the frozen, fully-oriented record handed to the
//! persistence layer. All paired fields (score, stat blocks, lineups, event
//! sides) refer to the side the source itself declares as home, never to
//! parse order — the scraper's orientation validator enforces this before a
//! record is constructed.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifies one match's source document within a round.
///
/// `url` is globally unique and doubles as the idempotency key for
/// persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchLocator {
    pub league_slug: String,
    pub season_year: i32,
    pub round: i32,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

/// Closed set of timeline event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Goal,
    OwnGoal,
    PenaltyGoal,
    YellowCard,
    RedCard,
    SecondYellow,
    Substitution,
    MissedPenalty,
    VarReview,
}

impl EventKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Goal => "goal",
            EventKind::OwnGoal => "own_goal",
            EventKind::PenaltyGoal => "penalty_goal",
            EventKind::YellowCard => "yellow_card",
            EventKind::RedCard => "red_card",
            EventKind::SecondYellow => "second_yellow",
            EventKind::Substitution => "substitution",
            EventKind::MissedPenalty => "missed_penalty",
            EventKind::VarReview => "var_review",
        }
    }

    /// True for event kinds that put the ball in the net for the credited side.
    #[must_use]
    pub fn is_score(self) -> bool {
        matches!(self, EventKind::Goal | EventKind::PenaltyGoal)
    }
}

/// One timeline entry. `secondary_player` is the assist provider for goals
/// and the substituted-out player for substitutions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub minute: i32,
    pub added_time: i32,
    /// 1–2 regulation halves, 3–4 extra time.
    pub period: i16,
    pub kind: EventKind,
    pub player: String,
    pub secondary_player: Option<String>,
    pub side: Side,
}

/// One side's statistics. Absence means "not reported by the source";
/// zero is a real observed value and is kept distinct from `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub possession_pct: Option<i32>,
    pub shots: Option<i32>,
    pub shots_on_target: Option<i32>,
    pub shots_blocked: Option<i32>,
    pub corners: Option<i32>,
    pub expected_goals: Option<Decimal>,
    pub expected_goals_on_target: Option<Decimal>,
    pub passes: Option<i32>,
    pub pass_accuracy_pct: Option<i32>,
    pub fouls: Option<i32>,
    pub offsides: Option<i32>,
    pub saves: Option<i32>,
    pub tackles: Option<i32>,
    pub duels_won: Option<i32>,
    pub yellow_cards: Option<i32>,
    pub red_cards: Option<i32>,
}

impl StatBlock {
    /// True when no field was reported at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == StatBlock::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupPlayer {
    pub name: String,
    pub shirt_number: Option<i16>,
    pub is_captain: bool,
    /// Match rating on the source's 0–10 scale, when the page grades the
    /// player.
    pub rating: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupBlock {
    pub starters: Vec<LineupPlayer>,
    pub bench: Vec<LineupPlayer>,
    pub coach: Option<String>,
}

impl LineupBlock {
    /// Player names across starters and bench, used for side inference on
    /// events that carry no side marker of their own.
    #[must_use]
    pub fn contains_player(&self, name: &str) -> bool {
        self.starters
            .iter()
            .chain(self.bench.iter())
            .any(|p| p.name == name)
    }
}

/// The canonical record for one finished match, ready for atomic persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub round: i32,
    pub home_team: String,
    pub away_team: String,
    pub home_score: i32,
    pub away_score: i32,
    pub halftime_home_score: Option<i32>,
    pub halftime_away_score: Option<i32>,
    pub kickoff: NaiveDateTime,
    pub stadium: Option<String>,
    pub referee: Option<String>,
    pub attendance: Option<i32>,
    pub home_stats: StatBlock,
    pub away_stats: StatBlock,
    /// Ordered by (minute, added time), ties broken by document order.
    pub events: Vec<EventRecord>,
    pub home_lineup: LineupBlock,
    pub away_lineup: LineupBlock,
    pub source_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_flips() {
        assert_eq!(Side::Home.flipped(), Side::Away);
        assert_eq!(Side::Away.flipped(), Side::Home);
    }

    #[test]
    fn event_kind_serializes_snake_case() {
        let json = serde_json::to_string(&EventKind::SecondYellow).unwrap();
        assert_eq!(json, "\"second_yellow\"");
        assert_eq!(EventKind::SecondYellow.as_str(), "second_yellow");
    }

    #[test]
    fn empty_stat_block_reports_empty() {
        assert!(StatBlock::default().is_empty());
        let block = StatBlock {
            shots: Some(0),
            ..StatBlock::default()
        };
        assert!(!block.is_empty(), "an observed zero is not absence");
    }

    #[test]
    fn lineup_player_lookup_covers_bench() {
        let lineup = LineupBlock {
            starters: vec![LineupPlayer {
                name: "Weverton".to_string(),
                shirt_number: Some(21),
                is_captain: false,
                rating: Some(Decimal::new(68, 1)),
            }],
            bench: vec![LineupPlayer {
                name: "Rony".to_string(),
                shirt_number: Some(10),
                is_captain: false,
                rating: None,
            }],
            coach: Some("Abel Ferreira".to_string()),
        };
        assert!(lineup.contains_player("Weverton"));
        assert!(lineup.contains_player("Rony"));
        assert!(!lineup.contains_player("Endrick"));
    }
}
