//! Intermediate payloads between fetch, parse, and normalize.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use placardb_core::Side;

/// One page's rendered HTML plus fetch metadata. Lives only for the duration
/// of a single pipeline invocation and is discarded after parsing.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub url: String,
    pub html: String,
    pub status: u16,
    pub fetched_at: DateTime<Utc>,
    pub render_ms: u64,
}

/// Untyped field values extracted by the structural parser.
///
/// `home_*`/`away_*` reflect *parse order* (left/right page layout) until the
/// orientation validator has run; after that they are authoritative. Numeric
/// values stay strings here — coercion is the normalizer's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMatchFields {
    pub home_team: String,
    pub away_team: String,
    /// Home-team name the document itself declares, when a marker is present.
    pub declared_home: Option<String>,
    pub home_score: String,
    pub away_score: String,
    pub halftime: Option<(String, String)>,
    pub round: Option<String>,
    pub kickoff: String,
    pub stadium: Option<String>,
    pub referee: Option<String>,
    pub attendance: Option<String>,
    /// Canonical stat key → raw cell text, one map per side.
    pub home_stats: BTreeMap<&'static str, String>,
    pub away_stats: BTreeMap<&'static str, String>,
    /// Document order preserved; the normalizer sorts with this as tie-break.
    pub events: Vec<RawEvent>,
    pub home_lineup: RawLineup,
    pub away_lineup: RawLineup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Parser-level tag, e.g. `"goal"`, `"yellow_card"`, `"substitution"`.
    pub kind: String,
    pub player: String,
    pub secondary: Option<String>,
    pub minute: Option<String>,
    pub added_time: Option<String>,
    /// Known for header scorers (left/right column); `None` for events the
    /// page does not tag with a side.
    pub side: Option<Side>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLineup {
    pub starters: Vec<RawPlayer>,
    pub bench: Vec<RawPlayer>,
    pub coach: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPlayer {
    pub name: String,
    pub number: Option<String>,
    /// Raw rating badge text from the tactical pitch widget, when present.
    pub rating: Option<String>,
}

impl RawMatchFields {
    /// Swap every paired field in one pass. Either all pairs flip or none do;
    /// callers never observe a partially swapped record.
    pub fn swap_sides(&mut self) {
        std::mem::swap(&mut self.home_team, &mut self.away_team);
        std::mem::swap(&mut self.home_score, &mut self.away_score);
        if let Some((home, away)) = &mut self.halftime {
            std::mem::swap(home, away);
        }
        std::mem::swap(&mut self.home_stats, &mut self.away_stats);
        std::mem::swap(&mut self.home_lineup, &mut self.away_lineup);
        for event in &mut self.events {
            if let Some(side) = event.side {
                event.side = Some(side.flipped());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_sides_flips_every_pair() {
        let mut fields = RawMatchFields {
            home_team: "Palmeiras".to_owned(),
            away_team: "São Paulo".to_owned(),
            home_score: "2".to_owned(),
            away_score: "1".to_owned(),
            halftime: Some(("1".to_owned(), "0".to_owned())),
            ..RawMatchFields::default()
        };
        fields.home_stats.insert("possession_pct", "60".to_owned());
        fields.away_stats.insert("possession_pct", "40".to_owned());
        fields.events.push(RawEvent {
            kind: "goal".to_owned(),
            player: "Raphael Veiga".to_owned(),
            secondary: None,
            minute: Some("12".to_owned()),
            added_time: None,
            side: Some(Side::Home),
        });

        fields.swap_sides();

        assert_eq!(fields.home_team, "São Paulo");
        assert_eq!(fields.away_team, "Palmeiras");
        assert_eq!(fields.home_score, "1");
        assert_eq!(fields.halftime, Some(("0".to_owned(), "1".to_owned())));
        assert_eq!(fields.home_stats["possession_pct"], "40");
        assert_eq!(fields.away_stats["possession_pct"], "60");
        assert_eq!(fields.events[0].side, Some(Side::Away));
    }
}
