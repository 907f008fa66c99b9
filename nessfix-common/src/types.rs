use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One team's line in the league table, in source (rank) order.
///
/// The minimal form carries only `position`, `team` and `points`; the full form
/// also carries the played/won/drawn/lost/for/against/difference columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsRow {
    /// Display position, e.g. "1" or "=3"
    #[serde(alias = "pos", default, deserialize_with = "cell")]
    pub position: String,
    #[serde(default)]
    pub team: String,
    #[serde(default, deserialize_with = "cell", skip_serializing_if = "String::is_empty")]
    pub played: String,
    #[serde(default, deserialize_with = "cell", skip_serializing_if = "String::is_empty")]
    pub won: String,
    #[serde(default, deserialize_with = "cell", skip_serializing_if = "String::is_empty")]
    pub drawn: String,
    #[serde(default, deserialize_with = "cell", skip_serializing_if = "String::is_empty")]
    pub lost: String,
    #[serde(default, deserialize_with = "cell", skip_serializing_if = "String::is_empty")]
    pub goals_for: String,
    #[serde(default, deserialize_with = "cell", skip_serializing_if = "String::is_empty")]
    pub goals_against: String,
    #[serde(default, deserialize_with = "cell", skip_serializing_if = "String::is_empty")]
    pub goal_difference: String,
    #[serde(default, deserialize_with = "cell")]
    pub points: String,
}

impl StandingsRow {
    /// Minimal row: position, team and points only.
    pub fn minimal(position: impl Into<String>, team: impl Into<String>, points: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            team: team.into(),
            points: points.into(),
            ..Default::default()
        }
    }

    /// True when every column of the full league-table record is present.
    pub fn has_full_record(&self) -> bool {
        [
            &self.position,
            &self.team,
            &self.played,
            &self.won,
            &self.drawn,
            &self.lost,
            &self.goals_for,
            &self.goals_against,
            &self.goal_difference,
            &self.points,
        ]
        .iter()
        .all(|v| !v.trim().is_empty())
    }
}

/// A single scheduled or played match.
///
/// An empty `result` means the match has not been played yet, whatever `time`
/// holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// `YYYY-MM-DD`, or the trimmed source text when it could not be parsed
    #[serde(default)]
    pub date: String,
    /// `H:MM` / `HH:MM` kick-off, empty if unknown
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub home: String,
    #[serde(default)]
    pub away: String,
    /// Score or status text, empty until played
    #[serde(default)]
    pub result: String,
    /// Venue, empty if unknown
    #[serde(default)]
    pub ground: String,
}

impl Fixture {
    pub fn is_played(&self) -> bool {
        !self.result.trim().is_empty()
    }

    pub fn is_upcoming(&self) -> bool {
        !self.is_played()
    }

    /// Chronological key: date followed by time.
    ///
    /// Only valid as a chronological order while dates are zero-padded ISO and
    /// times share one padding convention; it is a plain string comparison.
    pub fn sort_key(&self) -> String {
        format!("{}{}", self.date, self.time)
    }
}

/// The value every renderer is driven from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderModel {
    #[serde(default)]
    pub standings: Vec<StandingsRow>,
    #[serde(default)]
    pub fixtures: Vec<Fixture>,
    /// When the source was scraped. Older snapshots do not carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RenderModel {
    pub fn new(standings: Vec<StandingsRow>, fixtures: Vec<Fixture>, updated_at: DateTime<Utc>) -> Self {
        Self {
            standings,
            fixtures,
            updated_at: Some(updated_at),
        }
    }

    pub fn upcoming(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter().filter(|f| f.is_upcoming())
    }

    pub fn past(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter().filter(|f| f.is_played())
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Table cells arrive as text from the scraper but as numbers from hand-edited
/// snapshots; both become display strings.
fn cell<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Cell>::deserialize(deserializer)? {
        Some(Cell::Text(s)) => s,
        Some(Cell::Int(n)) => n.to_string(),
        Some(Cell::Float(f)) => f.to_string(),
        None => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standings_accepts_legacy_pos_and_numbers() {
        let json = r#"{"standings":[{"pos":"1","team":"Ness","points":21},{"pos":2,"team":"Back","points":"18"}],"fixtures":[]}"#;
        let model = RenderModel::from_json(json).unwrap();
        assert_eq!(model.standings[0].position, "1");
        assert_eq!(model.standings[0].points, "21");
        assert_eq!(model.standings[1].position, "2");
        assert!(model.updated_at.is_none());
    }

    #[test]
    fn test_full_record_detection() {
        let mut row = StandingsRow::minimal("1", "Ness", "21");
        assert!(!row.has_full_record());

        row.played = "9".into();
        row.won = "7".into();
        row.drawn = "0".into();
        row.lost = "2".into();
        row.goals_for = "30".into();
        row.goals_against = "12".into();
        row.goal_difference = "18".into();
        assert!(row.has_full_record());

        row.goal_difference = " ".into();
        assert!(!row.has_full_record());
    }

    #[test]
    fn test_json_uses_camel_case_and_skips_empty_stats() {
        let mut row = StandingsRow::minimal("1", "Ness", "21");
        row.goals_for = "30".into();
        let model = RenderModel {
            standings: vec![row],
            fixtures: vec![],
            updated_at: None,
        };
        let json = model.to_json_pretty().unwrap();
        assert!(json.contains("\"goalsFor\": \"30\""));
        assert!(!json.contains("goalsAgainst"));
        assert!(!json.contains("updatedAt"));
    }

    #[test]
    fn test_fixture_state_follows_result_only() {
        let upcoming = Fixture {
            date: "2025-08-29".into(),
            time: "18:30".into(),
            home: "Ness".into(),
            away: "Example".into(),
            ..Default::default()
        };
        assert!(upcoming.is_upcoming());
        assert_eq!(upcoming.sort_key(), "2025-08-2918:30");

        let played = Fixture {
            result: "3-1".into(),
            ..upcoming.clone()
        };
        assert!(played.is_played());
    }

    #[test]
    fn test_fixture_missing_fields_default_to_empty() {
        let f: Fixture = serde_json::from_str(r#"{"date":"2025-08-29","home":"Ness","away":"X"}"#).unwrap();
        assert_eq!(f.time, "");
        assert_eq!(f.result, "");
        assert_eq!(f.ground, "");
    }
}
