///! Raw (untyped) league table records, straight from the page cells

use serde::{Deserialize, Serialize};

/// One standings row as text; column meaning already resolved from the header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStandingsRow {
    pub position: String,
    pub team: String,
    pub played: String,
    pub won: String,
    pub drawn: String,
    pub lost: String,
    pub goals_for: String,
    pub goals_against: String,
    pub goal_difference: String,
    pub points: String,
}

/// One fixtures row as text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFixture {
    /// e.g. "29/08/2025" or "2025-08-29 18:30:0029/08/2025"
    pub date: String,
    pub home: String,
    /// Kick-off time or score, sometimes duplicated by the markup ("18:3018:30")
    pub mid: String,
    pub away: String,
    pub ground: String,
}

/// Everything the extractor pulls out of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTables {
    pub standings: Vec<RawStandingsRow>,
    pub fixtures: Vec<RawFixture>,
}
