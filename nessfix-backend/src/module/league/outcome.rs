use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use nessfix_common::Fixture;

use super::fixtures::TeamMatcher;

static SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*-\s*(\d+)").expect("Invalid score regex"));

/// Result of a played match from the team of interest's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
    /// No numeric score, or the team did not play
    Unknown,
}

impl Outcome {
    pub fn symbol(&self) -> &'static str {
        match self {
            Outcome::Win => "W",
            Outcome::Loss => "L",
            Outcome::Draw => "D",
            Outcome::Unknown => "",
        }
    }

    /// Row shading class used by the page
    pub fn css_class(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Draw => "draw",
            Outcome::Unknown => "neutral",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Parse `home - away` goals out of a result text. En and em dashes count.
pub fn parse_score(result: &str) -> Option<(u32, u32)> {
    let unified = result.replace(['\u{2013}', '\u{2014}'], "-");
    let caps = SCORE.captures(&unified)?;
    let home = caps[1].parse().ok()?;
    let away = caps[2].parse().ok()?;
    Some((home, away))
}

pub fn classify(fixture: &Fixture, team: &TeamMatcher) -> Outcome {
    let Some((home_goals, away_goals)) = parse_score(&fixture.result) else {
        return Outcome::Unknown;
    };

    let (ours, theirs) = if team.is_home(fixture) {
        (home_goals, away_goals)
    } else if team.is_away(fixture) {
        (away_goals, home_goals)
    } else {
        return Outcome::Unknown;
    };

    match ours.cmp(&theirs) {
        std::cmp::Ordering::Greater => Outcome::Win,
        std::cmp::Ordering::Less => Outcome::Loss,
        std::cmp::Ordering::Equal => Outcome::Draw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn played(home: &str, away: &str, result: &str) -> Fixture {
        Fixture {
            date: "2025-08-01".into(),
            home: home.into(),
            away: away.into(),
            result: result.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_classify_from_either_side() {
        let ness = TeamMatcher::new("Ness");
        assert_eq!(classify(&played("Ness", "Back", "3-1"), &ness), Outcome::Win);
        assert_eq!(classify(&played("Back", "Ness", "3-1"), &ness), Outcome::Loss);
        assert_eq!(classify(&played("Ness", "Back", "2-2"), &ness), Outcome::Draw);
        assert_eq!(classify(&played("Back", "Ness", "0 \u{2013} 4"), &ness), Outcome::Win);
    }

    #[test]
    fn test_non_numeric_and_foreign_results_are_unknown() {
        let ness = TeamMatcher::new("Ness");
        let postponed = classify(&played("Ness", "Back", "P-P"), &ness);
        assert_eq!(postponed, Outcome::Unknown);
        assert_eq!(postponed.symbol(), "");
        assert_eq!(postponed.css_class(), "neutral");

        assert_eq!(classify(&played("Back", "Lochs", "3-1"), &ness), Outcome::Unknown);
        assert_eq!(classify(&played("Ness", "Back", ""), &ness), Outcome::Unknown);
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("3-1"), Some((3, 1)));
        assert_eq!(parse_score("10 \u{2014} 0 (aet)"), Some((10, 0)));
        assert_eq!(parse_score("walkover"), None);
    }
}
