///! Field normalizer
///!
///! Source cells are inconsistent: dates come as ISO or D/M/YYYY (sometimes
///! both, glued together), and the middle fixtures column carries a kick-off
///! time, a score, a placeholder, or a time doubled by the markup. Nothing in
///! here fails; unknown shapes are passed through trimmed.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use nessfix_common::{Fixture, StandingsRow};

use super::parser::normalize_ws;
use super::types::{RawFixture, RawStandingsRow};

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("Invalid ISO date regex"));
static DMY_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").expect("Invalid D/M/Y date regex"));
static ZERO_SECONDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}):(\d{2}):00\b").expect("Invalid seconds regex"));
static DOUBLED_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2}:\d{2})(?::00)?(\d{1,2}:\d{2})\b").expect("Invalid doubled time regex")
});
static TIME_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}$").expect("Invalid time regex"));
static TIME_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}:\d{2}(?::\d{2})?\b").expect("Invalid time token regex"));
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:-|v|vs|vs\.|tbc|tba)$").expect("Invalid placeholder regex"));

/// Extract `YYYY-MM-DD` from a date cell.
///
/// An ISO substring wins over a D/M/YYYY one; otherwise the trimmed text is kept.
pub fn clean_date(raw: &str) -> String {
    if let Some(caps) = ISO_DATE.captures(raw) {
        return caps[1].to_string();
    }
    if let Some(caps) = DMY_DATE.captures(raw) {
        return format!("{}-{:0>2}-{:0>2}", &caps[3], &caps[2], &caps[1]);
    }
    let fallback = normalize_ws(raw);
    if !fallback.is_empty() {
        debug!("Unrecognised date {:?}, keeping it as-is", fallback);
    }
    fallback
}

/// Clean the time-or-score column: `18:30:00` → `18:30`, `18:3018:30` → `18:30`.
pub fn clean_mid(raw: &str) -> String {
    let s = normalize_ws(raw);
    let s = ZERO_SECONDS.replace_all(&s, "$1:$2");
    DOUBLED_TIME
        .replace_all(&s, |caps: &Captures| {
            if caps[1] == caps[2] {
                caps[1].to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// A bare `H:MM` / `HH:MM` kick-off time.
pub fn is_time(s: &str) -> bool {
    TIME_ONLY.is_match(s)
}

/// "-", "v", "vs", "vs.", "TBC", "TBA": no result yet.
pub fn is_placeholder(s: &str) -> bool {
    PLACEHOLDER.is_match(s.trim())
}

/// Tidy an already structured fixture.
///
/// Cleans the date and time, moves a time token embedded in the result into
/// `time` (when none is set) and strips every such token from the result, and
/// blanks placeholder results. Applying it twice changes nothing.
pub fn tidy(fixture: Fixture) -> Fixture {
    let date = clean_date(&fixture.date);
    let mut time = clean_mid(&fixture.time);
    let mut result = normalize_ws(&fixture.result);

    if !time.is_empty() && !is_time(&time) {
        debug!("Time cell {:?} is not a kick-off time, treating it as result text", time);
        if result.is_empty() {
            result = std::mem::take(&mut time);
        } else {
            time.clear();
        }
    }

    let combined = format!("{} {}", result, time);
    if let Some(token) = TIME_TOKEN.find(&combined) {
        if time.is_empty() {
            time = clean_mid(token.as_str());
        }
        result = normalize_ws(&TIME_TOKEN.replace_all(&result, ""));
    }

    if is_placeholder(&result) {
        result.clear();
    }

    Fixture {
        date,
        time,
        home: normalize_ws(&fixture.home),
        away: normalize_ws(&fixture.away),
        result,
        ground: normalize_ws(&fixture.ground),
    }
}

/// Raw fixtures row → canonical fixture.
///
/// The cleaned middle column is a time if and only if it is exactly `H:MM`;
/// anything else is result text.
pub fn normalize(raw: &RawFixture) -> Fixture {
    let mid = clean_mid(&raw.mid);
    let (time, result) = if is_time(&mid) {
        (mid, String::new())
    } else {
        (String::new(), mid)
    };

    tidy(Fixture {
        date: raw.date.clone(),
        time,
        home: raw.home.clone(),
        away: raw.away.clone(),
        result,
        ground: raw.ground.clone(),
    })
}

pub fn standings_row(raw: &RawStandingsRow) -> StandingsRow {
    StandingsRow {
        position: normalize_ws(&raw.position),
        team: normalize_ws(&raw.team),
        played: normalize_ws(&raw.played),
        won: normalize_ws(&raw.won),
        drawn: normalize_ws(&raw.drawn),
        lost: normalize_ws(&raw.lost),
        goals_for: normalize_ws(&raw.goals_for),
        goals_against: normalize_ws(&raw.goals_against),
        goal_difference: normalize_ws(&raw.goal_difference),
        points: normalize_ws(&raw.points),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, mid: &str) -> RawFixture {
        RawFixture {
            date: date.into(),
            home: "Ness".into(),
            mid: mid.into(),
            away: "Example".into(),
            ground: String::new(),
        }
    }

    #[test]
    fn test_clean_date() {
        assert_eq!(clean_date("11/4/2025"), "2025-04-11");
        assert_eq!(clean_date("05/09/2025"), "2025-09-05");
        assert_eq!(clean_date("Sat 6/9/2025"), "2025-09-06");
        assert_eq!(clean_date("2025-08-29 18:30:0029/08/2025"), "2025-08-29");
        assert_eq!(clean_date("  To be  arranged "), "To be arranged");
        assert_eq!(clean_date(""), "");
    }

    #[test]
    fn test_clean_mid() {
        assert_eq!(clean_mid("18:30:00"), "18:30");
        assert_eq!(clean_mid("18:3018:30"), "18:30");
        assert_eq!(clean_mid("18:30:0018:30"), "18:30");
        assert_eq!(clean_mid(" 3 - 1 "), "3 - 1");
        // two different times are left alone
        assert_eq!(clean_mid("18:3019:30"), "18:3019:30");
    }

    #[test]
    fn test_normalize_splits_time_and_result() {
        let f = normalize(&raw("29/08/2025", "18:30:00"));
        assert_eq!(f.date, "2025-08-29");
        assert_eq!(f.time, "18:30");
        assert_eq!(f.result, "");

        let f = normalize(&raw("29/08/2025", "3-1"));
        assert_eq!(f.time, "");
        assert_eq!(f.result, "3-1");
    }

    #[test]
    fn test_placeholders_mean_not_played() {
        for p in ["-", "v", "V", "vs", "VS.", "tbc", "TBA"] {
            let f = normalize(&raw("29/08/2025", p));
            assert_eq!(f.result, "", "placeholder {:?}", p);
            assert!(f.is_upcoming());
        }
        assert!(!is_placeholder("P-P"));
    }

    #[test]
    fn test_embedded_time_moves_out_of_result() {
        let f = tidy(Fixture {
            date: "2025-08-29".into(),
            result: "v 18:30:00".into(),
            ..Default::default()
        });
        assert_eq!(f.time, "18:30");
        assert_eq!(f.result, "");

        let f = tidy(Fixture {
            date: "2025-08-29".into(),
            time: "19:00".into(),
            result: "3-1 18:30".into(),
            ..Default::default()
        });
        assert_eq!(f.time, "19:00");
        assert_eq!(f.result, "3-1");
    }

    #[test]
    fn test_colon_scores_are_not_times() {
        let f = normalize(&raw("29/08/2025", "2:1"));
        assert_eq!(f.time, "");
        assert_eq!(f.result, "2:1");
    }

    #[test]
    fn test_score_in_time_field_is_moved_to_result() {
        let f = tidy(Fixture {
            date: "2025-08-29".into(),
            time: "3-1".into(),
            ..Default::default()
        });
        assert_eq!(f.time, "");
        assert_eq!(f.result, "3-1");
    }

    #[test]
    fn test_tidy_is_idempotent() {
        let once = normalize(&raw("2025-08-29 18:30:0029/08/2025", "18:3018:30"));
        let twice = tidy(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_end_to_end_upcoming_fixture() {
        let f = tidy(Fixture {
            date: "2025-08-29".into(),
            time: "18:30:00".into(),
            home: "Ness".into(),
            away: "Example".into(),
            result: String::new(),
            ground: String::new(),
        });
        assert_eq!(
            f,
            Fixture {
                date: "2025-08-29".into(),
                time: "18:30".into(),
                home: "Ness".into(),
                away: "Example".into(),
                result: String::new(),
                ground: String::new(),
            }
        );
        assert!(f.is_upcoming());
    }
}
