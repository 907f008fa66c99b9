use nessfix_common::Fixture;

/// The team whose fixtures are kept and emphasized.
///
/// Matching is case-insensitive on the whole trimmed name, so "Ness" does not
/// match "Ness Reserves".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMatcher {
    name: String,
    key: String,
}

impl TeamMatcher {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into().trim().to_string();
        let key = name.to_lowercase();
        Self { name, key }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, team: &str) -> bool {
        team.trim().to_lowercase() == self.key
    }

    pub fn is_home(&self, fixture: &Fixture) -> bool {
        self.matches(&fixture.home)
    }

    pub fn is_away(&self, fixture: &Fixture) -> bool {
        self.matches(&fixture.away)
    }

    pub fn plays_in(&self, fixture: &Fixture) -> bool {
        self.is_home(fixture) || self.is_away(fixture)
    }

    /// The other side, or `None` when the team is not playing.
    pub fn opponent<'a>(&self, fixture: &'a Fixture) -> Option<&'a str> {
        if self.is_home(fixture) {
            Some(&fixture.away)
        } else if self.is_away(fixture) {
            Some(&fixture.home)
        } else {
            None
        }
    }
}

/// Stable ascending sort on `date + time` (plain string comparison).
pub fn sort_chronologically(fixtures: &mut [Fixture]) {
    fixtures.sort_by_cached_key(|f| f.sort_key());
}

/// Keep the team's fixtures, sorted chronologically.
pub fn select(fixtures: impl IntoIterator<Item = Fixture>, team: &TeamMatcher) -> Vec<Fixture> {
    let mut kept: Vec<Fixture> = fixtures.into_iter().filter(|f| team.plays_in(f)).collect();
    sort_chronologically(&mut kept);
    kept
}

/// Split into (upcoming, past), order preserved.
pub fn partition(fixtures: &[Fixture]) -> (Vec<&Fixture>, Vec<&Fixture>) {
    fixtures.iter().partition(|f| f.is_upcoming())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(date: &str, time: &str, home: &str, away: &str, result: &str) -> Fixture {
        Fixture {
            date: date.into(),
            time: time.into(),
            home: home.into(),
            away: away.into(),
            result: result.into(),
            ground: String::new(),
        }
    }

    #[test]
    fn test_team_matching_is_whole_name() {
        let ness = TeamMatcher::new(" Ness ");
        assert!(ness.matches("NESS"));
        assert!(ness.matches(" ness"));
        assert!(!ness.matches("Ness Reserves"));
        assert!(!ness.matches("Carloway"));
        assert_eq!(ness.name(), "Ness");
    }

    #[test]
    fn test_select_filters_and_sorts() {
        let all = vec![
            fixture("2025-09-01", "", "Ness", "Back", ""),
            fixture("2025-08-15", "18:00", "Lochs", "ness", ""),
            fixture("2025-08-10", "19:00", "Back", "Lochs", ""),
            fixture("2025-08-15", "09:00", "Ness", "Westside", ""),
        ];
        let kept = select(all, &TeamMatcher::new("Ness"));
        let keys: Vec<_> = kept.iter().map(|f| (f.date.as_str(), f.time.as_str())).collect();
        assert_eq!(
            keys,
            vec![("2025-08-15", "09:00"), ("2025-08-15", "18:00"), ("2025-09-01", "")]
        );
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut fixtures = vec![
            fixture("2025-08-15", "18:00", "Ness", "First", ""),
            fixture("2025-08-01", "18:00", "Ness", "Earlier", ""),
            fixture("2025-08-15", "18:00", "Ness", "Second", ""),
        ];
        sort_chronologically(&mut fixtures);
        let order: Vec<_> = fixtures.iter().map(|f| f.away.as_str()).collect();
        assert_eq!(order, vec!["Earlier", "First", "Second"]);
    }

    #[test]
    fn test_partition_and_opponent() {
        let fixtures = vec![
            fixture("2025-08-01", "", "Ness", "Back", "3-1"),
            fixture("2025-08-15", "18:00", "Lochs", "Ness", ""),
        ];
        let (upcoming, past) = partition(&fixtures);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(past.len(), 1);

        let ness = TeamMatcher::new("Ness");
        assert_eq!(ness.opponent(upcoming[0]), Some("Lochs"));
        assert_eq!(ness.opponent(past[0]), Some("Back"));
        assert_eq!(ness.opponent(&fixture("", "", "Back", "Lochs", "")), None);
    }
}
