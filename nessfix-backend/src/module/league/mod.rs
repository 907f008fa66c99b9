///! League page module
///!
///! Pulls the standings and fixtures tables out of the league page,
///! normalizes them for the team of interest, and drives the renderers.

pub mod types;
pub mod parser;
pub mod normalize;
pub mod fixtures;
pub mod outcome;
pub mod fetcher;
pub mod updater;

pub use fetcher::{page_source, BrowserFetcher, HttpFetcher, PageSource, StaticPage};
pub use fixtures::{partition, select, sort_chronologically, TeamMatcher};
pub use outcome::{classify, Outcome};
pub use types::{RawFixture, RawStandingsRow, RawTables};
pub use updater::{Artifacts, LeagueUpdater};
