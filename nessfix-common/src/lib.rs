//! Shared data model for the NessFix workspace.
//!
//! Everything the scraper produces and every renderer consumes lives here, so the
//! backend library and the HTTP server agree on one JSON shape.

pub mod types;

pub use types::{Fixture, RenderModel, StandingsRow};
