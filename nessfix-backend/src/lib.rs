///! NessFix backend: league page scraping, normalization and rendering

pub mod config;
pub mod error;
pub mod logging;
pub mod module;

pub use error::{NessfixError, Result};
