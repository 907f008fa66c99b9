use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::module::renderer::card::{CardLayoutKind, CardStyle};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// League page, team of interest and the fetch budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_url")]
    pub url: String,

    /// Team of interest, matched case-insensitively against whole team names
    #[serde(default = "default_team")]
    pub team: String,

    /// "browser" (headless Chromium) or "http" (plain GET, no JavaScript)
    #[serde(default = "default_fetcher")]
    pub fetcher: String,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Rows the fixtures table must reach before the page counts as loaded
    #[serde(default = "default_min_fixture_rows")]
    pub min_fixture_rows: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

/// Where artifacts, the snapshot and fonts live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,

    #[serde(default = "default_snapshot_path")]
    pub snapshot: String,

    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: String,

    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Width the PNG card is scaled to
    #[serde(default = "default_png_width")]
    pub png_width: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardConfig {
    #[serde(default)]
    pub layout: CardLayoutKind,

    /// Banner text; defaults to "<TEAM> FC FIXTURES & LEAGUE TABLE"
    #[serde(default)]
    pub heading: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_page_title")]
    pub title: String,

    /// Venue text shown when the team of interest plays at home
    #[serde(default = "default_home_label")]
    pub home_label: String,

    /// Card image embedded at the top of the page; empty hides the card
    #[serde(default = "default_card_image")]
    pub card_image: String,

    #[serde(default = "default_source_name")]
    pub source_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Periodic scrape + rebuild of the static artifacts; 0 disables it
    #[serde(default)]
    pub rebuild_interval_minutes: u64,

    /// Answer the API from the snapshot file instead of scraping per request
    #[serde(default)]
    pub use_snapshot: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NessfixConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub card: CardConfig,

    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_source_url() -> String {
    "https://www.lhfa.org.uk/league/".to_string()
}

fn default_team() -> String {
    "Ness".to_string()
}

fn default_fetcher() -> String {
    "browser".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    60
}

fn default_min_fixture_rows() -> usize {
    5
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36"
        .to_string()
}

fn default_accept_language() -> String {
    "en-GB,en;q=0.9".to_string()
}

fn default_output_dir() -> String {
    "public".to_string()
}

fn default_snapshot_path() -> String {
    "data/latest.json".to_string()
}

fn default_fonts_dir() -> String {
    "fonts".to_string()
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_png_width() -> u32 {
    1200
}

fn default_page_title() -> String {
    "NessFix – League Table & Fixtures".to_string()
}

fn default_home_label() -> String {
    "HOME (Fivepenny)".to_string()
}

fn default_card_image() -> String {
    "nessfix.png".to_string()
}

fn default_source_name() -> String {
    "LHFA".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3030
}

fn default_enable_cors() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            team: default_team(),
            fetcher: default_fetcher(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            min_fixture_rows: default_min_fixture_rows(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            snapshot: default_snapshot_path(),
            fonts_dir: default_fonts_dir(),
            font_family: default_font_family(),
            png_width: default_png_width(),
        }
    }
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            layout: CardLayoutKind::default(),
            heading: None,
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_page_title(),
            home_label: default_home_label(),
            card_image: default_card_image(),
            source_name: default_source_name(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: default_enable_cors(),
            rebuild_interval_minutes: 0,
            use_snapshot: false,
        }
    }
}

impl Default for NessfixConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            card: CardConfig::default(),
            page: PageConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SourceConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl OutputConfig {
    pub fn dir(&self) -> PathBuf {
        PathBuf::from(&self.dir)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        PathBuf::from(&self.snapshot)
    }
}

impl NessfixConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: NessfixConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Card style for the configured layout, with the banner text filled in.
    pub fn card_style(&self, layout: CardLayoutKind) -> CardStyle {
        let heading = self
            .card
            .heading
            .clone()
            .unwrap_or_else(|| format!("{} FC FIXTURES & LEAGUE TABLE", self.source.team.to_uppercase()));
        CardStyle::preset(layout).with_heading(heading)
    }
}

pub static CONFIG: OnceLock<NessfixConfig> = OnceLock::new();

/// Load the configuration once for the process.
///
/// A missing file is not an error: the defaults target the LHFA league page.
/// Runs before logging is set up, so report it with [`missing_config_notice`]
/// once a subscriber is installed.
pub fn read_config(path: impl AsRef<Path>) -> anyhow::Result<&'static NessfixConfig> {
    let path = path.as_ref();
    let config = if path.exists() {
        NessfixConfig::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file {:?}: {}", path, e))?
    } else {
        NessfixConfig::default()
    };

    Ok(CONFIG.get_or_init(|| config))
}

/// Warning text when `path` does not exist and the defaults are in use.
pub fn missing_config_notice(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    (!path.exists()).then(|| format!("Config file {:?} not found, using defaults", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = NessfixConfig::from_toml_str("").unwrap();
        assert_eq!(config.source.team, "Ness");
        assert_eq!(config.source.fetch_timeout(), Duration::from_secs(60));
        assert_eq!(config.source.min_fixture_rows, 5);
        assert_eq!(config.output.png_width, 1200);
        assert_eq!(config.card.layout, CardLayoutKind::Compact);
        assert_eq!(config.server_address(), "0.0.0.0:3030");
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = NessfixConfig::from_toml_str(
            r#"
            log_level = "debug"

            [source]
            team = "Back"
            fetch_timeout_secs = 15

            [card]
            layout = "wide"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.source.team, "Back");
        assert_eq!(config.source.url, "https://www.lhfa.org.uk/league/");
        assert_eq!(config.source.fetch_timeout_secs, 15);
        assert_eq!(config.card.layout, CardLayoutKind::Wide);
        assert_eq!(config.output.dir, "public");
    }

    #[test]
    fn test_sample_config_matches_defaults() {
        let sample = NessfixConfig::from_toml_str(include_str!("../../config.toml")).unwrap();
        let defaults = NessfixConfig::default();
        assert_eq!(sample.source.url, defaults.source.url);
        assert_eq!(sample.page.title, defaults.page.title);
        assert_eq!(sample.server.port, defaults.server.port);
        assert!(!sample.server.use_snapshot);
    }

    #[test]
    fn test_missing_config_notice() {
        let sample = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");
        assert_eq!(missing_config_notice(sample), None);

        let missing = std::env::temp_dir().join(format!("nessfix-no-config-{}.toml", std::process::id()));
        let notice = missing_config_notice(&missing).unwrap();
        assert!(notice.ends_with("not found, using defaults"));

        let config = read_config(&missing).unwrap();
        assert_eq!(config.source.team, "Ness");
    }

    #[test]
    fn test_card_heading_follows_team() {
        let mut config = NessfixConfig::default();
        config.source.team = "Back".to_string();
        let style = config.card_style(CardLayoutKind::Compact);
        assert_eq!(style.heading, "BACK FC FIXTURES & LEAGUE TABLE");

        config.card.heading = Some("Custom".to_string());
        assert_eq!(config.card_style(CardLayoutKind::Wide).heading, "Custom");
    }
}
