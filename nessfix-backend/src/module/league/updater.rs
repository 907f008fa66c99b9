///! League updater
///!
///! Fetch → extract → normalize → select, plus the JSON snapshot and the
///! static artifacts (HTML page, SVG card, PNG card) built from it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{info, warn};

use nessfix_common::RenderModel;

use super::fetcher::PageSource;
use super::fixtures::{select, sort_chronologically, TeamMatcher};
use super::normalize::{normalize, standings_row, tidy};
use super::parser::parse_league_html;
use crate::config::NessfixConfig;
use crate::error::{NessfixError, Result};
use crate::module::renderer::{render_card, render_page, render_png, CardLayoutKind};

pub const PAGE_FILE: &str = "index.html";
pub const SVG_FILE: &str = "nessfix.svg";
pub const PNG_FILE: &str = "nessfix.png";

/// Paths written by one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub page: PathBuf,
    pub svg: PathBuf,
    /// `None` when rasterizing failed
    pub png: Option<PathBuf>,
}

/// Owns the configuration and the team of interest for one pipeline.
#[derive(Debug, Clone)]
pub struct LeagueUpdater {
    config: NessfixConfig,
    team: TeamMatcher,
}

impl LeagueUpdater {
    pub fn new(config: &NessfixConfig) -> Self {
        Self {
            config: config.clone(),
            team: TeamMatcher::new(config.source.team.clone()),
        }
    }

    pub fn team(&self) -> &TeamMatcher {
        &self.team
    }

    pub fn config(&self) -> &NessfixConfig {
        &self.config
    }

    /// Fetch the league page and turn it into the team's model.
    ///
    /// The whole fetch is bounded by `fetch_timeout_secs`, whatever the source.
    pub async fn scrape(&self, source: &dyn PageSource) -> Result<RenderModel> {
        info!("Scraping league page from {}", source.url());
        let budget = self.config.source.fetch_timeout();
        let html = match tokio::time::timeout(budget, source.fetch_html()).await {
            Ok(fetched) => fetched?,
            Err(_) => {
                return Err(NessfixError::FetchTimeout {
                    url: source.url().to_string(),
                    waited: budget,
                });
            }
        };
        Ok(self.model_from_html(&html, Utc::now()))
    }

    /// Extract, normalize and select from already loaded markup.
    pub fn model_from_html(&self, html: &str, updated_at: DateTime<Utc>) -> RenderModel {
        let tables = parse_league_html(html);

        let standings: Vec<_> = tables
            .standings
            .iter()
            .map(standings_row)
            .filter(|row| !row.team.is_empty())
            .collect();
        let total_fixtures = tables.fixtures.len();
        let fixtures = select(tables.fixtures.iter().map(normalize), &self.team);

        info!(
            "Parsed {} standings rows and {} fixtures ({} involving {})",
            standings.len(),
            total_fixtures,
            fixtures.len(),
            self.team.name()
        );

        RenderModel::new(standings, fixtures, updated_at)
    }

    /// Read a snapshot and re-apply fixture tidying and the chronological sort.
    pub async fn load_snapshot(&self, path: impl AsRef<Path>) -> Result<RenderModel> {
        let path = path.as_ref();
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Err(NessfixError::MissingSnapshot(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await?;
        let mut model = RenderModel::from_json(&content)?;

        model.standings.retain(|row| !row.team.trim().is_empty());
        model.fixtures = model.fixtures.into_iter().map(tidy).collect();
        sort_chronologically(&mut model.fixtures);

        info!(
            "Loaded snapshot {:?}: {} standings rows, {} fixtures",
            path,
            model.standings.len(),
            model.fixtures.len()
        );
        Ok(model)
    }

    pub async fn save_snapshot(&self, path: impl AsRef<Path>, model: &RenderModel) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, model.to_json_pretty()?).await?;
        info!("Saved snapshot to {:?}", path);
        Ok(())
    }

    pub fn card_svg(&self, model: &RenderModel, layout: CardLayoutKind) -> String {
        render_card(model, &self.team, &self.config.card_style(layout))
    }

    /// Card rasterized on the blocking pool.
    pub async fn card_png(&self, model: &RenderModel, layout: CardLayoutKind) -> Result<Vec<u8>> {
        let svg = self.card_svg(model, layout);
        let fonts_dir = PathBuf::from(&self.config.output.fonts_dir);
        let font_family = self.config.output.font_family.clone();
        let width = self.config.output.png_width;

        tokio::task::spawn_blocking(move || render_png(&svg, &fonts_dir, &font_family, width))
            .await
            .map_err(|e| NessfixError::Render(format!("Rasterizer task aborted: {}", e)))?
    }

    pub fn page_html(&self, model: &RenderModel) -> String {
        render_page(model, &self.team, &self.config.page)
    }

    /// Write the page, the SVG card and the PNG card into the output directory.
    ///
    /// A PNG failure is logged and leaves the other two artifacts in place.
    pub async fn build_artifacts(&self, model: &RenderModel, layout: CardLayoutKind) -> Result<Artifacts> {
        let dir = self.config.output.dir();
        fs::create_dir_all(&dir).await?;

        let page = dir.join(PAGE_FILE);
        fs::write(&page, self.page_html(model)).await?;

        let svg = dir.join(SVG_FILE);
        fs::write(&svg, self.card_svg(model, layout)).await?;

        let png = match self.card_png(model, layout).await {
            Ok(bytes) => {
                let path = dir.join(PNG_FILE);
                fs::write(&path, &bytes).await?;
                info!("Rendered PNG card ({} bytes)", bytes.len());
                Some(path)
            }
            Err(e) => {
                warn!("PNG card not written: {}", e);
                None
            }
        };

        info!("Built artifacts in {:?}", dir);
        Ok(Artifacts { page, svg, png })
    }

    /// Scrape, save the snapshot, rebuild the artifacts.
    pub async fn refresh(&self, source: &dyn PageSource, layout: CardLayoutKind) -> Result<Artifacts> {
        let model = self.scrape(source).await?;
        self.save_snapshot(self.config.output.snapshot_path(), &model).await?;
        self.build_artifacts(&model, layout).await
    }
}
