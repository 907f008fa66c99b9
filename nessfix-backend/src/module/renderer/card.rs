///! Fixture card (SVG)
///!
///! Header band, league standings, the next fixtures and an "Updated" footer.
///! Vertical positions flow from the number of standings rows so the fixtures
///! section always starts just under the table.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use nessfix_common::{Fixture, RenderModel, StandingsRow};

use super::{escape_markup, fill_template, weekday_name};
use crate::module::league::TeamMatcher;

const SVG_TEMPLATE: &str = include_str!("../../../resources/card_template.svg");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardLayoutKind {
    /// 800x1000, next 3 fixtures
    #[default]
    Compact,
    /// 1200x1000, next 8 fixtures
    Wide,
}

impl FromStr for CardLayoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(CardLayoutKind::Compact),
            "wide" => Ok(CardLayoutKind::Wide),
            other => Err(format!("Unknown card layout: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardPalette {
    pub background: String,
    pub header: String,
    pub header_text: String,
    pub text: String,
    /// Team of interest
    pub highlight: String,
    pub footer: String,
    pub footer_text: String,
}

impl Default for CardPalette {
    fn default() -> Self {
        Self {
            background: "#f6f1de".to_string(),
            header: "#4f6a2d".to_string(),
            header_text: "#ffffff".to_string(),
            text: "#222222".to_string(),
            highlight: "#2f7d2f".to_string(),
            footer: "#000000".to_string(),
            footer_text: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardStyle {
    pub width: f32,
    pub height: f32,
    pub header_height: f32,
    pub standings_row_height: f32,
    pub fixture_row_height: f32,
    /// Standings title distance below the header band
    pub title_offset: f32,
    /// Section title to its first row
    pub title_gap: f32,
    /// Last standings row to the fixtures title
    pub section_gap: f32,
    pub footer_height: f32,
    /// Half the width of the standings block (team left, points right)
    pub standings_half_width: f32,
    pub max_upcoming: usize,
    pub palette: CardPalette,
    pub heading: String,
}

impl CardStyle {
    pub fn preset(kind: CardLayoutKind) -> Self {
        let compact = Self {
            width: 800.0,
            height: 1000.0,
            header_height: 80.0,
            standings_row_height: 28.0,
            fixture_row_height: 80.0,
            title_offset: 50.0,
            title_gap: 50.0,
            section_gap: 30.0,
            footer_height: 40.0,
            standings_half_width: 120.0,
            max_upcoming: 3,
            palette: CardPalette::default(),
            heading: "FIXTURES & LEAGUE TABLE".to_string(),
        };

        match kind {
            CardLayoutKind::Compact => compact,
            CardLayoutKind::Wide => Self {
                width: 1200.0,
                fixture_row_height: 44.0,
                standings_half_width: 220.0,
                max_upcoming: 8,
                ..compact
            },
        }
    }

    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = heading.into();
        self
    }
}

/// Vertical positions of every card section for a given table length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardGeometry {
    pub heading_y: f32,
    pub standings_title_y: f32,
    pub standings_list_y: f32,
    pub upcoming_title_y: f32,
    pub fixtures_list_y: f32,
    pub footer_y: f32,
    pub footer_text_y: f32,
    standings_row_height: f32,
    fixture_row_height: f32,
}

impl CardGeometry {
    pub fn compute(style: &CardStyle, standings_rows: usize) -> Self {
        let standings_title_y = style.header_height + style.title_offset;
        let standings_list_y = standings_title_y + style.title_gap;
        let upcoming_title_y =
            standings_list_y + standings_rows as f32 * style.standings_row_height + style.section_gap;

        Self {
            heading_y: style.header_height / 2.0 + 10.0,
            standings_title_y,
            standings_list_y,
            upcoming_title_y,
            fixtures_list_y: upcoming_title_y + style.title_gap,
            footer_y: style.height - style.footer_height,
            footer_text_y: style.height - 15.0,
            standings_row_height: style.standings_row_height,
            fixture_row_height: style.fixture_row_height,
        }
    }

    pub fn standings_row_y(&self, index: usize) -> f32 {
        self.standings_list_y + index as f32 * self.standings_row_height
    }

    pub fn fixture_row_y(&self, index: usize) -> f32 {
        self.fixtures_list_y + index as f32 * self.fixture_row_height
    }
}

/// Fixtures shown on the card: the next `max` upcoming ones, or the first
/// `max` overall when fewer than `max` are still to be played.
///
/// Late in the season this shows the opening results rather than the few
/// remaining upcoming fixtures.
pub fn card_fixtures(fixtures: &[Fixture], max: usize) -> Vec<&Fixture> {
    let upcoming: Vec<&Fixture> = fixtures.iter().filter(|f| f.is_upcoming()).take(max).collect();
    if upcoming.len() < max {
        fixtures.iter().take(max).collect()
    } else {
        upcoming
    }
}

/// `Friday 2025-08-29 18:30 – Ness vs Example`
fn fixture_line(fixture: &Fixture) -> String {
    let line = format!(
        "{} {} {} \u{2013} {} vs {}",
        weekday_name(&fixture.date),
        fixture.date,
        fixture.time,
        fixture.home,
        fixture.away
    );
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn standings_svg(rows: &[StandingsRow], geometry: &CardGeometry, style: &CardStyle, team: &TeamMatcher) -> String {
    let center = style.width / 2.0;
    let mut out = String::new();

    for (i, row) in rows.iter().enumerate() {
        let y = geometry.standings_row_y(i);
        let ours = team.matches(&row.team);
        let fill = if ours { &style.palette.highlight } else { &style.palette.text };
        let weight = if ours { "700" } else { "400" };
        let position = if row.position.is_empty() {
            (i + 1).to_string()
        } else {
            row.position.clone()
        };

        let _ = writeln!(
            out,
            r#"  <text x="{x:.0}" y="{y:.0}" font-size="20" font-weight="{weight}" fill="{fill}">{label}</text>"#,
            x = center - style.standings_half_width,
            label = escape_markup(&format!("{}. {}", position, row.team)),
        );
        let _ = writeln!(
            out,
            r#"  <text x="{x:.0}" y="{y:.0}" font-size="20" font-weight="{weight}" fill="{fill}" text-anchor="end">{points}</text>"#,
            x = center + style.standings_half_width,
            points = escape_markup(&format!("{} pts", row.points)),
        );
    }
    out
}

fn fixtures_svg(fixtures: &[&Fixture], geometry: &CardGeometry, style: &CardStyle, team: &TeamMatcher) -> String {
    let mut out = String::new();

    for (i, fixture) in fixtures.iter().enumerate() {
        let at_home = team.is_home(fixture);
        let _ = writeln!(
            out,
            r#"  <text x="{x:.0}" y="{y:.0}" font-size="22" font-weight="{weight}" fill="{fill}" text-anchor="middle">{line}</text>"#,
            x = style.width / 2.0,
            y = geometry.fixture_row_y(i),
            weight = if at_home { "700" } else { "500" },
            fill = if at_home { &style.palette.highlight } else { &style.palette.text },
            line = escape_markup(&fixture_line(fixture)),
        );
    }
    out
}

/// Render the card for an already normalized and sorted model.
pub fn render_card(model: &RenderModel, team: &TeamMatcher, style: &CardStyle) -> String {
    let geometry = CardGeometry::compute(style, model.standings.len());
    let shown = card_fixtures(&model.fixtures, style.max_upcoming);
    let updated = model.updated_at.unwrap_or_else(Utc::now).format("%d %b %Y").to_string();

    let values = HashMap::from([
        ("WIDTH", format!("{:.0}", style.width)),
        ("HEIGHT", format!("{:.0}", style.height)),
        ("CENTER_X", format!("{:.0}", style.width / 2.0)),
        ("BACKGROUND", style.palette.background.clone()),
        ("HEADER_HEIGHT", format!("{:.0}", style.header_height)),
        ("HEADER_FILL", style.palette.header.clone()),
        ("HEADER_TEXT", style.palette.header_text.clone()),
        ("HEADING_Y", format!("{:.0}", geometry.heading_y)),
        ("TEXT", style.palette.text.clone()),
        ("STANDINGS_TITLE_Y", format!("{:.0}", geometry.standings_title_y)),
        ("UPCOMING_TITLE_Y", format!("{:.0}", geometry.upcoming_title_y)),
        ("FOOTER_Y", format!("{:.0}", geometry.footer_y)),
        ("FOOTER_HEIGHT", format!("{:.0}", style.footer_height)),
        ("FOOTER_FILL", style.palette.footer.clone()),
        ("FOOTER_TEXT_Y", format!("{:.0}", geometry.footer_text_y)),
        ("FOOTER_TEXT", style.palette.footer_text.clone()),
        ("UPDATED", escape_markup(&updated)),
        ("HEADING", escape_markup(&style.heading)),
        ("STANDINGS", standings_svg(&model.standings, &geometry, style, team)),
        ("FIXTURES", fixtures_svg(&shown, &geometry, style, team)),
    ]);
    fill_template(SVG_TEMPLATE, &values)
}

/// Small stand-in card carrying an error message.
pub fn error_card(message: &str) -> String {
    format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg width="800" height="200" viewBox="0 0 800 200" xmlns="http://www.w3.org/2000/svg">
  <rect width="800" height="200" fill="#f6f1de"/>
  <text x="400" y="105" font-size="20" fill="#222222" text-anchor="middle" font-family="Arial, Helvetica, sans-serif">Card error: {}</text>
</svg>"##,
        escape_markup(message)
    )
}
