///! Renderers for the league model: the fixture card (SVG, rasterized to PNG)
///! and the static HTML page.

pub mod card;
pub mod page;

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use regex::{Captures, Regex};
use resvg::tiny_skia;
use resvg::usvg::{fontdb, Options, Tree};

use crate::error::{NessfixError, Result};

pub use card::{error_card, render_card, CardGeometry, CardLayoutKind, CardStyle};
pub use page::render_page;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Z_]+)\}\}").expect("Invalid placeholder regex"));

/// Fill every `{{NAME}}` of a template in one pass.
///
/// Inserted values are never scanned again, so scraped text that looks like a
/// placeholder stays literal. Unknown names are left in place.
pub fn fill_template(template: &str, values: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Escape text for SVG and HTML, attributes included.
pub fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Full weekday name of an ISO date, "-" when the date does not parse.
pub fn weekday_name(date: &str) -> String {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(|d| d.format("%A").to_string())
        .unwrap_or_else(|_| "-".to_string())
}

/// Rasterize an SVG document, scaled to `fit_width` pixels wide (0 keeps the
/// intrinsic size).
///
/// Fonts come from the system plus `fonts_dir` when it exists.
pub fn render_png(svg: &str, fonts_dir: &Path, font_family: &str, fit_width: u32) -> Result<Vec<u8>> {
    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();
    if fonts_dir.is_dir() {
        fontdb.load_fonts_dir(fonts_dir);
    }
    tracing::debug!("Loaded {} font faces", fontdb.len());

    let mut options = Options::default();
    options.font_family = font_family.to_string();
    options.fontdb = Arc::new(fontdb);

    let tree = Tree::from_str(svg, &options)
        .map_err(|e| NessfixError::Render(format!("Failed to parse SVG: {}", e)))?;

    let size = tree.size();
    let scale = if fit_width == 0 {
        1.0
    } else {
        fit_width as f32 / size.width()
    };
    let width = (size.width() * scale).round() as u32;
    let height = (size.height() * scale).round() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| NessfixError::Render(format!("Cannot allocate a {}x{} pixmap", width, height)))?;
    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| NessfixError::Render(format!("Failed to encode PNG: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_is_single_pass() {
        let values = HashMap::from([
            ("NAME", "{{BODY}}".to_string()),
            ("BODY", "<p>body</p>".to_string()),
        ]);
        assert_eq!(
            fill_template("<h1>{{NAME}}</h1>{{BODY}}{{OTHER}}", &values),
            "<h1>{{BODY}}</h1><p>body</p>{{OTHER}}"
        );
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(
            escape_markup(r#"Tom & "Jerry" <b>'s</b>"#),
            "Tom &amp; &quot;Jerry&quot; &lt;b&gt;&#39;s&lt;/b&gt;"
        );
    }

    #[test]
    fn test_weekday_name() {
        assert_eq!(weekday_name("2025-08-29"), "Friday");
        assert_eq!(weekday_name("2025-13-01"), "-");
        assert_eq!(weekday_name("To be arranged"), "-");
    }

    #[test]
    fn test_render_png_scales_to_width() {
        let png = render_png(&error_card("boom"), Path::new("no-such-fonts"), "Arial", 400).unwrap();
        assert_eq!(&png[..4], b"\x89PNG");

        let pixmap = tiny_skia::Pixmap::decode_png(&png).unwrap();
        assert_eq!(pixmap.width(), 400);
        assert_eq!(pixmap.height(), 100);
    }

    #[test]
    fn test_render_png_rejects_garbage() {
        let err = render_png("not svg", Path::new("no-such-fonts"), "Arial", 0).unwrap_err();
        assert!(matches!(err, NessfixError::Render(_)));
    }
}
