use chrono::{TimeZone, Utc};

use nessfix_backend::config::NessfixConfig;
use nessfix_backend::module::league::{LeagueUpdater, StaticPage};
use nessfix_backend::module::renderer::CardLayoutKind;

/// Fixtures table first, standings second, the way the league page loads.
const LEAGUE_PAGE: &str = r#"
<!DOCTYPE html>
<html><body>
  <table class="fixtures">
    <thead><tr><th>Date</th><th>Home Team</th><th>Time / Score</th><th>Away Team</th><th>Ground</th></tr></thead>
    <tbody>
      <tr><td>2025-08-29 18:30:0029/08/2025</td><td>Ness</td><td>18:30:0018:30</td><td>Example</td><td>Fivepenny</td></tr>
      <tr><td>15/8/2025</td><td>Carloway</td><td>1 &ndash; 4</td><td>NESS</td><td>Cnoc a' Choilich</td></tr>
      <tr><td>22/08/2025</td><td>Back</td><td>TBC</td><td>Lochs</td><td></td></tr>
      <tr><td>05/09/2025</td><td>Back &amp; District</td><td>v</td><td>Ness</td><td></td></tr>
    </tbody>
  </table>
  <table class="league">
    <thead><tr><th>Pos</th><th>Club</th><th>P</th><th>W</th><th>D</th><th>L</th><th>F</th><th>A</th><th>GD</th><th>Pts</th></tr></thead>
    <tbody>
      <tr><td>1</td><td>Ness</td><td>9</td><td>7</td><td>0</td><td>2</td><td>30</td><td>12</td><td>18</td><td>21</td></tr>
      <tr><td>2</td><td>Back &amp; District</td><td>9</td><td>6</td><td>0</td><td>3</td><td>22</td><td>15</td><td>7</td><td>18</td></tr>
    </tbody>
  </table>
</body></html>
"#;

#[tokio::test]
async fn test_league_page_to_artifacts() {
    let dir = std::env::temp_dir().join(format!("nessfix-pipeline-{}", std::process::id()));
    let mut config = NessfixConfig::default();
    config.output.dir = dir.join("public").display().to_string();
    config.output.snapshot = dir.join("data").join("latest.json").display().to_string();
    config.output.png_width = 300;
    let updater = LeagueUpdater::new(&config);

    let model = updater.scrape(&StaticPage::new(LEAGUE_PAGE)).await.unwrap();
    assert_eq!(model.standings.len(), 2);
    assert!(model.standings.iter().all(|r| r.has_full_record()));

    let summary: Vec<_> = model
        .fixtures
        .iter()
        .map(|f| (f.date.as_str(), f.time.as_str(), f.result.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("2025-08-15", "", "1 \u{2013} 4"),
            ("2025-08-29", "18:30", ""),
            ("2025-09-05", "", ""),
        ]
    );

    updater.save_snapshot(config.output.snapshot_path(), &model).await.unwrap();
    let reloaded = updater.load_snapshot(config.output.snapshot_path()).await.unwrap();
    assert_eq!(reloaded, model);

    let artifacts = updater.build_artifacts(&reloaded, CardLayoutKind::Compact).await.unwrap();
    let page = std::fs::read_to_string(&artifacts.page).unwrap();
    assert!(page.contains("<th>GD</th>"));
    assert!(page.contains("Upcoming Ness Fixtures (2)"));
    assert!(page.contains("Past Ness Results (1)"));
    assert!(page.contains(r#"<span class="badge win">W</span>"#));
    assert!(page.contains("Back &amp; District"));

    let svg = std::fs::read_to_string(&artifacts.svg).unwrap();
    assert!(svg.contains("Friday 2025-08-29 18:30 \u{2013} Ness vs Example"));
    assert!(artifacts.png.is_some());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_upcoming_home_fixture_is_emphasized_everywhere() {
    let json = r#"{
        "standings": [{"pos": "1", "team": "Ness", "points": "21"}],
        "fixtures": [{"date": "2025-08-29", "time": "18:30:00", "home": "Ness", "away": "Example", "result": ""}]
    }"#;
    let mut model = nessfix_common::RenderModel::from_json(json).unwrap();
    model.fixtures = model
        .fixtures
        .into_iter()
        .map(nessfix_backend::module::league::normalize::tidy)
        .collect();
    model.updated_at = Some(Utc.with_ymd_and_hms(2025, 8, 20, 9, 0, 0).unwrap());

    assert_eq!(model.fixtures[0].time, "18:30");
    assert!(model.fixtures[0].is_upcoming());

    let updater = LeagueUpdater::new(&NessfixConfig::default());
    let page = updater.page_html(&model);
    assert!(page.contains("Upcoming Ness Fixtures (1)"));
    assert!(page.contains("<td>18:30</td><td>Example</td>"));

    let svg = updater.card_svg(&model, CardLayoutKind::Compact);
    assert!(svg.contains(
        r##"font-weight="700" fill="#2f7d2f" text-anchor="middle">Friday 2025-08-29 18:30 – Ness vs Example</text>"##
    ));
    assert!(svg.contains("NESS FC FIXTURES &amp; LEAGUE TABLE"));
    assert!(svg.contains("Updated 20 Aug 2025"));
}

#[test]
fn test_markup_is_escaped_in_page_and_card() {
    let json = r#"{
        "standings": [{"pos": "1", "team": "<b>Ness & Co</b>", "points": "1"}],
        "fixtures": [{"date": "2025-08-29", "time": "18:30", "home": "Ness", "away": "\"O'Neill\" <XI>", "result": ""}]
    }"#;
    let model = nessfix_common::RenderModel::from_json(json).unwrap();
    let updater = LeagueUpdater::new(&NessfixConfig::default());

    let page = updater.page_html(&model);
    assert!(page.contains("&lt;b&gt;Ness &amp; Co&lt;/b&gt;"));
    assert!(page.contains("&quot;O&#39;Neill&quot; &lt;XI&gt;"));

    let svg = updater.card_svg(&model, CardLayoutKind::Wide);
    assert!(svg.contains("1. &lt;b&gt;Ness &amp; Co&lt;/b&gt;"));
    assert!(svg.contains("&quot;O&#39;Neill&quot; &lt;XI&gt;"));
    assert!(!svg.contains("<XI>"));
}
