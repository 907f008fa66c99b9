///! Static HTML page: standings, upcoming fixtures and past results

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::Local;

use nessfix_common::{Fixture, RenderModel, StandingsRow};

use super::{escape_markup, fill_template, weekday_name};
use crate::config::PageConfig;
use crate::module::league::fixtures::partition;
use crate::module::league::{classify, Outcome, TeamMatcher};

const PAGE_TEMPLATE: &str = include_str!("../../../resources/page_template.html");

fn or_dash(s: &str) -> String {
    if s.trim().is_empty() {
        "-".to_string()
    } else {
        escape_markup(s)
    }
}

/// Full table only when every row carries every column; otherwise all rows
/// fall back to position, team and points.
fn standings_html(rows: &[StandingsRow], team: &TeamMatcher) -> String {
    let full = !rows.is_empty() && rows.iter().all(StandingsRow::has_full_record);
    let mut out = String::new();

    if full {
        out.push_str(
            "        <tr><th>Pos</th><th>Club</th><th>P</th><th>W</th><th>D</th><th>L</th><th>F</th><th>A</th><th>GD</th><th>Pts</th></tr>\n",
        );
    } else {
        out.push_str("        <tr><th>Pos</th><th>Team</th><th>Points</th></tr>\n");
    }

    for row in rows {
        let class = if team.matches(&row.team) { " class=\"highlight\"" } else { "" };
        let cells: Vec<&str> = if full {
            vec![
                row.position.as_str(),
                row.team.as_str(),
                row.played.as_str(),
                row.won.as_str(),
                row.drawn.as_str(),
                row.lost.as_str(),
                row.goals_for.as_str(),
                row.goals_against.as_str(),
                row.goal_difference.as_str(),
                row.points.as_str(),
            ]
        } else {
            vec![row.position.as_str(), row.team.as_str(), row.points.as_str()]
        };

        let _ = write!(out, "        <tr{}>", class);
        for cell in cells {
            let _ = write!(out, "<td>{}</td>", escape_markup(cell));
        }
        out.push_str("</tr>\n");
    }
    out
}

fn venue(fixture: &Fixture, team: &TeamMatcher, home_label: &str) -> String {
    if team.is_home(fixture) {
        escape_markup(home_label)
    } else if !fixture.ground.trim().is_empty() {
        escape_markup(&fixture.ground)
    } else {
        format!("AWAY at {}", or_dash(&fixture.home))
    }
}

fn fixture_row(fixture: &Fixture, team: &TeamMatcher, home_label: &str) -> String {
    let at_home = team.is_home(fixture);
    let opponent = team.opponent(fixture).unwrap_or_default();

    let (row_class, status, result) = if fixture.is_played() {
        let outcome = classify(fixture, team);
        let status = match outcome {
            Outcome::Unknown => "-".to_string(),
            known => format!(r#"<span class="badge {}">{}</span>"#, known.css_class(), known.symbol()),
        };
        (format!(" class=\"{}\"", outcome.css_class()), status, or_dash(&fixture.result))
    } else {
        (String::new(), or_dash(&fixture.time), "-".to_string())
    };

    format!(
        "        <tr{row_class}><td>{date}</td><td>{weekday}</td><td>{status}</td><td>{opponent}</td><td{venue_class}>{venue}</td><td>{result}</td></tr>\n",
        date = or_dash(&fixture.date),
        weekday = weekday_name(&fixture.date),
        opponent = or_dash(opponent),
        venue_class = if at_home { " class=\"home\"" } else { "" },
        venue = venue(fixture, team, home_label),
    )
}

fn fixture_rows(fixtures: &[&Fixture], team: &TeamMatcher, home_label: &str, empty: &str) -> String {
    if fixtures.is_empty() {
        return format!("        <tr><td colspan=\"6\">{}</td></tr>\n", escape_markup(empty));
    }
    fixtures.iter().map(|f| fixture_row(f, team, home_label)).collect()
}

fn card_html(page: &PageConfig, team: &TeamMatcher) -> String {
    if page.card_image.trim().is_empty() {
        return String::new();
    }
    let src = escape_markup(&page.card_image);
    format!(
        r#"  <div class="card">
    <h2>Fixture Card</h2>
    <p><a href="{src}" download>Download Fixture Card (PNG)</a></p>
    <img src="{src}" alt="{alt}" />
  </div>
"#,
        alt = escape_markup(&format!("{} fixture card", team.name())),
    )
}

/// Render the page for an already normalized and sorted model.
pub fn render_page(model: &RenderModel, team: &TeamMatcher, page: &PageConfig) -> String {
    let (upcoming, past) = partition(&model.fixtures);
    let built_at = Local::now().format("%d/%m/%Y, %H:%M:%S").to_string();
    let team_name = escape_markup(team.name());

    let upcoming_rows = fixture_rows(
        &upcoming,
        team,
        &page.home_label,
        &format!("No upcoming {} fixtures found.", team.name()),
    );
    let past_rows = fixture_rows(&past, team, &page.home_label, "No past results parsed.");

    let values = HashMap::from([
        ("TITLE", escape_markup(&page.title)),
        ("UPCOMING_COUNT", upcoming.len().to_string()),
        ("PAST_COUNT", past.len().to_string()),
        ("SOURCE", escape_markup(&page.source_name)),
        ("BUILT_AT", built_at),
        ("TEAM", team_name),
        ("CARD", card_html(page, team)),
        ("STANDINGS", standings_html(&model.standings, team)),
        ("UPCOMING_ROWS", upcoming_rows),
        ("PAST_ROWS", past_rows),
    ]);
    fill_template(PAGE_TEMPLATE, &values)
}
