///! League page table extractor
///!
///! Finds the standings and fixtures tables by their header cells rather than
///! their position on the page, then lifts every body row into raw records.

use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::types::{RawFixture, RawStandingsRow, RawTables};
use crate::error::{NessfixError, Result, TableKind};

static SELECTOR_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("Invalid table selector"));
static SELECTOR_THEAD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("thead").expect("Invalid thead selector"));
static SELECTOR_TBODY_TR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody tr").expect("Invalid tbody tr selector"));
static SELECTOR_TR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("Invalid tr selector"));
static SELECTOR_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th, td").expect("Invalid cell selector"));
static SELECTOR_TH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("Invalid th selector"));
static SELECTOR_TD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("Invalid td selector"));

/// Canonical meaning of a table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Position,
    Team,
    Played,
    Won,
    Drawn,
    Lost,
    For,
    Against,
    GoalDifference,
    Points,
    Date,
    Home,
    Mid,
    Away,
    Ground,
}

type ColumnMap = HashMap<Column, usize>;

/// Collapse runs of whitespace and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Header token: lower-case letters only, so "Pts." and " PTS " agree.
fn header_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

fn standings_column(key: &str) -> Option<Column> {
    match key {
        "pos" | "position" => Some(Column::Position),
        "club" | "team" => Some(Column::Team),
        "p" | "pld" | "played" => Some(Column::Played),
        "w" | "won" => Some(Column::Won),
        "d" | "drawn" => Some(Column::Drawn),
        "l" | "lost" => Some(Column::Lost),
        "f" | "gf" | "for" => Some(Column::For),
        "a" | "ga" | "against" => Some(Column::Against),
        "gd" => Some(Column::GoalDifference),
        "pts" | "points" => Some(Column::Points),
        _ => None,
    }
}

fn fixtures_column(key: &str) -> Option<Column> {
    if key.contains("date") {
        Some(Column::Date)
    } else if key.contains("home") {
        Some(Column::Home)
    } else if key.contains("away") {
        Some(Column::Away)
    } else if key.contains("score") || key.contains("time") {
        Some(Column::Mid)
    } else if matches!(key, "ground" | "venue" | "pitch" | "location") {
        Some(Column::Ground)
    } else {
        None
    }
}

/// First header cell wins when two map to the same column.
fn map_columns(keys: &[String], lookup: fn(&str) -> Option<Column>) -> ColumnMap {
    let mut map = ColumnMap::new();
    for (i, key) in keys.iter().enumerate() {
        if let Some(column) = lookup(key) {
            map.entry(column).or_insert(i);
        }
    }
    map
}

fn cell_text(cell: ElementRef) -> String {
    normalize_ws(&cell.text().collect::<String>())
}

fn row_keys(tr: ElementRef) -> Vec<String> {
    tr.select(&SELECTOR_CELL).map(|c| header_key(&cell_text(c))).collect()
}

/// A table's header row(s) and their normalized keys.
///
/// The header is the `thead` when present, else the first row if it holds `th`
/// cells or names a known column. Tables without either have no header.
struct Header<'a> {
    rows: Vec<ElementRef<'a>>,
    keys: Vec<String>,
}

impl<'a> Header<'a> {
    fn of(table: ElementRef<'a>) -> Self {
        let rows: Vec<ElementRef<'a>> = match table.select(&SELECTOR_THEAD).next() {
            Some(thead) => thead.select(&SELECTOR_TR).collect(),
            None => table
                .select(&SELECTOR_TR)
                .take(1)
                .filter(|tr| {
                    tr.select(&SELECTOR_TH).next().is_some()
                        || row_keys(*tr)
                            .iter()
                            .any(|k| standings_column(k).is_some() || fixtures_column(k).is_some())
                })
                .collect(),
        };
        let keys = rows.first().map(|tr| row_keys(*tr)).unwrap_or_default();
        Self { rows, keys }
    }

    fn is_fixtures(&self) -> bool {
        let has = |needle: &str| self.keys.iter().any(|k| k.contains(needle));
        has("date") && has("home") && has("away") && (has("score") || has("time"))
    }
}

/// Body rows of a table as cell texts, header rows excluded.
fn body_rows(table: ElementRef, header: &Header) -> Vec<Vec<String>> {
    table
        .select(&SELECTOR_TR)
        .filter(|tr| !header.rows.contains(tr))
        .map(|tr| tr.select(&SELECTOR_TD).map(cell_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect()
}

fn row_count(table: ElementRef) -> usize {
    match table.select(&SELECTOR_TBODY_TR).count() {
        0 => table.select(&SELECTOR_TR).count(),
        n => n,
    }
}

fn locate_fixtures_table(document: &Html) -> Result<ElementRef<'_>> {
    document
        .select(&SELECTOR_TABLE)
        .find(|t| Header::of(*t).is_fixtures())
        .ok_or(NessfixError::MissingTable(TableKind::Fixtures))
}

/// Header-mapped match first; otherwise the first table that is not the
/// fixtures table.
fn locate_standings_table<'a>(document: &'a Html, fixtures: Option<ElementRef<'a>>) -> Result<ElementRef<'a>> {
    let candidates: Vec<ElementRef<'a>> = document
        .select(&SELECTOR_TABLE)
        .filter(|t| Some(*t) != fixtures)
        .collect();

    let mapped = candidates.iter().copied().find(|t| {
        let map = map_columns(&Header::of(*t).keys, standings_column);
        map.contains_key(&Column::Team) && map.contains_key(&Column::Points)
    });

    match mapped {
        Some(table) => Ok(table),
        None => {
            let first = candidates
                .first()
                .copied()
                .ok_or(NessfixError::MissingTable(TableKind::Standings))?;
            debug!("No standings header matched, using first non-fixtures table");
            Ok(first)
        }
    }
}

fn standings_rows(table: ElementRef) -> Vec<RawStandingsRow> {
    let header = Header::of(table);
    let map = map_columns(&header.keys, standings_column);
    let mapped = map.contains_key(&Column::Team) && map.contains_key(&Column::Points);
    if !mapped {
        debug!("Standings columns resolved positionally (team = 2nd cell, points = last)");
    }

    let mut rows = Vec::new();
    for cells in body_rows(table, &header) {
        if cells.len() < 3 {
            continue;
        }
        let get = |column: Column| -> String {
            map.get(&column)
                .and_then(|&i| cells.get(i))
                .cloned()
                .unwrap_or_default()
        };

        let row = if mapped {
            let position = match map.get(&Column::Position) {
                Some(_) => get(Column::Position),
                None if map.get(&Column::Team) != Some(&0) => cells[0].clone(),
                None => String::new(),
            };
            RawStandingsRow {
                position,
                team: get(Column::Team),
                played: get(Column::Played),
                won: get(Column::Won),
                drawn: get(Column::Drawn),
                lost: get(Column::Lost),
                goals_for: get(Column::For),
                goals_against: get(Column::Against),
                goal_difference: get(Column::GoalDifference),
                points: get(Column::Points),
            }
        } else {
            RawStandingsRow {
                position: cells[0].clone(),
                team: cells[1].clone(),
                points: cells[cells.len() - 1].clone(),
                ..Default::default()
            }
        };

        if !row.team.is_empty() {
            rows.push(row);
        }
    }
    rows
}

fn fixture_rows(table: ElementRef) -> Vec<RawFixture> {
    let header = Header::of(table);
    let map = map_columns(&header.keys, fixtures_column);
    let mapped = [Column::Date, Column::Home, Column::Mid, Column::Away]
        .iter()
        .all(|c| map.contains_key(c));

    let index = |column: Column, fallback: usize| -> usize {
        if mapped {
            map.get(&column).copied().unwrap_or(fallback)
        } else {
            fallback
        }
    };
    let (i_date, i_home, i_mid, i_away, i_ground) = (
        index(Column::Date, 0),
        index(Column::Home, 1),
        index(Column::Mid, 2),
        index(Column::Away, 3),
        index(Column::Ground, 4),
    );

    body_rows(table, &header)
        .into_iter()
        .filter(|cells| cells.len() >= 4)
        .map(|cells| {
            let get = |i: usize| cells.get(i).cloned().unwrap_or_default();
            RawFixture {
                date: get(i_date),
                home: get(i_home),
                mid: get(i_mid),
                away: get(i_away),
                ground: get(i_ground),
            }
        })
        .collect()
}

/// True once a fixtures-like table with at least `min_rows` rows is present.
pub fn fixtures_ready(document: &Html, min_rows: usize) -> bool {
    document
        .select(&SELECTOR_TABLE)
        .filter(|t| Header::of(*t).is_fixtures())
        .any(|t| row_count(t) >= min_rows)
}

/// Same as [`fixtures_ready`] for raw page HTML.
pub fn html_fixtures_ready(html: &str, min_rows: usize) -> bool {
    fixtures_ready(&Html::parse_document(html), min_rows)
}

/// Pull both tables out of a loaded document.
///
/// A missing table is logged and yields an empty list; it never fails the page.
pub fn extract_tables(document: &Html) -> RawTables {
    let fixtures_table = match locate_fixtures_table(document) {
        Ok(table) => Some(table),
        Err(e) => {
            warn!("{}", e);
            None
        }
    };

    let standings = match locate_standings_table(document, fixtures_table) {
        Ok(table) => standings_rows(table),
        Err(e) => {
            warn!("{}", e);
            Vec::new()
        }
    };

    let fixtures = fixtures_table.map(fixture_rows).unwrap_or_default();

    debug!(
        "Extracted {} standings rows and {} fixture rows",
        standings.len(),
        fixtures.len()
    );

    RawTables { standings, fixtures }
}

/// Parse league page HTML into raw tables.
pub fn parse_league_html(html: &str) -> RawTables {
    extract_tables(&Html::parse_document(html))
}
