#![cfg(test)]

use std::str::FromStr;

use chrono::{TimeZone, Utc};
use filterset::{
    CellValue, CellVisitor, IntoCellValue, Lookup, Record, RecordSet, ResultSet,
};
use serde_json::json;

struct Event {
    title: String,
    seats: Option<i64>,
    starts: chrono::DateTime<Utc>,
    open: bool,
}

impl Record for Event {
    fn accept_cell_visitor<V: CellVisitor>(&self, visitor: &mut V) {
        visitor.visit_cell("title", self.title.to_cell_value());
        visitor.visit_cell("seats", self.seats.to_cell_value());
        visitor.visit_cell("starts", self.starts.to_cell_value());
        visitor.visit_cell("open", self.open.to_cell_value());
    }
}

fn event(title: &str, seats: Option<i64>, open: bool) -> Event {
    Event {
        title: title.to_string(),
        seats,
        starts: Utc.with_ymd_and_hms(2026, 8, 6, 10, 0, 0).unwrap(),
        open,
    }
}

#[test]
fn cells_by_path() {
    let e = event("rock night", Some(120), true);
    assert_eq!(
        e.cell("title"),
        Some(CellValue::String("rock night".to_string()))
    );
    assert_eq!(e.cell("open"), Some(CellValue::Bool(true)));
    assert_eq!(e.cell("missing"), None);
}

#[test]
fn absent_values_are_null_cells() {
    let e = event("open mic", None, true);
    assert_eq!(e.cell("seats"), Some(CellValue::Null));
    assert!(e.cell("seats").unwrap().is_null());
}

#[test]
fn datetimes_become_text_cells() {
    let e = event("rock night", Some(120), true);
    assert_eq!(
        e.cell("starts"),
        Some(CellValue::String("2026-08-06T10:00:00+00:00".to_string()))
    );
}

#[test]
fn rows_and_json() {
    let e = event("rock night", Some(120), true);

    let row = e.to_row();
    assert_eq!(row.len(), 4);
    assert_eq!(row["seats"], CellValue::Number(120i64.into()));

    assert_eq!(
        e.to_json(),
        json!({
            "title": "rock night",
            "seats": 120,
            "starts": "2026-08-06T10:00:00+00:00",
            "open": true,
        })
    );
}

#[test]
fn null_cells_render_as_empty_text() {
    assert_eq!(CellValue::Null.to_string(), "");
    assert_eq!(CellValue::Bool(false).to_string(), "false");
    assert_eq!(CellValue::Number(7i64.into()).to_string(), "7");
}

#[test]
fn lookup_names_round_trip() {
    assert_eq!(Lookup::IContains.to_string(), "icontains");
    assert_eq!(Lookup::IsNull.to_string(), "isnull");
    assert_eq!(Lookup::from_str("startswith").unwrap(), Lookup::StartsWith);
    assert!(Lookup::from_str("between").is_err());
}

fn events() -> Vec<Event> {
    vec![
        event("rock night", Some(120), true),
        event("jazz brunch", Some(40), false),
        event("open mic", None, true),
    ]
}

fn titles(set: &RecordSet<Event>) -> Vec<&str> {
    set.records().iter().map(|e| e.title.as_str()).collect()
}

#[test]
fn narrowing_by_composed_keys() {
    let set = RecordSet::new(events())
        .narrow_field("title__icontains", CellValue::String("NIGHT".to_string()));
    assert_eq!(titles(&set), vec!["rock night"]);

    let set = RecordSet::new(events())
        .narrow_field("seats__gte", CellValue::Number(50i64.into()));
    assert_eq!(titles(&set), vec!["rock night"]);

    let set = RecordSet::new(events())
        .narrow_field("seats__isnull", CellValue::Bool(true));
    assert_eq!(titles(&set), vec!["open mic"]);
}

#[test]
fn bare_keys_match_exactly() {
    let set = RecordSet::new(events()).narrow_field("open", CellValue::Bool(true));
    assert_eq!(titles(&set), vec!["rock night", "open mic"]);
}

#[test]
fn narrowing_steps_compose() {
    let set = RecordSet::new(events())
        .narrow_field("open", CellValue::Bool(true))
        .narrow_field("seats__lt", CellValue::Number(200i64.into()));
    assert_eq!(titles(&set), vec!["rock night"]);
}

#[test]
fn unknown_paths_never_match() {
    let set = RecordSet::new(events())
        .narrow_field("venue__icontains", CellValue::String("hall".to_string()));
    assert!(set.is_empty());
}
