/*
Cell-level view of records. Filters and free-text search read record
state through these values rather than through concrete field types.
 */

use std::collections::BTreeMap;
use std::fmt;

use serde_json::value::Value;
use serde_json::Number;

/// A single record value, as seen by filters.
///
/// `Null` stands in for an absent value, which is what the `isnull`
/// lookup tests for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => f.write_str(s),
        }
    }
}

/// Conversion into a [`CellValue`].
pub trait IntoCellValue {
    fn to_cell_value(&self) -> CellValue;
}

/// Marker for types whose [`Display`](fmt::Display) form is their cell
/// representation.
pub trait StringCellValue {}

impl StringCellValue for String {}
impl StringCellValue for &str {}

impl<T> IntoCellValue for T
where
    T: StringCellValue + fmt::Display,
{
    fn to_cell_value(&self) -> CellValue {
        CellValue::String(self.to_string())
    }
}

impl IntoCellValue for bool {
    fn to_cell_value(&self) -> CellValue {
        CellValue::Bool(*self)
    }
}

impl IntoCellValue for i32 {
    fn to_cell_value(&self) -> CellValue {
        CellValue::Number(Number::from(*self))
    }
}

impl IntoCellValue for i64 {
    fn to_cell_value(&self) -> CellValue {
        CellValue::Number(Number::from(*self))
    }
}

impl IntoCellValue for u32 {
    fn to_cell_value(&self) -> CellValue {
        CellValue::Number(Number::from(*self))
    }
}

impl IntoCellValue for u64 {
    fn to_cell_value(&self) -> CellValue {
        CellValue::Number(Number::from(*self))
    }
}

impl IntoCellValue for f64 {
    fn to_cell_value(&self) -> CellValue {
        Number::from_f64(*self)
            .map(CellValue::Number)
            .unwrap_or(CellValue::Null)
    }
}

impl<T> IntoCellValue for Option<T>
where
    T: IntoCellValue,
{
    fn to_cell_value(&self) -> CellValue {
        match self {
            Some(value) => value.to_cell_value(),
            None => CellValue::Null,
        }
    }
}

impl<Tz> IntoCellValue for chrono::DateTime<Tz>
where
    Tz: chrono::TimeZone,
    Tz::Offset: fmt::Display,
{
    fn to_cell_value(&self) -> CellValue {
        CellValue::String(self.to_rfc3339())
    }
}

/// Receives each of a record's cells in turn.
pub trait CellVisitor {
    fn visit_cell(&mut self, name: &str, value: CellValue);
}

/// A record whose state is visible to filtering as named cells.
///
/// Implementations enumerate their cells to a [`CellVisitor`]. Values on
/// related records are exposed under composed paths (`category__slug`),
/// and absent values as [`CellValue::Null`].
pub trait Record {
    fn accept_cell_visitor<V: CellVisitor>(&self, visitor: &mut V);

    /// The value of one cell, if the record has it.
    fn cell(&self, path: &str) -> Option<CellValue> {
        let mut visitor = CellFinder { path, value: None };
        self.accept_cell_visitor(&mut visitor);
        visitor.value
    }

    /// All cells as a name-to-value mapping.
    fn to_row(&self) -> BTreeMap<String, CellValue> {
        let mut visitor = RowVisitor {
            cells: BTreeMap::new(),
        };
        self.accept_cell_visitor(&mut visitor);
        visitor.cells
    }

    /// All cells as a JSON object.
    fn to_json(&self) -> Value {
        let mut visitor = JsonVisitor {
            object: serde_json::Map::new(),
        };
        self.accept_cell_visitor(&mut visitor);
        Value::Object(visitor.object)
    }
}

struct CellFinder<'a> {
    path: &'a str,
    value: Option<CellValue>,
}

impl<'a> CellVisitor for CellFinder<'a> {
    fn visit_cell(&mut self, name: &str, value: CellValue) {
        if name == self.path {
            self.value = Some(value);
        }
    }
}

struct RowVisitor {
    cells: BTreeMap<String, CellValue>,
}

impl CellVisitor for RowVisitor {
    fn visit_cell(&mut self, name: &str, value: CellValue) {
        self.cells.insert(name.to_string(), value);
    }
}

struct JsonVisitor {
    object: serde_json::Map<String, Value>,
}

impl CellVisitor for JsonVisitor {
    fn visit_cell(&mut self, name: &str, value: CellValue) {
        let value = match value {
            CellValue::Null => Value::Null,
            CellValue::Bool(b) => Value::Bool(b),
            CellValue::Number(n) => Value::Number(n),
            CellValue::String(s) => Value::String(s),
        };
        self.object.insert(name.to_string(), value);
    }
}
