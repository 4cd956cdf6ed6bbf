//! # In-memory result sets
//!
//! [`RecordSet`] keeps records in a [`Vec`] and narrows them in place,
//! resolving composed `path__lookup` keys against each record's cells.
//! It is the reference [`ResultSet`] implementation, and the natural one
//! for tests and small collections.
//!
//! ```rust
//! use filterset::{CellValue, CellVisitor, IntoCellValue, Record, RecordSet, ResultSet};
//!
//! struct Row {
//!     n: i64,
//! }
//!
//! impl Record for Row {
//!     fn accept_cell_visitor<V: CellVisitor>(&self, visitor: &mut V) {
//!         visitor.visit_cell("n", self.n.to_cell_value());
//!     }
//! }
//!
//! let set = RecordSet::new(vec![Row { n: 1 }, Row { n: 5 }]);
//! let set = set.narrow_field("n__gte", CellValue::Number(3i64.into()));
//! assert_eq!(set.len(), 1);
//! assert_eq!(set.records()[0].n, 5);
//! ```

use std::str::FromStr;

use log::trace;

use crate::filtering::ops::{Lookup, Operator};
use crate::filtering::{Filter, ResultSet, SearchPredicate};
use crate::row::{CellValue, Record};

/// An owned collection of records supporting composable narrowing.
#[derive(Debug, Clone)]
pub struct RecordSet<R> {
    records: Vec<R>,
}

impl<R> RecordSet<R> {
    pub fn new(records: Vec<R>) -> Self {
        RecordSet { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records still in the set.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn into_vec(self) -> Vec<R> {
        self.records
    }
}

impl<R> From<Vec<R>> for RecordSet<R> {
    fn from(records: Vec<R>) -> Self {
        RecordSet::new(records)
    }
}

struct FieldFilter {
    path: String,
    operator: Box<dyn Operator>,
}

impl FieldFilter {
    fn from_key(key: &str, value: CellValue) -> Self {
        // A trailing segment naming a lookup selects it; any other key
        // is a bare path with exact matching.
        let (path, lookup) = match key.rsplit_once("__") {
            Some((path, tail)) => match Lookup::from_str(tail) {
                Ok(lookup) => (path, lookup),
                Err(_) => (key, Lookup::Exact),
            },
            None => (key, Lookup::Exact),
        };
        trace!("{} resolves to {} under {}", key, path, lookup);
        FieldFilter {
            path: path.to_string(),
            operator: lookup.instantiate(value),
        }
    }
}

impl<R: Record> Filter<R> for FieldFilter {
    fn filter_one(&self, data: &R) -> bool {
        match data.cell(&self.path) {
            Some(value) => self.operator.apply(&value),
            None => self.operator.absent(),
        }
    }
}

impl<R: Record> ResultSet for RecordSet<R> {
    fn narrow_field(mut self, key: &str, value: CellValue) -> Self {
        let filter = FieldFilter::from_key(key, value);
        filter.filter_vec(&mut self.records);
        self
    }

    fn narrow_search(mut self, search: &SearchPredicate) -> Self {
        search.filter_vec(&mut self.records);
        self
    }
}
