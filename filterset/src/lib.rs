//! # Search queries as filters over record collections
//!
//! Search boxes accumulate conventions: `name:coffee` should filter on a
//! field, `category:"hot drinks"` should survive its space, and whatever
//! is left over should be matched loosely against a handful of text
//! fields. This crate implements that behavior in two pieces.
//!
//! The [`parsing`] module splits a raw query into structured
//! `field:value` terms and residual free text. The [`filtering`] module
//! declares which fields a caller may actually filter on, cleans the
//! incoming values per field kind (text, integer, float, related record,
//! boolean), and drives any [`ResultSet`] through successive narrowing
//! steps. The [`memory`] module provides [`RecordSet`], an in-memory
//! result set over anything implementing [`Record`], which exposes its
//! state as named cells via the [`row`] module.
//!
//! ## Overview
//!
//! A [`FilterSpec`] is built explicitly, field by field, and applied to a
//! parameter mapping such as decoded URL query parameters. The value
//! under its search key is parsed; structured terms found there are
//! layered over the raw parameters; each declared field present in the
//! merged mapping narrows the result set in turn; and remaining free text
//! applies one case-insensitive search across the configured fields.
//!
//! Example:
//! ```rust
//! use std::collections::BTreeMap;
//!
//! use filterset::{CellVisitor, FieldDef, FilterSpec, IntoCellValue, Record, RecordSet};
//!
//! struct Party {
//!     name: String,
//!     guests: Option<i64>,
//! }
//!
//! impl Record for Party {
//!     fn accept_cell_visitor<V: CellVisitor>(&self, visitor: &mut V) {
//!         visitor.visit_cell("name", self.name.to_cell_value());
//!         visitor.visit_cell("guests", self.guests.to_cell_value());
//!     }
//! }
//!
//! let spec = FilterSpec::builder("parties")
//!     .field(FieldDef::char("name"))
//!     .field(FieldDef::integer("guests"))
//!     .search_field("name")
//!     .build();
//!
//! let parties = vec![
//!     Party { name: "zomerfeest".to_string(), guests: Some(25) },
//!     Party { name: "winterborrel".to_string(), guests: Some(8) },
//!     Party { name: "picknick".to_string(), guests: None },
//! ];
//!
//! let mut params = BTreeMap::new();
//! params.insert("search".to_string(), "guests:25 feest".to_string());
//!
//! let narrowed = spec.filter(RecordSet::new(parties), &params).unwrap();
//! assert_eq!(narrowed.len(), 1);
//! assert_eq!(narrowed.records()[0].name, "zomerfeest");
//! ```
//!
//! Parsing and filtering fail separately: an unbalanced quote in the
//! query is a [`QueryError`] and a value rejected by a field's clean step
//! is a [`FilterError::InvalidValue`], so callers can map the two onto
//! different responses.

pub mod filtering;
pub mod memory;
pub mod parsing;
pub mod row;

pub use crate::filtering::ops::{Lookup, Operator};
pub use crate::filtering::{
    FieldDef, Filter, FilterError, FilterSpec, FilterSpecBuilder, ResultSet, SearchPredicate,
};
pub use crate::memory::RecordSet;
pub use crate::parsing::{ParsedQuery, QueryError, QueryParser, DEFAULT_SEARCH_KEY};
pub use crate::row::{CellValue, CellVisitor, IntoCellValue, Record, StringCellValue};
