//! # Declare filter fields and apply them to result sets
//!
//! A [`FilterSpec`] is the explicit, ordered list of fields a caller may
//! filter on. Each [`FieldDef`] names the parameter it answers to, the
//! underlying field path when that differs, the [`Lookup`] to apply, and
//! a kind that decides how raw values are cleaned:
//!
//! - `char`: text compared as given; a valueless term cleans to `""`.
//! - `integer` and `float`: empty values filter for records where the
//!   field is unset, anything else must parse as a number. The float
//!   parser accepts a decimal comma and strips thousands-separator dots,
//!   so `1.234,56` reads as `1234.56`.
//! - `related`: a partial match against an attribute of a related record
//!   (`slug` unless overridden); empty values filter for records with no
//!   related record at all.
//! - `boolean`: `"True"`, `"1"` and `"true"` are true, `"False"`, `"0"`
//!   and `"false"` are false, and any other value falls back to string
//!   truthiness.
//!
//! [`FilterSpec::filter`] consumes a parameter mapping. The value under
//! the spec's search key is parsed by [`QueryParser`] first, its
//! structured terms are layered over the raw parameters, and then each
//! declared field present in the merged mapping narrows the set, in
//! declaration order. Residual free text finally becomes one
//! [`SearchPredicate`]: a record matches when at least one of the
//! configured search fields contains every term, case insensitively.
//!
//! Example:
//! ```rust
//! use std::collections::BTreeMap;
//!
//! use filterset::{CellVisitor, FieldDef, FilterSpec, IntoCellValue, Record, RecordSet};
//!
//! struct Item {
//!     name: String,
//!     stock: Option<i64>,
//! }
//!
//! impl Record for Item {
//!     fn accept_cell_visitor<V: CellVisitor>(&self, visitor: &mut V) {
//!         visitor.visit_cell("name", self.name.to_cell_value());
//!         visitor.visit_cell("stock", self.stock.to_cell_value());
//!     }
//! }
//!
//! let items = vec![
//!     Item { name: "beans".to_string(), stock: Some(12) },
//!     Item { name: "rice".to_string(), stock: None },
//! ];
//!
//! let spec = FilterSpec::builder("items")
//!     .field(FieldDef::char("name"))
//!     .field(FieldDef::integer("stock"))
//!     .search_field("name")
//!     .build();
//!
//! // An empty value filters for absence, not for an empty string.
//! let mut params = BTreeMap::new();
//! params.insert("stock".to_string(), String::new());
//!
//! let narrowed = spec.filter(RecordSet::new(items), &params).unwrap();
//! assert_eq!(narrowed.len(), 1);
//! assert_eq!(narrowed.records()[0].name, "rice");
//! ```
//!
//! Narrowing goes through the [`ResultSet`] trait, so the same spec can
//! drive the in-memory [`RecordSet`](crate::memory::RecordSet) or a
//! store-backed collection that translates the composed keys itself.
//! Parameter names the spec does not declare are ignored.

pub mod ops;

use std::collections::BTreeMap;

use anyhow::anyhow;
use log::debug;
use thiserror::Error;

use crate::parsing::{ParsedQuery, QueryError, QueryParser, DEFAULT_SEARCH_KEY};
use crate::row::{CellValue, Record};

use self::ops::Lookup;

/// Errors produced when applying a [`FilterSpec`].
#[derive(Debug, Error)]
pub enum FilterError {
    /// The free-text query could not be tokenized.
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),
    /// A field's value was rejected by its clean step.
    #[error("invalid value for filter `{field}`")]
    InvalidValue {
        field: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Char,
    Integer,
    Float,
    Related,
    Boolean,
}

/// A cleaned filter value: either a concrete right hand side, or a
/// request for records where the field has no value at all.
enum Cleaned {
    Absent,
    Value(CellValue),
}

const DEFAULT_RELATED_NAME: &str = "slug";

/// One declared filter field.
#[derive(Debug, Clone)]
pub struct FieldDef {
    name: String,
    field: Option<String>,
    lookup: Option<Lookup>,
    related_name: String,
    kind: FieldKind,
}

impl FieldDef {
    fn new(name: String, kind: FieldKind, lookup: Option<Lookup>) -> Self {
        FieldDef {
            name,
            field: None,
            lookup,
            related_name: DEFAULT_RELATED_NAME.to_string(),
            kind,
        }
    }

    /// A text field, compared with [`Lookup::Exact`] by default. A
    /// valueless term cleans to the empty string.
    pub fn char<S: Into<String>>(name: S) -> Self {
        Self::new(name.into(), FieldKind::Char, Some(Lookup::Exact))
    }

    /// An integer field. An empty value matches records where the field
    /// is unset.
    pub fn integer<S: Into<String>>(name: S) -> Self {
        Self::new(name.into(), FieldKind::Integer, None)
    }

    /// A float field. The value may use a decimal comma; any dot before
    /// the last dot is taken as a thousands separator. An empty value
    /// matches records where the field is unset.
    pub fn float<S: Into<String>>(name: S) -> Self {
        Self::new(name.into(), FieldKind::Float, None)
    }

    /// A field matched through an attribute of a related record, `slug`
    /// with [`Lookup::IContains`] unless overridden. An empty value
    /// matches records with no related record.
    pub fn related<S: Into<String>>(name: S) -> Self {
        Self::new(name.into(), FieldKind::Related, Some(Lookup::IContains))
    }

    /// A boolean field. `"True"`, `"1"` and `"true"` clean to true,
    /// `"False"`, `"0"` and `"false"` to false, and anything else to the
    /// truthiness of the string.
    pub fn boolean<S: Into<String>>(name: S) -> Self {
        Self::new(name.into(), FieldKind::Boolean, Some(Lookup::Exact))
    }

    /// Filter on `path` instead of the declared name.
    pub fn with_field<S: Into<String>>(mut self, path: S) -> Self {
        self.field = Some(path.into());
        self
    }

    /// Replace the default lookup operator.
    pub fn with_lookup(mut self, lookup: Lookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Match against a different attribute of the related record.
    pub fn with_related_name<S: Into<String>>(mut self, related_name: S) -> Self {
        self.related_name = related_name.into();
        self
    }

    /// The name this field answers to in parameter mappings.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.name)
    }

    fn clean(&self, raw: Option<&str>) -> Result<Cleaned, FilterError> {
        let cleaned = match self.kind {
            FieldKind::Char => Cleaned::Value(CellValue::String(raw.unwrap_or("").to_string())),
            FieldKind::Integer => match raw {
                None | Some("") => Cleaned::Absent,
                Some(text) => {
                    let number = text
                        .parse::<i64>()
                        .map_err(|e| self.bad_value(e.into()))?;
                    Cleaned::Value(CellValue::Number(number.into()))
                }
            },
            FieldKind::Float => match raw {
                None | Some("") => Cleaned::Absent,
                Some(text) => {
                    let number = parse_decimal(text).map_err(|e| self.bad_value(e))?;
                    Cleaned::Value(CellValue::Number(number))
                }
            },
            FieldKind::Related => match raw {
                None | Some("") => Cleaned::Absent,
                Some(text) => Cleaned::Value(CellValue::String(text.to_string())),
            },
            FieldKind::Boolean => Cleaned::Value(CellValue::Bool(match raw {
                Some("True") | Some("1") | Some("true") => true,
                Some("False") | Some("0") | Some("false") => false,
                Some(text) => !text.is_empty(),
                None => false,
            })),
        };
        Ok(cleaned)
    }

    fn bad_value(&self, source: anyhow::Error) -> FilterError {
        FilterError::InvalidValue {
            field: self.name.clone(),
            source,
        }
    }

    fn key(&self, cleaned: &Cleaned) -> String {
        match cleaned {
            Cleaned::Absent => format!("{}__{}", self.path(), Lookup::IsNull),
            Cleaned::Value(_) if self.kind == FieldKind::Related => {
                // unwrap is safe: related fields always carry a lookup
                format!(
                    "{}__{}__{}",
                    self.path(),
                    self.related_name,
                    self.lookup.unwrap()
                )
            }
            Cleaned::Value(_) => match self.lookup {
                Some(lookup) => format!("{}__{}", self.path(), lookup),
                None => self.path().to_string(),
            },
        }
    }
}

/// Parse a decimal that may use a comma as the decimal separator and
/// dots as thousands separators: every dot before the last one is
/// stripped, so `1.234,56` becomes `1234.56`. Deliberately not locale
/// aware, to keep the historic behavior.
fn parse_decimal(text: &str) -> Result<serde_json::Number, anyhow::Error> {
    let normalized = text.replace(',', ".");
    let decimal: String = match normalized.rfind('.') {
        Some(last) => normalized
            .char_indices()
            .filter(|&(at, c)| c != '.' || at == last)
            .map(|(_, c)| c)
            .collect(),
        None => normalized,
    };
    let number = decimal.parse::<f64>()?;
    serde_json::Number::from_f64(number).ok_or_else(|| anyhow!("`{}` is not a finite number", text))
}

/// Test whether a record belongs in a result set.
pub trait Filter<R> {
    /// Produce an in/out result for one record.
    fn filter_one(&self, data: &R) -> bool;
    /// Retain only matching records.
    fn filter_vec(&self, data: &mut Vec<R>) {
        data.retain(|r| self.filter_one(r))
    }
    /// Retain only matching records, by reference.
    fn filter_ref_vec(&self, data: &mut Vec<&R>) {
        data.retain(|r| self.filter_one(r))
    }
}

/// The free-text part of a query, as a predicate: a record matches when
/// at least one of the searched fields contains every term, case
/// insensitively.
#[derive(Debug, Clone)]
pub struct SearchPredicate {
    fields: Vec<String>,
    terms: Vec<String>,
}

impl SearchPredicate {
    pub fn new(fields: Vec<String>, terms: Vec<String>) -> Self {
        SearchPredicate {
            fields,
            terms: terms.into_iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    /// The field paths searched.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The lower-cased terms a matching field must all contain.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

impl<R: Record> Filter<R> for SearchPredicate {
    fn filter_one(&self, data: &R) -> bool {
        self.fields.iter().any(|field| match data.cell(field) {
            Some(cell) => {
                let haystack = cell.to_string().to_lowercase();
                self.terms.iter().all(|term| haystack.contains(term.as_str()))
            }
            None => false,
        })
    }
}

/// A collection that can be narrowed one step at a time.
///
/// Each call returns a further narrowed handle, and successive steps
/// combine with AND. `key` is a field path optionally followed by `__`
/// and a [`Lookup`] name (`age__isnull`, `category__slug__icontains`),
/// so a store-backed implementation can translate it into its own query
/// language. [`RecordSet`](crate::memory::RecordSet) is the in-memory
/// implementation.
pub trait ResultSet: Sized {
    /// Narrow to records where `key` matches `value`.
    fn narrow_field(self, key: &str, value: CellValue) -> Self;
    /// Narrow to records matching the free-text predicate.
    fn narrow_search(self, search: &SearchPredicate) -> Self;
}

/// A named, ordered set of filter fields, plus the field paths eligible
/// for free-text search.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    name: String,
    fields: Vec<FieldDef>,
    search_fields: Vec<String>,
    parser: QueryParser,
}

impl FilterSpec {
    /// Start building a spec named `name`.
    pub fn builder<S: Into<String>>(name: S) -> FilterSpecBuilder {
        FilterSpecBuilder {
            name: name.into(),
            fields: Vec::new(),
            search_fields: Vec::new(),
            search_key: DEFAULT_SEARCH_KEY.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared fields, in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Field paths eligible for free-text search.
    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    /// The parameter key free-text queries arrive under.
    pub fn search_key(&self) -> &str {
        self.parser.search_key()
    }

    /// Split a raw search query using this spec's search key.
    pub fn parse(&self, query: &str) -> Result<ParsedQuery, QueryError> {
        self.parser.parse(query)
    }

    /// Narrow `set` by the caller-supplied `params`.
    ///
    /// The value under the search key, if any, is parsed first; the
    /// structured terms it yields are layered over the raw parameters
    /// and its loose text re-enters under the search key. Declared
    /// fields then apply in declaration order wherever the merged
    /// mapping holds a value for them; names the spec does not declare
    /// never filter. Remaining loose text applies one
    /// [`SearchPredicate`] across
    /// [`search_fields`](FilterSpec::search_fields), or nothing when no
    /// search fields are configured.
    pub fn filter<S: ResultSet>(
        &self,
        set: S,
        params: &BTreeMap<String, String>,
    ) -> Result<S, FilterError> {
        let mut merged: ParsedQuery = params
            .iter()
            .map(|(k, v)| (k.clone(), Some(v.clone())))
            .collect();

        if let Some(query) = merged.remove(self.search_key()).flatten() {
            merged.extend(self.parser.parse(&query)?);
        }

        let mut set = set;
        for def in &self.fields {
            let raw = match merged.get(def.name()) {
                Some(raw) => raw,
                None => continue,
            };
            let cleaned = def.clean(raw.as_deref())?;
            let key = def.key(&cleaned);
            let value = match cleaned {
                Cleaned::Absent => CellValue::Bool(true),
                Cleaned::Value(value) => value,
            };
            debug!("{}: narrowing {} = {}", self.name, key, value);
            set = set.narrow_field(&key, value);
        }

        if let Some(Some(text)) = merged.get(self.search_key()) {
            let terms: Vec<String> = text.split_whitespace().map(str::to_string).collect();
            if !terms.is_empty() && !self.search_fields.is_empty() {
                debug!(
                    "{}: searching {:?} for {:?}",
                    self.name, self.search_fields, terms
                );
                set = set.narrow_search(&SearchPredicate::new(self.search_fields.clone(), terms));
            }
        }

        Ok(set)
    }
}

/// Builder for [`FilterSpec`].
pub struct FilterSpecBuilder {
    name: String,
    fields: Vec<FieldDef>,
    search_fields: Vec<String>,
    search_key: String,
}

impl FilterSpecBuilder {
    /// Append a field; declaration order is application order.
    pub fn field(mut self, def: FieldDef) -> Self {
        self.fields.push(def);
        self
    }

    /// Make `path` eligible for free-text search.
    pub fn search_field<S: Into<String>>(mut self, path: S) -> Self {
        self.search_fields.push(path.into());
        self
    }

    /// Collect free-text under `key` instead of [`DEFAULT_SEARCH_KEY`].
    pub fn search_key<S: Into<String>>(mut self, key: S) -> Self {
        self.search_key = key.into();
        self
    }

    pub fn build(self) -> FilterSpec {
        FilterSpec {
            name: self.name,
            fields: self.fields,
            search_fields: self.search_fields,
            parser: QueryParser::with_search_key(self.search_key),
        }
    }
}
