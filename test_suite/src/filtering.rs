#![cfg(test)]

use std::collections::BTreeMap;

use filterset::{
    CellVisitor, FieldDef, FilterError, FilterSpec, IntoCellValue, Lookup, Record, RecordSet,
};

#[derive(Debug)]
struct Category {
    slug: String,
    label: String,
}

#[derive(Debug)]
struct Party {
    name: String,
    guests: Option<i64>,
    budget: Option<f64>,
    cancelled: bool,
    category: Option<Category>,
}

impl Record for Party {
    fn accept_cell_visitor<V: CellVisitor>(&self, visitor: &mut V) {
        visitor.visit_cell("name", self.name.to_cell_value());
        visitor.visit_cell("guests", self.guests.to_cell_value());
        visitor.visit_cell("budget", self.budget.to_cell_value());
        visitor.visit_cell("cancelled", self.cancelled.to_cell_value());
        visitor.visit_cell(
            "category",
            self.category.as_ref().map(|c| c.slug.as_str()).to_cell_value(),
        );
        visitor.visit_cell(
            "category__slug",
            self.category.as_ref().map(|c| c.slug.as_str()).to_cell_value(),
        );
        visitor.visit_cell(
            "category__label",
            self.category.as_ref().map(|c| c.label.as_str()).to_cell_value(),
        );
    }
}

fn party(
    name: &str,
    guests: Option<i64>,
    budget: Option<f64>,
    cancelled: bool,
    category: Option<(&str, &str)>,
) -> Party {
    Party {
        name: name.to_string(),
        guests,
        budget,
        cancelled,
        category: category.map(|(slug, label)| Category {
            slug: slug.to_string(),
            label: label.to_string(),
        }),
    }
}

fn parties() -> Vec<Party> {
    vec![
        party(
            "zomerfeest",
            Some(25),
            Some(1234.56),
            false,
            Some(("tuin", "Tuinfeest")),
        ),
        party(
            "winterborrel",
            Some(8),
            None,
            false,
            Some(("kantoor", "Op kantoor")),
        ),
        party("picknick", None, Some(75.0), true, None),
    ]
}

fn spec() -> FilterSpec {
    FilterSpec::builder("parties")
        .field(FieldDef::char("name"))
        .field(FieldDef::integer("guests"))
        .field(FieldDef::float("budget"))
        .field(FieldDef::boolean("cancelled"))
        .field(FieldDef::related("category"))
        .search_field("name")
        .search_field("category__label")
        .build()
}

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn names(set: &RecordSet<Party>) -> Vec<&str> {
    set.records().iter().map(|p| p.name.as_str()).collect()
}

#[test]
fn char_field_exact() {
    let set = spec()
        .filter(RecordSet::new(parties()), &params(&[("name", "picknick")]))
        .unwrap();
    assert_eq!(names(&set), vec!["picknick"]);
}

#[test]
fn char_field_with_lookup() {
    let spec = FilterSpec::builder("parties")
        .field(FieldDef::char("name").with_lookup(Lookup::IContains))
        .build();
    let set = spec
        .filter(RecordSet::new(parties()), &params(&[("name", "FEEST")]))
        .unwrap();
    assert_eq!(names(&set), vec!["zomerfeest"]);
}

#[test]
fn char_field_renamed() {
    let spec = FilterSpec::builder("parties")
        .field(FieldDef::char("title").with_field("name"))
        .build();
    let set = spec
        .filter(RecordSet::new(parties()), &params(&[("title", "picknick")]))
        .unwrap();
    assert_eq!(names(&set), vec!["picknick"]);
}

#[test]
fn integer_field_exact() {
    let set = spec()
        .filter(RecordSet::new(parties()), &params(&[("guests", "8")]))
        .unwrap();
    assert_eq!(names(&set), vec!["winterborrel"]);
}

#[test]
fn integer_field_empty_means_unset() {
    let set = spec()
        .filter(RecordSet::new(parties()), &params(&[("guests", "")]))
        .unwrap();
    assert_eq!(names(&set), vec!["picknick"]);
}

#[test]
fn integer_field_rejects_garbage() {
    let err = spec()
        .filter(RecordSet::new(parties()), &params(&[("guests", "acht")]))
        .unwrap_err();
    match err {
        FilterError::InvalidValue { field, .. } => assert_eq!(field, "guests"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn float_field_decimal_comma() {
    // The comma is the decimal separator and the dot a thousands
    // separator, so this reads as 1234.56.
    let set = spec()
        .filter(
            RecordSet::new(parties()),
            &params(&[("budget", "1.234,56")]),
        )
        .unwrap();
    assert_eq!(names(&set), vec!["zomerfeest"]);
}

#[test]
fn float_field_plain() {
    let set = spec()
        .filter(RecordSet::new(parties()), &params(&[("budget", "75")]))
        .unwrap();
    assert_eq!(names(&set), vec!["picknick"]);
}

#[test]
fn float_field_empty_means_unset() {
    let set = spec()
        .filter(RecordSet::new(parties()), &params(&[("budget", "")]))
        .unwrap();
    assert_eq!(names(&set), vec!["winterborrel"]);
}

#[test]
fn float_field_rejects_garbage() {
    assert!(spec()
        .filter(RecordSet::new(parties()), &params(&[("budget", "veel")]))
        .is_err());
}

#[test]
fn boolean_field_spellings() {
    for value in ["True", "1", "true"] {
        let set = spec()
            .filter(RecordSet::new(parties()), &params(&[("cancelled", value)]))
            .unwrap();
        assert_eq!(names(&set), vec!["picknick"], "cancelled={}", value);
    }
    for value in ["False", "0", "false"] {
        let set = spec()
            .filter(RecordSet::new(parties()), &params(&[("cancelled", value)]))
            .unwrap();
        assert_eq!(
            names(&set),
            vec!["zomerfeest", "winterborrel"],
            "cancelled={}",
            value
        );
    }
}

#[test]
fn boolean_field_is_permissive() {
    // Any other non-empty value counts as true, an empty one as false.
    let set = spec()
        .filter(RecordSet::new(parties()), &params(&[("cancelled", "yes")]))
        .unwrap();
    assert_eq!(names(&set), vec!["picknick"]);

    let set = spec()
        .filter(RecordSet::new(parties()), &params(&[("cancelled", "")]))
        .unwrap();
    assert_eq!(names(&set), vec!["zomerfeest", "winterborrel"]);
}

#[test]
fn related_field_partial_match() {
    let set = spec()
        .filter(RecordSet::new(parties()), &params(&[("category", "tui")]))
        .unwrap();
    assert_eq!(names(&set), vec!["zomerfeest"]);

    let set = spec()
        .filter(RecordSet::new(parties()), &params(&[("category", "KANT")]))
        .unwrap();
    assert_eq!(names(&set), vec!["winterborrel"]);
}

#[test]
fn related_field_empty_means_no_relation() {
    let set = spec()
        .filter(RecordSet::new(parties()), &params(&[("category", "")]))
        .unwrap();
    assert_eq!(names(&set), vec!["picknick"]);
}

#[test]
fn related_field_custom_attribute() {
    let spec = FilterSpec::builder("parties")
        .field(FieldDef::related("category").with_related_name("label"))
        .build();
    let set = spec
        .filter(RecordSet::new(parties()), &params(&[("category", "tuinf")]))
        .unwrap();
    assert_eq!(names(&set), vec!["zomerfeest"]);
}

#[test]
fn search_or_across_fields() {
    // "feest" appears in a name and in a category label.
    let set = spec()
        .filter(RecordSet::new(parties()), &params(&[("search", "feest")]))
        .unwrap();
    assert_eq!(names(&set), vec!["zomerfeest"]);

    let set = spec()
        .filter(RecordSet::new(parties()), &params(&[("search", "kantoor")]))
        .unwrap();
    assert_eq!(names(&set), vec!["winterborrel"]);
}

#[test]
fn search_and_across_terms() {
    let set = spec()
        .filter(
            RecordSet::new(parties()),
            &params(&[("search", "op kantoor")]),
        )
        .unwrap();
    assert_eq!(names(&set), vec!["winterborrel"]);

    // Both terms must land in the same field.
    let set = spec()
        .filter(
            RecordSet::new(parties()),
            &params(&[("search", "zomer picknick")]),
        )
        .unwrap();
    assert!(set.is_empty());
}

#[test]
fn search_mixes_structured_and_loose_terms() {
    let set = spec()
        .filter(
            RecordSet::new(parties()),
            &params(&[("search", "guests:8 winter")]),
        )
        .unwrap();
    assert_eq!(names(&set), vec!["winterborrel"]);

    let set = spec()
        .filter(
            RecordSet::new(parties()),
            &params(&[("search", "guests:8 zomer")]),
        )
        .unwrap();
    assert!(set.is_empty());
}

#[test]
fn structured_terms_override_raw_params() {
    let set = spec()
        .filter(
            RecordSet::new(parties()),
            &params(&[("guests", "25"), ("search", "guests:8")]),
        )
        .unwrap();
    assert_eq!(names(&set), vec!["winterborrel"]);
}

#[test]
fn unknown_fields_are_dropped_silently() {
    // `flavor` is not declared: it neither filters nor joins the loose
    // text.
    let set = spec()
        .filter(
            RecordSet::new(parties()),
            &params(&[("search", "flavor:sweet picknick")]),
        )
        .unwrap();
    assert_eq!(names(&set), vec!["picknick"]);

    let set = spec()
        .filter(
            RecordSet::new(parties()),
            &params(&[("search", "flavor:sweet")]),
        )
        .unwrap();
    assert_eq!(set.len(), 3);
}

#[test]
fn valueless_term_filters_on_empty_string() {
    // `name:` at the end of the query carries no value, which a char
    // field cleans to the empty string.
    let set = spec()
        .filter(RecordSet::new(parties()), &params(&[("search", "name:")]))
        .unwrap();
    assert!(set.is_empty());
}

#[test]
fn declaration_order_does_not_change_results() {
    let forward = spec();
    let backward = FilterSpec::builder("parties")
        .field(FieldDef::related("category"))
        .field(FieldDef::boolean("cancelled"))
        .field(FieldDef::float("budget"))
        .field(FieldDef::integer("guests"))
        .field(FieldDef::char("name"))
        .search_field("name")
        .search_field("category__label")
        .build();

    let query = params(&[("cancelled", "false"), ("guests", "25")]);
    let a = forward.filter(RecordSet::new(parties()), &query).unwrap();
    let b = backward.filter(RecordSet::new(parties()), &query).unwrap();
    assert_eq!(names(&a), names(&b));
    assert_eq!(names(&a), vec!["zomerfeest"]);
}

#[test]
fn invalid_query_propagates() {
    let err = spec()
        .filter(
            RecordSet::new(parties()),
            &params(&[("search", r#"unclosed "quote"#)]),
        )
        .unwrap_err();
    assert!(matches!(err, FilterError::InvalidQuery(_)));
}

#[test]
fn no_search_fields_means_no_text_narrowing() {
    let spec = FilterSpec::builder("parties")
        .field(FieldDef::char("name"))
        .build();
    let set = spec
        .filter(
            RecordSet::new(parties()),
            &params(&[("search", "anything")]),
        )
        .unwrap();
    assert_eq!(set.len(), 3);
}

#[test]
fn empty_params_leave_the_set_alone() {
    let set = spec()
        .filter(RecordSet::new(parties()), &BTreeMap::new())
        .unwrap();
    assert_eq!(set.len(), 3);
}

#[test_log::test]
fn custom_search_key_on_spec() {
    let spec = FilterSpec::builder("parties")
        .field(FieldDef::integer("guests"))
        .search_field("name")
        .search_key("q")
        .build();

    let set = spec
        .filter(RecordSet::new(parties()), &params(&[("q", "winter")]))
        .unwrap();
    assert_eq!(names(&set), vec!["winterborrel"]);

    // The default key is just another undeclared parameter now.
    let set = spec
        .filter(RecordSet::new(parties()), &params(&[("search", "winter")]))
        .unwrap();
    assert_eq!(set.len(), 3);
}
