#![cfg(test)]

use filterset::parsing::{QueryError, QueryParser};

#[test]
fn loose_terms_only() {
    let parser = QueryParser::new();
    let terms = parser.parse("stakker is akker").unwrap();
    assert_eq!(terms.len(), 1);
    assert_eq!(terms["search"].as_deref(), Some("stakker is akker"));
}

#[test]
fn empty_query() {
    let parser = QueryParser::new();
    assert!(parser.parse("").unwrap().is_empty());
    assert!(parser.parse("   ").unwrap().is_empty());
}

#[test]
fn structured_term() {
    let parser = QueryParser::new();
    let terms = parser.parse("party:tester").unwrap();
    assert_eq!(terms.len(), 1);
    assert_eq!(terms["party"].as_deref(), Some("tester"));
}

#[test]
fn trailing_colon_at_end_binds() {
    let parser = QueryParser::new();
    let terms = parser.parse("party:").unwrap();
    assert_eq!(terms.len(), 1);
    assert_eq!(terms["party"], None);
}

#[test]
fn trailing_colon_mid_query_is_loose() {
    let parser = QueryParser::new();
    let terms = parser
        .parse(r#"party: stakker is akker category:"hiha hoi""#)
        .unwrap();
    assert_eq!(terms.len(), 2);
    assert_eq!(terms["category"].as_deref(), Some("hiha hoi"));
    assert_eq!(terms["search"].as_deref(), Some("party: stakker is akker"));
}

#[test]
fn quoted_space_after_colon_is_loose() {
    let parser = QueryParser::new();
    let terms = parser.parse(r#""party: tester""#).unwrap();
    assert_eq!(terms.len(), 1);
    assert_eq!(terms["search"].as_deref(), Some("party: tester"));
}

#[test]
fn single_quotes() {
    let parser = QueryParser::new();
    let terms = parser.parse("category:'hiha hoi'").unwrap();
    assert_eq!(terms["category"].as_deref(), Some("hiha hoi"));
}

#[test]
fn value_keeps_later_colons() {
    let parser = QueryParser::new();
    let terms = parser.parse("when:12:30").unwrap();
    assert_eq!(terms["when"].as_deref(), Some("12:30"));
}

#[test]
fn leading_colon_is_loose() {
    let parser = QueryParser::new();
    let terms = parser.parse(":tester").unwrap();
    assert_eq!(terms.len(), 1);
    assert_eq!(terms["search"].as_deref(), Some(":tester"));
}

#[test]
fn duplicate_fields_last_write_wins() {
    let parser = QueryParser::new();
    let terms = parser.parse("party:one party:two").unwrap();
    assert_eq!(terms.len(), 1);
    assert_eq!(terms["party"].as_deref(), Some("two"));
}

#[test]
fn unbalanced_quote() {
    let parser = QueryParser::new();
    let err = parser.parse(r#"unclosed "quote"#).unwrap_err();
    assert!(matches!(
        err,
        QueryError::UnbalancedQuote { quote: '"', at: 9 }
    ));
}

#[test]
fn unbalanced_single_quote() {
    let parser = QueryParser::new();
    assert!(parser.parse("it's broken").is_err());
}

#[test]
fn reparse_of_loose_text_is_stable() {
    let parser = QueryParser::new();
    let terms = parser
        .parse(r#"party: stakker is akker category:"hiha hoi""#)
        .unwrap();
    let residual = terms["search"].clone().unwrap();

    let again = parser.parse(&residual).unwrap();
    assert_eq!(again.len(), 1);
    assert_eq!(again["search"].as_deref(), Some(residual.as_str()));
}

#[test]
fn custom_search_key() {
    let parser = QueryParser::with_search_key("q");
    let terms = parser.parse("loose words party:tester").unwrap();
    assert_eq!(terms["q"].as_deref(), Some("loose words"));
    assert_eq!(terms["party"].as_deref(), Some("tester"));
}
