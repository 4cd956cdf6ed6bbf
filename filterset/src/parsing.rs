//! # Split free-text search queries into terms
//!
//! A search box query like
//!
//! ```text
//! title:report author:"de vries" quarterly draft
//! ```
//!
//! mixes structured assertions (`title:report`) with loose words meant
//! for a general text search (`quarterly draft`). [`QueryParser`]
//! separates the two. Tokens follow shell quoting rules: whitespace ends
//! a token except inside matching single or double quotes, and the
//! quotes themselves are stripped, so `author:"de vries"` is one token.
//! A token becomes a `(field, value)` term when it contains a colon with
//! non-space text on the left and either nothing or non-space text on
//! the right; every other token is collected, in original order, into a
//! single space-joined string stored under the parser's search key
//! (`"search"` unless overridden).
//!
//! A trailing colon only yields a valueless term when it ends the whole
//! query; a bare `party:` followed by more input is taken as loose text.
//!
//! ```rust
//! use filterset::parsing::QueryParser;
//!
//! let parser = QueryParser::new();
//!
//! let terms = parser
//!     .parse(r#"party: stakker is akker category:"hiha hoi""#)
//!     .unwrap();
//! assert_eq!(terms["category"].as_deref(), Some("hiha hoi"));
//! assert_eq!(terms["search"].as_deref(), Some("party: stakker is akker"));
//!
//! let terms = parser.parse("party:").unwrap();
//! assert_eq!(terms["party"], None);
//!
//! let terms = parser.parse("party:tester").unwrap();
//! assert_eq!(terms["party"].as_deref(), Some("tester"));
//! ```
//!
//! Unbalanced quoting is an error:
//!
//! ```rust
//! use filterset::parsing::QueryParser;
//!
//! assert!(QueryParser::new().parse(r#"unclosed "quote"#).is_err());
//! ```

use std::collections::BTreeMap;

use log::trace;
use regex::Regex;
use thiserror::Error;

/// The search key used when none is configured.
pub const DEFAULT_SEARCH_KEY: &str = "search";

/// The output of [`QueryParser::parse`]: field names mapped to their
/// values, plus the joined loose text under the parser's search key. A
/// term like `party:` carries no value, hence the [`Option`].
pub type ParsedQuery = BTreeMap<String, Option<String>>;

/// Errors produced by query tokenization.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A quote was opened and never closed.
    #[error("unbalanced {quote} quote starting at byte {at}")]
    UnbalancedQuote { quote: char, at: usize },
}

struct Token {
    text: String,
    /// The token was terminated by the end of the input rather than by
    /// whitespace.
    at_end: bool,
}

/// Splits raw query strings into structured terms and loose search text.
#[derive(Debug, Clone)]
pub struct QueryParser {
    search_key: String,
    term: Regex,
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryParser {
    /// Create a parser collecting loose text under [`DEFAULT_SEARCH_KEY`].
    pub fn new() -> Self {
        Self::with_search_key(DEFAULT_SEARCH_KEY)
    }

    /// Create a parser collecting loose text under `key`.
    pub fn with_search_key<S: Into<String>>(key: S) -> Self {
        QueryParser {
            search_key: key.into(),
            // The field part runs up to the first colon preceded by a
            // non-space character; the value part must not start with
            // whitespace. Literal pattern, always compiles.
            term: Regex::new(r"^(?P<field>.*?\S):(?P<value>\S.*)?$").unwrap(),
        }
    }

    /// The key loose text is collected under.
    pub fn search_key(&self) -> &str {
        &self.search_key
    }

    /// Parse `query` into a [`ParsedQuery`].
    ///
    /// Later duplicates of a field overwrite earlier ones. The search
    /// key is only present when at least one token was loose text, so an
    /// empty query yields an empty mapping.
    pub fn parse(&self, query: &str) -> Result<ParsedQuery, QueryError> {
        let mut terms = ParsedQuery::new();
        let mut unassorted = Vec::new();

        for token in tokenize(query)? {
            match self.split_term(&token) {
                Some((field, value)) => {
                    trace!("query term {}:{:?}", field, value);
                    terms.insert(field, value);
                }
                None => unassorted.push(token.text),
            }
        }

        if !unassorted.is_empty() {
            terms.insert(self.search_key.clone(), Some(unassorted.join(" ")));
        }

        Ok(terms)
    }

    fn split_term(&self, token: &Token) -> Option<(String, Option<String>)> {
        let caps = self.term.captures(&token.text)?;
        let field = caps.name("field")?.as_str().to_string();
        match caps.name("value") {
            Some(value) => Some((field, Some(value.as_str().to_string()))),
            // A bare trailing colon only binds when nothing follows it
            // in the input; mid-query it is loose text.
            None if token.at_end => Some((field, None)),
            None => None,
        }
    }
}

fn tokenize(query: &str) -> Result<Vec<Token>, QueryError> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut started = false;
    let mut quote: Option<(char, usize)> = None;

    for (at, c) in query.char_indices() {
        match quote {
            Some((q, _)) if c == q => quote = None,
            Some(_) => text.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some((c, at));
                started = true;
            }
            None if c.is_whitespace() => {
                if started {
                    tokens.push(Token {
                        text: std::mem::take(&mut text),
                        at_end: false,
                    });
                    started = false;
                }
            }
            None => {
                text.push(c);
                started = true;
            }
        }
    }

    if let Some((quote, at)) = quote {
        return Err(QueryError::UnbalancedQuote { quote, at });
    }

    if started {
        tokens.push(Token { text, at_end: true });
    }

    Ok(tokens)
}
