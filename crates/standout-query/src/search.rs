//! Free-text search over extracted string fields.
//!
//! Matching is case-insensitive substring containment: an item matches when
//! any of its search fields contains the term.

use std::fmt;
use std::sync::Arc;

/// A normalized (trimmed, lowercased) search term.
///
/// Blank input produces no term, which disables searching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchTerm {
    folded: String,
}

impl SearchTerm {
    /// Normalizes `raw`, returning `None` if nothing is left after trimming.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(SearchTerm {
            folded: fold(trimmed),
        })
    }

    /// Returns the normalized term.
    pub fn as_str(&self) -> &str {
        &self.folded
    }

    /// Returns `true` if `field` contains the term, ignoring case.
    pub fn matches(&self, field: &str) -> bool {
        fold(field).contains(&self.folded)
    }

    /// Returns `true` if any of `fields` contains the term.
    pub fn matches_any<I, S>(&self, fields: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fields.into_iter().any(|field| self.matches(field.as_ref()))
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.folded)
    }
}

fn fold(s: &str) -> String {
    s.to_lowercase()
}

/// Extracts the searchable strings of an item and tests them against a term.
pub(crate) struct SearchFields<T> {
    test: Arc<dyn Fn(&T, &SearchTerm) -> bool + Send + Sync>,
}

impl<T: 'static> SearchFields<T> {
    pub(crate) fn new<E, I, S>(extractor: E) -> Self
    where
        E: Fn(&T) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        SearchFields {
            test: Arc::new(move |item: &T, term: &SearchTerm| term.matches_any(extractor(item))),
        }
    }
}

impl<T> SearchFields<T> {
    pub(crate) fn matches(&self, item: &T, term: &SearchTerm) -> bool {
        (self.test)(item, term)
    }
}

impl<T> Clone for SearchFields<T> {
    fn clone(&self) -> Self {
        SearchFields {
            test: Arc::clone(&self.test),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_terms_disable_search() {
        assert!(SearchTerm::new("").is_none());
        assert!(SearchTerm::new("   \t").is_none());
    }

    #[test]
    fn term_is_trimmed_and_folded() {
        let term = SearchTerm::new("  ShOe ").unwrap();
        assert_eq!(term.as_str(), "shoe");
        assert_eq!(term.to_string(), "shoe");
    }

    #[test]
    fn matches_ignoring_case() {
        let term = SearchTerm::new("shoe").unwrap();
        assert!(term.matches("Red Shoe"));
        assert!(term.matches("SHOELACE"));
        assert!(!term.matches("Blue Hat"));
    }

    #[test]
    fn inner_whitespace_is_kept() {
        let term = SearchTerm::new("red shoe").unwrap();
        assert!(term.matches("Big Red Shoe"));
        assert!(!term.matches("Red  Shoe"));
    }

    #[test]
    fn matches_any_field() {
        let term = SearchTerm::new("hat").unwrap();
        assert!(term.matches_any(["Blue", "Hat"]));
        assert!(!term.matches_any(["Blue", "Shoe"]));
        assert!(!term.matches_any(Vec::<String>::new()));
    }

    #[test]
    fn search_fields_erase_extractor() {
        struct Item {
            name: String,
            brand: String,
        }
        let fields = SearchFields::new(|i: &Item| [i.name.clone(), i.brand.clone()]);
        let item = Item {
            name: "Runner".into(),
            brand: "Acme".into(),
        };
        assert!(fields.matches(&item, &SearchTerm::new("acme").unwrap()));
        assert!(!fields.matches(&item, &SearchTerm::new("zen").unwrap()));
    }
}
