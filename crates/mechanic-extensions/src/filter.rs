//! Catalog search
//!
//! A query combines free-text terms with facet selections. Values selected
//! on one axis are OR'd, axes are AND'd, and an axis with nothing selected
//! does not constrain the result.

use crate::catalog::Catalog;
use mechanic_core::types::ExtensionRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Installation state axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusFilter {
    #[default]
    All,
    Installed,
    NotInstalled,
    UpdatesAvailable,
}

impl StatusFilter {
    fn matches(&self, record: &ExtensionRecord) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Installed => record.is_installed,
            StatusFilter::NotInstalled => !record.is_installed,
            StatusFilter::UpdatesAvailable => record.needs_update,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "installed" => Ok(StatusFilter::Installed),
            "not-installed" => Ok(StatusFilter::NotInstalled),
            "updates" | "updates-available" => Ok(StatusFilter::UpdatesAvailable),
            other => Err(format!("unknown status filter '{}'", other)),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Installed => write!(f, "installed"),
            StatusFilter::NotInstalled => write!(f, "not-installed"),
            StatusFilter::UpdatesAvailable => write!(f, "updates-available"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Lower-cased terms; every one must occur in the record's search text
    pub terms: Vec<String>,

    /// Developer names, matched case-insensitively
    pub developers: BTreeSet<String>,

    /// Tags, matched verbatim
    pub tags: BTreeSet<String>,

    /// Source selection. Kept with the query but not used for matching.
    pub sources: BTreeSet<String>,

    pub status: StatusFilter,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split free text on whitespace into lower-cased terms
    pub fn parse_terms(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_lowercase).collect()
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.terms = Self::parse_terms(text);
        self
    }

    pub fn with_developers<I, S>(mut self, developers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.developers.extend(developers.into_iter().map(Into::into));
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources.extend(sources.into_iter().map(Into::into));
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    /// True when no axis constrains the result
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
            && self.developers.is_empty()
            && self.tags.is_empty()
            && self.status == StatusFilter::All
    }

    pub fn matches(&self, record: &ExtensionRecord) -> bool {
        self.matches_terms(record)
            && self.matches_developer(record)
            && self.matches_tags(record)
            && self.status.matches(record)
    }

    fn matches_terms(&self, record: &ExtensionRecord) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let haystack = record.search_string();
        self.terms.iter().all(|term| haystack.contains(term.as_str()))
    }

    fn matches_developer(&self, record: &ExtensionRecord) -> bool {
        self.developers.is_empty()
            || self
                .developers
                .iter()
                .any(|developer| developer.to_lowercase() == record.developer.to_lowercase())
    }

    fn matches_tags(&self, record: &ExtensionRecord) -> bool {
        self.tags.is_empty() || self.tags.iter().any(|tag| record.tags.contains(tag))
    }
}

/// Read-only view over a catalog narrowed by a query
pub struct CatalogFilter;

impl CatalogFilter {
    /// Records matching the query, in catalog order
    pub fn filter<'a>(catalog: &'a Catalog, query: &SearchQuery) -> Vec<&'a ExtensionRecord> {
        catalog
            .records()
            .iter()
            .filter(|record| query.matches(record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_terms() {
        assert_eq!(
            SearchQuery::parse_terms("  Glyph  Draw\tTools "),
            vec!["glyph", "draw", "tools"]
        );
        assert!(SearchQuery::parse_terms("   ").is_empty());
    }

    #[test]
    fn test_status_filter_from_str() {
        assert_eq!(
            "installed".parse::<StatusFilter>().unwrap(),
            StatusFilter::Installed
        );
        assert_eq!(
            "Updates".parse::<StatusFilter>().unwrap(),
            StatusFilter::UpdatesAvailable
        );
        assert!("broken".parse::<StatusFilter>().is_err());
        assert_eq!(StatusFilter::NotInstalled.to_string(), "not-installed");
    }

    #[test]
    fn test_sources_do_not_count_as_constraint() {
        let query = SearchQuery::new().with_sources(["https://a.example/x.json"]);
        assert!(query.is_empty());
    }
}
