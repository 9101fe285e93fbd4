//! Integration tests for catalog search

mod common;

use common::*;
use mechanic_extensions::{Catalog, CatalogFilter, SearchQuery, StatusFilter};

fn sample_catalog() -> Catalog {
    Catalog::from_records(
        vec![
            RecordBuilder::new("Glyph Browser")
                .with_developer("Alice")
                .with_tags(&["glyph", "ui"])
                .build(),
            RecordBuilder::new("Kern Tool")
                .with_developer("Alice")
                .with_tags(&["kerning"])
                .installed("1.0")
                .build(),
            RecordBuilder::new("Outline Fixer")
                .with_developer("Bob")
                .with_tags(&["ui"])
                .installed("1.0")
                .needing_update()
                .build(),
            RecordBuilder::new("Paid Thing")
                .with_developer("Bob")
                .with_tags(&["glyph"])
                .from_source(OTHER_STREAM)
                .build(),
        ],
        vec![REPO_STREAM.to_string(), OTHER_STREAM.to_string()],
    )
}

fn names(records: Vec<&mechanic_core::types::ExtensionRecord>) -> Vec<&str> {
    records.into_iter().map(|r| r.name.as_str()).collect()
}

#[test]
fn test_empty_query_returns_everything() {
    let catalog = sample_catalog();
    let result = CatalogFilter::filter(&catalog, &SearchQuery::new());
    assert_eq!(result.len(), catalog.len());
}

#[test]
fn test_developer_and_tag_are_anded() {
    let catalog = sample_catalog();
    let query = SearchQuery::new()
        .with_developers(["alice"])
        .with_tags(["ui"]);
    assert_eq!(
        names(CatalogFilter::filter(&catalog, &query)),
        vec!["Glyph Browser"]
    );
}

#[test]
fn test_values_within_an_axis_are_ored() {
    let catalog = sample_catalog();

    let query = SearchQuery::new().with_developers(["ALICE", "carol"]);
    assert_eq!(
        names(CatalogFilter::filter(&catalog, &query)),
        vec!["Glyph Browser", "Kern Tool"]
    );

    let query = SearchQuery::new().with_tags(["kerning", "ui"]);
    assert_eq!(
        names(CatalogFilter::filter(&catalog, &query)),
        vec!["Glyph Browser", "Kern Tool", "Outline Fixer"]
    );
}

#[test]
fn test_tags_are_case_sensitive() {
    let catalog = sample_catalog();
    let query = SearchQuery::new().with_tags(["UI"]);
    assert!(CatalogFilter::filter(&catalog, &query).is_empty());
}

#[test]
fn test_free_text_terms_must_all_match() {
    let catalog = sample_catalog();

    let query = SearchQuery::new().with_text("glyph");
    assert_eq!(
        names(CatalogFilter::filter(&catalog, &query)),
        vec!["Glyph Browser", "Paid Thing"]
    );

    let query = SearchQuery::new().with_text("GLYPH bob");
    assert_eq!(
        names(CatalogFilter::filter(&catalog, &query)),
        vec!["Paid Thing"]
    );

    let query = SearchQuery::new().with_text("fixer description");
    assert_eq!(
        names(CatalogFilter::filter(&catalog, &query)),
        vec!["Outline Fixer"]
    );
}

#[test]
fn test_source_selection_is_not_applied() {
    let catalog = sample_catalog();
    let query = SearchQuery::new().with_sources([OTHER_STREAM]);
    assert_eq!(query.sources.len(), 1);
    assert_eq!(CatalogFilter::filter(&catalog, &query).len(), catalog.len());
}

#[test]
fn test_status_axis() {
    let catalog = sample_catalog();

    let installed = SearchQuery::new().with_status(StatusFilter::Installed);
    assert_eq!(
        names(CatalogFilter::filter(&catalog, &installed)),
        vec!["Kern Tool", "Outline Fixer"]
    );

    let updates = SearchQuery::new()
        .with_status(StatusFilter::UpdatesAvailable)
        .with_developers(["bob"]);
    assert_eq!(
        names(CatalogFilter::filter(&catalog, &updates)),
        vec!["Outline Fixer"]
    );

    let missing = SearchQuery::new().with_status(StatusFilter::NotInstalled);
    assert_eq!(CatalogFilter::filter(&catalog, &missing).len(), 2);
}

#[test]
fn test_filtering_does_not_change_the_catalog() {
    let catalog = sample_catalog();
    let before = catalog.clone();
    let query = SearchQuery::new().with_text("kern").with_tags(["kerning"]);
    let _ = CatalogFilter::filter(&catalog, &query);
    assert_eq!(catalog, before);
}
