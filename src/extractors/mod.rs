// src/extractors/mod.rs
//! Entity parsers: one module per page type, plus the shared content guard,
//! pagination reader and death-line grammar.

pub mod bazaar;
pub mod character;
pub mod deaths;
pub mod guard;
pub mod guild;
pub mod highscores;
pub mod house;
pub mod kill_statistics;
pub mod news;
pub mod pagination;
pub mod tibiadata;
pub mod tournament;
pub mod world;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::utils::html::{direct_rows, element_text, selector};

// Re-export key extraction types for convenience
pub use guard::{ContentGuard, ContentState};
pub use pagination::parse_pagination;

static TITLED_TABLE: Lazy<Selector> = Lazy::new(|| selector(r#"table[width="100%"]"#));
static TABLE_CONTAINER: Lazy<Selector> = Lazy::new(|| selector("div.TableContainer"));
static CONTAINER_TITLE: Lazy<Selector> = Lazy::new(|| selector("div.Text"));
static TD: Lazy<Selector> = Lazy::new(|| selector("td"));
static TR: Lazy<Selector> = Lazy::new(|| selector("tr"));
static TABLE: Lazy<Selector> = Lazy::new(|| selector("table"));

/// Whole-document text, whitespace normalized.
pub(crate) fn document_text(document: &Html) -> String {
    element_text(document.root_element())
}

pub(crate) fn contains_text(document: &Html, needle: &str) -> bool {
    document_text(document).contains(needle)
}

pub(crate) fn has_element(document: &Html, selector: &Selector) -> bool {
    document.select(selector).next().is_some()
}

/// `width="100%"` tables keyed by the text of their first cell, with the
/// remaining rows. Used by pages that title each table in its first row.
pub(crate) fn titled_tables(document: &Html) -> Vec<(String, Vec<ElementRef<'_>>)> {
    document
        .select(&TITLED_TABLE)
        .filter_map(|table| {
            let title = element_text(table.select(&TD).next()?);
            let rows = direct_rows(table).into_iter().skip(1).collect();
            Some((title, rows))
        })
        .collect()
}

/// `div.TableContainer` blocks keyed by their caption, with any `[...]`
/// suffix dropped.
pub(crate) fn table_containers(document: &Html) -> Vec<(String, ElementRef<'_>)> {
    document
        .select(&TABLE_CONTAINER)
        .filter_map(|container| {
            let caption = element_text(container.select(&CONTAINER_TITLE).next()?);
            let title = caption.split('[').next().unwrap_or_default().trim().to_string();
            Some((title, container))
        })
        .collect()
}

pub(crate) fn find_section<'s, T>(sections: &'s [(String, T)], title: &str) -> Option<&'s T> {
    sections.iter().find(|(t, _)| t == title).map(|(_, v)| v)
}

/// Every row under `element` that does not itself hold a nested table.
pub(crate) fn leaf_rows(element: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    element
        .select(&TR)
        .filter(|row| row.select(&TABLE).next().is_none())
        .collect()
}

/// Leaf rows of the whole document.
pub(crate) fn document_rows(document: &Html) -> Vec<ElementRef<'_>> {
    leaf_rows(document.root_element())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titled_tables() {
        let doc = Html::parse_document(
            r#"<table width="100%"><tr><td>Character Information</td></tr>
               <tr><td>Name:</td><td>Tschas</td></tr></table>
               <table width="100%"><tr><td>Character Deaths</td></tr></table>"#,
        );
        let tables = titled_tables(&doc);
        assert_eq!(tables.len(), 2);
        assert_eq!(find_section(&tables, "Character Information").map(Vec::len), Some(1));
        assert_eq!(find_section(&tables, "Character Deaths").map(Vec::len), Some(0));
        assert!(find_section(&tables, "Account Information").is_none());
    }

    #[test]
    fn test_table_containers_strip_suffix() {
        let doc = Html::parse_document(
            r#"<div class="TableContainer"><div class="Text">Players Online [Sort by]</div>
               <table><tr><td>x</td></tr></table></div>"#,
        );
        let containers = table_containers(&doc);
        assert_eq!(containers[0].0, "Players Online");
        assert_eq!(leaf_rows(containers[0].1).len(), 1);
    }
}
