// src/models/pagination.rs
use serde::Serialize;

/// One page of a paginated listing, possibly extended with later pages.
///
/// `1 <= page <= total_pages`; once `fully_fetched` is set, `entries` holds
/// every result and `entries.len() == results`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedSummary<T> {
    pub page: u32,
    pub total_pages: u32,
    pub results: u32,
    pub entries: Vec<T>,
    pub fully_fetched: bool,
}

impl<T> Default for PaginatedSummary<T> {
    fn default() -> Self {
        Self::single_page(Vec::new())
    }
}

impl<T> PaginatedSummary<T> {
    pub fn new(page: u32, total_pages: u32, results: u32, entries: Vec<T>) -> Self {
        let total_pages = total_pages.max(1);
        let page = page.clamp(1, total_pages);
        let fully_fetched = total_pages == 1 && entries.len() as u32 == results;
        PaginatedSummary { page, total_pages, results, entries, fully_fetched }
    }

    /// A listing without pagination: everything is on this page.
    pub fn single_page(entries: Vec<T>) -> Self {
        let results = entries.len() as u32;
        PaginatedSummary { page: 1, total_pages: 1, results, entries, fully_fetched: true }
    }

    /// Appends the entries of a later page.
    pub fn extend(&mut self, more: impl IntoIterator<Item = T>) {
        self.entries.extend(more);
        if self.entries.len() as u32 >= self.results {
            self.mark_fully_fetched();
        }
    }

    /// Marks every page as aggregated, aligning `results` with what was collected.
    pub fn mark_fully_fetched(&mut self) {
        self.results = self.entries.len() as u32;
        self.fully_fetched = true;
    }

    pub fn is_consistent(&self) -> bool {
        let pages_ok = 1 <= self.page && self.page <= self.total_pages;
        pages_ok && (!self.fully_fetched || self.entries.len() as u32 == self.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page_is_fully_fetched() {
        let summary = PaginatedSummary::single_page(vec![1, 2, 3]);
        assert!(summary.fully_fetched);
        assert_eq!((summary.page, summary.total_pages, summary.results), (1, 1, 3));
        assert!(summary.is_consistent());
    }

    #[test]
    fn test_extend_until_complete() {
        let mut summary = PaginatedSummary::new(1, 2, 4, vec!['a', 'b']);
        assert!(!summary.fully_fetched);
        summary.extend(vec!['c', 'd']);
        assert!(summary.fully_fetched);
        assert_eq!(summary.entries.len(), 4);
        assert!(summary.is_consistent());
    }

    #[test]
    fn test_new_clamps_pages() {
        let summary: PaginatedSummary<u8> = PaginatedSummary::new(0, 0, 0, vec![]);
        assert_eq!((summary.page, summary.total_pages), (1, 1));
        assert!(summary.fully_fetched);
        assert!(summary.is_consistent());
    }
}
