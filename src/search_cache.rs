use std::collections::HashMap;

use tracing::debug;

use crate::models::{PageResult, SearchEntry};

/// Accumulated results per search term. Terms are matched exactly and
/// entries are never evicted.
#[derive(Debug, Default)]
pub struct SearchCache {
    entries: HashMap<String, SearchEntry>,
}

impl SearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `term` has never been merged into the cache.
    pub fn needs_fetch(&self, term: &str) -> bool {
        !self.entries.contains_key(term)
    }

    /// Appends a freshly fetched page to the entry for `term`, creating it on
    /// first use. Hits are not deduplicated across pages.
    pub fn merge(&mut self, term: &str, page: PageResult) {
        let entry = self.entries.entry(term.to_string()).or_default();
        let added = page.hits.len();
        entry.hits.extend(page.hits);
        entry.page = page.page;
        debug!(term, page = page.page, added, total = entry.hits.len(), "merged page into cache");
    }

    /// Removes every hit with the given id from `term`'s entry. The page index
    /// is left alone; unknown terms or ids are ignored.
    pub fn dismiss(&mut self, term: &str, id: &str) {
        if let Some(entry) = self.entries.get_mut(term) {
            let before = entry.hits.len();
            entry.hits.retain(|hit| hit.id != id);
            debug!(term, id, removed = before - entry.hits.len(), "dismissed story");
        }
    }

    pub fn entry(&self, term: &str) -> Option<&SearchEntry> {
        self.entries.get(term)
    }

    /// Last page index seen for `term`, or 0 if it was never fetched.
    pub fn current_page(&self, term: &str) -> u32 {
        self.entries.get(term).map(|entry| entry.page).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::hit;

    fn page(page: u32, ids: &[&str]) -> PageResult {
        PageResult {
            hits: ids.iter().map(|id| hit(id, id)).collect(),
            page,
        }
    }

    fn ids(cache: &SearchCache, term: &str) -> Vec<String> {
        cache
            .entry(term)
            .map(|entry| entry.hits.iter().map(|h| h.id.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn later_pages_extend_earlier_ones() {
        let mut cache = SearchCache::new();
        cache.merge("rust", page(0, &["a", "b"]));
        cache.merge("rust", page(1, &["c", "a"]));

        assert_eq!(ids(&cache, "rust"), vec!["a", "b", "c", "a"]);
        assert_eq!(cache.current_page("rust"), 1);
    }

    #[test]
    fn page_index_is_taken_from_the_source() {
        let mut cache = SearchCache::new();
        cache.merge("rust", page(3, &["a"]));
        cache.merge("rust", page(1, &["b"]));
        assert_eq!(cache.current_page("rust"), 1);
    }

    #[test]
    fn merge_leaves_other_terms_alone() {
        let mut cache = SearchCache::new();
        cache.merge("rust", page(0, &["a"]));
        cache.merge("go", page(0, &["b"]));
        assert_eq!(ids(&cache, "rust"), vec!["a"]);
        assert_eq!(ids(&cache, "go"), vec!["b"]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn needs_fetch_only_for_unseen_terms() {
        let mut cache = SearchCache::new();
        assert_eq!(cache.len(), 0);
        assert!(cache.needs_fetch("rust"));

        cache.merge("rust", page(0, &[]));
        assert!(!cache.needs_fetch("rust"));
        assert!(cache.needs_fetch("Rust"));
        assert_eq!(cache.entry("rust").map(|e| e.len()), Some(0));
    }

    #[test]
    fn dismiss_removes_every_copy() {
        let mut cache = SearchCache::new();
        cache.merge("rust", page(0, &["a", "b"]));
        cache.merge("rust", page(1, &["a", "c"]));

        cache.dismiss("rust", "a");

        assert_eq!(ids(&cache, "rust"), vec!["b", "c"]);
        assert_eq!(cache.current_page("rust"), 1);
    }

    #[test]
    fn dismiss_of_unknown_id_or_term_is_a_no_op() {
        let mut cache = SearchCache::new();
        cache.merge("rust", page(2, &["a", "b"]));
        let before = cache.entry("rust").cloned();

        cache.dismiss("rust", "zzz");
        cache.dismiss("go", "a");

        assert_eq!(cache.entry("rust").cloned(), before);
        assert!(cache.needs_fetch("go"));
    }

    #[test]
    fn current_page_defaults_to_zero() {
        let cache = SearchCache::new();
        assert_eq!(cache.current_page("anything"), 0);
    }
}
