//! List query and result types shared by every paginated admin view.
//!
//! A [`ListQuery`] is the complete description of what a list view wants to
//! see: free-text search, named filters, and a pagination cursor. Mutators
//! enforce the page-reset invariant (any search/filter/page-size change
//! returns the view to page 1) and report whether they actually changed
//! anything, so callers only arm the debounce timer on real edits.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Filter criteria plus pagination cursor for one list view.
///
/// Invariant: `page >= 1` and `page_size >= 1` at all times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search_text: String,
    /// Named filters, e.g. `"status" -> "UNDER_REVIEW"` or `"role" -> "ADMIN"`.
    /// BTreeMap keeps query-parameter order stable across identical queries.
    pub filters: BTreeMap<String, String>,
    pub page: u32,
    pub page_size: u32,
}

impl ListQuery {
    /// A fresh query on page 1 with no search text and no filters.
    pub fn new(page_size: u32) -> Self {
        Self {
            search_text: String::new(),
            filters: BTreeMap::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Replaces the search text. Resets to page 1 on change.
    ///
    /// Returns `true` when the query actually changed.
    pub fn set_search(&mut self, text: &str) -> bool {
        if self.search_text == text {
            return false;
        }
        self.search_text = text.to_owned();
        self.page = 1;
        true
    }

    /// Sets (`Some`) or removes (`None`) the named filter. Resets to page 1
    /// on change.
    ///
    /// Returns `true` when the query actually changed.
    pub fn set_filter(&mut self, name: &str, value: Option<&str>) -> bool {
        let changed = match value {
            Some(v) => self.filters.get(name).map(String::as_str) != Some(v),
            None => self.filters.contains_key(name),
        };
        if !changed {
            return false;
        }
        match value {
            Some(v) => {
                self.filters.insert(name.to_owned(), v.to_owned());
            }
            None => {
                self.filters.remove(name);
            }
        }
        self.page = 1;
        true
    }

    /// Changes the page size. Resets to page 1 on change.
    ///
    /// Returns `true` when the query actually changed.
    pub fn set_page_size(&mut self, page_size: u32) -> bool {
        let page_size = page_size.max(1);
        if self.page_size == page_size {
            return false;
        }
        self.page_size = page_size;
        self.page = 1;
        true
    }

    /// Moves to `page` (clamped to a minimum of 1). Does NOT reset anything
    /// else — paging preserves search and filters.
    ///
    /// Returns `true` when the query actually changed.
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if self.page == page {
            return false;
        }
        self.page = page;
        true
    }

    /// Query parameters in wire form: `search` (omitted when empty), each
    /// filter under its own name, then `page` and `pageSize`.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 3);
        if !self.search_text.is_empty() {
            params.push(("search".to_owned(), self.search_text.clone()));
        }
        for (name, value) in &self.filters {
            params.push((name.clone(), value.clone()));
        }
        params.push(("page".to_owned(), self.page.to_string()));
        params.push(("pageSize".to_owned(), self.page_size.to_string()));
        params
    }
}

/// Pagination metadata accompanying a page of rows.
///
/// Invariant: `total_pages == ceil(total / page_size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl PageMeta {
    /// Computes metadata locally for responses that omit a `meta` object.
    pub fn for_total(page: u32, page_size: u32, total: u64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total.div_ceil(page_size as u64) as u32;
        Self {
            page,
            page_size,
            total,
            total_pages,
        }
    }
}

/// One fetched page of rows plus its pagination metadata.
#[derive(Debug, Clone)]
pub struct ListResult<T> {
    pub rows: Vec<T>,
    pub meta: PageMeta,
}

impl<T> ListResult<T> {
    /// The empty result applied on fetch failure: no rows, zero totals, the
    /// query's own cursor preserved so the pager still renders sensibly.
    pub fn empty(query: &ListQuery) -> Self {
        Self {
            rows: Vec::new(),
            meta: PageMeta::for_total(query.page, query.page_size, 0),
        }
    }
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            meta: PageMeta::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_change_resets_page() {
        let mut q = ListQuery::new(20);
        q.set_page(4);
        assert!(q.set_search("acme"));
        assert_eq!(q.page, 1);

        // Identical search text is a no-op and must not reset paging.
        q.set_page(3);
        assert!(!q.set_search("acme"));
        assert_eq!(q.page, 3);
    }

    #[test]
    fn filter_change_resets_page() {
        let mut q = ListQuery::new(20);
        q.set_page(2);
        assert!(q.set_filter("status", Some("REJECTED")));
        assert_eq!(q.page, 1);

        q.set_page(5);
        assert!(!q.set_filter("status", Some("REJECTED")));
        assert_eq!(q.page, 5);

        // Removing an absent filter is a no-op.
        assert!(!q.set_filter("role", None));
        assert_eq!(q.page, 5);

        // Removing a present filter resets.
        assert!(q.set_filter("status", None));
        assert_eq!(q.page, 1);
    }

    #[test]
    fn page_size_change_resets_page() {
        let mut q = ListQuery::new(20);
        q.set_page(7);
        assert!(q.set_page_size(50));
        assert_eq!(q.page, 1);
        assert!(!q.set_page_size(50));
    }

    #[test]
    fn page_is_clamped_to_one() {
        let mut q = ListQuery::new(20);
        assert!(!q.set_page(0));
        assert_eq!(q.page, 1);
    }

    #[test]
    fn params_omit_empty_search_and_keep_stable_order() {
        let mut q = ListQuery::new(10);
        q.set_filter("status", Some("SUBMITTED"));
        q.set_page(2);
        assert_eq!(
            q.to_params(),
            vec![
                ("status".to_owned(), "SUBMITTED".to_owned()),
                ("page".to_owned(), "2".to_owned()),
                ("pageSize".to_owned(), "10".to_owned()),
            ]
        );

        q.set_search("rivera");
        assert_eq!(q.to_params()[0], ("search".to_owned(), "rivera".to_owned()));
        // The search edit reset the cursor.
        assert!(q.to_params().contains(&("page".to_owned(), "1".to_owned())));
    }

    #[test]
    fn meta_total_pages_is_ceiling() {
        assert_eq!(PageMeta::for_total(1, 20, 0).total_pages, 0);
        assert_eq!(PageMeta::for_total(1, 20, 20).total_pages, 1);
        assert_eq!(PageMeta::for_total(1, 20, 21).total_pages, 2);
        assert_eq!(PageMeta::for_total(1, 7, 15).total_pages, 3);
    }
}
