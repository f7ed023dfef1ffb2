//! Fixed-size pagination primitives for feeds.
//!
//! Every feed in quill is paginated the same way: a fixed page size,
//! 1-based page numbers, and out-of-range numbers clamped to the nearest
//! valid page instead of erroring.

use serde::{Deserialize, Serialize};

/// Query-string page selector (`?page=N`).
///
/// Parsing is lenient: a value that is not a positive integer reads as
/// no page at all, so `?page=abc` lands on the first page instead of
/// failing extraction.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// Requested 1-based page number.
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Option<u64>,
}

fn lenient_page<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// One page of a feed.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Items on this page, at most `per_page` of them.
    pub items: Vec<T>,
    /// 1-based page number after clamping.
    pub number: u64,
    /// Total number of pages (at least 1, even when empty).
    pub total_pages: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Fixed page size.
    pub per_page: u64,
    /// Whether a next page exists.
    pub has_next: bool,
    /// Whether a previous page exists.
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Assemble a page from fetched items and pagination counts.
    #[must_use]
    pub fn new(items: Vec<T>, number: u64, total_pages: u64, total_items: u64, per_page: u64) -> Self {
        Self {
            items,
            number,
            total_pages,
            total_items,
            per_page,
            has_next: number < total_pages,
            has_previous: number > 1,
        }
    }

    /// An empty first page.
    #[must_use]
    pub fn empty(per_page: u64) -> Self {
        Self::new(Vec::new(), 1, 1, 0, per_page)
    }

    /// Convert the items of this page, keeping the pagination metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            total_pages: self.total_pages,
            total_items: self.total_items,
            per_page: self.per_page,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }

    /// Fallible variant of [`Page::map`].
    pub fn try_map<U, E, F: FnMut(T) -> Result<U, E>>(self, f: F) -> Result<Page<U>, E> {
        Ok(Page {
            items: self
                .items
                .into_iter()
                .map(f)
                .collect::<Result<Vec<_>, E>>()?,
            number: self.number,
            total_pages: self.total_pages,
            total_items: self.total_items,
            per_page: self.per_page,
            has_next: self.has_next,
            has_previous: self.has_previous,
        })
    }
}

/// Resolve a requested page number against the item count.
///
/// Returns `(page, total_pages)`. A missing or zero page resolves to the
/// first page; a number beyond the last page resolves to the last page.
/// An empty feed still has one (empty) page.
#[must_use]
pub fn clamp_page(requested: Option<u64>, total_items: u64, per_page: u64) -> (u64, u64) {
    let total_pages = if total_items == 0 {
        1
    } else {
        total_items.div_ceil(per_page)
    };
    let page = requested.unwrap_or(1).clamp(1, total_pages);
    (page, total_pages)
}
