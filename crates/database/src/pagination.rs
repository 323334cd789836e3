//! Page math for the invoices table.

/// Rows per page of the invoices table.
pub const ITEMS_PER_PAGE: i64 = 6;

/// The row offset of a 1-based page. Pages below 1 are treated as page 1.
pub fn offset_for_page(page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(ITEMS_PER_PAGE)
}

/// How many pages `count` matching rows fill.
pub fn total_pages(count: i64) -> i64 {
    if count <= 0 {
        return 0;
    }
    (count + ITEMS_PER_PAGE - 1) / ITEMS_PER_PAGE
}

/// The ILIKE pattern for a free-text search. `%` and `_` typed by the user keep
/// their wildcard meaning.
pub fn search_pattern(query: &str) -> String {
    format!("%{query}%")
}
