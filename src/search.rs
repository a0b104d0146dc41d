use rayon::prelude::*;

use crate::table::Row;

/// `true` if the row text contains the query. Both are expected lower-cased.
/// An empty query matches every row.
pub fn row_matches(row_text: &str, query: &str) -> bool {
    query.is_empty() || row_text.contains(query)
}

/// Recompute the visibility of every row for `query` and return how many rows
/// stay visible. Rows are only shown or hidden, never removed or reordered.
pub fn apply(rows: &mut [Row], query: &str) -> usize {
    let query = query.to_lowercase();
    rows.par_iter_mut()
        .map(|row| {
            let visible = row_matches(row.search_text(), &query);
            row.set_visible(visible);
            visible as usize
        })
        .sum()
}
