//! # Margin Detection
//!
//! Finds the first and last rows that contain any printed dot, so blank
//! leading and trailing rows never reach the printer.

use std::ops::Range;

use super::buffer::PageBuffer;

/// Index of the first row with a set pixel, or the page height if the page
/// is blank.
pub fn first_printable_row(page: &PageBuffer) -> usize {
    (0..page.height())
        .find(|&y| !is_blank(page.row(y)))
        .unwrap_or(page.height())
}

/// Index of the last row with a set pixel, or 0 if the page is blank.
pub fn last_printable_row(page: &PageBuffer) -> usize {
    (0..page.height())
        .rev()
        .find(|&y| !is_blank(page.row(y)))
        .unwrap_or(0)
}

/// Rows `first..=last` as a half-open range; `None` for a blank page.
pub fn printable_rows(page: &PageBuffer) -> Option<Range<usize>> {
    let first = first_printable_row(page);
    if first == page.height() {
        return None;
    }
    Some(first..last_printable_row(page) + 1)
}

#[inline]
fn is_blank(row: &[u8]) -> bool {
    row.iter().all(|&b| b == 0)
}
