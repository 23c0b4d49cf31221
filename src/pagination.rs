//! Page slicing over a result set.
//!
//! All boundary handling lives in [`ResultSetPager::page`]; next/previous are
//! just index arithmetic routed back through it, so out-of-range requests are
//! clamped instead of failing.

use crate::domain::ResultPage;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_VISIBLE_PAGES: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultSetPager;

impl ResultSetPager {
    /// Slice `items` to page `index` (1-based). `index` is clamped into
    /// `[1, total_pages]` and a zero `size` is treated as 1.
    pub fn page<T: Clone>(items: &[T], index: usize, size: usize) -> ResultPage<T> {
        let size = size.max(1);
        let total = items.len();
        if total == 0 {
            return ResultPage::empty(size);
        }

        let last = total.div_ceil(size);
        let index = index.clamp(1, last);
        let start = (index - 1) * size;
        let end = (start + size).min(total);

        ResultPage {
            items: items[start..end].to_vec(),
            index,
            size,
            total,
        }
    }

    pub fn next_page<T: Clone>(items: &[T], current: usize, size: usize) -> ResultPage<T> {
        Self::page(items, current.saturating_add(1), size)
    }

    pub fn previous_page<T: Clone>(items: &[T], current: usize, size: usize) -> ResultPage<T> {
        Self::page(items, current.saturating_sub(1), size)
    }
}
