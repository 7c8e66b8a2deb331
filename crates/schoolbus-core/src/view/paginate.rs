// ── Paginator ──

use std::num::NonZeroUsize;

/// `{ currentPage, itemsPerPage }`. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    current: usize,
    per_page: NonZeroUsize,
}

impl PageState {
    pub const fn new(per_page: NonZeroUsize) -> Self {
        Self {
            current: 1,
            per_page,
        }
    }

    /// Request a page; 0 is treated as 1.
    #[must_use]
    pub const fn at(mut self, page: usize) -> Self {
        self.current = if page == 0 { 1 } else { page };
        self
    }

    pub const fn current(&self) -> usize {
        self.current
    }

    pub const fn per_page(&self) -> NonZeroUsize {
        self.per_page
    }

    /// Snap the current page into `[1, max(1, total_pages)]`.
    #[must_use]
    pub fn clamped(self, filtered_count: usize) -> Self {
        let pages = total_pages(filtered_count, self.per_page);
        let current = if filtered_count == 0 {
            1
        } else {
            self.current.clamp(1, pages)
        };
        Self { current, ..self }
    }
}

/// `ceil(count / per_page)`; 0 when there is nothing to show.
pub fn total_pages(count: usize, per_page: NonZeroUsize) -> usize {
    count.div_ceil(per_page.get())
}

/// Page count for display: never below 1.
pub fn display_total_pages(count: usize, per_page: NonZeroUsize) -> usize {
    total_pages(count, per_page).max(1)
}

/// `items[(page-1)*size .. page*size]`, clipped to the slice bounds.
pub fn page_slice<T>(items: &[T], page: PageState) -> &[T] {
    let size = page.per_page.get();
    let start = page.current.saturating_sub(1).saturating_mul(size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn per(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn slices_windows() {
        let items: Vec<u32> = (1..=7).collect();
        let page = PageState::new(per(3));
        assert_eq!(page_slice(&items, page), &[1, 2, 3]);
        assert_eq!(page_slice(&items, page.at(3)), &[7]);
        assert!(page_slice(&items, page.at(4)).is_empty());
    }

    #[test]
    fn total_pages_rounds_up_and_displays_at_least_one() {
        assert_eq!(total_pages(7, per(3)), 3);
        assert_eq!(total_pages(6, per(3)), 2);
        assert_eq!(total_pages(0, per(3)), 0);
        assert_eq!(display_total_pages(0, per(3)), 1);
    }

    #[test]
    fn clamping_holds_for_every_count_and_size() {
        for size in 1..=5 {
            for count in 0..=20 {
                for requested in 0..=10 {
                    let page = PageState::new(per(size)).at(requested).clamped(count);
                    let upper = display_total_pages(count, per(size));
                    assert!(
                        (1..=upper).contains(&page.current()),
                        "count={count} size={size} requested={requested} got={}",
                        page.current()
                    );
                }
            }
        }
    }

    #[test]
    fn clamping_keeps_valid_page() {
        assert_eq!(PageState::new(per(3)).at(2).clamped(7).current(), 2);
        assert_eq!(PageState::new(per(3)).at(3).clamped(6).current(), 2);
        assert_eq!(PageState::new(per(3)).at(3).clamped(0).current(), 1);
    }
}
