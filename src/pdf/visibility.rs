//! Visible-page detection
//!
//! Pages scroll horizontally, one page width per page. A page is visible when
//! its horizontal extent overlaps the container's. The geometry comes from a
//! [`GeometryProvider`] so hosts can hand in real layout rectangles and tests
//! can hand in synthetic ones.

use std::collections::BTreeSet;

use super::types::Bounds;

/// Default number of pages rendered ahead of and behind each visible page
pub const DEFAULT_RENDER_BUFFER: usize = 2;

/// Source of on-screen rectangles for the container and each page
pub trait GeometryProvider {
    /// The scroll container, or `None` if it is not laid out
    fn container(&self) -> Option<Bounds>;

    /// Page rectangles in page order; index 0 is page 1
    fn pages(&self) -> Vec<Bounds>;
}

/// Pages (1-based) whose horizontal extent intersects the container
#[must_use]
pub fn compute_visible_pages(container: Option<Bounds>, pages: &[Bounds]) -> BTreeSet<usize> {
    let Some(container) = container else {
        return BTreeSet::new();
    };
    if container.is_empty() {
        return BTreeSet::new();
    }

    pages
        .iter()
        .enumerate()
        .filter(|(_, page)| page.intersects_horizontally(&container))
        .map(|(index, _)| index + 1)
        .collect()
}

/// Every visible page plus `radius` neighbours on each side, clamped to
/// `[1, total]`
#[must_use]
pub fn expand_with_buffer(
    visible: &BTreeSet<usize>,
    radius: usize,
    total: usize,
) -> BTreeSet<usize> {
    let mut expanded = BTreeSet::new();
    if total == 0 {
        return expanded;
    }

    for &page in visible {
        let first = page.saturating_sub(radius).max(1);
        let last = page.saturating_add(radius).min(total);
        expanded.extend(first..=last);
    }
    expanded
}

/// Page whose center is closest to the container center. Ties go to the
/// lowest page number.
#[must_use]
pub fn closest_to_center(container: Option<Bounds>, pages: &[Bounds]) -> Option<usize> {
    let container = container?;
    let center = container.center_x();

    let mut best: Option<(usize, f32)> = None;
    for (index, page) in pages.iter().enumerate() {
        let distance = (page.center_x() - center).abs();
        match best {
            Some((_, best_distance)) if !(distance < best_distance) => {}
            _ => best = Some((index + 1, distance)),
        }
    }
    best.map(|(page, _)| page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(count: usize, width: f32, offset: f32) -> Vec<Bounds> {
        (0..count)
            .map(|i| {
                let left = i as f32 * width - offset;
                Bounds::horizontal(left, left + width)
            })
            .collect()
    }

    fn set(pages: &[usize]) -> BTreeSet<usize> {
        pages.iter().copied().collect()
    }

    #[test]
    fn expand_in_the_middle() {
        assert_eq!(expand_with_buffer(&set(&[5]), 2, 10), set(&[3, 4, 5, 6, 7]));
    }

    #[test]
    fn expand_clamps_at_lower_bound() {
        assert_eq!(expand_with_buffer(&set(&[1]), 2, 10), set(&[1, 2, 3]));
    }

    #[test]
    fn expand_clamps_at_upper_bound() {
        assert_eq!(expand_with_buffer(&set(&[10]), 2, 10), set(&[8, 9, 10]));
    }

    #[test]
    fn expand_merges_overlapping_ranges() {
        assert_eq!(
            expand_with_buffer(&set(&[4, 5]), 1, 10),
            set(&[3, 4, 5, 6])
        );
    }

    #[test]
    fn expand_empty_document() {
        assert!(expand_with_buffer(&set(&[1]), 2, 0).is_empty());
    }

    #[test]
    fn visible_pages_in_scrolled_strip() {
        let pages = strip(10, 100.0, 250.0);
        let container = Some(Bounds::horizontal(0.0, 200.0));
        // Page 3 spans [-50, 50], page 4 [50, 150], page 5 [150, 250]
        assert_eq!(compute_visible_pages(container, &pages), set(&[3, 4, 5]));
    }

    #[test]
    fn no_pages_is_empty() {
        let container = Some(Bounds::horizontal(0.0, 200.0));
        assert!(compute_visible_pages(container, &[]).is_empty());
    }

    #[test]
    fn missing_or_collapsed_container_is_empty() {
        let pages = strip(3, 100.0, 0.0);
        assert!(compute_visible_pages(None, &pages).is_empty());
        let collapsed = Some(Bounds::horizontal(40.0, 40.0));
        assert!(compute_visible_pages(collapsed, &pages).is_empty());
    }

    #[test]
    fn off_screen_container_sees_nothing() {
        let pages = strip(3, 100.0, 0.0);
        let container = Some(Bounds::horizontal(1000.0, 1200.0));
        assert!(compute_visible_pages(container, &pages).is_empty());
    }

    #[test]
    fn closest_to_center_picks_middle_page() {
        let pages = strip(10, 100.0, 250.0);
        let container = Some(Bounds::horizontal(0.0, 200.0));
        assert_eq!(closest_to_center(container, &pages), Some(4));
    }

    #[test]
    fn closest_to_center_ties_go_to_first() {
        let pages = strip(2, 100.0, 0.0);
        let container = Some(Bounds::horizontal(0.0, 200.0));
        assert_eq!(closest_to_center(container, &pages), Some(1));
    }

    #[test]
    fn closest_to_center_without_pages() {
        let container = Some(Bounds::horizontal(0.0, 200.0));
        assert_eq!(closest_to_center(container, &[]), None);
    }
}
