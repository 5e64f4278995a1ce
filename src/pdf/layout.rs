//! Horizontal page strip layout
//!
//! Lays pages out left to right at the active zoom, separated by a fixed gap,
//! inside a viewport that scrolls horizontally. This is the geometry a host
//! without its own layout engine hands to the renderer.

use super::types::{Bounds, PageSize};
use super::visibility::GeometryProvider;

/// Geometry a viewer can also rearrange: relayout after a load, rescale on
/// zoom, resize, and scroll a page into view.
pub trait Viewport: GeometryProvider {
    /// Replace the laid-out pages with `page_count` pages of `page_size`
    fn lay_out(&mut self, page_count: usize, page_size: PageSize);

    fn apply_zoom(&mut self, factor: f32);

    fn resize(&mut self, width: f32, height: f32);

    /// Scroll so `page` is centered. Returns false for unknown pages.
    fn scroll_into_view(&mut self, page: usize) -> bool;

    /// Width available to pages
    fn container_width(&self) -> f32 {
        self.container().map(|c| c.width()).unwrap_or(0.0)
    }
}

/// Gap between pages in pixels
pub const PAGE_GAP: f32 = 16.0;
/// Padding before the first and after the last page
pub const STRIP_PADDING: f32 = 16.0;

#[derive(Clone, Debug)]
pub struct StripLayout {
    page_sizes: Vec<PageSize>,
    zoom: f32,
    viewport_width: f32,
    viewport_height: f32,
    gap: f32,
    scroll_x: f32,
}

impl StripLayout {
    #[must_use]
    pub fn new(page_sizes: Vec<PageSize>, viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            page_sizes,
            zoom: 1.0,
            viewport_width: viewport_width.max(0.0),
            viewport_height: viewport_height.max(0.0),
            gap: PAGE_GAP,
            scroll_x: 0.0,
        }
    }

    /// Every page shares the same intrinsic size
    #[must_use]
    pub fn uniform(count: usize, size: PageSize, viewport_width: f32, viewport_height: f32) -> Self {
        Self::new(vec![size; count], viewport_width, viewport_height)
    }

    #[must_use]
    pub fn with_gap(mut self, gap: f32) -> Self {
        self.gap = gap.max(0.0);
        self
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_sizes.len()
    }

    #[must_use]
    pub fn scroll_x(&self) -> f32 {
        self.scroll_x
    }

    #[must_use]
    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    /// Total scrollable width at the current zoom
    #[must_use]
    pub fn content_width(&self) -> f32 {
        if self.page_sizes.is_empty() {
            return 0.0;
        }
        let pages: f32 = self.page_sizes.iter().map(|s| s.width * self.zoom).sum();
        let gaps = self.gap * (self.page_sizes.len() - 1) as f32;
        STRIP_PADDING * 2.0 + pages + gaps
    }

    #[must_use]
    pub fn max_scroll(&self) -> f32 {
        (self.content_width() - self.viewport_width).max(0.0)
    }

    /// Scroll to an absolute offset, clamped. Returns true if it moved.
    pub fn scroll_to(&mut self, x: f32) -> bool {
        let clamped = if x.is_finite() {
            x.clamp(0.0, self.max_scroll())
        } else {
            0.0
        };
        if clamped == self.scroll_x {
            return false;
        }
        self.scroll_x = clamped;
        true
    }

    /// Scroll so the page's center sits at the viewport center, as far as the
    /// scroll range allows. Out-of-range pages are ignored.
    pub fn scroll_into_view(&mut self, page: usize) -> bool {
        let Some((left, width)) = self.page_extent(page) else {
            return false;
        };
        self.scroll_to(left + width / 2.0 - self.viewport_width / 2.0)
    }

    /// Change zoom, keeping the point at the viewport center anchored
    pub fn set_zoom(&mut self, zoom: f32) {
        let old_width = self.content_width();
        let anchor = if old_width > 0.0 {
            (self.scroll_x + self.viewport_width / 2.0) / old_width
        } else {
            0.0
        };
        self.zoom = zoom;
        let target = anchor * self.content_width() - self.viewport_width / 2.0;
        self.scroll_to(target);
    }

    /// Resize the viewport; the scroll offset is re-clamped
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport_width = width.max(0.0);
        self.viewport_height = height.max(0.0);
        self.scroll_x = self.scroll_x.clamp(0.0, self.max_scroll());
    }

    /// Absolute left edge and scaled width of a 1-based page
    fn page_extent(&self, page: usize) -> Option<(f32, f32)> {
        if page == 0 || page > self.page_sizes.len() {
            return None;
        }
        let left = STRIP_PADDING
            + self.page_sizes[..page - 1]
                .iter()
                .map(|s| s.width * self.zoom + self.gap)
                .sum::<f32>();
        Some((left, self.page_sizes[page - 1].width * self.zoom))
    }
}

impl Viewport for StripLayout {
    fn lay_out(&mut self, page_count: usize, page_size: PageSize) {
        self.page_sizes = vec![page_size; page_count];
        self.scroll_x = 0.0;
    }

    fn apply_zoom(&mut self, factor: f32) {
        self.set_zoom(factor);
    }

    fn resize(&mut self, width: f32, height: f32) {
        StripLayout::resize(self, width, height);
    }

    fn scroll_into_view(&mut self, page: usize) -> bool {
        StripLayout::scroll_into_view(self, page)
    }
}

impl GeometryProvider for StripLayout {
    fn container(&self) -> Option<Bounds> {
        Some(Bounds::new(
            0.0,
            0.0,
            self.viewport_width,
            self.viewport_height,
        ))
    }

    fn pages(&self) -> Vec<Bounds> {
        let mut left = STRIP_PADDING - self.scroll_x;
        self.page_sizes
            .iter()
            .map(|size| {
                let scaled = size.scaled(self.zoom);
                let bounds = Bounds::new(left, 0.0, left + scaled.width, scaled.height);
                left += scaled.width + self.gap;
                bounds
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::visibility::{closest_to_center, compute_visible_pages};
    use super::*;

    fn layout() -> StripLayout {
        StripLayout::uniform(10, PageSize::new(400.0, 600.0), 800.0, 600.0).with_gap(0.0)
    }

    #[test]
    fn content_width_includes_padding_and_gaps() {
        let layout = StripLayout::uniform(3, PageSize::new(100.0, 100.0), 50.0, 50.0);
        assert_eq!(layout.content_width(), 32.0 + 300.0 + 32.0);
    }

    #[test]
    fn scroll_into_view_centers_page() {
        let mut layout = layout();
        assert!(layout.scroll_into_view(5));
        // Page 5 starts at 16 + 4 * 400 = 1616, center 1816
        assert_eq!(layout.scroll_x(), 1816.0 - 400.0);
        let current = closest_to_center(layout.container(), &layout.pages());
        assert_eq!(current, Some(5));
    }

    #[test]
    fn scroll_into_view_clamps_at_edges() {
        let mut layout = layout();
        layout.scroll_into_view(10);
        assert_eq!(layout.scroll_x(), layout.max_scroll());
        layout.scroll_into_view(1);
        assert_eq!(layout.scroll_x(), 0.0);
    }

    #[test]
    fn scroll_into_view_ignores_missing_pages() {
        let mut layout = layout();
        assert!(!layout.scroll_into_view(0));
        assert!(!layout.scroll_into_view(11));
        assert_eq!(layout.scroll_x(), 0.0);
    }

    #[test]
    fn zoom_scales_pages() {
        let mut layout = layout();
        layout.set_zoom(2.0);
        let pages = layout.pages();
        assert_eq!(pages[0].width(), 800.0);
        let visible = compute_visible_pages(layout.container(), &pages);
        assert_eq!(visible.into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn resize_reclamps_scroll() {
        let mut layout = layout();
        layout.scroll_to(f32::MAX);
        let before = layout.scroll_x();
        layout.resize(1600.0, 600.0);
        assert_eq!(layout.scroll_x(), layout.max_scroll());
        assert!(layout.scroll_x() < before);
    }
}
