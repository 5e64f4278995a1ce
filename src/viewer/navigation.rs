use log::debug;

use super::Viewer;
use super::messages::Effect;
use crate::pdf::{GeometryProvider, RenderBackend, Viewport, closest_to_center};
use crate::settings::PreferenceStore;

impl<B: RenderBackend, S: PreferenceStore, V: Viewport> Viewer<B, S, V> {
    /// Scroll `page` into view. Pages outside `1..=total` are ignored; the
    /// current page follows once the scroll is reported back.
    pub fn go_to(&mut self, page: usize) -> Vec<Effect> {
        if page < 1 || page > self.total_pages {
            debug!("Ignoring jump to page {page} of {}", self.total_pages);
            return vec![];
        }
        vec![Effect::ScrollIntoView(page)]
    }

    pub fn next_page(&mut self) -> Vec<Effect> {
        self.go_to(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> Vec<Effect> {
        match self.current_page.checked_sub(1) {
            Some(page) => self.go_to(page),
            None => vec![],
        }
    }

    /// Jump to the first (or last) page of a surah and close the panel
    pub(super) fn open_chapter(&mut self, number: u32, to_end: bool) -> Vec<Effect> {
        let Some(chapter) = self.catalog.lookup(number) else {
            debug!("Unknown surah {number}");
            return vec![];
        };
        let page = if to_end {
            chapter.end_page
        } else {
            chapter.start_page
        };
        self.panel.close();
        self.go_to(page)
    }

    /// The current page is the one whose center is nearest the viewport
    /// center. Nothing visible leaves it unchanged.
    pub(super) fn update_current_page(&mut self) {
        let pages = self.viewport.pages();
        if let Some(page) = closest_to_center(self.viewport.container(), &pages) {
            self.current_page = page;
        }
    }
}
