use log::{info, warn};

use super::Viewer;
use super::messages::Effect;
use crate::pdf::{RenderBackend, Viewport};
use crate::settings::PreferenceStore;
use crate::theme::THEME_KEY;

impl<B: RenderBackend, S: PreferenceStore, V: Viewport> Viewer<B, S, V> {
    pub fn zoom_in(&mut self) -> Vec<Effect> {
        if !self.zoom.can_zoom_in() {
            return vec![];
        }
        self.set_zoom(self.zoom.stepped_in())
    }

    pub fn zoom_out(&mut self) -> Vec<Effect> {
        if !self.zoom.can_zoom_out() {
            return vec![];
        }
        self.set_zoom(self.zoom.stepped_out())
    }

    /// Scale page 1 to fill the container width. Does nothing before a
    /// document is loaded.
    pub fn fit_to_width(&mut self) -> Vec<Effect> {
        let Some(size) = self.first_page_size else {
            return vec![];
        };
        let level = self
            .zoom
            .fit_to_width(size.width, self.viewport.container_width());
        self.set_zoom(level)
    }

    /// Apply a zoom level. The level is clamped; an unchanged level does
    /// nothing. Otherwise the pages are relaid at the new scale and every
    /// render is redone.
    pub fn set_zoom(&mut self, level: f32) -> Vec<Effect> {
        if level == self.zoom.factor() || !self.zoom.set(level) {
            return vec![];
        }
        self.viewport.apply_zoom(self.zoom.factor());

        let Some(renderer) = &self.renderer else {
            return vec![];
        };
        renderer.set_zoom(self.zoom.factor(), &self.viewport);
        self.update_current_page();
        vec![Effect::DrainRenderQueue]
    }

    /// Flip light/dark and remember the choice
    pub fn toggle_theme(&mut self) -> Vec<Effect> {
        self.theme = self.theme.toggled();
        info!("Theme switched to {}", self.theme);
        if let Err(e) = self.store.set(THEME_KEY, self.theme.as_str()) {
            warn!("Failed to save theme preference: {e}");
        }
        vec![Effect::ApplyTheme(self.theme)]
    }
}
