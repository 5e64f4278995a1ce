//! Zoom state for page rendering
//!
//! Holds the active scale factor and the bounds it must stay within. All
//! mutation goes through methods that clamp, so the factor is always a valid
//! render scale.

/// Horizontal padding subtracted from the container before fitting a page
pub const FIT_WIDTH_PADDING: f32 = 32.0;

/// Zoom factor with its allowed range
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zoom {
    /// Current zoom factor (1.0 = 100%)
    factor: f32,
    min: f32,
    max: f32,
    step: f32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            factor: 1.0,
            min: Self::MIN_SCALE,
            max: Self::MAX_SCALE,
            step: Self::STEP,
        }
    }
}

impl Zoom {
    /// Minimum allowed zoom factor
    pub const MIN_SCALE: f32 = 0.5;
    /// Maximum allowed zoom factor
    pub const MAX_SCALE: f32 = 3.0;
    /// Increment per zoom step
    pub const STEP: f32 = 0.25;

    /// Zoom with custom bounds; swapped bounds are reordered
    #[must_use]
    pub fn with_bounds(min: f32, max: f32, step: f32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let step = step.abs();
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            Self::STEP
        };
        let mut zoom = Self {
            factor: 1.0,
            min,
            max,
            step,
        };
        zoom.factor = zoom.clamp_factor(1.0);
        zoom
    }

    #[must_use]
    pub fn factor(&self) -> f32 {
        self.factor
    }

    #[must_use]
    pub fn min(&self) -> f32 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Factor rounded to a whole percentage for display
    #[must_use]
    pub fn percent(&self) -> u32 {
        (self.factor * 100.0).round() as u32
    }

    #[must_use]
    pub fn can_zoom_in(&self) -> bool {
        self.factor < self.max
    }

    #[must_use]
    pub fn can_zoom_out(&self) -> bool {
        self.factor > self.min
    }

    /// Factor one step in, without applying it
    #[must_use]
    pub fn stepped_in(&self) -> f32 {
        self.clamp_factor(self.factor + self.step)
    }

    /// Factor one step out, without applying it
    #[must_use]
    pub fn stepped_out(&self) -> f32 {
        self.clamp_factor(self.factor - self.step)
    }

    /// Set a new factor, clamped. Returns true if the factor changed.
    pub fn set(&mut self, factor: f32) -> bool {
        let clamped = self.clamp_factor(factor);
        if clamped == self.factor {
            return false;
        }
        self.factor = clamped;
        true
    }

    /// Scale that makes a page of `page_width` fill `container_width`
    /// minus padding, clamped into bounds. Degenerate inputs keep the
    /// current factor.
    #[must_use]
    pub fn fit_to_width(&self, page_width: f32, container_width: f32) -> f32 {
        let usable = container_width - FIT_WIDTH_PADDING;
        if !(page_width > 0.0) || !(usable > 0.0) {
            return self.factor;
        }
        self.clamp_factor(usable / page_width)
    }

    /// Clamp factor to valid range, handling NaN/Inf
    #[must_use]
    pub fn clamp_factor(&self, factor: f32) -> f32 {
        if !factor.is_finite() {
            1.0_f32.clamp(self.min, self.max)
        } else {
            factor.clamp(self.min, self.max)
        }
    }
}
