//! Core geometry types for page layout

/// Intrinsic page size in PDF points (scale 1.0)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Size after applying a zoom factor
    #[must_use]
    pub fn scaled(self, scale: f32) -> Self {
        Self::new(self.width * scale, self.height * scale)
    }
}

/// Axis-aligned rectangle in viewport coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    /// Left edge X coordinate
    pub left: f32,
    /// Top edge Y coordinate
    pub top: f32,
    /// Right edge X coordinate
    pub right: f32,
    /// Bottom edge Y coordinate
    pub bottom: f32,
}

impl Bounds {
    #[must_use]
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Horizontal strip with no vertical extent of interest
    #[must_use]
    pub const fn horizontal(left: f32, right: f32) -> Self {
        Self::new(left, 0.0, right, 0.0)
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.left + self.width() / 2.0
    }

    /// True when the rectangle covers no horizontal space
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0)
    }

    /// Strict horizontal overlap; touching edges do not count
    #[must_use]
    pub fn intersects_horizontally(&self, other: &Bounds) -> bool {
        self.right > other.left && self.left < other.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Bounds::horizontal(0.0, 100.0);
        let b = Bounds::horizontal(100.0, 200.0);
        assert!(!a.intersects_horizontally(&b));
        assert!(!b.intersects_horizontally(&a));
    }

    #[test]
    fn nan_width_is_empty() {
        let b = Bounds::horizontal(f32::NAN, 10.0);
        assert!(b.is_empty());
        assert!(Bounds::default().is_empty());
    }
}
