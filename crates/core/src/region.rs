//! Screen-space selection rectangles.
//!
//! A [`Region`] is always normalized: regardless of which direction the user
//! dragged, `x1 <= x2` and `y1 <= y2` hold. Construction goes through
//! [`Region::from_points`] so the invariant cannot be broken by a
//! right-to-left or bottom-to-top drag.

/// A rectangular screen area in pixel coordinates.
///
/// `(x1, y1)` is the top-left corner and `(x2, y2)` the bottom-right corner.
/// The region is half-open in neither axis: `width = x2 - x1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Region {
    /// Builds a normalized region from two arbitrary drag points.
    ///
    /// The corners are sorted per axis, so the same region comes out of a
    /// drag no matter which corner the user started from.
    pub fn from_points(ax: i32, ay: i32, bx: i32, by: i32) -> Self {
        Self {
            x1: ax.min(bx),
            y1: ay.min(by),
            x2: ax.max(bx),
            y2: ay.max(by),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        (self.x2 - self.x1) as u32
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        (self.y2 - self.y1) as u32
    }

    /// True when the region covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.x1 == self.x2 || self.y1 == self.y2
    }

    /// Clamps the region to a `bounds_width` x `bounds_height` screen whose
    /// origin is `(0, 0)`.
    ///
    /// A drag that ends off-screen is cut back to the visible part; returns
    /// `None` when nothing visible remains. Never panics on out-of-range
    /// input.
    pub fn clamped(&self, bounds_width: u32, bounds_height: u32) -> Option<Region> {
        let clamped = Region {
            x1: self.x1.clamp(0, bounds_width as i32),
            y1: self.y1.clamp(0, bounds_height as i32),
            x2: self.x2.clamp(0, bounds_width as i32),
            y2: self.y2.clamp(0, bounds_height as i32),
        };

        if clamped.is_empty() {
            None
        } else {
            Some(clamped)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_all_drag_directions() {
        let expected = Region {
            x1: 10,
            y1: 20,
            x2: 110,
            y2: 220,
        };

        // Same rectangle dragged from each of the four corners.
        let drags = [
            (10, 20, 110, 220),
            (110, 220, 10, 20),
            (110, 20, 10, 220),
            (10, 220, 110, 20),
        ];

        for (ax, ay, bx, by) in drags {
            let region = Region::from_points(ax, ay, bx, by);
            assert_eq!(region, expected, "drag ({ax},{ay})->({bx},{by})");
            assert!(region.x1 <= region.x2);
            assert!(region.y1 <= region.y2);
        }
    }

    #[test]
    fn zero_area_region_is_empty() {
        assert!(Region::from_points(5, 5, 5, 5).is_empty());
        assert!(Region::from_points(5, 5, 5, 90).is_empty());
        assert!(Region::from_points(5, 5, 90, 5).is_empty());
        assert!(!Region::from_points(5, 5, 6, 6).is_empty());
    }

    #[test]
    fn clamps_offscreen_drag_to_bounds() {
        // Drag running past the bottom-right corner of a 1920x1080 screen.
        let region = Region::from_points(1800, 1000, 2500, 1500);
        let clamped = region.clamped(1920, 1080).unwrap();
        assert_eq!(
            clamped,
            Region {
                x1: 1800,
                y1: 1000,
                x2: 1920,
                y2: 1080,
            }
        );
    }

    #[test]
    fn clamps_negative_origin() {
        let region = Region::from_points(-50, -20, 100, 80);
        let clamped = region.clamped(1920, 1080).unwrap();
        assert_eq!(clamped, Region::from_points(0, 0, 100, 80));
    }

    #[test]
    fn fully_offscreen_region_clamps_to_none() {
        let region = Region::from_points(2000, 1200, 2500, 1500);
        assert_eq!(region.clamped(1920, 1080), None);
    }

    #[test]
    fn dimensions() {
        let region = Region::from_points(10, 10, 110, 60);
        assert_eq!(region.width(), 100);
        assert_eq!(region.height(), 50);
    }
}
