//! Placement of the smoothing window relative to the image.
//!
//! Consider a 5x5 window. Its center `C` splits it into four segments:
//!
//! ```text
//! |x|x|T|x|x|
//! |x|x|T|x|x|
//! |L|L|C|R|R|
//! |x|x|B|x|x|
//! |x|x|B|x|x|
//! ```
//!
//! Pixels closer to an image edge than the matching segment length cannot
//! have a centered window. For those the window is pushed back inside the
//! image and the reference point moves off-center instead.

use std::ops::Range;

use crate::common::Vec2usize;

/// The eight image areas where the window cannot stay centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderRegion {
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl BorderRegion {
    pub const ALL: [BorderRegion; 8] = [
        BorderRegion::TopLeft,
        BorderRegion::Top,
        BorderRegion::TopRight,
        BorderRegion::Left,
        BorderRegion::Right,
        BorderRegion::BottomLeft,
        BorderRegion::Bottom,
        BorderRegion::BottomRight,
    ];

    /// Whether pixels of this region are visited column by column.
    ///
    /// Within the left and right strips the reference point only changes
    /// between columns, within the top and bottom strips only between rows,
    /// so visiting in that order keeps one kernel alive for a whole line.
    pub fn column_major(self) -> bool {
        matches!(self, BorderRegion::Left | BorderRegion::Right)
    }
}

/// Destination pixel ranges of one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegionBounds {
    pub x: Range<usize>,
    pub y: Range<usize>,
}

impl RegionBounds {
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty()
    }

    pub fn pixel_count(&self) -> usize {
        self.x.len() * self.y.len()
    }
}

/// Window segment lengths for an image that fully contains the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WindowGeometry {
    pub image_size: Vec2usize,
    pub window_size: Vec2usize,
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl WindowGeometry {
    pub fn new(image_size: Vec2usize, window_size: Vec2usize) -> Self {
        assert!(
            window_size.x >= 1
                && window_size.y >= 1
                && window_size.x <= image_size.x
                && window_size.y <= image_size.y,
            "window must fit inside the image"
        );

        let center = window_size.center();
        Self {
            image_size,
            window_size,
            top: center.y,
            bottom: window_size.y - center.y - 1,
            left: center.x,
            right: window_size.x - center.x - 1,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2usize {
        Vec2usize::new(self.left, self.top)
    }

    /// Pixels whose window stays centered.
    pub fn interior(&self) -> RegionBounds {
        RegionBounds {
            x: self.inner_x(),
            y: self.inner_y(),
        }
    }

    pub fn bounds(&self, region: BorderRegion) -> RegionBounds {
        let left = 0..self.left;
        let right = self.image_size.x - self.right..self.image_size.x;
        let top = 0..self.top;
        let bottom = self.image_size.y - self.bottom..self.image_size.y;

        let (x, y) = match region {
            BorderRegion::TopLeft => (left, top),
            BorderRegion::Top => (self.inner_x(), top),
            BorderRegion::TopRight => (right, top),
            BorderRegion::Left => (left, self.inner_y()),
            BorderRegion::Right => (right, self.inner_y()),
            BorderRegion::BottomLeft => (left, bottom),
            BorderRegion::Bottom => (self.inner_x(), bottom),
            BorderRegion::BottomRight => (right, bottom),
        };

        RegionBounds { x, y }
    }

    /// Top-left image coordinate of the window used for pixel `p`.
    #[inline]
    pub fn window_corner(&self, p: Vec2usize) -> Vec2usize {
        Vec2usize::new(
            p.x.saturating_sub(self.left)
                .min(self.image_size.x - self.window_size.x),
            p.y.saturating_sub(self.top)
                .min(self.image_size.y - self.window_size.y),
        )
    }

    /// Reference point inside the window used for pixel `p`.
    #[inline]
    pub fn origin_for(&self, p: Vec2usize) -> Vec2usize {
        p - self.window_corner(p)
    }

    fn inner_x(&self) -> Range<usize> {
        self.left..self.image_size.x - self.right
    }

    fn inner_y(&self) -> Range<usize> {
        self.top..self.image_size.y - self.bottom
    }
}
