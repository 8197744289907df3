//! 2D vector with `usize` components for window sizes and reference points.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vec2usize {
    pub x: usize,
    pub y: usize,
}

impl Vec2usize {
    #[inline]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Linear index for row-major layout.
    #[inline]
    pub const fn to_index(self, width: usize) -> usize {
        self.y * width + self.x
    }

    /// Component-wise product, i.e. the sample count of a window.
    #[inline]
    pub const fn area(self) -> usize {
        self.x * self.y
    }

    /// Same as [`Self::area`], `None` on overflow.
    #[inline]
    pub const fn checked_area(self) -> Option<usize> {
        self.x.checked_mul(self.y)
    }

    /// Window center, rounded towards the top-left for even extents.
    #[inline]
    pub const fn center(self) -> Self {
        Self {
            x: self.x / 2,
            y: self.y / 2,
        }
    }
}

impl Add for Vec2usize {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Vec2usize {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl From<(usize, usize)> for Vec2usize {
    #[inline]
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_of_odd_and_even_windows() {
        assert_eq!(Vec2usize::new(7, 5).center(), Vec2usize::new(3, 2));
        assert_eq!(Vec2usize::new(4, 1).center(), Vec2usize::new(2, 0));
    }

    #[test]
    fn checked_area_detects_overflow() {
        assert_eq!(Vec2usize::new(7, 5).checked_area(), Some(35));
        assert_eq!(Vec2usize::new(1 << 33, 1 << 33).checked_area(), None);
        assert_eq!(Vec2usize::new(usize::MAX, 0).checked_area(), Some(0));
    }

    #[test]
    fn to_index_is_row_major() {
        assert_eq!(Vec2usize::new(2, 3).to_index(5), 17);
        assert_eq!(Vec2usize::ZERO.to_index(5), 0);
    }
}
