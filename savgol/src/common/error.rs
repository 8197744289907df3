use thiserror::Error;

use crate::common::color_format::ColorFormat;
use crate::common::vec2::Vec2usize;

/// Errors reported by image construction and smoothing.
///
/// All of them are detected before any buffer is allocated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid pixel format: {0}, expected single channel 8-bit")]
    InvalidPixelFormat(ColorFormat),

    /// Degrees are unsigned, so a negative degree cannot be expressed. This
    /// reports a degree not below the window extent on its axis instead: such
    /// an axis has too few distinct coordinates and the fit loses rank.
    #[error(
        "Invalid polynomial degree {hor_degree}x{vert_degree} for {}x{} window: \
         degree must be less than the window extent on its axis",
        .window_size.x, .window_size.y
    )]
    InvalidDegree {
        window_size: Vec2usize,
        hor_degree: usize,
        vert_degree: usize,
    },

    /// Also reported when the term or sample count overflows `usize`.
    #[error(
        "Invalid window size {}x{}: {terms} polynomial terms need at least as many samples",
        .window_size.x, .window_size.y
    )]
    InvalidWindowSize { window_size: Vec2usize, terms: usize },

    #[error("Invalid image data: {0}")]
    InvalidImageData(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_format_message_names_format() {
        let err = Error::InvalidPixelFormat(ColorFormat::RGB_U8);
        assert_eq!(
            err.to_string(),
            "Invalid pixel format: RGB u8, expected single channel 8-bit"
        );
    }

    #[test]
    fn degree_message_names_window() {
        let err = Error::InvalidDegree {
            window_size: Vec2usize::new(9, 1),
            hor_degree: 0,
            vert_degree: 1,
        };
        assert_eq!(
            err.to_string(),
            "Invalid polynomial degree 0x1 for 9x1 window: \
             degree must be less than the window extent on its axis"
        );
    }

    #[test]
    fn window_size_message() {
        let err = Error::InvalidWindowSize {
            window_size: Vec2usize::new(2, 2),
            terms: 9,
        };
        assert_eq!(
            err.to_string(),
            "Invalid window size 2x2: 9 polynomial terms need at least as many samples"
        );
    }
}
