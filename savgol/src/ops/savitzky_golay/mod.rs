mod cpu;
mod kernel;
mod region;


use serde::{Deserialize, Serialize};

use crate::common::{Error, Result, Vec2usize};
use crate::image::Image;

pub use kernel::{term_count, Factorization, KernelSolver, KernelWeights, KERNEL_ALIGN};
pub use region::BorderRegion;

/// Savitzky-Golay smoothing parameters.
///
/// The window size and the degrees are not independent:
/// `window.x * window.y >= (hor_degree + 1) * (vert_degree + 1)`, and each
/// degree must be smaller than the window extent along its axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SavitzkyGolay {
    /// Window (aperture) size in pixels.
    pub window_size: Vec2usize,
    /// Polynomial degree along x.
    pub hor_degree: usize,
    /// Polynomial degree along y.
    pub vert_degree: usize,
}

impl SavitzkyGolay {
    pub fn new(window_size: Vec2usize, hor_degree: usize, vert_degree: usize) -> Self {
        Self {
            window_size,
            hor_degree,
            vert_degree,
        }
    }

    /// Square window with the same degree on both axes.
    pub fn square(size: usize, degree: usize) -> Self {
        Self::new(Vec2usize::new(size, size), degree, degree)
    }

    /// Recommended settings for scanned documents at the given resolution.
    pub fn for_scan_dpi(dpi: u32) -> Self {
        match dpi {
            0..200 => Self::square(5, 3),
            200..400 => Self::square(7, 4),
            400..800 => Self::square(11, 4),
            _ => Self::square(11, 2),
        }
    }

    /// `None` if the degrees are too large to count.
    pub fn term_count(&self) -> Option<usize> {
        term_count(self.hor_degree, self.vert_degree)
    }

    /// Checks the window/degree constraints without touching any image.
    pub fn validate(&self) -> Result<()> {
        kernel::validate_window(self.window_size, self.hor_degree, self.vert_degree)?;
        Ok(())
    }

    /// Smooths a single-channel 8-bit image.
    ///
    /// The result is tightly packed. If the window does not fit inside the
    /// image no filtering takes place and a copy of `source` is returned.
    ///
    /// # Errors
    /// - [`Error::InvalidPixelFormat`] if `source` is not `L_U8`.
    /// - [`Error::InvalidWindowSize`] / [`Error::InvalidDegree`] if the
    ///   parameters don't describe a well-posed fit.
    pub fn apply(&self, source: &Image) -> Result<Image> {
        let desc = source.desc();
        if !desc.color_format.is_gray_u8() {
            return Err(Error::InvalidPixelFormat(desc.color_format));
        }
        self.validate()?;

        if self.window_size.x > desc.width || self.window_size.y > desc.height {
            tracing::debug!(
                "{}x{} window does not fit {}, returning source unchanged",
                self.window_size.x,
                self.window_size.y,
                desc
            );
            return Ok(source.clone());
        }

        tracing::debug!(
            "Smoothing {} with {}x{} window, degree {}x{}",
            desc,
            self.window_size.x,
            self.window_size.y,
            self.hor_degree,
            self.vert_degree
        );

        cpu::smooth(self, source)
    }
}

/// Smooths `source` with a `window_size` window and the given degrees.
///
/// Shorthand for [`SavitzkyGolay::apply`].
pub fn smooth(
    source: &Image,
    window_size: Vec2usize,
    hor_degree: usize,
    vert_degree: usize,
) -> Result<Image> {
    SavitzkyGolay::new(window_size, hor_degree, vert_degree).apply(source)
}
