//! Savitzky-Golay smoothing for single-channel 8-bit images.
//!
//! Every output pixel is the value, at that pixel, of a 2D polynomial fitted by
//! least squares to the surrounding window of intensities. The fit is turned
//! into convolution weights once per reference point, so smoothing the image
//! interior costs two 1D convolutions.
//!
//! ```no_run
//! use savgol::prelude::*;
//!
//! let desc = ImageDesc::new(64, 48, ColorFormat::L_U8);
//! let source = Image::new_empty(desc).unwrap();
//! let smoothed = SavitzkyGolay::new(Vec2usize::new(7, 7), 4, 4)
//!     .apply(&source)
//!     .unwrap();
//! assert_eq!(smoothed.desc().width, 64);
//! ```

mod common;
mod image;
mod ops;

pub mod prelude;

pub use prelude::*;

pub use crate::common::{AlignedArray, ChannelCount, ChannelSize, ChannelType, ColorFormat};
pub use crate::common::{Error, Result, Vec2usize};
pub use crate::image::{Image, ImageDesc};
pub use crate::ops::{
    smooth, term_count, BorderRegion, Factorization, KernelSolver, KernelWeights, SavitzkyGolay,
    KERNEL_ALIGN,
};
