pub(crate) mod aligned_array;
pub(crate) mod color_format;
pub(crate) mod error;
pub(crate) mod vec2;

pub use aligned_array::AlignedArray;
pub use color_format::{ChannelCount, ChannelSize, ChannelType, ColorFormat};
pub use error::{Error, Result};
pub use vec2::Vec2usize;
