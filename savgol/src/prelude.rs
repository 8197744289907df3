pub use crate::common::{ChannelCount, ChannelSize, ChannelType, ColorFormat, Vec2usize};
pub use crate::common::{Error, Result};
pub use crate::image::{Image, ImageDesc};
pub use crate::ops::{smooth, SavitzkyGolay};
