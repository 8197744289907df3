use std::fmt;

#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Default)]
#[repr(u8)]
pub enum ChannelCount {
    #[default]
    L = 1,
    LA = 2,
    Rgb = 3,
    Rgba = 4,
}

#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Default)]
#[repr(u8)]
pub enum ChannelSize {
    #[default]
    _8bit = 1,
    _16bit = 2,
    _32bit = 4,
}

#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Default)]
#[repr(u8)]
pub enum ChannelType {
    #[default]
    UInt,
    Float,
}

/// Pixel layout of an image. Smoothing only accepts [`ColorFormat::L_U8`];
/// the other formats exist so callers can describe what they hold and get a
/// precise error back.
#[derive(Clone, Copy, Debug, Hash, Default, PartialEq, Eq)]
pub struct ColorFormat {
    pub channel_count: ChannelCount,
    pub channel_size: ChannelSize,
    pub channel_type: ChannelType,
}

impl ChannelCount {
    pub fn channel_count(&self) -> u8 {
        *self as u8
    }
}

impl ChannelSize {
    pub fn byte_count(&self) -> u8 {
        *self as u8
    }
}

impl ColorFormat {
    pub const L_U8: ColorFormat = ColorFormat::new(ChannelCount::L, ChannelSize::_8bit);
    pub const L_U16: ColorFormat = ColorFormat::new(ChannelCount::L, ChannelSize::_16bit);
    pub const LA_U8: ColorFormat = ColorFormat::new(ChannelCount::LA, ChannelSize::_8bit);
    pub const RGB_U8: ColorFormat = ColorFormat::new(ChannelCount::Rgb, ChannelSize::_8bit);
    pub const RGBA_U8: ColorFormat = ColorFormat::new(ChannelCount::Rgba, ChannelSize::_8bit);
    pub const L_F32: ColorFormat = ColorFormat {
        channel_count: ChannelCount::L,
        channel_size: ChannelSize::_32bit,
        channel_type: ChannelType::Float,
    };

    const fn new(channel_count: ChannelCount, channel_size: ChannelSize) -> Self {
        Self {
            channel_count,
            channel_size,
            channel_type: ChannelType::UInt,
        }
    }

    /// Bytes per pixel.
    pub fn byte_count(&self) -> u8 {
        self.channel_count.channel_count() * self.channel_size.byte_count()
    }

    pub fn is_gray_u8(&self) -> bool {
        *self == Self::L_U8
    }
}

impl From<(ChannelCount, ChannelSize, ChannelType)> for ColorFormat {
    fn from(value: (ChannelCount, ChannelSize, ChannelType)) -> Self {
        ColorFormat {
            channel_count: value.0,
            channel_size: value.1,
            channel_type: value.2,
        }
    }
}

impl fmt::Display for ChannelCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelCount::L => write!(f, "L"),
            ChannelCount::LA => write!(f, "LA"),
            ChannelCount::Rgb => write!(f, "RGB"),
            ChannelCount::Rgba => write!(f, "RGBA"),
        }
    }
}

impl fmt::Display for ChannelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.byte_count() as u32 * 8)
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelType::UInt => write!(f, "u"),
            ChannelType::Float => write!(f, "f"),
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{}",
            self.channel_count, self.channel_type, self.channel_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_counts() {
        assert_eq!(ColorFormat::L_U8.byte_count(), 1);
        assert_eq!(ColorFormat::L_U16.byte_count(), 2);
        assert_eq!(ColorFormat::RGB_U8.byte_count(), 3);
        assert_eq!(ColorFormat::L_F32.byte_count(), 4);
    }

    #[test]
    fn only_gray_u8_is_gray_u8() {
        assert!(ColorFormat::L_U8.is_gray_u8());
        assert!(ColorFormat::default().is_gray_u8());
        assert!(!ColorFormat::L_U16.is_gray_u8());
        assert!(!ColorFormat::LA_U8.is_gray_u8());
        assert!(!ColorFormat::L_F32.is_gray_u8());
    }

    #[test]
    fn display() {
        assert_eq!(ColorFormat::L_U8.to_string(), "L u8");
        assert_eq!(ColorFormat::L_F32.to_string(), "L f32");
    }
}
