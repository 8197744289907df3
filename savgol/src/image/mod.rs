mod stride;


use crate::common::{ColorFormat, Error, Result};

use stride::{add_stride_padding, align_stride, strip_stride_padding};

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct ImageDesc {
    pub width: usize,
    pub height: usize,
    /// Bytes per row, at least `width * bytes_per_pixel`.
    pub stride: usize,
    pub color_format: ColorFormat,
}

/// An owned image with row stride. Rows are laid out top to bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    desc: ImageDesc,
    bytes: Vec<u8>,
}

impl Image {
    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Allocates a zero-filled image.
    pub fn new_empty(desc: ImageDesc) -> Result<Image> {
        desc.validate()?;

        let bytes = vec![0; desc.size_in_bytes()];

        Ok(Image { desc, bytes })
    }

    pub fn new_with_data(desc: ImageDesc, bytes: Vec<u8>) -> Result<Image> {
        desc.validate()?;

        if bytes.len() != desc.size_in_bytes() {
            return Err(Error::InvalidImageData(format!(
                "bytes length {} does not match expected size {}",
                bytes.len(),
                desc.size_in_bytes()
            )));
        }

        Ok(Image { desc, bytes })
    }

    /// Wraps tightly packed 8-bit grayscale pixels.
    pub fn from_gray_u8(width: usize, height: usize, pixels: Vec<u8>) -> Result<Image> {
        let desc = ImageDesc {
            width,
            height,
            stride: width,
            color_format: ColorFormat::L_U8,
        };
        Self::new_with_data(desc, pixels)
    }

    /// Pixel bytes of row `y`, without stride padding.
    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.desc.stride;
        &self.bytes[start..start + self.desc.row_bytes()]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.desc.stride;
        let row_bytes = self.desc.row_bytes();
        &mut self.bytes[start..start + row_bytes]
    }

    /// Returns an image whose stride equals its row length.
    pub fn packed(self) -> Image {
        if self.desc.is_packed() {
            return self;
        }

        let bytes = strip_stride_padding(
            &self.bytes,
            self.desc.row_bytes(),
            self.desc.height,
            self.desc.stride,
        );

        Image {
            desc: ImageDesc {
                stride: self.desc.row_bytes(),
                ..self.desc
            },
            bytes,
        }
    }

    /// Returns an image whose rows are padded to a 4-byte boundary.
    pub fn with_stride(self) -> Image {
        let aligned_stride = align_stride(self.desc.row_bytes());
        if self.desc.stride == aligned_stride {
            return self;
        }

        let packed = self.packed();
        let bytes = add_stride_padding(
            &packed.bytes,
            packed.desc.row_bytes(),
            packed.desc.height,
            aligned_stride,
        );

        Image {
            desc: ImageDesc {
                stride: aligned_stride,
                ..packed.desc
            },
            bytes,
        }
    }
}

impl ImageDesc {
    /// Descriptor with a 4-byte aligned stride.
    pub fn new(width: usize, height: usize, color_format: ColorFormat) -> Self {
        let stride = align_stride(width * color_format.byte_count() as usize);

        Self {
            width,
            height,
            stride,
            color_format,
        }
    }

    /// Descriptor with no row padding.
    pub fn new_packed(width: usize, height: usize, color_format: ColorFormat) -> Self {
        Self {
            width,
            height,
            stride: width * color_format.byte_count() as usize,
            color_format,
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        self.height * self.stride
    }

    /// Bytes per row without padding.
    pub fn row_bytes(&self) -> usize {
        self.width * self.color_format.byte_count() as usize
    }

    pub fn is_packed(&self) -> bool {
        self.stride == self.row_bytes()
    }

    pub fn validate(&self) -> Result<()> {
        if self.stride < self.row_bytes() {
            return Err(Error::InvalidImageData(format!(
                "stride {} is smaller than row length {}",
                self.stride,
                self.row_bytes()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for ImageDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.color_format)
    }
}
