use std::{fmt, io::Cursor, sync::Arc};

use image::{ImageFormat, RgbaImage};

/// An immutable, decoded RGBA8 bitmap.
///
/// Clones share the pixel buffer, so a handle returned to a caller stays
/// valid after the memory tier drops its own reference.
#[derive(Clone)]
pub struct DecodedImage {
    pixels: Arc<RgbaImage>,
}

impl DecodedImage {
    /// Wrap raw RGBA8 pixels. Returns `None` when the buffer length does not
    /// match `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, pixels).map(Self::from)
    }

    /// Decode any format the `image` crate recognises.
    ///
    /// CPU bound; call from a blocking context.
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(Self::from(decoded.into_rgba8()))
    }

    /// Encode as lossless PNG.
    ///
    /// CPU bound; call from a blocking context.
    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut out = Cursor::new(Vec::new());
        self.pixels.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Resident footprint of the pixel buffer, used for memory accounting.
    pub fn byte_size(&self) -> usize {
        self.pixels.as_raw().len()
    }

    pub fn pixels(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// True when both handles point at the same buffer.
    pub fn shares_buffer_with(&self, other: &DecodedImage) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl From<RgbaImage> for DecodedImage {
    fn from(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }
}

impl PartialEq for DecodedImage {
    fn eq(&self, other: &Self) -> bool {
        self.shares_buffer_with(other)
            || (self.width() == other.width()
                && self.height() == other.height()
                && self.pixels() == other.pixels())
    }
}

impl Eq for DecodedImage {}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("bytes", &self.byte_size())
            .finish()
    }
}
