// In-memory raster picture shared by the codec and the PNM layer.

use crate::dif::DifError;

/// Channel layout of a picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorType {
    Gray,
    Rgb,
}

impl ColorType {
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
        }
    }

    pub const fn from_channels(channels: usize) -> Option<Self> {
        match channels {
            1 => Some(Self::Gray),
            3 => Some(Self::Rgb),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Rgb => "rgb",
        }
    }
}

impl std::fmt::Display for ColorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 8-bit picture with row-major, channel-interleaved samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    width: usize,
    height: usize,
    color: ColorType,
    pixels: Vec<u8>,
}

impl Picture {
    /// Wrap a pixel buffer, checking that it holds exactly
    /// `width * height * channels` bytes and that neither dimension is zero.
    pub fn new(
        width: usize,
        height: usize,
        color: ColorType,
        pixels: Vec<u8>,
    ) -> Result<Self, DifError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(color.channels()));
        if width == 0 || height == 0 || expected != Some(pixels.len()) {
            return Err(DifError::InvalidDimensions {
                width,
                height,
                channels: color.channels(),
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            color,
            pixels,
        })
    }

    /// Same as [`Picture::new`] with a raw channel count.
    pub fn from_channels(
        width: usize,
        height: usize,
        channels: usize,
        pixels: Vec<u8>,
    ) -> Result<Self, DifError> {
        let color = ColorType::from_channels(channels).ok_or(DifError::UnsupportedChannels(channels))?;
        Self::new(width, height, color, pixels)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn color(&self) -> ColorType {
        self.color
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.color.channels()
    }

    /// Number of pixels (`width * height`).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}
