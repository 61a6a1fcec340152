// DIF codec error taxonomy.

use super::bitstream::BitstreamError;

/// Errors produced while encoding or decoding DIF data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DifError {
    /// The first two bytes are neither the gray nor the RGB magic.
    #[error("unknown DIF magic {0:#06X}")]
    UnknownMagic(u16),

    /// The header declares a level count other than 4.
    #[error("unsupported quantization level count {0} (expected 4)")]
    LevelCount(u8),

    /// A level width the codec cannot represent.
    #[error("invalid bit width {bits} for quantization level {level}")]
    BitWidth { level: usize, bits: u8 },

    /// The input ends inside the fixed header.
    #[error("truncated DIF header: need {needed} bytes, have {available}")]
    TruncatedHeader { needed: usize, available: usize },

    /// Structurally valid framing carrying impossible sample values.
    #[error("corrupt DIF data: {0}")]
    Corrupt(String),

    /// Zero-sized picture, dimensions beyond 16 bits, or a pixel buffer
    /// whose length disagrees with `width * height * channels`.
    #[error("invalid dimensions: {width}x{height}x{channels} with {len} pixel bytes")]
    InvalidDimensions {
        width: usize,
        height: usize,
        channels: usize,
        len: usize,
    },

    /// Channel count other than 1 or 3.
    #[error("unsupported channel count {0} (expected 1 or 3)")]
    UnsupportedChannels(usize),

    #[error(transparent)]
    Bitstream(#[from] BitstreamError),
}

impl DifError {
    /// Malformed framing or content: magic, level table, header length, or
    /// decoded values.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownMagic(_)
                | Self::LevelCount(_)
                | Self::BitWidth { .. }
                | Self::TruncatedHeader { .. }
                | Self::Corrupt(_)
        )
    }

    /// The payload ended before every sample was decoded.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Bitstream(BitstreamError::Truncated { .. }))
    }
}
