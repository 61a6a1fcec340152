// DIF container header.
//
// Layout (16-bit fields little-endian):
//
//   magic      u16   0xD1FF gray, 0xD3FF rgb
//   width      u16
//   height     u16
//   levels     u8    always 4
//   bit widths u8 x levels
//   seeds      u8 x channels (first pixel, reduced)
//
// The bit-packed payload follows immediately and runs to end of input.

use crate::picture::ColorType;

use super::delta::MAX_REDUCED;
use super::error::DifError;
use super::quantizer::{NUM_LEVELS, QuantizationTable};

pub const MAGIC_GRAY: u16 = 0xD1FF;
pub const MAGIC_RGB: u16 = 0xD3FF;

/// Bytes before the seed pixel: magic + width + height + level count + widths.
pub const FIXED_HEADER_LEN: usize = 2 + 2 + 2 + 1 + NUM_LEVELS;

/// Parsed DIF header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifHeader {
    pub color: ColorType,
    pub width: u16,
    pub height: u16,
    /// Payload width of each quantization level.
    pub bit_widths: [u8; NUM_LEVELS],
    /// Reduced value of the first pixel, one per channel.
    pub seeds: Vec<u8>,
}

impl DifHeader {
    pub fn magic(&self) -> u16 {
        magic_for(self.color)
    }

    /// Encoded size of this header in bytes.
    pub fn encoded_len(&self) -> usize {
        FIXED_HEADER_LEN + self.color.channels()
    }

    /// Number of pixels the payload describes (all but the seed pixel).
    pub fn delta_pixels(&self) -> usize {
        (usize::from(self.width) * usize::from(self.height)).saturating_sub(1)
    }

    /// Quantization table rebuilt from `bit_widths`.
    pub fn table(&self) -> Result<QuantizationTable, DifError> {
        QuantizationTable::from_bit_widths(&self.bit_widths)
    }

    /// Append the header to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        debug_assert_eq!(self.seeds.len(), self.color.channels());
        out.reserve(self.encoded_len());
        out.extend_from_slice(&self.magic().to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.push(NUM_LEVELS as u8);
        out.extend_from_slice(&self.bit_widths);
        out.extend_from_slice(&self.seeds);
    }

    /// Parse a header from the start of `data`.
    ///
    /// Returns the header and the number of bytes it occupied.
    pub fn parse(data: &[u8]) -> Result<(Self, usize), DifError> {
        let need = |needed: usize| {
            if data.len() < needed {
                Err(DifError::TruncatedHeader {
                    needed,
                    available: data.len(),
                })
            } else {
                Ok(())
            }
        };

        need(2)?;
        let magic = u16::from_le_bytes([data[0], data[1]]);
        let color = color_for(magic).ok_or(DifError::UnknownMagic(magic))?;

        need(7)?;
        let width = u16::from_le_bytes([data[2], data[3]]);
        let height = u16::from_le_bytes([data[4], data[5]]);
        let levels = data[6];
        if usize::from(levels) != NUM_LEVELS {
            return Err(DifError::LevelCount(levels));
        }
        if width == 0 || height == 0 {
            return Err(DifError::InvalidDimensions {
                width: width.into(),
                height: height.into(),
                channels: color.channels(),
                len: 0,
            });
        }

        let len = FIXED_HEADER_LEN + color.channels();
        need(len)?;
        let mut bit_widths = [0u8; NUM_LEVELS];
        bit_widths.copy_from_slice(&data[7..FIXED_HEADER_LEN]);
        // Validate widths up front so a bad table fails as a header error.
        QuantizationTable::from_bit_widths(&bit_widths)?;

        let seeds = data[FIXED_HEADER_LEN..len].to_vec();
        if let Some(&seed) = seeds.iter().find(|&&s| s > MAX_REDUCED) {
            return Err(DifError::Corrupt(format!(
                "seed value {seed} exceeds 7-bit range"
            )));
        }

        Ok((
            Self {
                color,
                width,
                height,
                bit_widths,
                seeds,
            },
            len,
        ))
    }
}

/// Magic number written for `color`.
pub const fn magic_for(color: ColorType) -> u16 {
    match color {
        ColorType::Gray => MAGIC_GRAY,
        ColorType::Rgb => MAGIC_RGB,
    }
}

/// Channel layout named by `magic`, if it is a DIF magic.
pub const fn color_for(magic: u16) -> Option<ColorType> {
    match magic {
        MAGIC_GRAY => Some(ColorType::Gray),
        MAGIC_RGB => Some(ColorType::Rgb),
        _ => None,
    }
}

/// True when `data` starts with either DIF magic.
pub fn has_dif_magic(data: &[u8]) -> bool {
    match data {
        [a, b, ..] => color_for(u16::from_le_bytes([*a, *b])).is_some(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
