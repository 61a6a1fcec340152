// Four-level quantizer with a static prefix code.
//
//   level  prefix  payload bits  lower bound  covers
//   0      0       1             0            0..=1
//   1      10      2             2            2..=5
//   2      110     4             6            6..=21
//   3      111     8             22           22..=255
//
// The decoder never hard-codes the bounds: they are rebuilt from the
// bit-width array carried in the DIF header.

use super::bitstream::{BitReader, BitWriter};
use super::error::DifError;

/// Number of quantization levels.
pub const NUM_LEVELS: usize = 4;

/// Payload width of each level as written by the encoder.
pub const STANDARD_BIT_WIDTHS: [u8; NUM_LEVELS] = [1, 2, 4, 8];

/// Prefix code `(bits, length)` of each level.
pub const PREFIX_CODES: [(u32, u8); NUM_LEVELS] = [(0b0, 1), (0b10, 2), (0b110, 3), (0b111, 3)];

/// Longest prefix in `PREFIX_CODES`.
pub const MAX_PREFIX_LEN: u8 = 3;

/// True when no code equals another or is a prefix of it.
pub const fn prefix_free(codes: &[(u32, u8)]) -> bool {
    let mut i = 0;
    while i < codes.len() {
        let mut j = 0;
        while j < codes.len() {
            if i != j {
                let (a, a_len) = codes[i];
                let (b, b_len) = codes[j];
                if a_len <= b_len && (b >> (b_len - a_len)) == a {
                    return false;
                }
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(prefix_free(&PREFIX_CODES));

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// One quantization bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    /// Payload width in bits.
    pub bits: u8,
    /// Smallest value in the bucket.
    pub bound: u16,
}

impl Level {
    /// One past the largest value in the bucket.
    #[inline]
    pub fn end(self) -> u32 {
        u32::from(self.bound) + (1u32 << self.bits)
    }
}

/// A complete codeword: prefix followed by payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codeword {
    pub level: usize,
    pub prefix: u32,
    pub prefix_len: u8,
    pub payload: u32,
    pub payload_len: u8,
}

/// Immutable level table: bit widths plus cumulative lower bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizationTable {
    levels: [Level; NUM_LEVELS],
}

impl QuantizationTable {
    /// The table every encoder writes.
    pub const STANDARD: Self = Self::build(STANDARD_BIT_WIDTHS);

    const fn build(widths: [u8; NUM_LEVELS]) -> Self {
        let mut levels = [Level { bits: 0, bound: 0 }; NUM_LEVELS];
        let mut bound: u16 = 0;
        let mut i = 0;
        while i < NUM_LEVELS {
            levels[i] = Level {
                bits: widths[i],
                bound,
            };
            bound += 1 << widths[i];
            i += 1;
        }
        Self { levels }
    }

    /// Rebuild a table from the per-level widths stored in a DIF header.
    ///
    /// Each width must lie in `1..=8` so that a payload fits a byte.
    pub fn from_bit_widths(widths: &[u8]) -> Result<Self, DifError> {
        let widths: [u8; NUM_LEVELS] = widths
            .try_into()
            .map_err(|_| DifError::LevelCount(widths.len().min(u8::MAX as usize) as u8))?;
        for (level, &bits) in widths.iter().enumerate() {
            if !(1..=8).contains(&bits) {
                return Err(DifError::BitWidth { level, bits });
            }
        }
        Ok(Self::build(widths))
    }

    #[inline]
    pub fn levels(&self) -> &[Level; NUM_LEVELS] {
        &self.levels
    }

    pub fn bit_widths(&self) -> [u8; NUM_LEVELS] {
        self.levels.map(|l| l.bits)
    }

    /// Length of the shortest codeword (prefix plus payload) in bits.
    pub fn min_codeword_bits(&self) -> u8 {
        self.levels
            .iter()
            .zip(PREFIX_CODES)
            .map(|(level, (_, prefix_len))| prefix_len + level.bits)
            .min()
            .unwrap_or(0)
    }

    /// True when the buckets tile `0..=255` exactly, without gaps or overlaps.
    pub fn covers_byte_range(&self) -> bool {
        let mut next = 0u32;
        for level in &self.levels {
            if u32::from(level.bound) != next {
                return false;
            }
            next = level.end();
        }
        next == 256
    }

    /// Smallest level whose range contains `value`.
    ///
    /// Values past the last bucket fall into the last level; `encode` then
    /// reports them as unrepresentable.
    #[inline]
    pub fn classify(&self, value: u8) -> usize {
        self.levels
            .iter()
            .position(|l| u32::from(value) < l.end())
            .unwrap_or(NUM_LEVELS - 1)
    }

    /// Split `value` into its prefix and payload.
    pub fn encode(&self, value: u8) -> Result<Codeword, DifError> {
        let level = self.classify(value);
        let Level { bits, bound } = self.levels[level];
        let payload = u32::from(value)
            .checked_sub(u32::from(bound))
            .filter(|p| *p < 1 << bits)
            .ok_or_else(|| {
                DifError::Corrupt(format!("value {value} not covered by quantization table"))
            })?;
        let (prefix, prefix_len) = PREFIX_CODES[level];
        Ok(Codeword {
            level,
            prefix,
            prefix_len,
            payload,
            payload_len: bits,
        })
    }

    /// Rebuild a value from its level and payload.
    pub fn reconstruct(&self, level: usize, payload: u32) -> Result<u8, DifError> {
        let value = u32::from(self.levels[level].bound) + payload;
        u8::try_from(value).map_err(|_| {
            DifError::Corrupt(format!("decoded value {value} exceeds 255 at level {level}"))
        })
    }

    /// Encode `value` and append it to `w`.
    pub fn write_value(&self, w: &mut BitWriter, value: u8) -> Result<(), DifError> {
        let cw = self.encode(value)?;
        w.write_bits(cw.prefix, cw.prefix_len)?;
        w.write_bits(cw.payload, cw.payload_len)?;
        Ok(())
    }

    /// Read one prefix and return its level. Consumes at most three bits.
    pub fn read_level(r: &mut BitReader<'_>) -> Result<usize, DifError> {
        if !r.read_bit()? {
            return Ok(0);
        }
        if !r.read_bit()? {
            return Ok(1);
        }
        Ok(if r.read_bit()? { 3 } else { 2 })
    }

    /// Read a complete codeword and return the value it carries.
    pub fn read_value(&self, r: &mut BitReader<'_>) -> Result<u8, DifError> {
        let level = Self::read_level(r)?;
        let payload = r.read_bits(self.levels[level].bits)?;
        self.reconstruct(level, payload)
    }
}

impl Default for QuantizationTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn bit_len(cw: Codeword) -> u8 {
        cw.prefix_len + cw.payload_len
    }

    #[test]
    fn standard_bounds() {
        let bounds: Vec<u16> = QuantizationTable::STANDARD
            .levels()
            .iter()
            .map(|l| l.bound)
            .collect();
        assert_eq!(bounds, vec![0, 2, 6, 22]);
        assert_eq!(QuantizationTable::STANDARD.bit_widths(), STANDARD_BIT_WIDTHS);
    }

    #[test]
    fn standard_table_tiles_byte_range() {
        let t = QuantizationTable::STANDARD;
        assert!(t.covers_byte_range());
        let levels = t.levels();
        for pair in levels.windows(2) {
            assert!(pair[0].bound < pair[1].bound);
        }
    }

    #[test]
    fn prefix_codes_are_prefix_free() {
        assert!(prefix_free(&PREFIX_CODES));
        for (i, &(a, a_len)) in PREFIX_CODES.iter().enumerate() {
            assert!(a_len <= MAX_PREFIX_LEN);
            for (j, &(b, b_len)) in PREFIX_CODES.iter().enumerate() {
                if i == j {
                    continue;
                }
                assert_ne!((a, a_len), (b, b_len));
                if a_len <= b_len {
                    assert_ne!(b >> (b_len - a_len), a, "{i} is a prefix of {j}");
                }
            }
        }
    }

    #[test]
    fn prefix_free_detects_violations() {
        assert!(!prefix_free(&[(0b1, 1), (0b10, 2)]));
        assert!(!prefix_free(&[(0b01, 2), (0b01, 2)]));
        assert!(prefix_free(&[(0b0, 1), (0b1, 1)]));
    }

    #[test]
    fn classify_thresholds() {
        let t = QuantizationTable::STANDARD;
        for v in 0..=255u8 {
            let expected = match v {
                0..=1 => 0,
                2..=5 => 1,
                6..=21 => 2,
                _ => 3,
            };
            assert_eq!(t.classify(v), expected, "value {v}");
        }
    }

    #[test]
    fn every_byte_round_trips() {
        let t = QuantizationTable::STANDARD;
        for v in 0..=255u8 {
            let mut w = BitWriter::with_capacity(2);
            t.write_value(&mut w, v).unwrap();
            let bytes = w.into_bytes();
            let mut r = BitReader::new(&bytes);
            assert_eq!(t.read_value(&mut r).unwrap(), v);
        }
    }

    #[test]
    fn codeword_lengths() {
        let t = QuantizationTable::STANDARD;
        assert_eq!(bit_len(t.encode(0).unwrap()), 2);
        assert_eq!(bit_len(t.encode(5).unwrap()), 4);
        assert_eq!(bit_len(t.encode(21).unwrap()), 7);
        assert_eq!(bit_len(t.encode(255).unwrap()), 11);
        assert_eq!(t.min_codeword_bits(), 2);
    }

    #[test]
    fn min_codeword_bits_follows_widths() {
        let t = QuantizationTable::from_bit_widths(&[8, 1, 1, 8]).unwrap();
        assert_eq!(t.min_codeword_bits(), 3);

        let cw = t.encode(2).unwrap();
        assert_eq!((cw.prefix, cw.prefix_len), (0b10, 2));
        assert_eq!((cw.payload, cw.payload_len), (0, 2));
    }

    #[test]
    fn from_bit_widths_validates() {
        assert_eq!(
            QuantizationTable::from_bit_widths(&[1, 2, 4, 8]).unwrap(),
            QuantizationTable::STANDARD
        );
        assert_eq!(
            QuantizationTable::from_bit_widths(&[1, 2, 4]),
            Err(DifError::LevelCount(3))
        );
        assert_eq!(
            QuantizationTable::from_bit_widths(&[1, 0, 4, 8]),
            Err(DifError::BitWidth { level: 1, bits: 0 })
        );
        assert_eq!(
            QuantizationTable::from_bit_widths(&[1, 2, 4, 9]),
            Err(DifError::BitWidth { level: 3, bits: 9 })
        );
    }

    #[test]
    fn non_standard_widths_decode_with_their_own_bounds() {
        let t = QuantizationTable::from_bit_widths(&[2, 2, 2, 8]).unwrap();
        assert_eq!(t.levels()[3].bound, 12);
        assert!(!t.covers_byte_range());
        // Level 3 payload 250 + bound 12 overflows a byte.
        assert!(matches!(t.reconstruct(3, 250), Err(DifError::Corrupt(_))));
        assert_eq!(t.reconstruct(3, 243).unwrap(), 255);
    }

    #[test]
    fn read_level_needs_bits() {
        let data = [0b1100_0000];
        let mut r = BitReader::new(&data[..0]);
        assert!(QuantizationTable::read_level(&mut r).unwrap_err().is_truncated());
        let mut r = BitReader::new(&data);
        assert_eq!(QuantizationTable::read_level(&mut r).unwrap(), 2);
    }
}
