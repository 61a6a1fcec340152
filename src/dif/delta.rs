// Per-channel spatial prediction and zigzag folding.
//
// Every sample is first reduced to 7 bits (`>> 1`).  Each channel then
// predicts from the previous pixel in raster order, and the signed
// residual in -127..=127 is folded onto 0..=254 so that small magnitudes of
// either sign become small unsigned values.

use super::error::DifError;

/// Largest reduced sample value.
pub const MAX_REDUCED: u8 = u8::MAX >> 1;

/// Drop the least-significant bit of an 8-bit sample.
#[inline]
pub fn reduce(sample: u8) -> u8 {
    sample >> 1
}

/// Bring a 7-bit sample back to 8-bit range (LSB cleared).
#[inline]
pub fn restore(reduced: u8) -> u8 {
    reduced << 1
}

/// Fold a signed residual: `d >= 0 -> 2d`, `d < 0 -> -2d - 1`.
#[inline]
pub fn zigzag_encode(diff: i16) -> u8 {
    debug_assert!((-128..=127).contains(&diff));
    if diff >= 0 {
        (diff * 2) as u8
    } else {
        (-diff * 2 - 1) as u8
    }
}

/// Inverse of [`zigzag_encode`].
#[inline]
pub fn zigzag_decode(folded: u8) -> i16 {
    let v = i16::from(folded);
    if v & 1 == 1 { -(v + 1) / 2 } else { v / 2 }
}

/// Previous reduced value of every channel.
#[derive(Debug, Clone)]
pub struct Predictor {
    prev: Vec<u8>,
}

impl Predictor {
    /// Start a chain from the first pixel's reduced channel values.
    pub fn seeded(seeds: &[u8]) -> Self {
        Self {
            prev: seeds.to_vec(),
        }
    }

    /// Encode side: fold the residual of `current` against the prediction
    /// and make `current` the next prediction.
    #[inline]
    pub fn residual(&mut self, channel: usize, current: u8) -> u8 {
        let diff = i16::from(current) - i16::from(self.prev[channel]);
        self.prev[channel] = current;
        zigzag_encode(diff)
    }

    /// Decode side: unfold `folded`, apply it to the prediction and return
    /// the reconstructed reduced value.
    #[inline]
    pub fn reconstruct(&mut self, channel: usize, folded: u8) -> Result<u8, DifError> {
        let current = i16::from(self.prev[channel]) + zigzag_decode(folded);
        if !(0..=i16::from(MAX_REDUCED)).contains(&current) {
            return Err(DifError::Corrupt(format!(
                "reconstructed sample {current} out of 7-bit range on channel {channel}"
            )));
        }
        let current = current as u8;
        self.prev[channel] = current;
        Ok(current)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
