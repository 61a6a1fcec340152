// MSB-first bit packing for the DIF payload.
//
// Fields are packed contiguously with no padding between them, so a single
// byte may hold the tail of one codeword and the head of the next.  The
// final partial byte is zero-filled.

/// Worst-case bits spent on one sample: 3-bit prefix + 8-bit payload.
pub const MAX_BITS_PER_SAMPLE: usize = 11;

/// Slack added on top of the worst-case payload size.
const CAPACITY_MARGIN: usize = 16;

/// Largest field accepted by `write_bits` / `read_bits`.
const MAX_FIELD_BITS: u8 = 32;

/// Byte capacity that can hold `samples` worst-case codewords.
#[inline]
pub fn payload_capacity(samples: usize) -> usize {
    samples
        .saturating_mul(MAX_BITS_PER_SAMPLE)
        .div_ceil(8)
        .saturating_add(CAPACITY_MARGIN)
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BitstreamError {
    /// A write ran past the pre-sized buffer.
    #[error("bit writer overflow: {requested} bits requested, {remaining} remaining")]
    Overflow { requested: u8, remaining: usize },
    /// A read ran past the end of the input.
    #[error("bit reader truncated: {requested} bits requested, {remaining} remaining")]
    Truncated { requested: u8, remaining: usize },
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Bit writer over a fixed-capacity buffer.
///
/// The buffer never grows: callers size it up front with
/// [`payload_capacity`].  Running out of room is reported as
/// [`BitstreamError::Overflow`] before any bit of the field is written.
#[derive(Debug)]
pub struct BitWriter {
    buf: Vec<u8>,
    byte_pos: usize,
    /// Next bit to fill in `buf[byte_pos]`, counted from the MSB.
    bit_pos: u8,
}

impl BitWriter {
    /// Open a writer over a zeroed buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// Total capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bits still available before the capacity bound.
    #[inline]
    pub fn bits_remaining(&self) -> usize {
        (self.buf.len() - self.byte_pos) * 8 - usize::from(self.bit_pos)
    }

    /// Write the `n` least-significant bits of `value`, MSB first.
    pub fn write_bits(&mut self, value: u32, n: u8) -> Result<(), BitstreamError> {
        debug_assert!(n <= MAX_FIELD_BITS);
        let remaining = self.bits_remaining();
        if usize::from(n) > remaining {
            return Err(BitstreamError::Overflow {
                requested: n,
                remaining,
            });
        }

        for i in (0..n).rev() {
            let bit = ((value >> i) & 1) as u8;
            self.buf[self.byte_pos] |= bit << (7 - self.bit_pos);
            self.bit_pos += 1;
            if self.bit_pos == 8 {
                self.byte_pos += 1;
                self.bit_pos = 0;
            }
        }
        Ok(())
    }

    /// Bytes touched so far, counting a partial final byte as used.
    #[inline]
    pub fn bytes_used(&self) -> usize {
        self.byte_pos + usize::from(self.bit_pos > 0)
    }

    /// Consume the writer and return the used prefix of the buffer.
    pub fn into_bytes(mut self) -> Vec<u8> {
        let used = self.bytes_used();
        self.buf.truncate(used);
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Bit reader over an immutable byte slice, MSB first.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// Bits left before the end of the slice.
    #[inline]
    pub fn bits_remaining(&self) -> usize {
        (self.data.len() - self.byte_pos) * 8 - usize::from(self.bit_pos)
    }

    /// Whole bytes not yet touched by any read.
    #[inline]
    pub fn untouched_bytes(&self) -> usize {
        self.data.len() - self.byte_pos - usize::from(self.bit_pos > 0)
    }

    /// Read `n` bits (at most 32) and return them right-aligned.
    pub fn read_bits(&mut self, n: u8) -> Result<u32, BitstreamError> {
        debug_assert!(n <= MAX_FIELD_BITS);
        let remaining = self.bits_remaining();
        if usize::from(n) > remaining {
            return Err(BitstreamError::Truncated {
                requested: n,
                remaining,
            });
        }

        let mut value: u32 = 0;
        for _ in 0..n {
            let bit = (self.data[self.byte_pos] >> (7 - self.bit_pos)) & 1;
            value = (value << 1) | u32::from(bit);
            self.bit_pos += 1;
            if self.bit_pos == 8 {
                self.byte_pos += 1;
                self.bit_pos = 0;
            }
        }
        Ok(value)
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool, BitstreamError> {
        Ok(self.read_bits(1)? == 1)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
