// DIF decoder: header -> table from header widths -> residuals -> picture.

use log::{debug, trace};

use crate::picture::Picture;

use super::bitstream::{BitReader, BitstreamError};
use super::delta::{self, Predictor};
use super::error::DifError;
use super::header::DifHeader;

/// Parse only the header of a DIF stream.
///
/// Returns the header and the payload size in bytes.
pub fn read_header(data: &[u8]) -> Result<(DifHeader, usize), DifError> {
    let (header, used) = DifHeader::parse(data)?;
    Ok((header, data.len() - used))
}

/// Decode a complete DIF byte stream.
///
/// The returned picture has every sample's least-significant bit cleared.
/// Bytes left over after the last sample are ignored.
pub fn decode(data: &[u8]) -> Result<Picture, DifError> {
    let (header, used) = DifHeader::parse(data)?;
    let table = header.table()?;
    let channels = header.color.channels();
    let width = usize::from(header.width);
    let height = usize::from(header.height);

    // Every sample costs at least one shortest codeword; reject headers the
    // payload cannot possibly satisfy before sizing the sample buffer.
    let mut reader = BitReader::new(&data[used..]);
    let min_bits = table.min_codeword_bits();
    let needed_bits = header
        .delta_pixels()
        .saturating_mul(channels)
        .saturating_mul(usize::from(min_bits));
    if needed_bits > reader.bits_remaining() {
        debug!(
            "dif decode: {width}x{height} {} needs at least {needed_bits} payload bits, have {}",
            header.color,
            reader.bits_remaining()
        );
        return Err(BitstreamError::Truncated {
            requested: min_bits,
            remaining: reader.bits_remaining(),
        }
        .into());
    }

    let mut reduced = Vec::with_capacity(width * height * channels);
    reduced.extend_from_slice(&header.seeds);

    let mut predictor = Predictor::seeded(&header.seeds);
    for _ in 0..header.delta_pixels() {
        for channel in 0..channels {
            let folded = table.read_value(&mut reader)?;
            reduced.push(predictor.reconstruct(channel, folded)?);
        }
    }

    let trailing = reader.untouched_bytes();
    if trailing > 0 {
        debug!("dif decode: ignoring {trailing} trailing payload bytes");
    }
    trace!(
        "dif decode: {} payload bytes, {} bits unread",
        data.len() - used,
        reader.bits_remaining()
    );

    let pixels = reduced.into_iter().map(delta::restore).collect();
    debug!(
        "dif decode: {}x{} {} from {} bytes",
        width,
        height,
        header.color,
        data.len()
    );
    Picture::new(width, height, header.color, pixels)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dif::encoder::encode;
    use crate::picture::ColorType;

    const TWO_PIXEL_GRAY: [u8; 13] = [
        0xFF, 0xD1, 0x01, 0x00, 0x02, 0x00, 0x04, 0x01, 0x02, 0x04, 0x08, 0x05, 0x80,
    ];

    #[test]
    fn two_pixel_gray_vector() {
        let pic = decode(&TWO_PIXEL_GRAY).unwrap();
        assert_eq!(pic.width(), 1);
        assert_eq!(pic.height(), 2);
        assert_eq!(pic.color(), ColorType::Gray);
        assert_eq!(pic.pixels(), &[10, 12]);
    }

    #[test]
    fn read_header_reports_payload_size() {
        let (hdr, payload) = read_header(&TWO_PIXEL_GRAY).unwrap();
        assert_eq!(hdr.seeds, vec![5]);
        assert_eq!(payload, 1);
    }

    #[test]
    fn missing_payload_is_truncated() {
        let err = decode(&TWO_PIXEL_GRAY[..12]).unwrap_err();
        assert!(err.is_truncated(), "{err:?}");
    }

    #[test]
    fn oversized_header_over_short_payload_is_truncated() {
        // 65535x65535 RGB, one payload byte.
        let data = [
            0xFF, 0xD3, 0xFF, 0xFF, 0xFF, 0xFF, 0x04, 0x01, 0x02, 0x04, 0x08, 0x00, 0x00, 0x00,
            0x00,
        ];
        let err = decode(&data).unwrap_err();
        assert!(err.is_truncated(), "{err:?}");
        assert!(decode(&data[..14]).unwrap_err().is_truncated());
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut data = TWO_PIXEL_GRAY.to_vec();
        data.extend_from_slice(&[0xAA, 0xBB]);
        assert_eq!(decode(&data).unwrap().pixels(), &[10, 12]);
    }

    #[test]
    fn table_comes_from_header() {
        // Same picture coded with level 1 widened to 3 bits: residual 2 now
        // sits at bound 2 of a 3-bit level, payload 000.
        let data = [
            0xFF, 0xD1, 0x01, 0x00, 0x02, 0x00, 0x04, 0x01, 0x03, 0x04, 0x08, 0x05, 0x80,
        ];
        assert_eq!(decode(&data).unwrap().pixels(), &[10, 12]);
    }

    #[test]
    fn residual_leaving_7_bit_range_is_corrupt() {
        // Seed 0, residual "10 01" = folded 3 = -2.
        let data = [
            0xFF, 0xD1, 0x01, 0x00, 0x02, 0x00, 0x04, 0x01, 0x02, 0x04, 0x08, 0x00, 0x90,
        ];
        assert!(matches!(decode(&data), Err(DifError::Corrupt(_))));
    }

    #[test]
    fn rgb_round_trip_clears_lsb() {
        let pixels: Vec<u8> = (0..4 * 3 * 3).map(|i| (i * 37 % 256) as u8).collect();
        let pic = Picture::new(4, 3, ColorType::Rgb, pixels.clone()).unwrap();
        let back = decode(&encode(&pic).unwrap()).unwrap();
        let expected: Vec<u8> = pixels.iter().map(|p| p & 0xFE).collect();
        assert_eq!(back.pixels(), expected.as_slice());
    }
}
