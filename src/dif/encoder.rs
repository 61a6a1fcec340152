// DIF encoder: picture -> reduced samples -> residuals -> prefix codes.
//
// The payload buffer is sized for the worst case (11 bits per sample) up
// front, so a write overflow means the sizing is wrong, not that the input
// is unusual.  Such an overflow is logged and returned, never skipped.

use log::{debug, error, trace};

use crate::picture::Picture;

use super::bitstream::{self, BitWriter, BitstreamError};
use super::delta::{self, Predictor};
use super::error::DifError;
use super::header::DifHeader;
use super::quantizer::QuantizationTable;

/// Encode `picture` into a complete DIF byte stream.
///
/// Every sample loses its least-significant bit.
pub fn encode(picture: &Picture) -> Result<Vec<u8>, DifError> {
    let (width, height) = dif_dimensions(picture)?;
    let channels = picture.channels();
    let table = QuantizationTable::STANDARD;

    let reduced: Vec<u8> = picture.pixels().iter().map(|&s| delta::reduce(s)).collect();
    let seeds = &reduced[..channels];

    let header = DifHeader {
        color: picture.color(),
        width,
        height,
        bit_widths: table.bit_widths(),
        seeds: seeds.to_vec(),
    };

    let payload = encode_payload(&table, &reduced, channels)?;

    let mut out = Vec::with_capacity(header.encoded_len() + payload.len());
    header.encode(&mut out);
    out.extend_from_slice(&payload);

    debug!(
        "dif encode: {}x{} {}, {} raw bytes -> {} bytes",
        width,
        height,
        picture.color(),
        picture.pixels().len(),
        out.len()
    );
    Ok(out)
}

/// Bit-pack every sample after the seed pixel, channels interleaved.
fn encode_payload(
    table: &QuantizationTable,
    reduced: &[u8],
    channels: usize,
) -> Result<Vec<u8>, DifError> {
    let samples = reduced.len() - channels;
    let capacity = bitstream::payload_capacity(samples);
    let mut writer = BitWriter::with_capacity(capacity);
    let mut predictor = Predictor::seeded(&reduced[..channels]);
    let mut level_counts = [0usize; 4];

    for pixel in reduced[channels..].chunks_exact(channels) {
        for (channel, &current) in pixel.iter().enumerate() {
            let folded = predictor.residual(channel, current);
            level_counts[table.classify(folded)] += 1;
            table.write_value(&mut writer, folded).inspect_err(|e| {
                if matches!(e, DifError::Bitstream(BitstreamError::Overflow { .. })) {
                    error!("dif encode: payload buffer of {capacity} bytes overflowed: {e}");
                }
            })?;
        }
    }

    trace!(
        "dif encode: {samples} samples, level histogram {level_counts:?}, payload {} bytes",
        writer.bytes_used()
    );
    Ok(writer.into_bytes())
}

/// Check that the picture fits the 16-bit DIF dimension fields.
fn dif_dimensions(picture: &Picture) -> Result<(u16, u16), DifError> {
    let invalid = || DifError::InvalidDimensions {
        width: picture.width(),
        height: picture.height(),
        channels: picture.channels(),
        len: picture.pixels().len(),
    };
    let width = u16::try_from(picture.width()).map_err(|_| invalid())?;
    let height = u16::try_from(picture.height()).map_err(|_| invalid())?;
    Ok((width, height))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
