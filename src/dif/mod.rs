// DIF format implementation.
//
// # Modules
//
// - `bitstream` — MSB-first bit writer/reader over pre-sized buffers
// - `quantizer` — four-level prefix code and quantization table
// - `delta`     — 7-bit reduction, per-channel prediction, zigzag folding
// - `header`    — container header framing and magic numbers
// - `encoder`   — picture to DIF bytes
// - `decoder`   — DIF bytes to picture
// - `error`     — error taxonomy

pub mod bitstream;
pub mod decoder;
pub mod delta;
pub mod encoder;
pub mod error;
pub mod header;
pub mod quantizer;

// Re-export key types for convenience.
pub use bitstream::{BitReader, BitWriter, BitstreamError};
pub use decoder::{decode, read_header};
pub use encoder::encode;
pub use error::DifError;
pub use header::{DifHeader, MAGIC_GRAY, MAGIC_RGB};
pub use quantizer::{Codeword, QuantizationTable};
