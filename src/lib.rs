//! difcodec: the DIF image format in Rust.
//!
//! DIF stores 8-bit gray or RGB rasters at 7-bit precision: each sample is
//! predicted from the previous pixel of the same channel, the zigzag-folded
//! residual is classified into one of four quantization levels, and the
//! level's prefix code plus payload are bit-packed MSB first.
//!
//! The crate provides:
//! - The DIF codec (`dif`)
//! - The in-memory picture model (`picture`)
//! - A binary PNM reader/writer (`pnm`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use difcodec::dif;
//! use difcodec::picture::{ColorType, Picture};
//!
//! let picture = Picture::new(1, 2, ColorType::Gray, vec![10, 12]).unwrap();
//! let bytes = dif::encode(&picture).unwrap();
//! assert_eq!(bytes, [0xFF, 0xD1, 1, 0, 2, 0, 4, 1, 2, 4, 8, 5, 0x80]);
//!
//! let decoded = dif::decode(&bytes).unwrap();
//! assert_eq!(decoded.pixels(), &[10, 12]);
//! ```

pub mod dif;
pub mod io;
pub mod picture;
pub mod pnm;

#[cfg(feature = "cli")]
pub mod cli;

pub use dif::{DifError, decode, encode};
pub use picture::{ColorType, Picture};
