// File-level helpers for PNM <-> DIF conversion.
//
// Provides `encode_file()` and `decode_file()` convenience functions that
// read the whole input, convert it in memory, and only then write the
// output through a temporary file renamed into place, so neither a failed
// conversion nor a failed write leaves a partial output behind.
// Optionally computes SHA-256 digests of written files (feature-gated
// behind `file-io`).

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::dif::{self, DifError};
use crate::picture::Picture;
use crate::pnm::{self, PnmError};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `encode_file()`.
#[derive(Debug, Clone)]
pub struct EncodeStats {
    /// PNM input file size in bytes.
    pub input_size: u64,
    /// Uncompressed sample bytes (`width * height * channels`).
    pub raw_size: u64,
    /// DIF output size in bytes.
    pub output_size: u64,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    /// SHA-256 of the DIF output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

impl EncodeStats {
    /// Output size relative to the raw sample size.
    pub fn ratio(&self) -> f64 {
        if self.raw_size == 0 {
            0.0
        } else {
            self.output_size as f64 / self.raw_size as f64
        }
    }
}

/// Statistics returned by `decode_file()`.
#[derive(Debug, Clone)]
pub struct DecodeStats {
    /// DIF input file size in bytes.
    pub input_size: u64,
    /// PNM output size in bytes.
    pub output_size: u64,
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    /// SHA-256 of the PNM output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file conversion.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Input is not a binary PNM file.
    #[error("{} is not a binary PNM (P5/P6) file", .0.display())]
    NotPnm(PathBuf),
    /// PNM parsing error.
    #[error("PNM error: {0}")]
    Pnm(#[from] PnmError),
    /// DIF encoding or decoding error.
    #[error("DIF error: {0}")]
    Dif(#[from] DifError),
}

// ---------------------------------------------------------------------------
// Sniffing
// ---------------------------------------------------------------------------

/// File type recognised from its leading magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Dif,
    Pnm,
    Unknown,
}

/// Classify `data` by its first two bytes.
pub fn sniff(data: &[u8]) -> FileKind {
    if dif::header::has_dif_magic(data) {
        FileKind::Dif
    } else if pnm::has_pnm_magic(data) {
        FileKind::Pnm
    } else {
        FileKind::Unknown
    }
}

/// Classify the file at `path` by its magic bytes.
pub fn sniff_file(path: &Path) -> io::Result<FileKind> {
    let mut magic = Vec::with_capacity(2);
    File::open(path)?.take(2).read_to_end(&mut magic)?;
    Ok(sniff(&magic))
}

/// True when `path` can be opened and starts with a DIF magic.
pub fn is_dif_file(path: &Path) -> bool {
    matches!(sniff_file(path), Ok(FileKind::Dif))
}

/// True when `path` can be opened and starts with `P5` or `P6`.
pub fn is_pnm_file(path: &Path) -> bool {
    matches!(sniff_file(path), Ok(FileKind::Pnm))
}

/// Replace (or add) the extension of `path`. `ext` has no leading dot.
pub fn change_extension(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Read a PNM file into a picture.
pub fn read_pnm(path: &Path) -> Result<Picture, IoError> {
    let data = std::fs::read(path)?;
    if !pnm::has_pnm_magic(&data) {
        return Err(IoError::NotPnm(path.to_path_buf()));
    }
    Ok(pnm::decode(&data)?)
}

/// Encode the PNM file at `input` into a DIF file at `output`.
pub fn encode_file(input: &Path, output: &Path) -> Result<EncodeStats, IoError> {
    let data = std::fs::read(input)?;
    if !pnm::has_pnm_magic(&data) {
        return Err(IoError::NotPnm(input.to_path_buf()));
    }
    let picture = pnm::decode(&data)?;
    let encoded = dif::encode(&picture)?;
    let output_sha256 = write_output(output, &encoded)?;

    Ok(EncodeStats {
        input_size: data.len() as u64,
        raw_size: picture.pixels().len() as u64,
        output_size: encoded.len() as u64,
        width: picture.width(),
        height: picture.height(),
        channels: picture.channels(),
        output_sha256,
    })
}

/// Decode the DIF file at `input` into a PNM file at `output`.
pub fn decode_file(input: &Path, output: &Path) -> Result<DecodeStats, IoError> {
    let data = std::fs::read(input)?;
    let picture = dif::decode(&data)?;
    let encoded = pnm::encode(&picture);
    let output_sha256 = write_output(output, &encoded)?;

    Ok(DecodeStats {
        input_size: data.len() as u64,
        output_size: encoded.len() as u64,
        width: picture.width(),
        height: picture.height(),
        channels: picture.channels(),
        output_sha256,
    })
}

/// Write a fully converted buffer, returning its digest when enabled.
fn write_output(path: &Path, bytes: &[u8]) -> Result<Option<[u8; 32]>, IoError> {
    replace_file(path, |w| w.write_all(bytes))?;

    #[cfg(feature = "file-io")]
    let digest = Some(sha2::Sha256::digest(bytes).into());
    #[cfg(not(feature = "file-io"))]
    let digest: Option<[u8; 32]> = None;

    Ok(digest)
}

/// Fill a temporary file next to `path`, then rename it over `path`.
///
/// `path` is untouched unless `fill` and the flush both succeed; on any
/// error the temporary file is removed.
fn replace_file<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        fill(&mut writer)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Lowercase hex rendering of a digest.
pub fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
