// Binary PNM (P5 gray / P6 rgb, maxval 255) reader and writer.
//
// Header tokens are separated by whitespace and may be interleaved with
// `#` comments running to end of line.  Exactly one whitespace byte
// separates maxval from the sample data.

use crate::dif::DifError;
use crate::picture::{ColorType, Picture};

#[derive(Debug, thiserror::Error)]
pub enum PnmError {
    #[error("not a binary PNM file (expected P5 or P6 magic)")]
    BadMagic,
    #[error("invalid PNM header: {0}")]
    InvalidHeader(String),
    #[error("unsupported maxval {0} (only 255 is supported)")]
    UnsupportedMaxval(usize),
    #[error("PNM sample data too short: expected {expected} bytes, found {found}")]
    ShortData { expected: usize, found: usize },
    #[error(transparent)]
    Picture(#[from] DifError),
}

/// True when `data` starts with a binary PNM magic.
pub fn has_pnm_magic(data: &[u8]) -> bool {
    matches!(data, [b'P', b'5' | b'6', ..])
}

/// Parse a binary PNM image.
pub fn decode(data: &[u8]) -> Result<Picture, PnmError> {
    let color = match data {
        [b'P', b'5', ..] => ColorType::Gray,
        [b'P', b'6', ..] => ColorType::Rgb,
        _ => return Err(PnmError::BadMagic),
    };

    let mut pos = 2;
    let width = read_integer(data, &mut pos, "width")?;
    let height = read_integer(data, &mut pos, "height")?;
    let maxval = read_integer(data, &mut pos, "maxval")?;
    if maxval != 255 {
        return Err(PnmError::UnsupportedMaxval(maxval));
    }
    match data.get(pos) {
        Some(b) if b.is_ascii_whitespace() => pos += 1,
        _ => {
            return Err(PnmError::InvalidHeader(
                "missing whitespace after maxval".into(),
            ));
        }
    }

    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(color.channels()))
        .ok_or_else(|| PnmError::InvalidHeader(format!("dimensions {width}x{height} overflow")))?;
    let found = data.len() - pos;
    if found < expected {
        return Err(PnmError::ShortData { expected, found });
    }

    let pixels = data[pos..pos + expected].to_vec();
    Ok(Picture::new(width, height, color, pixels)?)
}

/// Serialize `picture` as binary PNM.
pub fn encode(picture: &Picture) -> Vec<u8> {
    let magic = match picture.color() {
        ColorType::Gray => "P5",
        ColorType::Rgb => "P6",
    };
    let header = format!("{magic}\n{} {}\n255\n", picture.width(), picture.height());
    let mut out = Vec::with_capacity(header.len() + picture.pixels().len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(picture.pixels());
    out
}

fn skip_whitespace_and_comments(data: &[u8], pos: &mut usize) {
    while let Some(&b) = data.get(*pos) {
        if b.is_ascii_whitespace() {
            *pos += 1;
        } else if b == b'#' {
            while let Some(&c) = data.get(*pos) {
                *pos += 1;
                if c == b'\n' {
                    break;
                }
            }
        } else {
            break;
        }
    }
}

fn read_integer(data: &[u8], pos: &mut usize, field: &str) -> Result<usize, PnmError> {
    skip_whitespace_and_comments(data, pos);
    let start = *pos;
    while data.get(*pos).is_some_and(u8::is_ascii_digit) {
        *pos += 1;
    }
    if start == *pos {
        return Err(PnmError::InvalidHeader(format!("expected {field}")));
    }
    // Digits only, so the slice is valid UTF-8.
    std::str::from_utf8(&data[start..*pos])
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| PnmError::InvalidHeader(format!("{field} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_gray_with_comments() {
        let mut data = b"P5\n# made by hand\n3 # width\n 2\n255\n".to_vec();
        data.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
        let pic = decode(&data).unwrap();
        assert_eq!((pic.width(), pic.height()), (3, 2));
        assert_eq!(pic.color(), ColorType::Gray);
        assert_eq!(pic.pixels(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn sample_data_may_start_with_whitespace_bytes() {
        let mut data = b"P6 1 1 255 ".to_vec();
        data.extend_from_slice(&[b'\n', b' ', b'\t']);
        let pic = decode(&data).unwrap();
        assert_eq!(pic.pixels(), &[b'\n', b' ', b'\t']);
    }

    #[test]
    fn write_then_parse() {
        let pic = Picture::new(2, 1, ColorType::Rgb, vec![9, 8, 7, 6, 5, 4]).unwrap();
        let bytes = encode(&pic);
        assert!(bytes.starts_with(b"P6\n2 1\n255\n"));
        assert_eq!(decode(&bytes).unwrap(), pic);
    }

    #[test]
    fn rejections() {
        assert!(matches!(decode(b"P3 1 1 255 "), Err(PnmError::BadMagic)));
        assert!(matches!(decode(b"P5 1 1 65535 \0\0"), Err(PnmError::UnsupportedMaxval(65535))));
        assert!(matches!(decode(b"P5 x"), Err(PnmError::InvalidHeader(_))));
        assert!(matches!(decode(b"P5 1 1 255"), Err(PnmError::InvalidHeader(_))));
        assert!(matches!(
            decode(b"P5 2 2 255\n\0"),
            Err(PnmError::ShortData { expected: 4, found: 1 })
        ));
        assert!(matches!(
            decode(b"P5 0 2 255\n"),
            Err(PnmError::Picture(DifError::InvalidDimensions { .. }))
        ));
    }

    #[test]
    fn magic_sniffing() {
        assert!(has_pnm_magic(b"P5\n"));
        assert!(has_pnm_magic(b"P6"));
        assert!(!has_pnm_magic(b"P4"));
        assert!(!has_pnm_magic(&[0xFF, 0xD1]));
    }
}
