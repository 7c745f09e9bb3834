//! [Portable PixMap Format](https://en.wikipedia.org/wiki/Netpbm#PPM_example) RGB (no alpha) image encoding and decoding.
pub type Output = Image<Vec<u8>, 3>;
use std::num::NonZeroU32;

use crate::decode::pixels;
use crate::encode::{check_max, flatten, header, header_size};
use crate::{Encoding, Error, Format, Result, Type};
use fimg::Image;

/// Builds a pixmap out of rows of `[r, g, b]`.
pub fn from_rows(rows: &[Vec<[u8; 3]>]) -> Result<Output> {
    let ((w, h), buf) = flatten(rows)?;
    Ok(Image::build(w, h).buf(buf.into_iter().flatten().collect()))
}

/// Gray pixmap from a graymap, each sample `y` becoming `[y, y, y]`.
pub fn from_gray(x: &crate::pgm::Output) -> Output {
    let buf: &[u8] = x.buffer();
    Image::build(x.width(), x.height()).buf(buf.iter().flat_map(|&y| [y; 3]).collect())
}

/// Copies a pixmap out into rows of `[r, g, b]`.
pub fn to_rows(x: &Output) -> Vec<Vec<[u8; 3]>> {
    let buf: &[u8] = x.buffer();
    buf.chunks_exact(x.width() as usize * 3)
        .map(|row| {
            row.chunks_exact(3)
                .map(|px| [px[0], px[1], px[2]])
                .collect()
        })
        .collect()
}

#[cfg(test)]
use crate::decode::nz;

#[cfg(test)]
fn tdata() -> Output {
    from_rows(&[
        vec![[0, 128, 255], [128, 255, 0], [255, 0, 128]],
        vec![[255, 128, 0], [128, 0, 255], [0, 255, 128]],
    ])
    .unwrap()
}

#[cfg(test)]
const FILE: [[[u8; 3]; 5]; 3] = [
    [[0, 6, 0], [1, 5, 1], [2, 4, 2], [3, 3, 4], [4, 2, 6]],
    [[1, 5, 2], [2, 4, 2], [3, 3, 2], [4, 2, 2], [5, 1, 2]],
    [[2, 4, 6], [3, 3, 4], [4, 2, 2], [5, 1, 1], [6, 0, 0]],
];

/// Module for handling plain ascii (human readable) [PPM](https://en.wikipedia.org/wiki/Netpbm#PPM_example) (rgb) images.
pub mod plain {
    use super::*;
    use crate::decode::plain_samples;
    use crate::encode::plain_row;
    pub const MAGIC: u8 = 3;
    pub const FORMAT: Format = Format::new(Type::Color, Encoding::Ascii);

    /// Encode a pixmap into a [PPM](https://en.wikipedia.org/wiki/Netpbm#PPM_example) ASCII Image.
    ///
    /// Errors if a sample exceeds `max`.
    pub fn encode(x: &Output, max: u8, comment: Option<&str>) -> Result<Vec<u8>> {
        check_max(x.buffer(), max)?;
        let mut y = Vec::with_capacity(size(x) + header_size(comment));
        header(FORMAT, (x.width(), x.height()), Some(max), comment, &mut y);
        encode_body(x, &mut y);
        Ok(y)
    }

    crate::decode::dec_fn! {
        "Decode an ASCII [PPM](https://en.wikipedia.org/wiki/Netpbm#PPM_example) image into a pixmap."
    }

    /// Decodes `width` × `height` × 3 decimal samples (r, g, b per pixel), advancing `x` past them.
    pub fn decode_body(x: &mut &[u8], width: NonZeroU32, height: NonZeroU32) -> Result<Output> {
        let buf = plain_samples(x, pixels(width, height, 3)?)?;
        Ok(Image::build(width.get(), height.get()).buf(buf))
    }

    /// Writes a line per row, pixels flattened to three samples.
    pub fn encode_body(x: &Output, out: &mut Vec<u8>) {
        let buf: &[u8] = x.buffer();
        for row in buf.chunks_exact(x.width() as usize * 3) {
            plain_row(row.iter().copied(), out);
        }
    }

    /// Upper bound of [`encode_body`]'s output.
    pub fn size(x: &Output) -> usize {
        x.buffer().len() * 4 // '255 '
    }

    #[test]
    fn test_decode() {
        let mut x: &[u8] = b"0 128 255 128 255 0 255 0 128\n255 128 0 128 0 255 0 255 128\n";
        let out = decode_body(&mut x, nz(3), nz(2)).unwrap();
        assert_eq!(to_rows(&out), to_rows(&tdata()));

        // pixels may straddle lines
        let mut x: &[u8] = b"0 128\n255 128 255 0 255\n0 128 255 128 0 128 0 255 0 255 128";
        let out = decode_body(&mut x, nz(3), nz(2)).unwrap();
        assert_eq!(to_rows(&out), to_rows(&tdata()));
        assert!(x.is_empty());
    }

    #[test]
    fn test_encode() {
        let mut out = vec![];
        encode_body(&tdata(), &mut out);
        assert_eq!(
            out,
            b"0 128 255 128 255 0 255 0 128\n255 128 0 128 0 255 0 255 128\n"
        );
    }

    #[test]
    fn short_data() {
        let mut x: &[u8] = b"0 128 255 128 255 0 255 0 128\n255 128 0 128 0 255 0 255\n";
        assert!(matches!(
            decode_body(&mut x, nz(3), nz(2)),
            Err(Error::InsufficientData {
                expected: 18,
                found: 17
            })
        ));
    }

    #[test]
    fn test_file() {
        let data = include_bytes!("../tdata/color_ascii.ppm");
        let x = decode(data).unwrap();
        assert_eq!(to_rows(&x), FILE);
        assert_eq!(encode(&x, 6, Some("Color image")).unwrap(), data);
    }
}

/// Module for handling raw (binary) [PPM](https://en.wikipedia.org/wiki/Netpbm#PPM_example) (rgb) images.
///
/// One byte per sample, r, g, b per pixel.
pub mod raw {
    use super::*;
    use crate::decode::take;
    pub const MAGIC: u8 = 6;
    pub const FORMAT: Format = Format::new(Type::Color, Encoding::Binary);

    /// Encode a pixmap into a [PPM](https://en.wikipedia.org/wiki/Netpbm#PPM_example) Raw (binary) Image.
    ///
    /// Errors if a sample exceeds `max`.
    pub fn encode(x: &Output, max: u8, comment: Option<&str>) -> Result<Vec<u8>> {
        check_max(x.buffer(), max)?;
        let mut y = Vec::with_capacity(size(x) + header_size(comment));
        header(FORMAT, (x.width(), x.height()), Some(max), comment, &mut y);
        encode_body(x, &mut y);
        Ok(y)
    }

    crate::decode::dec_fn! {
        "Decode a raw binary [PPM](https://en.wikipedia.org/wiki/Netpbm#PPM_example) image into a pixmap."
    }

    /// Takes `width` × `height` × 3 bytes, advancing `x` past them.
    pub fn decode_body(x: &mut &[u8], width: NonZeroU32, height: NonZeroU32) -> Result<Output> {
        let buf = take(x, pixels(width, height, 3)?)?;
        Ok(Image::build(width.get(), height.get()).buf(buf.to_vec()))
    }

    pub fn encode_body(x: &Output, out: &mut Vec<u8>) {
        out.extend_from_slice(x.buffer());
    }

    /// Size of [`encode_body`]'s output.
    pub fn size(x: &Output) -> usize {
        x.buffer().len()
    }

    #[cfg(test)]
    const BYTES: [u8; 18] = [
        0x00, 0x80, 0xff, 0x80, 0xff, 0x00, 0xff, 0x00, 0x80, //
        0xff, 0x80, 0x00, 0x80, 0x00, 0xff, 0x00, 0xff, 0x80,
    ];

    #[test]
    fn test_decode() {
        let mut x: &[u8] = &BYTES;
        let out = decode_body(&mut x, nz(3), nz(2)).unwrap();
        assert_eq!(to_rows(&out), to_rows(&tdata()));
        let mut x: &[u8] = &BYTES[..17];
        assert!(matches!(
            decode_body(&mut x, nz(3), nz(2)),
            Err(Error::InsufficientData {
                expected: 18,
                found: 17
            })
        ));
    }

    #[test]
    fn test_encode() {
        let mut out = vec![];
        encode_body(&tdata(), &mut out);
        assert_eq!(out, BYTES);
    }

    #[test]
    fn test_file() {
        let data = include_bytes!("../tdata/color_binary.ppm");
        let x = decode(data).unwrap();
        assert_eq!(to_rows(&x), FILE);
        assert_eq!(encode(&x, 6, Some("Color image")).unwrap(), data);
    }
}
