//! [Portable GreyMap Format](https://en.wikipedia.org/wiki/Netpbm#PGM_example) grayscale image encoding and decoding.
pub type Output = Image<Vec<u8>, 1>;
use std::num::NonZeroU32;

use crate::decode::pixels;
use crate::encode::{check_max, flatten, header, header_size};
use crate::{Encoding, Error, Format, Result, Type};
use fimg::Image;

/// Builds a graymap out of rows of samples.
pub fn from_rows(rows: &[Vec<u8>]) -> Result<Output> {
    let ((w, h), buf) = flatten(rows)?;
    Ok(Image::build(w, h).buf(buf))
}

/// Copies a graymap out into rows of samples.
pub fn to_rows(x: &Output) -> Vec<Vec<u8>> {
    let buf: &[u8] = x.buffer();
    buf.chunks_exact(x.width() as usize)
        .map(<[u8]>::to_vec)
        .collect()
}

#[cfg(test)]
use crate::decode::nz;

#[cfg(test)]
fn tdata() -> Output {
    from_rows(&[
        vec![0, 85, 170, 255],
        vec![85, 170, 255, 0],
        vec![170, 255, 0, 85],
    ])
    .unwrap()
}

#[cfg(test)]
const FILE: [[u8; 4]; 3] = [[0, 50, 100, 150], [50, 100, 150, 200], [100, 150, 200, 250]];

/// Module for handling plain ascii (human readable) [PGM](https://en.wikipedia.org/wiki/Netpbm#PGM_example) (Y) images.
pub mod plain {
    use super::*;
    use crate::decode::plain_samples;
    use crate::encode::plain_row;
    pub const MAGIC: u8 = 2;
    pub const FORMAT: Format = Format::new(Type::Gray, Encoding::Ascii);

    /// Encode a graymap into a [PGM](https://en.wikipedia.org/wiki/Netpbm#PGM_example) ASCII Image.
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
        "Decode an ASCII [PGM](https://en.wikipedia.org/wiki/Netpbm#PGM_example) image into a graymap."
    }

    /// Decodes `width` × `height` whitespace separated decimal samples, advancing `x` past them.
    pub fn decode_body(x: &mut &[u8], width: NonZeroU32, height: NonZeroU32) -> Result<Output> {
        let buf = plain_samples(x, pixels(width, height, 1)?)?;
        Ok(Image::build(width.get(), height.get()).buf(buf))
    }

    pub fn encode_body(x: &Output, out: &mut Vec<u8>) {
        let buf: &[u8] = x.buffer();
        for row in buf.chunks_exact(x.width() as usize) {
            plain_row(row.iter().copied(), out);
        }
    }

    /// Upper bound of [`encode_body`]'s output.
    pub fn size(x: &Output) -> usize {
        x.buffer().len() * 4 // '255 '
    }

    #[test]
    fn test_decode() {
        let mut x: &[u8] = b"0 85 170 255\n85 170 255 0\n170 255 0 85\n";
        let out = decode_body(&mut x, nz(4), nz(3)).unwrap();
        assert_eq!(to_rows(&out), to_rows(&tdata()));
    }

    #[test]
    fn test_encode() {
        let mut out = vec![];
        encode_body(&tdata(), &mut out);
        assert_eq!(out, b"0 85 170 255\n85 170 255 0\n170 255 0 85\n");
        assert!(matches!(
            encode(&tdata(), 200, None),
            Err(Error::SampleOutOfRange { value: 255, max: 200 })
        ));
    }

    #[test]
    fn test_file() {
        let data = include_bytes!("../tdata/grayscale_ascii.pgm");
        let x = decode(data).unwrap();
        assert_eq!(to_rows(&x), FILE);
        assert_eq!(encode(&x, 250, Some("Grayscale image")).unwrap(), data);
    }
}

/// Module for handling raw (binary) [PGM](https://en.wikipedia.org/wiki/Netpbm#PGM_example) (Y) images.
///
/// One byte per sample.
pub mod raw {
    use super::*;
    use crate::decode::take;
    pub const MAGIC: u8 = 5;
    pub const FORMAT: Format = Format::new(Type::Gray, Encoding::Binary);

    /// Encode a graymap into a [PGM](https://en.wikipedia.org/wiki/Netpbm#PGM_example) Raw (binary) Image.
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
        "Decode a raw binary [PGM](https://en.wikipedia.org/wiki/Netpbm#PGM_example) image into a graymap."
    }

    /// Takes `width` × `height` bytes, advancing `x` past them.
    pub fn decode_body(x: &mut &[u8], width: NonZeroU32, height: NonZeroU32) -> Result<Output> {
        let buf = take(x, pixels(width, height, 1)?)?;
        Ok(Image::build(width.get(), height.get()).buf(buf.to_vec()))
    }

    pub fn encode_body(x: &Output, out: &mut Vec<u8>) {
        out.extend_from_slice(x.buffer());
    }

    /// Size of [`encode_body`]'s output.
    pub fn size(x: &Output) -> usize {
        x.buffer().len()
    }

    #[test]
    fn test_decode() {
        let mut x: &[u8] = &[
            0x00, 0x55, 0xaa, 0xff, 0x55, 0xaa, 0xff, 0x00, 0xaa, 0xff, 0x00, 0x55, b'\n',
        ];
        let out = decode_body(&mut x, nz(4), nz(3)).unwrap();
        assert_eq!(to_rows(&out), to_rows(&tdata()));
        assert_eq!(x, b"\n");
    }

    #[test]
    fn test_encode() {
        let mut out = vec![];
        encode_body(&tdata(), &mut out);
        assert_eq!(
            out,
            [0x00, 0x55, 0xaa, 0xff, 0x55, 0xaa, 0xff, 0x00, 0xaa, 0xff, 0x00, 0x55]
        );
    }

    #[test]
    fn short_data() {
        let data = b"P5\n4 3\n255\n\x00\x55\xaa\xff\x55\xaa\xff\x00\xaa\xff\x00";
        assert!(matches!(
            decode(data),
            Err(Error::InsufficientData {
                expected: 12,
                found: 11
            })
        ));
    }

    #[test]
    fn test_file() {
        let data = include_bytes!("../tdata/grayscale_binary.pgm");
        let x = decode(data).unwrap();
        assert_eq!(to_rows(&x), FILE);
        assert_eq!(encode(&x, 250, Some("Grayscale image")).unwrap(), data);
    }
}
