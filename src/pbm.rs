//! [Portable BitMap Format](https://en.wikipedia.org/wiki/Netpbm#PBM_example) black and white image encoding and decoding.
//!
//! `true` is 1, which is "on" (black).
pub type Output = Image<Vec<bool>, 1>;
use std::num::NonZeroU32;

use crate::decode::pixels;
use crate::encode::{encode_bool, flatten};
use crate::{Encoding, Error, Format, Result, Type};
use atools::prelude::*;
use fimg::Image;

/// Builds a bitmap out of rows of 0s and 1s.
pub fn from_rows(rows: &[Vec<u8>]) -> Result<Output> {
    let ((w, h), buf) = flatten(rows)?;
    let buf = buf
        .into_iter()
        .map(|x| match x {
            0 | 1 => Ok(x == 1),
            value => Err(Error::SampleOutOfRange { value, max: 1 }),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Image::build(w, h).buf(buf))
}

/// Copies a bitmap out into rows of 0s and 1s.
pub fn to_rows(x: &Output) -> Vec<Vec<u8>> {
    let buf: &[bool] = x.buffer();
    buf.chunks_exact(x.width() as usize)
        .map(|row| row.iter().map(|&on| on as u8).collect())
        .collect()
}

#[cfg(test)]
use crate::decode::nz;

#[cfg(test)]
fn image(rows: &[&[u8]]) -> Output {
    from_rows(&rows.iter().map(|x| x.to_vec()).collect::<Vec<_>>()).unwrap()
}

#[cfg(test)]
const PBM6: &[&[u8]] = &[&[0, 1, 0, 0, 1, 1], &[0, 0, 0, 1, 1, 1]];
#[cfg(test)]
const PBM14: &[&[u8]] = &[
    &[0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 0, 0, 1, 0],
    &[0, 1, 0, 1, 1, 0, 1, 1, 1, 0, 1, 1, 1, 1],
];

/// Module for handling plain ascii (human readable) [PBM](https://en.wikipedia.org/wiki/Netpbm#PBM_example) (black and white) images.
pub mod plain {
    use super::*;
    use crate::decode::next_token;
    use crate::encode::{header, header_size};
    pub const MAGIC: u8 = 1;
    pub const FORMAT: Format = Format::new(Type::Bilevel, Encoding::Ascii);

    /// Encode a bitmap into a [PBM](https://en.wikipedia.org/wiki/Netpbm#PBM_example) ASCII Image.
    pub fn encode(x: &Output, comment: Option<&str>) -> Vec<u8> {
        let mut y = Vec::with_capacity(size(x) + header_size(comment));
        header(FORMAT, (x.width(), x.height()), None, comment, &mut y);
        encode_body(x, &mut y);
        y
    }

    crate::decode::dec_fn! {
        "Decode an ASCII [PBM](https://en.wikipedia.org/wiki/Netpbm#PBM_example) image into a bitmap."
    }

    /// Decodes `width` × `height` whitespace separated `0`/`1` tokens, advancing `x` past them.
    pub fn decode_body(x: &mut &[u8], width: NonZeroU32, height: NonZeroU32) -> Result<Output> {
        let n = pixels(width, height, 1)?;
        let mut buf = Vec::with_capacity(n.min(x.len()));
        while buf.len() < n {
            match next_token(x) {
                Some(b"0") => buf.push(false),
                Some(b"1") => buf.push(true),
                Some(t) => return Err(Error::InvalidSample(String::from_utf8_lossy(t).into())),
                None => {
                    return Err(Error::InsufficientData {
                        expected: n,
                        found: buf.len(),
                    })
                }
            }
        }
        Ok(Image::build(width.get(), height.get()).buf(buf))
    }

    /// Writes each row as space separated `0`s and `1`s, ending in a newline.
    pub fn encode_body(x: &Output, out: &mut Vec<u8>) {
        let buf: &[bool] = x.buffer();
        for row in buf.chunks_exact(x.width() as usize) {
            for (i, &on) in row.iter().enumerate() {
                if i != 0 {
                    out.push(b' ');
                }
                out.push(encode_bool(on));
            }
            out.push(b'\n');
        }
    }

    /// Size of [`encode_body`]'s output.
    pub fn size(x: &Output) -> usize {
        x.width() as usize * x.height() as usize * 2 // '1 ' or '1\n'
    }

    #[test]
    fn test_decode() {
        let mut x: &[u8] = b"0 0 1 1 1 0 0 0 1 1 0 0 1 0\n0 1 0 1 1 0 1 1 1 0 1 1 1 1\n";
        let out = decode_body(&mut x, nz(14), nz(2)).unwrap();
        assert_eq!(to_rows(&out), PBM14);
        assert_eq!(x, b"\n");
    }

    #[test]
    fn test_encode() {
        let mut out = vec![];
        encode_body(&image(PBM6), &mut out);
        assert_eq!(out, b"0 1 0 0 1 1\n0 0 0 1 1 1\n");
        assert_eq!(out.len(), size(&image(PBM6)));
    }

    #[test]
    fn test_file() {
        let data = include_bytes!("../tdata/bilevel_ascii.pbm");
        let x = decode(data).unwrap();
        assert_eq!(
            to_rows(&x),
            [
                [0, 0, 0, 0, 0],
                [0, 1, 1, 1, 0],
                [0, 0, 1, 0, 0],
                [0, 0, 1, 0, 0],
                [0, 0, 1, 0, 0],
                [0, 0, 0, 0, 0],
            ]
        );
        assert_eq!(encode(&x, Some("Bilevel image")), data);
    }

    #[test]
    fn bad_samples() {
        let mut x: &[u8] = b"0 1 2 0";
        let (w, h) = (nz(4), nz(1));
        assert!(matches!(decode_body(&mut x, w, h), Err(Error::InvalidSample(_))));
        let mut x: &[u8] = b"0 1 1";
        assert!(matches!(
            decode_body(&mut x, w, h),
            Err(Error::InsufficientData {
                expected: 4,
                found: 3
            })
        ));
    }
}

/// Module for handling raw (packed binary) [PBM](https://en.wikipedia.org/wiki/Netpbm#PBM_example) (black and white) images.
///
/// Pixels are packed 8 to a byte, most significant bit first.
/// Every row starts on a fresh byte; the low bits of a row's last byte are padding.
pub mod raw {
    use super::*;
    use crate::decode::take;
    use crate::encode::{header, header_size};
    pub const MAGIC: u8 = 4;
    pub const FORMAT: Format = Format::new(Type::Bilevel, Encoding::Binary);

    /// Encode a bitmap into a [PBM](https://en.wikipedia.org/wiki/Netpbm#PBM_example) Raw (packed binary) Image.
    pub fn encode(x: &Output, comment: Option<&str>) -> Vec<u8> {
        let mut y = Vec::with_capacity(size(x) + header_size(comment));
        header(FORMAT, (x.width(), x.height()), None, comment, &mut y);
        encode_body(x, &mut y);
        y
    }

    crate::decode::dec_fn! {
        "Decode a raw binary [PBM](https://en.wikipedia.org/wiki/Netpbm#PBM_example) image into a bitmap."
    }

    /// Bytes per row.
    pub const fn stride(width: u32) -> usize {
        (width as usize).div_ceil(8)
    }

    /// Packs each row into [`stride`] bytes, padding with zero bits.
    pub fn encode_body(x: &Output, out: &mut Vec<u8>) {
        let buf: &[bool] = x.buffer();
        buf.chunks_exact(x.width() as usize)
            .flat_map(|x| x.chunks(8))
            .map(|chunk| {
                chunk
                    .iter()
                    .zip(0u8..)
                    .fold(0, |acc, (&x, i)| acc | (x as u8) << (7 - i))
            })
            .for_each(|x| out.push(x));
    }

    /// Unpacks `height` rows of [`stride`] bytes, advancing `x` past them. Padding bits are ignored.
    pub fn decode_body(x: &mut &[u8], width: NonZeroU32, height: NonZeroU32) -> Result<Output> {
        let stride = stride(width.get());
        let n = stride
            .checked_mul(height.get() as usize)
            .ok_or_else(|| Error::InvalidDimensions(format!("{width}x{height}")))?;
        let buf = take(x, n)?
            .chunks_exact(stride)
            .flat_map(|row| {
                row.iter()
                    .copied()
                    // expand the bits
                    .flat_map(|b| atools::range::<8>().rev().map(|x| b & (1 << x) != 0))
                    .take(width.get() as usize)
            })
            .collect::<Vec<_>>();
        Ok(Image::build(width.get(), height.get()).buf(buf))
    }

    /// Size of [`encode_body`]'s output.
    pub fn size(x: &Output) -> usize {
        stride(x.width()) * x.height() as usize
    }

    #[test]
    fn test_decode() {
        let mut x: &[u8] = &[0x4c, 0x1c];
        let out = decode_body(&mut x, nz(6), nz(2)).unwrap();
        assert_eq!(to_rows(&out), PBM6);
        assert!(x.is_empty());

        // trailing whitespace is left alone
        let mut x: &[u8] = &[0x38, 0xc8, 0x5b, 0xbc, b'\t'];
        let out = decode_body(&mut x, nz(14), nz(2)).unwrap();
        assert_eq!(to_rows(&out), PBM14);
        assert_eq!(x, b"\t");
    }

    #[test]
    fn test_encode() {
        let mut out = vec![];
        encode_body(&image(PBM6), &mut out);
        assert_eq!(out, [0x4c, 0x1c]);
        out.clear();
        encode_body(&image(PBM14), &mut out);
        assert_eq!(out, [0x38, 0xc8, 0x5b, 0xbc]);
        assert_eq!(size(&image(PBM14)), 4);
    }

    #[test]
    fn padding_is_ignored() {
        let mut x: &[u8] = &[0x4f, 0x1f];
        let out = decode_body(&mut x, nz(6), nz(2)).unwrap();
        assert_eq!(to_rows(&out), PBM6);
    }

    #[test]
    fn short_data() {
        let mut x: &[u8] = &[0x38, 0xc8, 0x5b];
        assert!(matches!(
            decode_body(&mut x, nz(14), nz(2)),
            Err(Error::InsufficientData {
                expected: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn test_file() {
        let data = include_bytes!("../tdata/bilevel_binary.pbm");
        let x = decode(data).unwrap();
        let plain = super::plain::decode(include_bytes!("../tdata/bilevel_ascii.pbm")).unwrap();
        assert_eq!(to_rows(&x), to_rows(&plain));
        assert_eq!(encode(&x, Some("Bilevel image")), data);
        assert!(matches!(
            decode(include_bytes!("../tdata/bilevel_ascii.pbm")),
            Err(Error::MalformedHeader(_))
        ));
    }
}
