//! crate for losslessly decoding/encoding the older portable anymap formats ([`pbm`], [`pgm`], [`ppm`]).
//!
//! ### a quick guide to the various functions for everyday use
//!
//! - [`decode()`]: your go-to for all PNM image decoding. Reads both plain (ascii) and raw (binary) formats.
//! If you have a specific format you need to support, use its module directly.
//! - [`decode_with_options()`]: same, but lets you turn on [strict mode](decode::Options::set_strict_mode).
//! - [`encode()`]: writes an [`Image`] in the [`Encoding`] of your choice.
//! - [`Image`]: build images out of rows of samples, read and write them.
//!
//! ### functions in action
//!
//! ```
//! use pnmcodec::{Encoding, Image, Type};
//!
//! let image = Image::new(Type::Gray, vec![vec![0u8, 1, 2], vec![1, 2, 3]])
//!     .unwrap()
//!     .with_max(3)
//!     .unwrap()
//!     .with_comment("Image");
//! let data = pnmcodec::encode(&image, Encoding::Ascii).unwrap();
//! assert_eq!(data, b"P2\n# Image\n3 2\n3\n0 1 2\n1 2 3\n");
//!
//! let out = pnmcodec::decode(&data).unwrap();
//! assert_eq!(out.encoding, Encoding::Ascii);
//! assert_eq!(out.image.to_string(), "PGM 3x2 Grayscale");
//! assert_eq!(out.image.comment(), Some("Image"));
//! assert_eq!(out.image.rows(), image.rows());
//! ```
#![warn(
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::dbg_macro,
    clippy::use_self
)]

use log::trace;
pub mod decode;
pub(crate) mod encode;
mod error;
pub mod image;
pub mod pbm;
pub mod pgm;
pub mod ppm;
pub use error::{Error, Result};
pub use image::Image;

/// What the samples mean.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// One bit per pixel, [`pbm`]. 1 is "on" (black).
    Bilevel,
    /// One sample per pixel, [`pgm`].
    Gray,
    /// Red, green and blue samples per pixel, [`ppm`].
    Color,
}

impl Type {
    /// Samples per pixel.
    pub const fn channels(self) -> usize {
        match self {
            Self::Bilevel | Self::Gray => 1,
            Self::Color => 3,
        }
    }

    /// Short name, as in `PGM`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bilevel => "PBM",
            Self::Gray => "PGM",
            Self::Color => "PPM",
        }
    }

    const fn description(self) -> &'static str {
        match self {
            Self::Bilevel => "Bilevel",
            Self::Gray => "Grayscale",
            Self::Color => "Color",
        }
    }
}

/// How the samples are stored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Whitespace separated decimal numbers. Also called "plain".
    Ascii,
    /// Packed bytes (and bits, for [`pbm`]). Also called "raw".
    #[default]
    Binary,
}

/// A [`Type`] and [`Encoding`] pair, which is what the magic number encodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Format {
    pub ty: Type,
    pub encoding: Encoding,
}

/// Every format, indexed by magic number - 1.
pub const FORMATS: [Format; 6] = [
    Format::new(Type::Bilevel, Encoding::Ascii),
    Format::new(Type::Gray, Encoding::Ascii),
    Format::new(Type::Color, Encoding::Ascii),
    Format::new(Type::Bilevel, Encoding::Binary),
    Format::new(Type::Gray, Encoding::Binary),
    Format::new(Type::Color, Encoding::Binary),
];

impl Format {
    pub const fn new(ty: Type, encoding: Encoding) -> Self {
        Self { ty, encoding }
    }

    /// The digit after the `P`.
    pub const fn magic(self) -> u8 {
        match (self.ty, self.encoding) {
            (Type::Bilevel, Encoding::Ascii) => pbm::plain::MAGIC,
            (Type::Gray, Encoding::Ascii) => pgm::plain::MAGIC,
            (Type::Color, Encoding::Ascii) => ppm::plain::MAGIC,
            (Type::Bilevel, Encoding::Binary) => pbm::raw::MAGIC,
            (Type::Gray, Encoding::Binary) => pgm::raw::MAGIC,
            (Type::Color, Encoding::Binary) => ppm::raw::MAGIC,
        }
    }

    /// Looks up the digit after the `P`.
    pub fn from_magic(magic: u8) -> Option<Self> {
        FORMATS.get(usize::from(magic.checked_sub(1)?)).copied()
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.magic())
    }
}

/// Decoded pixels, one variant per [`Type`].
///
/// Bitmaps hold `true` for 1 (on), graymaps one byte per pixel, pixmaps three (r, g, b).
pub enum Pixels {
    Bilevel(pbm::Output),
    Gray(pgm::Output),
    Color(ppm::Output),
}

/// Rows of samples, the way you would write an image out by hand.
///
/// Every row must have the same length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rows {
    /// One sample per pixel (bitmaps and graymaps, or graymaps to promote to color).
    Samples(Vec<Vec<u8>>),
    /// `[r, g, b]` per pixel.
    Rgb(Vec<Vec<[u8; 3]>>),
}

impl From<Vec<Vec<u8>>> for Rows {
    fn from(x: Vec<Vec<u8>>) -> Self {
        Self::Samples(x)
    }
}

impl From<Vec<Vec<[u8; 3]>>> for Rows {
    fn from(x: Vec<Vec<[u8; 3]>>) -> Self {
        Self::Rgb(x)
    }
}

macro_rules! e {
    ($pixels:expr, |$image: pat_param| $do:expr) => {
        match $pixels {
            Pixels::Bilevel($image) => $do,
            Pixels::Gray($image) => $do,
            Pixels::Color($image) => $do,
        }
    };
}

impl Pixels {
    /// Builds pixels of type `ty` out of `rows`.
    ///
    /// [`Rows::Samples`] given for [`Type::Color`] are promoted to gray rgb (`y` → `[y, y, y]`).
    /// [`Rows::Rgb`] for the single channel types is a [`Error::ChannelMismatch`].
    pub fn from_rows(ty: Type, rows: Rows) -> Result<Self> {
        Ok(match (ty, rows) {
            (Type::Bilevel, Rows::Samples(x)) => Self::Bilevel(pbm::from_rows(&x)?),
            (Type::Gray, Rows::Samples(x)) => Self::Gray(pgm::from_rows(&x)?),
            (Type::Color, Rows::Samples(x)) => Self::Color(ppm::from_gray(&pgm::from_rows(&x)?)),
            (Type::Color, Rows::Rgb(x)) => Self::Color(ppm::from_rows(&x)?),
            (Type::Bilevel | Type::Gray, Rows::Rgb(_)) => return Err(Error::ChannelMismatch),
        })
    }

    pub const fn ty(&self) -> Type {
        match self {
            Self::Bilevel(_) => Type::Bilevel,
            Self::Gray(_) => Type::Gray,
            Self::Color(_) => Type::Color,
        }
    }

    pub fn width(&self) -> u32 {
        e!(self, |x| x.width())
    }

    pub fn height(&self) -> u32 {
        e!(self, |x| x.height())
    }

    /// Copies the pixels out into rows. Bitmaps give 0 and 1.
    pub fn rows(&self) -> Rows {
        match self {
            Self::Bilevel(x) => Rows::Samples(pbm::to_rows(x)),
            Self::Gray(x) => Rows::Samples(pgm::to_rows(x)),
            Self::Color(x) => Rows::Rgb(ppm::to_rows(x)),
        }
    }

    /// Fails on the first sample above `max`. Bitmaps always pass.
    pub fn check(&self, max: u8) -> Result<()> {
        match self {
            Self::Bilevel(_) => Ok(()),
            Self::Gray(x) => encode::check_max(x.buffer(), max),
            Self::Color(x) => encode::check_max(x.buffer(), max),
        }
    }
}

impl std::fmt::Debug for Pixels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}x{})", self.ty().name(), self.width(), self.height())
    }
}

/// Output of [`decode()`]: the image and the encoding it was stored in.
#[derive(Debug)]
pub struct Decoded {
    pub image: Image,
    pub encoding: Encoding,
}

/// Decode any [`pbm`], [`pgm`], or [`ppm`] image, plain or raw.
///
/// Trailing data after the pixels is ignored.
pub fn decode(x: &impl AsRef<[u8]>) -> Result<Decoded> {
    decode_with_options(x, decode::Options::default())
}

/// Decode any [`pbm`], [`pgm`], or [`ppm`] image, plain or raw, with the given [`Options`](decode::Options).
pub fn decode_with_options(x: &impl AsRef<[u8]>, options: decode::Options) -> Result<Decoded> {
    let mut x = x.as_ref();
    let header = decode::decode_header(&mut x)?;
    let (w, h) = (header.width, header.height);
    let pixels = match (header.format.ty, header.format.encoding) {
        (Type::Bilevel, Encoding::Ascii) => Pixels::Bilevel(pbm::plain::decode_body(&mut x, w, h)?),
        (Type::Gray, Encoding::Ascii) => Pixels::Gray(pgm::plain::decode_body(&mut x, w, h)?),
        (Type::Color, Encoding::Ascii) => Pixels::Color(ppm::plain::decode_body(&mut x, w, h)?),
        (Type::Bilevel, Encoding::Binary) => Pixels::Bilevel(pbm::raw::decode_body(&mut x, w, h)?),
        (Type::Gray, Encoding::Binary) => Pixels::Gray(pgm::raw::decode_body(&mut x, w, h)?),
        (Type::Color, Encoding::Binary) => Pixels::Color(ppm::raw::decode_body(&mut x, w, h)?),
    };
    let trailing = decode::trailing(x, header.format.encoding);
    if options.strict_mode() {
        if trailing != 0 {
            return Err(Error::TrailingData(trailing));
        }
        pixels.check(header.max_value())?;
    } else if trailing != 0 {
        trace!("ignoring {trailing} trailing bytes");
    }
    Ok(Decoded {
        image: Image::from_parts(pixels, header.max_value(), header.comment()),
        encoding: header.format.encoding,
    })
}

/// Encodes an image to the [`pbm`], [`pgm`] or [`ppm`] format matching its [`Type`].
///
/// Fails, before writing anything, if a sample exceeds the image's max value.
pub fn encode(x: &Image, encoding: Encoding) -> Result<Vec<u8>> {
    let comment = x.comment();
    let max = x.max();
    match (x.pixels(), encoding) {
        (Pixels::Bilevel(x), Encoding::Ascii) => Ok(pbm::plain::encode(x, comment)),
        (Pixels::Gray(x), Encoding::Ascii) => pgm::plain::encode(x, max, comment),
        (Pixels::Color(x), Encoding::Ascii) => ppm::plain::encode(x, max, comment),
        (Pixels::Bilevel(x), Encoding::Binary) => Ok(pbm::raw::encode(x, comment)),
        (Pixels::Gray(x), Encoding::Binary) => pgm::raw::encode(x, max, comment),
        (Pixels::Color(x), Encoding::Binary) => ppm::raw::encode(x, max, comment),
    }
}

#[test]
fn magic_table() {
    for (i, format) in FORMATS.into_iter().enumerate() {
        assert_eq!(format.magic() as usize, i + 1);
        assert_eq!(Format::from_magic(format.magic()), Some(format));
    }
    assert_eq!(Format::from_magic(0), None);
    assert_eq!(Format::from_magic(7), None);
    assert_eq!(
        Format::new(Type::Color, Encoding::Binary).to_string(),
        "P6"
    );
}

#[test]
fn promotes_gray_rows() {
    let x = Pixels::from_rows(Type::Color, Rows::Samples(vec![vec![0, 7]])).unwrap();
    assert_eq!(x.rows(), Rows::Rgb(vec![vec![[0; 3], [7; 3]]]));
    assert!(matches!(
        Pixels::from_rows(Type::Gray, Rows::Rgb(vec![vec![[1, 2, 3]]])),
        Err(Error::ChannelMismatch)
    ));
}

#[test]
fn round_trips() {
    let grids = [
        (Type::Bilevel, Rows::Samples(vec![vec![1, 0, 1, 1, 0, 0, 1, 0, 1], vec![0; 9]])),
        (Type::Gray, Rows::Samples(vec![vec![0, 85, 170, 255], vec![85, 170, 255, 0]])),
        (
            Type::Color,
            Rows::Rgb(vec![vec![[0, 128, 255], [128, 255, 0]], vec![[9, 8, 7], [1, 2, 3]]]),
        ),
    ];
    for (ty, rows) in grids {
        let image = Image::new(ty, rows.clone())
            .unwrap()
            .with_comment("first\nsecond");
        let mut seen = vec![];
        for encoding in [Encoding::Ascii, Encoding::Binary] {
            let data = encode(&image, encoding).unwrap();
            let out = decode(&data).unwrap();
            assert_eq!(out.encoding, encoding);
            assert_eq!(out.image.ty(), ty);
            assert_eq!(out.image.max(), image.max());
            assert_eq!(out.image.comment(), Some("first\nsecond"));
            assert_eq!(out.image.rows(), rows);
            seen.push(out.image.rows());
        }
        assert_eq!(seen[0], seen[1]);
    }
}

#[test]
fn strict_mode() {
    let strict = decode::Options::new().set_strict_mode(true);
    // one newline after a raw payload is fine
    let data = b"P5\n2 1\n255\n\x01\x02\n";
    assert!(decode_with_options(data, strict).is_ok());
    let data = b"P5\n2 1\n255\n\x01\x02\x03\x04";
    assert!(decode(data).is_ok());
    assert!(matches!(
        decode_with_options(data, strict),
        Err(Error::TrailingData(2))
    ));
    let data = b"P2\n2 1\n3\n1 9\n";
    assert_eq!(
        decode(data).unwrap().image.rows(),
        Rows::Samples(vec![vec![1, 9]])
    );
    assert!(matches!(
        decode_with_options(data, strict),
        Err(Error::SampleOutOfRange { value: 9, max: 3 })
    ));
    let data = b"P1\n2 1\n1 0 1\n";
    assert!(matches!(
        decode_with_options(data, strict),
        Err(Error::TrailingData(_))
    ));
}

#[test]
fn trailing_whitespace_after_raw_bitmap() {
    let data = b"P4\n14 2\n\x38\xc8\x5b\xbc";
    let rows = decode(data).unwrap().image.rows();
    let mut with_tab = data.to_vec();
    with_tab.push(b'\t');
    let strict = decode::Options::new().set_strict_mode(true);
    assert_eq!(decode_with_options(&with_tab, strict).unwrap().image.rows(), rows);
    let short: &[u8] = &data[..data.len() - 1];
    assert!(matches!(
        decode(&short),
        Err(Error::InsufficientData {
            expected: 4,
            found: 3
        })
    ));
}
