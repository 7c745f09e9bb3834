//! the [`Image`] entity: pixels plus max value and comment.
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

use log::debug;

use crate::{Encoding, Error, Pixels, Result, Rows, Type};

/// A [`pbm`](crate::pbm), [`pgm`](crate::pgm) or [`ppm`](crate::ppm) image.
///
/// ```
/// use pnmcodec::{Image, Type};
///
/// let image = Image::new(Type::Color, vec![vec![0u8, 128]]).unwrap();
/// assert_eq!(image.to_string(), "PPM 2x1 Color");
/// assert_eq!(image.max(), 255);
/// ```
#[derive(Debug)]
pub struct Image {
    pixels: Pixels,
    max: u8,
    comment: Option<String>,
}

impl Image {
    /// Creates an image of type `ty` from rows of samples.
    ///
    /// The max value starts at 255 (1 for bitmaps). Rows of single samples given for
    /// [`Type::Color`] are turned into gray pixels.
    ///
    /// Errors if the rows are empty or ragged, a bitmap sample is not 0 or 1,
    /// or rgb rows are given for a single channel type.
    pub fn new(ty: Type, rows: impl Into<Rows>) -> Result<Self> {
        let pixels = Pixels::from_rows(ty, rows.into())?;
        Ok(Self::from_parts(pixels, 255, None))
    }

    /// Sets the max value. Ignored for bitmaps, which always have a max of 1.
    ///
    /// Errors if `max` is 0 or below any sample.
    pub fn with_max(mut self, max: u8) -> Result<Self> {
        if self.ty() == Type::Bilevel {
            return Ok(self);
        }
        if max == 0 {
            return Err(Error::InvalidMaxValue(max.to_string()));
        }
        self.pixels.check(max)?;
        self.max = max;
        Ok(self)
    }

    /// Sets the comment. One trailing line ending is dropped, and an empty comment is no comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        let mut comment = comment.into();
        if comment.ends_with('\n') {
            comment.pop();
        }
        if comment.ends_with('\r') {
            comment.pop();
        }
        self.comment = (!comment.is_empty()).then_some(comment);
        self
    }

    pub(crate) fn from_parts(pixels: Pixels, max: u8, comment: Option<String>) -> Self {
        let max = match pixels.ty() {
            Type::Bilevel => 1,
            Type::Gray | Type::Color => max,
        };
        Self {
            pixels,
            max,
            comment,
        }
    }

    pub const fn ty(&self) -> Type {
        self.pixels.ty()
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Largest allowed sample value. Always 1 for bitmaps.
    pub const fn max(&self) -> u8 {
        self.max
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub const fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    pub fn into_pixels(self) -> Pixels {
        self.pixels
    }

    /// Copies the pixels out into rows.
    pub fn rows(&self) -> Rows {
        self.pixels.rows()
    }

    /// Short description, like `PGM 4x3 Grayscale`.
    pub fn info(&self) -> String {
        self.to_string()
    }

    /// Decodes an image from bytes. See [`decode`](crate::decode()).
    pub fn decode(x: impl AsRef<[u8]>) -> Result<Self> {
        Ok(crate::decode(&x)?.image)
    }

    /// Encodes the image. See [`encode`](crate::encode()).
    pub fn encode(&self, encoding: Encoding) -> Result<Vec<u8>> {
        crate::encode(self, encoding)
    }

    /// Reads an image from `r`, to the end.
    pub fn read(mut r: impl Read) -> Result<Self> {
        let mut data = vec![];
        r.read_to_end(&mut data)?;
        Self::decode(data)
    }

    /// Reads an image file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::decode(std::fs::read(path)?)
    }

    /// Writes the image to `w`, returning the number of bytes written.
    ///
    /// Nothing is written if encoding fails.
    pub fn write(&self, mut w: impl Write, encoding: Encoding) -> Result<usize> {
        let data = self.encode(encoding)?;
        w.write_all(&data)?;
        debug!("wrote {} bytes of {self} ({encoding:?})", data.len());
        Ok(data.len())
    }

    /// Writes the image to a file, returning the number of bytes written.
    pub fn save(&self, path: impl AsRef<Path>, encoding: Encoding) -> Result<usize> {
        let data = self.encode(encoding)?;
        std::fs::write(path, &data)?;
        Ok(data.len())
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ty = self.ty();
        write!(
            f,
            "{} {}x{} {}",
            ty.name(),
            self.width(),
            self.height(),
            ty.description()
        )
    }
}

#[test]
fn reads_files() {
    let x = Image::read(&include_bytes!("../tdata/bilevel_ascii.pbm")[..]).unwrap();
    assert_eq!(x.info(), "PBM 5x6 Bilevel");
    assert_eq!(x.max(), 1);
    assert_eq!(x.comment(), Some("Bilevel image"));

    let x = Image::read(&include_bytes!("../tdata/grayscale_ascii.pgm")[..]).unwrap();
    assert_eq!(x.info(), "PGM 4x3 Grayscale");
    assert_eq!(x.max(), 250);
    assert_eq!(
        x.rows(),
        Rows::Samples(vec![
            vec![0, 50, 100, 150],
            vec![50, 100, 150, 200],
            vec![100, 150, 200, 250]
        ])
    );

    let x = Image::read(&include_bytes!("../tdata/color_binary.ppm")[..]).unwrap();
    assert_eq!(x.info(), "PPM 5x3 Color");
    assert_eq!(x.max(), 6);
}

#[test]
fn writes() {
    let image = Image::new(Type::Gray, vec![vec![0u8, 1, 2], vec![1, 2, 3]])
        .unwrap()
        .with_max(3)
        .unwrap()
        .with_comment("Image\n");
    let mut out = vec![];
    assert_eq!(image.write(&mut out, Encoding::default()).unwrap(), 23);
    assert_eq!(out, b"P5\n# Image\n3 2\n3\n\x00\x01\x02\x01\x02\x03");
}

#[test]
fn builder_errors() {
    let image = || Image::new(Type::Gray, vec![vec![0u8, 1, 200]]).unwrap();
    assert!(matches!(
        image().with_max(100),
        Err(Error::SampleOutOfRange { value: 200, max: 100 })
    ));
    assert!(matches!(image().with_max(0), Err(Error::InvalidMaxValue(_))));
    assert!(matches!(
        Image::new(Type::Bilevel, vec![vec![0u8, 2]]),
        Err(Error::SampleOutOfRange { value: 2, max: 1 })
    ));
    assert!(matches!(
        Image::new(Type::Gray, vec![vec![0u8, 1], vec![2]]),
        Err(Error::RaggedRows { row: 1, .. })
    ));
    assert!(matches!(
        Image::new(Type::Color, Vec::<Vec<[u8; 3]>>::new()),
        Err(Error::EmptyGrid)
    ));
    // bitmaps keep their max
    let x = Image::new(Type::Bilevel, vec![vec![1u8]]).unwrap().with_max(9).unwrap();
    assert_eq!(x.max(), 1);
    assert_eq!(x.with_comment("").comment(), None);
}

#[test]
fn color_from_gray() {
    let x = Image::new(Type::Color, vec![vec![0u8, 1], vec![2, 3]]).unwrap();
    assert_eq!(
        x.rows(),
        Rows::Rgb(vec![vec![[0; 3], [1; 3]], vec![[2; 3], [3; 3]]])
    );
    let data = x.encode(Encoding::Binary).unwrap();
    assert_eq!(data, b"P6\n2 2\n255\n\x00\x00\x00\x01\x01\x01\x02\x02\x02\x03\x03\x03");
}
