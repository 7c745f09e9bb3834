//! decoding utilities
use std::num::NonZeroU32;

use log::info;

use crate::{Encoding, Error, Format, Result, Type};

pub(crate) trait Read {
    fn rd<const N: usize>(&mut self) -> Option<[u8; N]>;
    fn by(&mut self) -> Option<u8> {
        Some(self.rd::<1>()?[0])
    }
}
impl<T: std::io::Read> Read for T {
    fn rd<const N: usize>(&mut self) -> Option<[u8; N]> {
        let mut buf = [0; N];
        self.read_exact(&mut buf).ok()?;
        Some(buf)
    }
}

macro_rules! dec_fn {
    ($doc:literal) => {
        #[doc = $doc]
        ///
        /// Anything after the pixels is ignored.
        pub fn decode(x: impl AsRef<[u8]>) -> Result<Output> {
            let mut x = x.as_ref();
            let header = crate::decode::decode_header(&mut x)?;
            if header.format != FORMAT {
                return Err(Error::MalformedHeader(format!(
                    "expected magic number {FORMAT}, found {}",
                    header.format
                )));
            }
            decode_body(&mut x, header.width, header.height)
        }
    };
}
pub(crate) use dec_fn;

/// Decoding options.
///
/// The default is permissive: anything after the pixels is ignored, and samples are not checked against the max value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    strict: bool,
}

impl Options {
    pub const fn new() -> Self {
        Self { strict: false }
    }

    /// In strict mode the decoder errors on
    /// - trailing data (raw images may still end with one whitespace byte, plain images with any amount of whitespace)
    /// - samples above the header's max value
    #[must_use]
    pub const fn set_strict_mode(mut self, yes: bool) -> Self {
        self.strict = yes;
        self
    }

    pub const fn strict_mode(&self) -> bool {
        self.strict
    }
}

/// Header for the older PNM formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub format: Format,
    pub width: NonZeroU32,
    pub height: NonZeroU32,
    /// Maximum value of each sample. Not present for bitmaps.
    pub max: Option<u8>,
    /// Comment lines, without the `#` and surrounding whitespace.
    pub comments: Vec<String>,
}

impl Header {
    /// The max value, 1 for bitmaps.
    pub fn max_value(&self) -> u8 {
        self.max.unwrap_or(1)
    }

    /// All comment lines joined with `\n`, if there were any.
    pub fn comment(&self) -> Option<String> {
        (!self.comments.is_empty()).then(|| self.comments.join("\n"))
    }
}

/// Skips whitespace and comments, collecting the comments.
fn skip<'a>(x: &mut &'a [u8], comments: &mut Vec<String>) {
    loop {
        let s: &'a [u8] = *x;
        match s {
            [b, rest @ ..] if b.is_ascii_whitespace() => *x = rest,
            [b'#', rest @ ..] => {
                let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
                comments.push(String::from_utf8_lossy(&rest[..end]).trim().to_owned());
                *x = &rest[end..];
            }
            _ => return,
        }
    }
}

/// Pulls a header token. Tokens end at whitespace or at the start of a comment.
fn token<'a>(x: &mut &'a [u8]) -> Option<&'a [u8]> {
    let s: &'a [u8] = *x;
    let end = s
        .iter()
        .position(|&b| b.is_ascii_whitespace() || b == b'#')
        .unwrap_or(s.len());
    *x = &s[end..];
    (end != 0).then_some(&s[..end])
}

/// Parses an unsigned decimal. [`None`] on anything else, or overflow.
fn number(x: &[u8]) -> Option<u32> {
    if x.is_empty() {
        return None;
    }
    x.iter().try_fold(0u32, |acc, &b| {
        b.is_ascii_digit().then_some(())?;
        acc.checked_mul(10)?.checked_add(u32::from(b - b'0'))
    })
}

fn lossy(x: &[u8]) -> String {
    String::from_utf8_lossy(x).into_owned()
}

/// Decodes the magic number. It must be at the very start.
pub fn magic(x: &mut &[u8]) -> Result<Format> {
    if x.is_empty() {
        return Err(Error::TruncatedHeader);
    }
    let t = token(x).unwrap_or_default();
    let format = match t {
        [b'P', n] => Format::from_magic(n.wrapping_sub(b'0')),
        _ => None,
    };
    format.ok_or_else(|| Error::MalformedHeader(format!("{:?} is not a valid magic number", lossy(t))))
}

fn field<'a>(x: &mut &'a [u8], comments: &mut Vec<String>) -> Result<&'a [u8]> {
    skip(x, comments);
    token(x).ok_or(Error::TruncatedHeader)
}

fn dimension(x: &[u8]) -> Result<NonZeroU32> {
    number(x)
        .and_then(NonZeroU32::new)
        .ok_or_else(|| Error::InvalidDimensions(lossy(x)))
}

fn max_value(x: &[u8]) -> Result<u8> {
    number(x)
        .and_then(|n| u8::try_from(n).ok())
        .filter(|&n| n != 0)
        .ok_or_else(|| Error::InvalidMaxValue(lossy(x)))
}

/// Get the older pnm formats header, leaving `x` at the start of the pixels.
///
/// Comments may appear between any two tokens.
/// For raw formats exactly one whitespace byte separates the header from the pixels.
pub fn decode_header(x: &mut &[u8]) -> Result<Header> {
    let format = magic(x)?;
    let mut comments = vec![];
    let width = dimension(field(x, &mut comments)?)?;
    let height = dimension(field(x, &mut comments)?)?;
    let max = match format.ty {
        Type::Bilevel => None,
        Type::Gray | Type::Color => Some(max_value(field(x, &mut comments)?)?),
    };
    pixels(width, height, format.ty.channels())?;

    if format.encoding == Encoding::Binary {
        match x.by() {
            // no pixels at all; the body decoder reports that
            None => {}
            Some(b) if b.is_ascii_whitespace() => {}
            Some(b) => {
                return Err(Error::MalformedHeader(format!(
                    "expected whitespace after header, found {:?}",
                    b as char
                )))
            }
        }
    }
    info!("{format} {width}x{height}, max {max:?}");
    Ok(Header {
        format,
        width,
        height,
        max,
        comments,
    })
}

/// Number of samples in a `width` × `height` image with `channels` samples per pixel.
pub(crate) fn pixels(width: NonZeroU32, height: NonZeroU32, channels: usize) -> Result<usize> {
    (width.get() as usize)
        .checked_mul(height.get() as usize)
        .and_then(|n| n.checked_mul(channels))
        .ok_or_else(|| Error::InvalidDimensions(format!("{width}x{height}")))
}

/// Pulls a whitespace delimited token off plain pixel data.
pub(crate) fn next_token<'a>(x: &mut &'a [u8]) -> Option<&'a [u8]> {
    let s: &'a [u8] = *x;
    let s = &s[s
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(s.len())..];
    let end = s
        .iter()
        .position(u8::is_ascii_whitespace)
        .unwrap_or(s.len());
    *x = &s[end..];
    (end != 0).then_some(&s[..end])
}

/// Reads `n` decimal samples off plain pixel data.
pub(crate) fn plain_samples(x: &mut &[u8], n: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(n.min(x.len()));
    while out.len() < n {
        let t = next_token(x).ok_or(Error::InsufficientData {
            expected: n,
            found: out.len(),
        })?;
        let sample = number(t)
            .and_then(|n| u8::try_from(n).ok())
            .ok_or_else(|| Error::InvalidSample(lossy(t)))?;
        out.push(sample);
    }
    Ok(out)
}

/// Takes exactly `n` bytes of raw pixel data.
pub(crate) fn take<'a>(x: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if x.len() < n {
        return Err(Error::InsufficientData {
            expected: n,
            found: x.len(),
        });
    }
    let s: &'a [u8] = *x;
    let (data, rest) = s.split_at(n);
    *x = rest;
    Ok(data)
}

/// Bytes of leftover data that strict mode would complain about.
pub(crate) fn trailing(x: &[u8], encoding: Encoding) -> usize {
    match (encoding, x) {
        (_, []) => 0,
        (Encoding::Binary, [b]) if b.is_ascii_whitespace() => 0,
        (Encoding::Ascii, _) if x.iter().all(u8::is_ascii_whitespace) => 0,
        _ => x.len(),
    }
}

#[cfg(test)]
pub(crate) fn nz(x: u32) -> NonZeroU32 {
    NonZeroU32::new(x).unwrap()
}

#[cfg(test)]
fn header(x: &[u8]) -> Result<(Header, &[u8])> {
    let mut x = x;
    let h = decode_header(&mut x)?;
    Ok((h, x))
}

#[test]
fn reads_header() {
    let (h, rest) = header(b"P5\n# made by hand\n4 3\n255\nxyz").unwrap();
    assert_eq!(h.format, Format::new(Type::Gray, Encoding::Binary));
    assert_eq!((h.width.get(), h.height.get()), (4, 3));
    assert_eq!(h.max, Some(255));
    assert_eq!(h.comment().as_deref(), Some("made by hand"));
    assert_eq!(rest, b"xyz");
}

#[test]
fn comments_between_any_tokens() {
    let (h, rest) =
        header(b"P3 #one\n\t#  two  \r\n5#three\n  3\n# four\n6\n0 6 0").unwrap();
    assert_eq!(h.format, Format::new(Type::Color, Encoding::Ascii));
    assert_eq!((h.width.get(), h.height.get(), h.max_value()), (5, 3, 6));
    assert_eq!(h.comments, ["one", "two", "three", "four"]);
    assert_eq!(rest, b"\n0 6 0");
}

#[test]
fn bitmaps_have_no_max() {
    let (h, rest) = header(b"P4\n6 2\n\x4c\x1c").unwrap();
    assert_eq!(h.max, None);
    assert_eq!(h.max_value(), 1);
    assert_eq!(h.comment(), None);
    assert_eq!(rest, b"\x4c\x1c");
    // the separator is exactly one byte, the next whitespace is already pixel data
    let (_, rest) = header(b"P4 6 2\n\n\x1c").unwrap();
    assert_eq!(rest, b"\n\x1c");
}

#[test]
fn header_errors() {
    assert!(matches!(header(b""), Err(Error::TruncatedHeader)));
    assert!(matches!(header(b"P7\n1 1\n"), Err(Error::MalformedHeader(_))));
    assert!(matches!(header(b"P61 1 1\n"), Err(Error::MalformedHeader(_))));
    assert!(matches!(header(b" P6 1 1\n"), Err(Error::MalformedHeader(_))));
    assert!(matches!(header(b"P2\n4"), Err(Error::TruncatedHeader)));
    assert!(matches!(header(b"P2\n4 3 # no max"), Err(Error::TruncatedHeader)));
    assert!(matches!(header(b"P1\n0 3\n"), Err(Error::InvalidDimensions(_))));
    assert!(matches!(header(b"P1\nfour 3\n"), Err(Error::InvalidDimensions(_))));
    assert!(matches!(header(b"P1\n99999999999 3\n"), Err(Error::InvalidDimensions(_))));
    assert!(matches!(header(b"P5\n4 3\n256\n"), Err(Error::InvalidMaxValue(_))));
    assert!(matches!(header(b"P5\n4 3\n0\n"), Err(Error::InvalidMaxValue(_))));
    assert!(matches!(header(b"P5\n4 3\n-1\n"), Err(Error::InvalidMaxValue(_))));
    assert!(matches!(header(b"P5\n4 3\n255#x\n"), Err(Error::MalformedHeader(_))));
}

#[test]
fn plain_tokens() {
    let mut x: &[u8] = b"  12\t0\r\n255 \n";
    assert_eq!(plain_samples(&mut x, 3).unwrap(), [12, 0, 255]);
    assert_eq!(x, b" \n");
    let mut x: &[u8] = b"1 2";
    assert!(matches!(
        plain_samples(&mut x, 3),
        Err(Error::InsufficientData {
            expected: 3,
            found: 2
        })
    ));
    let mut x: &[u8] = b"1 256";
    assert!(matches!(plain_samples(&mut x, 2), Err(Error::InvalidSample(_))));
}
