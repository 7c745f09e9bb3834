//! encoding utilities
use atools::Join;

use crate::{Error, Format, Result};

/// Writes `x` in decimal.
pub(crate) fn encodeu32(x: u32, out: &mut Vec<u8>) {
    let mut buf = [0; 10];
    let mut i = buf.len();
    let mut x = x;
    loop {
        i -= 1;
        buf[i] = b'0' + (x % 10) as u8;
        x /= 10;
        if x == 0 {
            break;
        }
    }
    out.extend_from_slice(&buf[i..]);
}

pub(crate) const fn encode_bool(x: bool) -> u8 {
    if x {
        b'1'
    } else {
        b'0'
    }
}

/// Writes `<magic>\n[# line\n]*<width> <height>\n[<max>\n]`.
///
/// Every line of `comment` becomes its own comment line.
pub(crate) fn header(
    format: Format,
    (width, height): (u32, u32),
    max: Option<u8>,
    comment: Option<&str>,
    out: &mut Vec<u8>,
) {
    out.extend(b'P'.join(format.magic() + b'0'));
    out.push(b'\n');
    for line in comment.into_iter().flat_map(str::lines) {
        out.extend_from_slice(b"# ");
        out.extend_from_slice(line.as_bytes());
        out.push(b'\n');
    }
    encodeu32(width, out);
    out.push(b' ');
    encodeu32(height, out);
    out.push(b'\n');
    if let Some(max) = max {
        encodeu32(u32::from(max), out);
        out.push(b'\n');
    }
}

/// Size of [`header`]'s output, give or take.
pub(crate) fn header_size(comment: Option<&str>) -> usize {
    3 // P1\n
        + comment.map_or(0, |x| x.len() + 3 * x.lines().count()) // # ..\n
        + 22 // 4294967295 4294967295\n
        + 4 // 255\n
}

/// Writes one row of plain samples: space separated, newline terminated.
pub(crate) fn plain_row(row: impl IntoIterator<Item = u8>, out: &mut Vec<u8>) {
    for (i, x) in row.into_iter().enumerate() {
        if i != 0 {
            out.push(b' ');
        }
        encodeu32(u32::from(x), out);
    }
    out.push(b'\n');
}

/// Fails on the first sample above `max`.
pub(crate) fn check_max(x: &[u8], max: u8) -> Result<()> {
    match x.iter().find(|&&value| value > max) {
        Some(&value) => Err(Error::SampleOutOfRange { value, max }),
        None => Ok(()),
    }
}

/// Flattens rows into (width, height, samples), checking that they make a rectangle.
pub(crate) fn flatten<T: Copy>(rows: &[Vec<T>]) -> Result<((u32, u32), Vec<T>)> {
    let width = rows.first().map_or(0, Vec::len);
    if width == 0 {
        return Err(Error::EmptyGrid);
    }
    if let Some((row, x)) = rows.iter().enumerate().find(|(_, x)| x.len() != width) {
        return Err(Error::RaggedRows {
            row,
            expected: width,
            found: x.len(),
        });
    }
    let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(rows.len())) else {
        return Err(Error::InvalidDimensions(format!("{width}x{}", rows.len())));
    };
    Ok(((w, h), rows.concat()))
}

#[test]
fn numbers() {
    let mut out = vec![];
    for x in [0, 7, 10, 255, u32::MAX] {
        encodeu32(x, &mut out);
        out.push(b',');
    }
    assert_eq!(out, b"0,7,10,255,4294967295,");
}

#[test]
fn headers() {
    use crate::{Encoding, Type};
    let mut out = vec![];
    header(
        Format::new(Type::Gray, Encoding::Binary),
        (4, 3),
        Some(250),
        Some("a\nb"),
        &mut out,
    );
    assert_eq!(out, b"P5\n# a\n# b\n4 3\n250\n");
    out.clear();
    header(
        Format::new(Type::Bilevel, Encoding::Ascii),
        (5, 6),
        None,
        None,
        &mut out,
    );
    assert_eq!(out, b"P1\n5 6\n");
}

#[test]
fn flattening() {
    assert_eq!(
        flatten(&[vec![1, 2], vec![3, 4], vec![5, 6]]).unwrap(),
        ((2, 3), vec![1, 2, 3, 4, 5, 6])
    );
    assert!(matches!(
        flatten(&[vec![1, 2], vec![3]]),
        Err(Error::RaggedRows {
            row: 1,
            expected: 2,
            found: 1
        })
    ));
    assert!(matches!(flatten::<u8>(&[]), Err(Error::EmptyGrid)));
    assert!(matches!(flatten::<u8>(&[vec![]]), Err(Error::EmptyGrid)));
    assert!(matches!(
        check_max(&[1, 2, 9, 3], 4),
        Err(Error::SampleOutOfRange { value: 9, max: 4 })
    ));
}
