//! errors for decoding, encoding and building images.
use thiserror::Error;

/// Result alias with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while reading or writing a portable anymap.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Unrecognized magic number, or a raw header not followed by its separator byte.
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    /// Input ended before every header token was read.
    #[error("input ends inside the header")]
    TruncatedHeader,
    /// Width or height is not a positive decimal integer.
    #[error("invalid dimension {0:?}")]
    InvalidDimensions(String),
    /// Max value is not a decimal integer in `1..=255`.
    #[error("invalid max value {0:?}")]
    InvalidMaxValue(String),
    /// Payload shorter than the header promises.
    /// Counted in tokens for plain formats and bytes for raw formats.
    #[error("expected {expected} samples worth of data, found {found}")]
    InsufficientData { expected: usize, found: usize },
    /// Plain payload token that is not a sample.
    #[error("invalid sample {0:?}")]
    InvalidSample(String),
    #[error("sample {value} exceeds max value {max}")]
    SampleOutOfRange { value: u8, max: u8 },
    /// Pixel grid rows differ in length.
    #[error("row {row} has {found} pixels, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("pixel grid has no pixels")]
    EmptyGrid,
    /// Rgb rows given for a single channel image.
    #[error("color pixels given for a single channel image")]
    ChannelMismatch,
    /// Left over payload (strict mode only).
    #[error("{0} bytes of trailing data")]
    TrailingData(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
