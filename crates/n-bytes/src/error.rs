//! Error types for the byte editing core.
//!
//! Ordinary negative outcomes stay out of this module: a search that finds
//! nothing returns `None`, never an error. What lands here is either a
//! rejected request (the buffer is untouched) or an I/O failure carrying the
//! exact number of bytes that made it through.

use std::io;

use thiserror::Error;

/// A buffer mutation that was refused. The buffer is unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("{len} bytes at offset {offset} won't fit in a {buffer_len}-byte buffer")]
    OutOfBounds {
        offset: usize,
        len: usize,
        buffer_len: usize,
    },

    #[error("cannot truncate a {len}-byte buffer at {at}")]
    TruncatePastEnd { at: usize, len: usize },
}

/// Malformed search pattern syntax. No pattern is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("empty search pattern")]
    Empty,

    #[error("odd number of hex digits")]
    OddDigitCount,

    #[error("invalid hex digit {ch:?} at position {position}")]
    InvalidDigit { ch: char, position: usize },

    #[error("mask has {mask} bytes but the pattern has {bytes}")]
    MaskLength { bytes: usize, mask: usize },
}

/// A marker symbol outside `a`–`z`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerError {
    #[error("invalid marker {0:?} (expected a-z)")]
    InvalidSymbol(char),
}

/// A byte range could not be handed to a sink in full.
#[derive(Error, Debug)]
#[error("wrote {written} out of {expected} bytes: {source}")]
pub struct ExportError {
    pub written: usize,
    pub expected: usize,
    #[source]
    pub source: io::Error,
}

/// A region operation that was refused or failed.
#[derive(Error, Debug)]
pub enum RegionError {
    #[error("there are no bytes in the buffer")]
    EmptyBuffer,

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// A typed value that could not be encoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("unknown value kind {0:?}")]
    UnknownKind(String),

    #[error("cannot parse {text:?} as {kind}")]
    Parse { kind: &'static str, text: String },

    #[error("{text:?} does not fit in {kind}")]
    Range { kind: &'static str, text: String },
}

/// A `set` directive that could not be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("unknown option: {0}")]
    Unknown(String),

    #[error("not a boolean option: {0}")]
    NotBool(String),

    #[error("not a numeric option: {0}")]
    NotNumeric(String),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Anything a session operation can report.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no search pattern yet")]
    NoPattern,

    #[error("the buffer is empty")]
    EmptyBuffer,

    #[error("invalid hex digit {0:?}")]
    NotHex(char),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Marker(#[from] MarkerError),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Option(#[from] OptionError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<ExportError> for SessionError {
    fn from(e: ExportError) -> Self {
        Self::Region(RegionError::Export(e))
    }
}
