//! Value interpretation — what the bytes under the cursor mean as numbers,
//! and how to turn a typed number back into bytes.
//!
//! [`Interpretation::at`] reads every common width and endianness starting
//! at an offset. Readings that would run past the end of the buffer are
//! `None`.
//!
//! [`ValueKind::encode`] goes the other way: it parses user text the way
//! `scanf("%i")` would (`0x` hex, leading-`0` octal, decimal, optional sign)
//! plus `0b`/`0o` prefixes, and floats with `str::parse`.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

// ---------------------------------------------------------------------------
// Interpretation
// ---------------------------------------------------------------------------

/// A little-endian / big-endian pair of readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endian<T> {
    pub le: T,
    pub be: T,
}

/// Every reading of the bytes starting at one offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub u8: u8,
    pub i8: i8,
    /// The byte as a printable ASCII character, if it is one.
    pub ascii: Option<char>,
    pub u16: Option<Endian<u16>>,
    pub i16: Option<Endian<i16>>,
    pub u32: Option<Endian<u32>>,
    pub i32: Option<Endian<i32>>,
    pub u64: Option<Endian<u64>>,
    pub i64: Option<Endian<i64>>,
    pub f32: Option<Endian<f32>>,
    pub f64: Option<Endian<f64>>,
}

/// Read `N` bytes at `offset` as a fixed array.
fn window<const N: usize>(bytes: &[u8], offset: usize) -> Option<[u8; N]> {
    bytes.get(offset..offset.checked_add(N)?)?.try_into().ok()
}

macro_rules! endian {
    ($bytes:expr, $offset:expr, $ty:ty) => {
        window::<{ size_of::<$ty>() }>($bytes, $offset).map(|w| Endian {
            le: <$ty>::from_le_bytes(w),
            be: <$ty>::from_be_bytes(w),
        })
    };
}

impl Interpretation {
    /// Interpret the bytes of `bytes` starting at `offset`. `None` if
    /// `offset` is past the end.
    #[must_use]
    pub fn at(bytes: &[u8], offset: usize) -> Option<Self> {
        let byte = *bytes.get(offset)?;
        Some(Self {
            u8: byte,
            i8: i8::from_ne_bytes([byte]),
            ascii: (byte.is_ascii_graphic() || byte == b' ').then_some(byte as char),
            u16: endian!(bytes, offset, u16),
            i16: endian!(bytes, offset, i16),
            u32: endian!(bytes, offset, u32),
            i32: endian!(bytes, offset, i32),
            u64: endian!(bytes, offset, u64),
            i64: endian!(bytes, offset, i64),
            f32: endian!(bytes, offset, f32),
            f64: endian!(bytes, offset, f64),
        })
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "c: {}  u8: {}  s8: {}",
            self.ascii.unwrap_or(' '),
            self.u8,
            self.i8
        )?;
        if let (Some(u), Some(i)) = (self.u16, self.i16) {
            writeln!(
                f,
                "u16le: {}  s16le: {}  u16be: {}  s16be: {}",
                u.le, i.le, u.be, i.be
            )?;
        }
        if let (Some(u), Some(i), Some(x)) = (self.u32, self.i32, self.f32) {
            writeln!(
                f,
                "u32le: {}  s32le: {}  u32be: {}  s32be: {}",
                u.le, i.le, u.be, i.be
            )?;
            writeln!(f, "f32le: {}  f32be: {}", x.le, x.be)?;
        }
        if let (Some(u), Some(i), Some(x)) = (self.u64, self.i64, self.f64) {
            writeln!(f, "u64le: {}  s64le: {}  h64le: {:016x}", u.le, i.le, u.le)?;
            writeln!(f, "u64be: {}  s64be: {}  h64be: {:016x}", u.be, i.be, u.be)?;
            writeln!(f, "f64le: {}  f64be: {}", x.le, x.be)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ValueKind
// ---------------------------------------------------------------------------

/// A typed value that can be punched into the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    U16Le,
    U16Be,
    U32Le,
    U32Be,
    U64Le,
    U64Be,
    F32Le,
    F32Be,
    F64Le,
    F64Be,
    /// A single ASCII character.
    Char,
}

impl ValueKind {
    /// The name used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::U16Le => "u16le",
            Self::U16Be => "u16be",
            Self::U32Le => "u32le",
            Self::U32Be => "u32be",
            Self::U64Le => "u64le",
            Self::U64Be => "u64be",
            Self::F32Le => "f32le",
            Self::F32Be => "f32be",
            Self::F64Le => "f64le",
            Self::F64Be => "f64be",
            Self::Char => "char",
        }
    }

    /// Parse `text` and encode it as this kind's bytes.
    ///
    /// Integers accept a leading `-`; negative values wrap into the
    /// unsigned width, so `-1` as `u16le` is `FF FF`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::Parse`] for unparseable text and
    /// [`ValueError::Range`] for integers that don't fit the width.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, ValueError> {
        let text = text.trim();
        let bytes = match self {
            Self::U16Le => self.int::<u16>(text, 16)?.to_le_bytes().to_vec(),
            Self::U16Be => self.int::<u16>(text, 16)?.to_be_bytes().to_vec(),
            Self::U32Le => self.int::<u32>(text, 32)?.to_le_bytes().to_vec(),
            Self::U32Be => self.int::<u32>(text, 32)?.to_be_bytes().to_vec(),
            Self::U64Le => self.int::<u64>(text, 64)?.to_le_bytes().to_vec(),
            Self::U64Be => self.int::<u64>(text, 64)?.to_be_bytes().to_vec(),
            Self::F32Le => self.float::<f32>(text)?.to_le_bytes().to_vec(),
            Self::F32Be => self.float::<f32>(text)?.to_be_bytes().to_vec(),
            Self::F64Le => self.float::<f64>(text)?.to_le_bytes().to_vec(),
            Self::F64Be => self.float::<f64>(text)?.to_be_bytes().to_vec(),
            Self::Char => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii() => vec![c as u8],
                    _ => return Err(self.parse_error(text)),
                }
            }
        };
        Ok(bytes)
    }

    fn parse_error(self, text: &str) -> ValueError {
        ValueError::Parse {
            kind: self.name(),
            text: text.to_string(),
        }
    }

    /// Parse an integer and check it fits in `bits` bits, either as an
    /// unsigned value or as a two's-complement negative one.
    fn int<T: TryFrom<u64>>(self, text: &str, bits: u32) -> Result<T, ValueError> {
        let value = parse_int(text).ok_or_else(|| self.parse_error(text))?;
        let min = -(1i128 << (bits - 1));
        let max = (1i128 << bits) - 1;
        if value < min || value > max {
            return Err(ValueError::Range {
                kind: self.name(),
                text: text.to_string(),
            });
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let wrapped = (value as u64) & (u64::MAX >> (64 - bits));
        T::try_from(wrapped).map_err(|_| self.parse_error(text))
    }

    fn float<T: FromStr>(self, text: &str) -> Result<T, ValueError> {
        text.parse().map_err(|_| self.parse_error(text))
    }
}

impl FromStr for ValueKind {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "u16le" => Self::U16Le,
            "u16be" => Self::U16Be,
            "u32le" => Self::U32Le,
            "u32be" => Self::U32Be,
            "u64le" => Self::U64Le,
            "u64be" => Self::U64Be,
            "f32le" => Self::F32Le,
            "f32be" => Self::F32Be,
            "f64le" => Self::F64Le,
            "f64be" => Self::F64Be,
            "char" | "c" => Self::Char,
            _ => return Err(ValueError::UnknownKind(s.to_string())),
        })
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a signed integer with an optional radix prefix.
///
/// Also used for addresses and counts on the command line.
#[must_use]
pub fn parse_int(text: &str) -> Option<i128> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (radix, digits) = if let Some(d) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, d)
    } else if let Some(d) = digits.strip_prefix("0b") {
        (2, d)
    } else if let Some(d) = digits.strip_prefix("0o") {
        (8, d)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = i128::from(u64::from_str_radix(digits, radix).ok()?);
    Some(if negative { -magnitude } else { magnitude })
}
