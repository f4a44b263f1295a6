//! Markers — 26 named offsets, `a` through `z`.
//!
//! A marker is a weak reference: it stores a raw offset and nothing else.
//! Edits don't move it and nothing validates it on write. Whoever reads it
//! back clamps it to the buffer as it is *now*.

use std::fmt;

use crate::error::MarkerError;

/// Number of markers.
pub const MARKER_COUNT: usize = 26;

/// A marker name, guaranteed to be in `a`–`z`.
///
/// Symbols outside the alphabet are rejected when the `Marker` is built, so
/// the marker table never sees one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Marker(u8);

impl Marker {
    /// Validate a marker symbol.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::InvalidSymbol`] for anything but `a`–`z`.
    pub const fn new(ch: char) -> Result<Self, MarkerError> {
        if ch.is_ascii_lowercase() {
            Ok(Self(ch as u8 - b'a'))
        } else {
            Err(MarkerError::InvalidSymbol(ch))
        }
    }

    /// The marker's letter.
    #[must_use]
    pub const fn symbol(self) -> char {
        (b'a' + self.0) as char
    }

    /// Index into the marker table.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// All markers in alphabetical order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..MARKER_COUNT as u8).map(Self)
    }
}

impl TryFrom<char> for Marker {
    type Error = MarkerError;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        Self::new(ch)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The 26 stored offsets. Unset markers read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerTable {
    offsets: [usize; MARKER_COUNT],
}

impl MarkerTable {
    /// All markers at offset 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            offsets: [0; MARKER_COUNT],
        }
    }

    /// Store `offset` verbatim.
    pub const fn set(&mut self, marker: Marker, offset: usize) {
        self.offsets[marker.index()] = offset;
    }

    /// The raw stored offset, not clamped.
    #[must_use]
    pub const fn get(&self, marker: Marker) -> usize {
        self.offsets[marker.index()]
    }

    /// The stored offset clamped to `len`.
    #[must_use]
    pub fn clamped(&self, marker: Marker, len: usize) -> usize {
        self.get(marker).min(len)
    }

    /// Every marker with its raw offset, in alphabetical order.
    pub fn iter(&self) -> impl Iterator<Item = (Marker, usize)> + '_ {
        Marker::all().map(|m| (m, self.get(m)))
    }
}
