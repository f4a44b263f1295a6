//! Search patterns — the bytes to look for, and which bits of them matter.
//!
//! A [`SearchPattern`] is built from the small syntax typed at the `/` and
//! `?` prompts:
//!
//! | Input            | Pattern                                   |
//! |------------------|-------------------------------------------|
//! | `0f fe 42`       | bytes `0F FE 42`, compared exactly        |
//! | `0ffe42`         | same — whitespace is ignored              |
//! | `de ??`          | `DE 00`, mask `FF 00` (second byte: any)  |
//! | `4?`             | `40`, mask `F0` (high nibble must be 4)   |
//! | `dead & ff0f`    | `DE AD`, mask `FF 0F`                     |
//! | `thello`         | the literal bytes of `hello`              |
//!
//! Parsing is all-or-nothing: malformed input produces a [`PatternError`]
//! and no pattern, so the matcher never sees half a needle.

use std::fmt;

use crate::error::PatternError;
use crate::search::{self, SearchDirection};

/// A needle plus an optional parallel compare-mask.
///
/// In the mask a set bit means "compare", an unset bit means "don't care".
/// When present, the mask is exactly as long as the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPattern {
    bytes: Vec<u8>,
    mask: Option<Vec<u8>>,
}

impl SearchPattern {
    /// An exact-match pattern.
    #[must_use]
    pub const fn exact(bytes: Vec<u8>) -> Self {
        Self { bytes, mask: None }
    }

    /// A masked pattern. Bits the mask ignores are cleared from `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::MaskLength`] if the mask and the bytes differ
    /// in length.
    pub fn masked(bytes: Vec<u8>, mask: Vec<u8>) -> Result<Self, PatternError> {
        if bytes.len() != mask.len() {
            return Err(PatternError::MaskLength {
                bytes: bytes.len(),
                mask: mask.len(),
            });
        }
        let bytes = bytes.iter().zip(&mask).map(|(b, m)| b & m).collect();
        Ok(Self {
            bytes,
            mask: Some(mask),
        })
    }

    /// Parse the prompt syntax described in the module docs.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] for empty input, an odd number of hex
    /// digits, a character that isn't a hex digit (or `?`), or a mask whose
    /// length doesn't match the pattern.
    pub fn parse(input: &str) -> Result<Self, PatternError> {
        if let Some(text) = input.strip_prefix('t') {
            if text.is_empty() {
                return Err(PatternError::Empty);
            }
            return Ok(Self::exact(text.as_bytes().to_vec()));
        }

        if let Some((pat, mask)) = input.split_once('&') {
            let (bytes, wild) = parse_hex(pat, true)?;
            let (mask, _) = parse_hex(mask, false)?;
            // An explicit mask also has to respect any `?` nibbles.
            let mask = mask.iter().zip(wild.iter()).map(|(m, w)| m & w).collect();
            return Self::masked(bytes, mask);
        }

        let (bytes, mask) = parse_hex(input, true)?;
        if mask.iter().all(|&m| m == 0xFF) {
            Ok(Self::exact(bytes))
        } else {
            Self::masked(bytes, mask)
        }
    }

    /// The needle bytes. Don't-care bits are zero.
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The compare-mask, if any.
    #[inline]
    #[must_use]
    pub fn mask(&self) -> Option<&[u8]> {
        self.mask.as_deref()
    }

    /// Needle length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for the zero-length pattern, which never matches.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Search `haystack` in `direction`, dispatching to the exact or masked
    /// matcher. Returns the offset of the match within `haystack`.
    #[must_use]
    pub fn find_in(&self, haystack: &[u8], direction: SearchDirection) -> Option<usize> {
        match (&self.mask, direction) {
            (None, SearchDirection::Forward) => search::find_forward(haystack, &self.bytes),
            (None, SearchDirection::Backward) => search::find_backward(haystack, &self.bytes),
            (Some(mask), SearchDirection::Forward) => {
                search::find_forward_masked(haystack, &self.bytes, mask)
            }
            (Some(mask), SearchDirection::Backward) => {
                search::find_backward_masked(haystack, &self.bytes, mask)
            }
        }
    }
}

impl fmt::Display for SearchPattern {
    /// Hex form, with `?` for don't-care nibbles. Parses back to an equal
    /// pattern when every mask nibble is all-or-nothing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &b) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let m = self.mask.as_ref().map_or(0xFF, |mask| mask[i]);
            for (shift, nibble_mask) in [(4, 0xF0u8), (0, 0x0F)] {
                if m & nibble_mask == 0 {
                    f.write_str("?")?;
                } else {
                    write!(f, "{:x}", (b >> shift) & 0x0F)?;
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Hex parsing
// ---------------------------------------------------------------------------

/// Parse whitespace-insensitive hex pairs. Returns the bytes and, when
/// `allow_wild` is set, a mask with `?` nibbles cleared.
fn parse_hex(input: &str, allow_wild: bool) -> Result<(Vec<u8>, Vec<u8>), PatternError> {
    let mut bytes = Vec::new();
    let mut mask = Vec::new();
    let mut high: Option<(u8, u8)> = None;

    for (position, ch) in input.char_indices() {
        if ch.is_whitespace() {
            continue;
        }
        let (value, nibble_mask) = match ch {
            '?' if allow_wild => (0, 0),
            _ => match ch.to_digit(16) {
                #[allow(clippy::cast_possible_truncation)]
                Some(d) => (d as u8, 0x0F),
                None => return Err(PatternError::InvalidDigit { ch, position }),
            },
        };
        match high.take() {
            None => high = Some((value, nibble_mask)),
            Some((hv, hm)) => {
                bytes.push((hv << 4) | value);
                mask.push((hm << 4) | nibble_mask);
            }
        }
    }

    if high.is_some() {
        return Err(PatternError::OddDigitCount);
    }
    if bytes.is_empty() {
        return Err(PatternError::Empty);
    }
    Ok((bytes, mask))
}
