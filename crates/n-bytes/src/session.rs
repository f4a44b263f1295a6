//! Editor session — one buffer, its markers and clipboard, and a cursor.
//!
//! [`Session`] is the composition point: it slices the buffer around the
//! cursor for searches, resolves marker pairs for region operations, and
//! keeps the cursor valid across every mutation. Nothing here is global; a
//! caller may hold as many sessions as it likes.
//!
//! # Cursor rules
//!
//! - The cursor is a byte offset. In a non-empty buffer it always sits on a
//!   byte (`cursor < len`); in an empty buffer it is 0.
//! - Nibble punching works on the high nibble first, then the low nibble,
//!   then moves to the next byte.
//! - Any explicit move resets to the high nibble.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use crate::buffer::{ByteBuffer, INITIAL_CAPACITY};
use crate::dump;
use crate::error::SessionError;
use crate::interpret::{Interpretation, ValueKind};
use crate::marker::{Marker, MarkerTable};
use crate::options::{self, Options};
use crate::pattern::SearchPattern;
use crate::region::{Region, RegionStore};
use crate::search::SearchDirection;

/// Where an insertion lands relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Before the byte under the cursor.
    Before,
    /// After the byte under the cursor.
    After,
}

impl Side {
    /// The insertion offset for a cursor in a `len`-byte buffer.
    const fn offset(self, cursor: usize, len: usize) -> usize {
        let at = match self {
            Self::Before => cursor,
            Self::After => cursor + 1,
        };
        if at > len { len } else { at }
    }
}

/// A byte buffer being edited.
#[derive(Debug, Default)]
pub struct Session {
    buffer: ByteBuffer,
    regions: RegionStore,
    cursor: usize,
    low_nibble: bool,
    last_pattern: Option<SearchPattern>,
    options: Options,
}

impl Session {
    /// An empty session with a pre-sized buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_buffer(ByteBuffer::with_capacity(INITIAL_CAPACITY))
    }

    /// A session over an existing buffer, cursor at 0.
    #[must_use]
    pub fn with_buffer(buffer: ByteBuffer) -> Self {
        Self {
            buffer,
            regions: RegionStore::new(),
            cursor: 0,
            low_nibble: false,
            last_pattern: None,
            options: Options::default(),
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn buffer(&self) -> &ByteBuffer {
        &self.buffer
    }

    #[must_use]
    pub const fn regions(&self) -> &RegionStore {
        &self.regions
    }

    #[must_use]
    pub const fn markers(&self) -> &MarkerTable {
        self.regions.markers()
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    pub const fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// The byte offset under the cursor.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// True if the next punched nibble goes into the low half of the byte.
    #[must_use]
    pub const fn is_low_nibble(&self) -> bool {
        self.low_nibble
    }

    /// The pattern `find_next` would use.
    #[must_use]
    pub const fn last_pattern(&self) -> Option<&SearchPattern> {
        self.last_pattern.as_ref()
    }

    /// Pull the cursor back onto the last byte after the buffer shrank.
    fn clamp_cursor(&mut self) {
        let last = self.buffer.len().saturating_sub(1);
        if self.cursor > last {
            self.cursor = last;
            self.low_nibble = false;
        }
    }

    const fn place(&mut self, offset: usize) {
        self.cursor = offset;
        self.low_nibble = false;
    }

    // -- Files --------------------------------------------------------------

    /// Replace the buffer with the contents of `path`. The cursor goes to
    /// 0; markers and clipboard survive. Returns the number of bytes read.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file can't be read. The session
    /// is unchanged.
    pub fn open(&mut self, path: &Path) -> Result<usize, SessionError> {
        let buffer = ByteBuffer::from_file(path)?;
        let len = buffer.len();
        self.buffer = buffer;
        self.place(0);
        info!(path = %path.display(), len, "opened");
        Ok(len)
    }

    /// Replace the buffer contents wholesale, keeping the file path.
    pub fn load(&mut self, bytes: Vec<u8>) -> usize {
        let len = self.buffer.load(bytes);
        self.place(0);
        len
    }

    /// Save to `path`, or to the buffer's own path when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Region`] wrapping an export error with the
    /// number of bytes written if the file can't be created or written.
    pub fn save(&mut self, path: Option<&Path>) -> Result<usize, SessionError> {
        let written = match path {
            Some(path) => self.buffer.save_as(path)?,
            None => self.buffer.save()?,
        };
        info!(written, "saved");
        Ok(written)
    }

    /// Splice a whole file in before or after the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file can't be read. The buffer is
    /// unchanged.
    pub fn insert_file(&mut self, path: &Path, side: Side) -> Result<usize, SessionError> {
        let at = side.offset(self.cursor, self.buffer.len());
        Ok(self.buffer.insert_file(at, path)?)
    }

    // -- Movement -----------------------------------------------------------

    /// Jump to an absolute address. Negative addresses count back from the
    /// end (`-1` is the last byte). Out-of-range requests leave the cursor
    /// where it is and return `false`.
    pub fn goto(&mut self, address: i64) -> bool {
        let len = self.buffer.len();
        let target = if address >= 0 {
            usize::try_from(address).ok().filter(|&a| a < len)
        } else {
            usize::try_from(address.unsigned_abs())
                .ok()
                .and_then(|back| len.checked_sub(back))
        };
        match target {
            Some(offset) => {
                self.place(offset);
                true
            }
            None => false,
        }
    }

    /// Move by `delta` bytes, wrapping around either end of the buffer.
    pub fn advance(&mut self, delta: i64) {
        let Ok(len) = i128::try_from(self.buffer.len()) else {
            return;
        };
        if len == 0 {
            return;
        }
        let from = i128::try_from(self.cursor).unwrap_or(0);
        let to = (from + i128::from(delta)).rem_euclid(len);
        self.place(usize::try_from(to).unwrap_or(0));
    }

    pub const fn home(&mut self) {
        self.place(0);
    }

    pub const fn end(&mut self) {
        self.place(self.buffer.len().saturating_sub(1));
    }

    // -- Search -------------------------------------------------------------

    /// Remember `pattern` and search for it from the cursor.
    ///
    /// # Errors
    ///
    /// As [`find_next`](Self::find_next), which cannot report
    /// [`SessionError::NoPattern`] here.
    pub fn find(
        &mut self,
        direction: SearchDirection,
        pattern: SearchPattern,
    ) -> Result<Option<usize>, SessionError> {
        self.last_pattern = Some(pattern);
        self.find_next(direction)
    }

    /// Search for the remembered pattern. Forward looks at the bytes after
    /// the cursor, backward at the bytes before it. On a hit the cursor moves
    /// to the match and its offset is returned; a miss leaves the cursor
    /// alone and returns `None`.
    ///
    /// With `wrapscan` set, a miss is retried over the rest of the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoPattern`] if no pattern was given yet.
    pub fn find_next(&mut self, direction: SearchDirection) -> Result<Option<usize>, SessionError> {
        let pattern = self.last_pattern.as_ref().ok_or(SessionError::NoPattern)?;
        let hit = search_from(
            self.buffer.as_bytes(),
            self.cursor,
            pattern,
            direction,
            self.options.wrapscan,
        );
        debug!(?direction, cursor = self.cursor, ?hit, "search");
        if let Some(offset) = hit {
            self.place(offset);
        }
        Ok(hit)
    }

    // -- Punch-in -----------------------------------------------------------

    /// Write one hex digit into the current nibble, then step to the next
    /// nibble. On the last byte's low nibble the cursor stays put.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotHex`] for a non-hex character and
    /// [`SessionError::EmptyBuffer`] when there is no byte to edit.
    pub fn punch_nibble(&mut self, digit: char) -> Result<(), SessionError> {
        let nibble = hex_value(digit)?;
        let byte = self
            .buffer
            .get(self.cursor)
            .ok_or(SessionError::EmptyBuffer)?;
        let byte = if self.low_nibble {
            (byte & 0xF0) | nibble
        } else {
            (nibble << 4) | (byte & 0x0F)
        };
        self.buffer.overwrite(self.cursor, &[byte])?;
        if self.low_nibble {
            if self.cursor + 1 < self.buffer.len() {
                self.place(self.cursor + 1);
            }
        } else {
            self.low_nibble = true;
        }
        Ok(())
    }

    /// Punch a run of hex digits, whitespace ignored. Every digit is
    /// checked before the first one is written. Returns the number of
    /// nibbles written.
    ///
    /// # Errors
    ///
    /// Same as [`punch_nibble`](Self::punch_nibble).
    pub fn punch_hex(&mut self, digits: &str) -> Result<usize, SessionError> {
        let digits: Vec<char> = digits.chars().filter(|c| !c.is_whitespace()).collect();
        if let Some(&bad) = digits.iter().find(|c| !c.is_ascii_hexdigit()) {
            return Err(SessionError::NotHex(bad));
        }
        if self.buffer.is_empty() && !digits.is_empty() {
            return Err(SessionError::EmptyBuffer);
        }
        for &digit in &digits {
            self.punch_nibble(digit)?;
        }
        Ok(digits.len())
    }

    /// Overwrite bytes at the cursor and move past them (stopping on the
    /// last byte). Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an out-of-bounds [`SessionError::Buffer`] if the text runs
    /// past the end; nothing is written.
    pub fn punch_text(&mut self, bytes: &[u8]) -> Result<usize, SessionError> {
        if bytes.is_empty() {
            return Ok(0);
        }
        self.buffer.overwrite(self.cursor, bytes)?;
        self.place(self.cursor + bytes.len());
        self.clamp_cursor();
        Ok(bytes.len())
    }

    /// Encode a typed value and overwrite it at the cursor. The cursor
    /// doesn't move. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Value`] if the text doesn't parse as `kind`,
    /// or an out-of-bounds [`SessionError::Buffer`] if it won't fit.
    pub fn punch_value(&mut self, kind: ValueKind, text: &str) -> Result<usize, SessionError> {
        let bytes = kind.encode(text)?;
        self.buffer.overwrite(self.cursor, &bytes)?;
        self.low_nibble = false;
        debug!(%kind, offset = self.cursor, "punched value");
        Ok(bytes.len())
    }

    // -- Insert / truncate --------------------------------------------------

    /// Insert `count` zero bytes before or after the cursor.
    pub fn insert_zeroes(&mut self, side: Side, count: usize) -> usize {
        let at = side.offset(self.cursor, self.buffer.len());
        self.buffer.insert_zeroes(at, count);
        count
    }

    /// Drop the byte under the cursor and everything after it. The cursor
    /// moves to the new last byte. Returns the new length.
    ///
    /// # Errors
    ///
    /// Cannot fail while the cursor is valid; the buffer error is passed on
    /// otherwise.
    pub fn truncate_at_cursor(&mut self) -> Result<usize, SessionError> {
        let at = self.cursor;
        self.buffer.truncate(at)?;
        self.place(at.saturating_sub(1));
        Ok(at)
    }

    // -- Markers and regions ------------------------------------------------

    /// Store the cursor in marker `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Marker`] for a symbol outside `a`–`z`.
    pub fn set_marker(&mut self, symbol: char) -> Result<(), SessionError> {
        let marker = Marker::new(symbol)?;
        self.regions.set_marker(marker, self.cursor);
        Ok(())
    }

    /// Jump to marker `symbol` if it still points inside the buffer.
    /// Returns whether the cursor moved.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Marker`] for a symbol outside `a`–`z`.
    pub fn goto_marker(&mut self, symbol: char) -> Result<bool, SessionError> {
        let offset = self.markers().get(Marker::new(symbol)?);
        if offset < self.buffer.len() {
            self.place(offset);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Resolve two marker symbols into a region.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Marker`] if either symbol is invalid.
    pub fn region(&self, a: char, b: char) -> Result<Region, SessionError> {
        let (a, b) = (Marker::new(a)?, Marker::new(b)?);
        Ok(self.regions.read_marker_pair(a, b, &self.buffer))
    }

    /// Zero-fill the region between two markers.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid marker or an empty buffer.
    pub fn blank(&mut self, a: char, b: char) -> Result<usize, SessionError> {
        let region = self.region(a, b)?;
        Ok(self.regions.blank(&mut self.buffer, region)?)
    }

    /// Remove the region between two markers. The cursor lands on the byte
    /// before the cut. Returns the number of bytes removed.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid marker or an empty buffer.
    pub fn cut(&mut self, a: char, b: char) -> Result<usize, SessionError> {
        let region = self.region(a, b)?;
        let removed = self.regions.cut(&mut self.buffer, region)?;
        self.place(removed.start().saturating_sub(1));
        self.clamp_cursor();
        Ok(removed.len())
    }

    /// Copy the region between two markers into the clipboard.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid marker or an empty buffer.
    pub fn yank(&mut self, a: char, b: char) -> Result<usize, SessionError> {
        let region = self.region(a, b)?;
        Ok(self.regions.yank(&self.buffer, region)?)
    }

    /// Insert the clipboard before or after the cursor.
    pub fn paste(&mut self, side: Side) -> usize {
        let at = side.offset(self.cursor, self.buffer.len());
        self.regions.paste(&mut self.buffer, at)
    }

    /// Copy the clipboard over the bytes starting at the cursor.
    ///
    /// # Errors
    ///
    /// Returns an out-of-bounds error, with nothing written, if the
    /// clipboard runs past the end.
    pub fn overwrite_from_clipboard(&mut self) -> Result<usize, SessionError> {
        Ok(self
            .regions
            .overwrite_from_clipboard(&mut self.buffer, self.cursor)?)
    }

    /// Write the region between two markers to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid marker, an empty buffer, or a short
    /// write (with the exact count written).
    pub fn export<W: Write>(&self, a: char, b: char, sink: &mut W) -> Result<usize, SessionError> {
        let region = self.region(a, b)?;
        Ok(self.regions.export(&self.buffer, region, sink)?)
    }

    /// Write the region between two markers to a new file at `path`.
    ///
    /// # Errors
    ///
    /// As [`export`](Self::export), plus [`SessionError::Io`] if the file
    /// can't be created.
    pub fn write_region(&self, a: char, b: char, path: &Path) -> Result<usize, SessionError> {
        let region = self.region(a, b)?;
        let mut file = fs::File::create(path)?;
        let written = self.regions.export(&self.buffer, region, &mut file)?;
        info!(path = %path.display(), written, "wrote region");
        Ok(written)
    }

    // -- Inspection ---------------------------------------------------------

    /// Every reading of the bytes under the cursor.
    #[must_use]
    pub fn interpret(&self) -> Option<Interpretation> {
        Interpretation::at(self.buffer.as_bytes(), self.cursor)
    }

    /// Hex dump of `rows` rows (the `rows` option when `None`), starting at
    /// the cursor's row.
    #[must_use]
    pub fn dump(&self, rows: Option<usize>) -> String {
        let rows = rows.unwrap_or(self.options.rows);
        let start = dump::row_of(self.cursor, &self.options);
        dump::dump(&self.buffer, start, rows, &self.options)
    }

    /// Apply a `set` argument string. Returns the messages to show.
    ///
    /// # Errors
    ///
    /// Stops at the first directive that fails; earlier ones stay applied.
    pub fn set(&mut self, args: &str) -> Result<Vec<String>, SessionError> {
        let mut messages = Vec::new();
        for directive in options::parse_set(args) {
            if let Some(msg) = self.options.apply(&directive)? {
                messages.push(msg);
            }
        }
        Ok(messages)
    }
}

/// Value of a hex digit.
fn hex_value(digit: char) -> Result<u8, SessionError> {
    digit
        .to_digit(16)
        .and_then(|d| u8::try_from(d).ok())
        .ok_or(SessionError::NotHex(digit))
}

/// Search `bytes` for `pattern` relative to `cursor`.
///
/// Forward looks at `[cursor+1, len)`; its wrap covers matches starting at
/// or before the cursor. Backward looks at `[0, cursor)`; its wrap covers
/// `[cursor, len)`.
fn search_from(
    bytes: &[u8],
    cursor: usize,
    pattern: &SearchPattern,
    direction: SearchDirection,
    wrap: bool,
) -> Option<usize> {
    let len = bytes.len();
    match direction {
        SearchDirection::Forward => {
            let start = (cursor + 1).min(len);
            let hit = pattern
                .find_in(&bytes[start..], direction)
                .map(|o| o + start);
            if hit.is_some() || !wrap {
                return hit;
            }
            let end = cursor.saturating_add(pattern.len()).min(len);
            pattern.find_in(&bytes[..end], direction)
        }
        SearchDirection::Backward => {
            let end = cursor.min(len);
            let hit = pattern.find_in(&bytes[..end], direction);
            if hit.is_some() || !wrap {
                return hit;
            }
            pattern
                .find_in(&bytes[end..], direction)
                .map(|o| o + end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BufferError, RegionError};
    use pretty_assertions::assert_eq;

    fn session(bytes: &[u8]) -> Session {
        Session::with_buffer(ByteBuffer::from_bytes(bytes.to_vec()))
    }

    fn pat(s: &str) -> SearchPattern {
        SearchPattern::parse(s).unwrap()
    }

    // -- Movement -----------------------------------------------------------

    #[test]
    fn goto_absolute_and_from_end() {
        let mut s = session(&[0; 10]);
        assert!(s.goto(3));
        assert_eq!(s.cursor(), 3);
        assert!(s.goto(-1));
        assert_eq!(s.cursor(), 9);
        assert!(s.goto(-10));
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn goto_out_of_range_keeps_cursor() {
        let mut s = session(&[0; 10]);
        s.goto(4);
        assert!(!s.goto(10));
        assert!(!s.goto(-11));
        assert_eq!(s.cursor(), 4);
        assert!(!session(&[]).goto(0));
    }

    #[test]
    fn advance_wraps_both_ways() {
        let mut s = session(&[0; 10]);
        s.advance(13);
        assert_eq!(s.cursor(), 3);
        s.advance(-5);
        assert_eq!(s.cursor(), 8);
        s.advance(-28);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn advance_on_empty_is_noop() {
        let mut s = session(&[]);
        s.advance(5);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn home_and_end() {
        let mut s = session(&[0; 6]);
        s.end();
        assert_eq!(s.cursor(), 5);
        s.home();
        assert_eq!(s.cursor(), 0);
    }

    // -- Search -------------------------------------------------------------

    #[test]
    fn find_forward_skips_cursor_byte() {
        let mut s = session(&[0xAA, 0xBB, 0xAA, 0xBB, 0xAA]);
        let hit = s.find(SearchDirection::Forward, pat("aa bb")).unwrap();
        assert_eq!(hit, Some(2));
        assert_eq!(s.cursor(), 2);
        assert_eq!(s.find_next(SearchDirection::Forward).unwrap(), None);
        assert_eq!(s.cursor(), 2);
    }

    #[test]
    fn find_backward_searches_before_cursor() {
        let mut s = session(&[0xAA, 0xBB, 0xAA, 0xBB, 0xAA]);
        s.end();
        assert_eq!(
            s.find(SearchDirection::Backward, pat("aabb")).unwrap(),
            Some(2)
        );
        assert_eq!(s.find_next(SearchDirection::Backward).unwrap(), Some(0));
        assert_eq!(s.find_next(SearchDirection::Backward).unwrap(), None);
    }

    #[test]
    fn find_next_without_pattern() {
        let mut s = session(&[1, 2, 3]);
        assert!(matches!(
            s.find_next(SearchDirection::Forward),
            Err(SessionError::NoPattern)
        ));
    }

    #[test]
    fn wrapscan_retries_from_start() {
        let mut s = session(&[0x11, 0x22, 0x00, 0x00, 0x00]);
        s.goto(3);
        assert_eq!(s.find(SearchDirection::Forward, pat("1122")).unwrap(), None);
        s.set("ws").unwrap();
        assert_eq!(s.find_next(SearchDirection::Forward).unwrap(), Some(0));
    }

    #[test]
    fn wrapscan_backward_retries_from_end() {
        let mut s = session(&[0x00, 0x00, 0x00, 0x11, 0x22]);
        s.set("wrapscan").unwrap();
        assert_eq!(s.find(SearchDirection::Backward, pat("1122")).unwrap(), Some(3));
    }

    #[test]
    fn masked_search_through_session() {
        let mut s = session(&[0x00, 0xDE, 0x00, 0xBE, 0xEF]);
        assert_eq!(s.find(SearchDirection::Forward, pat("de ??")).unwrap(), Some(1));
    }

    // -- Punch-in -----------------------------------------------------------

    #[test]
    fn nibbles_fill_high_then_low() {
        let mut s = session(&[0x00, 0x00]);
        s.punch_nibble('a').unwrap();
        assert!(s.is_low_nibble());
        s.punch_nibble('B').unwrap();
        assert_eq!(s.cursor(), 1);
        assert!(!s.is_low_nibble());
        assert_eq!(s.buffer().as_bytes(), &[0xAB, 0x00]);
    }

    #[test]
    fn last_nibble_keeps_cursor() {
        let mut s = session(&[0xFF]);
        s.punch_hex("12").unwrap();
        assert_eq!(s.buffer().as_bytes(), &[0x12]);
        assert_eq!(s.cursor(), 0);
        s.punch_nibble('3').unwrap();
        assert_eq!(s.buffer().as_bytes(), &[0x13]);
    }

    #[test]
    fn punch_hex_checks_every_digit_first() {
        let mut s = session(&[0; 4]);
        assert!(matches!(s.punch_hex("12 3x"), Err(SessionError::NotHex('x'))));
        assert_eq!(s.buffer().as_bytes(), &[0; 4]);
        assert_eq!(s.punch_hex("de ad be").unwrap(), 6);
        assert_eq!(s.buffer().as_bytes(), &[0xDE, 0xAD, 0xBE, 0x00]);
    }

    #[test]
    fn punch_on_empty_buffer() {
        let mut s = session(&[]);
        assert!(matches!(s.punch_nibble('1'), Err(SessionError::EmptyBuffer)));
        assert!(matches!(s.punch_hex("12"), Err(SessionError::EmptyBuffer)));
    }

    #[test]
    fn punch_text_advances() {
        let mut s = session(&[0; 6]);
        s.goto(1);
        assert_eq!(s.punch_text(b"hi").unwrap(), 2);
        assert_eq!(s.cursor(), 3);
        assert_eq!(s.buffer().as_bytes(), b"\0hi\0\0\0");
        s.punch_text(b"end").unwrap();
        assert_eq!(s.cursor(), 5);
    }

    #[test]
    fn punch_text_past_end_is_refused() {
        let mut s = session(&[0; 3]);
        s.goto(2);
        assert!(matches!(
            s.punch_text(b"xy"),
            Err(SessionError::Buffer(BufferError::OutOfBounds { .. }))
        ));
        assert_eq!(s.buffer().as_bytes(), &[0; 3]);
        assert_eq!(s.cursor(), 2);
    }

    #[test]
    fn punch_value_writes_encoding() {
        let mut s = session(&[0; 8]);
        s.goto(2);
        assert_eq!(s.punch_value(ValueKind::U16Be, "0x1234").unwrap(), 2);
        assert_eq!(s.buffer().as_bytes(), &[0, 0, 0x12, 0x34, 0, 0, 0, 0]);
        assert_eq!(s.cursor(), 2);
        assert!(s.punch_value(ValueKind::F64Le, "1.0").is_err());
    }

    // -- Insert / truncate --------------------------------------------------

    #[test]
    fn insert_zeroes_before_and_after() {
        let mut s = session(&[0xAA, 0xBB, 0xCC, 0xDD]);
        s.goto(2);
        s.insert_zeroes(Side::Before, 4);
        assert_eq!(
            s.buffer().as_bytes(),
            &[0xAA, 0xBB, 0, 0, 0, 0, 0xCC, 0xDD]
        );
        s.end();
        s.insert_zeroes(Side::After, 1);
        assert_eq!(s.buffer().len(), 9);
        assert_eq!(s.buffer().get(8), Some(0));
    }

    #[test]
    fn truncate_moves_cursor_back() {
        let mut s = session(&[0; 10]);
        s.goto(4);
        assert_eq!(s.truncate_at_cursor().unwrap(), 4);
        assert_eq!(s.buffer().len(), 4);
        assert_eq!(s.cursor(), 3);
    }

    // -- Regions ------------------------------------------------------------

    #[test]
    fn marker_round_trip() {
        let mut s = session(&[0; 10]);
        s.goto(7);
        s.set_marker('q').unwrap();
        s.home();
        assert!(s.goto_marker('q').unwrap());
        assert_eq!(s.cursor(), 7);
        assert!(s.set_marker('Q').is_err());
    }

    #[test]
    fn goto_stale_marker_stays_put() {
        let mut s = session(&[0; 10]);
        s.goto(8);
        s.set_marker('a').unwrap();
        s.goto(2);
        s.truncate_at_cursor().unwrap();
        assert!(!s.goto_marker('a').unwrap());
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn cut_moves_cursor_before_cut() {
        let mut s = session(&[0, 1, 2, 3, 4, 5, 6, 7]);
        s.goto(3);
        s.set_marker('a').unwrap();
        s.goto(5);
        s.set_marker('b').unwrap();
        assert_eq!(s.cut('b', 'a').unwrap(), 3);
        assert_eq!(s.buffer().as_bytes(), &[0, 1, 2, 6, 7]);
        assert_eq!(s.cursor(), 2);
        assert_eq!(s.regions().clipboard().len(), 0);
    }

    #[test]
    fn yank_then_paste_after_cursor() {
        let mut s = session(&[0x10, 0x20, 0x30]);
        s.set_marker('a').unwrap();
        s.goto(1);
        s.set_marker('b').unwrap();
        assert_eq!(s.yank('a', 'b').unwrap(), 2);
        s.end();
        assert_eq!(s.paste(Side::After), 2);
        assert_eq!(s.buffer().as_bytes(), &[0x10, 0x20, 0x30, 0x10, 0x20]);
        s.home();
        s.paste(Side::Before);
        assert_eq!(s.buffer().len(), 7);
    }

    #[test]
    fn overwrite_from_clipboard_respects_bounds() {
        let mut s = session(&[1, 2, 3, 4]);
        s.set_marker('a').unwrap();
        s.goto(1);
        s.set_marker('b').unwrap();
        s.yank('a', 'b').unwrap();
        s.goto(2);
        assert_eq!(s.overwrite_from_clipboard().unwrap(), 2);
        assert_eq!(s.buffer().as_bytes(), &[1, 2, 1, 2]);
        s.goto(3);
        assert!(s.overwrite_from_clipboard().is_err());
        assert_eq!(s.buffer().as_bytes(), &[1, 2, 1, 2]);
    }

    #[test]
    fn blank_region() {
        let mut s = session(&[9; 5]);
        s.goto(1);
        s.set_marker('a').unwrap();
        s.goto(3);
        s.set_marker('b').unwrap();
        assert_eq!(s.blank('a', 'b').unwrap(), 3);
        assert_eq!(s.buffer().as_bytes(), &[9, 0, 0, 0, 9]);
    }

    #[test]
    fn region_ops_on_empty_buffer() {
        let mut s = session(&[]);
        assert!(matches!(
            s.cut('a', 'b'),
            Err(SessionError::Region(RegionError::EmptyBuffer))
        ));
    }

    #[test]
    fn export_to_sink() {
        let mut s = session(b"hello world");
        s.goto(6);
        s.set_marker('b').unwrap();
        s.end();
        s.set_marker('c').unwrap();
        let mut out = Vec::new();
        assert_eq!(s.export('b', 'c', &mut out).unwrap(), 5);
        assert_eq!(out, b"world");
    }

    // -- Files --------------------------------------------------------------

    #[test]
    fn open_save_and_write_region() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.bin");
        fs::write(&src, [1, 2, 3, 4, 5]).unwrap();

        let mut s = Session::new();
        assert_eq!(s.open(&src).unwrap(), 5);
        s.end();
        s.punch_hex("ff").unwrap();
        s.save(None).unwrap();
        assert_eq!(fs::read(&src).unwrap(), [1, 2, 3, 4, 0xFF]);

        s.goto(1);
        s.set_marker('a').unwrap();
        s.goto(2);
        s.set_marker('b').unwrap();
        let part = dir.path().join("part.bin");
        assert_eq!(s.write_region('a', 'b', &part).unwrap(), 2);
        assert_eq!(fs::read(&part).unwrap(), [2, 3]);
    }

    #[test]
    fn insert_file_after_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let extra = dir.path().join("extra.bin");
        fs::write(&extra, [0xEE, 0xEE]).unwrap();

        let mut s = session(&[1, 2]);
        assert_eq!(s.insert_file(&extra, Side::After).unwrap(), 2);
        assert_eq!(s.buffer().as_bytes(), &[1, 0xEE, 0xEE, 2]);
    }

    #[test]
    fn open_missing_file_keeps_session() {
        let mut s = session(&[7, 7]);
        s.goto(1);
        assert!(matches!(
            s.open(Path::new("/nonexistent/n-hex/file")),
            Err(SessionError::Io(_))
        ));
        assert_eq!(s.buffer().as_bytes(), &[7, 7]);
        assert_eq!(s.cursor(), 1);
    }

    // -- Inspection ---------------------------------------------------------

    #[test]
    fn interpret_at_cursor() {
        let mut s = session(&[0x00, 0x41, 0x01]);
        s.goto(1);
        let i = s.interpret().unwrap();
        assert_eq!(i.ascii, Some('A'));
        assert_eq!(i.u16.map(|e| e.le), Some(0x0141));
        assert!(i.u32.is_none());
        assert!(session(&[]).interpret().is_none());
    }

    #[test]
    fn dump_starts_at_cursor_row() {
        let mut s = session(&[0u8; 100]);
        s.set("columns=16 rows=2").unwrap();
        s.goto(40);
        let out = s.dump(None);
        assert!(out.starts_with("00000020"));
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn set_reports_queries_and_errors() {
        let mut s = session(&[]);
        assert_eq!(s.set("co? up").unwrap(), vec!["columns=32".to_string()]);
        assert!(s.options().uppercase);
        assert!(matches!(s.set("bogus"), Err(SessionError::Option(_))));
    }
}
