//! Regions — marker pairs, and the blank/cut/yank/paste family built on them.
//!
//! A [`RegionStore`] holds the [`MarkerTable`] and the [`Clipboard`]. It owns
//! no bytes of the buffer: every operation borrows the [`ByteBuffer`] for the
//! duration of the call and goes through its public editing API, so no view
//! into the buffer is ever kept across a mutation.
//!
//! # Resolving a region
//!
//! 1. [`read_marker_pair`](RegionStore::read_marker_pair) clamps both stored
//!    offsets to the buffer length and orders them.
//! 2. Each operation then clamps the inclusive end to the last byte, so a
//!    marker sitting at (or past) the end selects through the last byte.
//!    An empty buffer has no regions at all.

use std::io::Write;

use tracing::debug;

use crate::buffer::ByteBuffer;
use crate::clipboard::Clipboard;
use crate::error::RegionError;
use crate::marker::{Marker, MarkerTable};

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// An inclusive byte range `[start, end]` with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    start: usize,
    end: usize,
}

impl Region {
    /// Build a region from two offsets in either order.
    #[must_use]
    pub const fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// First byte of the region.
    #[must_use]
    pub const fn start(self) -> usize {
        self.start
    }

    /// Last byte of the region, inclusive.
    #[must_use]
    pub const fn end(self) -> usize {
        self.end
    }

    /// Number of bytes covered.
    #[allow(clippy::len_without_is_empty)]
    #[must_use]
    pub const fn len(self) -> usize {
        self.end - self.start + 1
    }

    /// Clamp both ends to the last byte of a `len`-byte buffer.
    fn within(self, len: usize) -> Result<Self, RegionError> {
        if len == 0 {
            return Err(RegionError::EmptyBuffer);
        }
        let last = len - 1;
        Ok(Self {
            start: self.start.min(last),
            end: self.end.min(last),
        })
    }
}

// ---------------------------------------------------------------------------
// RegionStore
// ---------------------------------------------------------------------------

/// Markers plus the clipboard.
#[derive(Debug, Clone, Default)]
pub struct RegionStore {
    markers: MarkerTable,
    clipboard: Clipboard,
}

impl RegionStore {
    /// All markers at 0, clipboard empty.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            markers: MarkerTable::new(),
            clipboard: Clipboard::new(),
        }
    }

    // -- Markers ------------------------------------------------------------

    /// Store `offset` in `marker`, unvalidated.
    pub const fn set_marker(&mut self, marker: Marker, offset: usize) {
        self.markers.set(marker, offset);
    }

    /// The marker table.
    #[must_use]
    pub const fn markers(&self) -> &MarkerTable {
        &self.markers
    }

    /// Resolve two markers into an ordered pair, each clamped to the buffer
    /// length.
    #[must_use]
    pub fn read_marker_pair(&self, a: Marker, b: Marker, buf: &ByteBuffer) -> Region {
        let len = buf.len();
        Region::new(self.markers.clamped(a, len), self.markers.clamped(b, len))
    }

    // -- Clipboard ----------------------------------------------------------

    /// The clipboard.
    #[must_use]
    pub const fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    // -- Region operations --------------------------------------------------

    /// Zero-fill the region. The length is unchanged. Returns the number of
    /// bytes blanked.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::EmptyBuffer`] on an empty buffer.
    pub fn blank(&self, buf: &mut ByteBuffer, region: Region) -> Result<usize, RegionError> {
        let region = region.within(buf.len())?;
        buf.overwrite(region.start, &vec![0; region.len()])?;
        debug!(start = region.start, end = region.end, "blanked region");
        Ok(region.len())
    }

    /// Remove the region from the buffer. The clipboard is not touched.
    /// Returns the region actually removed.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::EmptyBuffer`] on an empty buffer.
    pub fn cut(&self, buf: &mut ByteBuffer, region: Region) -> Result<Region, RegionError> {
        let region = region.within(buf.len())?;
        buf.delete(region.start, region.end);
        debug!(start = region.start, end = region.end, "cut region");
        Ok(region)
    }

    /// Copy the region into the clipboard, replacing what was there. The
    /// buffer is unchanged. Returns the number of bytes copied.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::EmptyBuffer`] on an empty buffer.
    pub fn yank(&mut self, buf: &ByteBuffer, region: Region) -> Result<usize, RegionError> {
        let region = region.within(buf.len())?;
        self.clipboard.yank(buf.read(region.start, region.len()));
        debug!(start = region.start, end = region.end, "yanked region");
        Ok(region.len())
    }

    /// Insert the whole clipboard before `before` (clamped to the buffer
    /// length). The clipboard keeps its content. Returns the number of bytes
    /// inserted.
    pub fn paste(&self, buf: &mut ByteBuffer, before: usize) -> usize {
        buf.insert(before.min(buf.len()), self.clipboard.content());
        self.clipboard.len()
    }

    /// Copy the clipboard over the buffer starting at `offset`. Returns the
    /// number of bytes overwritten.
    ///
    /// # Errors
    ///
    /// Returns a [`RegionError::Buffer`] out-of-bounds error, with the
    /// buffer untouched, if the clipboard doesn't fit.
    pub fn overwrite_from_clipboard(
        &self,
        buf: &mut ByteBuffer,
        offset: usize,
    ) -> Result<usize, RegionError> {
        buf.overwrite(offset, self.clipboard.content())?;
        Ok(self.clipboard.len())
    }

    /// Write the region to `sink`. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::EmptyBuffer`] on an empty buffer, or
    /// [`RegionError::Export`] with the exact count written if the sink
    /// fails. The buffer is never modified.
    pub fn export<W: Write>(
        &self,
        buf: &ByteBuffer,
        region: Region,
        sink: &mut W,
    ) -> Result<usize, RegionError> {
        let region = region.within(buf.len())?;
        Ok(buf.write_range(region.start, region.end + 1, sink)?)
    }
}
