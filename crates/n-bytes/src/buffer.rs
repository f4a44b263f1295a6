//! Byte buffer — the fundamental unit of storage.
//!
//! A `ByteBuffer` owns a single contiguous `Vec<u8>` and exposes the edits a
//! byte-level editor needs: splice bytes in anywhere, cut a closed range
//! out, truncate, overwrite in place, or replace everything at once.
//!
//! # Design choices
//!
//! - **One contiguous region.** Every offset is a plain index into the
//!   buffer, so a slice of it can be handed straight to the pattern matcher.
//!   Inserts and deletes in the middle are `memmove`s, which is fine for the
//!   file sizes a hex editor is used on.
//!
//! - **Batch growth.** When an insert doesn't fit, we reserve at least
//!   [`GROW_CHUNK`] extra bytes instead of an exact fit, so a run of small
//!   inserts doesn't reallocate every time.
//!
//! - **Rejected, not clamped.** `overwrite` and `truncate` refuse requests
//!   that would run past the end and leave the buffer untouched. Read and
//!   delete ranges are caller contracts and panic when violated.
//!
//! - **Allocation failure aborts.** We never try to recover from running out
//!   of memory mid-edit; every mutation is all-or-nothing.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{BufferError, ExportError};

/// Capacity reserved for a fresh session buffer.
pub const INITIAL_CAPACITY: usize = 64 * 1024;

/// Minimum headroom added whenever an insert outgrows the current capacity.
pub const GROW_CHUNK: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// ByteBuffer
// ---------------------------------------------------------------------------

/// An editable, growable, contiguous byte buffer.
///
/// Tracks the bytes themselves, the file they came from (if any), and
/// whether they've been modified since the last load or save.
///
/// `len() <= capacity()` always holds. A slice returned by
/// [`read`](Self::read) or [`as_bytes`](Self::as_bytes) borrows the buffer,
/// so it cannot outlive the next mutation.
pub struct ByteBuffer {
    data: Vec<u8>,
    path: Option<PathBuf>,
    modified: bool,
}

impl ByteBuffer {
    // -- Construction -------------------------------------------------------

    /// Create an empty buffer with no storage reserved.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            path: None,
            modified: false,
        }
    }

    /// Create an empty buffer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            path: None,
            modified: false,
        }
    }

    /// Create a buffer holding `bytes`.
    #[must_use]
    pub const fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            data: bytes,
            path: None,
            modified: false,
        }
    }

    /// Load a buffer from a file. The buffer starts unmodified.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let data = fs::read(path)?;
        debug!(path = %path.display(), len = data.len(), "loaded file");
        Ok(Self {
            data,
            path: Some(path.to_path_buf()),
            modified: false,
        })
    }

    /// Replace the contents wholesale. The new bytes become the baseline:
    /// the buffer is marked unmodified. Returns the number of bytes loaded.
    pub fn load(&mut self, bytes: Vec<u8>) -> usize {
        self.data = bytes;
        self.modified = false;
        self.data.len()
    }

    // -- Access -------------------------------------------------------------

    /// Number of bytes in use.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the buffer holds no bytes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Allocated size. Never smaller than [`len`](Self::len).
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// The whole buffer as a slice.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The byte at `offset`, or `None` past the end.
    #[inline]
    #[must_use]
    pub fn get(&self, offset: usize) -> Option<u8> {
        self.data.get(offset).copied()
    }

    /// A read-only view of `count` bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + count > len()`.
    #[must_use]
    pub fn read(&self, offset: usize, count: usize) -> &[u8] {
        &self.data[offset..offset + count]
    }

    // -- Editing ------------------------------------------------------------

    /// Splice `bytes` in immediately before index `before`, shifting the
    /// tail right. `before` past the end is treated as the end. Inserting
    /// nothing is a no-op.
    pub fn insert(&mut self, before: usize, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let before = before.min(self.data.len());
        self.reserve_for(bytes.len());
        self.data.splice(before..before, bytes.iter().copied());
        self.modified = true;
        debug!(before, len = bytes.len(), "inserted bytes");
    }

    /// Splice `count` zero bytes in before index `before`.
    pub fn insert_zeroes(&mut self, before: usize, count: usize) {
        if count == 0 {
            return;
        }
        let before = before.min(self.data.len());
        self.reserve_for(count);
        self.data.splice(before..before, std::iter::repeat_n(0u8, count));
        self.modified = true;
        debug!(before, count, "inserted zero bytes");
    }

    /// Remove the closed range `[from, to_inclusive]`, shifting the tail
    /// left. The buffer shrinks by `to_inclusive - from + 1` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `from > to_inclusive` or `to_inclusive >= len()`.
    pub fn delete(&mut self, from: usize, to_inclusive: usize) {
        assert!(from <= to_inclusive, "delete range is reversed");
        self.data.drain(from..=to_inclusive);
        self.modified = true;
        debug!(from, to_inclusive, "deleted bytes");
    }

    /// Discard everything from `at` onwards. Capacity is kept.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::TruncatePastEnd`] if `at > len()`; truncation
    /// never extends the buffer.
    pub fn truncate(&mut self, at: usize) -> Result<(), BufferError> {
        if at > self.data.len() {
            return Err(BufferError::TruncatePastEnd {
                at,
                len: self.data.len(),
            });
        }
        self.data.truncate(at);
        self.modified = true;
        debug!(at, "truncated");
        Ok(())
    }

    /// Copy `bytes` over existing content starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfBounds`] without touching anything if the
    /// bytes would run past the end.
    pub fn overwrite(&mut self, offset: usize, bytes: &[u8]) -> Result<(), BufferError> {
        let end = offset
            .checked_add(bytes.len())
            .filter(|&end| end <= self.data.len())
            .ok_or(BufferError::OutOfBounds {
                offset,
                len: bytes.len(),
                buffer_len: self.data.len(),
            })?;
        self.data[offset..end].copy_from_slice(bytes);
        self.modified = true;
        Ok(())
    }

    /// Make sure `additional` more bytes fit, growing by at least
    /// [`GROW_CHUNK`] when they don't.
    fn reserve_for(&mut self, additional: usize) {
        let needed = self.data.len() + additional;
        if needed > self.data.capacity() {
            let headroom = additional.max(GROW_CHUNK);
            self.data.reserve_exact(headroom);
            debug!(capacity = self.data.capacity(), "grew buffer");
        }
    }

    // -- Metadata -----------------------------------------------------------

    /// The file path this buffer is associated with, if any.
    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Set the file path for this buffer.
    #[inline]
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    /// True if the buffer has been modified since the last load or save.
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    /// Mark the buffer as saved (not modified).
    #[inline]
    pub const fn mark_saved(&mut self) {
        self.modified = false;
    }

    // -- File I/O -----------------------------------------------------------

    /// Write the half-open range `[start, end)` to `sink`.
    ///
    /// Returns the number of bytes written, which is always `end - start` on
    /// success. On failure the error carries how many bytes the sink
    /// accepted before it gave up; the buffer itself is never touched.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the sink fails or stops accepting bytes.
    ///
    /// # Panics
    ///
    /// Panics if the range is not inside the buffer.
    pub fn write_range<W: Write>(
        &self,
        start: usize,
        end: usize,
        sink: &mut W,
    ) -> Result<usize, ExportError> {
        let bytes = &self.data[start..end];
        let mut written = 0;
        while written < bytes.len() {
            match sink.write(&bytes[written..]) {
                Ok(0) => {
                    return Err(ExportError {
                        written,
                        expected: bytes.len(),
                        source: io::Error::new(
                            io::ErrorKind::WriteZero,
                            "sink stopped accepting bytes",
                        ),
                    });
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(ExportError {
                        written,
                        expected: bytes.len(),
                        source,
                    });
                }
            }
        }
        sink.flush().map_err(|source| ExportError {
            written,
            expected: bytes.len(),
            source,
        })?;
        Ok(written)
    }

    /// Save the whole buffer to its associated path.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is set, the file can't be created, or the
    /// write comes up short.
    pub fn save(&mut self) -> Result<usize, ExportError> {
        let path = self.path.clone().ok_or_else(|| ExportError {
            written: 0,
            expected: self.data.len(),
            source: io::Error::new(io::ErrorKind::NotFound, "buffer has no file path"),
        })?;
        self.save_as(&path)
    }

    /// Save the whole buffer to `path`, updating the stored path. Marks the
    /// buffer as unmodified on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be created or the write comes up
    /// short; `written` tells how far it got.
    pub fn save_as(&mut self, path: &Path) -> Result<usize, ExportError> {
        let mut file = fs::File::create(path).map_err(|source| ExportError {
            written: 0,
            expected: self.data.len(),
            source,
        })?;
        let written = self.write_range(0, self.data.len(), &mut file)?;
        self.path = Some(path.to_path_buf());
        self.modified = false;
        debug!(path = %path.display(), written, "saved");
        Ok(written)
    }

    /// Read an entire file and splice it in before `before`. Returns the
    /// number of bytes inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read; the buffer is unchanged.
    pub fn insert_file(&mut self, before: usize, path: &Path) -> io::Result<usize> {
        let bytes = fs::read(path)?;
        self.insert(before, &bytes);
        Ok(bytes.len())
    }
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("modified", &self.modified)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
