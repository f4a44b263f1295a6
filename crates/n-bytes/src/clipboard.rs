//! Clipboard — the single slot that yank fills and paste reads.
//!
//! The clipboard owns an independent copy of the yanked bytes, so later
//! edits to the buffer never show through. Each yank replaces the previous
//! content wholesale; paste and overwrite leave it in place, so the same
//! bytes can be pasted any number of times.

/// A single owned byte slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clipboard {
    /// The stored bytes. Empty when nothing has been yanked yet.
    content: Vec<u8>,
}

impl Clipboard {
    /// Create an empty clipboard.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            content: Vec::new(),
        }
    }

    /// Store bytes, replacing any previous content.
    pub fn yank(&mut self, bytes: &[u8]) {
        self.content.clear();
        self.content.extend_from_slice(bytes);
    }

    /// The stored bytes. Empty if nothing has been yanked.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Number of stored bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// True if there is nothing to paste.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
