//! # n-bytes — Byte editing core for n-hex
//!
//! This crate contains everything the editor does to bytes:
//!
//! - **[`buffer`]** — `ByteBuffer`, one contiguous growable region with insert, delete, truncate, overwrite and file I/O
//! - **[`search`]** — Knuth-Morris-Pratt search, forward and backward, exact and masked
//! - **[`pattern`]** — `SearchPattern` and the hex / text / wildcard syntax that builds it
//! - **[`marker`]** / **[`clipboard`]** / **[`region`]** — 26 markers, one clipboard, and the blank/cut/yank/paste family
//! - **[`interpret`]** — multi-width readings at an offset, and typed values back to bytes
//! - **[`dump`]** — hex dump rows
//! - **[`options`]** — the `set` option grammar
//! - **[`command`]** — command-line parsing
//! - **[`session`]** — `Session`, tying a buffer, its regions and a cursor together
//! - **[`error`]** — one error enum per concern

pub mod buffer;
pub mod clipboard;
pub mod command;
pub mod dump;
pub mod error;
pub mod interpret;
pub mod marker;
pub mod options;
pub mod pattern;
pub mod region;
pub mod search;
pub mod session;

pub use buffer::ByteBuffer;
pub use error::SessionError;
pub use pattern::SearchPattern;
pub use search::SearchDirection;
pub use session::{Session, Side};
