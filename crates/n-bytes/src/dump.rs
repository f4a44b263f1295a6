//! Hex dump formatting.
//!
//! Each row is an 8-digit hex address, the row's bytes in space-separated
//! groups, and a printable-ASCII gutter:
//!
//! ```text
//! 00000020  20212223 24252627  | !"#$%&'|
//! ```
//!
//! A short final row is padded so the gutter stays aligned.

use std::fmt::Write;

use crate::buffer::ByteBuffer;
use crate::options::Options;

/// The gutter character for a byte.
const fn gutter_char(byte: u8) -> char {
    if byte.is_ascii_graphic() || byte == b' ' {
        byte as char
    } else {
        '.'
    }
}

/// Width in characters of the hex part of a full row.
const fn hex_width(columns: usize, group: usize) -> usize {
    let groups = columns.div_ceil(group);
    columns * 2 + groups.saturating_sub(1)
}

/// Format one row of at most `options.columns` bytes starting at `address`.
#[must_use]
pub fn format_row(address: usize, bytes: &[u8], options: &Options) -> String {
    let group = options.group.max(1);
    let mut hex = String::with_capacity(hex_width(options.columns, group));
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 && i % group == 0 {
            hex.push(' ');
        }
        // Writing to a String never fails.
        let _ = if options.uppercase {
            write!(hex, "{byte:02X}")
        } else {
            write!(hex, "{byte:02x}")
        };
    }
    let gutter: String = bytes.iter().copied().map(gutter_char).collect();
    let width = hex_width(options.columns, group);
    if options.uppercase {
        format!("{address:08X}  {hex:<width$}  |{gutter}|")
    } else {
        format!("{address:08x}  {hex:<width$}  |{gutter}|")
    }
}

/// Format up to `rows` rows starting at row `start_row`. Rows past the end of
/// the buffer are omitted; an empty buffer yields an empty string.
#[must_use]
pub fn dump(buffer: &ByteBuffer, start_row: usize, rows: usize, options: &Options) -> String {
    let columns = options.columns.max(1);
    let bytes = buffer.as_bytes();
    let start = start_row.saturating_mul(columns);
    let Some(tail) = bytes.get(start..) else {
        return String::new();
    };
    tail.chunks(columns)
        .take(rows)
        .enumerate()
        .map(|(i, chunk)| format_row(start + i * columns, chunk, options))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The row that contains `offset`.
#[must_use]
pub const fn row_of(offset: usize, options: &Options) -> usize {
    if options.columns == 0 {
        offset
    } else {
        offset / options.columns
    }
}
