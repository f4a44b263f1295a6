// SPDX-License-Identifier: MIT
//
// Terminal detection for the interactive prompt.
//
// Safety: `isatty` is the POSIX way to ask whether a file descriptor is a
// terminal; it only reads the descriptor's state.
#![allow(unsafe_code)]

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn stdin_is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub const fn stdin_is_tty() -> bool {
    false
}
