//! Command lines — one editing command per line.
//!
//! The driver reads lines (from stdin or `-c` arguments), parses each into a
//! [`Command`] with [`parse`], and executes it against a session.
//!
//! # Supported commands
//!
//! | Command          | Action                                         |
//! |------------------|------------------------------------------------|
//! | `g ADDR`         | Go to address (negative counts from the end)   |
//! | `+ N` / `- N`    | Move forward / back, wrapping                  |
//! | `home` / `end`   | First / last byte                              |
//! | `/PAT` / `?PAT`  | Search forward / backward                      |
//! | `n` / `N`        | Repeat search forward / backward               |
//! | `m X`            | Set marker `X` at the cursor                   |
//! | `M`              | List markers                                   |
//! | `' X`            | Go to marker `X`                               |
//! | `@ XY`           | Blank the region between markers `X` and `Y`   |
//! | `x XY`           | Cut the region                                 |
//! | `y XY`           | Yank the region                                |
//! | `p` / `P`        | Paste before / after the cursor                |
//! | `*`              | Overwrite from the clipboard at the cursor     |
//! | `W XY PATH`      | Write the region to a file                     |
//! | `< N` / `> N`    | Insert N zero bytes before / after the cursor  |
//! | `$`              | Truncate at the cursor                         |
//! | `i TEXT`         | Overwrite text (`\n`, `\t`, `\0`, `\xHH`, `\\`)|
//! | `h HEX…`         | Punch hex digits nibble by nibble              |
//! | `: KIND VALUE`   | Punch a typed value (`u32le`, `f64be`, …)      |
//! | `r PATH`/`R PATH`| Insert a file before / after the cursor        |
//! | `o PATH`         | Open a file                                    |
//! | `w [PATH]`       | Save (optionally to a new path)                |
//! | `print [ROWS]`   | Hex dump from the cursor's row                 |
//! | `info`           | Interpretations of the bytes at the cursor     |
//! | `set ARGS`       | Change options                                 |
//! | `q`              | Quit                                           |
//!
//! Symbol commands (`/ ? : ' + - < > @ * $`) need no space before their
//! argument; word commands do.

use std::path::PathBuf;

use crate::interpret::parse_int;
use crate::search::SearchDirection;
use crate::session::Side;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `g ADDR`
    Goto(i64),

    /// `+ N` / `- N`
    Advance(i64),

    /// `home`
    Home,

    /// `end`
    End,

    /// `/PAT` / `?PAT`. The pattern text is parsed on execution.
    Find {
        direction: SearchDirection,
        pattern: String,
    },

    /// `n` / `N`, or a bare `/` / `?`.
    FindNext(SearchDirection),

    /// `m X`
    SetMarker(char),

    /// `M`
    ListMarkers,

    /// `' X`
    GotoMarker(char),

    /// `@ XY`
    Blank(char, char),

    /// `x XY`
    Cut(char, char),

    /// `y XY`
    Yank(char, char),

    /// `p` (before) / `P` (after)
    Paste(Side),

    /// `*`
    OverwriteClipboard,

    /// `W XY PATH`
    WriteRegion(char, char, PathBuf),

    /// `< N` (before) / `> N` (after)
    InsertZeroes(Side, usize),

    /// `$`
    Truncate,

    /// `i TEXT`, escapes already resolved.
    PunchText(Vec<u8>),

    /// `h HEX…`
    PunchHex(String),

    /// `: KIND VALUE`
    PunchValue { kind: String, value: String },

    /// `r PATH` (before) / `R PATH` (after)
    InsertFile(Side, PathBuf),

    /// `o PATH`
    Open(PathBuf),

    /// `w`
    Write,

    /// `w PATH`
    WriteAs(PathBuf),

    /// `print [ROWS]`
    Print(Option<usize>),

    /// `info`
    Info,

    /// `set ARGS`
    Set(String),

    /// `q`
    Quit,

    /// Anything else. Holds the full input for error reporting.
    Unknown(String),
}

/// The result of executing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Command succeeded. Optional message to print.
    Ok(Option<String>),

    /// Command failed. Error message to print.
    Err(String),

    /// The driver should stop.
    Quit,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse one command line.
///
/// Whitespace before the command is skipped. Search patterns and `i` text
/// keep everything after the command, so leading and trailing spaces can
/// be searched for and punched in; other arguments are trimmed.
#[must_use]
pub fn parse(input: &str) -> Command {
    let line = input.trim_end_matches(['\n', '\r']).trim_start();
    let unknown = || Command::Unknown(input.trim().to_string());

    let mut chars = line.chars();
    let Some(first) = chars.next() else {
        return unknown();
    };
    let raw = chars.as_str();
    let rest = raw.trim();

    let parsed = match first {
        '/' => Some(find(SearchDirection::Forward, raw)),
        '?' => Some(find(SearchDirection::Backward, raw)),
        '+' => parse_i64(rest).map(Command::Advance),
        '-' => parse_i64(rest).and_then(i64::checked_neg).map(Command::Advance),
        '<' => parse_count(rest).map(|n| Command::InsertZeroes(Side::Before, n)),
        '>' => parse_count(rest).map(|n| Command::InsertZeroes(Side::After, n)),
        '\'' => single_char(rest).map(Command::GotoMarker),
        '@' => marker_pair(rest).map(|(a, b)| Command::Blank(a, b)),
        ':' => parse_value(rest),
        '*' if rest.is_empty() => Some(Command::OverwriteClipboard),
        '$' if rest.is_empty() => Some(Command::Truncate),
        _ => parse_word(line),
    };
    parsed.unwrap_or_else(unknown)
}

/// `/PAT` with a blank pattern repeats the last search.
fn find(direction: SearchDirection, pattern: &str) -> Command {
    if pattern.trim().is_empty() {
        Command::FindNext(direction)
    } else {
        Command::Find {
            direction,
            pattern: pattern.to_string(),
        }
    }
}

/// Word commands: a name, one whitespace character, then the argument.
fn parse_word(line: &str) -> Option<Command> {
    let (cmd, raw) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let arg = raw.trim();

    let no_arg = |c: Command| arg.is_empty().then_some(c);
    let path = || (!arg.is_empty()).then(|| PathBuf::from(arg));

    match cmd {
        "g" => parse_i64(arg).map(Command::Goto),
        "home" => no_arg(Command::Home),
        "end" => no_arg(Command::End),
        "n" => no_arg(Command::FindNext(SearchDirection::Forward)),
        "N" => no_arg(Command::FindNext(SearchDirection::Backward)),
        "m" => single_char(arg).map(Command::SetMarker),
        "M" => no_arg(Command::ListMarkers),
        "x" => marker_pair(arg).map(|(a, b)| Command::Cut(a, b)),
        "y" => marker_pair(arg).map(|(a, b)| Command::Yank(a, b)),
        "p" => no_arg(Command::Paste(Side::Before)),
        "P" => no_arg(Command::Paste(Side::After)),
        "W" => {
            let (pair, file) = arg.split_once(char::is_whitespace)?;
            let (a, b) = marker_pair(pair)?;
            let file = file.trim();
            (!file.is_empty()).then(|| Command::WriteRegion(a, b, PathBuf::from(file)))
        }
        "i" => unescape(raw).map(Command::PunchText),
        "h" => (!arg.is_empty()).then(|| Command::PunchHex(arg.to_string())),
        "r" => path().map(|p| Command::InsertFile(Side::Before, p)),
        "R" => path().map(|p| Command::InsertFile(Side::After, p)),
        "o" => path().map(Command::Open),
        "w" => Some(path().map_or(Command::Write, Command::WriteAs)),
        "print" => {
            if arg.is_empty() {
                Some(Command::Print(None))
            } else {
                parse_count(arg).map(|n| Command::Print(Some(n)))
            }
        }
        "info" => no_arg(Command::Info),
        "set" => Some(Command::Set(arg.to_string())),
        "q" => no_arg(Command::Quit),
        _ => None,
    }
}

/// `: KIND VALUE`
fn parse_value(rest: &str) -> Option<Command> {
    let (kind, value) = rest.split_once(char::is_whitespace)?;
    let value = value.trim();
    if kind.is_empty() || value.is_empty() {
        return None;
    }
    Some(Command::PunchValue {
        kind: kind.to_string(),
        value: value.to_string(),
    })
}

fn parse_i64(text: &str) -> Option<i64> {
    parse_int(text).and_then(|n| i64::try_from(n).ok())
}

fn parse_count(text: &str) -> Option<usize> {
    parse_int(text).and_then(|n| usize::try_from(n).ok())
}

/// Exactly one non-whitespace character.
fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    let ch = chars.next()?;
    chars.next().is_none().then_some(ch)
}

/// Two marker characters, optionally separated by whitespace (`ab`, `a b`).
fn marker_pair(text: &str) -> Option<(char, char)> {
    let mut chars = text.chars().filter(|c| !c.is_whitespace());
    let pair = (chars.next()?, chars.next()?);
    chars.next().is_none().then_some(pair)
}

/// Resolve `\n`, `\r`, `\t`, `\0`, `\\` and `\xHH` in punch-in text.
/// `None` for a dangling or unknown escape.
fn unescape(text: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            let mut utf8 = [0; 4];
            out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            continue;
        }
        let byte = match chars.next()? {
            'n' => b'\n',
            'r' => b'\r',
            't' => b'\t',
            '0' => 0,
            '\\' => b'\\',
            'x' => {
                let hi = chars.next()?.to_digit(16)?;
                let lo = chars.next()?.to_digit(16)?;
                u8::try_from(hi * 16 + lo).ok()?
            }
            _ => return None,
        };
        out.push(byte);
    }
    (!out.is_empty()).then_some(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
