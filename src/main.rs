// SPDX-License-Identifier: MIT
//
// n-hex — a line-oriented byte editor.
//
// This is the driver that wires the n-bytes core to the outside world:
//
//   args   → file to open, initial offset, `-c` commands
//   stdin  → one command per line
//   stdout → command output (dumps, readings, messages)
//   stderr → errors and RUST_LOG diagnostics
//
// Each line flows through:
//
//   line → command::parse → Editor::run_command → Session → CommandResult
//
// With `-c` the given commands run in order and the program exits; without
// it commands are read from stdin until `q` or end of input. A prompt
// showing the cursor is printed only when stdin is a terminal.

mod logging;
mod tty;

use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use n_bytes::command::{self, Command, CommandResult};
use n_bytes::interpret::{ValueKind, parse_int};
use n_bytes::marker::Marker;
use n_bytes::{ByteBuffer, SearchPattern, Session, SessionError};

const USAGE: &str = "\
usage: n-hex [FILE] [+OFFSET|-OFFSET] [-c COMMAND]...

  FILE       file to edit; without it a sandbox buffer is opened
  +OFFSET    initial cursor position
  -OFFSET    initial cursor position counted from the end
  -c CMD     run CMD (repeatable) instead of reading stdin
  -h         show this help

Set RUST_LOG=debug for diagnostics on stderr.";

// ─── Arguments ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    file: Option<PathBuf>,
    offset: Option<i64>,
    commands: Vec<String>,
    help: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => parsed.help = true,
                "-c" => {
                    let cmd = args.next().context("-c needs a command")?;
                    parsed.commands.push(cmd);
                }
                _ if is_offset(&arg) => {
                    let n = parse_int(&arg)
                        .and_then(|n| i64::try_from(n).ok())
                        .with_context(|| format!("bad offset: {arg}"))?;
                    parsed.offset = Some(n);
                }
                _ if arg.starts_with('-') => bail!("unknown option: {arg}"),
                _ if parsed.file.is_none() => parsed.file = Some(PathBuf::from(arg)),
                _ => bail!("more than one file given: {arg}"),
            }
        }
        Ok(parsed)
    }
}

/// `+N` or `-N` where N starts with a digit.
fn is_offset(arg: &str) -> bool {
    arg.strip_prefix(['+', '-'])
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
}

// ─── Sandbox ────────────────────────────────────────────────────────────────

const SANDBOX_LEN: usize = 64 * 40;
const SANDBOX_GREETING: &str = "n-hex sandbox. Type q to quit. ";

/// A buffer to play in when no file is given: every byte value in turn,
/// overlaid with a greeting, some floats, some doubles and a few extreme
/// 64-bit integers.
#[allow(clippy::excessive_precision)]
fn sandbox() -> ByteBuffer {
    let mut bytes: Vec<u8> = (0..=u8::MAX).cycle().take(SANDBOX_LEN).collect();

    let floats = [
        1.0f32,
        2.0,
        -3.0,
        112_233_445_566.0,
        -1_122_334_455_667_788.0,
        std::f32::consts::PI,
        -std::f32::consts::PI,
        0.0,
    ];
    let doubles = [
        1.0f64,
        2.0,
        -3.0,
        112_233_445_566.0,
        -1_122_334_455_667_788.0,
        std::f64::consts::PI,
        -std::f64::consts::PI,
        0.0,
    ];
    let specials = [u64::MAX, i64::MAX.unsigned_abs(), 1 << 63, 0];

    let overlay: Vec<u8> = SANDBOX_GREETING
        .bytes()
        .chain(floats.iter().flat_map(|f| f.to_le_bytes()))
        .chain(doubles.iter().flat_map(|d| d.to_le_bytes()))
        .chain(specials.iter().flat_map(|u| u.to_le_bytes()))
        .collect();
    bytes[..overlay.len()].copy_from_slice(&overlay);

    let mut buffer = ByteBuffer::from_bytes(bytes);
    buffer.set_path(PathBuf::from("file.bin"));
    buffer
}

// ─── Editor ─────────────────────────────────────────────────────────────────

/// Executes commands against one session.
struct Editor {
    session: Session,
}

impl Editor {
    /// An editor on the sandbox buffer.
    fn new() -> Self {
        Self {
            session: Session::with_buffer(sandbox()),
        }
    }

    /// An editor on `path`. A file that can't be read starts an empty
    /// buffer that will be saved to `path`.
    fn from_file(path: &Path) -> Self {
        let mut session = Session::new();
        match session.open(path) {
            Ok(len) => info!(path = %path.display(), len, "loaded"),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "starting with an empty buffer");
                let mut buffer = ByteBuffer::new();
                buffer.set_path(path.to_path_buf());
                session = Session::with_buffer(buffer);
            }
        }
        Self { session }
    }

    /// Parse and run one line.
    fn execute(&mut self, line: &str) -> CommandResult {
        self.run_command(command::parse(line))
    }

    /// The prompt: cursor offset and nibble.
    fn prompt(&self) -> String {
        let nibble = if self.session.is_low_nibble() { "." } else { "" };
        format!("{:08x}{nibble}> ", self.session.cursor())
    }

    #[allow(clippy::too_many_lines)]
    fn run_command(&mut self, cmd: Command) -> CommandResult {
        match cmd {
            Command::Goto(address) => {
                if self.session.goto(address) {
                    CommandResult::Ok(None)
                } else {
                    CommandResult::Err(format!("address out of range: {address}"))
                }
            }
            Command::Advance(delta) => {
                self.session.advance(delta);
                CommandResult::Ok(None)
            }
            Command::Home => {
                self.session.home();
                CommandResult::Ok(None)
            }
            Command::End => {
                self.session.end();
                CommandResult::Ok(None)
            }
            Command::Find { direction, pattern } => match SearchPattern::parse(&pattern) {
                Ok(pattern) => found(self.session.find(direction, pattern)),
                Err(e) => CommandResult::Err(e.to_string()),
            },
            Command::FindNext(direction) => found(self.session.find_next(direction)),
            Command::SetMarker(symbol) => done(self.session.set_marker(symbol), |()| None),
            Command::ListMarkers => CommandResult::Ok(Some(self.list_markers())),
            Command::GotoMarker(symbol) => match self.session.goto_marker(symbol) {
                Ok(true) => CommandResult::Ok(None),
                Ok(false) => CommandResult::Err(format!("marker {symbol} is past the end")),
                Err(e) => CommandResult::Err(e.to_string()),
            },
            Command::Blank(a, b) => done(self.session.blank(a, b), |n| {
                Some(format!("Blanked {n} bytes"))
            }),
            Command::Cut(a, b) => done(self.session.cut(a, b), |n| {
                Some(format!("Cut {n} bytes"))
            }),
            Command::Yank(a, b) => done(self.session.yank(a, b), |n| {
                Some(format!("Yanked {n} bytes"))
            }),
            Command::Paste(side) => {
                let n = self.session.paste(side);
                CommandResult::Ok(Some(format!("Inserted {n} bytes")))
            }
            Command::OverwriteClipboard => done(self.session.overwrite_from_clipboard(), |n| {
                Some(format!("Overwrote {n} bytes"))
            }),
            Command::WriteRegion(a, b, path) => {
                done(self.session.write_region(a, b, &path), |n| {
                    Some(format!("Wrote {n} bytes to {}", path.display()))
                })
            }
            Command::InsertZeroes(side, count) => {
                let n = self.session.insert_zeroes(side, count);
                CommandResult::Ok(Some(format!("Inserted {n} bytes")))
            }
            Command::Truncate => done(self.session.truncate_at_cursor(), |len| {
                Some(format!("Truncated to {len} bytes"))
            }),
            Command::PunchText(bytes) => done(self.session.punch_text(&bytes), |_| None),
            Command::PunchHex(digits) => done(self.session.punch_hex(&digits), |_| None),
            Command::PunchValue { kind, value } => {
                let punched = kind
                    .parse::<ValueKind>()
                    .map_err(SessionError::from)
                    .and_then(|kind| self.session.punch_value(kind, &value));
                done(punched, |_| None)
            }
            Command::InsertFile(side, path) => {
                done(self.session.insert_file(&path, side), |n| {
                    Some(format!("Inserted {n} bytes from {}", path.display()))
                })
            }
            Command::Open(path) => done(self.session.open(&path), |n| {
                Some(format!("Read {n} bytes"))
            }),
            Command::Write => self.cmd_write(None),
            Command::WriteAs(path) => self.cmd_write(Some(&path)),
            Command::Print(rows) => {
                let dump = self.session.dump(rows);
                CommandResult::Ok((!dump.is_empty()).then_some(dump))
            }
            Command::Info => CommandResult::Ok(Some(self.info())),
            Command::Set(args) => done(self.session.set(&args), |messages| {
                (!messages.is_empty()).then(|| messages.join("\n"))
            }),
            Command::Quit => CommandResult::Quit,
            Command::Unknown(input) => {
                if input.is_empty() {
                    CommandResult::Ok(None)
                } else {
                    CommandResult::Err(format!("Not an editor command: {input}"))
                }
            }
        }
    }

    /// `w` / `w PATH`
    fn cmd_write(&mut self, path: Option<&Path>) -> CommandResult {
        match self.session.save(path) {
            Ok(written) => {
                let name = self
                    .session
                    .buffer()
                    .path()
                    .and_then(|p| p.file_name())
                    .and_then(|n| n.to_str())
                    .unwrap_or("???");
                CommandResult::Ok(Some(format!("\"{name}\" written, {written}B")))
            }
            Err(e) => CommandResult::Err(format!("Can't save file: {e}")),
        }
    }

    /// `M` — every marker in hex and decimal.
    fn list_markers(&self) -> String {
        self.session
            .markers()
            .iter()
            .map(|(marker, offset): (Marker, usize)| {
                format!("{marker}: {offset:016x} {offset}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `info` — position, then the readings at the cursor.
    fn info(&self) -> String {
        let s = &self.session;
        let nibble = if s.is_low_nibble() { "low" } else { "high" };
        let position = format!("{}/{} bytes  {nibble} nibble", s.cursor(), s.buffer().len());
        match s.interpret() {
            Some(readings) => format!("{position}\n{}", readings.to_string().trim_end()),
            None => position,
        }
    }
}

/// Turn a session result into a command result.
fn done<T>(
    result: Result<T, SessionError>,
    message: impl FnOnce(T) -> Option<String>,
) -> CommandResult {
    match result {
        Ok(value) => CommandResult::Ok(message(value)),
        Err(e) => CommandResult::Err(e.to_string()),
    }
}

/// Report a search outcome.
fn found(result: Result<Option<usize>, SessionError>) -> CommandResult {
    done(result, |hit| {
        Some(hit.map_or_else(
            || "Not found".to_string(),
            |offset| format!("Found at {offset:#x}"),
        ))
    })
}

// ─── Driver ─────────────────────────────────────────────────────────────────

/// Print a result. Returns `true` when the driver should stop.
fn report(result: CommandResult, out: &mut impl Write, err: &mut impl Write) -> io::Result<bool> {
    match result {
        CommandResult::Ok(Some(msg)) => writeln!(out, "{msg}")?,
        CommandResult::Ok(None) => {}
        CommandResult::Err(msg) => writeln!(err, "error: {msg}")?,
        CommandResult::Quit => return Ok(true),
    }
    Ok(false)
}

/// Read commands from `input` until `q` or end of input.
fn run(
    editor: &mut Editor,
    input: impl BufRead,
    out: &mut impl Write,
    err: &mut impl Write,
    prompt: bool,
) -> io::Result<()> {
    let show_prompt = |editor: &Editor, out: &mut dyn Write| -> io::Result<()> {
        if prompt {
            write!(out, "{}", editor.prompt())?;
            out.flush()?;
        }
        Ok(())
    };

    show_prompt(editor, out)?;
    for line in input.lines() {
        let line = line?;
        if !line.trim_start().starts_with('#') && report(editor.execute(&line), out, err)? {
            return Ok(());
        }
        show_prompt(editor, out)?;
    }
    if prompt {
        writeln!(out)?;
    }
    Ok(())
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn try_main() -> Result<()> {
    let args = Args::parse(env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    let mut editor = args
        .file
        .as_deref()
        .map_or_else(Editor::new, Editor::from_file);
    if let Some(offset) = args.offset {
        if !editor.session.goto(offset) {
            warn!(offset, "initial offset out of range");
        }
    }

    let stdout = io::stdout();
    let stderr = io::stderr();
    let (mut out, mut err) = (stdout.lock(), stderr.lock());

    if args.commands.is_empty() {
        let stdin = io::stdin();
        run(&mut editor, stdin.lock(), &mut out, &mut err, tty::stdin_is_tty())
            .context("reading commands")?;
    } else {
        for cmd in &args.commands {
            if report(editor.execute(cmd), &mut out, &mut err)? {
                break;
            }
        }
    }
    Ok(())
}

fn main() {
    logging::init();
    if let Err(e) = try_main() {
        eprintln!("n-hex: {e:#}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    // ── Helpers ───────────────────────────────────────────────────────────

    fn editor(bytes: &[u8]) -> Editor {
        Editor {
            session: Session::with_buffer(ByteBuffer::from_bytes(bytes.to_vec())),
        }
    }

    fn ok(msg: &str) -> CommandResult {
        CommandResult::Ok(Some(msg.to_string()))
    }

    fn args(list: &[&str]) -> Result<Args> {
        Args::parse(list.iter().map(ToString::to_string))
    }

    fn script(editor: &mut Editor, lines: &str) -> (String, String) {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        run(editor, lines.as_bytes(), &mut out, &mut err, false).unwrap();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    // ── Arguments ─────────────────────────────────────────────────────────

    #[test]
    fn args_file_offset_and_commands() {
        let a = args(&["dump.bin", "-0x10", "-c", "print", "-c", "q"]).unwrap();
        assert_eq!(a.file, Some(PathBuf::from("dump.bin")));
        assert_eq!(a.offset, Some(-16));
        assert_eq!(a.commands, vec!["print".to_string(), "q".to_string()]);
        assert_eq!(args(&["+42"]).unwrap().offset, Some(42));
        assert!(args(&["-h"]).unwrap().help);
    }

    #[test]
    fn args_errors() {
        assert!(args(&["-c"]).is_err());
        assert!(args(&["-x"]).is_err());
        assert!(args(&["a", "b"]).is_err());
    }

    // ── Sandbox ───────────────────────────────────────────────────────────

    #[test]
    fn sandbox_layout() {
        let buf = sandbox();
        assert_eq!(buf.len(), SANDBOX_LEN);
        assert_eq!(buf.path(), Some(Path::new("file.bin")));
        assert!(buf.as_bytes().starts_with(SANDBOX_GREETING.as_bytes()));
        let floats_at = SANDBOX_GREETING.len();
        assert_eq!(buf.read(floats_at, 4), &1.0f32.to_le_bytes());
        assert_eq!(buf.get(SANDBOX_LEN - 1), Some(0xFF));
    }

    // ── Commands ──────────────────────────────────────────────────────────

    #[test]
    fn search_and_report() {
        let mut ed = editor(&[0, 1, 2, 3, 4, 5]);
        assert_eq!(ed.execute("/03 04"), ok("Found at 0x3"));
        assert_eq!(ed.session.cursor(), 3);
        assert_eq!(ed.execute("n"), ok("Not found"));
        assert!(matches!(ed.execute("/0"), CommandResult::Err(_)));
    }

    #[test]
    fn find_next_without_pattern_is_error() {
        let mut ed = editor(&[1, 2]);
        assert_eq!(
            ed.execute("n"),
            CommandResult::Err("no search pattern yet".into())
        );
    }

    #[test]
    fn goto_out_of_range() {
        let mut ed = editor(&[0; 4]);
        assert_eq!(
            ed.execute("g 4"),
            CommandResult::Err("address out of range: 4".into())
        );
        assert_eq!(ed.execute("g -1"), CommandResult::Ok(None));
        assert_eq!(ed.session.cursor(), 3);
    }

    #[test]
    fn regions_through_commands() {
        let mut ed = editor(&[0x10, 0x20, 0x30, 0x40]);
        ed.execute("m a");
        ed.execute("g 1");
        ed.execute("m b");
        assert_eq!(ed.execute("y ab"), ok("Yanked 2 bytes"));
        ed.execute("end");
        assert_eq!(ed.execute("P"), ok("Inserted 2 bytes"));
        assert_eq!(
            ed.session.buffer().as_bytes(),
            &[0x10, 0x20, 0x30, 0x40, 0x10, 0x20]
        );
        assert_eq!(ed.execute("x ab"), ok("Cut 2 bytes"));
        assert_eq!(ed.session.buffer().as_bytes(), &[0x30, 0x40, 0x10, 0x20]);
        assert_eq!(ed.execute("@ ab"), ok("Blanked 2 bytes"));
        assert!(matches!(ed.execute("m A"), CommandResult::Err(_)));
    }

    #[test]
    fn punch_commands() {
        let mut ed = editor(&[0; 8]);
        ed.execute("h dead");
        ed.execute(": u16be 0x1234");
        assert_eq!(&ed.session.buffer().as_bytes()[..4], &[0xDE, 0xAD, 0x12, 0x34]);
        ed.execute("g 4");
        ed.execute(r"i ok\n");
        assert_eq!(&ed.session.buffer().as_bytes()[4..7], b"ok\n");
        assert_eq!(
            ed.execute(": u8 1"),
            CommandResult::Err("unknown value kind \"u8\"".into())
        );
    }

    #[test]
    fn insert_and_truncate() {
        let mut ed = editor(&[0xAA, 0xBB, 0xCC, 0xDD]);
        ed.execute("g 2");
        assert_eq!(ed.execute("< 4"), ok("Inserted 4 bytes"));
        assert_eq!(ed.session.buffer().len(), 8);
        ed.execute("g 4");
        assert_eq!(ed.execute("$"), ok("Truncated to 4 bytes"));
    }

    #[test]
    fn info_and_markers() {
        let mut ed = editor(&[0x41, 0x00]);
        let info = ed.execute("info");
        let CommandResult::Ok(Some(text)) = info else {
            panic!("info should print");
        };
        assert!(text.starts_with("0/2 bytes  high nibble\nc: A  u8: 65"));
        let CommandResult::Ok(Some(list)) = ed.execute("M") else {
            panic!("M should print");
        };
        assert_eq!(list.lines().count(), 26);
        assert_eq!(list.lines().next(), Some("a: 0000000000000000 0"));
    }

    #[test]
    fn set_and_print() {
        let mut ed = editor(&(0u8..32).collect::<Vec<_>>());
        assert_eq!(ed.execute("set"), CommandResult::Ok(None));
        ed.execute("set co=8 up");
        assert_eq!(ed.execute("set"), ok("columns=8  uppercase"));
        let CommandResult::Ok(Some(dump)) = ed.execute("print 2") else {
            panic!("print should dump");
        };
        assert_eq!(dump.lines().count(), 2);
        assert!(dump.starts_with("00000000  00010203 04050607"));
        assert_eq!(ed.execute("set co?"), ok("columns=8"));
        assert!(matches!(ed.execute("set co=0"), CommandResult::Err(_)));
    }

    #[test]
    fn unknown_and_empty() {
        let mut ed = editor(&[]);
        assert_eq!(ed.execute(""), CommandResult::Ok(None));
        assert_eq!(
            ed.execute("bogus"),
            CommandResult::Err("Not an editor command: bogus".into())
        );
        assert_eq!(ed.execute("q"), CommandResult::Quit);
    }

    #[test]
    fn files_through_commands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        fs::write(&path, [1, 2, 3]).unwrap();

        let mut ed = Editor::from_file(&path);
        assert_eq!(ed.session.buffer().len(), 3);
        ed.execute("h ff");
        assert_eq!(ed.execute("w"), ok("\"data.bin\" written, 3B"));
        assert_eq!(fs::read(&path).unwrap(), [0xFF, 2, 3]);

        let copy = dir.path().join("copy.bin");
        ed.execute(&format!("w {}", copy.display()));
        assert_eq!(fs::read(&copy).unwrap(), [0xFF, 2, 3]);

        ed.execute("home");
        ed.execute(&format!("R {}", path.display()));
        assert_eq!(ed.session.buffer().as_bytes(), &[0xFF, 0xFF, 2, 3, 2, 3]);
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.bin");
        let mut ed = Editor::from_file(&path);
        assert!(ed.session.buffer().is_empty());
        ed.execute("> 2");
        assert_eq!(ed.execute("w"), ok("\"new.bin\" written, 2B"));
        assert_eq!(fs::read(&path).unwrap(), [0, 0]);
    }

    // ── Driver ────────────────────────────────────────────────────────────

    #[test]
    fn run_stops_at_quit() {
        let mut ed = editor(&[0, 1, 2, 3]);
        let (out, err) = script(&mut ed, "/02\n# comment\nbogus\nq\n/03\n");
        assert_eq!(out, "Found at 0x2\n");
        assert_eq!(err, "error: Not an editor command: bogus\n");
        assert_eq!(ed.session.cursor(), 2);
    }

    #[test]
    fn run_until_end_of_input() {
        let mut ed = editor(&[9; 4]);
        let (out, err) = script(&mut ed, "g 1\nh 00\n");
        assert_eq!(out, "");
        assert_eq!(err, "");
        assert_eq!(ed.session.buffer().as_bytes(), &[9, 0, 9, 9]);
    }

    #[test]
    fn prompt_shows_cursor_and_nibble() {
        let mut ed = editor(&[0; 40]);
        ed.execute("g 0x21");
        assert_eq!(ed.prompt(), "00000021> ");
        ed.execute("h a");
        assert_eq!(ed.prompt(), "00000021.> ");
    }
}
