//! Editor options — the `set` system.
//!
//! Parses `set` directives and applies them to an [`Options`] value.
//!
//! # Supported syntax
//!
//! | Syntax          | Effect                        |
//! |-----------------|-------------------------------|
//! | `set option`    | Enable boolean / show numeric |
//! | `set nooption`  | Disable boolean               |
//! | `set option!`   | Toggle boolean                |
//! | `set option?`   | Query current value           |
//! | `set option=N`  | Assign numeric value          |
//! | `set`           | Show changed options          |
//! | `set all`       | Show all options              |
//!
//! # Option names
//!
//! | Full name   | Abbrev | Type    | Default |
//! |-------------|--------|---------|---------|
//! | `columns`   | `co`   | integer | 32      |
//! | `group`     | `gr`   | integer | 4       |
//! | `rows`      | `ro`   | integer | 16      |
//! | `uppercase` | `up`   | bool    | false   |
//! | `wrapscan`  | `ws`   | bool    | false   |

use crate::error::OptionError;

/// Largest accepted `columns` value.
pub const MAX_COLUMNS: usize = 256;

/// A parsed `set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `set option` — enable a boolean option.
    On(String),

    /// `set nooption` — disable a boolean option.
    Off(String),

    /// `set option!` — toggle a boolean option.
    Toggle(String),

    /// `set option?` — query the current value.
    Query(String),

    /// `set option=value` — assign a value.
    Assign(String, String),

    /// `set` with no arguments — show changed options.
    ShowChanged,

    /// `set all` — show all options.
    ShowAll,
}

/// Resolve a full name or abbreviation to the full boolean option name.
fn bool_name(name: &str) -> Option<&'static str> {
    match name {
        "uppercase" | "up" => Some("uppercase"),
        "wrapscan" | "ws" => Some("wrapscan"),
        _ => None,
    }
}

/// Resolve a full name or abbreviation to the full numeric option name.
fn numeric_name(name: &str) -> Option<&'static str> {
    match name {
        "columns" | "co" => Some("columns"),
        "group" | "gr" => Some("group"),
        "rows" | "ro" => Some("rows"),
        _ => None,
    }
}

/// Returns `true` if `name` is a known boolean option (full name or abbreviation).
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    bool_name(name).is_some()
}

/// Returns `true` if `name` is a known numeric option (full name or abbreviation).
#[must_use]
pub fn is_numeric_option(name: &str) -> bool {
    numeric_name(name).is_some()
}

/// Returns `true` if `name` is any known option (boolean or numeric).
#[must_use]
pub fn is_known_option(name: &str) -> bool {
    is_bool_option(name) || is_numeric_option(name)
}

/// Parse the full `set` arguments string into directives.
///
/// Multiple space-separated arguments are supported (e.g., `set columns=16 ws`).
/// An empty argument string produces [`SetDirective::ShowChanged`].
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single `set` argument into a directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }

    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }

    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }

    // Only strip "no" when the remainder is a boolean option.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }

    if is_numeric_option(arg) {
        return SetDirective::Query(arg.to_string());
    }

    SetDirective::On(arg.to_string())
}

/// Format a boolean option for display.
///
/// Returns `"name"` when true, `"noname"` when false.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Current option values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Bytes per dump row.
    pub columns: usize,
    /// Bytes per space-separated group within a row.
    pub group: usize,
    /// Rows shown by `print` when no count is given.
    pub rows: usize,
    /// Upper-case hex digits in dumps.
    pub uppercase: bool,
    /// Searches wrap around the end of the buffer.
    pub wrapscan: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            columns: 32,
            group: 4,
            rows: 16,
            uppercase: false,
            wrapscan: false,
        }
    }
}

impl Options {
    fn get_bool(&self, name: &str) -> Option<bool> {
        match bool_name(name)? {
            "uppercase" => Some(self.uppercase),
            _ => Some(self.wrapscan),
        }
    }

    fn bool_mut(&mut self, name: &str) -> Result<&mut bool, OptionError> {
        match bool_name(name) {
            Some("uppercase") => Ok(&mut self.uppercase),
            Some(_) => Ok(&mut self.wrapscan),
            None if is_numeric_option(name) => Err(OptionError::NotBool(name.to_string())),
            None => Err(OptionError::Unknown(name.to_string())),
        }
    }

    fn get_numeric(&self, name: &str) -> Option<usize> {
        match numeric_name(name)? {
            "columns" => Some(self.columns),
            "group" => Some(self.group),
            _ => Some(self.rows),
        }
    }

    /// Render one option as `name` / `noname` / `name=value`.
    fn describe(&self, name: &str) -> Result<String, OptionError> {
        if let (Some(full), Some(v)) = (bool_name(name), self.get_bool(name)) {
            return Ok(format_bool(full, v));
        }
        if let (Some(full), Some(v)) = (numeric_name(name), self.get_numeric(name)) {
            return Ok(format!("{full}={v}"));
        }
        Err(OptionError::Unknown(name.to_string()))
    }

    /// Every option, in table order.
    fn all_names() -> [&'static str; 5] {
        ["columns", "group", "rows", "uppercase", "wrapscan"]
    }

    /// Apply a directive. Returns a message to show, if any.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionError`] for unknown options, a boolean directive
    /// on a numeric option (or vice versa), or an out-of-range value.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>, OptionError> {
        match directive {
            SetDirective::On(name) => {
                *self.bool_mut(name)? = true;
                Ok(None)
            }
            SetDirective::Off(name) => {
                *self.bool_mut(name)? = false;
                Ok(None)
            }
            SetDirective::Toggle(name) => {
                let v = self.bool_mut(name)?;
                *v = !*v;
                Ok(None)
            }
            SetDirective::Query(name) => self.describe(name).map(Some),
            SetDirective::Assign(name, value) => {
                let full =
                    numeric_name(name).ok_or_else(|| OptionError::NotNumeric(name.clone()))?;
                let invalid = || OptionError::InvalidValue {
                    name: full.to_string(),
                    value: value.clone(),
                };
                let n: usize = value.parse().map_err(|_| invalid())?;
                match full {
                    "columns" if (1..=MAX_COLUMNS).contains(&n) => self.columns = n,
                    "group" if n >= 1 => self.group = n,
                    "rows" if n >= 1 => self.rows = n,
                    _ => return Err(invalid()),
                }
                Ok(None)
            }
            SetDirective::ShowChanged => {
                let defaults = Self::default();
                let changed: Vec<String> = Self::all_names()
                    .into_iter()
                    .filter(|name| self.describe(name).ok() != defaults.describe(name).ok())
                    .filter_map(|name| self.describe(name).ok())
                    .collect();
                Ok((!changed.is_empty()).then(|| changed.join("  ")))
            }
            SetDirective::ShowAll => {
                let all: Vec<String> = Self::all_names()
                    .into_iter()
                    .filter_map(|name| self.describe(name).ok())
                    .collect();
                Ok(Some(all.join("  ")))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_set_arg ─────────────────────────────────────────────────────

    #[test]
    fn parse_boolean_on() {
        assert_eq!(parse_set_arg("wrapscan"), SetDirective::On("wrapscan".into()));
        assert_eq!(parse_set_arg("up"), SetDirective::On("up".into()));
    }

    #[test]
    fn parse_boolean_off() {
        assert_eq!(
            parse_set_arg("nowrapscan"),
            SetDirective::Off("wrapscan".into())
        );
        assert_eq!(parse_set_arg("nows"), SetDirective::Off("ws".into()));
        assert_eq!(parse_set_arg("noup"), SetDirective::Off("up".into()));
    }

    #[test]
    fn parse_toggle_and_query() {
        assert_eq!(parse_set_arg("ws!"), SetDirective::Toggle("ws".into()));
        assert_eq!(
            parse_set_arg("columns?"),
            SetDirective::Query("columns".into())
        );
    }

    #[test]
    fn parse_assign() {
        assert_eq!(
            parse_set_arg("columns=16"),
            SetDirective::Assign("columns".into(), "16".into())
        );
        assert_eq!(
            parse_set_arg("gr=8"),
            SetDirective::Assign("gr".into(), "8".into())
        );
    }

    #[test]
    fn parse_numeric_bare_is_query() {
        assert_eq!(parse_set_arg("rows"), SetDirective::Query("rows".into()));
        assert_eq!(parse_set_arg("co"), SetDirective::Query("co".into()));
    }

    #[test]
    fn parse_unknown_option() {
        assert_eq!(parse_set_arg("foobar"), SetDirective::On("foobar".into()));
        assert_eq!(
            parse_set_arg("nofoobar"),
            SetDirective::On("nofoobar".into())
        );
    }

    #[test]
    fn parse_empty_and_multiple() {
        assert_eq!(parse_set("  "), vec![SetDirective::ShowChanged]);
        assert_eq!(
            parse_set("ws columns=8"),
            vec![
                SetDirective::On("ws".into()),
                SetDirective::Assign("columns".into(), "8".into()),
            ]
        );
        assert_eq!(parse_set("all"), vec![SetDirective::ShowAll]);
    }

    #[test]
    fn known_options() {
        assert!(is_known_option("co"));
        assert!(is_known_option("wrapscan"));
        assert!(!is_known_option("number"));
    }

    #[test]
    fn format_bool_on_off() {
        assert_eq!(format_bool("wrapscan", true), "wrapscan");
        assert_eq!(format_bool("wrapscan", false), "nowrapscan");
    }

    // ── Options::apply ───────────────────────────────────────────────────

    #[test]
    fn apply_booleans() {
        let mut o = Options::default();
        o.apply(&SetDirective::On("ws".into())).unwrap();
        assert!(o.wrapscan);
        o.apply(&SetDirective::Toggle("wrapscan".into())).unwrap();
        assert!(!o.wrapscan);
        o.apply(&SetDirective::On("up".into())).unwrap();
        o.apply(&SetDirective::Off("up".into())).unwrap();
        assert!(!o.uppercase);
    }

    #[test]
    fn apply_numbers() {
        let mut o = Options::default();
        o.apply(&SetDirective::Assign("co".into(), "16".into()))
            .unwrap();
        o.apply(&SetDirective::Assign("group".into(), "2".into()))
            .unwrap();
        o.apply(&SetDirective::Assign("ro".into(), "3".into()))
            .unwrap();
        assert_eq!((o.columns, o.group, o.rows), (16, 2, 3));
    }

    #[test]
    fn apply_rejects_bad_values() {
        let mut o = Options::default();
        assert!(matches!(
            o.apply(&SetDirective::Assign("columns".into(), "0".into())),
            Err(OptionError::InvalidValue { .. })
        ));
        assert!(matches!(
            o.apply(&SetDirective::Assign("columns".into(), "999".into())),
            Err(OptionError::InvalidValue { .. })
        ));
        assert!(matches!(
            o.apply(&SetDirective::Assign("group".into(), "x".into())),
            Err(OptionError::InvalidValue { .. })
        ));
        assert!(matches!(
            o.apply(&SetDirective::Assign("group".into(), "0".into())),
            Err(OptionError::InvalidValue { .. })
        ));
        assert!(matches!(
            o.apply(&SetDirective::Assign("rows".into(), "0".into())),
            Err(OptionError::InvalidValue { .. })
        ));
        assert_eq!(o, Options::default());
    }

    #[test]
    fn apply_type_mismatches() {
        let mut o = Options::default();
        assert_eq!(
            o.apply(&SetDirective::On("columns".into())),
            Err(OptionError::NotBool("columns".into()))
        );
        assert_eq!(
            o.apply(&SetDirective::Assign("ws".into(), "1".into())),
            Err(OptionError::NotNumeric("ws".into()))
        );
        assert_eq!(
            o.apply(&SetDirective::On("bogus".into())),
            Err(OptionError::Unknown("bogus".into()))
        );
    }

    #[test]
    fn query_and_show() {
        let mut o = Options::default();
        assert_eq!(
            o.apply(&SetDirective::Query("co".into())).unwrap(),
            Some("columns=32".into())
        );
        assert_eq!(
            o.apply(&SetDirective::Query("ws".into())).unwrap(),
            Some("nowrapscan".into())
        );
        assert_eq!(o.apply(&SetDirective::ShowChanged).unwrap(), None);
        o.apply(&SetDirective::On("ws".into())).unwrap();
        assert_eq!(
            o.apply(&SetDirective::ShowChanged).unwrap(),
            Some("wrapscan".into())
        );
        assert_eq!(
            o.apply(&SetDirective::ShowAll).unwrap(),
            Some("columns=32  group=4  rows=16  nouppercase  wrapscan".into())
        );
    }
}
