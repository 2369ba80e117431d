//! Typed command-line option parsing.
//!
//! An [`OptionParser`] owns a list of declared options (built with [`Opt`])
//! and fills them in from an `argv`-style sequence:
//! - `-name` refers to a registered option; every kind except `Bool` consumes
//!   the following token as its value
//! - tokens without the marker are positional and collected in order
//! - values are validated per kind (integer bounds, feature states, combo
//!   choices, array element cap) and errors are returned, never fatal
//! - `parser.get::<T>("name")` for typed retrieval

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, trace};

/// Prefix that marks a token as an option reference.
pub const OPTION_MARKER: char = '-';

/// Default cap on the number of elements an `Array` option accepts.
pub const DEFAULT_ARRAY_LIMIT: usize = 10;

const USAGE_MAX_COL: usize = 79;

// ============================================================================
// Result and Error types
// ============================================================================

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("option -{0} is already registered")]
    DuplicateOption(String),

    #[error("unknown option {0}")]
    UnknownOption(String),

    #[error("missing value for option -{0}")]
    MissingValue(String),

    #[error("invalid value '{value}' for option -{name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: InvalidReason,
    },

    #[error("too many elements for option -{name}: {count} given, at most {limit}")]
    TooManyElements {
        name: String,
        count: usize,
        limit: usize,
    },

    #[error("cannot read {}: {}", .path.display(), .source)]
    Config {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    BadQuote(String),
}

impl Error {
    /// One-line message for standard error.
    pub fn diagnostic(&self) -> String {
        match self {
            Error::UnknownOption(token) => format!("Unknown option: {}", token),
            other => format!("Error: {}", other),
        }
    }
}

/// Which kind-specific check rejected a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidReason {
    #[error("not an integer")]
    NotAnInteger,
    #[error("out of range {min}..={max}")]
    OutOfRange { min: i64, max: i64 },
    #[error("expected enable, disable or auto")]
    NotAFeature,
    #[error("not one of the choices")]
    NotAChoice,
    #[error("expected true or false")]
    NotABool,
}

// ============================================================================
// OptionKind / Feature / OptionValue
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    Int,
    StringValue,
    Feature,
    Combo,
    Array,
}

impl OptionKind {
    fn takes_value(self) -> bool {
        !matches!(self, OptionKind::Bool)
    }
}

/// Tri-state switch accepted by `Feature` options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Feature {
    Enable,
    #[default]
    Disable,
    Auto,
}

impl Feature {
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Enable => "enable",
            Feature::Disable => "disable",
            Feature::Auto => "auto",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = InvalidReason;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "enable" => Ok(Feature::Enable),
            "disable" => Ok(Feature::Disable),
            "auto" => Ok(Feature::Auto),
            _ => Err(InvalidReason::NotAFeature),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Feature(Feature),
    /// Selected choice and its position in the declared choices.
    Combo { index: usize, choice: String },
    Array(Vec<String>),
}

impl OptionValue {
    /// Zero value of `kind`, held by every option that is not set.
    pub fn default_for(kind: OptionKind) -> Self {
        match kind {
            OptionKind::Bool => OptionValue::Bool(false),
            OptionKind::Int => OptionValue::Int(0),
            OptionKind::StringValue => OptionValue::Str(String::new()),
            OptionKind::Feature => OptionValue::Feature(Feature::default()),
            OptionKind::Combo => OptionValue::Combo {
                index: 0,
                choice: String::new(),
            },
            OptionKind::Array => OptionValue::Array(Vec::new()),
        }
    }
}

// ============================================================================
// Trait for typed retrieval from OptionParser
// ============================================================================

pub trait FromOptionValue: Sized {
    fn from_option_value(v: &OptionValue) -> Option<Self>;
}

impl FromOptionValue for bool {
    fn from_option_value(v: &OptionValue) -> Option<Self> {
        match v {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromOptionValue for i64 {
    fn from_option_value(v: &OptionValue) -> Option<Self> {
        match v {
            OptionValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromOptionValue for i32 {
    fn from_option_value(v: &OptionValue) -> Option<Self> {
        match v {
            OptionValue::Int(n) => i32::try_from(*n).ok(),
            _ => None,
        }
    }
}

/// Combo options yield their choice index.
impl FromOptionValue for usize {
    fn from_option_value(v: &OptionValue) -> Option<Self> {
        match v {
            OptionValue::Combo { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl FromOptionValue for String {
    fn from_option_value(v: &OptionValue) -> Option<Self> {
        match v {
            OptionValue::Str(s) => Some(s.clone()),
            OptionValue::Combo { choice, .. } => Some(choice.clone()),
            _ => None,
        }
    }
}

impl FromOptionValue for Feature {
    fn from_option_value(v: &OptionValue) -> Option<Self> {
        match v {
            OptionValue::Feature(f) => Some(*f),
            _ => None,
        }
    }
}

impl FromOptionValue for Vec<String> {
    fn from_option_value(v: &OptionValue) -> Option<Self> {
        match v {
            OptionValue::Array(items) => Some(items.clone()),
            _ => None,
        }
    }
}

// ============================================================================
// Opt — option builder
// ============================================================================

#[derive(Debug, Clone)]
pub struct Opt {
    name: String,
    kind: OptionKind,
    bounds: Option<(i64, i64)>,
    choices: Vec<String>,
    choice_values: Vec<i64>,
    description: Option<String>,
}

impl Opt {
    pub fn new(name: &str, kind: OptionKind) -> Self {
        Opt {
            name: name.to_string(),
            kind,
            bounds: None,
            choices: Vec::new(),
            choice_values: Vec::new(),
            description: None,
        }
    }

    pub fn flag(name: &str) -> Self {
        Self::new(name, OptionKind::Bool)
    }

    pub fn int(name: &str) -> Self {
        Self::new(name, OptionKind::Int)
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, OptionKind::StringValue)
    }

    pub fn feature(name: &str) -> Self {
        Self::new(name, OptionKind::Feature)
    }

    pub fn combo<I, S>(name: &str, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, OptionKind::Combo).choices(choices)
    }

    pub fn array(name: &str) -> Self {
        Self::new(name, OptionKind::Array)
    }

    /// Inclusive range for `Int` options; ignored for other kinds.
    pub fn bounds(mut self, min: i64, max: i64) -> Self {
        self.bounds = Some((min, max));
        self
    }

    /// Valid tokens for `Combo` options; ignored for other kinds.
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self.choice_values.clear();
        self
    }

    /// Valid tokens for `Combo` options, each mapped to a caller-chosen
    /// value readable through [`OptionParser::combo_value`].
    pub fn choice_values<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let (names, values): (Vec<String>, Vec<i64>) = choices
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .unzip();
        self.choices = names;
        self.choice_values = values;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }
}

// ============================================================================
// OptionSpec — a registered option and its current state
// ============================================================================

#[derive(Debug, Clone)]
pub struct OptionSpec {
    name: String,
    kind: OptionKind,
    value: OptionValue,
    bounds: Option<(i64, i64)>,
    choices: Vec<String>,
    choice_values: Vec<i64>,
    description: Option<String>,
    is_set: bool,
}

impl From<Opt> for OptionSpec {
    fn from(opt: Opt) -> Self {
        let bounds = match opt.kind {
            OptionKind::Int => opt.bounds,
            _ => None,
        };
        let (choices, choice_values) = match opt.kind {
            OptionKind::Combo => (opt.choices, opt.choice_values),
            _ => (Vec::new(), Vec::new()),
        };
        OptionSpec {
            value: OptionValue::default_for(opt.kind),
            name: opt.name,
            kind: opt.kind,
            bounds,
            choices,
            choice_values,
            description: opt.description,
            is_set: false,
        }
    }
}

impl OptionSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    /// Current value; the kind's default while the option is not set.
    pub fn value(&self) -> &OptionValue {
        &self.value
    }

    pub fn bounds(&self) -> Option<(i64, i64)> {
        self.bounds
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.is_set
    }

    fn reset(&mut self) {
        self.value = OptionValue::default_for(self.kind);
        self.is_set = false;
    }

    fn invalid(&self, raw: &str, reason: InvalidReason) -> Error {
        Error::InvalidValue {
            name: self.name.clone(),
            value: raw.to_string(),
            reason,
        }
    }

    fn set_flag(&mut self) {
        self.value = OptionValue::Bool(true);
        self.is_set = true;
    }

    /// Validate `raw` against this option's kind and store it. On error the
    /// option keeps its previous state.
    fn assign(&mut self, raw: &str, array_limit: usize) -> Result<()> {
        let value = match self.kind {
            OptionKind::Bool => OptionValue::Bool(true),
            OptionKind::Int => {
                let n: i64 = raw
                    .parse()
                    .map_err(|_| self.invalid(raw, InvalidReason::NotAnInteger))?;
                let (min, max) = self.bounds.unwrap_or((i64::MIN, i64::MAX));
                if n < min || n > max {
                    return Err(self.invalid(raw, InvalidReason::OutOfRange { min, max }));
                }
                OptionValue::Int(n)
            }
            OptionKind::StringValue => OptionValue::Str(raw.to_string()),
            OptionKind::Feature => {
                OptionValue::Feature(raw.parse().map_err(|reason| self.invalid(raw, reason))?)
            }
            OptionKind::Combo => {
                let index = self
                    .choices
                    .iter()
                    .position(|c| c == raw)
                    .ok_or_else(|| self.invalid(raw, InvalidReason::NotAChoice))?;
                OptionValue::Combo {
                    index,
                    choice: raw.to_string(),
                }
            }
            OptionKind::Array => {
                // Empty segments ("a,,b") are dropped.
                let items: Vec<String> = raw
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if items.len() > array_limit {
                    return Err(Error::TooManyElements {
                        name: self.name.clone(),
                        count: items.len(),
                        limit: array_limit,
                    });
                }
                OptionValue::Array(items)
            }
        };
        self.value = value;
        self.is_set = true;
        Ok(())
    }

    /// Value-shape hint used by the usage printer.
    fn hint(&self) -> String {
        match self.kind {
            OptionKind::Bool => "(bool)".to_string(),
            OptionKind::Int => match self.bounds {
                Some((min, max)) => format!("(int: {}..{})", min, max),
                None => "(int)".to_string(),
            },
            OptionKind::StringValue => "(string)".to_string(),
            OptionKind::Feature => "(feature: enable|disable|auto)".to_string(),
            OptionKind::Combo => format!("(combo: {})", self.choices.join(",")),
            OptionKind::Array => "(array)".to_string(),
        }
    }
}

// ============================================================================
// OptionParser
// ============================================================================

#[derive(Debug, Clone)]
pub struct OptionParser {
    specs: Vec<OptionSpec>,
    array_limit: usize,
    program: Option<String>,
    positionals: Vec<String>,
}

impl Default for OptionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionParser {
    pub fn new() -> Self {
        OptionParser {
            specs: Vec::new(),
            array_limit: DEFAULT_ARRAY_LIMIT,
            program: None,
            positionals: Vec::new(),
        }
    }

    pub fn with_array_limit(mut self, limit: usize) -> Self {
        self.array_limit = limit;
        self
    }

    pub fn set_array_limit(&mut self, limit: usize) {
        self.array_limit = limit;
    }

    pub fn array_limit(&self) -> usize {
        self.array_limit
    }

    /// Register an option. Names are unique within a parser.
    pub fn add_option(&mut self, opt: Opt) -> Result<()> {
        if self.find(&opt.name).is_some() {
            debug!(option = %opt.name, "duplicate option registration");
            return Err(Error::DuplicateOption(opt.name));
        }
        debug!(option = %opt.name, kind = ?opt.kind, "registered option");
        self.specs.push(OptionSpec::from(opt));
        Ok(())
    }

    /// Registered options in insertion order.
    pub fn specs(&self) -> impl Iterator<Item = &OptionSpec> {
        self.specs.iter()
    }

    fn find(&self, name: &str) -> Option<&OptionSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }

    /// True if the option exists and was set; unknown names are not an error.
    pub fn has_option(&self, name: &str) -> bool {
        self.find(name).is_some_and(|s| s.is_set)
    }

    /// Current value of a set option. Unknown and unset are both `None`.
    pub fn get_option_value(&self, name: &str) -> Option<&OptionValue> {
        self.find(name).filter(|s| s.is_set).map(|s| &s.value)
    }

    /// Typed value of a set option, `None` if absent, unset or of another kind.
    pub fn get<T: FromOptionValue>(&self, name: &str) -> Option<T> {
        self.get_option_value(name).and_then(T::from_option_value)
    }

    pub fn is_combo_choice_valid(&self, name: &str, candidate: &str) -> bool {
        self.find(name)
            .filter(|s| s.kind == OptionKind::Combo)
            .is_some_and(|s| s.choices.iter().any(|c| c == candidate))
    }

    /// Value mapped to the selected choice of a set `Combo` option. Without
    /// explicit [`Opt::choice_values`] this is the choice's position.
    pub fn combo_value(&self, name: &str) -> Option<i64> {
        let spec = self.find(name).filter(|s| s.is_set)?;
        match spec.value {
            OptionValue::Combo { index, .. } => match spec.choice_values.get(index) {
                Some(value) => Some(*value),
                None => i64::try_from(index).ok(),
            },
            _ => None,
        }
    }

    /// True if `args[1]` exists and is not an option reference.
    pub fn has_command<S: AsRef<str>>(args: &[S]) -> bool {
        args.get(1)
            .is_some_and(|arg| !arg.as_ref().starts_with(OPTION_MARKER))
    }

    /// Non-option tokens seen by the last `process_arguments` call.
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// Consume `args` (`args[0]` is the program name) into the registered
    /// options.
    ///
    /// Stops at the first error. Options assigned by earlier tokens of the
    /// same call stay assigned; the failing option is left untouched.
    pub fn process_arguments<S: AsRef<str>>(&mut self, args: &[S]) -> Result<()> {
        self.positionals.clear();
        let mut tokens = args.iter().map(|s| s.as_ref());
        if let Some(program) = tokens.next() {
            self.program = Some(program.to_string());
        }
        self.consume(tokens)
    }

    fn consume<'a, I>(&mut self, mut tokens: I) -> Result<()>
    where
        I: Iterator<Item = &'a str>,
    {
        let array_limit = self.array_limit;
        while let Some(arg) = tokens.next() {
            let Some(name) = arg.strip_prefix(OPTION_MARKER) else {
                trace!(token = arg, "positional argument");
                self.positionals.push(arg.to_string());
                continue;
            };
            let Some(idx) = self.position(name) else {
                debug!(token = arg, "unknown option");
                return Err(Error::UnknownOption(arg.to_string()));
            };

            let spec = &mut self.specs[idx];
            if spec.kind.takes_value() {
                let value = tokens
                    .next()
                    .ok_or_else(|| Error::MissingValue(spec.name.clone()))?;
                if let Err(e) = spec.assign(value, array_limit) {
                    debug!(option = %spec.name, error = %e, "rejected option value");
                    return Err(e);
                }
            } else {
                spec.set_flag();
            }
            debug!(option = %spec.name, value = ?spec.value, "option set");
        }
        Ok(())
    }

    /// Read-only pre-scan: report the first option reference in `args[1..]`
    /// that names no registered option. Value tokens are skipped.
    pub fn check_unrecognized<S: AsRef<str>>(&self, args: &[S]) -> Result<()> {
        let mut tokens = args.iter().skip(1).map(|s| s.as_ref());
        while let Some(arg) = tokens.next() {
            let Some(name) = arg.strip_prefix(OPTION_MARKER) else {
                continue;
            };
            match self.find(name) {
                Some(spec) if spec.kind.takes_value() => {
                    tokens.next();
                }
                Some(_) => {}
                None => return Err(Error::UnknownOption(arg.to_string())),
            }
        }
        Ok(())
    }

    /// Load option lines from a configuration file, see [`read_config_entries`].
    ///
    /// Each value stays bound to its key: a `Bool` key takes `true` or
    /// `false` (which clears the flag), every other kind requires a value.
    /// Positionals are not touched.
    pub fn process_config_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let entries = read_config_entries(path.as_ref())?;
        debug!(path = %path.as_ref().display(), entries = entries.len(), "processing config file");

        let array_limit = self.array_limit;
        for entry in entries {
            let Some(idx) = self.position(&entry.key) else {
                debug!(key = %entry.key, "unknown option in config file");
                return Err(Error::UnknownOption(format!("{}{}", OPTION_MARKER, entry.key)));
            };

            let spec = &mut self.specs[idx];
            match (spec.kind, entry.value) {
                (OptionKind::Bool, None) => spec.set_flag(),
                (OptionKind::Bool, Some(value)) => match value.as_str() {
                    "true" => spec.set_flag(),
                    "false" => spec.reset(),
                    _ => return Err(spec.invalid(&value, InvalidReason::NotABool)),
                },
                (_, None) => return Err(Error::MissingValue(entry.key)),
                (_, Some(value)) => spec.assign(&value, array_limit)?,
            }
            debug!(option = %spec.name, value = ?spec.value, "option set from config");
        }
        Ok(())
    }

    /// Put every option back to unset with its kind's default value.
    pub fn reset_options(&mut self) {
        for spec in &mut self.specs {
            spec.reset();
        }
        self.positionals.clear();
        debug!(options = self.specs.len(), "reset options");
    }

    fn program_name(&self) -> &str {
        self.program.as_deref().unwrap_or("<program>")
    }

    pub fn write_usage<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "Usage: {} [options]\n", self.program_name())?;

        let lefts: Vec<String> = self
            .specs
            .iter()
            .map(|s| format!("{}{} {}", OPTION_MARKER, s.name, s.hint()))
            .collect();
        let max_left_col = lefts.iter().map(String::len).max().unwrap_or(0);
        let indent_length = max_left_col + 5; // "  " + left column + "   "
        let line_length = if USAGE_MAX_COL > indent_length {
            USAGE_MAX_COL - indent_length
        } else {
            20
        };

        for (spec, left) in self.specs.iter().zip(&lefts) {
            match spec.description.as_deref() {
                Some(desc) => {
                    write!(out, "  {:width$}   ", left, width = max_left_col)?;
                    write_wrapped_text(out, desc, indent_length, line_length)?;
                }
                None => write!(out, "  {}\n", left)?,
            }
        }
        Ok(())
    }

    pub fn print_usage(&self) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let _ = self.write_usage(&mut out);
    }

    pub fn write_parsed<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for spec in &self.specs {
            write!(out, "Option: {}, Parsed: {}\n", spec.name, spec.is_set)?;
        }
        Ok(())
    }

    pub fn print_parsed_options(&self) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let _ = self.write_parsed(&mut out);
    }

    pub fn write_unknown_option<W: Write>(out: &mut W, token: &str) -> io::Result<()> {
        write!(out, "{}\n", Error::UnknownOption(token.to_string()).diagnostic())
    }

    pub fn handle_unknown_option(token: &str) {
        let stderr = io::stderr();
        let mut out = stderr.lock();
        let _ = Self::write_unknown_option(&mut out, token);
    }
}

/// Wrap `text` at spaces; continuation lines are indented by `indent_length`.
fn write_wrapped_text<W: Write>(
    out: &mut W,
    text: &str,
    indent_length: usize,
    line_length: usize,
) -> io::Result<()> {
    let mut help = text;
    while help.len() > line_length {
        let mut end = line_length;
        while !help.is_char_boundary(end) {
            end -= 1;
        }
        let break_pos = match help[..end].rfind(' ') {
            Some(pos) if pos > 0 => pos,
            _ => break,
        };

        write!(
            out,
            "{}\n{:indent$}",
            &help[..break_pos],
            "",
            indent = indent_length
        )?;

        help = help[break_pos..].trim_start_matches(' ');
    }

    if !help.is_empty() {
        write!(out, "{}\n", help)?;
    }
    Ok(())
}

// ============================================================================
// Config file utilities
// ============================================================================

/// One `key` or `key = value` line of a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub key: String,
    pub value: Option<String>,
}

/// Convert a config file into option tokens: `-key` for a bare line,
/// `-key value` otherwise.
pub fn config_file_to_args<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let mut args = Vec::new();
    for entry in read_config_entries(path)? {
        args.push(format!("{}{}", OPTION_MARKER, entry.key));
        args.extend(entry.value);
    }
    Ok(args)
}

/// Read the entries of a config file.
///
/// Blank lines and `#` comments are skipped. Values may be quoted with `'`
/// or `"` and use backslash escapes. Lines with something other than `=`
/// after the key are silently ignored, as are lines with an empty value.
pub fn read_config_entries<P: AsRef<Path>>(path: P) -> Result<Vec<ConfigEntry>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| Error::Config {
        path: path.to_path_buf(),
        source,
    })?;

    let mut entries = Vec::new();
    for line in content.lines() {
        let l = line.trim_start();
        if l.is_empty() || l.starts_with('#') {
            continue;
        }

        let key_end = l
            .find(|c: char| c.is_ascii_whitespace() || c == '=')
            .unwrap_or(l.len());
        let key = &l[..key_end];
        if key.is_empty() {
            continue;
        }

        let rest = l[key_end..].trim_start();
        if rest.is_empty() {
            trace!(key, "config flag");
            entries.push(ConfigEntry {
                key: key.to_string(),
                value: None,
            });
            continue;
        }
        if !rest.starts_with('=') {
            continue;
        }

        let value = rest[1..].trim();
        if value.is_empty() {
            continue;
        }

        trace!(key, value, "config value");
        entries.push(ConfigEntry {
            key: key.to_string(),
            value: Some(unquote(value)?),
        });
    }

    Ok(entries)
}

/// Split an argv-style string into arguments.
///
/// Handles single and double quoting and backslash escaping.
pub fn split_argument_string(s: &str) -> Result<Vec<String>> {
    scan_quoted(s, true)
}

/// Strip quoting from a single value; whitespace is kept literally.
fn unquote(s: &str) -> Result<String> {
    Ok(scan_quoted(s, false)?.into_iter().next().unwrap_or_default())
}

fn scan_quoted(s: &str, split_on_whitespace: bool) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            } else if c == '\\' {
                match chars.next() {
                    None => return Err(Error::BadQuote("unterminated backslash".to_string())),
                    Some(next) => {
                        if next != q {
                            current.push('\\');
                        }
                        current.push(next);
                    }
                }
            } else {
                current.push(c);
            }
        } else if split_on_whitespace && c.is_ascii_whitespace() {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
        } else {
            match c {
                '"' | '\'' => quote = Some(c),
                '\\' => match chars.next() {
                    None => return Err(Error::BadQuote("unterminated backslash".to_string())),
                    Some(next) => current.push(next),
                },
                _ => current.push(c),
            }
        }
    }

    if let Some(q) = quote {
        return Err(Error::BadQuote(format!("unterminated {} quote", q)));
    }
    if !current.is_empty() || !split_on_whitespace {
        args.push(current);
    }

    Ok(args)
}
