//! Option registry entries and registration rules.
//!
//! An option binds a destination [`Slot`] to a short name (`-p`), a long name
//! (`--port`), both, or neither. An option with neither name is positional
//! and is identified by its registration order (`$1`, `$2`, ...).
//!
//! Names are checked when registered:
//!
//! - short: a single ASCII letter or digit
//! - long: starts with an ASCII letter or digit, continues with letters,
//!   digits and `- _ . : + / @ ~ % ^`
//!
//! # Examples
//!
//! ```
//! use cmdtree_core::{valid_long, valid_short};
//!
//! assert!(valid_short('v'));
//! assert!(!valid_short('-'));
//! assert!(valid_long("dry-run"));
//! assert!(valid_long("log.level"));
//! assert!(!valid_long("-dry-run"));
//! assert!(!valid_long("dry run"));
//! ```

use std::cell::Cell;
use std::sync::LazyLock;

use regex::Regex;

use crate::cursor::Cursor;
use crate::error::ValueError;
use crate::slot::Slot;
use crate::value::{self, FlagValue, Separators};

static LONG_NAME: LazyLock<Regex> = LazyLock::new(|| {
    // Compile-time constant pattern; a failure here is a programmer error.
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9\-_.:+/@~%^]*$").expect("static regex must compile")
});

/// Returns `true` if `short` is usable as a short option name.
pub fn valid_short(short: char) -> bool {
    short.is_ascii_alphanumeric()
}

/// Returns `true` if `long` is usable as a long option name.
///
/// The empty string is accepted and means "no long name".
pub fn valid_long(long: &str) -> bool {
    long.is_empty() || LONG_NAME.is_match(long)
}

/// Per-option registration settings.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use cmdtree_core::{FlagSet, OptionConfig};
///
/// let app = FlagSet::new("app", "");
/// let env = app
///     .flag_with::<HashMap<String, String>>(
///         Some('e'),
///         Some("env"),
///         HashMap::new(),
///         "environment overrides",
///         OptionConfig::new()
///             .with_separator(";")
///             .with_key_value_separator("="),
///     )
///     .unwrap();
/// assert!(env.get().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct OptionConfig {
    separator: Option<String>,
    key_value_separator: Option<String>,
    zero_default: bool,
}

impl OptionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Separator between elements of a list or pairs of a mapping
    /// (default `,`).
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Separator between a key and its value (default `:`).
    pub fn with_key_value_separator(mut self, separator: impl Into<String>) -> Self {
        self.key_value_separator = Some(separator.into());
        self
    }

    /// Keeps a zero default as a real default: it is written back when the
    /// option is absent and shown in usage.
    pub fn with_zero_default(mut self, zero: bool) -> Self {
        self.zero_default = zero;
        self
    }

    pub(crate) fn zero_default(&self) -> bool {
        self.zero_default
    }

    pub(crate) fn separators(&self) -> Separators {
        let mut separators = Separators::default();
        if let Some(sep) = self.separator.as_ref().filter(|s| !s.is_empty()) {
            separators.element = sep.clone();
        }
        if let Some(sep) = self.key_value_separator.as_ref().filter(|s| !s.is_empty()) {
            separators.key_value = sep.clone();
        }
        separators
    }
}

/// Type-erased access to a typed slot and its default.
trait Binding {
    fn decode(&self, input: &mut Cursor<'_>, separators: &Separators) -> Result<(), ValueError>;
    fn apply_default(&self) -> bool;
    fn slot_id(&self) -> usize;
}

struct TypedBinding<T> {
    slot: Slot<T>,
    default: Option<T>,
}

impl<T: FlagValue> Binding for TypedBinding<T> {
    fn decode(&self, input: &mut Cursor<'_>, separators: &Separators) -> Result<(), ValueError> {
        self.slot.with_mut(|value| value.decode(input, separators))
    }

    fn apply_default(&self) -> bool {
        match &self.default {
            Some(default) => {
                self.slot.set(default.clone());
                true
            }
            None => false,
        }
    }

    fn slot_id(&self) -> usize {
        self.slot.id()
    }
}

/// One registered option.
///
/// Entries are shared by reference between a command and every command
/// branched from it afterwards, so the supplied flag is visible along the
/// whole path of a run.
pub(crate) struct OptionEntry {
    pub(crate) short: Option<char>,
    pub(crate) long: Option<String>,
    /// 1-based index among positional options; `None` for named options.
    pub(crate) position: Option<usize>,
    pub(crate) type_name: String,
    pub(crate) description: String,
    pub(crate) default_text: Option<String>,
    pub(crate) default_json: Option<serde_json::Value>,
    pub(crate) is_bool: bool,
    separators: Separators,
    supplied: Cell<bool>,
    binding: Box<dyn Binding>,
}

impl OptionEntry {
    pub(crate) fn new<T: FlagValue>(
        slot: Slot<T>,
        short: Option<char>,
        long: Option<String>,
        position: Option<usize>,
        default: T,
        description: &str,
        config: &OptionConfig,
    ) -> Self {
        let default = (config.zero_default() || !default.is_zero()).then_some(default);
        Self {
            short,
            long,
            position,
            type_name: value::type_name::<T>(default.as_ref()),
            description: description.to_string(),
            default_text: default.as_ref().map(FlagValue::flag_string),
            default_json: default.as_ref().map(FlagValue::to_json),
            is_bool: T::shape().is_bool(),
            separators: config.separators(),
            supplied: Cell::new(false),
            binding: Box::new(TypedBinding { slot, default }),
        }
    }

    pub(crate) fn is_positional(&self) -> bool {
        self.position.is_some()
    }

    /// Name used in error messages: `--long`, `-s` or `$n`.
    pub(crate) fn display_name(&self) -> String {
        match (&self.long, self.short, self.position) {
            (Some(long), _, _) => format!("--{long}"),
            (None, Some(short), _) => format!("-{short}"),
            (None, None, Some(position)) => format!("${position}"),
            (None, None, None) => String::new(),
        }
    }

    pub(crate) fn slot_id(&self) -> usize {
        self.binding.slot_id()
    }

    pub(crate) fn supplied(&self) -> bool {
        self.supplied.get()
    }

    /// Marks the option supplied and decodes its next occurrence.
    pub(crate) fn decode(&self, input: &mut Cursor<'_>) -> Result<(), ValueError> {
        self.supplied.set(true);
        self.binding.decode(input, &self.separators)
    }

    /// Writes the default into the slot unless input supplied the option.
    pub(crate) fn fill_default(&self) -> bool {
        !self.supplied() && self.binding.apply_default()
    }
}
