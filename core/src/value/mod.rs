//! Value shapes and the decoding contract for destination types.
//!
//! Every destination type implements [`FlagValue`]. The trait ties a Rust
//! type to a [`Shape`] tag, decodes input tokens into it and renders it back
//! for usage text. Built-in implementations cover:
//!
//! - signed and unsigned integers (`i8`..`i64`, `isize`, `u8`..`u64`,
//!   `usize`), overflow-checked against the declared width
//! - `f32` and `f64`
//! - `bool` (presence sets `true`; aligned values must be `true`/`false`)
//! - `String`
//! - [`std::time::Duration`] (compound units, e.g. `3h4m5s`)
//! - [`chrono::DateTime<Local>`](chrono::DateTime) (`YYYY-MM-DDTHH:MM:SS`)
//! - `Vec<E>`, `HashMap<K, V>`, `BTreeMap<K, V>` and their compositions
//!
//! Custom types opt in by implementing [`FlagValue`] with
//! [`Shape::Custom`] and overriding [`parse_flag`](FlagValue::parse_flag).
//!
//! # Examples
//!
//! ```
//! use cmdtree_core::{Cursor, FlagValue, Separators, Shape, ValueError};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Level {
//!     Low,
//!     High,
//! }
//!
//! impl FlagValue for Level {
//!     fn shape() -> Shape {
//!         Shape::Custom("level".into())
//!     }
//!     fn zero() -> Self {
//!         Level::Low
//!     }
//!     fn is_zero(&self) -> bool {
//!         *self == Level::Low
//!     }
//!     fn parse_flag(&mut self, text: &str) -> Result<(), ValueError> {
//!         *self = match text {
//!             "low" => Level::Low,
//!             "high" => Level::High,
//!             other => return Err(ValueError::Custom(format!("unknown level {other:?}"))),
//!         };
//!         Ok(())
//!     }
//!     fn flag_string(&self) -> String {
//!         format!("{self:?}").to_lowercase()
//!     }
//! }
//!
//! let mut level = Level::zero();
//! level
//!     .decode(&mut Cursor::aligned("high"), &Separators::default())
//!     .unwrap();
//! assert_eq!(level, Level::High);
//! assert_eq!(Level::shape().to_string(), "level");
//! ```

mod composite;
mod scalar;
mod time;

use std::fmt;

use crate::cursor::Cursor;
use crate::error::ValueError;

pub use time::TIMESTAMP_FORMAT;

/// Default separator between elements of a composite token.
pub const DEFAULT_ELEMENT_SEPARATOR: &str = ",";
/// Default separator between a key and its value inside a mapping token.
pub const DEFAULT_KEY_VALUE_SEPARATOR: &str = ":";

/// The closed set of decodable value kinds.
///
/// The `Display` form is the structural type name shown in usage text when
/// neither the destination type nor its default supplies a custom one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Signed integer of the named width.
    Signed(&'static str),
    /// Unsigned integer of the named width.
    Unsigned(&'static str),
    /// Floating point of the named width.
    Float(&'static str),
    Bool,
    Str,
    Duration,
    Timestamp,
    /// Ordered list of elements.
    Seq(Box<Shape>),
    /// Key to value mapping.
    Map(Box<Shape>, Box<Shape>),
    /// User-defined type with its own parser.
    Custom(String),
}

impl Shape {
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(..))
    }

    pub fn is_seq(&self) -> bool {
        matches!(self, Self::Seq(_))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signed(name) | Self::Unsigned(name) | Self::Float(name) => f.write_str(name),
            Self::Bool => f.write_str("bool"),
            Self::Str => f.write_str("string"),
            Self::Duration => f.write_str("duration"),
            Self::Timestamp => f.write_str("datetime"),
            Self::Seq(elem) => write!(f, "list<{elem}>"),
            Self::Map(key, value) => write!(f, "map<{key}, {value}>"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// Separators used to split composite tokens.
///
/// # Examples
///
/// ```
/// use cmdtree_core::Separators;
///
/// let seps = Separators::default();
/// assert_eq!(seps.element, ",");
/// assert_eq!(seps.key_value, ":");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separators {
    /// Splits a token into list elements or mapping pairs.
    pub element: String,
    /// Splits a mapping pair into key and value.
    pub key_value: String,
}

impl Default for Separators {
    fn default() -> Self {
        Self {
            element: DEFAULT_ELEMENT_SEPARATOR.to_string(),
            key_value: DEFAULT_KEY_VALUE_SEPARATOR.to_string(),
        }
    }
}

/// A type that can be bound to an option and decoded from input tokens.
///
/// Only [`shape`](FlagValue::shape), [`zero`](FlagValue::zero),
/// [`is_zero`](FlagValue::is_zero) and [`flag_string`](FlagValue::flag_string)
/// are required. The remaining methods are the opt-in capabilities:
///
/// - [`parse_flag`](FlagValue::parse_flag): custom single-token parse.
/// - [`flag_type`](FlagValue::flag_type) /
///   [`flag_type_of`](FlagValue::flag_type_of): custom type name for usage.
/// - [`flag_string`](FlagValue::flag_string): rendering of defaults.
pub trait FlagValue: Clone + 'static {
    /// Shape tag of this type.
    fn shape() -> Shape;

    /// The zero value. A default equal to it counts as "no default" unless
    /// the option opts into zero defaults.
    fn zero() -> Self;

    fn is_zero(&self) -> bool;

    /// Decodes the next occurrence from `input` into `self`.
    ///
    /// The default consumes exactly one token and hands it to
    /// [`parse_flag`](FlagValue::parse_flag).
    fn decode(&mut self, input: &mut Cursor<'_>, _separators: &Separators) -> Result<(), ValueError> {
        let text = input.value()?;
        self.parse_flag(text)
    }

    /// Parses a single token into `self`.
    fn parse_flag(&mut self, _text: &str) -> Result<(), ValueError> {
        Err(ValueError::Unsupported(Self::shape().to_string()))
    }

    /// Type name declared by the destination type, if any.
    fn flag_type() -> Option<String> {
        None
    }

    /// Type name declared by a particular value (consulted on the default).
    fn flag_type_of(&self) -> Option<String> {
        None
    }

    /// Human-readable rendering used for `(default: ...)` in usage text.
    fn flag_string(&self) -> String;

    /// Structural rendering used inside composite defaults and by
    /// [`describe`](crate::Command::describe).
    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::String(self.flag_string())
    }

    /// Merges a freshly decoded value for the same mapping key.
    ///
    /// Scalars replace; sequences append.
    fn absorb(&mut self, other: Self) {
        *self = other;
    }
}

/// Renders a value as a mapping key inside JSON output.
pub(crate) fn json_key<T: FlagValue>(value: &T) -> String {
    match value.to_json() {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Resolves the type name shown in usage: destination type first, then the
/// default value, then the structural shape name.
pub(crate) fn type_name<T: FlagValue>(default: Option<&T>) -> String {
    T::flag_type()
        .or_else(|| default.and_then(|value| value.flag_type_of()))
        .unwrap_or_else(|| T::shape().to_string())
}
