//! Error types for registration, value decoding and dispatch.
//!
//! - [`RegistrationError`]: a mistake in how the command tree was declared,
//!   such as a duplicate name. Programmer errors, fix them before shipping.
//! - [`ValueError`]: a single input token could not be decoded into its
//!   destination type.
//! - [`RunError`]: the outcome of a failed [`run`](crate::FlagSet::run),
//!   including the distinguished [`RunError::Help`] signal.

use thiserror::Error;

/// Errors raised while declaring options and commands.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{FlagSet, RegistrationError};
///
/// let app = FlagSet::new("app", "demo");
/// app.flag::<bool>(Some('v'), Some("verbose"), false, "verbose output").unwrap();
///
/// let err = app.flag::<bool>(Some('v'), None, false, "again").unwrap_err();
/// assert_eq!(err, RegistrationError::DuplicateShort('v'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Command name is empty or whitespace-only.
    #[error("subcommand name cannot be empty")]
    EmptyCommandName,
    /// Command name or alias starts with `-`.
    #[error("subcommand name cannot start with '-': {0}")]
    DashedCommandName(String),
    /// Two sibling commands share a name or alias.
    #[error("duplicated subcommand: {0}")]
    DuplicateCommand(String),
    /// Short name is not a single ASCII alphanumeric character.
    #[error("invalid short option: {0:?}")]
    InvalidShort(char),
    /// Long name contains characters outside the allowed set.
    #[error("invalid long option: {0:?}")]
    InvalidLong(String),
    /// Short name already registered in this command's scope.
    #[error("duplicated short option: -{0}")]
    DuplicateShort(char),
    /// Long name already registered in this command's scope.
    #[error("duplicated long option: --{0}")]
    DuplicateLong(String),
    /// The destination slot is already bound by another option.
    #[error("duplicated option slot: {current} with {previous}")]
    DuplicateSlot { current: String, previous: String },
}

/// Errors raised while decoding a value token.
#[derive(Debug, Error)]
pub enum ValueError {
    /// The option expects a value but the input ran out.
    #[error("no input value")]
    NoInputValue,

    /// Aligned boolean value other than `true` or `false`.
    #[error("invalid bool value: {0:?}")]
    InvalidBool(String),

    /// Token is not a base-10 integer.
    #[error("parse {text:?} as {ty}: {source}")]
    Int {
        text: String,
        ty: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Parsed integer does not fit the declared width.
    #[error("cannot set {value} to an {ty}, overflowed")]
    Overflow { value: String, ty: String },

    /// Token is not a floating point number.
    #[error("parse {text:?} as {ty}: {source}")]
    Float {
        text: String,
        ty: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    /// Token does not follow the duration grammar.
    #[error("parse duration {text:?}: {source}")]
    Duration {
        text: String,
        #[source]
        source: humantime::DurationError,
    },

    /// Token does not follow the timestamp pattern.
    #[error("parse datetime {text:?}: {reason}")]
    Timestamp { text: String, reason: String },

    /// A mapping fragment did not split into exactly one key and one value.
    #[error("parse key/value: split {pair:?} by {separator:?}: found {parts} part(s)")]
    KeyValue {
        pair: String,
        separator: String,
        parts: usize,
    },

    /// The declared shape has no decoder.
    #[error("unsupported type {0}")]
    Unsupported(String),

    /// Failure reported by a custom [`FlagValue`](crate::FlagValue) parser.
    #[error("{0}")]
    Custom(String),
}

/// Errors returned by a parse-and-dispatch run.
///
/// [`RunError::Help`] is not a failure: it asks the caller to show usage text
/// and exit successfully. Use [`RunError::is_help`] to tell it apart.
#[derive(Debug, Error)]
pub enum RunError {
    /// `-h`, `--help` or a bare `help` was given.
    #[error("help")]
    Help,

    /// An option token matched nothing registered on the command.
    #[error("{command}: unknown option: {option}")]
    UnknownOption { command: String, option: String },

    /// A bare word matched no sub-command and no free positional.
    #[error("{command}: unknown sub command: {name}")]
    UnknownCommand { command: String, name: String },

    /// A matched option failed to decode its value.
    #[error("{command}: parse option {option}: {source}")]
    InvalidValue {
        command: String,
        option: String,
        #[source]
        source: ValueError,
    },

    /// Parsing succeeded but the target command has nothing to execute.
    #[error("no handler of command {command}")]
    NoHandler { command: String },
}

impl RunError {
    /// Returns `true` for the help signal.
    pub fn is_help(&self) -> bool {
        matches!(self, Self::Help)
    }
}

/// Convenience alias for registration results.
pub type Result<T> = std::result::Result<T, RegistrationError>;
