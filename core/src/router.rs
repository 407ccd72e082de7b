//! Token routing: option matching, sub-command descent and positionals.
//!
//! The router walks the raw tokens once, always positioned at exactly one
//! command. Option tokens are matched against that command's options.
//! The first bare word closes the command's option phase: defaults are
//! filled, then the word selects a sub-command, feeds the next unsupplied
//! positional, or is rejected.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::command::Command;
use crate::cursor::Cursor;
use crate::error::{RunError, ValueError};
use crate::option::OptionEntry;

/// Outcome of a failed route: the deepest command reached and the error.
pub(crate) type RouteError = (Command, RunError);

/// Routes `input` from `root` and returns the dispatch target.
pub(crate) fn route(root: &Command, input: &mut Cursor<'_>) -> Result<Command, RouteError> {
    let mut current = root.clone();

    while let Some(token) = input.next() {
        let step = if let Some(rest) = token.strip_prefix("--") {
            parse_long(&current, token, rest, input).map(|()| None)
        } else if let Some(rest) = token.strip_prefix('-') {
            parse_short(&current, token, rest, input).map(|()| None)
        } else {
            fill_defaults(&current);
            parse_word(&current, token)
        };

        match step {
            Ok(Some(child)) => {
                debug!(command = %child.full_name(), "entering sub command");
                current = child;
            }
            Ok(None) => {}
            Err(error) => return Err((current, error)),
        }
    }

    fill_defaults(&current);
    Ok(current)
}

/// Writes defaults for every option the input did not supply.
fn fill_defaults(command: &Command) {
    for option in command.options() {
        if option.fill_default() {
            trace!(
                command = %command.name(),
                option = %option.display_name(),
                "applied default"
            );
        }
    }
}

fn decode(
    command: &Command,
    option: &OptionEntry,
    token: &str,
    input: &mut Cursor<'_>,
) -> Result<(), RunError> {
    debug!(
        command = %command.name(),
        option = %option.display_name(),
        aligned = input.is_aligned(),
        "matched option"
    );
    option
        .decode(input)
        .map_err(|source: ValueError| RunError::InvalidValue {
            command: command.full_name(),
            option: token.to_string(),
            source,
        })
}

fn unknown_option(command: &Command, option: impl Into<String>) -> RunError {
    RunError::UnknownOption {
        command: command.name(),
        option: option.into(),
    }
}

/// `--name`, `--name=value` or `--help`.
fn parse_long(
    command: &Command,
    token: &str,
    rest: &str,
    input: &mut Cursor<'_>,
) -> Result<(), RunError> {
    let options = command.options();
    let matched = options.iter().find_map(|option| {
        let long = option.long.as_deref()?;
        if rest == long {
            return Some((option, None));
        }
        let value = rest.strip_prefix(long)?.strip_prefix('=')?;
        Some((option, Some(value)))
    });

    match matched {
        Some((option, Some(value))) => decode(command, option, token, &mut Cursor::aligned(value)),
        Some((option, None)) => decode(command, option, token, input),
        None if token == "--help" => Err(RunError::Help),
        None => Err(unknown_option(command, token)),
    }
}

/// `-x` or a cluster such as `-xyz`.
///
/// In a cluster, boolean options are set as they are met. Other options
/// are collected and decoded afterwards in reverse order, each taking its
/// value from the following tokens.
fn parse_short(
    command: &Command,
    token: &str,
    rest: &str,
    input: &mut Cursor<'_>,
) -> Result<(), RunError> {
    let options = command.options();
    let find = |name: char| options.iter().find(|option| option.short == Some(name));

    let mut names = rest.chars();
    let (Some(first), None) = (names.next(), names.next()) else {
        return parse_cluster(command, token, rest, input, &options);
    };

    match find(first) {
        Some(option) => decode(command, option, token, input),
        None if first == 'h' => Err(RunError::Help),
        None => Err(unknown_option(command, token)),
    }
}

fn parse_cluster(
    command: &Command,
    token: &str,
    rest: &str,
    input: &mut Cursor<'_>,
    options: &[Rc<OptionEntry>],
) -> Result<(), RunError> {
    if rest.is_empty() {
        return Err(unknown_option(command, token));
    }

    let presence: &[&str] = &[];
    let mut pending = Vec::new();
    for name in rest.chars() {
        match options.iter().find(|option| option.short == Some(name)) {
            Some(option) if option.is_bool => {
                decode(command, option, token, &mut Cursor::multi(presence))?;
            }
            Some(option) => pending.push(option),
            None if name == 'h' => return Err(RunError::Help),
            None => return Err(unknown_option(command, format!("-{name}"))),
        }
    }

    for option in pending.into_iter().rev() {
        decode(command, option, token, input)?;
    }
    Ok(())
}

/// A bare word: sub-command, positional value, `help`, or an error.
fn parse_word(command: &Command, word: &str) -> Result<Option<Command>, RunError> {
    if let Some(child) = command.find_child(word) {
        return Ok(Some(child));
    }

    let options = command.options();
    let positional = options
        .iter()
        .find(|option| option.is_positional() && !option.supplied());
    if let Some(option) = positional {
        decode(command, option, &option.display_name(), &mut Cursor::aligned(word))?;
        return Ok(None);
    }

    if word == "help" {
        return Err(RunError::Help);
    }
    Err(RunError::UnknownCommand {
        command: command.name(),
        name: word.to_string(),
    })
}
