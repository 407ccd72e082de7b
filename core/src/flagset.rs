//! Tree root and the parse-and-dispatch entry points.

use std::ops::Deref;
use std::path::Path;
use std::process;

use tracing::debug;

use crate::chain::Context;
use crate::command::Command;
use crate::cursor::Cursor;
use crate::error::RunError;
use crate::router;

/// Root of a command tree.
///
/// A `FlagSet` dereferences to its root [`Command`], so options, commands
/// and handlers are registered on it directly. Running consumes it: the
/// tree keeps per-run state (supplied flags, filled slots) and is not
/// meant to be parsed twice.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{Context, FlagSet};
///
/// let app = FlagSet::new("app", "demo");
/// let name = app.flag::<String>(Some('n'), Some("name"), "world".into(), "who to greet").unwrap();
/// app.handle(|_ctx| {});
///
/// let result = app.run(Context::new(), &["-h"]);
/// assert!(result.is_help());
/// assert!(result.usage.starts_with("app - demo"));
/// assert_eq!(name.get(), "");
/// ```
pub struct FlagSet {
    root: Command,
}

impl FlagSet {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            root: Command::root(name, description),
        }
    }

    /// Creates a root named after the running program (base name of
    /// `argv[0]`).
    pub fn cmdline(description: &str) -> Self {
        let name = std::env::args_os()
            .next()
            .and_then(|arg0| {
                Path::new(&arg0)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_default();
        Self::new(&name, description)
    }

    pub fn root(&self) -> &Command {
        &self.root
    }

    /// Parses `args`, fills the bound slots and invokes the handler of the
    /// command the arguments lead to.
    ///
    /// The result always carries the usage text of the deepest command
    /// reached, whether or not the run failed.
    pub fn run<S: AsRef<str>>(self, ctx: Context, args: &[S]) -> RunResult {
        let mut input = Cursor::multi(args);
        let target = match router::route(&self.root, &mut input) {
            Ok(target) => target,
            Err((at, error)) => {
                debug!(command = %at.full_name(), %error, "parse stopped");
                return RunResult::failed(&at, error);
            }
        };

        let Some(handler) = target.handler() else {
            let error = RunError::NoHandler {
                command: target.full_name(),
            };
            return RunResult::failed(&target, error);
        };

        debug!(command = %target.full_name(), "dispatching");
        handler(ctx.with_command(target.clone()));
        RunResult {
            usage: target.usage(),
            error: None,
        }
    }

    /// Runs with the process arguments and applies the command-line exit
    /// policy.
    ///
    /// - help: usage on stderr, return normally
    /// - missing handler: usage on stderr, exit with status 1
    /// - any other error: the error on stderr, exit with status 1
    pub fn run_cmdline(self, ctx: Context) {
        let args: Vec<String> = std::env::args_os()
            .skip(1)
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();

        let result = self.run(ctx, &args);
        let Some(error) = result.error else {
            return;
        };
        match error {
            RunError::Help => eprintln!("{}", result.usage),
            RunError::NoHandler { .. } => {
                eprintln!("{}", result.usage);
                process::exit(1);
            }
            other => {
                eprintln!("{other}");
                process::exit(1);
            }
        }
    }
}

impl Deref for FlagSet {
    type Target = Command;

    fn deref(&self) -> &Command {
        &self.root
    }
}

/// Usage text paired with the outcome of a run.
#[derive(Debug)]
pub struct RunResult {
    /// Usage of the dispatch target, or of the deepest command reached on
    /// failure.
    pub usage: String,
    pub error: Option<RunError>,
}

impl RunResult {
    fn failed(at: &Command, error: RunError) -> Self {
        Self {
            usage: at.usage(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_help(&self) -> bool {
        self.error.as_ref().is_some_and(RunError::is_help)
    }

    /// Converts into a `Result`, dropping the usage text.
    pub fn into_result(self) -> Result<(), RunError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
