//! Option binding, value decoding and sub-command dispatch.
//!
//! This crate turns a list of argument strings into typed values and a call
//! to the right handler:
//!
//! - [`FlagSet`] is the root of a command tree; [`Command`] is any node.
//! - Options bind a caller-owned [`Slot`] to a short and/or long name, or to
//!   a position. Values decode through [`FlagValue`], which covers integers,
//!   floats, booleans, strings, durations, timestamps, lists, maps and their
//!   compositions.
//! - Handlers run inside interceptor chains composed from the command's
//!   ancestry, with a [`Context`] threaded through every layer.
//! - Every run returns a [`RunResult`] carrying the usage text of the
//!   command it stopped at, so callers can show help on failure.
//!
//! Declaring a tree wrongly (duplicate names, invalid characters, a slot
//! bound twice) is reported as a [`RegistrationError`]. Those are
//! programmer mistakes; propagate them at start-up.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use std::time::Duration;
//! use cmdtree_core::{Context, FlagSet};
//!
//! let app = FlagSet::new("fetch", "download things");
//! let verbose = app.flag::<bool>(Some('v'), Some("verbose"), false, "chatty output").unwrap();
//!
//! let get = app.command("get", "download one url").unwrap();
//! get.alias(["g"]).unwrap();
//! let timeout = get
//!     .flag::<Duration>(Some('t'), Some("timeout"), Duration::from_secs(30), "per request")
//!     .unwrap();
//! let url = get.positional::<String>(String::new(), "url to fetch").unwrap();
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let out = Rc::clone(&log);
//! let (t, u) = (timeout.clone(), url.clone());
//! get.handle(move |_ctx| out.borrow_mut().push(format!("{} in {:?}", u.get(), t.get())));
//!
//! let result = app.run(Context::new(), &["-v", "g", "--timeout=1m", "https://example.com"]);
//! assert!(result.is_ok(), "{:?}", result.error);
//! assert!(verbose.get());
//! assert_eq!(*log.borrow(), vec!["https://example.com in 60s"]);
//! ```

mod chain;
mod command;
mod cursor;
mod describe;
mod error;
mod flagset;
mod option;
mod router;
mod slot;
mod usage;
mod value;

pub use chain::{Context, Handler, Interceptor, current_command_usage, interceptor};
pub use command::Command;
pub use cursor::Cursor;
pub use describe::{CommandInfo, OptionInfo};
pub use error::{RegistrationError, Result, RunError, ValueError};
pub use flagset::{FlagSet, RunResult};
pub use option::{OptionConfig, valid_long, valid_short};
pub use slot::Slot;
pub use value::{
    DEFAULT_ELEMENT_SEPARATOR, DEFAULT_KEY_VALUE_SEPARATOR, FlagValue, Separators, Shape,
    TIMESTAMP_FORMAT,
};
