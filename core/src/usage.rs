//! Usage text rendering.
//!
//! Layout:
//!
//! ```text
//! app sub - description
//!
//! Usage:
//!   app sub [option|command]
//!
//! Options:
//!   -n, --num i64 (default: 3)
//!     option description
//!
//! Commands:
//!   child (aliases: c, ch)
//!     child description
//! ```
//!
//! The options block appears only when the command has a handler and at
//! least one option. Trailing whitespace is trimmed.

use std::fmt::Write;

use crate::command::Command;

pub(crate) fn render(command: &Command) -> String {
    let name = command.full_name();
    let options = command.options();
    let children = command.subcommands();
    let show_options = command.has_handler() && !options.is_empty();

    let mut out = String::new();
    let _ = write!(out, "{name} - {}\n\n", command.description());

    out.push_str("Usage:\n");
    let _ = write!(out, "  {name}");
    match (show_options, children.is_empty()) {
        (true, false) => out.push_str(" [option|command]"),
        (true, true) => out.push_str(" [option]"),
        (false, false) => out.push_str(" [command]"),
        (false, true) => {}
    }
    out.push_str("\n\n");

    if show_options {
        out.push_str("Options:\n");
        for option in &options {
            out.push_str("  ");
            let names: Vec<String> = option
                .short
                .map(|short| format!("-{short}"))
                .into_iter()
                .chain(option.long.as_ref().map(|long| format!("--{long}")))
                .collect();
            if names.is_empty() {
                out.push_str(&option.display_name());
            } else {
                out.push_str(&names.join(", "));
            }
            let _ = write!(out, " {}", option.type_name);
            if let Some(default) = &option.default_text {
                let _ = write!(out, " (default: {default})");
            }
            out.push('\n');
            push_description(&mut out, &option.description);
            out.push('\n');
        }
    }

    if !children.is_empty() {
        out.push_str("Commands:\n");
        for child in &children {
            let aliases = child.aliases();
            if aliases.is_empty() {
                let _ = writeln!(out, "  {}", child.name());
            } else {
                let _ = writeln!(out, "  {} (aliases: {})", child.name(), aliases.join(", "));
            }
            push_description(&mut out, &child.description());
            out.push('\n');
        }
    }

    out.trim().to_string()
}

fn push_description(out: &mut String, description: &str) {
    if description.is_empty() {
        return;
    }
    for line in description.split('\n') {
        let _ = writeln!(out, "    {line}");
    }
}
