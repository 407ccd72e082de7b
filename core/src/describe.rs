//! Serializable description of a command tree.
//!
//! [`Command::describe`](crate::Command::describe) walks the tree and
//! produces plain data that tooling can dump as JSON (completion
//! generators, documentation, schema checks) without touching the live
//! nodes.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::option::OptionEntry;

/// One command and everything below it.
///
/// # Examples
///
/// ```
/// use cmdtree_core::FlagSet;
///
/// let app = FlagSet::new("app", "demo");
/// let sub = app.command("serve", "start the server").unwrap();
/// sub.alias(["s"]).unwrap();
/// sub.flag::<u16>(Some('p'), Some("port"), 8080, "listen port").unwrap();
///
/// let info = app.describe();
/// assert_eq!(info.commands[0].name, "serve");
/// assert_eq!(info.commands[0].options[0].type_name, "u16");
///
/// let json = serde_json::to_value(&info).unwrap();
/// assert_eq!(json["commands"][0]["options"][0]["default"], 8080);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandInfo {
    pub name: String,
    /// Space-joined path from the root.
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub description: String,
    /// Whether a handler is attached.
    pub runnable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandInfo>,
}

/// One option as seen from its command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    /// 1-based position for positional options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    pub description: String,
}

impl From<&OptionEntry> for OptionInfo {
    fn from(entry: &OptionEntry) -> Self {
        Self {
            short: entry.short,
            long: entry.long.clone(),
            position: entry.position,
            type_name: entry.type_name.clone(),
            default: entry.default_json.clone(),
            description: entry.description.clone(),
        }
    }
}

pub(crate) fn describe(command: &Command) -> CommandInfo {
    CommandInfo {
        name: command.name(),
        full_name: command.full_name(),
        aliases: command.aliases(),
        description: command.description(),
        runnable: command.has_handler(),
        options: command
            .options()
            .iter()
            .map(|entry| OptionInfo::from(&**entry))
            .collect(),
        commands: command.subcommands().iter().map(describe).collect(),
    }
}
