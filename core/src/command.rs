//! Command tree nodes and registration.
//!
//! A [`Command`] is a handle to one node of the tree. Handles are cheap to
//! clone and all clones refer to the same node. A node owns its options,
//! its sub-commands, its interceptors and its handler; it refers to its
//! parent weakly, so dropping the root drops the whole tree.
//!
//! Options are inherited by snapshot: a new sub-command (or statement) starts
//! with a copy of its parent's option list as it is at that moment. Options
//! registered on the parent afterwards are not seen by it, and options
//! registered on it are never seen by the parent or its siblings.
//!
//! A *statement* ([`Command::statement`]) is a nameless scope with its own
//! interceptor list. Sub-commands created through it are listed under the
//! command the statement was opened on, but their handler chains include
//! the statement's interceptors.
//!
//! # Examples
//!
//! ```
//! use cmdtree_core::{Context, FlagSet};
//!
//! let app = FlagSet::new("app", "demo");
//! let verbose = app.flag::<bool>(Some('v'), Some("verbose"), false, "chatty").unwrap();
//!
//! let admin = app.statement();
//! admin.intercept(|ctx, next| {
//!     // e.g. check credentials before continuing
//!     next(ctx)
//! });
//! let purge = admin.command("purge", "drop everything").unwrap();
//! purge.handle(|_ctx| {});
//!
//! assert_eq!(purge.full_name(), "app purge");
//! assert_eq!(app.subcommands().len(), 1);
//!
//! let result = app.run(Context::new(), &["-v", "purge"]);
//! assert!(result.is_ok());
//! assert!(verbose.get());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::chain::{self, Context, Handler, Interceptor};
use crate::describe::{self, CommandInfo};
use crate::error::{RegistrationError, Result};
use crate::option::{OptionConfig, OptionEntry, valid_long, valid_short};
use crate::slot::Slot;
use crate::usage;
use crate::value::FlagValue;

pub(crate) type NodeRef = Rc<RefCell<Node>>;

pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: String,
    pub(crate) options: Vec<Rc<OptionEntry>>,
    pub(crate) children: Vec<Command>,
    pub(crate) handler: Option<Handler>,
    /// Statements opened on this node; kept here so they outlive their
    /// creator's handle.
    statements: Vec<Command>,
    interceptors: Vec<Interceptor>,
    parent: Option<Weak<RefCell<Node>>>,
    /// Set on statements: the non-statement node they were opened from.
    origin: Option<Weak<RefCell<Node>>>,
}

impl Node {
    fn new(name: &str, description: &str, options: Vec<Rc<OptionEntry>>) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            description: description.to_string(),
            options,
            children: Vec::new(),
            handler: None,
            statements: Vec::new(),
            interceptors: Vec::new(),
            parent: None,
            origin: None,
        }
    }

    fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| alias == name)
    }
}

/// Handle to one node of the command tree.
#[derive(Clone)]
pub struct Command(NodeRef);

impl Command {
    pub(crate) fn root(name: &str, description: &str) -> Self {
        Self(Rc::new(RefCell::new(Node::new(name, description, Vec::new()))))
    }

    pub(crate) fn from_ref(node: NodeRef) -> Self {
        Self(node)
    }

    pub(crate) fn node(&self) -> &NodeRef {
        &self.0
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn description(&self) -> String {
        self.0.borrow().description.clone()
    }

    pub fn aliases(&self) -> Vec<String> {
        self.0.borrow().aliases.clone()
    }

    /// The node this one was created from; `None` for the root.
    pub fn parent(&self) -> Option<Command> {
        let parent = self.0.borrow().parent.as_ref()?.upgrade()?;
        Some(Self(parent))
    }

    /// Sub-commands listed under this node, in registration order.
    pub fn subcommands(&self) -> Vec<Command> {
        self.0.borrow().children.clone()
    }

    pub fn is_statement(&self) -> bool {
        self.0.borrow().origin.is_some()
    }

    pub fn has_handler(&self) -> bool {
        self.0.borrow().handler.is_some()
    }

    /// Space-joined names from the root down to this node, skipping empty
    /// names (statements).
    pub fn full_name(&self) -> String {
        let mut names = Vec::new();
        let mut current = Some(self.clone());
        while let Some(command) = current {
            let name = command.name();
            if !name.is_empty() {
                names.push(name);
            }
            current = command.parent();
        }
        names.reverse();
        names.join(" ")
    }

    fn origin(&self) -> Option<NodeRef> {
        self.0.borrow().origin.as_ref()?.upgrade()
    }

    /// Node whose child list receives commands created from this one.
    fn attach_target(&self) -> Command {
        self.origin().map(Self).unwrap_or_else(|| self.clone())
    }

    fn has_child_named(&self, name: &str) -> bool {
        self.0
            .borrow()
            .children
            .iter()
            .any(|child| child.0.borrow().answers_to(name))
    }

    /// Registers a sub-command.
    ///
    /// The name is trimmed; it must be non-empty, must not start with `-`
    /// and must not collide with a sibling's name or alias.
    pub fn command(&self, name: &str, description: &str) -> Result<Command> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistrationError::EmptyCommandName);
        }
        if name.starts_with('-') {
            return Err(RegistrationError::DashedCommandName(name.to_string()));
        }

        let target = self.attach_target();
        if target.has_child_named(name) {
            return Err(RegistrationError::DuplicateCommand(name.to_string()));
        }

        let options = self.0.borrow().options.clone();
        let mut node = Node::new(name, description, options);
        node.parent = Some(Rc::downgrade(&self.0));
        let child = Self(Rc::new(RefCell::new(node)));
        target.0.borrow_mut().children.push(child.clone());

        debug!(parent = %target.full_name(), command = name, "registered sub command");
        Ok(child)
    }

    /// Adds alternative names for this command.
    ///
    /// Blank entries are skipped. An alias must not start with `-` and must
    /// not collide with this command's or a sibling's names.
    pub fn alias<I, S>(&self, aliases: I) -> Result<&Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let siblings = self.parent().map(|parent| parent.attach_target());
        for alias in aliases {
            let alias = alias.as_ref().trim();
            if alias.is_empty() {
                continue;
            }
            if alias.starts_with('-') {
                return Err(RegistrationError::DashedCommandName(alias.to_string()));
            }
            let taken = self.0.borrow().answers_to(alias)
                || siblings
                    .as_ref()
                    .is_some_and(|container| container.has_child_named(alias));
            if taken {
                return Err(RegistrationError::DuplicateCommand(alias.to_string()));
            }
            self.0.borrow_mut().aliases.push(alias.to_string());
        }
        Ok(self)
    }

    /// Opens a statement scope on this command.
    ///
    /// The statement starts with a snapshot of this command's options and
    /// an empty interceptor list. Interceptors added to it apply only to
    /// handlers of commands created through it.
    pub fn statement(&self) -> Command {
        let origin = self.origin().unwrap_or_else(|| Rc::clone(&self.0));
        let mut node = {
            let this = self.0.borrow();
            Node::new("", &this.description, this.options.clone())
        };
        node.parent = Some(Rc::downgrade(&self.0));
        node.origin = Some(Rc::downgrade(&origin));

        let statement = Self(Rc::new(RefCell::new(node)));
        origin.borrow_mut().statements.push(statement.clone());
        statement
    }

    /// Appends an interceptor.
    ///
    /// Interceptors are captured when a handler is attached, so only
    /// handlers attached afterwards (here or on descendants) see it.
    pub fn intercept(&self, f: impl Fn(Context, &Handler) + 'static) -> &Self {
        self.0.borrow_mut().interceptors.push(Rc::new(f));
        self
    }

    /// Attaches the terminal handler.
    pub fn handle(&self, f: impl Fn(Context) + 'static) {
        self.handle_with(f, Vec::new());
    }

    /// Attaches the terminal handler wrapped by `extra` interceptors that
    /// apply to this handler only.
    ///
    /// From innermost to outermost: the handler, `extra`, this command's
    /// interceptors, then each ancestor's interceptors up to the root.
    pub fn handle_with(&self, f: impl Fn(Context) + 'static, extra: Vec<Interceptor>) {
        let mut handler = chain::compose(&self.0, &extra, chain::terminal(&self.0, f));

        let mut current = Some(self.clone());
        while let Some(command) = current {
            let interceptors = command.0.borrow().interceptors.clone();
            handler = chain::compose(&command.0, &interceptors, handler);
            current = command.parent();
        }

        self.0.borrow_mut().handler = Some(handler);
    }

    pub(crate) fn handler(&self) -> Option<Handler> {
        self.0.borrow().handler.clone()
    }

    pub(crate) fn options(&self) -> Vec<Rc<OptionEntry>> {
        self.0.borrow().options.clone()
    }

    pub(crate) fn find_child(&self, name: &str) -> Option<Command> {
        self.0
            .borrow()
            .children
            .iter()
            .find(|child| child.0.borrow().answers_to(name))
            .cloned()
    }

    /// Binds `slot` to an option.
    ///
    /// `short` must be an ASCII letter or digit. Leading dashes are trimmed
    /// from `long`; what remains must start with a letter or digit. With
    /// neither name the option is positional. A `default` equal to the
    /// type's zero value counts as no default.
    pub fn var<T: FlagValue>(
        &self,
        slot: &Slot<T>,
        short: Option<char>,
        long: Option<&str>,
        default: T,
        description: &str,
    ) -> Result<()> {
        self.var_with(slot, short, long, default, description, OptionConfig::default())
    }

    /// [`var`](Command::var) with explicit [`OptionConfig`].
    pub fn var_with<T: FlagValue>(
        &self,
        slot: &Slot<T>,
        short: Option<char>,
        long: Option<&str>,
        default: T,
        description: &str,
        config: OptionConfig,
    ) -> Result<()> {
        if let Some(short) = short {
            if !valid_short(short) {
                return Err(RegistrationError::InvalidShort(short));
            }
        }
        let long = long.map(|long| long.trim_start_matches('-'));
        if let Some(long) = long {
            if !valid_long(long) {
                return Err(RegistrationError::InvalidLong(long.to_string()));
            }
        }
        let long = long.filter(|long| !long.is_empty());
        self.register(slot, short, long, default, description, &config)
    }

    /// Registers an option on a fresh slot and returns the slot.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdtree_core::{Context, FlagSet};
    ///
    /// let app = FlagSet::new("app", "");
    /// let port = app.flag::<u16>(Some('p'), Some("port"), 8080, "listen port").unwrap();
    /// app.handle(|_ctx| {});
    ///
    /// assert!(app.run(Context::new(), &["--port=9090"]).is_ok());
    /// assert_eq!(port.get(), 9090);
    /// ```
    pub fn flag<T: FlagValue>(
        &self,
        short: Option<char>,
        long: Option<&str>,
        default: T,
        description: &str,
    ) -> Result<Slot<T>> {
        self.flag_with(short, long, default, description, OptionConfig::default())
    }

    /// [`flag`](Command::flag) with explicit [`OptionConfig`].
    pub fn flag_with<T: FlagValue>(
        &self,
        short: Option<char>,
        long: Option<&str>,
        default: T,
        description: &str,
        config: OptionConfig,
    ) -> Result<Slot<T>> {
        let slot = Slot::new(T::zero());
        self.var_with(&slot, short, long, default, description, config)?;
        Ok(slot)
    }

    /// Registers a positional option on a fresh slot.
    ///
    /// Positional options take bare words that match no sub-command, in
    /// registration order, one word each.
    pub fn positional<T: FlagValue>(&self, default: T, description: &str) -> Result<Slot<T>> {
        let slot = Slot::new(T::zero());
        self.positional_var(&slot, default, description)?;
        Ok(slot)
    }

    /// Binds `slot` to a positional option.
    pub fn positional_var<T: FlagValue>(
        &self,
        slot: &Slot<T>,
        default: T,
        description: &str,
    ) -> Result<()> {
        self.register(slot, None, None, default, description, &OptionConfig::default())
    }

    fn register<T: FlagValue>(
        &self,
        slot: &Slot<T>,
        short: Option<char>,
        long: Option<&str>,
        default: T,
        description: &str,
        config: &OptionConfig,
    ) -> Result<()> {
        let mut node = self.0.borrow_mut();

        for existing in &node.options {
            if let Some(short) = short.filter(|s| existing.short == Some(*s)) {
                return Err(RegistrationError::DuplicateShort(short));
            }
            if let Some(long) = long.filter(|l| existing.long.as_deref() == Some(*l)) {
                return Err(RegistrationError::DuplicateLong(long.to_string()));
            }
        }

        let position = (short.is_none() && long.is_none())
            .then(|| node.options.iter().filter(|o| o.is_positional()).count() + 1);
        let entry = OptionEntry::new(
            slot.clone(),
            short,
            long.map(str::to_string),
            position,
            default,
            description,
            config,
        );

        if let Some(previous) = node.options.iter().find(|o| o.slot_id() == slot.id()) {
            return Err(RegistrationError::DuplicateSlot {
                current: entry.display_name(),
                previous: previous.display_name(),
            });
        }

        debug!(
            command = %node.name,
            option = %entry.display_name(),
            ty = %entry.type_name,
            "registered option"
        );
        node.options.push(Rc::new(entry));
        Ok(())
    }

    /// Reports whether input supplied the option bound to `slot` during the
    /// last run.
    ///
    /// The slot is looked up in this command's options first. When it is
    /// not bound here, the sub-commands are searched depth first, so the
    /// root can answer for options registered anywhere in the tree.
    pub fn parsed<T>(&self, slot: &Slot<T>) -> bool {
        self.supplied_slot(slot.id()).unwrap_or(false)
    }

    fn supplied_slot(&self, id: usize) -> Option<bool> {
        let own = self
            .0
            .borrow()
            .options
            .iter()
            .find(|option| option.slot_id() == id)
            .map(|option| option.supplied());
        own.or_else(|| {
            self.subcommands()
                .iter()
                .find_map(|child| child.supplied_slot(id))
        })
    }

    /// Renders the usage text of this command.
    pub fn usage(&self) -> String {
        usage::render(self)
    }

    /// Structural description of this command and its sub-commands.
    pub fn describe(&self) -> CommandInfo {
        describe::describe(self)
    }
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Command {}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Command").field(&self.full_name()).finish()
    }
}
