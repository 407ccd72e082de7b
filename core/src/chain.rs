//! Execution context, handlers and interceptor composition.
//!
//! A [`Handler`] is the terminal action of a command. An [`Interceptor`]
//! wraps the rest of the chain and decides whether to continue by calling
//! the `next` handler it receives. Composition happens once, when a handler
//! is attached, and follows the command's ancestry: the root's interceptors
//! are outermost and the handler is innermost.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::command::{Command, Node, NodeRef};

/// Terminal action of a command.
pub type Handler = Rc<dyn Fn(Context)>;

/// Wrapping behavior around the next handler in the chain.
pub type Interceptor = Rc<dyn Fn(Context, &Handler)>;

/// Wraps a closure as an [`Interceptor`], for use with
/// [`Command::handle_with`].
pub fn interceptor(f: impl Fn(Context, &Handler) + 'static) -> Interceptor {
    Rc::new(f)
}

/// Value threaded through every interceptor and handler of a run.
///
/// It records which command owns the layer currently executing and carries
/// caller-supplied extensions keyed by type. Cloning is cheap: extensions
/// are shared and copied only when a new one is added.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use cmdtree_core::Context;
///
/// let cancelled = Rc::new(Cell::new(false));
/// let ctx = Context::new().with(Rc::clone(&cancelled)).with(42u32);
///
/// assert_eq!(ctx.get::<u32>(), Some(&42));
/// assert!(!ctx.get::<Rc<Cell<bool>>>().unwrap().get());
/// assert!(ctx.get::<String>().is_none());
/// assert!(ctx.command().is_none());
/// ```
#[derive(Clone, Default)]
pub struct Context {
    command: Option<Command>,
    extensions: Rc<HashMap<TypeId, Rc<dyn Any>>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a context that also carries `value`, replacing any earlier
    /// value of the same type.
    pub fn with<T: 'static>(mut self, value: T) -> Self {
        let mut extensions = (*self.extensions).clone();
        extensions.insert(TypeId::of::<T>(), Rc::new(value));
        self.extensions = Rc::new(extensions);
        self
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|value| (**value).downcast_ref::<T>())
    }

    /// The command owning the layer currently executing.
    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    pub(crate) fn with_command(mut self, command: Command) -> Self {
        self.command = Some(command);
        self
    }

    fn is_at(&self, owner: &NodeRef) -> bool {
        self.command
            .as_ref()
            .is_some_and(|command| Rc::ptr_eq(command.node(), owner))
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("command", &self.command.as_ref().map(Command::full_name))
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

/// Renders the usage of the command recorded in `ctx`, or an empty string.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use cmdtree_core::{Context, FlagSet, current_command_usage};
///
/// let app = FlagSet::new("app", "demo app");
/// let seen = Rc::new(RefCell::new(String::new()));
/// let out = Rc::clone(&seen);
/// app.command("sub", "a sub command")
///     .unwrap()
///     .handle(move |ctx| *out.borrow_mut() = current_command_usage(&ctx));
///
/// assert!(app.run(Context::new(), &["sub"]).is_ok());
/// assert!(seen.borrow().starts_with("app sub - a sub command"));
/// assert_eq!(current_command_usage(&Context::new()), "");
/// ```
pub fn current_command_usage(ctx: &Context) -> String {
    ctx.command().map(Command::usage).unwrap_or_default()
}

/// Wraps a terminal handler so it sees its own command in the context.
pub(crate) fn terminal(owner: &NodeRef, f: impl Fn(Context) + 'static) -> Handler {
    let owner = Rc::downgrade(owner);
    Rc::new(move |ctx: Context| f(enter(&owner, ctx)))
}

/// Wraps `inner` with `interceptors`, last one closest to `inner`.
///
/// Each layer makes sure the context names `owner` before entering its
/// interceptor.
pub(crate) fn compose(owner: &NodeRef, interceptors: &[Interceptor], inner: Handler) -> Handler {
    interceptors.iter().rev().fold(inner, |next, layer| {
        let owner = Rc::downgrade(owner);
        let layer = Rc::clone(layer);
        let wrapped: Handler = Rc::new(move |ctx: Context| layer(enter(&owner, ctx), &next));
        wrapped
    })
}

fn enter(owner: &Weak<RefCell<Node>>, ctx: Context) -> Context {
    match owner.upgrade() {
        Some(node) if !ctx.is_at(&node) => ctx.with_command(Command::from_ref(node)),
        _ => ctx,
    }
}
