//! Declarative command nodes.
//!
//! A [`Command`] describes one node of the command tree: its names, help
//! strings, flags, lifecycle hooks, and children. Commands are assembled
//! with consuming builder methods and then frozen into a
//! [`CommandTree`](crate::CommandTree) for dispatch.
//!
//! Lifecycle order for a terminal command:
//!
//! 1. every ancestor's `persistent_pre_run`, root first
//! 2. `pre_run`
//! 3. `run`
//! 4. `post_run`
//! 5. every ancestor's `persistent_post_run`, nearest first
//!
//! A pre-run failure always stops execution. A run or post-run failure stops
//! the remaining post hooks unless `defer_post` is set somewhere on the path,
//! in which case every post hook runs and all failures are aggregated.
//!
//! # Examples
//!
//! ```
//! use cmdtree::{args, Command};
//!
//! let list = Command::new("list")
//!     .alias("ls")
//!     .usage("list items")
//!     .args(args::any())
//!     .run(|ctx| {
//!         for item in ctx.args() {
//!             println!("{item}");
//!         }
//!         Ok(())
//!     });
//!
//! let root = Command::new("items").subcommand(list);
//! assert_eq!(root.children().len(), 1);
//! assert_eq!(root.children()[0].aliases(), ["ls"]);
//! ```

use std::fmt;
use std::rc::Rc;

use cmdtree_core::{Flag, FlagSet};

use crate::args::ArgValidator;
use crate::context::Context;

/// A lifecycle hook or run body.
pub type Hook = Rc<dyn Fn(&Context) -> anyhow::Result<()>>;

/// One node of a command tree.
#[derive(Clone, Default)]
pub struct Command {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) usage: String,
    pub(crate) description: String,
    pub(crate) version: String,
    pub(crate) validator: Option<ArgValidator>,
    pub(crate) flags: FlagSet,
    pub(crate) persistent_flags: FlagSet,
    pub(crate) run: Option<Hook>,
    pub(crate) pre_run: Option<Hook>,
    pub(crate) post_run: Option<Hook>,
    pub(crate) persistent_pre_run: Option<Hook>,
    pub(crate) persistent_post_run: Option<Hook>,
    pub(crate) defer_post: bool,
    pub(crate) silence_help: bool,
    pub(crate) silence_error: bool,
    pub(crate) children: Vec<Command>,
}

impl Command {
    /// Creates a command.
    ///
    /// Anything after the first space is usage syntax shown by help
    /// renderers; only the first word is used for routing:
    /// `Command::new("create [-d destination] file...")` is invoked as
    /// `create`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The routing name: everything before the first space.
    pub fn name(&self) -> &str {
        self.name.split(' ').next().unwrap_or_default()
    }

    /// The full name including usage syntax.
    pub fn full_name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn children(&self) -> &[Command] {
        &self.children
    }

    /// Adds an alternative routing name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Short one-line explanation.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Longer description for help output.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Version reported by `--version` for this node and every descendant
    /// that does not set its own.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Positional argument validator. Defaults to [`args::none`](crate::args::none).
    pub fn args(mut self, validator: ArgValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Replaces the command's own flag set.
    pub fn flags(mut self, flags: FlagSet) -> Self {
        self.flags = flags;
        self
    }

    /// Adds one flag to the command's own flag set.
    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.add_flag(flag);
        self
    }

    /// Replaces the flag set inherited by every descendant.
    pub fn persistent_flags(mut self, flags: FlagSet) -> Self {
        self.persistent_flags = flags;
        self
    }

    /// Adds one flag inherited by every descendant.
    pub fn persistent_flag(mut self, flag: Flag) -> Self {
        self.persistent_flags.add_flag(flag);
        self
    }

    pub fn run<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context) -> anyhow::Result<()> + 'static,
    {
        self.run = Some(Rc::new(f));
        self
    }

    /// Runs immediately before `run`.
    pub fn pre_run<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context) -> anyhow::Result<()> + 'static,
    {
        self.pre_run = Some(Rc::new(f));
        self
    }

    /// Runs immediately after `run`.
    pub fn post_run<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context) -> anyhow::Result<()> + 'static,
    {
        self.post_run = Some(Rc::new(f));
        self
    }

    /// Runs before the `pre_run` of this command and of every descendant,
    /// in root-to-leaf order.
    pub fn persistent_pre_run<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context) -> anyhow::Result<()> + 'static,
    {
        self.persistent_pre_run = Some(Rc::new(f));
        self
    }

    /// Runs after the `post_run` of this command and of every descendant,
    /// in leaf-to-root order.
    pub fn persistent_post_run<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context) -> anyhow::Result<()> + 'static,
    {
        self.persistent_post_run = Some(Rc::new(f));
        self
    }

    /// Run post hooks even when `run` or an earlier post hook fails.
    /// Inherited by every descendant.
    pub fn defer_post(mut self, defer: bool) -> Self {
        self.defer_post = defer;
        self
    }

    /// Ask the embedding application not to print help on failure.
    /// Inherited by every descendant.
    pub fn silence_help(mut self, silence: bool) -> Self {
        self.silence_help = silence;
        self
    }

    /// Ask the embedding application not to print the error on failure.
    /// Inherited by every descendant.
    pub fn silence_error(mut self, silence: bool) -> Self {
        self.silence_error = silence;
        self
    }

    /// Attaches a child command.
    pub fn subcommand(mut self, child: Command) -> Self {
        self.children.push(child);
        self
    }

    /// Attaches several child commands.
    pub fn subcommands(mut self, children: impl IntoIterator<Item = Command>) -> Self {
        self.children.extend(children);
        self
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("flags", &self.flags)
            .field("persistent_flags", &self.persistent_flags)
            .field("has_run", &self.run.is_some())
            .field("defer_post", &self.defer_post)
            .field("children", &self.children)
            .finish()
    }
}
