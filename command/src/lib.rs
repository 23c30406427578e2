//! Command-tree dispatcher.
//!
//! Build a hierarchy of [`Command`]s, freeze it into a [`CommandTree`], and
//! hand it the process arguments. Dispatch routes through subcommand names,
//! parses flags against the terminal command's own flags plus every
//! persistent flag inherited from its ancestors, validates positionals, and
//! runs the lifecycle hooks in order.
//!
//! Flag types, the argument lexer, and fallback sources live in
//! [`cmdtree_core`] and are re-exported here.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use cmdtree::{args, Command, CommandTree, Flag, Outcome};
//!
//! let product = Rc::new(Cell::new(0));
//! let out = Rc::clone(&product);
//!
//! let mult = Command::new("mult")
//!     .usage("multiply two integers")
//!     .args(args::exact(2))
//!     .flag(Flag::new("scale", 1i64, "multiply the result again").short('s'))
//!     .run(move |ctx| {
//!         let a: i64 = ctx.args()[0].parse()?;
//!         let b: i64 = ctx.args()[1].parse()?;
//!         out.set(a * b * ctx.flags().int64("scale")?);
//!         Ok(())
//!     });
//!
//! let tree = CommandTree::new(
//!     Command::new("calc").subcommand(Command::new("math").subcommand(mult)),
//! )
//! .unwrap();
//!
//! assert_eq!(tree.execute(["math", "mult", "-s", "2", "3", "4"]).unwrap(), Outcome::Ran);
//! assert_eq!(product.get(), 24);
//!
//! let err = tree.execute(["math", "mult", "3"]).unwrap_err();
//! assert_eq!(err.command_path, vec!["calc", "math", "mult"]);
//! ```

pub mod args;
mod command;
mod context;
mod dispatch;
mod error;
mod summary;
mod tree;

pub use args::{ArgValidator, ArgsError};
pub use command::{Command, Hook};
pub use context::Context;
pub use dispatch::Outcome;
pub use error::{Error, ExecuteError, Result, Stage, TreeError};
pub use summary::{CommandSummary, SubcommandSummary};
pub use tree::{CommandTree, NodeId, ROOT};

pub use cmdtree_core::{
    Env, Flag, FlagError, FlagGetter, FlagInfo, FlagKind, FlagSet, FlagType, Prefixed, Source,
    Value,
};
pub use tokio_util::sync::CancellationToken;
