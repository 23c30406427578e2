//! Argument lexing and typed flag resolution.
//!
//! This crate holds the leaf components of the cmdtree dispatcher:
//!
//! - [`Lexer`] / [`Token`]: classify raw arguments into long flags, short
//!   flags, bundled shorthands, and positionals.
//! - [`Flag`]: a typed value cell (string, bool, duration, integers of every
//!   width, floats, and a slice of each) with default, shorthand, and
//!   required marking.
//! - [`FlagSet`]: name- and shorthand-indexed registry of shared flags,
//!   mergeable, resolving unset values through a fallback [`Source`] chain.
//! - [`FlagGetter`]: typed read access that never hides a kind mismatch
//!   behind a default.
//!
//! # Example
//!
//! ```
//! use cmdtree_core::*;
//!
//! let flags = FlagSet::new()
//!     .with_flag(Flag::new("dry-run", false, "print actions only").short('d'))
//!     .with_flag(Flag::new("strings", vec!["a".to_string()], "some strings").short('s'));
//!
//! flags.from_short('s').unwrap().borrow_mut().set("x,y").unwrap();
//!
//! let getter = FlagGetter::new(flags);
//! assert!(!getter.bool("dry-run").unwrap());
//! assert_eq!(getter.string_slice("strings").unwrap(), vec!["x", "y"]);
//! assert!(getter.int("strings").is_err());
//! ```

mod error;
mod flag;
mod flagset;
mod lexer;
mod source;
mod value;

pub use error::{FlagError, Result};
pub use flag::{DEFAULT_SEPARATOR, Flag, FlagRef};
pub use flagset::{FlagGetter, FlagInfo, FlagSet};
pub use lexer::{Lexer, Token, TokenKind, looks_like_flag};
pub use source::{Env, Prefixed, Source, SourceRef};
pub use value::{
    FlagKind, FlagType, Scalar, ScalarType, ScalarValue, Value, format_duration, parse_duration,
};
