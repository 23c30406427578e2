//! Error types for tree construction and dispatch.

use std::fmt;

use cmdtree_core::FlagError;
use thiserror::Error;

use crate::args::ArgsError;

/// Errors raised while freezing a [`Command`](crate::Command) into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A command or alias name is empty or whitespace-only.
    #[error("command name cannot be empty (under {parent:?})")]
    EmptyName { parent: String },

    /// Two children of the same parent share a name or alias.
    #[error("duplicate subcommand {name:?} under {parent:?}")]
    DuplicateSubcommand { parent: String, name: String },
}

/// Lifecycle stage a user function belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    PersistentPreRun,
    PreRun,
    Run,
    PostRun,
    PersistentPostRun,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::PersistentPreRun => "persistent pre-run",
            Stage::PreRun => "pre-run",
            Stage::Run => "run",
            Stage::PostRun => "post-run",
            Stage::PersistentPostRun => "persistent post-run",
        })
    }
}

/// Dispatch failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Flag registration, parsing, or resolution failed.
    #[error(transparent)]
    Flag(#[from] FlagError),

    /// A command with children was invoked without naming one.
    #[error("{command}: must specify a subcommand")]
    NoSubcommand { command: String },

    /// The next argument names no child of this command.
    #[error("{command}: unknown subcommand {name:?}")]
    UnknownSubcommand { command: String, name: String },

    /// A flag token matched nothing in the working flag set.
    #[error("missing flag: {flag}")]
    UnknownFlag { flag: String },

    /// A flag appeared after a positional argument.
    #[error("invalid flag position: flags must come before args: {flag}")]
    FlagPosition { flag: String },

    /// A bundled shorthand token (`-abc`) could not be applied.
    #[error("invalid multi-flag: {flag}: {reason}")]
    MultiFlag { flag: String, reason: String },

    /// The terminal command has no run function.
    #[error("{command}: command has no run function")]
    NoRunner { command: String },

    /// The argument validator rejected the positionals.
    #[error("{command}: invalid args: {source}")]
    InvalidArgs {
        command: String,
        #[source]
        source: ArgsError,
    },

    /// A user hook or run body returned an error.
    #[error("{command}: {stage}: {source}")]
    Hook {
        command: String,
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },

    /// The run body panicked while post hooks were deferred.
    #[error("{command}: panic: {message}")]
    Panic { command: String, message: String },

    /// Several failures collected under deferred post hooks.
    #[error("{}", join_lines(.0))]
    Aggregate(Vec<Error>),
}

fn join_lines(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl Error {
    /// Combines collected errors: none yields `None`, one is returned as is,
    /// several become [`Error::Aggregate`].
    pub fn join(mut errors: Vec<Error>) -> Option<Error> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Error::Aggregate(errors)),
        }
    }

    /// Flattens aggregates into the individual failures, in order.
    pub fn errors(&self) -> Vec<&Error> {
        match self {
            Error::Aggregate(errors) => errors.iter().flat_map(Error::errors).collect(),
            other => vec![other],
        }
    }

    /// Lifecycle stage of a hook failure.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Hook { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// A failed [`execute`](crate::CommandTree::execute) call.
///
/// Carries the command path that was reached and the inherited silence
/// settings, so the embedding application can decide what to print and
/// which help page to show.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ExecuteError {
    #[source]
    pub error: Error,
    /// Routing names from the root to the last command reached.
    pub command_path: Vec<String>,
    pub silence_help: bool,
    pub silence_error: bool,
}

impl ExecuteError {
    pub fn into_inner(self) -> Error {
        self.error
    }
}

/// Convenience alias for dispatch results.
pub type Result<T> = std::result::Result<T, ExecuteError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn hook(stage: Stage, msg: &str) -> Error {
        Error::Hook {
            command: "cmd".to_string(),
            stage,
            source: anyhow::anyhow!(msg.to_string()),
        }
    }

    #[test]
    fn test_join_shapes() {
        assert!(Error::join(Vec::new()).is_none());

        let single = Error::join(vec![hook(Stage::Run, "boom")]).unwrap();
        assert!(matches!(single, Error::Hook { .. }));

        let many = Error::join(vec![hook(Stage::Run, "a"), hook(Stage::PostRun, "b")]).unwrap();
        assert_eq!(many.errors().len(), 2);
        assert_eq!(many.to_string(), "cmd: run: a\ncmd: post-run: b");
    }

    #[test]
    fn test_flag_error_is_transparent() {
        let err: Error = FlagError::MissingRequired {
            name: "token".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "missing required flag: --token");
    }
}
