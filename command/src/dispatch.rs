//! Argument dispatch.
//!
//! One call to [`CommandTree::execute`] walks these stages in order:
//!
//! - routing: consume leading arguments naming subcommands
//! - flag parsing: apply flag tokens to the terminal command's working set
//! - argument validation
//! - pre hooks, run, and post hooks
//!
//! `--help` and `--version` stop after flag parsing and are reported as an
//! [`Outcome`] instead of being printed.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use cmdtree_core::{FlagGetter, FlagSet, Lexer, Token, TokenKind, looks_like_flag};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::args;
use crate::command::Hook;
use crate::context::Context;
use crate::error::{Error, ExecuteError, Result, Stage};
use crate::summary::CommandSummary;
use crate::tree::{CommandTree, NodeId, ROOT};

/// How a successful [`CommandTree::execute`] call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The terminal command ran to completion.
    Ran,
    /// `--help` or `-h` was given; nothing ran.
    Help(CommandSummary),
    /// `--version` was given; nothing ran. `None` when no command on the
    /// path declares a version.
    Version(Option<String>),
}

/// Result of scanning the flag tokens.
#[derive(Debug)]
enum Parsed {
    Done(Vec<String>),
    Help,
    Version,
}

/// Hooks and inherited settings collected while routing.
struct Level<'t> {
    id: NodeId,
    persistent_flags: &'t FlagSet,
    pre_run: Option<&'t Hook>,
    post_run: Option<&'t Hook>,
}

/// Mutable state of one invocation.
struct Execution<'t> {
    args: Vec<String>,
    cursor: usize,
    levels: Vec<Level<'t>>,
    terminal: NodeId,
    defer_post: bool,
    silence_help: bool,
    silence_error: bool,
}

impl<'t> Execution<'t> {
    fn new(args: Vec<String>) -> Self {
        Self {
            args,
            cursor: 0,
            levels: Vec::new(),
            terminal: ROOT,
            defer_post: false,
            silence_help: false,
            silence_error: false,
        }
    }

    fn enter(&mut self, tree: &'t CommandTree, id: NodeId) {
        let command = tree.command(id);
        self.terminal = id;
        self.defer_post |= command.defer_post;
        self.silence_help |= command.silence_help;
        self.silence_error |= command.silence_error;
        self.levels.push(Level {
            id,
            persistent_flags: &command.persistent_flags,
            pre_run: command.persistent_pre_run.as_ref(),
            post_run: command.persistent_post_run.as_ref(),
        });
    }
}

impl CommandTree {
    /// Dispatches `args` (without the program name).
    pub fn execute<I, S>(&self, args: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.execute_with(args, CancellationToken::new())
    }

    /// Dispatches `args`, exposing `cancel` to hooks through
    /// [`Context::cancellation`].
    pub fn execute_with<I, S>(&self, args: I, cancel: CancellationToken) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = Execution::new(args.into_iter().map(Into::into).collect());
        debug!(args = ?state.args, "Dispatching");

        self.dispatch(&mut state, cancel).map_err(|error| {
            debug!(error = %error, "Dispatch failed");
            ExecuteError {
                error,
                command_path: self.path(state.terminal),
                silence_help: state.silence_help,
                silence_error: state.silence_error,
            }
        })
    }

    /// Dispatches the process arguments, skipping the program name.
    pub fn execute_env(&self) -> Result<Outcome> {
        self.execute(std::env::args().skip(1))
    }

    fn dispatch<'t>(
        &'t self,
        state: &mut Execution<'t>,
        cancel: CancellationToken,
    ) -> std::result::Result<Outcome, Error> {
        let id = self.route(state)?;

        let mut working = FlagSet::new();
        for level in &state.levels {
            working.merge(level.persistent_flags);
        }
        working.merge(&self.command(id).flags);
        // Cells are owned by the tree; clear what an earlier dispatch stored.
        working.reset();
        trace!(command = %self.display_path(id), flags = ?working, "Working flag set");

        let positionals = match parse_flags(&state.args[state.cursor..], &working)? {
            Parsed::Done(positionals) => positionals,
            Parsed::Help => return Ok(Outcome::Help(self.summary(id))),
            Parsed::Version => return Ok(Outcome::Version(self.version(id).map(str::to_string))),
        };

        let validator = self.command(id).validator.clone().unwrap_or_else(args::none);
        validator(positionals.as_slice()).map_err(|source| Error::InvalidArgs {
            command: self.display_path(id),
            source,
        })?;

        let ctx = Context {
            args: positionals,
            flags: FlagGetter::new(working),
            path: self.path(id),
            cancel,
        };
        self.run_lifecycle(state, id, &ctx)
    }

    /// Follows subcommand names from the root and returns the terminal node.
    fn route<'t>(&'t self, state: &mut Execution<'t>) -> std::result::Result<NodeId, Error> {
        let mut id = ROOT;
        loop {
            state.enter(self, id);
            let node = self.node(id);
            if node.children.is_empty() {
                return Ok(id);
            }

            let Some(next) = state.args.get(state.cursor) else {
                return Err(Error::NoSubcommand {
                    command: self.display_path(id),
                });
            };

            if let Some(&child) = node.children.get(next) {
                trace!(from = %self.display_path(id), to = %next, "Routing");
                state.cursor += 1;
                id = child;
                continue;
            }

            if looks_like_flag(next) {
                // Flags for a command that also has children.
                return Ok(id);
            }

            return Err(Error::UnknownSubcommand {
                command: self.display_path(id),
                name: next.clone(),
            });
        }
    }

    fn run_lifecycle(
        &self,
        state: &Execution<'_>,
        id: NodeId,
        ctx: &Context,
    ) -> std::result::Result<Outcome, Error> {
        let command = self.command(id);
        let name = self.display_path(id);
        let Some(run) = command.run.as_ref() else {
            return Err(Error::NoRunner { command: name });
        };

        for level in &state.levels {
            level.persistent_flags.ensure_required()?;
            if let Some(hook) = level.pre_run {
                debug!(command = %self.display_path(level.id), "Persistent pre-run");
                call(hook, ctx, self.display_path(level.id), Stage::PersistentPreRun)?;
            }
        }

        command.flags.ensure_required()?;
        if let Some(hook) = command.pre_run.as_ref() {
            debug!(command = %name, "Pre-run");
            call(hook, ctx, name.clone(), Stage::PreRun)?;
        }

        let mut errors = Vec::new();
        debug!(command = %name, defer_post = state.defer_post, "Run");
        match panic::catch_unwind(AssertUnwindSafe(|| run(ctx))) {
            Ok(Ok(())) => {}
            Ok(Err(source)) => {
                let err = Error::Hook {
                    command: name.clone(),
                    stage: Stage::Run,
                    source,
                };
                if !state.defer_post {
                    return Err(err);
                }
                errors.push(err);
            }
            Err(payload) => {
                if !state.defer_post {
                    panic::resume_unwind(payload);
                }
                let message = panic_message(&*payload);
                warn!(
                    command = %name,
                    message = %message,
                    "Run panicked; running deferred post hooks"
                );
                errors.push(Error::Panic {
                    command: name.clone(),
                    message,
                });
            }
        }

        let post_hooks = command
            .post_run
            .iter()
            .map(|hook| (id, Stage::PostRun, hook))
            .chain(state.levels.iter().rev().filter_map(|level| {
                level
                    .post_run
                    .map(|hook| (level.id, Stage::PersistentPostRun, hook))
            }));

        for (owner, stage, hook) in post_hooks {
            debug!(command = %self.display_path(owner), stage = %stage, "Post hook");
            if let Err(err) = call(hook, ctx, self.display_path(owner), stage) {
                errors.push(err);
                if !state.defer_post {
                    break;
                }
            }
        }

        match Error::join(errors) {
            None => Ok(Outcome::Ran),
            Some(err) => Err(err),
        }
    }
}

fn call(
    hook: &Hook,
    ctx: &Context,
    command: String,
    stage: Stage,
) -> std::result::Result<(), Error> {
    hook(ctx).map_err(|source| Error::Hook {
        command,
        stage,
        source,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Applies flag tokens to `working` and collects the positionals.
///
/// Flags must precede positionals. A non-boolean flag without an inline
/// value takes the next argument when that argument is not itself a flag;
/// otherwise the flag is left unset.
fn parse_flags(args: &[String], working: &FlagSet) -> std::result::Result<Parsed, Error> {
    let mut lexer = Lexer::new(args);
    let mut positionals = Vec::new();

    while let Some(token) = lexer.read() {
        if token.kind == TokenKind::Positional {
            positionals.push(token.raw);
            continue;
        }
        if !positionals.is_empty() {
            return Err(Error::FlagPosition {
                flag: token.display_name(),
            });
        }

        match token.kind {
            TokenKind::MultiFlag => {
                if let Some(parsed) = apply_bundle(&token, working)? {
                    return Ok(parsed);
                }
            }
            TokenKind::ShortFlag if token.name == "h" => return Ok(Parsed::Help),
            TokenKind::LongFlag if token.name == "help" => return Ok(Parsed::Help),
            TokenKind::LongFlag if token.name == "version" => return Ok(Parsed::Version),
            _ => apply_flag(token, &mut lexer, working)?,
        }
    }

    Ok(Parsed::Done(positionals))
}

fn apply_bundle(
    token: &Token,
    working: &FlagSet,
) -> std::result::Result<Option<Parsed>, Error> {
    if token.value.is_some() {
        return Err(Error::MultiFlag {
            flag: token.display_name(),
            reason: "cannot assign a value to bundled flags".to_string(),
        });
    }

    for c in token.name.chars() {
        if c == 'h' {
            return Ok(Some(Parsed::Help));
        }
        let flag = working.from_short(c).ok_or_else(|| Error::MultiFlag {
            flag: format!("-{c}"),
            reason: "no such flag".to_string(),
        })?;
        if !flag.borrow().kind().is_bool() {
            return Err(Error::MultiFlag {
                flag: format!("-{c}"),
                reason: "only boolean flags can be bundled".to_string(),
            });
        }
        flag.borrow_mut().set("true")?;
        trace!(flag = %c, "Set bundled flag");
    }
    Ok(None)
}

fn apply_flag(
    token: Token,
    lexer: &mut Lexer<'_>,
    working: &FlagSet,
) -> std::result::Result<(), Error> {
    let flag_name = token.display_name();
    let flag = match token.kind {
        TokenKind::ShortFlag => token.name.chars().next().and_then(|c| working.from_short(c)),
        _ => working.from_name(&token.name),
    }
    .ok_or_else(|| Error::UnknownFlag {
        flag: flag_name.clone(),
    })?;

    let is_bool = flag.borrow().kind().is_bool();
    let raw = match token.value {
        Some(value) => Some(value),
        None if is_bool => Some("true".to_string()),
        None => match lexer.peek() {
            Some(next) if next.kind == TokenKind::Positional => lexer.read().map(|t| t.raw),
            _ => None,
        },
    };

    match raw {
        Some(raw) => {
            flag.borrow_mut().set(&raw)?;
            trace!(flag = %flag_name, value = %raw, "Set flag");
        }
        None => debug!(flag = %flag_name, "Flag given without a value; left unset"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use cmdtree_core::Flag;

    use super::*;

    fn strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn working() -> FlagSet {
        FlagSet::new()
            .with_flag(Flag::new("all", false, "").short('a'))
            .with_flag(Flag::new("brief", false, "").short('b'))
            .with_flag(Flag::new("count", 0i64, "").short('c'))
            .with_flag(Flag::new("name", String::new(), ""))
    }

    fn positionals(parsed: Parsed) -> Vec<String> {
        match parsed {
            Parsed::Done(positionals) => positionals,
            Parsed::Help => panic!("unexpected help"),
            Parsed::Version => panic!("unexpected version"),
        }
    }

    #[test]
    fn test_flags_then_positionals() {
        let set = working();
        let parsed = parse_flags(&strings(&["-c", "3", "--name=x", "one", "two"]), &set).unwrap();
        assert_eq!(positionals(parsed), vec!["one", "two"]);
        assert_eq!(set.lookup::<i64>("count").unwrap(), 3);
        assert_eq!(set.lookup::<String>("name").unwrap(), "x");
    }

    #[test]
    fn test_bundled_booleans() {
        let set = working();
        parse_flags(&strings(&["-ab"]), &set).unwrap();
        assert!(set.lookup::<bool>("all").unwrap());
        assert!(set.lookup::<bool>("brief").unwrap());
    }

    #[test]
    fn test_bundle_rejects_non_bool() {
        let set = working();
        let err = parse_flags(&strings(&["-ac"]), &set).unwrap_err();
        assert!(matches!(err, Error::MultiFlag { ref flag, .. } if flag == "-c"));
    }

    #[test]
    fn test_bundle_rejects_inline_value() {
        let set = working();
        let err = parse_flags(&strings(&["-ab=1"]), &set).unwrap_err();
        assert!(matches!(err, Error::MultiFlag { .. }));
    }

    #[test]
    fn test_help_in_bundle() {
        let set = working();
        assert!(matches!(parse_flags(&strings(&["-ah"]), &set).unwrap(), Parsed::Help));
        assert!(matches!(parse_flags(&strings(&["--help"]), &set).unwrap(), Parsed::Help));
        assert!(matches!(
            parse_flags(&strings(&["--version"]), &set).unwrap(),
            Parsed::Version
        ));
    }

    #[test]
    fn test_value_flag_does_not_swallow_flags() {
        let set = working();
        parse_flags(&strings(&["--name", "--all"]), &set).unwrap();
        assert!(!set.from_name("name").unwrap().borrow().is_set());
        assert!(set.lookup::<bool>("all").unwrap());
    }

    #[test]
    fn test_lone_dash_is_a_value() {
        let set = working();
        let parsed = parse_flags(&strings(&["--name", "-"]), &set).unwrap();
        assert!(positionals(parsed).is_empty());
        assert_eq!(set.lookup::<String>("name").unwrap(), "-");
    }

    #[test]
    fn test_flag_after_positional() {
        let set = working();
        let err = parse_flags(&strings(&["-c", "1", "pos", "--all"]), &set).unwrap_err();
        assert!(matches!(err, Error::FlagPosition { ref flag } if flag == "--all"));
    }

    #[test]
    fn test_unknown_flag() {
        let set = working();
        let err = parse_flags(&strings(&["--nope"]), &set).unwrap_err();
        assert_eq!(err.to_string(), "missing flag: --nope");
    }

    #[test]
    fn test_bad_value_keeps_flag_unset() {
        let set = working();
        let err = parse_flags(&strings(&["--count=abc"]), &set).unwrap_err();
        assert!(matches!(err, Error::Flag(_)));
        assert!(!set.from_name("count").unwrap().borrow().is_set());
    }

    #[test]
    fn test_panic_message_payloads() {
        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(&*boxed), "static");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*boxed), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(&*boxed), "unknown panic payload");
    }
}
