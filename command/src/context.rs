//! Per-invocation state handed to hooks.

use cmdtree_core::FlagGetter;
use tokio_util::sync::CancellationToken;

/// What a hook or run body can see of the current invocation.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub(crate) args: Vec<String>,
    pub(crate) flags: FlagGetter,
    pub(crate) path: Vec<String>,
    pub(crate) cancel: CancellationToken,
}

impl Context {
    /// Positional arguments that passed validation.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Typed access to the terminal command's flags, including every
    /// inherited persistent flag.
    pub fn flags(&self) -> &FlagGetter {
        &self.flags
    }

    /// Routing names from the root to the terminal command.
    pub fn command_path(&self) -> &[String] {
        &self.path
    }

    /// The terminal command's routing name.
    pub fn command_name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Cancellation token supplied by the caller of
    /// [`CommandTree::execute_with`](crate::CommandTree::execute_with).
    ///
    /// The dispatcher never checks it; long-running bodies may.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
