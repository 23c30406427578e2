//! Error types for flag registration and resolution.

use thiserror::Error;

use crate::FlagKind;

/// Errors raised while registering, setting, or looking up flags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// No flag with this name exists in the set.
    #[error("flag not defined: --{name}")]
    Unregistered { name: String },

    /// The flag exists but was requested as a different kind.
    #[error("invalid flag type for --{name}: expected {expected}, found {actual}")]
    InvalidType {
        name: String,
        expected: FlagKind,
        actual: FlagKind,
    },

    /// A required flag was not set on the command line or by any source.
    #[error("missing required flag: --{name}")]
    MissingRequired { name: String },

    /// The raw value could not be parsed as the flag's kind.
    #[error("invalid value {raw:?} for --{name} ({kind}): {reason}")]
    Parse {
        name: String,
        kind: FlagKind,
        raw: String,
        reason: String,
    },
}

/// Convenience alias for results with [`FlagError`].
pub type Result<T> = std::result::Result<T, FlagError>;
