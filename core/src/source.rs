//! Fallback value sources.
//!
//! A [`Source`] answers "given a flag name, is there a value for it?". Sources
//! are consulted in registration order when a flag was not set on the command
//! line; the first one that reports a value wins.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use cmdtree_core::{Env, Prefixed, Source};
//!
//! let mut config = HashMap::new();
//! config.insert("server.port".to_string(), "8080".to_string());
//!
//! let server = Prefixed::new(config, "server.");
//! assert_eq!(server.lookup("port").as_deref(), Some("8080"));
//!
//! let env = Env::with_prefix("myapp");
//! assert_eq!(env.key("db-host"), "MYAPP_DB_HOST");
//! ```

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use heck::ToShoutySnakeCase;
use tracing::warn;

/// A name → value lookup consulted for flags missing from the command line.
pub trait Source {
    /// Returns the raw value for `name`, or `None` if this source has none.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Shared handle to a source; one source is usually attached to many flags.
pub type SourceRef = Rc<dyn Source>;

impl<F> Source for F
where
    F: Fn(&str) -> Option<String>,
{
    fn lookup(&self, name: &str) -> Option<String> {
        self(name)
    }
}

impl Source for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl Source for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Process environment source.
///
/// The flag name, optionally prefixed, is converted to SCREAMING_SNAKE_CASE:
/// `db-host` becomes `DB_HOST`, or `APP_DB_HOST` with prefix `app`.
#[derive(Debug, Clone, Default)]
pub struct Env {
    prefix: Option<String>,
}

impl Env {
    /// Environment source without a prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment source whose keys are prefixed with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Environment variable name consulted for `name`.
    pub fn key(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}_{name}").to_shouty_snake_case(),
            None => name.to_shouty_snake_case(),
        }
    }
}

impl Source for Env {
    fn lookup(&self, name: &str) -> Option<String> {
        let key = self.key(name);
        match std::env::var_os(&key)?.into_string() {
            Ok(value) => Some(value),
            Err(raw) => {
                warn!(key = %key, value = ?raw, "Ignoring environment value that is not UTF-8");
                None
            }
        }
    }
}

/// Namespaces another source: lookups for `name` query `prefix + name`.
#[derive(Debug, Clone)]
pub struct Prefixed<S> {
    inner: S,
    prefix: String,
}

impl<S: Source> Prefixed<S> {
    pub fn new(inner: S, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }
}

impl<S: Source> Source for Prefixed<S> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.inner.lookup(&format!("{}{name}", self.prefix))
    }
}
