//! Typed flag cells.
//!
//! A [`Flag`] is a named, optionally shorthanded option with a fixed
//! [`FlagKind`], a default, and a parsed value once set. Flags are built with
//! consuming builder methods and then handed to a
//! [`FlagSet`](crate::FlagSet), which shares them between indices.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use cmdtree_core::Flag;
//!
//! let mut timeout = Flag::new("timeout", Duration::from_secs(30), "request timeout")
//!     .short('t');
//! assert_eq!(timeout.get::<Duration>(), Some(Duration::from_secs(30)));
//!
//! timeout.set("1m30s").unwrap();
//! assert!(timeout.is_set());
//! assert_eq!(timeout.get::<Duration>(), Some(Duration::from_secs(90)));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::error::{FlagError, Result};
use crate::source::{Source, SourceRef};
use crate::value::{FlagKind, FlagType, Value};

/// Default separator for slice flags.
pub const DEFAULT_SEPARATOR: &str = ",";

/// Shared, mutable handle to a flag. The same cell is indexed by name and by
/// shorthand, and survives merging into other flag sets.
pub type FlagRef = Rc<RefCell<Flag>>;

/// A typed command-line option.
pub struct Flag {
    name: String,
    short: Option<char>,
    usage: String,
    kind: FlagKind,
    default: Value,
    value: Option<Value>,
    required: bool,
    separator: String,
    sources: Vec<SourceRef>,
}

impl Flag {
    /// Creates a flag whose kind is inferred from the default's type.
    ///
    /// Any [`FlagType`] works: `String`, `bool`, `Duration`, the integer and
    /// float primitives, and `Vec` of any of them.
    pub fn new<T: FlagType>(name: impl Into<String>, default: T, usage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short: None,
            usage: usage.into(),
            kind: T::KIND,
            default: default.into_value(),
            value: None,
            required: false,
            separator: DEFAULT_SEPARATOR.to_string(),
            sources: Vec::new(),
        }
    }

    /// Sets the single-character shorthand (`-c`).
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Marks the flag as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the separator used to split slice values.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Appends a fallback source for this flag only.
    pub fn source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Rc::new(source));
        self
    }

    /// Wraps the flag in a shared cell.
    pub fn into_ref(self) -> FlagRef {
        Rc::new(RefCell::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shorthand character, if any.
    pub fn short_name(&self) -> Option<char> {
        self.short
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn kind(&self) -> FlagKind {
        self.kind
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Marks an already-built flag as required.
    pub fn mark_required(&mut self) {
        self.required = true;
    }

    pub fn sources(&self) -> &[SourceRef] {
        &self.sources
    }

    /// Appends fallback sources after the ones already attached.
    pub fn add_sources(&mut self, sources: impl IntoIterator<Item = SourceRef>) {
        self.sources.extend(sources);
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// The set value, or the default if never set.
    pub fn value(&self) -> &Value {
        self.value.as_ref().unwrap_or(&self.default)
    }

    /// Typed view of [`value`](Self::value); `None` if `T` is the wrong kind.
    pub fn get<T: FlagType>(&self) -> Option<T> {
        T::from_value(self.value())
    }

    /// Parses `raw` and stores it, marking the flag as set.
    ///
    /// On failure the previous value and set state are kept.
    pub fn set(&mut self, raw: &str) -> Result<()> {
        let value = self
            .kind
            .parse(raw, &self.separator)
            .map_err(|reason| FlagError::Parse {
                name: self.name.clone(),
                kind: self.kind,
                raw: raw.to_string(),
                reason,
            })?;
        trace!(flag = %self.name, value = %value, "Flag set");
        self.value = Some(value);
        Ok(())
    }

    /// Forgets any value from the command line or a source, returning the
    /// flag to its default.
    pub fn reset(&mut self) {
        self.value = None;
    }

    /// Walks the fallback sources in order and sets the flag from the first
    /// one that has a value. Later sources are not consulted.
    ///
    /// Returns `Ok(true)` if a source supplied the value.
    pub fn set_from_sources(&mut self) -> Result<bool> {
        let found = self
            .sources
            .iter()
            .enumerate()
            .find_map(|(index, source)| source.lookup(&self.name).map(|raw| (index, raw)));

        match found {
            Some((index, raw)) => {
                trace!(flag = %self.name, source = index, "Resolved flag from fallback source");
                self.set(&raw)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("short", &self.short)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("value", &self.value)
            .field("required", &self.required)
            .field("sources", &self.sources.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_default_until_set() {
        let mut flag = Flag::new("num", 10isize, "a number");
        assert!(!flag.is_set());
        assert_eq!(flag.get::<isize>(), Some(10));

        flag.set("42").unwrap();
        assert!(flag.is_set());
        assert_eq!(flag.get::<isize>(), Some(42));
    }

    #[test]
    fn test_set_overwrites() {
        let mut flag = Flag::new("name", String::new(), "");
        flag.set("a").unwrap();
        flag.set("b").unwrap();
        assert_eq!(flag.get::<String>().as_deref(), Some("b"));
    }

    #[test]
    fn test_failed_set_keeps_previous_value() {
        let mut flag = Flag::new("ports", vec![80u16], "");
        flag.set("8080,8081").unwrap();
        assert!(flag.set("9090,http").is_err());
        assert_eq!(flag.get::<Vec<u16>>(), Some(vec![8080, 8081]));

        let mut fresh = Flag::new("ports", vec![80u16], "");
        let err = fresh.set("1,x").unwrap_err();
        assert!(matches!(err, FlagError::Parse { .. }));
        assert!(!fresh.is_set());
        assert_eq!(fresh.get::<Vec<u16>>(), Some(vec![80]));
    }

    #[test]
    fn test_bool_bare_and_explicit_match() {
        let mut bare = Flag::new("verbose", false, "");
        let mut explicit = Flag::new("verbose", false, "");
        bare.set("").unwrap();
        explicit.set("true").unwrap();
        assert_eq!(bare.value(), explicit.value());
    }

    #[test]
    fn test_custom_separator() {
        let mut flag = Flag::new("tags", Vec::<String>::new(), "").separator(";");
        flag.set("a,b;c").unwrap();
        assert_eq!(
            flag.get::<Vec<String>>(),
            Some(vec!["a,b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_first_source_wins() {
        let mut first = HashMap::new();
        first.insert("level".to_string(), "3".to_string());
        let mut second = HashMap::new();
        second.insert("level".to_string(), "7".to_string());

        let mut flag = Flag::new("level", 0u8, "").source(first).source(second);
        assert!(flag.set_from_sources().unwrap());
        assert_eq!(flag.get::<u8>(), Some(3));
    }

    #[test]
    fn test_source_parse_failure_propagates() {
        let source = |_: &str| Some("not-a-number".to_string());
        let mut flag = Flag::new("level", 0u8, "").source(source);
        assert!(matches!(
            flag.set_from_sources(),
            Err(FlagError::Parse { .. })
        ));
        assert!(!flag.is_set());
    }

    #[test]
    fn test_reset_returns_to_default() {
        let mut flag = Flag::new("level", 2u8, "");
        flag.set("9").unwrap();
        flag.reset();
        assert!(!flag.is_set());
        assert_eq!(flag.get::<u8>(), Some(2));
    }

    #[test]
    fn test_wrong_type_get_is_none() {
        let flag = Flag::new("num", 10isize, "");
        assert_eq!(flag.get::<i64>(), None);
        assert_eq!(flag.get::<String>(), None);
    }
}
