//! Flag registries and layered value resolution.
//!
//! A [`FlagSet`] indexes shared flag cells by name and by shorthand. Merging
//! one set into another copies the handles, not the flags, so a value parsed
//! through a merged working set is visible through the set that declared the
//! flag.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use cmdtree_core::{Flag, FlagSet, FlagError};
//!
//! let mut defaults = HashMap::new();
//! defaults.insert("sep".to_string(), "*".to_string());
//!
//! let flags = FlagSet::new()
//!     .with_source(defaults)
//!     .with_flag(Flag::new("num", 10isize, "how many times"))
//!     .with_flag(Flag::new("sep", String::new(), "separator"));
//!
//! assert_eq!(flags.lookup::<isize>("num").unwrap(), 10);
//! assert_eq!(flags.lookup::<String>("sep").unwrap(), "*");
//! assert!(matches!(
//!     flags.lookup::<bool>("num"),
//!     Err(FlagError::InvalidType { .. })
//! ));
//! ```

use std::cell::Ref;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tracing::debug;

use crate::error::{FlagError, Result};
use crate::flag::{Flag, FlagRef};
use crate::source::{Source, SourceRef};
use crate::value::{FlagKind, FlagType, Value};

/// Name- and shorthand-indexed collection of shared flags.
#[derive(Default, Clone)]
pub struct FlagSet {
    flags: BTreeMap<String, FlagRef>,
    short_flags: HashMap<char, FlagRef>,
    sources: Vec<SourceRef>,
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSet")
            .field("flags", &self.flags.keys().collect::<Vec<_>>())
            .field("short_flags", &self.short_flags.keys().collect::<Vec<_>>())
            .field("sources", &self.sources.len())
            .finish()
    }
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fallback source for every flag added afterwards.
    pub fn with_source(mut self, source: impl Source + 'static) -> Self {
        self.add_source(Rc::new(source));
        self
    }

    /// Adds a flag, builder style.
    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.add_flag(flag);
        self
    }

    /// Registers a fallback source for every flag added afterwards.
    pub fn add_source(&mut self, source: SourceRef) -> &mut Self {
        self.sources.push(source);
        self
    }

    /// Adds a flag and returns its shared handle.
    ///
    /// The set's sources are appended after the flag's own. A name or
    /// shorthand collision replaces the previous entry.
    pub fn add_flag(&mut self, flag: Flag) -> FlagRef {
        let flag = flag.into_ref();
        flag.borrow_mut().add_sources(self.sources.iter().cloned());
        self.insert(Rc::clone(&flag));
        flag
    }

    fn insert(&mut self, flag: FlagRef) {
        let (name, short) = {
            let f = flag.borrow();
            (f.name().to_string(), f.short_name())
        };
        if let Some(short) = short {
            self.short_flags.insert(short, Rc::clone(&flag));
        }
        self.flags.insert(name, flag);
    }

    /// Copies every flag handle from `other` into this set. On collision the
    /// incoming flag wins.
    pub fn merge(&mut self, other: &FlagSet) -> &mut Self {
        for flag in other.flags.values() {
            self.insert(Rc::clone(flag));
        }
        for (short, flag) in &other.short_flags {
            self.short_flags.insert(*short, Rc::clone(flag));
        }
        self
    }

    pub fn from_name(&self, name: &str) -> Option<FlagRef> {
        self.flags.get(name).cloned()
    }

    pub fn from_short(&self, short: char) -> Option<FlagRef> {
        self.short_flags.get(&short).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Flags in name order.
    pub fn flags(&self) -> impl Iterator<Item = &FlagRef> {
        self.flags.values()
    }

    /// Marks a registered flag as required.
    pub fn mark_required(&self, name: &str) -> Result<()> {
        let flag = self.flags.get(name).ok_or_else(|| FlagError::Unregistered {
            name: name.to_string(),
        })?;
        flag.borrow_mut().mark_required();
        Ok(())
    }

    /// Resolves a flag for reading.
    ///
    /// Fails if the flag is absent or of a different kind. An unset flag
    /// walks its fallback sources once; the first value found is parsed and
    /// memoized. A required flag that is still unset fails.
    pub fn resolve(&self, name: &str, expected: FlagKind) -> Result<Ref<'_, Flag>> {
        let cell = self.flags.get(name).ok_or_else(|| FlagError::Unregistered {
            name: name.to_string(),
        })?;

        let actual = cell.borrow().kind();
        if actual != expected {
            return Err(FlagError::InvalidType {
                name: name.to_string(),
                expected,
                actual,
            });
        }

        {
            let mut flag = cell.borrow_mut();
            if !flag.is_set() {
                flag.set_from_sources()?;
            }
            if !flag.is_set() && flag.is_required() {
                return Err(FlagError::MissingRequired {
                    name: name.to_string(),
                });
            }
        }

        Ok(cell.borrow())
    }

    /// Typed lookup through [`resolve`](Self::resolve).
    pub fn lookup<T: FlagType>(&self, name: &str) -> Result<T> {
        let flag = self.resolve(name, T::KIND)?;
        T::from_value(flag.value()).ok_or_else(|| FlagError::InvalidType {
            name: name.to_string(),
            expected: T::KIND,
            actual: flag.kind(),
        })
    }

    /// Last-chance resolution of required flags: every required flag that
    /// is still unset walks its sources, and fails if none supplies a value.
    pub fn ensure_required(&self) -> Result<()> {
        for flag in self.flags.values() {
            let mut flag = flag.borrow_mut();
            if !flag.is_required() || flag.is_set() {
                continue;
            }
            flag.set_from_sources()?;
            if !flag.is_set() {
                debug!(flag = %flag.name(), "Required flag unresolved");
                return Err(FlagError::MissingRequired {
                    name: flag.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns every flag to its default. Sources are consulted again on
    /// the next lookup.
    pub fn reset(&self) {
        for flag in self.flags.values() {
            flag.borrow_mut().reset();
        }
    }

    /// Describes every flag for help renderers, in name order.
    pub fn describe(&self) -> Vec<FlagInfo> {
        self.flags
            .values()
            .map(|flag| FlagInfo::from(&*flag.borrow()))
            .collect()
    }
}

/// Serializable description of a flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagInfo {
    pub name: String,
    pub short: Option<char>,
    pub kind: FlagKind,
    pub usage: String,
    /// Default rendered as text (`[a,b]` for slices).
    pub default: String,
    pub required: bool,
}

impl From<&Flag> for FlagInfo {
    fn from(flag: &Flag) -> Self {
        Self {
            name: flag.name().to_string(),
            short: flag.short_name(),
            kind: flag.kind(),
            usage: flag.usage().to_string(),
            default: flag.default_value().to_string(),
            required: flag.is_required(),
        }
    }
}

/// Read-only typed access to a resolved flag set.
///
/// Every accessor returns a [`Result`]: a lookup with the wrong kind is
/// always [`FlagError::InvalidType`], never a zero value.
#[derive(Debug, Clone, Default)]
pub struct FlagGetter {
    set: FlagSet,
}

macro_rules! typed_accessors {
    ($($method:ident => $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Looks up a `", stringify!($ty), "` flag.")]
            pub fn $method(&self, name: &str) -> Result<$ty> {
                self.get::<$ty>(name)
            }
        )*
    };
}

impl FlagGetter {
    pub fn new(set: FlagSet) -> Self {
        Self { set }
    }

    /// Generic typed lookup.
    pub fn get<T: FlagType>(&self, name: &str) -> Result<T> {
        self.set.lookup(name)
    }

    /// Raw flag cell, e.g. to check whether a value came from the user.
    pub fn flag(&self, name: &str) -> Option<FlagRef> {
        self.set.from_name(name)
    }

    /// Current value of a flag without source resolution.
    pub fn raw_value(&self, name: &str) -> Option<Value> {
        self.set.from_name(name).map(|f| f.borrow().value().clone())
    }

    pub fn flag_set(&self) -> &FlagSet {
        &self.set
    }

    typed_accessors! {
        string => String,
        bool => bool,
        duration => std::time::Duration,
        int => isize,
        int8 => i8,
        int16 => i16,
        int32 => i32,
        int64 => i64,
        uint => usize,
        uint8 => u8,
        uint16 => u16,
        uint32 => u32,
        uint64 => u64,
        float32 => f32,
        float64 => f64,
        string_slice => Vec<String>,
        bool_slice => Vec<bool>,
        duration_slice => Vec<std::time::Duration>,
        int_slice => Vec<isize>,
        int8_slice => Vec<i8>,
        int16_slice => Vec<i16>,
        int32_slice => Vec<i32>,
        int64_slice => Vec<i64>,
        uint_slice => Vec<usize>,
        uint8_slice => Vec<u8>,
        uint16_slice => Vec<u16>,
        uint32_slice => Vec<u32>,
        uint64_slice => Vec<u64>,
        float32_slice => Vec<f32>,
        float64_slice => Vec<f64>,
    }
}
