//! Flag kinds, values, and the parse/format dispatch table.
//!
//! Every flag stores a [`Value`] tagged by a [`FlagKind`]. The closed set of
//! scalar kinds is [`Scalar`]; each scalar also has a homogeneous slice
//! variant. The [`FlagType`] trait binds a Rust type to its kind so typed
//! accessors can convert values without per-width boilerplate.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Scalar value kinds a flag can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    String,
    Bool,
    Duration,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

impl Scalar {
    /// Lowercase kind name used in messages and summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            Scalar::String => "string",
            Scalar::Bool => "bool",
            Scalar::Duration => "duration",
            Scalar::Int => "int",
            Scalar::Int8 => "int8",
            Scalar::Int16 => "int16",
            Scalar::Int32 => "int32",
            Scalar::Int64 => "int64",
            Scalar::Uint => "uint",
            Scalar::Uint8 => "uint8",
            Scalar::Uint16 => "uint16",
            Scalar::Uint32 => "uint32",
            Scalar::Uint64 => "uint64",
            Scalar::Float32 => "float32",
            Scalar::Float64 => "float64",
        }
    }

    /// Parses one raw string into a value of this kind.
    ///
    /// Returns a human-readable reason on failure; callers attach the flag
    /// name and raw input.
    pub fn parse(self, raw: &str) -> Result<ScalarValue, String> {
        let value = match self {
            Scalar::String => ScalarValue::String(raw.to_string()),
            Scalar::Bool => ScalarValue::Bool(parse_bool(raw)?),
            Scalar::Duration => ScalarValue::Duration(parse_duration(raw)?),
            Scalar::Int => ScalarValue::Int(parse_signed(raw)?),
            Scalar::Int8 => ScalarValue::Int8(parse_signed(raw)?),
            Scalar::Int16 => ScalarValue::Int16(parse_signed(raw)?),
            Scalar::Int32 => ScalarValue::Int32(parse_signed(raw)?),
            Scalar::Int64 => ScalarValue::Int64(parse_signed(raw)?),
            Scalar::Uint => ScalarValue::Uint(parse_unsigned(raw)?),
            Scalar::Uint8 => ScalarValue::Uint8(parse_unsigned(raw)?),
            Scalar::Uint16 => ScalarValue::Uint16(parse_unsigned(raw)?),
            Scalar::Uint32 => ScalarValue::Uint32(parse_unsigned(raw)?),
            Scalar::Uint64 => ScalarValue::Uint64(parse_unsigned(raw)?),
            Scalar::Float32 => {
                ScalarValue::Float32(raw.trim().parse().map_err(|e| format!("{e}"))?)
            }
            Scalar::Float64 => {
                ScalarValue::Float64(raw.trim().parse().map_err(|e| format!("{e}"))?)
            }
        };
        Ok(value)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a flag: a single scalar or a homogeneous slice of scalars.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{FlagKind, Scalar};
///
/// assert_eq!(FlagKind::Single(Scalar::Int).to_string(), "int");
/// assert_eq!(FlagKind::Slice(Scalar::Int).to_string(), "int_slice");
/// assert!(FlagKind::Single(Scalar::Bool).is_bool());
/// assert!(!FlagKind::Slice(Scalar::Bool).is_bool());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    Single(Scalar),
    Slice(Scalar),
}

impl FlagKind {
    /// Only single booleans may be set without a value.
    pub fn is_bool(self) -> bool {
        self == FlagKind::Single(Scalar::Bool)
    }

    /// Parses `raw` into a value of this kind, splitting slices on `separator`.
    ///
    /// A slice fails as a whole if any piece fails.
    pub fn parse(self, raw: &str, separator: &str) -> Result<Value, String> {
        match self {
            FlagKind::Single(scalar) => scalar.parse(raw).map(Value::Single),
            FlagKind::Slice(scalar) => raw
                .split(separator)
                .map(|piece| scalar.parse(piece))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Slice),
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagKind::Single(scalar) => write!(f, "{scalar}"),
            FlagKind::Slice(scalar) => write!(f, "{scalar}_slice"),
        }
    }
}

/// A parsed scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    String(String),
    Bool(bool),
    Duration(Duration),
    Int(isize),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint(usize),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::String(v) => f.write_str(v),
            ScalarValue::Bool(v) => write!(f, "{v}"),
            ScalarValue::Duration(v) => f.write_str(&format_duration(*v)),
            ScalarValue::Int(v) => write!(f, "{v}"),
            ScalarValue::Int8(v) => write!(f, "{v}"),
            ScalarValue::Int16(v) => write!(f, "{v}"),
            ScalarValue::Int32(v) => write!(f, "{v}"),
            ScalarValue::Int64(v) => write!(f, "{v}"),
            ScalarValue::Uint(v) => write!(f, "{v}"),
            ScalarValue::Uint8(v) => write!(f, "{v}"),
            ScalarValue::Uint16(v) => write!(f, "{v}"),
            ScalarValue::Uint32(v) => write!(f, "{v}"),
            ScalarValue::Uint64(v) => write!(f, "{v}"),
            ScalarValue::Float32(v) => write!(f, "{v}"),
            ScalarValue::Float64(v) => write!(f, "{v}"),
        }
    }
}

/// A parsed flag value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Single(ScalarValue),
    Slice(Vec<ScalarValue>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Single(v) => write!(f, "{v}"),
            Value::Slice(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Rust types that can back a single scalar flag.
pub trait ScalarType: Sized + Clone {
    /// Scalar kind this type maps to.
    const SCALAR: Scalar;

    fn into_scalar(self) -> ScalarValue;

    fn from_scalar(value: &ScalarValue) -> Option<Self>;
}

/// Rust types that can back a flag, single or slice.
///
/// Implemented for every [`ScalarType`] and for `Vec<T>` of one.
pub trait FlagType: Sized + Clone {
    /// Kind of flag this type maps to.
    const KIND: FlagKind;

    fn into_value(self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;
}

impl<T: ScalarType> FlagType for T {
    const KIND: FlagKind = FlagKind::Single(T::SCALAR);

    fn into_value(self) -> Value {
        Value::Single(self.into_scalar())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Single(v) => T::from_scalar(v),
            Value::Slice(_) => None,
        }
    }
}

impl<T: ScalarType> FlagType for Vec<T> {
    const KIND: FlagKind = FlagKind::Slice(T::SCALAR);

    fn into_value(self) -> Value {
        Value::Slice(self.into_iter().map(ScalarType::into_scalar).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Slice(items) => items.iter().map(T::from_scalar).collect(),
            Value::Single(_) => None,
        }
    }
}

macro_rules! scalar_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ScalarType for $ty {
                const SCALAR: Scalar = Scalar::$variant;

                fn into_scalar(self) -> ScalarValue {
                    ScalarValue::$variant(self)
                }

                fn from_scalar(value: &ScalarValue) -> Option<Self> {
                    match value {
                        ScalarValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

scalar_type! {
    String => String,
    bool => Bool,
    Duration => Duration,
    isize => Int,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    usize => Uint,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
}

/// Parses a boolean. The empty string means `true` so that bare `--flag`
/// and bundled shorthands can share one code path.
fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "" | "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(format!("invalid boolean {raw:?}")),
    }
}

/// Splits an optional sign and radix prefix off an integer literal.
///
/// Only `0x`, `0o`, and `0b` select another radix; a bare leading zero is
/// decimal, so `010` is ten.
fn split_integer(raw: &str) -> Result<(bool, u32, String), String> {
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let lower = rest.get(..2).map(str::to_ascii_lowercase);
    let (radix, digits) = match lower.as_deref() {
        Some("0x") => (16, &rest[2..]),
        Some("0o") => (8, &rest[2..]),
        Some("0b") => (2, &rest[2..]),
        _ => (10, rest),
    };

    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(format!("invalid integer {raw:?}"));
    }
    Ok((negative, radix, digits))
}

fn parse_signed<T>(raw: &str) -> Result<T, String>
where
    T: TryFrom<i128>,
{
    let (negative, radix, digits) = split_integer(raw)?;
    let magnitude = i128::from_str_radix(&digits, radix)
        .map_err(|e| format!("invalid integer {raw:?}: {e}"))?;
    let value = if negative { -magnitude } else { magnitude };
    T::try_from(value).map_err(|_| format!("integer {raw:?} out of range"))
}

fn parse_unsigned<T>(raw: &str) -> Result<T, String>
where
    T: TryFrom<u128>,
{
    let (negative, radix, digits) = split_integer(raw)?;
    if negative {
        return Err(format!("unsigned integer {raw:?} cannot be negative"));
    }
    let value = u128::from_str_radix(&digits, radix)
        .map_err(|e| format!("invalid integer {raw:?}: {e}"))?;
    T::try_from(value).map_err(|_| format!("integer {raw:?} out of range"))
}

const DURATION_UNITS: [(&str, u128); 8] = [
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60_000_000_000),
    ("h", 3_600_000_000_000),
];

/// Fraction digits beyond this cannot contribute a whole nanosecond.
const MAX_FRACTION_DIGITS: usize = 18;

/// Parses durations of the form `300ms`, `1.5h`, or `2h45m10s`.
///
/// Units: `ns`, `us` (`µs`), `ms`, `s`, `m`, `h`. A bare `0` is zero.
/// Negative durations are rejected since [`Duration`] is unsigned.
/// Components are summed in whole nanoseconds; sub-nanosecond fractions
/// are truncated.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let invalid = || format!("invalid duration {raw:?}");
    let overflow = || format!("duration {raw:?} out of range");

    let mut rest = raw.strip_prefix('+').unwrap_or(raw);
    if rest.starts_with('-') {
        return Err(format!("negative duration {raw:?}"));
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut nanos: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_len];
        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return Err(invalid());
        }
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        let scale = DURATION_UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| {
                if unit.is_empty() {
                    format!("missing unit in duration {raw:?}")
                } else {
                    format!("unknown unit {unit:?} in duration {raw:?}")
                }
            })?;
        rest = &rest[unit_len..];

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let mut component = whole.checked_mul(scale).ok_or_else(overflow)?;

        let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
        if !fraction.is_empty() {
            let digits: u128 = fraction.parse().map_err(|_| invalid())?;
            let denominator = 10u128.pow(fraction.len() as u32);
            let part = digits.checked_mul(scale).ok_or_else(overflow)? / denominator;
            component = component.checked_add(part).ok_or_else(overflow)?;
        }

        nanos = nanos.checked_add(component).ok_or_else(overflow)?;
    }

    let nanos = u64::try_from(nanos).map_err(|_| overflow())?;
    Ok(Duration::from_nanos(nanos))
}

/// Formats a duration in the same grammar [`parse_duration`] accepts.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use cmdtree_core::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(5400)), "1h30m0s");
/// assert_eq!(format_duration(Duration::from_millis(300)), "300ms");
/// assert_eq!(format_duration(Duration::ZERO), "0s");
/// ```
pub fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }
    if d < Duration::from_secs(1) {
        let nanos = d.as_nanos();
        return if nanos % 1_000_000 == 0 {
            format!("{}ms", nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            format!("{}µs", nanos / 1_000)
        } else {
            format!("{nanos}ns")
        };
    }

    let total = d.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    let fraction = match d.subsec_nanos() {
        0 => String::new(),
        n => format!(".{n:09}").trim_end_matches('0').to_string(),
    };

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&format!("{seconds}{fraction}s"));
    out
}
