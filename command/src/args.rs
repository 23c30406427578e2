//! Positional argument validators.
//!
//! A validator receives the positional arguments collected after flag
//! parsing and either accepts them or explains why not. Commands without an
//! explicit validator accept no positionals ([`none`]).
//!
//! # Examples
//!
//! ```
//! use cmdtree::args;
//!
//! let two = args::exact(2);
//! assert!(two(&["3".to_string(), "4".to_string()]).is_ok());
//! assert!(two(&["3".to_string()]).is_err());
//!
//! let one_or_three = args::some(vec![args::exact(1), args::exact(3)]);
//! assert!(one_or_three(&["a".to_string()]).is_ok());
//! assert!(one_or_three(&[]).is_err());
//! ```

use std::rc::Rc;

use thiserror::Error;

/// Why a validator rejected the positional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("expected exactly {expected} arguments, got {got}")]
    Exact { expected: usize, got: usize },

    #[error("expected at least {min} arguments, got {got}")]
    Min { min: usize, got: usize },

    #[error("expected at most {max} arguments, got {got}")]
    Max { max: usize, got: usize },

    #[error("expected between {min} and {max} arguments, got {got}")]
    Between { min: usize, max: usize, got: usize },

    /// Every alternative of [`some`] failed.
    #[error("no validators passed: {}", join(.0))]
    NoneMatched(Vec<ArgsError>),

    #[error("{0}")]
    Custom(String),
}

fn join(errors: &[ArgsError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Shared validator function.
pub type ArgValidator = Rc<dyn Fn(&[String]) -> Result<(), ArgsError>>;

/// Exactly `n` arguments.
pub fn exact(n: usize) -> ArgValidator {
    Rc::new(move |args: &[String]| {
        if args.len() != n {
            return Err(ArgsError::Exact {
                expected: n,
                got: args.len(),
            });
        }
        Ok(())
    })
}

/// No arguments; the default for every command.
pub fn none() -> ArgValidator {
    exact(0)
}

/// Any number of arguments.
pub fn any() -> ArgValidator {
    Rc::new(|_: &[String]| Ok(()))
}

/// At least `min` arguments.
pub fn min(min: usize) -> ArgValidator {
    Rc::new(move |args: &[String]| {
        if args.len() < min {
            return Err(ArgsError::Min {
                min,
                got: args.len(),
            });
        }
        Ok(())
    })
}

/// At most `max` arguments.
pub fn max(max: usize) -> ArgValidator {
    Rc::new(move |args: &[String]| {
        if args.len() > max {
            return Err(ArgsError::Max {
                max,
                got: args.len(),
            });
        }
        Ok(())
    })
}

/// Between `min` and `max` arguments, inclusive.
pub fn between(min: usize, max: usize) -> ArgValidator {
    Rc::new(move |args: &[String]| {
        if args.len() < min || args.len() > max {
            return Err(ArgsError::Between {
                min,
                max,
                got: args.len(),
            });
        }
        Ok(())
    })
}

/// All validators must pass; the first failure is returned.
pub fn every(validators: Vec<ArgValidator>) -> ArgValidator {
    Rc::new(move |args: &[String]| validators.iter().try_for_each(|v| v(args)))
}

/// At least one validator must pass.
pub fn some(validators: Vec<ArgValidator>) -> ArgValidator {
    Rc::new(move |args: &[String]| {
        let mut errors = Vec::with_capacity(validators.len());
        for validator in &validators {
            match validator(args) {
                Ok(()) => return Ok(()),
                Err(e) => errors.push(e),
            }
        }
        Err(ArgsError::NoneMatched(errors))
    })
}

/// Wraps an arbitrary predicate; its message becomes [`ArgsError::Custom`].
pub fn custom<F>(check: F) -> ArgValidator
where
    F: Fn(&[String]) -> Result<(), String> + 'static,
{
    Rc::new(move |args: &[String]| check(args).map_err(ArgsError::Custom))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(n: usize) -> Vec<String> {
        (0..n).map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_none_rejects_arguments() {
        assert!(none()(&strings(0)).is_ok());
        assert_eq!(
            none()(&strings(1)).unwrap_err(),
            ArgsError::Exact {
                expected: 0,
                got: 1
            }
        );
    }

    #[test]
    fn test_bounds() {
        assert!(min(2)(&strings(2)).is_ok());
        assert!(min(2)(&strings(1)).is_err());
        assert!(max(2)(&strings(2)).is_ok());
        assert!(max(2)(&strings(3)).is_err());
        assert!(between(1, 3)(&strings(3)).is_ok());
        assert!(between(1, 3)(&strings(0)).is_err());
        assert!(any()(&strings(100)).is_ok());
    }

    #[test]
    fn test_every_returns_first_failure() {
        let v = every(vec![min(1), max(2)]);
        assert!(v(&strings(2)).is_ok());
        assert_eq!(
            v(&strings(3)).unwrap_err(),
            ArgsError::Max { max: 2, got: 3 }
        );
    }

    #[test]
    fn test_some_collects_failures() {
        let v = some(vec![exact(1), exact(3)]);
        let err = v(&strings(2)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no validators passed: expected exactly 1 arguments, got 2; \
             expected exactly 3 arguments, got 2"
        );
    }

    #[test]
    fn test_custom_message() {
        let numeric = custom(|args| {
            args.iter()
                .all(|a| a.parse::<i64>().is_ok())
                .then_some(())
                .ok_or_else(|| "arguments must be integers".to_string())
        });
        assert!(numeric(&["1".to_string()]).is_ok());
        assert_eq!(
            numeric(&["x".to_string()]).unwrap_err(),
            ArgsError::Custom("arguments must be integers".to_string())
        );
    }
}
