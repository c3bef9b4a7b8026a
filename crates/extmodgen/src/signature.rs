//! Calling-convention classification of reflected signatures
//!
//! MicroPython exposes a fixed family of function-object macros. Every
//! reflected argument list maps to exactly one of them, or is rejected.

use std::fmt;

use crate::{
    descriptor::ArgumentSpec,
    error::{GenerateError, Result},
};

/// Largest arity that has a dedicated `MP_DEFINE_CONST_FUN_OBJ_<n>` macro
pub const MAX_FIXED_ARITY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallConvention {
    /// Exactly `n` positional arguments, `n <= 3`
    Fixed(usize),
    /// Bounded positional arguments without catch-all
    VariadicBetween { min: usize, max: usize },
    /// At least `min` positional arguments plus `*args`
    Variadic { min: usize },
    /// At least `min` positional arguments plus `**kwargs`
    KeywordCatchAll { min: usize },
}

impl CallConvention {
    pub fn min_args(&self) -> usize {
        match *self {
            CallConvention::Fixed(n) => n,
            CallConvention::VariadicBetween { min, .. }
            | CallConvention::Variadic { min }
            | CallConvention::KeywordCatchAll { min } => min,
        }
    }

    /// Upper arity bound; `None` when a catch-all accepts any number
    pub fn max_args(&self) -> Option<usize> {
        match *self {
            CallConvention::Fixed(n) => Some(n),
            CallConvention::VariadicBetween { max, .. } => Some(max),
            CallConvention::Variadic { .. } | CallConvention::KeywordCatchAll { .. } => None,
        }
    }

    pub fn takes_keywords(&self) -> bool {
        matches!(self, CallConvention::KeywordCatchAll { .. })
    }

    /// The same convention with one extra leading positional argument.
    #[must_use]
    pub fn with_receiver(self) -> Self {
        match self {
            CallConvention::Fixed(n) if n < MAX_FIXED_ARITY => CallConvention::Fixed(n + 1),
            CallConvention::Fixed(n) => CallConvention::VariadicBetween {
                min: n + 1,
                max: n + 1,
            },
            CallConvention::VariadicBetween { min, max } => CallConvention::VariadicBetween {
                min: min + 1,
                max: max + 1,
            },
            CallConvention::Variadic { min } => CallConvention::Variadic { min: min + 1 },
            CallConvention::KeywordCatchAll { min } => {
                CallConvention::KeywordCatchAll { min: min + 1 }
            }
        }
    }
}

impl fmt::Display for CallConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallConvention::Fixed(n) => write!(f, "fixed({n})"),
            CallConvention::VariadicBetween { min, max } => {
                write!(f, "variadic-between({min}, {max})")
            }
            CallConvention::Variadic { min } => write!(f, "variadic({min})"),
            CallConvention::KeywordCatchAll { min } => write!(f, "keyword({min})"),
        }
    }
}

/// Classify an argument list; `function` only names the culprit in errors.
pub fn classify(function: &str, spec: &ArgumentSpec) -> Result<CallConvention> {
    let arity = spec.arity();
    let defaults = spec.default_count();
    let has_varargs = spec.varargs.is_some();
    let has_varkw = spec.varkw.is_some();

    let convention = match (has_varargs, has_varkw, defaults) {
        (false, false, 0) if arity <= MAX_FIXED_ARITY => CallConvention::Fixed(arity),
        (false, false, 0) => CallConvention::VariadicBetween {
            min: arity,
            max: arity,
        },
        (false, false, _) => CallConvention::VariadicBetween {
            min: arity - defaults,
            max: arity,
        },
        (true, false, 0) => CallConvention::Variadic { min: arity },
        (false, true, 0) => CallConvention::KeywordCatchAll { min: arity },
        (true, true, _) => {
            return Err(unsupported(
                function,
                "both *args and **kwargs are present",
            ));
        }
        (true, false, _) | (false, true, _) => {
            return Err(unsupported(
                function,
                "default values cannot be combined with a catch-all",
            ));
        }
    };
    Ok(convention)
}

fn unsupported(function: &str, reason: &str) -> GenerateError {
    GenerateError::UnsupportedSignature {
        function: function.to_owned(),
        reason: reason.to_owned(),
    }
}
