//! Error type returned by [`crate::run`].

use std::fmt;

/// Which resource limit ended a search without a solution.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CapReached {
    MaxCost,
    MaxLevel,
    MaxTime,
}

impl fmt::Display for CapReached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapReached::MaxCost => write!(f, "max_cost"),
            CapReached::MaxLevel => write!(f, "max_level"),
            CapReached::MaxTime => write!(f, "max_time"),
        }
    }
}

/// Failure modes of regex inference.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The infix closure of the examples does not fit in the widest supported [`crate::cs::Cs`].
    WidthExceeded { ic_size: usize, max_width: usize },
    /// Malformed external input (only ever raised by the CLI binary's file parser).
    BadInput(String),
    /// The search exhausted its budget without finding a regex.
    NotFound { cap_reached: CapReached },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WidthExceeded { ic_size, max_width } => write!(
                f,
                "infix closure has {ic_size} elements, exceeding the {max_width}-bit Cs capacity"
            ),
            Error::BadInput(msg) => write!(f, "bad input: {msg}"),
            Error::NotFound { cap_reached } => {
                write!(f, "no regex found before {cap_reached} was reached")
            }
        }
    }
}

impl std::error::Error for Error {}
