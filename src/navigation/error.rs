use core::fmt;

use super::cursor::MAX_INDEX;
use crate::sys::fs;

#[derive(Copy, Clone, Debug, PartialEq, Display)]
pub enum LoadError {
    #[display(fmt = "waypoint source unavailable")]
    SourceUnavailable,
    #[display(fmt = "route document malformed")]
    DecodeError,
    #[display(fmt = "waypoint is not a pair of numbers")]
    MalformedWaypoint,
}

impl From<fs::Error> for LoadError {
    fn from(error: fs::Error) -> Self {
        match error {
            fs::Error::InvalidData => Self::DecodeError,
            _ => Self::SourceUnavailable,
        }
    }
}

/// Failure to move to the next waypoint
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AdvanceError<E> {
    /// Index already at [`MAX_INDEX`], the largest one the cursor cell holds
    Saturated,
    Store(E),
}

impl<E: fmt::Display> fmt::Display for AdvanceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Saturated => write!(f, "waypoint index saturated at {}", MAX_INDEX),
            Self::Store(e) => write!(f, "store index failed: {}", e),
        }
    }
}
