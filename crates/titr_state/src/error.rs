//! Errors for titr_state.
//!
//! NOTE: indices are communicated as `usize` throughout; `IndexOutOfRange`
//! carries the offending index and the exclusive upper bound it was
//! checked against.

use std::fmt;

#[derive(Debug)]
pub enum StateError {
    AllocationFailure,
    IndexOutOfRange { index: usize, bound: usize },
    ValueError { value: usize, first: usize, last: usize },
    NonConformableSizes { expected: usize, found: usize },
    SubstateAlreadyAllocated,
    NoMovableSites,
    NoPairs,
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::AllocationFailure => write!(f, "allocation failure"),
            StateError::IndexOutOfRange { index, bound } => {
                write!(f, "index {index} out of range, expected < {bound}")
            }
            StateError::ValueError { value, first, last } => {
                write!(f, "value {value} outside instance range [{first}, {last}]")
            }
            StateError::NonConformableSizes { expected, found } => {
                write!(f, "non-conformable sizes: expected {expected} sites, found {found}")
            }
            StateError::SubstateAlreadyAllocated => write!(f, "substate already allocated"),
            StateError::NoMovableSites => write!(f, "no site has more than one instance to move"),
            StateError::NoPairs => write!(f, "no pairs registered for a double move"),
        }
    }
}

impl std::error::Error for StateError {}
