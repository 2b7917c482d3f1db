//! Mixed-radix odometer over per-site protonation instances.
//!
//! [`StateVector`] holds one "digit" per titratable [`Site`], enumerates
//! microstates via [`StateVector::increment`], and supports the
//! single/double Metropolis moves used by `titr_mc`.

mod error;
mod site;
mod state_vector;

pub use error::StateError;
pub use site::{PairRef, Site};
pub use state_vector::StateVector;
