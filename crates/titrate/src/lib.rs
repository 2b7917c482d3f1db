//! # titrate
//!
//! The main entry point for the titrate protonation-equilibria package,
//! with interfaces to the crates organized as a workspace. At this
//! level, you can also find the JSON model schema and argument parsers
//! for the binaries shipped with the titrate package.
//!
//! This crate re-exports the main functionality from its submodules.

/// Exposing titrate::state. The mixed-radix state vector over per-site
/// protonation instances.
pub mod state {
    pub use ::titr_state::*;
}

/// Exposing titrate::energy. Intrinsic/interaction energy tables and
/// exact-enumeration probabilities.
pub mod energy {
    pub use ::titr_energy::*;
}

/// Exposing titrate::mc. The Metropolis Monte Carlo sampler.
pub mod mc {
    pub use ::titr_mc::*;
}

/// The JSON titration-model schema and its loaders.
pub mod model;

/// Shared CLI argument groups for the `titr-exact` and `titr-mc` binaries.
pub mod cli_parsers;
