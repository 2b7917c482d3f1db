//! Intrinsic/interaction energy tables and exact-enumeration probabilities.
//!
//! [`EnergyModel`] owns per-instance proton counts and energies, the
//! symmetrized pairwise interaction matrix, and the probabilities
//! computed either by exhaustive enumeration here or by `titr_mc`'s
//! Metropolis sampler.

mod constants;
mod energy_model;
mod error;

pub use constants::{proton_chemical_potential, ANALYTIC_STATES, CONSTANT_LN10, CONSTANT_MOLAR_GAS_KCAL_MOL};
pub use energy_model::{EnergyKind, EnergyModel};
pub use error::EnergyError;
