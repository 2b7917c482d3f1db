use std::fmt;

use titr_energy::EnergyError;
use titr_state::StateError;

#[derive(Debug)]
pub enum McError {
    /// A move or scan was requested before `link_to_energy_model`.
    NotLinked,
    /// `production` was called before `equilibration`.
    NotEquilibrated,
    State(StateError),
    Energy(EnergyError),
}

impl fmt::Display for McError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            McError::NotLinked => write!(f, "engine is not linked to an energy model"),
            McError::NotEquilibrated => write!(f, "production requested before equilibration"),
            McError::State(e) => write!(f, "{e}"),
            McError::Energy(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for McError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            McError::State(e) => Some(e),
            McError::Energy(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StateError> for McError {
    fn from(e: StateError) -> Self {
        McError::State(e)
    }
}

impl From<EnergyError> for McError {
    fn from(e: EnergyError) -> Self {
        McError::Energy(e)
    }
}
