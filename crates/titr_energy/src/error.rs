use std::fmt;

use titr_state::StateError;

#[derive(Debug)]
pub enum EnergyError {
    IndexOutOfRange { index: usize, bound: usize },
    NonConformableSizes { expected: usize, found: usize },
    /// `nstates` exceeds `ANALYTIC_STATES`; exact enumeration is not
    /// attempted and the caller should fall back to Monte Carlo.
    TooManyStates { nstates: u64, cap: u64 },
    /// The unfolded energy path was invoked but `models` (Gmodel) was
    /// never populated.
    MissingModels,
    State(StateError),
}

impl fmt::Display for EnergyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnergyError::IndexOutOfRange { index, bound } => {
                write!(f, "index {index} out of range, expected < {bound}")
            }
            EnergyError::NonConformableSizes { expected, found } => {
                write!(f, "non-conformable sizes: expected {expected}, found {found}")
            }
            EnergyError::TooManyStates { nstates, cap } => {
                write!(f, "nstates {nstates} exceeds ANALYTIC_STATES cap {cap}; use Monte Carlo instead")
            }
            EnergyError::MissingModels => write!(f, "unfolded energy requested but Gmodel values were never set"),
            EnergyError::State(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EnergyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnergyError::State(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StateError> for EnergyError {
    fn from(e: StateError) -> Self {
        EnergyError::State(e)
    }
}
