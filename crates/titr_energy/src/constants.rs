/// Molar gas constant, kcal·mol⁻¹·K⁻¹.
pub const CONSTANT_MOLAR_GAS_KCAL_MOL: f64 = 0.001987165392;

pub const CONSTANT_LN10: f64 = 2.302585092994;

/// Cap on `nstates` above which exact enumeration is not attempted.
pub const ANALYTIC_STATES: u64 = 1_000_000;

/// `μ(pH) = -R·T·ln10·pH`.
pub fn proton_chemical_potential(temperature: f64, ph: f64) -> f64 {
    -CONSTANT_MOLAR_GAS_KCAL_MOL * temperature * CONSTANT_LN10 * ph
}
