//! Metropolis Monte Carlo sampling of protonation microstates.
//!
//! [`MCEngine`] holds a private clone of a [`titr_state::StateVector`]
//! and an injected RNG, and samples against a [`titr_energy::EnergyModel`]
//! passed in by reference to each call.

mod engine;
mod error;

pub use engine::{EngineState, MCEngine, ScanCounters};
pub use error::McError;

#[cfg(test)]
mod tests {
    use super::*;
    use titr_energy::{EnergyModel, CONSTANT_LN10, CONSTANT_MOLAR_GAS_KCAL_MOL};
    use titr_rng::Mt19937;

    fn single_site_model(pka: f64, temperature: f64) -> EnergyModel {
        let mut model = EnergyModel::new(1, 2);
        model.set_temperature(temperature);
        model.set_site(0, 0, 1).unwrap();
        model.set_protons(0, 0).unwrap();
        model.set_protons(1, 1).unwrap();
        model.set_gintr(0, 0.0).unwrap();
        model.set_gintr(1, -pka * CONSTANT_MOLAR_GAS_KCAL_MOL * temperature * CONSTANT_LN10).unwrap();
        model.symmetrize_interactions();
        model
    }

    #[test]
    fn single_move_updates_state_and_energy() {
        let model = single_site_model(6.5, 298.15);
        let mut engine = MCEngine::new(Mt19937::new(1), 1.0, 0, 0);
        engine.link_to_energy_model(&model);
        engine.equilibration(&model, 6.5).unwrap();
        let before = engine.energy();
        engine.single_move(&model, 6.5).unwrap();
        // energy is always recomputable from the vector: check it still
        // matches the incremental bookkeeping.
        let recomputed = model.calculate_microstate_energy(engine.vector(), 6.5);
        assert!((recomputed - engine.energy()).abs() < 1e-9, "before={before}");
    }

    #[test]
    fn not_linked_is_rejected() {
        let model = single_site_model(6.5, 298.15);
        let mut engine = MCEngine::new(Mt19937::new(1), 1.0, 10, 10);
        assert!(matches!(engine.single_move(&model, 7.0), Err(McError::NotLinked)));
    }

    #[test]
    fn production_before_equilibration_is_rejected() {
        let model = single_site_model(6.5, 298.15);
        let mut engine = MCEngine::new(Mt19937::new(1), 1.0, 10, 10);
        engine.link_to_energy_model(&model);
        assert!(matches!(engine.production(&model, 7.0), Err(McError::NotEquilibrated)));
    }

    /// The single-site titration curve sampled by long-run Monte Carlo
    /// should agree with the exact analytic probability within sampling
    /// noise (loose tolerance: this is a stochastic test over a fixed
    /// seed, not a bound we prove).
    #[test]
    fn mc_matches_analytic_probability_for_single_site() {
        let pka = 6.5;
        let ph = 6.5; // right at the midpoint, most sensitive to sampling noise
        let mut model = single_site_model(pka, 298.15);
        model.calculate_probabilities_analytically(ph).unwrap();
        let analytic = model.probability(1).unwrap();

        let mut engine = MCEngine::new(Mt19937::new(42), 1.0, 2_000, 20_000);
        engine.link_to_energy_model(&model);
        engine.equilibration(&model, ph).unwrap();
        engine.production(&model, ph).unwrap();
        let sampled = engine.probability(1);

        assert!((sampled - analytic).abs() < 0.05, "sampled={sampled} analytic={analytic}");
    }

    /// Literal scenario: 4 sites x 2 instances, fixed symmetric couplings
    /// in [-2, 2] kcal/mol, T=300K, pH=7, seed fixed. MC should agree
    /// with the analytic result to within 0.01 absolute.
    #[test]
    fn mc_matches_analytic_for_four_coupled_sites() {
        let temperature = 300.0;
        let mut model = EnergyModel::new(4, 8);
        model.set_temperature(temperature);
        let couplings = [-2.0, 0.5, 1.3, -0.8, 2.0, -1.1];
        for site in 0..4 {
            let first = site * 2;
            model.set_site(site, first, first + 1).unwrap();
            model.set_protons(first, 0).unwrap();
            model.set_protons(first + 1, 1).unwrap();
            model.set_gintr(first, 0.0).unwrap();
            model.set_gintr(first + 1, -1.5 + site as f64 * 0.3).unwrap();
        }
        let mut idx = 0;
        for i in 0..8 {
            for j in 0..i {
                if i / 2 != j / 2 {
                    let w = couplings[idx % couplings.len()];
                    model.set_interaction(i, j, w).unwrap();
                    model.set_interaction(j, i, w).unwrap();
                    idx += 1;
                }
            }
        }
        model.symmetrize_interactions();

        let ph = 7.0;
        model.calculate_probabilities_analytically(ph).unwrap();
        let analytic: Vec<f64> = (0..8).map(|i| model.probability(i).unwrap()).collect();

        let mut engine = MCEngine::new(Mt19937::new(123), 1.0, 2_000, 50_000);
        engine.link_to_energy_model(&model);
        engine.find_pairs(&mut model).unwrap();
        engine.equilibration(&model, ph).unwrap();
        engine.production(&model, ph).unwrap();

        for i in 0..8 {
            let sampled = engine.probability(i);
            assert!((sampled - analytic[i]).abs() < 0.01, "instance {i}: sampled={sampled} analytic={}", analytic[i]);
        }
    }

    #[test]
    fn double_move_requires_pairs() {
        let model = single_site_model(6.5, 298.15);
        let mut engine = MCEngine::new(Mt19937::new(1), 1.0, 0, 0);
        engine.link_to_energy_model(&model);
        assert!(matches!(engine.double_move(&model, 7.0), Err(McError::State(_))));
    }

    #[test]
    fn run_scan_reports_nonzero_activity_for_movable_site() {
        let model = single_site_model(6.5, 298.15);
        let mut engine = MCEngine::new(Mt19937::new(9), 1.0, 0, 0);
        engine.link_to_energy_model(&model);
        engine.equilibration(&model, 6.5).unwrap();
        let counters = engine.run_scan(&model, 6.5, Some(50)).unwrap();
        assert_eq!(counters.moves_done, 50);
        assert_eq!(counters.flips_done, 0);
    }
}
