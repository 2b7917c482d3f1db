use log::trace;
use rand::{Rng, RngCore};

use titr_energy::{proton_chemical_potential, EnergyModel, CONSTANT_MOLAR_GAS_KCAL_MOL};
use titr_state::StateVector;

use crate::error::McError;

/// Underflow guard on the Metropolis criterion: `exp(-500)` is already
/// below `f64` subnormal range, so any larger exponent is treated as a
/// hard reject rather than evaluated.
const TOO_SMALL: f64 = -500.0;

fn metropolis_accept(delta_g_over_rt: f64, u01: f64) -> bool {
    if delta_g_over_rt < 0.0 {
        true
    } else if -delta_g_over_rt < TOO_SMALL {
        false
    } else {
        u01 < (-delta_g_over_rt).exp()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Unlinked,
    Linked,
    Equilibrated,
    Producing,
    Done,
}

/// Per-scan acceptance bookkeeping, returned by [`MCEngine::run_scan`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanCounters {
    pub moves_done: u64,
    pub moves_accepted: u64,
    pub flips_done: u64,
    pub flips_accepted: u64,
}

/// Metropolis sampler over a [`StateVector`] clone, driven by an injected
/// RNG. Does not own the [`EnergyModel`] it samples against — every move
/// takes it by reference, so the same model can be linked to several
/// independently-seeded engines for parallel pH sweeps.
pub struct MCEngine<R: RngCore> {
    rng: R,
    vector: StateVector,
    probabilities: Vec<f64>,
    limit: f64,
    nequil: u64,
    nprod: u64,
    state: EngineState,
    energy: f64,
    moves_done: u64,
    moves_accepted: u64,
    flips_done: u64,
    flips_accepted: u64,
}

impl<R: RngCore> MCEngine<R> {
    pub fn new(rng: R, limit: f64, nequil: u64, nprod: u64) -> Self {
        Self {
            rng,
            vector: StateVector::allocate(0),
            probabilities: Vec::new(),
            limit,
            nequil,
            nprod,
            state: EngineState::Unlinked,
            energy: 0.0,
            moves_done: 0,
            moves_accepted: 0,
            flips_done: 0,
            flips_accepted: 0,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn probability(&self, index: usize) -> f64 {
        self.probabilities[index]
    }

    pub fn vector(&self) -> &StateVector {
        &self.vector
    }

    pub fn moves_done(&self) -> u64 {
        self.moves_done
    }

    pub fn moves_accepted(&self) -> u64 {
        self.moves_accepted
    }

    pub fn flips_done(&self) -> u64 {
        self.flips_done
    }

    pub fn flips_accepted(&self) -> u64 {
        self.flips_accepted
    }

    /// Clone the model's private vector as the engine's working state.
    pub fn link_to_energy_model(&mut self, model: &EnergyModel) {
        self.vector = model.vector().clone();
        self.probabilities = vec![0.0; model.ninstances()];
        self.state = EngineState::Linked;
    }

    /// Run dry-run then fill-run pair discovery on `model` and adopt the
    /// resulting pairs table into the engine's own vector.
    pub fn find_pairs(&mut self, model: &mut EnergyModel) -> Result<i64, McError> {
        let dry = model.find_pairs(self.limit, 0)?;
        let filled = model.find_pairs(self.limit, dry)?;
        self.vector = model.vector().clone();
        Ok(filled)
    }

    fn require_linked(&self) -> Result<(), McError> {
        if matches!(self.state, EngineState::Unlinked) {
            return Err(McError::NotLinked);
        }
        Ok(())
    }

    /// Propose and accept/reject a single-site move, updating `energy`
    /// incrementally rather than recomputing it from scratch.
    pub fn single_move(&mut self, model: &EnergyModel, ph: f64) -> Result<bool, McError> {
        self.require_linked()?;
        let rt = CONSTANT_MOLAR_GAS_KCAL_MOL * model.temperature();
        let mu = proton_chemical_potential(model.temperature(), ph);

        let (site_index, old_active) = self.vector.move_single(&mut self.rng)?;
        let new_active = self.vector.get_actual_item(site_index)?;

        let delta_gintr = model.gintr(new_active)? - model.gintr(old_active)?;
        let delta_nprotons = model.protons(new_active)? as i64 - model.protons(old_active)? as i64;
        let mut delta_w = 0.0;
        for site in self.vector.sites() {
            let a_k = site.index_active;
            delta_w += model.inter_symmetric(new_active, a_k)? - model.inter_symmetric(old_active, a_k)?;
        }
        let delta_g = delta_gintr - (delta_nprotons as f64) * mu + delta_w;
        let delta_g_over_rt = delta_g / rt;

        self.moves_done += 1;
        let accepted = metropolis_accept(delta_g_over_rt, self.rng.random::<f64>());
        if accepted {
            self.energy += delta_g;
            self.moves_accepted += 1;
        } else {
            self.vector.revert_site(site_index, old_active);
        }
        trace!("single move site={site_index} accepted={accepted} dG={delta_g:.4}");
        Ok(accepted)
    }

    /// Propose and accept/reject a double move over a pair drawn from the
    /// pairs table. `ΔG` is the sum of both sites' single-move
    /// contributions plus the direct cross term between the two moved
    /// instances; the scan over untouched sites picks up each site's
    /// change exactly once.
    pub fn double_move(&mut self, model: &EnergyModel, ph: f64) -> Result<bool, McError> {
        self.require_linked()?;
        let rt = CONSTANT_MOLAR_GAS_KCAL_MOL * model.temperature();
        let mu = proton_chemical_potential(model.temperature(), ph);

        let (site_a, site_b, old_a, old_b) = self.vector.double_move(&mut self.rng)?;
        let new_a = self.vector.get_actual_item(site_a)?;
        let new_b = self.vector.get_actual_item(site_b)?;

        let delta_gintr = (model.gintr(new_a)? - model.gintr(old_a)?) + (model.gintr(new_b)? - model.gintr(old_b)?);
        let delta_nprotons = (model.protons(new_a)? as i64 - model.protons(old_a)? as i64)
            + (model.protons(new_b)? as i64 - model.protons(old_b)? as i64);

        let mut delta_w = model.inter_symmetric(new_a, new_b)? - model.inter_symmetric(old_a, old_b)?;
        for (k, site) in self.vector.sites().iter().enumerate() {
            if k == site_a || k == site_b {
                continue;
            }
            let a_k = site.index_active;
            delta_w += model.inter_symmetric(new_a, a_k)? - model.inter_symmetric(old_a, a_k)?;
            delta_w += model.inter_symmetric(new_b, a_k)? - model.inter_symmetric(old_b, a_k)?;
        }

        let delta_g = delta_gintr - (delta_nprotons as f64) * mu + delta_w;
        let delta_g_over_rt = delta_g / rt;

        self.flips_done += 1;
        let accepted = metropolis_accept(delta_g_over_rt, self.rng.random::<f64>());
        if accepted {
            self.energy += delta_g;
            self.flips_accepted += 1;
        } else {
            self.vector.revert_site(site_a, old_a);
            self.vector.revert_site(site_b, old_b);
        }
        trace!("double move sites=({site_a},{site_b}) accepted={accepted} dG={delta_g:.4}");
        Ok(accepted)
    }

    /// Run `nmoves` trials (default `nsites + npairs`), each a single
    /// move if its draw falls below `nsites`, else a double move.
    pub fn run_scan(&mut self, model: &EnergyModel, ph: f64, nmoves: Option<u64>) -> Result<ScanCounters, McError> {
        self.require_linked()?;
        let nsites = self.vector.nsites() as u64;
        let npairs = self.vector.npairs() as u64;
        let total = nsites + npairs;
        let n = nmoves.unwrap_or(total);

        let before = (self.moves_done, self.moves_accepted, self.flips_done, self.flips_accepted);
        for _ in 0..n {
            let selector = self.rng.random_range(0..total);
            if selector < nsites {
                self.single_move(model, ph)?;
            } else {
                self.double_move(model, ph)?;
            }
        }
        Ok(ScanCounters {
            moves_done: self.moves_done - before.0,
            moves_accepted: self.moves_accepted - before.1,
            flips_done: self.flips_done - before.2,
            flips_accepted: self.flips_accepted - before.3,
        })
    }

    /// Randomize the working vector, seed `energy` from scratch, then run
    /// `nequil` scans without touching `probabilities`.
    pub fn equilibration(&mut self, model: &EnergyModel, ph: f64) -> Result<(), McError> {
        self.require_linked()?;
        self.vector.randomize(&mut self.rng);
        self.energy = model.calculate_microstate_energy(&self.vector, ph);
        for _ in 0..self.nequil {
            self.run_scan(model, ph, None)?;
        }
        self.state = EngineState::Equilibrated;
        Ok(())
    }

    /// Run `nprod` scans, sampling the active instance of every site into
    /// `probabilities` after each scan.
    pub fn production(&mut self, model: &EnergyModel, ph: f64) -> Result<(), McError> {
        if !matches!(self.state, EngineState::Equilibrated) {
            return Err(McError::NotEquilibrated);
        }
        self.state = EngineState::Producing;
        for p in self.probabilities.iter_mut() {
            *p = 0.0;
        }
        for _ in 0..self.nprod {
            self.run_scan(model, ph, None)?;
            for site in self.vector.sites() {
                self.probabilities[site.index_active] += 1.0;
            }
        }
        if self.nprod > 0 {
            for p in self.probabilities.iter_mut() {
                *p /= self.nprod as f64;
            }
        }
        self.state = EngineState::Done;
        Ok(())
    }
}
