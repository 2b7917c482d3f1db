use log::{debug, trace, warn};
use ndarray::Array2;

use titr_numeric::PackedSymmetricMatrix;
use titr_state::{Site, StateVector};

use crate::constants::{proton_chemical_potential, ANALYTIC_STATES, CONSTANT_MOLAR_GAS_KCAL_MOL};
use crate::error::EnergyError;

/// Which energy expression to evaluate: the folded state (intrinsic
/// energies plus pairwise interactions) or the unfolded reference state
/// (model energies, no interactions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyKind {
    Folded,
    Unfolded,
}

/// Owns the per-instance energy tables, the symmetrized interaction
/// matrix, computed probabilities, and a private [`StateVector`] used
/// for exact enumeration and pair discovery. Does not own an RNG: that
/// lives on `titr_mc::MCEngine`.
#[derive(Debug, Clone)]
pub struct EnergyModel {
    protons: Vec<u32>,
    intrinsic: Vec<f64>,
    models: Vec<f64>,
    models_set: bool,
    interactions: Array2<f64>,
    symmetricmatrix: PackedSymmetricMatrix,
    probabilities: Vec<f64>,
    vector: StateVector,
    nstates: u64,
    ninstances: usize,
    temperature: f64,
}

impl EnergyModel {
    pub fn new(nsites: usize, ninstances: usize) -> Self {
        Self {
            protons: vec![0; ninstances],
            intrinsic: vec![0.0; ninstances],
            models: vec![0.0; ninstances],
            models_set: false,
            interactions: Array2::zeros((ninstances, ninstances)),
            symmetricmatrix: PackedSymmetricMatrix::zeros(ninstances),
            probabilities: vec![0.0; ninstances],
            vector: StateVector::allocate(nsites),
            nstates: 0,
            ninstances,
            temperature: 298.15,
        }
    }

    pub fn nsites(&self) -> usize {
        self.vector.nsites()
    }

    pub fn ninstances(&self) -> usize {
        self.ninstances
    }

    pub fn nstates(&self) -> u64 {
        self.nstates
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
    }

    pub fn vector(&self) -> &StateVector {
        &self.vector
    }

    pub fn vector_mut(&mut self) -> &mut StateVector {
        &mut self.vector
    }

    fn check_instance_index(&self, index: usize) -> Result<(), EnergyError> {
        if index >= self.ninstances {
            return Err(EnergyError::IndexOutOfRange { index, bound: self.ninstances });
        }
        Ok(())
    }

    /// Configure a site's instance range and refresh `nstates` (the
    /// product, over sites, of each site's instance count).
    pub fn set_site(&mut self, index_site: usize, index_first: usize, index_last: usize) -> Result<(), EnergyError> {
        self.vector.set_site(index_site, index_first, index_last)?;
        self.nstates = self.vector.sites().iter().map(|s| s.n_instances() as u64).product();
        Ok(())
    }

    pub fn set_protons(&mut self, index: usize, value: u32) -> Result<(), EnergyError> {
        self.check_instance_index(index)?;
        self.protons[index] = value;
        Ok(())
    }

    pub fn protons(&self, index: usize) -> Result<u32, EnergyError> {
        self.check_instance_index(index)?;
        Ok(self.protons[index])
    }

    pub fn set_gintr(&mut self, index: usize, value: f64) -> Result<(), EnergyError> {
        self.check_instance_index(index)?;
        self.intrinsic[index] = value;
        Ok(())
    }

    pub fn gintr(&self, index: usize) -> Result<f64, EnergyError> {
        self.check_instance_index(index)?;
        Ok(self.intrinsic[index])
    }

    pub fn set_gmodel(&mut self, index: usize, value: f64) -> Result<(), EnergyError> {
        self.check_instance_index(index)?;
        self.models[index] = value;
        self.models_set = true;
        Ok(())
    }

    pub fn gmodel(&self, index: usize) -> Result<f64, EnergyError> {
        self.check_instance_index(index)?;
        Ok(self.models[index])
    }

    pub fn set_interaction(&mut self, i: usize, j: usize, value: f64) -> Result<(), EnergyError> {
        self.check_instance_index(i)?;
        self.check_instance_index(j)?;
        self.interactions[[i, j]] = value;
        Ok(())
    }

    pub fn interaction(&self, i: usize, j: usize) -> Result<f64, EnergyError> {
        self.check_instance_index(i)?;
        self.check_instance_index(j)?;
        Ok(self.interactions[[i, j]])
    }

    pub fn probability(&self, index: usize) -> Result<f64, EnergyError> {
        self.check_instance_index(index)?;
        Ok(self.probabilities[index])
    }

    // --- 4.2: interaction handling -----------------------------------

    /// `dev(i,j) = 0.5*(W_ij + W_ji) - W_ij`; symmetric iff every
    /// deviation is within `tolerance`.
    pub fn deviation(&self, i: usize, j: usize) -> Result<f64, EnergyError> {
        self.check_instance_index(i)?;
        self.check_instance_index(j)?;
        let wij = self.interactions[[i, j]];
        let wji = self.interactions[[j, i]];
        Ok(0.5 * (wij + wji) - wij)
    }

    pub fn check_interactions_symmetric(&self, tolerance: f64) -> (bool, f64) {
        let mut max_dev = 0.0_f64;
        for i in 0..self.ninstances {
            for j in 0..self.ninstances {
                let dev = self.deviation(i, j).expect("in-range indices").abs();
                if dev > max_dev {
                    max_dev = dev;
                }
            }
        }
        (max_dev <= tolerance, max_dev)
    }

    pub fn symmetrize_interactions(&mut self) {
        self.symmetricmatrix =
            PackedSymmetricMatrix::from_dense_symmetrized(self.ninstances, |i, j| self.interactions[[i, j]]);
    }

    pub fn reset_interactions(&mut self) {
        self.symmetricmatrix.reset();
    }

    pub fn scale_interactions(&mut self, alpha: f64) {
        self.symmetricmatrix.scale(alpha);
    }

    pub fn inter_symmetric(&self, i: usize, j: usize) -> Result<f64, EnergyError> {
        self.check_instance_index(i)?;
        self.check_instance_index(j)?;
        Ok(self.symmetricmatrix.get(i, j).expect("checked above"))
    }

    // --- 4.3: microstate energy ---------------------------------------

    pub fn calculate_microstate_energy(&self, vector: &StateVector, ph: f64) -> f64 {
        let mu = proton_chemical_potential(self.temperature, ph);
        let mut gintr = 0.0;
        let mut nprotons: i64 = 0;
        let mut w = 0.0;
        let sites = vector.sites();
        for (i, site) in sites.iter().enumerate() {
            let a_i = site.index_active;
            gintr += self.intrinsic[a_i];
            nprotons += self.protons[a_i] as i64;
            for inner in &sites[..i] {
                w += self.symmetricmatrix.get(a_i, inner.index_active).expect("in-range instance indices");
            }
        }
        gintr - (nprotons as f64) * mu + w
    }

    pub fn calculate_microstate_energy_unfolded(&self, vector: &StateVector, ph: f64) -> Result<f64, EnergyError> {
        if !self.models_set {
            return Err(EnergyError::MissingModels);
        }
        let mu = proton_chemical_potential(self.temperature, ph);
        let mut gmodel = 0.0;
        let mut nprotons: i64 = 0;
        for site in vector.sites() {
            let a_i = site.index_active;
            gmodel += self.models[a_i];
            nprotons += self.protons[a_i] as i64;
        }
        Ok(gmodel - (nprotons as f64) * mu)
    }

    fn microstate_energy_for(&self, vector: &StateVector, ph: f64, kind: EnergyKind) -> Result<f64, EnergyError> {
        match kind {
            EnergyKind::Folded => Ok(self.calculate_microstate_energy(vector, ph)),
            EnergyKind::Unfolded => self.calculate_microstate_energy_unfolded(vector, ph),
        }
    }

    // --- 4.4: exact enumeration ----------------------------------------

    fn guard_analytic_states(&self) -> Result<(), EnergyError> {
        if self.nstates > ANALYTIC_STATES {
            warn!("nstates {} exceeds ANALYTIC_STATES cap {ANALYTIC_STATES}; refusing exact enumeration", self.nstates);
            return Err(EnergyError::TooManyStates { nstates: self.nstates, cap: ANALYTIC_STATES });
        }
        Ok(())
    }

    /// Generic partition-function walk: resets the private vector, visits
    /// every microstate once, and returns `(Z, bfactors)` with `bfactors`
    /// already shifted by the caller's `gzero` and by the minimum energy
    /// observed during the walk, then exponentiated.
    pub fn calculate_z(&mut self, ph: f64, gzero: f64, kind: EnergyKind) -> Result<(f64, Vec<f64>), EnergyError> {
        self.guard_analytic_states()?;
        let rt = CONSTANT_MOLAR_GAS_KCAL_MOL * self.temperature;
        let n = self.nstates as usize;
        debug!("calculate_z: kind={kind:?} ph={ph} gzero={gzero} nstates={n}");

        self.vector.reset();
        let mut shifted = Vec::with_capacity(n);
        let mut gmin = f64::INFINITY;
        for _ in 0..n {
            let g = self.microstate_energy_for(&self.vector, ph, kind)? - gzero;
            trace!("microstate shifted energy g={g:.6}");
            if g < gmin {
                gmin = g;
            }
            shifted.push(g);
            self.vector.increment();
        }

        let mut z = 0.0;
        for g in shifted.iter_mut() {
            *g = (-(*g - gmin) / rt).exp();
            z += *g;
        }
        debug!("calculate_z: kind={kind:?} gmin={gmin:.6} z={z:.6e}");
        Ok((z, shifted))
    }

    pub fn calculate_z_folded(&mut self, ph: f64, gzero: f64) -> Result<(f64, Vec<f64>), EnergyError> {
        self.calculate_z(ph, gzero, EnergyKind::Folded)
    }

    pub fn calculate_z_unfolded(&mut self, ph: f64, gzero: f64) -> Result<(f64, Vec<f64>), EnergyError> {
        self.calculate_z(ph, gzero, EnergyKind::Unfolded)
    }

    /// Accumulate `bfactors` into `probabilities` over a fresh walk of
    /// the private vector, then normalize by `z`.
    pub fn calculate_probabilities_from_z(&mut self, z: f64, bfactors: &[f64]) {
        debug!("calculate_probabilities_from_z: z={z:.6e} nstates={}", bfactors.len());
        for p in self.probabilities.iter_mut() {
            *p = 0.0;
        }
        self.vector.reset();
        for &bf in bfactors {
            for site in self.vector.sites() {
                trace!("accumulate instance={} bf={bf:.6e}", site.index_active);
                self.probabilities[site.index_active] += bf;
            }
            self.vector.increment();
        }
        for p in self.probabilities.iter_mut() {
            *p /= z;
        }
    }

    pub fn calculate_probabilities_analytically(&mut self, ph: f64) -> Result<(), EnergyError> {
        let (z, bfactors) = self.calculate_z(ph, 0.0, EnergyKind::Folded)?;
        self.calculate_probabilities_from_z(z, &bfactors);
        Ok(())
    }

    pub fn calculate_probabilities_analytically_unfolded(&mut self, ph: f64) -> Result<(), EnergyError> {
        let (z, bfactors) = self.calculate_z(ph, 0.0, EnergyKind::Unfolded)?;
        self.calculate_probabilities_from_z(z, &bfactors);
        Ok(())
    }

    /// For each site of `vector`, select the instance with the largest
    /// computed probability.
    pub fn state_vector_from_probabilities(&self, vector: &mut StateVector) -> Result<(), EnergyError> {
        if vector.nsites() != self.vector.nsites() {
            return Err(EnergyError::NonConformableSizes { expected: self.vector.nsites(), found: vector.nsites() });
        }
        for i in 0..vector.nsites() {
            let site = vector.sites()[i];
            let mut best_index = site.index_first;
            let mut best_p = f64::NEG_INFINITY;
            for idx in site.index_first..=site.index_last {
                if self.probabilities[idx] > best_p {
                    best_p = self.probabilities[idx];
                    best_index = idx;
                }
            }
            vector.set_actual_item(i, best_index)?;
        }
        Ok(())
    }

    // --- 4.5: pair discovery --------------------------------------------

    pub fn find_max_interaction(&self, site: &Site, other: &Site) -> f64 {
        let mut wmax = 0.0_f64;
        for i in site.index_first..=site.index_last {
            for j in other.index_first..=other.index_last {
                let w = self.symmetricmatrix.get(i, j).expect("in-range instance indices").abs();
                if w > wmax {
                    wmax = w;
                }
            }
        }
        wmax
    }

    /// `npairs <= 0` is a dry run: return the count without touching the
    /// pairs table. `npairs > 0` (re)allocates the table to exactly that
    /// size and fills it, matching the source's two-phase use.
    pub fn find_pairs(&mut self, limit: f64, npairs: i64) -> Result<i64, EnergyError> {
        if npairs > 0 {
            self.vector.allocate_pairs(npairs as usize)?;
        }
        let nsites = self.vector.nsites();
        let mut nfound = 0_i64;
        for i in 0..nsites {
            for j in 0..i {
                let site_i = self.vector.sites()[i];
                let site_j = self.vector.sites()[j];
                let wmax = self.find_max_interaction(&site_i, &site_j);
                if wmax >= limit {
                    if npairs > 0 {
                        self.vector.set_pair(nfound as usize, i, j, wmax).expect("pair index within allocated table");
                    }
                    nfound += 1;
                }
            }
        }
        Ok(nfound)
    }
}
