use rand::RngCore;

use crate::error::StateError;
use crate::site::{PairRef, Site};

const MOVE_REDRAW_LIMIT: u32 = 10_000;

/// Mixed-radix counter over per-site instance indices: one "digit" per
/// site, with radix equal to the site's instance count. Also holds an
/// optional substate view (a restricted odometer over a subset of sites)
/// and a pairs table of strongly-interacting site pairs used by
/// `titr_mc`'s double moves.
#[derive(Debug, Clone)]
pub struct StateVector {
    sites: Vec<Site>,
    substate_sites: Option<Vec<usize>>,
    pairs: Vec<PairRef>,
    movable_sites: Vec<usize>,
}

impl StateVector {
    /// Allocate a vector of `nsites` placeholder sites (each spanning the
    /// single instance `0`); callers must configure every site with
    /// [`StateVector::set_site`] before use.
    pub fn allocate(nsites: usize) -> Self {
        let sites = (0..nsites).map(|i| Site::new(i, 0, 0)).collect();
        Self {
            sites,
            substate_sites: None,
            pairs: Vec::new(),
            movable_sites: Vec::new(),
        }
    }

    pub fn nsites(&self) -> usize {
        self.sites.len()
    }

    pub fn npairs(&self) -> usize {
        self.pairs.len()
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn pairs(&self) -> &[PairRef] {
        &self.pairs
    }

    fn check_site_index(&self, index_site: usize) -> Result<(), StateError> {
        if index_site >= self.sites.len() {
            return Err(StateError::IndexOutOfRange { index: index_site, bound: self.sites.len() });
        }
        Ok(())
    }

    /// Store `[indexFirst, indexLast]` for `indexSite`, reset its active
    /// instance to `indexFirst`, and mark it as not in the substate.
    pub fn set_site(&mut self, index_site: usize, index_first: usize, index_last: usize) -> Result<(), StateError> {
        self.check_site_index(index_site)?;
        self.sites[index_site] = Site::new(index_site, index_first, index_last);
        self.rebuild_movable_cache();
        Ok(())
    }

    fn rebuild_movable_cache(&mut self) {
        self.movable_sites = self
            .sites
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_movable())
            .map(|(i, _)| i)
            .collect();
    }

    /// Allocate the substate view over `nssites` sites. Fails if a
    /// substate is already allocated (callers must not silently leak the
    /// previous one).
    pub fn allocate_substate(&mut self, nssites: usize) -> Result<(), StateError> {
        if self.substate_sites.is_some() {
            return Err(StateError::SubstateAlreadyAllocated);
        }
        let mut substate = Vec::new();
        substate.try_reserve_exact(nssites).map_err(|_| StateError::AllocationFailure)?;
        substate.resize(nssites, 0);
        self.substate_sites = Some(substate);
        Ok(())
    }

    pub fn set_substate_item(&mut self, selected_site_index: usize, index: usize) -> Result<(), StateError> {
        self.check_site_index(selected_site_index)?;
        let slength = self
            .substate_sites
            .as_ref()
            .map(|v| v.len())
            .ok_or(StateError::IndexOutOfRange { index, bound: 0 })?;
        if index >= slength {
            return Err(StateError::IndexOutOfRange { index, bound: slength });
        }
        self.substate_sites.as_mut().unwrap()[index] = selected_site_index;
        self.sites[selected_site_index].is_substate = true;
        Ok(())
    }

    pub fn get_substate_item(&self, index: usize) -> Result<usize, StateError> {
        let substate = self.substate_sites.as_ref().ok_or(StateError::IndexOutOfRange { index, bound: 0 })?;
        substate
            .get(index)
            .copied()
            .ok_or(StateError::IndexOutOfRange { index, bound: substate.len() })
    }

    /// (Re)allocate the pairs table to exactly `npairs` entries. Unlike
    /// the substate, pairs may be reallocated freely: a previous table is
    /// simply replaced (this is what `FindPairs`'s fill run relies on).
    pub fn allocate_pairs(&mut self, npairs: usize) -> Result<(), StateError> {
        let mut pairs = Vec::new();
        pairs.try_reserve_exact(npairs).map_err(|_| StateError::AllocationFailure)?;
        pairs.resize(npairs, PairRef { site_a: 0, site_b: 0, w_max: 0.0 });
        self.pairs = pairs;
        Ok(())
    }

    pub fn set_pair(&mut self, index_pair: usize, site_a: usize, site_b: usize, w_max: f64) -> Result<(), StateError> {
        self.check_site_index(site_a)?;
        self.check_site_index(site_b)?;
        if index_pair >= self.pairs.len() {
            return Err(StateError::IndexOutOfRange { index: index_pair, bound: self.pairs.len() });
        }
        self.pairs[index_pair] = PairRef { site_a, site_b, w_max };
        Ok(())
    }

    pub fn get_pair(&self, index_pair: usize) -> Result<PairRef, StateError> {
        self.pairs
            .get(index_pair)
            .copied()
            .ok_or(StateError::IndexOutOfRange { index: index_pair, bound: self.pairs.len() })
    }

    pub fn reset(&mut self) {
        for site in &mut self.sites {
            site.index_active = site.index_first;
        }
    }

    pub fn reset_to_maximum(&mut self) {
        for site in &mut self.sites {
            site.index_active = site.index_last;
        }
    }

    pub fn reset_substate(&mut self) {
        if let Some(substate) = &self.substate_sites {
            for &index_site in substate {
                self.sites[index_site].index_active = self.sites[index_site].index_first;
            }
        }
    }

    pub fn randomize<R: RngCore + ?Sized>(&mut self, rng: &mut R) {
        for site in &mut self.sites {
            let span = site.n_instances() as u32;
            site.index_active = site.index_first + (rng.next_u32() % span) as usize;
        }
    }

    pub fn get_item(&self, index_site: usize) -> Result<usize, StateError> {
        self.check_site_index(index_site)?;
        Ok(self.sites[index_site].local_index())
    }

    pub fn set_item(&mut self, index_site: usize, local_value: usize) -> Result<(), StateError> {
        self.check_site_index(index_site)?;
        let site = &mut self.sites[index_site];
        let actual = site.index_first + local_value;
        if actual < site.index_first || actual > site.index_last {
            return Err(StateError::ValueError { value: actual, first: site.index_first, last: site.index_last });
        }
        site.index_active = actual;
        Ok(())
    }

    pub fn get_actual_item(&self, index_site: usize) -> Result<usize, StateError> {
        self.check_site_index(index_site)?;
        Ok(self.sites[index_site].index_active)
    }

    pub fn set_actual_item(&mut self, index_site: usize, instance_global_index: usize) -> Result<(), StateError> {
        self.check_site_index(index_site)?;
        let site = &mut self.sites[index_site];
        if instance_global_index < site.index_first || instance_global_index > site.index_last {
            return Err(StateError::ValueError {
                value: instance_global_index,
                first: site.index_first,
                last: site.index_last,
            });
        }
        site.index_active = instance_global_index;
        Ok(())
    }

    /// Mixed-radix successor. Returns `false` (and rewinds everything to
    /// the all-minimum state) once the all-maximum state has been passed.
    pub fn increment(&mut self) -> bool {
        for site in &mut self.sites {
            if site.index_active < site.index_last {
                site.index_active += 1;
                return true;
            } else {
                site.index_active = site.index_first;
            }
        }
        false
    }

    /// Same rule as [`StateVector::increment`], restricted to the sites
    /// registered in the substate view; sites outside the substate keep
    /// their current value.
    pub fn increment_substate(&mut self) -> bool {
        let Some(substate) = self.substate_sites.clone() else {
            return false;
        };
        for index_site in substate {
            let site = &mut self.sites[index_site];
            if site.index_active < site.index_last {
                site.index_active += 1;
                return true;
            } else {
                site.index_active = site.index_first;
            }
        }
        false
    }

    fn draw_different<R: RngCore + ?Sized>(rng: &mut R, first: usize, last: usize, current: usize) -> usize {
        let span = (last - first + 1) as u32;
        let mut candidate = current;
        for _ in 0..MOVE_REDRAW_LIMIT {
            candidate = first + (rng.next_u32() % span) as usize;
            if candidate != current {
                return candidate;
            }
        }
        candidate
    }

    /// Choose a uniformly random *movable* site (one with more than one
    /// instance — see the module docs for why single-instance sites are
    /// excluded) and draw a new active instance different from the
    /// current one. Returns `(site_index, old_active)` so the caller can
    /// revert on a rejected Metropolis trial.
    pub fn move_single<R: RngCore + ?Sized>(&mut self, rng: &mut R) -> Result<(usize, usize), StateError> {
        if self.movable_sites.is_empty() {
            return Err(StateError::NoMovableSites);
        }
        let pick = (rng.next_u32() as usize) % self.movable_sites.len();
        let site_index = self.movable_sites[pick];
        let site = &mut self.sites[site_index];
        let old_active = site.index_active;
        let new_active = Self::draw_different(rng, site.index_first, site.index_last, old_active);
        site.index_active = new_active;
        Ok((site_index, old_active))
    }

    /// Choose a uniformly random pair and draw new active instances for
    /// both endpoint sites, independently, each different from its
    /// current value. Returns `(site_a, site_b, old_a, old_b)`.
    pub fn double_move<R: RngCore + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<(usize, usize, usize, usize), StateError> {
        if self.pairs.is_empty() {
            return Err(StateError::NoPairs);
        }
        let pick = (rng.next_u32() as usize) % self.pairs.len();
        let pair = self.pairs[pick];

        let (old_a, new_a) = {
            let site = &self.sites[pair.site_a];
            let old = site.index_active;
            (old, Self::draw_different(rng, site.index_first, site.index_last, old))
        };
        let (old_b, new_b) = {
            let site = &self.sites[pair.site_b];
            let old = site.index_active;
            (old, Self::draw_different(rng, site.index_first, site.index_last, old))
        };

        self.sites[pair.site_a].index_active = new_a;
        self.sites[pair.site_b].index_active = new_b;
        Ok((pair.site_a, pair.site_b, old_a, old_b))
    }

    /// Restore `site`'s active instance without going through the
    /// Metropolis bookkeeping, used by `titr_mc` to revert a rejected
    /// move.
    pub fn revert_site(&mut self, site_index: usize, old_active: usize) {
        self.sites[site_index].index_active = old_active;
    }

    pub fn copy_to(&self, other: &mut StateVector) -> Result<(), StateError> {
        if self.sites.len() != other.sites.len() {
            return Err(StateError::NonConformableSizes {
                expected: self.sites.len(),
                found: other.sites.len(),
            });
        }
        other.sites = self.sites.clone();
        other.substate_sites = self.substate_sites.clone();
        other.pairs = self.pairs.clone();
        other.movable_sites = self.movable_sites.clone();
        Ok(())
    }
}
