use std::fs::File;
use std::io::{stdin, BufReader, Read as _};

use anyhow::{anyhow, Result};
use serde::Deserialize;

use titr_energy::EnergyModel;

/// A single site's contiguous instance range, as it appears in the
/// model JSON's `sites` array.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteSpec {
    pub first: usize,
    pub last: usize,
}

/// The on-disk schema consumed by `titr-exact` and `titr-mc`: one entry
/// per titratable site plus flat, instance-indexed arrays for protons,
/// intrinsic energies, optional unfolded model energies, and the dense
/// (not necessarily symmetric) interaction matrix.
#[derive(Debug, Clone, Deserialize)]
pub struct TitrationModel {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    pub sites: Vec<SiteSpec>,
    pub protons: Vec<u32>,
    pub intrinsic: Vec<f64>,
    #[serde(default)]
    pub models: Option<Vec<f64>>,
    pub interactions: Vec<Vec<f64>>,
}

fn default_temperature() -> f64 {
    298.15
}

impl TitrationModel {
    pub fn ninstances(&self) -> usize {
        self.protons.len()
    }

    pub fn nsites(&self) -> usize {
        self.sites.len()
    }

    fn validate(&self) -> Result<()> {
        let n = self.ninstances();
        if self.intrinsic.len() != n {
            return Err(anyhow!("intrinsic has {} entries, expected {n}", self.intrinsic.len()));
        }
        if self.interactions.len() != n || self.interactions.iter().any(|row| row.len() != n) {
            return Err(anyhow!("interactions must be a dense {n}x{n} matrix"));
        }
        if let Some(models) = &self.models {
            if models.len() != n {
                return Err(anyhow!("models has {} entries, expected {n}", models.len()));
            }
        }
        let covered: usize = self.sites.iter().map(|s| s.last - s.first + 1).sum();
        if covered != n {
            return Err(anyhow!("site ranges cover {covered} instances, expected {n}"));
        }
        Ok(())
    }

    /// Build a populated, symmetrized [`EnergyModel`] from this schema.
    pub fn build(&self) -> Result<EnergyModel> {
        self.validate()?;
        let mut model = EnergyModel::new(self.nsites(), self.ninstances());
        model.set_temperature(self.temperature);
        for (index_site, site) in self.sites.iter().enumerate() {
            model.set_site(index_site, site.first, site.last)?;
        }
        for (i, &p) in self.protons.iter().enumerate() {
            model.set_protons(i, p)?;
        }
        for (i, &g) in self.intrinsic.iter().enumerate() {
            model.set_gintr(i, g)?;
        }
        if let Some(models) = &self.models {
            for (i, &g) in models.iter().enumerate() {
                model.set_gmodel(i, g)?;
            }
        }
        for (i, row) in self.interactions.iter().enumerate() {
            for (j, &w) in row.iter().enumerate() {
                model.set_interaction(i, j, w)?;
            }
        }
        model.symmetrize_interactions();
        Ok(model)
    }
}

/// Read a [`TitrationModel`] from a file path, or from stdin if `path`
/// is `"-"`.
pub fn load_model(path: &str) -> Result<TitrationModel> {
    let mut text = String::new();
    if path == "-" {
        stdin().read_to_string(&mut text)?;
    } else {
        BufReader::new(File::open(path)?).read_to_string(&mut text)?;
    }
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_site_json() -> &'static str {
        r#"{
            "temperature": 298.15,
            "sites": [{"first": 0, "last": 1}],
            "protons": [0, 1],
            "intrinsic": [0.0, -3.5],
            "interactions": [[0.0, 0.0], [0.0, 0.0]]
        }"#
    }

    #[test]
    fn parses_minimal_model() {
        let spec: TitrationModel = serde_json::from_str(single_site_json()).unwrap();
        assert_eq!(spec.nsites(), 1);
        assert_eq!(spec.ninstances(), 2);
        assert!(spec.models.is_none());
    }

    #[test]
    fn builds_energy_model() {
        let spec: TitrationModel = serde_json::from_str(single_site_json()).unwrap();
        let model = spec.build().unwrap();
        assert_eq!(model.nsites(), 1);
        assert_eq!(model.ninstances(), 2);
        assert_eq!(model.nstates(), 2);
    }

    #[test]
    fn rejects_mismatched_interaction_matrix() {
        let mut spec: TitrationModel = serde_json::from_str(single_site_json()).unwrap();
        spec.interactions = vec![vec![0.0]];
        assert!(spec.build().is_err());
    }

    #[test]
    fn rejects_site_ranges_that_miss_instances() {
        let mut spec: TitrationModel = serde_json::from_str(single_site_json()).unwrap();
        spec.sites = vec![SiteSpec { first: 0, last: 0 }];
        assert!(spec.build().is_err());
    }
}
