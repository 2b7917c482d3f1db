/// A titratable site: a contiguous range of global instance indices plus
/// the instance currently selected as "active".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub index_site: usize,
    pub index_first: usize,
    pub index_last: usize,
    pub index_active: usize,
    pub is_substate: bool,
}

impl Site {
    pub(crate) fn new(index_site: usize, index_first: usize, index_last: usize) -> Self {
        Self {
            index_site,
            index_first,
            index_last,
            index_active: index_first,
            is_substate: false,
        }
    }

    pub fn n_instances(&self) -> usize {
        self.index_last - self.index_first + 1
    }

    pub fn is_movable(&self) -> bool {
        self.index_last > self.index_first
    }

    pub fn local_index(&self) -> usize {
        self.index_active - self.index_first
    }
}

/// A strongly-interacting pair of sites, referenced by their ordinals in
/// the owning [`crate::StateVector`]'s `sites` table (not by pointer, so
/// the table can be cloned and resized freely).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairRef {
    pub site_a: usize,
    pub site_b: usize,
    pub w_max: f64,
}
