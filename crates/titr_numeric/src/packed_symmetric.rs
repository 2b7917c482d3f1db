use std::fmt;

#[derive(Debug)]
pub enum NumericError {
    IndexOutOfRange { index: usize, bound: usize },
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::IndexOutOfRange { index, bound } => {
                write!(f, "index {index} out of range, expected < {bound}")
            }
        }
    }
}

impl std::error::Error for NumericError {}

/// Packed lower-triangular storage for a symmetric N×N matrix, holding
/// `N(N+1)/2` elements instead of `N^2`. Element `(i, j)` with `i >= j` is
/// stored at offset `i(i+1)/2 + j`; lookups for arbitrary `(i, j)` are
/// normalized to `(max(i, j), min(i, j))`.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedSymmetricMatrix {
    data: Vec<f64>,
    n: usize,
}

fn offset(i: usize, j: usize) -> usize {
    let (hi, lo) = if i >= j { (i, j) } else { (j, i) };
    hi * (hi + 1) / 2 + lo
}

impl PackedSymmetricMatrix {
    /// A zero-filled packed matrix for `n` instances.
    pub fn zeros(n: usize) -> Self {
        Self {
            data: vec![0.0; n * (n + 1) / 2],
            n,
        }
    }

    /// Build by averaging the lower triangle of a dense, not-necessarily
    /// symmetric `n x n` matrix: `packed[i,j] = 0.5 * (dense(i,j) + dense(j,i))`.
    pub fn from_dense_symmetrized<F>(n: usize, dense: F) -> Self
    where
        F: Fn(usize, usize) -> f64,
    {
        let mut out = Self::zeros(n);
        for i in 0..n {
            for j in 0..=i {
                let value = 0.5 * (dense(i, j) + dense(j, i));
                out.data[offset(i, j)] = value;
            }
        }
        out
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> Result<f64, NumericError> {
        self.check_bounds(i, j)?;
        Ok(self.data[offset(i, j)])
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) -> Result<(), NumericError> {
        self.check_bounds(i, j)?;
        let off = offset(i, j);
        self.data[off] = value;
        Ok(())
    }

    fn check_bounds(&self, i: usize, j: usize) -> Result<(), NumericError> {
        if i >= self.n {
            return Err(NumericError::IndexOutOfRange { index: i, bound: self.n });
        }
        if j >= self.n {
            return Err(NumericError::IndexOutOfRange { index: j, bound: self.n });
        }
        Ok(())
    }

    /// Row slice `[i*(i+1)/2 .. i*(i+1)/2 + i + 1)`, matching the source's
    /// `EnergyModel_RowPointer` offset: the j-th element (for `j <= i`) is
    /// `W[i, j]`.
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * (i + 1) / 2;
        &self.data[start..start + i + 1]
    }

    pub fn reset(&mut self) {
        self.data.iter_mut().for_each(|v| *v = 0.0);
    }

    pub fn scale(&mut self, alpha: f64) {
        self.data.iter_mut().for_each(|v| *v *= alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetrizes_from_asymmetric_dense() {
        let dense = [[0.0, 1.0], [0.8, 0.0]];
        let packed = PackedSymmetricMatrix::from_dense_symmetrized(2, |i, j| dense[i][j]);
        let expected = 0.5 * (1.0 + 0.8);
        assert_eq!(packed.get(0, 1).unwrap(), expected);
        assert_eq!(packed.get(1, 0).unwrap(), expected);
    }

    #[test]
    fn out_of_range_is_error() {
        let packed = PackedSymmetricMatrix::zeros(2);
        assert!(packed.get(2, 0).is_err());
    }

    #[test]
    fn reset_and_scale() {
        let mut packed = PackedSymmetricMatrix::from_dense_symmetrized(2, |_, _| 2.0);
        packed.scale(3.0);
        assert_eq!(packed.get(1, 1).unwrap(), 6.0);
        packed.reset();
        assert_eq!(packed.get(1, 1).unwrap(), 0.0);
    }

    #[test]
    fn row_matches_packed_offsets() {
        let packed = PackedSymmetricMatrix::from_dense_symmetrized(3, |i, j| (i * 10 + j) as f64);
        let row = packed.row(2);
        assert_eq!(row.len(), 3);
        assert_eq!(row[0], packed.get(2, 0).unwrap());
        assert_eq!(row[1], packed.get(2, 1).unwrap());
        assert_eq!(row[2], packed.get(2, 2).unwrap());
    }
}
