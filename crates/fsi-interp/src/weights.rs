//! Sparse interpolation weights.

use fsi_core::{FsiError, Real, Vec3, check_len};

/// One assembled weight row: `(source index, weight)` pairs.
pub type Row = Vec<(usize, Real)>;

/// Stand-in weight for rows whose geometric weight vanishes. Large enough to
/// survive normalisation without going subnormal.
pub(crate) const MIN_ROW_WEIGHT: Real = 1e-150;

/// True when the row carries at least one positive weight.
pub(crate) fn has_weight(row: &[(usize, Real)]) -> bool {
    row.iter().any(|&(_, w)| w > 0.0)
}

/// Row-compressed `n_target × n_source` weight matrix.
///
/// Row `i` holds entries `cols[offsets[i]..offsets[i+1]]` with matching
/// `vals`; columns within a row are sorted ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    n_source: usize,
    offsets: Vec<usize>,
    cols: Vec<usize>,
    vals: Vec<Real>,
}

impl WeightMatrix {
    /// Assemble from per-target rows. Duplicate columns within a row are
    /// merged and zero weights dropped.
    pub fn from_rows(n_source: usize, rows: Vec<Row>) -> Self {
        let mut offsets = Vec::with_capacity(rows.len() + 1);
        let mut cols = Vec::new();
        let mut vals = Vec::new();
        offsets.push(0);
        for mut row in rows {
            row.sort_by_key(|&(c, _)| c);
            let mut last: Option<usize> = None;
            for (c, w) in row {
                debug_assert!(c < n_source);
                if w == 0.0 {
                    continue;
                }
                if last == Some(c) {
                    if let Some(v) = vals.last_mut() {
                        *v += w;
                    }
                } else {
                    cols.push(c);
                    vals.push(w);
                    last = Some(c);
                }
            }
            offsets.push(cols.len());
        }
        Self {
            n_source,
            offsets,
            cols,
            vals,
        }
    }

    pub fn n_target(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn n_source(&self) -> usize {
        self.n_source
    }

    pub fn nnz(&self) -> usize {
        self.vals.len()
    }

    /// Entries of one target row.
    pub fn row(&self, target: usize) -> impl Iterator<Item = (usize, Real)> + '_ {
        let range = self.offsets[target]..self.offsets[target + 1];
        self.cols[range.clone()]
            .iter()
            .copied()
            .zip(self.vals[range].iter().copied())
    }

    pub fn row_sums(&self) -> Vec<Real> {
        (0..self.n_target())
            .map(|i| self.row(i).map(|(_, w)| w).sum())
            .collect()
    }

    pub fn column_sums(&self) -> Vec<Real> {
        let mut sums = vec![0.0; self.n_source];
        for (&c, &w) in self.cols.iter().zip(&self.vals) {
            sums[c] += w;
        }
        sums
    }

    /// Copy with every row scaled to sum to one. Rows summing to zero are
    /// left empty.
    pub fn row_normalised(&self) -> Self {
        let sums = self.row_sums();
        let mut out = self.clone();
        for (i, sum) in sums.iter().enumerate() {
            for k in out.offsets[i]..out.offsets[i + 1] {
                out.vals[k] = if *sum > 0.0 { out.vals[k] / sum } else { 0.0 };
            }
        }
        out
    }

    /// Copy with every column scaled to sum to one. Columns summing to zero
    /// are left empty.
    pub fn column_normalised(&self) -> Self {
        let sums = self.column_sums();
        let mut out = self.clone();
        for (k, &c) in out.cols.iter().enumerate() {
            out.vals[k] = if sums[c] > 0.0 {
                out.vals[k] / sums[c]
            } else {
                0.0
            };
        }
        out
    }

    /// `W * field` for a scalar field.
    pub fn apply_scalar(&self, field: &[Real]) -> Result<Vec<Real>, FsiError> {
        check_len(field, self.n_source, "interpolation source field")?;
        Ok((0..self.n_target())
            .map(|i| self.row(i).map(|(c, w)| w * field[c]).sum())
            .collect())
    }

    /// `W * field` for a vector field.
    pub fn apply_vector(&self, field: &[Vec3]) -> Result<Vec<Vec3>, FsiError> {
        check_len(field, self.n_source, "interpolation source field")?;
        Ok((0..self.n_target())
            .map(|i| {
                self.row(i)
                    .fold(Vec3::zeros(), |acc, (c, w)| acc + w * field[c])
            })
            .collect())
    }
}
