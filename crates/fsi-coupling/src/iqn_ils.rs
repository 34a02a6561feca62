//! Interface quasi-Newton with an inverse Jacobian from least squares
//! (IQN-ILS).
//!
//! Each outer iteration after the first adds the columns `v = r_k − r_{k−1}`
//! and `w = x̃_k − x̃_{k−1}`. The update solves `c = argmin |V c + r_k|` and
//! sets `x_{k+1} = x̃_k + W c`. Columns of the last `reuse` time steps are
//! kept alongside the current step's.

use std::collections::VecDeque;

use fsi_core::{Communicator, Real, Vec3, axpy, check_len, ensure_finite, local_dot, sub};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::{CouplingError, CouplingResult};
use crate::scheme::{CouplingScheme, relaxed};
use crate::settings::{CouplingSchemeKind, IqnSettings};

/// Secant columns gathered during one time step, newest last.
#[derive(Clone, Debug, Default)]
struct StepColumns {
    v: Vec<Vec<Vec3>>,
    w: Vec<Vec<Vec3>>,
}

impl StepColumns {
    fn is_empty(&self) -> bool {
        self.v.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct IqnIls {
    omega: Real,
    reuse: usize,
    settings: IqnSettings,
    current: StepColumns,
    /// Earlier steps, newest first.
    history: VecDeque<StepColumns>,
    residual_prev: Option<Vec<Vec3>>,
    x_tilde_prev: Option<Vec<Vec3>>,
    last_factor: Real,
}

impl IqnIls {
    pub fn new(omega: Real, reuse: usize, settings: IqnSettings) -> Self {
        Self {
            omega,
            reuse,
            settings,
            current: StepColumns::default(),
            history: VecDeque::new(),
            residual_prev: None,
            x_tilde_prev: None,
            last_factor: omega,
        }
    }

    /// Columns usable in the next update.
    pub fn n_columns(&self) -> usize {
        self.current.v.len() + self.history.iter().map(|s| s.v.len()).sum::<usize>()
    }

    /// All columns, newest first: the current step, then earlier steps.
    fn columns(&self) -> (Vec<&[Vec3]>, Vec<&[Vec3]>) {
        let mut v = Vec::new();
        let mut w = Vec::new();
        for (vi, wi) in self.current.v.iter().zip(&self.current.w).rev() {
            v.push(vi.as_slice());
            w.push(wi.as_slice());
        }
        for step in &self.history {
            for (vi, wi) in step.v.iter().zip(&step.w).rev() {
                v.push(vi.as_slice());
                w.push(wi.as_slice());
            }
        }
        (v, w)
    }

    /// Globally reduced Gram matrix `VᵀV` and right-hand side `−Vᵀr`.
    fn normal_equations(
        comm: &dyn Communicator,
        v: &[&[Vec3]],
        residual: &[Vec3],
    ) -> (DMatrix<Real>, DVector<Real>) {
        let n = v.len();
        // upper triangle then rhs, reduced in one call
        let mut packed = Vec::with_capacity(n * (n + 1) / 2 + n);
        for i in 0..n {
            for j in i..n {
                packed.push(local_dot(v[i], v[j]));
            }
        }
        for vi in v {
            packed.push(-local_dot(vi, residual));
        }
        comm.global_sum_slice(&mut packed);

        let mut gram = DMatrix::zeros(n, n);
        let mut k = 0;
        for i in 0..n {
            for j in i..n {
                gram[(i, j)] = packed[k];
                gram[(j, i)] = packed[k];
                k += 1;
            }
        }
        let rhs = DVector::from_column_slice(&packed[k..]);
        (gram, rhs)
    }

    /// Indices of columns kept after dropping those nearly dependent on
    /// newer ones.
    fn filter(&self, gram: &DMatrix<Real>) -> Vec<usize> {
        let tol = self.settings.filter_tolerance;
        let mut kept: Vec<usize> = Vec::new();
        for j in 0..gram.nrows() {
            let diag = gram[(j, j)];
            if diag <= 0.0 {
                continue;
            }
            let independent = if kept.is_empty() {
                diag
            } else {
                let sub_gram = gram.select_rows(&kept).select_columns(&kept);
                let coupling = DVector::from_iterator(kept.len(), kept.iter().map(|&i| gram[(i, j)]));
                match sub_gram.cholesky() {
                    Some(chol) => diag - coupling.dot(&chol.solve(&coupling)),
                    None => 0.0,
                }
            };
            if independent > tol * tol * diag {
                kept.push(j);
            }
        }
        kept
    }

    fn solve(&self, gram: DMatrix<Real>, rhs: DVector<Real>) -> CouplingResult<DVector<Real>> {
        let n = gram.nrows();
        let mean_diag = gram.trace() / n as Real;
        let regularised = gram + DMatrix::identity(n, n) * (self.settings.regularisation * mean_diag);
        if let Some(chol) = regularised.clone().cholesky() {
            return Ok(chol.solve(&rhs));
        }
        regularised.lu().solve(&rhs).ok_or_else(|| CouplingError::Numeric {
            what: "IQN-ILS least-squares system is singular".to_string(),
        })
    }
}

impl CouplingScheme for IqnIls {
    fn kind(&self) -> CouplingSchemeKind {
        CouplingSchemeKind::IqnIls
    }

    fn begin_time_step(&mut self) {
        let finished = std::mem::take(&mut self.current);
        if !finished.is_empty() {
            self.history.push_front(finished);
        }
        self.history.truncate(self.reuse);
        self.residual_prev = None;
        self.x_tilde_prev = None;
    }

    fn update(
        &mut self,
        comm: &dyn Communicator,
        x: &[Vec3],
        x_tilde: &[Vec3],
        residual: &[Vec3],
    ) -> CouplingResult<Vec<Vec3>> {
        check_len(x_tilde, x.len(), "solid displacement on fluid zone")?;
        check_len(residual, x.len(), "fsi residual")?;

        if let (Some(r_prev), Some(xt_prev)) = (&self.residual_prev, &self.x_tilde_prev) {
            self.current.v.push(sub(residual, r_prev));
            self.current.w.push(sub(x_tilde, xt_prev));
        }
        self.residual_prev = Some(residual.to_vec());
        self.x_tilde_prev = Some(x_tilde.to_vec());

        let (v, w) = self.columns();
        if v.is_empty() {
            self.last_factor = self.omega;
            return Ok(relaxed(x, residual, self.omega));
        }

        let (gram, rhs) = Self::normal_equations(comm, &v, residual);
        let kept = self.filter(&gram);
        if kept.is_empty() {
            self.last_factor = self.omega;
            return Ok(relaxed(x, residual, self.omega));
        }
        let gram = gram.select_rows(&kept).select_columns(&kept);
        let rhs = DVector::from_iterator(kept.len(), kept.iter().map(|&i| rhs[i]));
        let coeffs = self.solve(gram, rhs)?;
        let coeffs: Vec<Real> = coeffs
            .iter()
            .map(|&c| ensure_finite(comm.global_broadcast_scalar(c), "IQN-ILS coefficient"))
            .collect::<Result<_, _>>()?;
        debug!(
            columns = v.len(),
            kept = kept.len(),
            "IQN-ILS least-squares update"
        );

        let mut next = x_tilde.to_vec();
        for (&col, &c) in kept.iter().zip(&coeffs) {
            axpy(c, w[col], &mut next);
        }
        self.last_factor = 1.0;
        Ok(next)
    }

    fn relaxation_factor(&self) -> Real {
        self.last_factor
    }

    fn reset(&mut self) {
        self.current = StepColumns::default();
        self.history.clear();
        self.residual_prev = None;
        self.x_tilde_prev = None;
        self.last_factor = self.omega;
    }
}
