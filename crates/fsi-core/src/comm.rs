//! Cross-process reduction facade.
//!
//! The coupling algorithm is written process-locally; every scalar that
//! steers it (relaxation factor, residual norm, convergence flag, least-squares
//! coefficients) is reduced through a [`Communicator`] before use so that all
//! processes holding a piece of a zone take the same decision.

use crate::field::{Vec3, local_dot, local_max_mag, local_sum_mag_sqr};
use crate::Real;

pub trait Communicator: Send + Sync {
    /// Rank of this process, 0-based.
    fn rank(&self) -> usize;

    /// Number of processes taking part in the coupling.
    fn n_procs(&self) -> usize;

    fn is_master(&self) -> bool {
        self.rank() == 0
    }

    fn global_sum(&self, local: Real) -> Real;

    /// In-place element-wise sum over all processes.
    fn global_sum_slice(&self, values: &mut [Real]);

    fn global_max(&self, local: Real) -> Real;

    fn global_min(&self, local: Real) -> Real;

    /// Value held by the master process, seen identically everywhere.
    fn global_broadcast_scalar(&self, value: Real) -> Real;
}

/// Single-process communicator: every reduction is the identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialComm;

impl Communicator for SerialComm {
    fn rank(&self) -> usize {
        0
    }

    fn n_procs(&self) -> usize {
        1
    }

    fn global_sum(&self, local: Real) -> Real {
        local
    }

    fn global_sum_slice(&self, _values: &mut [Real]) {}

    fn global_max(&self, local: Real) -> Real {
        local
    }

    fn global_min(&self, local: Real) -> Real {
        local
    }

    fn global_broadcast_scalar(&self, value: Real) -> Real {
        value
    }
}

/// Global `Σ a_i · b_i`.
pub fn global_dot(comm: &dyn Communicator, a: &[Vec3], b: &[Vec3]) -> Real {
    comm.global_sum(local_dot(a, b))
}

/// Global Euclidean norm of a distributed vector field.
pub fn global_norm(comm: &dyn Communicator, a: &[Vec3]) -> Real {
    comm.global_sum(local_sum_mag_sqr(a)).sqrt()
}

/// Global `max |a_i|`.
pub fn global_max_mag(comm: &dyn Communicator, a: &[Vec3]) -> Real {
    comm.global_max(local_max_mag(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pretends to be one of `n` processes that all hold identical data.
    struct ReplicatedComm {
        n: usize,
    }

    impl Communicator for ReplicatedComm {
        fn rank(&self) -> usize {
            0
        }
        fn n_procs(&self) -> usize {
            self.n
        }
        fn global_sum(&self, local: Real) -> Real {
            local * self.n as Real
        }
        fn global_sum_slice(&self, values: &mut [Real]) {
            for v in values {
                *v *= self.n as Real;
            }
        }
        fn global_max(&self, local: Real) -> Real {
            local
        }
        fn global_min(&self, local: Real) -> Real {
            local
        }
        fn global_broadcast_scalar(&self, value: Real) -> Real {
            value
        }
    }

    #[test]
    fn serial_reductions_are_identity() {
        let comm = SerialComm;
        assert_eq!(comm.global_sum(2.5), 2.5);
        assert_eq!(comm.global_max(-1.0), -1.0);
        assert!(comm.is_master());
        let mut v = [1.0, 2.0];
        comm.global_sum_slice(&mut v);
        assert_eq!(v, [1.0, 2.0]);
    }

    #[test]
    fn norm_goes_through_global_sum() {
        let a = vec![Vec3::new(3.0, 4.0, 0.0)];
        assert_eq!(global_norm(&SerialComm, &a), 5.0);
        let comm = ReplicatedComm { n: 4 };
        assert_eq!(global_norm(&comm, &a), 10.0);
        assert_eq!(global_dot(&comm, &a, &a), 100.0);
        assert_eq!(global_max_mag(&comm, &a), 5.0);
    }
}
