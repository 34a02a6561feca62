//! Interface field arithmetic.
//!
//! Interface fields are dense slices ordered by a zone's local point or face
//! numbering. All helpers here are process-local; anything that must agree
//! across processes goes through [`crate::comm`].

use crate::{FsiError, FsiResult, Real};
use nalgebra::Vector3;

/// Point, displacement and traction vectors.
pub type Vec3 = Vector3<Real>;

/// Check that an interface field has exactly one entry per zone point/face.
pub fn check_len<T>(field: &[T], expected: usize, what: &'static str) -> FsiResult<()> {
    if field.len() != expected {
        return Err(FsiError::SizeMismatch {
            what,
            expected,
            actual: field.len(),
        });
    }
    Ok(())
}

pub fn zero_vectors(n: usize) -> Vec<Vec3> {
    vec![Vec3::zeros(); n]
}

/// Element-wise `a - b`.
pub fn sub(a: &[Vec3], b: &[Vec3]) -> Vec<Vec3> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// `y += alpha * x`
pub fn axpy(alpha: Real, x: &[Vec3], y: &mut [Vec3]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// Process-local `Σ a_i · b_i`.
pub fn local_dot(a: &[Vec3], b: &[Vec3]) -> Real {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x.dot(y)).sum()
}

/// Process-local `Σ |a_i|²`.
pub fn local_sum_mag_sqr(a: &[Vec3]) -> Real {
    a.iter().map(|v| v.norm_squared()).sum()
}

/// Process-local `max |a_i|`, zero for an empty field.
pub fn local_max_mag(a: &[Vec3]) -> Real {
    a.iter().map(|v| v.norm()).fold(0.0, Real::max)
}

/// Reject the first non-finite component of a vector field.
pub fn ensure_vectors_finite(values: &[Vec3], what: &'static str) -> FsiResult<()> {
    for v in values {
        for c in v.iter() {
            crate::ensure_finite(*c, what)?;
        }
    }
    Ok(())
}
