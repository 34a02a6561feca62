//! Current shape of the solid-side interface zone.

use fsi_core::{Communicator, Real, Vec3, check_len, zero_vectors};
use fsi_mesh::Zone;

use crate::error::CouplingResult;

/// Solid interface zone in its deformed configuration, with the geometric
/// measures the interpolator update policy needs.
///
/// Derived quantities are computed on first access and dropped when the
/// displacement changes.
#[derive(Debug, Clone)]
pub struct InterfaceGeometryTracker {
    reference: Zone,
    displacement: Vec<Vec3>,
    /// Displacement the interpolators were last built at.
    build_displacement: Vec<Vec3>,
    current: Option<Zone>,
    min_edge_length: Option<Vec<Real>>,
    accumulated_fluid_displacement: Vec<Vec3>,
}

impl InterfaceGeometryTracker {
    pub fn new(reference: Zone, n_fluid_points: usize) -> Self {
        let n = reference.n_points();
        Self {
            reference,
            displacement: zero_vectors(n),
            build_displacement: zero_vectors(n),
            current: None,
            min_edge_length: None,
            accumulated_fluid_displacement: zero_vectors(n_fluid_points),
        }
    }

    pub fn reference(&self) -> &Zone {
        &self.reference
    }

    pub fn displacement(&self) -> &[Vec3] {
        &self.displacement
    }

    /// Displacement at the last interpolator build.
    pub fn build_displacement(&self) -> &[Vec3] {
        &self.build_displacement
    }

    /// Replace the solid zone point displacement.
    pub fn update_displacement(&mut self, displacement: &[Vec3]) -> CouplingResult<()> {
        check_len(
            displacement,
            self.reference.n_points(),
            "solid zone point displacement",
        )?;
        self.displacement.copy_from_slice(displacement);
        self.current = None;
        Ok(())
    }

    /// Solid zone at reference points plus the current displacement.
    pub fn current_zone(&mut self) -> CouplingResult<&Zone> {
        let zone = match self.current.take() {
            Some(zone) => zone,
            None => self.reference.displaced(&self.displacement)?,
        };
        Ok(self.current.insert(zone))
    }

    /// Minimum adjacent edge length per point of the reference zone.
    pub fn min_edge_lengths(&mut self) -> &[Real] {
        let reference = &self.reference;
        self.min_edge_length
            .get_or_insert_with(|| reference.min_edge_lengths())
    }

    /// `max_i |d_i − d_build_i| / min_edge_i` over all processes.
    pub fn deformation_since_build(&mut self, comm: &dyn Communicator) -> Real {
        self.min_edge_lengths();
        let min_edge = self.min_edge_length.as_deref().unwrap_or_default();
        let local = self
            .displacement
            .iter()
            .zip(&self.build_displacement)
            .zip(min_edge)
            .filter(|(_, len)| **len > 0.0 && len.is_finite())
            .map(|((d, d0), len)| (d - d0).norm() / len)
            .fold(0.0, Real::max);
        comm.global_max(local)
    }

    /// Record the current displacement as the interpolator build state.
    pub fn mark_built(&mut self) {
        self.build_displacement.clone_from(&self.displacement);
    }

    /// Add an accepted fluid-side step increment to the running total.
    pub fn accumulate_fluid_displacement(&mut self, increment: &[Vec3]) -> CouplingResult<()> {
        check_len(
            increment,
            self.accumulated_fluid_displacement.len(),
            "fluid zone displacement increment",
        )?;
        for (acc, inc) in self.accumulated_fluid_displacement.iter_mut().zip(increment) {
            *acc += inc;
        }
        Ok(())
    }

    /// Fluid interface displacement summed over accepted steps.
    pub fn accumulated_fluid_displacement(&self) -> &[Vec3] {
        &self.accumulated_fluid_displacement
    }

    /// Back to the reference configuration.
    pub fn reset(&mut self) {
        self.displacement.fill(Vec3::zeros());
        self.build_displacement.fill(Vec3::zeros());
        self.accumulated_fluid_displacement.fill(Vec3::zeros());
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsi_core::{SerialComm, ZoneId};
    use fsi_mesh::shapes::rectangle_zone;

    fn tracker() -> InterfaceGeometryTracker {
        let zone = rectangle_zone(
            ZoneId::from_index(0),
            "solid",
            Vec3::zeros(),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            4,
            4,
        )
        .unwrap();
        InterfaceGeometryTracker::new(zone, 3)
    }

    #[test]
    fn current_zone_follows_displacement() {
        let mut t = tracker();
        assert!(t.current_zone().unwrap().points()[0].z.abs() < 1e-15);
        let d = vec![Vec3::new(0.0, 0.0, 0.1); 25];
        t.update_displacement(&d).unwrap();
        assert!((t.current_zone().unwrap().points()[0].z - 0.1).abs() < 1e-15);
        assert!(t.update_displacement(&d[..3]).is_err());
    }

    #[test]
    fn deformation_is_relative_to_build_and_edge_length() {
        let mut t = tracker();
        assert_eq!(t.min_edge_lengths()[0], 0.25);
        let mut d = vec![Vec3::zeros(); 25];
        d[7] = Vec3::new(0.0, 0.0, 0.05);
        t.update_displacement(&d).unwrap();
        assert!((t.deformation_since_build(&SerialComm) - 0.2).abs() < 1e-12);
        t.mark_built();
        assert_eq!(t.deformation_since_build(&SerialComm), 0.0);
    }

    #[test]
    fn accumulated_fluid_displacement_sums_increments() {
        let mut t = tracker();
        t.accumulate_fluid_displacement(&[Vec3::x(); 3]).unwrap();
        t.accumulate_fluid_displacement(&[Vec3::x(); 3]).unwrap();
        assert_eq!(t.accumulated_fluid_displacement()[2], 2.0 * Vec3::x());
    }
}
