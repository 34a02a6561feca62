//! Displacement history of one solid mesh point.

use fsi_core::{Communicator, Real, Vec3};

use crate::error::{CouplingError, CouplingResult};
use crate::models::StressModel;

#[derive(Clone, Debug, PartialEq)]
pub struct PointSample {
    pub time: Real,
    pub displacement: Vec3,
    pub velocity: Option<Vec3>,
}

/// Probe following the solid mesh point nearest to a reference location.
#[derive(Clone, Debug)]
pub struct PointHistory {
    location: Vec3,
    /// Local index of the probed point on the owning process.
    point: Option<usize>,
    distance: Real,
    record_velocity: bool,
    samples: Vec<PointSample>,
}

impl PointHistory {
    /// Pick the point nearest to `location` over all processes. Ties between
    /// processes go to the lowest rank.
    pub fn new(
        stress: &dyn StressModel,
        comm: &dyn Communicator,
        location: Vec3,
        record_velocity: bool,
    ) -> CouplingResult<Self> {
        let (local_point, local_distance) = stress
            .mesh_points()
            .iter()
            .enumerate()
            .map(|(i, p)| (i, (p - location).norm()))
            .fold((None, Real::INFINITY), |best, (i, d)| {
                if d < best.1 { (Some(i), d) } else { best }
            });
        let distance = comm.global_min(local_distance);
        if !distance.is_finite() {
            return Err(CouplingError::setup(format!(
                "stress model '{}' has no mesh points to probe",
                stress.name()
            )));
        }

        let candidate = if local_distance == distance {
            comm.rank() as Real
        } else {
            Real::INFINITY
        };
        let owner = comm.global_min(candidate);
        let point = if owner == comm.rank() as Real {
            local_point
        } else {
            None
        };

        Ok(Self {
            location,
            point,
            distance,
            record_velocity,
            samples: Vec::new(),
        })
    }

    pub fn location(&self) -> Vec3 {
        self.location
    }

    /// Distance from the reference location to the probed point.
    pub fn distance(&self) -> Real {
        self.distance
    }

    /// Local point index when this process owns the probed point.
    pub fn point(&self) -> Option<usize> {
        self.point
    }

    /// Sample the probed point; every process receives the owner's values.
    pub fn sample(&mut self, stress: &dyn StressModel, comm: &dyn Communicator, time: Real) {
        let mut values = [0.0; 6];
        if let Some(p) = self.point {
            let d = stress.point_displacement(p);
            values[..3].copy_from_slice(d.as_slice());
            if self.record_velocity {
                let v = stress.point_velocity(p);
                values[3..].copy_from_slice(v.as_slice());
            }
        }
        comm.global_sum_slice(&mut values);
        self.samples.push(PointSample {
            time,
            displacement: Vec3::new(values[0], values[1], values[2]),
            velocity: self
                .record_velocity
                .then(|| Vec3::new(values[3], values[4], values[5])),
        });
    }

    pub fn samples(&self) -> &[PointSample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<PointSample> {
        self.samples
    }
}
