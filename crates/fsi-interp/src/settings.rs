//! Interpolation strategy selection and tolerances.

use crate::error::{InterpError, InterpResult};
use fsi_core::Real;

/// Weighting strategy between the two zones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InterpolationMethod {
    /// Nearest geometric correspondence; suited to nearly conforming zones.
    Projection,
    /// General grid interface: overlap areas of projected face polygons.
    #[default]
    Ggi,
}

impl std::str::FromStr for InterpolationMethod {
    type Err = InterpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "projection" | "patchtopatch" => Ok(Self::Projection),
            "ggi" => Ok(Self::Ggi),
            other => Err(InterpError::InvalidSettings {
                what: format!("unknown interpolation method '{other}'"),
            }),
        }
    }
}

/// Interpolation options.
#[derive(Clone, Debug)]
pub struct InterpolationSettings {
    pub method: InterpolationMethod,
    /// Search distance as a fraction of the local face size.
    pub search_tolerance: Real,
    /// Barycentric slack when deciding whether a point lies inside a face.
    pub inside_tolerance: Real,
    /// Source face centres used for inverse-distance weighting.
    pub projection_neighbours: usize,
    /// Faces with smaller area (relative to the zone's mean face area) are
    /// excluded from weighting.
    pub degenerate_area: Real,
    /// Minimum |n_source · n_target| for a GGI face pair to overlap.
    pub min_normal_alignment: Real,
    /// Use the nearest source entry when a target has no correspondence;
    /// otherwise building fails.
    pub nearest_fallback: bool,
}

impl Default for InterpolationSettings {
    fn default() -> Self {
        Self {
            method: InterpolationMethod::default(),
            search_tolerance: 0.5,
            inside_tolerance: 1e-6,
            projection_neighbours: 4,
            degenerate_area: 1e-12,
            min_normal_alignment: 0.5,
            nearest_fallback: true,
        }
    }
}

impl InterpolationSettings {
    pub fn with_method(method: InterpolationMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> InterpResult<()> {
        if !(self.search_tolerance > 0.0) {
            return Err(InterpError::InvalidSettings {
                what: "search_tolerance must be positive".to_string(),
            });
        }
        if self.inside_tolerance < 0.0 {
            return Err(InterpError::InvalidSettings {
                what: "inside_tolerance must be non-negative".to_string(),
            });
        }
        if self.projection_neighbours == 0 {
            return Err(InterpError::InvalidSettings {
                what: "projection_neighbours must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.min_normal_alignment) {
            return Err(InterpError::InvalidSettings {
                what: "min_normal_alignment must lie in [0, 1]".to_string(),
            });
        }
        Ok(())
    }
}
