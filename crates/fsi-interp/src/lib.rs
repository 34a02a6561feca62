//! Zone-to-zone interpolation between non-conforming interface meshes.
//!
//! This crate builds linear maps `target = W * source` between two surface
//! zones that approximate the same physical interface. Two strategies are
//! provided: projection (nearest geometric correspondence) and GGI
//! (overlap-area weighting of projected face polygons). Weights are expensive
//! to assemble, so they are cached and only rebuilt on request.

pub mod cache;
pub mod error;
pub mod ggi;
pub mod interpolator;
pub mod points;
pub mod projection;
pub mod search;
pub mod settings;
pub mod weights;

pub use cache::InterpolatorCache;
pub use error::{InterpError, InterpResult};
pub use interpolator::{BuildReport, Transfer, ZoneInterpolator};
pub use settings::{InterpolationMethod, InterpolationSettings};
pub use weights::WeightMatrix;
