//! fsi-mesh: interface zone layer.
//!
//! Provides:
//! - `Zone`: an immutable-topology surface patch (points + polygonal faces)
//! - Incremental zone builder with validation
//! - Face geometry (centres, area vectors, normals), edges, min edge lengths
//! - Planar polygon helpers used by the interpolation layer
//!
//! # Example
//!
//! ```
//! use fsi_core::{Vec3, ZoneId};
//! use fsi_mesh::ZoneBuilder;
//!
//! let mut builder = ZoneBuilder::new(ZoneId::from_index(0), "interface");
//! let a = builder.add_point(Vec3::new(0.0, 0.0, 0.0));
//! let b = builder.add_point(Vec3::new(1.0, 0.0, 0.0));
//! let c = builder.add_point(Vec3::new(1.0, 1.0, 0.0));
//! let d = builder.add_point(Vec3::new(0.0, 1.0, 0.0));
//! builder.add_face([a, b, c, d]);
//! let zone = builder.build().unwrap();
//!
//! assert_eq!(zone.n_points(), 4);
//! assert!((zone.face_area(0) - 1.0).abs() < 1e-12);
//! ```

pub mod builder;
pub mod error;
pub mod geometry;
pub mod shapes;
pub(crate) mod validate;
pub mod zone;

// Re-exports for ergonomics
pub use builder::ZoneBuilder;
pub use error::{MeshError, MeshResult};
pub use geometry::{PlaneBasis, Vec2};
pub use zone::{Face, Zone};
