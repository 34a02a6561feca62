//! Structured zone generators.

use fsi_core::{Real, Vec3, ZoneId};

use crate::builder::ZoneBuilder;
use crate::error::MeshResult;
use crate::zone::Zone;

/// Quadrilateral grid of `nu × nv` faces spanning `origin + s·u + t·v`,
/// `s, t ∈ [0, 1]`. Faces are ordered so their normals point along `u × v`.
///
/// Points are numbered row by row (`j * (nu + 1) + i`), faces likewise.
pub fn rectangle_zone(
    id: ZoneId,
    name: impl Into<String>,
    origin: Vec3,
    u: Vec3,
    v: Vec3,
    nu: usize,
    nv: usize,
) -> MeshResult<Zone> {
    let mut builder = ZoneBuilder::new(id, name);
    for j in 0..=nv {
        for i in 0..=nu {
            let s = i as Real / nu.max(1) as Real;
            let t = j as Real / nv.max(1) as Real;
            builder.add_point(origin + u * s + v * t);
        }
    }
    let stride = nu + 1;
    for j in 0..nv {
        for i in 0..nu {
            let p0 = j * stride + i;
            builder.add_face([p0, p0 + 1, p0 + 1 + stride, p0 + stride]);
        }
    }
    builder.build()
}

/// Same grid split into triangles (two per quad), for non-conformal tests.
pub fn triangulated_rectangle_zone(
    id: ZoneId,
    name: impl Into<String>,
    origin: Vec3,
    u: Vec3,
    v: Vec3,
    nu: usize,
    nv: usize,
) -> MeshResult<Zone> {
    let mut builder = ZoneBuilder::new(id, name);
    for j in 0..=nv {
        for i in 0..=nu {
            let s = i as Real / nu.max(1) as Real;
            let t = j as Real / nv.max(1) as Real;
            builder.add_point(origin + u * s + v * t);
        }
    }
    let stride = nu + 1;
    for j in 0..nv {
        for i in 0..nu {
            let p0 = j * stride + i;
            builder.add_face([p0, p0 + 1, p0 + 1 + stride]);
            builder.add_face([p0, p0 + 1 + stride, p0 + stride]);
        }
    }
    builder.build()
}
