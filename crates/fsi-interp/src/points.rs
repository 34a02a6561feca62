//! Point weights: target points inside projected source faces.
//!
//! A target point is projected onto the plane of each candidate source face.
//! Inside the face it gets barycentric weights on the fan triangulation about
//! the face's point average, so the apex contributes equally to every face
//! point. Among containing faces the one closest along the normal wins.

use fsi_core::{Real, Vec3};
use fsi_mesh::{PlaneBasis, Zone};
use fsi_mesh::geometry::barycentric;
use rayon::prelude::*;

use crate::error::{InterpError, InterpResult};
use crate::search::ZoneSearch;
use crate::settings::InterpolationSettings;
use crate::weights::Row;

/// Barycentric coordinates this close to 0 or 1 are snapped.
const SNAP: Real = 1e-12;

/// Locate `p` in source face `face`.
///
/// Returns the normal distance and point weights (summing to one) when the
/// projection falls inside the face and the normal distance is within the
/// search distance.
pub(crate) fn locate_in_face(
    zone: &Zone,
    search: &ZoneSearch,
    face: usize,
    p: &Vec3,
    settings: &InterpolationSettings,
) -> Option<(Real, Row)> {
    if !search.valid[face] {
        return None;
    }
    let apex = search.apexes[face];
    let basis = PlaneBasis::from_normal(apex, search.normals[face])?;
    let height = basis.height(p).abs();
    if height > settings.search_tolerance * search.areas[face].sqrt() {
        return None;
    }

    let face_points = &zone.faces()[face].points;
    let q = basis.project(p);
    let apex2 = basis.project(&apex);
    let n = face_points.len();
    for i in 0..n {
        let a = face_points[i];
        let b = face_points[(i + 1) % n];
        let a2 = basis.project(&zone.points()[a]);
        let b2 = basis.project(&zone.points()[b]);
        if let Some(l) = barycentric(&q, &apex2, &a2, &b2, settings.inside_tolerance) {
            let l = snap(l);
            let share = l[0] / n as Real;
            let mut row: Row = face_points.iter().map(|&k| (k, share)).collect();
            row.push((a, l[1]));
            row.push((b, l[2]));
            return Some((height, row));
        }
    }
    None
}

fn snap(mut l: [Real; 3]) -> [Real; 3] {
    for v in &mut l {
        if v.abs() <= SNAP {
            *v = 0.0;
        } else if (*v - 1.0).abs() <= SNAP {
            *v = 1.0;
        }
    }
    let sum: Real = l.iter().sum();
    if sum > 0.0 {
        for v in &mut l {
            *v /= sum;
        }
    }
    l
}

/// Best containing face for `p`, if any.
pub(crate) fn best_containing_face(
    zone: &Zone,
    search: &ZoneSearch,
    p: &Vec3,
    settings: &InterpolationSettings,
) -> Option<Row> {
    let radius = settings.search_tolerance * search.mean_size;
    let mut best: Option<(Real, Row)> = None;
    for f in search.faces_near(p, radius) {
        if let Some((h, row)) = locate_in_face(zone, search, f, p, settings) {
            if best.as_ref().is_none_or(|(bh, _)| h < *bh) {
                best = Some((h, row));
            }
        }
    }
    best.map(|(_, row)| row)
}

/// Assemble point weight rows for every target point.
///
/// Returns the rows and the number of targets that used the nearest-point
/// fallback.
pub(crate) fn point_rows(
    source: &Zone,
    search: &ZoneSearch,
    target_points: &[Vec3],
    settings: &InterpolationSettings,
) -> InterpResult<(Vec<Row>, usize)> {
    let rows: Vec<InterpResult<(Row, bool)>> = target_points
        .par_iter()
        .enumerate()
        .map(|(i, p)| {
            if let Some(row) = best_containing_face(source, search, p, settings) {
                return Ok((row, false));
            }
            if settings.nearest_fallback {
                if let Some(nearest) = search.nearest_point(p) {
                    return Ok((vec![(nearest, 1.0)], true));
                }
            }
            Err(InterpError::NoCorrespondence {
                what: "point",
                index: i,
            })
        })
        .collect();

    let mut out = Vec::with_capacity(rows.len());
    let mut fallbacks = 0;
    for r in rows {
        let (row, fell_back) = r?;
        if fell_back {
            fallbacks += 1;
        }
        out.push(row);
    }
    Ok((out, fallbacks))
}
