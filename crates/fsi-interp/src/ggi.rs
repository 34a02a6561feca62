//! General grid interface weighting.
//!
//! Each target face is intersected with every candidate source face after
//! projecting both onto the target face plane. The raw weight of a pair is
//! the overlap area, so a fully covered target row sums to its own area and a
//! fully covered source column to the projected source area.

use fsi_core::{Real, Vec3};
use fsi_mesh::geometry::overlap_area_2d;
use fsi_mesh::{PlaneBasis, Vec2, Zone};
use rayon::prelude::*;

use crate::error::{InterpError, InterpResult};
use crate::search::ZoneSearch;
use crate::settings::InterpolationSettings;
use crate::weights::{MIN_ROW_WEIGHT, Row};

/// Overlaps below this fraction of the target face area are clipping noise.
const MIN_OVERLAP: Real = 1e-10;

/// Raw overlap rows for every target face.
///
/// Returns the rows and the number of targets that fell back to the nearest
/// source face.
pub(crate) fn face_rows(
    source: &Zone,
    search: &ZoneSearch,
    target: &Zone,
    settings: &InterpolationSettings,
) -> InterpResult<(Vec<Row>, usize)> {
    let centres = target.face_centres();
    let area_vectors = target.face_area_vectors();

    let rows: Vec<InterpResult<(Row, bool)>> = (0..target.n_faces())
        .into_par_iter()
        .map(|t| {
            let area = area_vectors[t].norm();
            let row = PlaneBasis::from_normal(centres[t], area_vectors[t])
                .map(|basis| overlap_row(source, search, target, t, area, &basis, settings))
                .unwrap_or_default();
            if !row.is_empty() {
                return Ok((row, false));
            }
            if settings.nearest_fallback {
                if let Some(&(nearest, _)) = search.nearest_faces(&centres[t], 1).first() {
                    return Ok((vec![(nearest, area.max(MIN_ROW_WEIGHT))], true));
                }
            }
            Err(InterpError::NoCorrespondence {
                what: "face",
                index: t,
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

fn overlap_row(
    source: &Zone,
    search: &ZoneSearch,
    target: &Zone,
    t: usize,
    area: Real,
    basis: &PlaneBasis,
    settings: &InterpolationSettings,
) -> Row {
    let target_points = target.face_points(t);
    let target_2d: Vec<Vec2> = target_points.iter().map(|p| basis.project(p)).collect();

    let reach = settings.search_tolerance * area.sqrt();
    let (min, max) = bounds(&target_points, reach);

    let mut row = Row::new();
    for s in search.faces_in_box(&min, &max) {
        if search.normals[s].dot(&basis.normal).abs() < settings.min_normal_alignment {
            continue;
        }
        let gap = basis.height(&search.centres[s]).abs();
        if gap > reach.max(settings.search_tolerance * search.areas[s].sqrt()) {
            continue;
        }
        let source_2d: Vec<Vec2> = source
            .face_points(s)
            .iter()
            .map(|p| basis.project(p))
            .collect();
        let overlap = overlap_area_2d(&source_2d, &target_2d);
        if overlap > MIN_OVERLAP * area {
            row.push((s, overlap));
        }
    }
    row
}

fn bounds(points: &[Vec3], reach: Real) -> (Vec3, Vec3) {
    let mut min = Vec3::repeat(Real::INFINITY);
    let mut max = Vec3::repeat(Real::NEG_INFINITY);
    for p in points {
        min = min.inf(p);
        max = max.sup(p);
    }
    let r = Vec3::repeat(reach);
    (min - r, max + r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsi_core::ZoneId;
    use fsi_mesh::shapes::{rectangle_zone, triangulated_rectangle_zone};

    fn plate(nu: usize, nv: usize, z: Real) -> Zone {
        rectangle_zone(
            ZoneId::from_index(0),
            "plate",
            Vec3::new(0.0, 0.0, z),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            nu,
            nv,
        )
        .unwrap()
    }

    #[test]
    fn fine_source_covers_coarse_target() {
        let source = plate(4, 4, 0.0);
        let settings = InterpolationSettings::default();
        let search = ZoneSearch::new(&source, &settings).unwrap();
        let (rows, fallbacks) = face_rows(&source, &search, &plate(2, 2, 0.01), &settings).unwrap();
        assert_eq!(fallbacks, 0);
        for row in &rows {
            assert_eq!(row.len(), 4);
            let sum: Real = row.iter().map(|(_, w)| w).sum();
            assert!((sum - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn triangles_over_quads() {
        let source = plate(3, 3, 0.0);
        let target = triangulated_rectangle_zone(
            ZoneId::from_index(1),
            "tri",
            Vec3::zeros(),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            2,
            2,
        )
        .unwrap();
        let settings = InterpolationSettings::default();
        let search = ZoneSearch::new(&source, &settings).unwrap();
        let (rows, _) = face_rows(&source, &search, &target, &settings).unwrap();
        let total: Real = rows.iter().flatten().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-10);
    }

    #[test]
    fn perpendicular_faces_do_not_overlap() {
        let source = plate(1, 1, 0.0);
        let wall = rectangle_zone(
            ZoneId::from_index(1),
            "wall",
            Vec3::new(0.0, 0.5, -0.5),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            1,
            1,
        )
        .unwrap();
        let settings = InterpolationSettings {
            nearest_fallback: false,
            ..Default::default()
        };
        let search = ZoneSearch::new(&source, &settings).unwrap();
        let err = face_rows(&source, &search, &wall, &settings).unwrap_err();
        assert!(matches!(err, InterpError::NoCorrespondence { what: "face", .. }));
    }
}
