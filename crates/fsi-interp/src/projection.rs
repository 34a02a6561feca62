//! Projection strategy: nearest geometric correspondence.
//!
//! A target face takes the value of the source face whose centre coincides
//! with its own, otherwise an inverse-distance blend of the nearest source
//! face centres.

use fsi_core::{Real, Vec3};
use fsi_mesh::Zone;
use rayon::prelude::*;

use crate::error::{InterpError, InterpResult};
use crate::search::ZoneSearch;
use crate::settings::InterpolationSettings;
use crate::weights::{MIN_ROW_WEIGHT, Row};

/// Centre distances below this fraction of the mean face size coincide.
const COINCIDENT: Real = 1e-8;

/// Raw face rows, each summing to the target face area. Degenerate target
/// faces keep a tiny positive row so they still receive a value.
pub(crate) fn face_rows(
    search: &ZoneSearch,
    target: &Zone,
    settings: &InterpolationSettings,
) -> InterpResult<Vec<Row>> {
    let centres = target.face_centres();
    let areas = target.face_areas();

    centres
        .par_iter()
        .zip(areas.par_iter())
        .enumerate()
        .map(|(t, (c, &area))| {
            let row = inverse_distance_row(search, c, area, settings.projection_neighbours);
            if row.is_empty() {
                Err(InterpError::NoCorrespondence {
                    what: "face",
                    index: t,
                })
            } else {
                Ok(row)
            }
        })
        .collect()
}

fn inverse_distance_row(search: &ZoneSearch, c: &Vec3, area: Real, k: usize) -> Row {
    let area = area.max(MIN_ROW_WEIGHT);
    let nearest = search.nearest_faces(c, k.max(1));
    let Some(&(closest, d0)) = nearest.first() else {
        return Vec::new();
    };
    if d0 <= COINCIDENT * search.mean_size {
        return vec![(closest, area)];
    }
    let inverse: Row = nearest.iter().map(|&(f, d)| (f, 1.0 / d)).collect();
    let total: Real = inverse.iter().map(|(_, w)| w).sum();
    inverse
        .into_iter()
        .map(|(f, w)| (f, area * w / total))
        .collect()
}
