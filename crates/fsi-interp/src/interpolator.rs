//! Assembled zone-to-zone interpolator.

use fsi_core::timing::coupling_timing;
use fsi_core::{Real, Vec3};
use fsi_mesh::Zone;
use tracing::{debug, warn};

use crate::error::{InterpError, InterpResult};
use crate::search::ZoneSearch;
use crate::settings::{InterpolationMethod, InterpolationSettings};
use crate::weights::{MIN_ROW_WEIGHT, Row, WeightMatrix, has_weight};
use crate::{ggi, points, projection};

/// How a face field is carried across the interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transfer {
    /// Row-normalised weights: intensive quantities such as traction and
    /// pressure. A constant field maps to the same constant.
    AreaWeighted,
    /// Column-normalised weights: extensive quantities such as face forces.
    /// The zone total is preserved.
    Conservative,
}

/// Fallback counts collected while assembling weights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Target faces without overlap that took the nearest source face.
    pub fallback_faces: usize,
    /// Target points outside every source face that took the nearest point.
    pub fallback_points: usize,
    /// Source faces with no target coverage, sent to the nearest target face
    /// for conservative transfer.
    pub orphan_source_faces: usize,
}

/// Linear maps from a source zone onto a target zone.
#[derive(Debug, Clone)]
pub struct ZoneInterpolator {
    method: InterpolationMethod,
    face_area_weighted: WeightMatrix,
    face_conservative: WeightMatrix,
    points: WeightMatrix,
    report: BuildReport,
}

impl ZoneInterpolator {
    /// Assemble face and point weights between two zones in their current
    /// configuration.
    pub fn build(
        source: &Zone,
        target: &Zone,
        settings: &InterpolationSettings,
    ) -> InterpResult<Self> {
        settings.validate()?;
        let _timer = coupling_timing::INTERPOLATOR_BUILD.start();

        let search = ZoneSearch::new(source, settings)?;
        let (mut raw_rows, mut fallback_faces) = match settings.method {
            InterpolationMethod::Ggi => ggi::face_rows(source, &search, target, settings)?,
            InterpolationMethod::Projection => {
                (projection::face_rows(&search, target, settings)?, 0)
            }
        };
        let (mut point_rows, mut fallback_points) =
            points::point_rows(source, &search, target.points(), settings)?;

        let centres = target.face_centres();
        fallback_faces += fill_empty_rows(&mut raw_rows, "face", settings.nearest_fallback, |t| {
            search.nearest_faces(&centres[t], 1).first().map(|&(f, _)| f)
        })?;
        fallback_points +=
            fill_empty_rows(&mut point_rows, "point", settings.nearest_fallback, |t| {
                search.nearest_point(&target.points()[t])
            })?;

        let raw = WeightMatrix::from_rows(source.n_faces(), raw_rows.clone());
        let face_area_weighted = raw.row_normalised();
        let (face_conservative, orphan_source_faces) =
            conservative_weights(source, target, &raw, raw_rows, settings)?;
        let points = WeightMatrix::from_rows(source.n_points(), point_rows).row_normalised();

        let report = BuildReport {
            fallback_faces,
            fallback_points,
            orphan_source_faces,
        };
        if report.fallback_faces > 0 || report.fallback_points > 0 {
            warn!(
                source = source.name(),
                target = target.name(),
                faces = report.fallback_faces,
                points = report.fallback_points,
                "interpolation used nearest-entry fallback"
            );
        }
        debug!(
            source = source.name(),
            target = target.name(),
            method = ?settings.method,
            face_nnz = face_area_weighted.nnz(),
            point_nnz = points.nnz(),
            "interpolation weights assembled"
        );

        Ok(Self {
            method: settings.method,
            face_area_weighted,
            face_conservative,
            points,
            report,
        })
    }

    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    pub fn report(&self) -> BuildReport {
        self.report
    }

    pub fn n_source_faces(&self) -> usize {
        self.face_area_weighted.n_source()
    }

    pub fn n_target_faces(&self) -> usize {
        self.face_area_weighted.n_target()
    }

    pub fn n_source_points(&self) -> usize {
        self.points.n_source()
    }

    pub fn n_target_points(&self) -> usize {
        self.points.n_target()
    }

    pub fn face_weights(&self, transfer: Transfer) -> &WeightMatrix {
        match transfer {
            Transfer::AreaWeighted => &self.face_area_weighted,
            Transfer::Conservative => &self.face_conservative,
        }
    }

    pub fn point_weights(&self) -> &WeightMatrix {
        &self.points
    }

    pub fn interpolate_faces_scalar(
        &self,
        field: &[Real],
        transfer: Transfer,
    ) -> InterpResult<Vec<Real>> {
        let _timer = coupling_timing::TRANSFER.start();
        Ok(self.face_weights(transfer).apply_scalar(field)?)
    }

    pub fn interpolate_faces_vector(
        &self,
        field: &[Vec3],
        transfer: Transfer,
    ) -> InterpResult<Vec<Vec3>> {
        let _timer = coupling_timing::TRANSFER.start();
        Ok(self.face_weights(transfer).apply_vector(field)?)
    }

    pub fn interpolate_points_scalar(&self, field: &[Real]) -> InterpResult<Vec<Real>> {
        let _timer = coupling_timing::TRANSFER.start();
        Ok(self.points.apply_scalar(field)?)
    }

    pub fn interpolate_points_vector(&self, field: &[Vec3]) -> InterpResult<Vec<Vec3>> {
        let _timer = coupling_timing::TRANSFER.start();
        Ok(self.points.apply_vector(field)?)
    }
}

/// Give every row without a positive weight its nearest source entry, or
/// fail when the fallback is off. Returns the number of rows filled.
fn fill_empty_rows(
    rows: &mut [Row],
    what: &'static str,
    nearest_fallback: bool,
    nearest: impl Fn(usize) -> Option<usize>,
) -> InterpResult<usize> {
    let mut filled = 0;
    for (t, row) in rows.iter_mut().enumerate() {
        if has_weight(row) {
            continue;
        }
        match nearest_fallback.then(|| nearest(t)).flatten() {
            Some(s) => {
                *row = vec![(s, MIN_ROW_WEIGHT)];
                filled += 1;
            }
            None => return Err(InterpError::NoCorrespondence { what, index: t }),
        }
    }
    Ok(filled)
}

/// Column-normalised weights. Source faces no target row touches are routed
/// to the target face with the nearest centre so nothing is lost.
fn conservative_weights(
    source: &Zone,
    target: &Zone,
    raw: &WeightMatrix,
    mut rows: Vec<Row>,
    settings: &InterpolationSettings,
) -> InterpResult<(WeightMatrix, usize)> {
    let orphans: Vec<usize> = raw
        .column_sums()
        .iter()
        .enumerate()
        .filter(|(_, sum)| **sum <= 0.0)
        .map(|(s, _)| s)
        .collect();
    if !orphans.is_empty() {
        let target_search = ZoneSearch::new(target, settings)?;
        for &s in &orphans {
            if let Some(&(t, _)) = target_search
                .nearest_faces(&source.face_centre(s), 1)
                .first()
            {
                rows[t].push((s, 1.0));
            }
        }
        debug!(
            source = source.name(),
            orphans = orphans.len(),
            "uncovered source faces routed to nearest target"
        );
    }
    let matrix = WeightMatrix::from_rows(source.n_faces(), rows).column_normalised();
    Ok((matrix, orphans.len()))
}
