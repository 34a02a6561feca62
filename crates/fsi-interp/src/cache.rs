//! Lazily built, explicitly invalidated interpolator cell.

use std::sync::Arc;

use fsi_mesh::Zone;
use tracing::debug;

use crate::error::InterpResult;
use crate::interpolator::ZoneInterpolator;
use crate::settings::InterpolationSettings;

/// Owns at most one interpolator for a fixed zone pair.
///
/// The cached weights stay in use until [`mark_stale`](Self::mark_stale)
/// drops them; the next [`get_or_build`](Self::get_or_build) assembles new
/// weights from the geometry it is given.
#[derive(Debug)]
pub struct InterpolatorCache {
    settings: InterpolationSettings,
    cached: Option<Arc<ZoneInterpolator>>,
    builds: usize,
}

impl InterpolatorCache {
    pub fn new(settings: InterpolationSettings) -> Self {
        Self {
            settings,
            cached: None,
            builds: 0,
        }
    }

    pub fn settings(&self) -> &InterpolationSettings {
        &self.settings
    }

    /// Cached interpolator, built from `source` and `target` if absent.
    pub fn get_or_build(
        &mut self,
        source: &Zone,
        target: &Zone,
    ) -> InterpResult<Arc<ZoneInterpolator>> {
        if let Some(interp) = &self.cached {
            return Ok(Arc::clone(interp));
        }
        self.recompute(source, target)
    }

    /// Rebuild unconditionally.
    pub fn recompute(
        &mut self,
        source: &Zone,
        target: &Zone,
    ) -> InterpResult<Arc<ZoneInterpolator>> {
        let interp = Arc::new(ZoneInterpolator::build(source, target, &self.settings)?);
        self.builds += 1;
        debug!(
            source = source.name(),
            target = target.name(),
            builds = self.builds,
            "interpolator rebuilt"
        );
        self.cached = Some(Arc::clone(&interp));
        Ok(interp)
    }

    pub fn mark_stale(&mut self) {
        self.cached = None;
    }

    pub fn is_stale(&self) -> bool {
        self.cached.is_none()
    }

    /// Number of builds so far.
    pub fn builds(&self) -> usize {
        self.builds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsi_core::{Vec3, ZoneId};
    use fsi_mesh::shapes::rectangle_zone;

    #[test]
    fn reuse_until_marked_stale() {
        let zone = rectangle_zone(
            ZoneId::from_index(0),
            "z",
            Vec3::zeros(),
            Vec3::x(),
            Vec3::y(),
            2,
            2,
        )
        .unwrap();
        let mut cache = InterpolatorCache::new(InterpolationSettings::default());
        assert!(cache.is_stale());
        let a = cache.get_or_build(&zone, &zone).unwrap();
        let b = cache.get_or_build(&zone, &zone).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.builds(), 1);

        cache.mark_stale();
        let c = cache.get_or_build(&zone, &zone).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        let d = cache.recompute(&zone, &zone).unwrap();
        assert!(!Arc::ptr_eq(&c, &d));
        assert_eq!(cache.builds(), 3);
    }
}
