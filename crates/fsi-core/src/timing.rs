//! Stage timers for coupled runs.
//!
//! Off by default. Set `FSI_TIMING` or call [`enable_timing`] to collect
//! wall-clock totals per coupling stage; [`coupling_timing::print_summary`]
//! reports them at the end of a run.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static FORCED: AtomicBool = AtomicBool::new(false);
static FROM_ENV: OnceLock<bool> = OnceLock::new();

pub fn enable_timing() {
    FORCED.store(true, Ordering::Relaxed);
}

pub fn disable_timing() {
    FORCED.store(false, Ordering::Relaxed);
}

/// Timing is on when forced programmatically or when `FSI_TIMING` is set.
pub fn is_enabled() -> bool {
    FORCED.load(Ordering::Relaxed)
        || *FROM_ENV.get_or_init(|| std::env::var_os("FSI_TIMING").is_some())
}

/// Running total of the time spent in one stage.
#[derive(Debug, Default)]
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl AccumulatingTimer {
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Start timing one call; the elapsed time is added when the guard drops.
    /// Returns an inert guard while timing is disabled.
    pub fn start(&self) -> StageGuard<'_> {
        StageGuard {
            timer: self,
            started: is_enabled().then(Instant::now),
        }
    }

    pub fn record(&self, duration_s: f64) {
        let nanos = (duration_s.max(0.0) * 1e9) as u64;
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 * 1e-9
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Mean seconds per recorded call, zero before the first one.
    pub fn average_seconds(&self) -> f64 {
        match self.count() {
            0 => 0.0,
            n => self.total_seconds() / n as f64,
        }
    }

    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Scope guard from [`AccumulatingTimer::start`].
#[must_use = "the stage is timed until the guard is dropped"]
pub struct StageGuard<'a> {
    timer: &'a AccumulatingTimer,
    started: Option<Instant>,
}

impl Drop for StageGuard<'_> {
    fn drop(&mut self) {
        if let Some(started) = self.started {
            self.timer.record(started.elapsed().as_secs_f64());
        }
    }
}

/// One timer per stage of an outer coupling iteration.
pub mod coupling_timing {
    use super::{AccumulatingTimer, is_enabled};

    pub static FLOW_EVOLVE: AccumulatingTimer = AccumulatingTimer::new();
    pub static STRESS_EVOLVE: AccumulatingTimer = AccumulatingTimer::new();
    pub static MESH_MOTION: AccumulatingTimer = AccumulatingTimer::new();
    /// Weight assembly, including candidate search.
    pub static INTERPOLATOR_BUILD: AccumulatingTimer = AccumulatingTimer::new();
    /// Field transfers through already assembled weights.
    pub static TRANSFER: AccumulatingTimer = AccumulatingTimer::new();
    pub static SCHEME_UPDATE: AccumulatingTimer = AccumulatingTimer::new();

    fn stages() -> [(&'static str, &'static AccumulatingTimer); 6] {
        [
            ("flow evolve", &FLOW_EVOLVE),
            ("stress evolve", &STRESS_EVOLVE),
            ("mesh motion", &MESH_MOTION),
            ("interpolator build", &INTERPOLATOR_BUILD),
            ("field transfer", &TRANSFER),
            ("scheme update", &SCHEME_UPDATE),
        ]
    }

    pub fn reset_all() {
        for (_, timer) in stages() {
            timer.reset();
        }
    }

    /// Print per-stage totals to stdout when timing is enabled.
    pub fn print_summary() {
        if !is_enabled() {
            return;
        }
        println!("\n--- coupling stages ---");
        for (label, timer) in stages() {
            if timer.count() == 0 {
                continue;
            }
            println!(
                "{label:<20} {:>8} calls {:>10.3}s total {:>10.4}ms avg",
                timer.count(),
                timer.total_seconds(),
                timer.average_seconds() * 1e3
            );
        }
    }
}
