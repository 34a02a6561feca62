//! Outer iterations of a coupled step on the chamber/spring-wall pair.

mod common;

use std::sync::Arc;

use common::{ChamberFlow, Counters, SpringWall};
use fsi_core::units::{m, s};
use fsi_core::{PatchId, Real, Vec3, ZoneId};
use fsi_coupling::{
    CouplingError, CouplingSchemeKind, CouplingSettings, FluidStructureInterface, ForceCoupling,
    FsiProgress, PointHistory, ProbeOptions, ResidualScale, RunOptions, StressModel, TimeStep,
    run_fsi, run_fsi_with_progress,
};

const P0: Real = 1.0;
const COMPLIANCE: Real = 0.5;
const STIFFNESS: Real = 1.0;

fn exact_deflection() -> Real {
    P0 / (STIFFNESS + COMPLIANCE)
}

fn settings(scheme: CouplingSchemeKind) -> CouplingSettings {
    CouplingSettings {
        fluid_zone: "wall".to_string(),
        fluid_patch: "wall".to_string(),
        solid_zone: "wall".to_string(),
        solid_patch: "wall".to_string(),
        scheme,
        outer_corr_tolerance: 1e-8,
        n_outer_corr: 50,
        residual_scale: ResidualScale::Fixed(m(1.0)),
        ..Default::default()
    }
}

fn interface(settings: CouplingSettings) -> (FluidStructureInterface, Arc<Counters>) {
    let counters = Arc::new(Counters::default());
    let flow = ChamberFlow::new(4, P0, COMPLIANCE, counters.clone());
    let stress = SpringWall::new(3, STIFFNESS, counters.clone());
    let fsi = FluidStructureInterface::serial(Box::new(flow), Box::new(stress), settings).unwrap();
    (fsi, counters)
}

fn step(index: usize) -> TimeStep {
    TimeStep {
        index,
        time: index as Real * 0.1,
        dt: 0.1,
    }
}

fn max_deflection_error(fsi: &FluidStructureInterface) -> Real {
    fsi.state()
        .fluid_zone_points_displ
        .iter()
        .map(|d| (d - Vec3::new(0.0, 0.0, exact_deflection())).norm())
        .fold(0.0, Real::max)
}

#[test]
fn every_scheme_reaches_the_coupled_deflection() {
    let mut iterations = Vec::new();
    for kind in [
        CouplingSchemeKind::FixedRelaxation,
        CouplingSchemeKind::Aitken,
        CouplingSchemeKind::IqnIls,
    ] {
        let (mut fsi, _) = interface(settings(kind));
        let report = fsi.advance(step(1)).unwrap();
        assert!(report.converged, "{kind:?} did not converge");
        assert!(report.residual_norm.unwrap() <= 1e-8);
        assert!(max_deflection_error(&fsi) < 1e-7, "{kind:?}");
        iterations.push(report.outer_iterations);
    }
    // accelerated schemes need fewer passes than plain relaxation
    assert!(iterations[1] < iterations[0]);
    assert!(iterations[2] < iterations[0]);
}

#[test]
fn outer_iterations_follow_the_stage_order() {
    let (mut fsi, counters) = interface(settings(CouplingSchemeKind::Aitken));
    let report = fsi.advance(step(1)).unwrap();
    let n = report.outer_iterations;
    assert_eq!(Counters::get(&counters.mesh_moves), n);
    assert_eq!(Counters::get(&counters.flow_evolves), n);
    assert_eq!(Counters::get(&counters.stress_evolves), n);
    assert_eq!(fsi.state().outer_corr, n);
    assert!(fsi.state().residual.is_some());
    assert!(report.max_residual_norm.unwrap() >= report.residual_norm.unwrap());
}

#[test]
fn iteration_cap_reports_non_convergence() {
    let capped = CouplingSettings {
        n_outer_corr: 2,
        ..settings(CouplingSchemeKind::FixedRelaxation)
    };
    let (mut fsi, _) = interface(capped);
    let report = fsi.advance(step(1)).unwrap();
    assert!(!report.converged);
    assert_eq!(report.outer_iterations, 2);
}

#[test]
fn uncoupled_step_is_a_single_pass() {
    let uncoupled = CouplingSettings {
        coupled: false,
        ..settings(CouplingSchemeKind::Aitken)
    };
    let (mut fsi, counters) = interface(uncoupled);
    let report = fsi.advance(step(1)).unwrap();
    assert_eq!(report.outer_iterations, 1);
    assert!(report.converged);
    assert_eq!(report.residual_norm, None);
    assert_eq!(Counters::get(&counters.mesh_moves), 0);
    assert_eq!(Counters::get(&counters.flow_evolves), 1);
    assert!(fsi.state().residual.is_none());
    // the wall still responds to the undeformed chamber pressure
    let expected = P0 / STIFFNESS;
    assert!(
        fsi.state()
            .solid_zone_points_displ
            .iter()
            .all(|d| (d.z - expected).abs() < 1e-12)
    );
}

#[test]
fn weak_coupling_passes_pressure_separately() {
    let weak = CouplingSettings {
        force_coupling: ForceCoupling::Weak,
        ..settings(CouplingSchemeKind::Aitken)
    };
    let (mut fsi, _) = interface(weak);
    let report = fsi.advance(step(1)).unwrap();
    assert!(report.converged);
    // viscous traction is zero, pressure carries the whole load
    assert!(fsi.state().solid_zone_traction.iter().all(|t| t.norm() == 0.0));
    assert!(
        fsi.state()
            .solid_zone_pressure
            .iter()
            .all(|p| (p - STIFFNESS * exact_deflection()).abs() < 1e-7)
    );
    assert!(max_deflection_error(&fsi) < 1e-7);
}

#[test]
fn interpolators_rebuild_only_past_the_deformation_limit() {
    let (mut fsi, _) = interface(settings(CouplingSchemeKind::Aitken));
    let first = fsi.solid_to_fluid_interpolator().unwrap();
    let rebuilt: Vec<bool> = (1..=3)
        .map(|i| fsi.advance(step(i)).unwrap().interpolator_rebuilt)
        .collect();
    // step 1 starts undeformed; the settled wall moves two edge lengths
    assert_eq!(rebuilt, vec![false, true, false]);
    let latest = fsi.solid_to_fluid_interpolator().unwrap();
    assert!(!Arc::ptr_eq(&first, &latest));
    assert_eq!(fsi.interpolator_builds(), (2, 2));

    let stiff_limit = CouplingSettings {
        interface_deformation_limit: 100.0,
        ..settings(CouplingSchemeKind::Aitken)
    };
    let (mut fsi, _) = interface(stiff_limit);
    let first = fsi.solid_to_fluid_interpolator().unwrap();
    for i in 1..=3 {
        assert!(!fsi.advance(step(i)).unwrap().interpolator_rebuilt);
    }
    let latest = fsi.solid_to_fluid_interpolator().unwrap();
    assert!(Arc::ptr_eq(&first, &latest));
    assert_eq!(fsi.interpolator_builds(), (1, 1));
}

#[test]
fn interpolators_are_rebuilt_together_from_one_snapshot() {
    let (mut fsi, _) = interface(settings(CouplingSchemeKind::Aitken));
    fsi.begin_time_step(step(1));
    fsi.update_force().unwrap();
    assert_eq!(fsi.interpolator_builds(), (1, 1));
    assert!(fsi.solve_time_step().unwrap().converged);
    assert_eq!(fsi.interpolator_builds(), (1, 1));
    assert!(fsi.tracker().build_displacement().iter().all(|d| d.norm() == 0.0));
    let settled = fsi.tracker().displacement().to_vec();
    assert!(settled.iter().all(|d| (d.z - exact_deflection()).abs() < 1e-6));

    // invalidated here, rebuilt at first use
    fsi.begin_time_step(step(2));
    assert_eq!(fsi.interpolator_builds(), (1, 1));
    fsi.update_force().unwrap();
    assert_eq!(fsi.interpolator_builds(), (2, 2));
    assert_eq!(fsi.tracker().build_displacement(), settled.as_slice());

    // the solid moves before the displacement transfer; no second build
    let push = vec![Vec3::new(0.0, 0.0, 3.0); 9];
    let stress = fsi.stress_mut();
    stress
        .set_traction(PatchId::from_index(1), ZoneId::from_index(1), &push)
        .unwrap();
    stress.evolve();
    fsi.update_displacement().unwrap();
    assert!(fsi.tracker().displacement().iter().all(|d| (d.z - 3.0).abs() < 1e-12));
    assert_eq!(fsi.interpolator_builds(), (2, 2));
    assert_eq!(fsi.tracker().build_displacement(), settled.as_slice());

    let report = fsi.solve_time_step().unwrap();
    assert!(report.interpolator_rebuilt);
    assert!(report.converged);
}

#[test]
fn resting_interface_converges_at_once_with_default_scale() {
    let defaults = CouplingSettings {
        fluid_zone: "wall".to_string(),
        fluid_patch: "wall".to_string(),
        solid_zone: "wall".to_string(),
        solid_patch: "wall".to_string(),
        ..Default::default()
    };
    assert_eq!(defaults.residual_scale, ResidualScale::ZoneSize);
    let (mut fsi, _) = interface(defaults);
    let reports: Vec<_> = (1..=4).map(|i| fsi.advance(step(i)).unwrap()).collect();
    assert!(reports[0].converged);
    for report in &reports[1..] {
        assert!(report.converged, "step {} did not converge", report.index);
        assert!(
            report.outer_iterations <= 2,
            "step {} took {} iterations",
            report.index,
            report.outer_iterations
        );
    }
    assert!(max_deflection_error(&fsi) < 1e-6);
}

#[test]
fn periodic_interpolator_update() {
    let periodic = CouplingSettings {
        interface_deformation_limit: 100.0,
        interpolator_update_frequency: 2,
        ..settings(CouplingSchemeKind::Aitken)
    };
    let (mut fsi, _) = interface(periodic);
    let rebuilt: Vec<bool> = (1..=4)
        .map(|i| fsi.advance(step(i)).unwrap().interpolator_rebuilt)
        .collect();
    assert_eq!(rebuilt, vec![false, true, false, true]);
}

#[test]
fn predictor_seeds_the_next_step() {
    let predicted = CouplingSettings {
        predictor: true,
        ..settings(CouplingSchemeKind::Aitken)
    };
    let (mut fsi, counters) = interface(predicted);
    let reports: Vec<_> = (1..=3).map(|i| fsi.advance(step(i)).unwrap()).collect();
    assert!(reports.iter().all(|r| r.converged));
    // converged loads from the previous step already satisfy the interface
    assert_eq!(reports[1].outer_iterations, 1);
    assert_eq!(fsi.state().converged_steps(), 2);

    let outer: usize = reports.iter().map(|r| r.outer_iterations).sum();
    assert_eq!(Counters::get(&counters.flow_evolves), outer);
    assert_eq!(Counters::get(&counters.stress_evolves), outer + reports.len());
}

#[test]
fn missing_zone_is_a_setup_error() {
    let counters = Arc::new(Counters::default());
    let flow = ChamberFlow::new(2, P0, COMPLIANCE, counters.clone());
    let stress = SpringWall::new(2, STIFFNESS, counters);
    let wrong = CouplingSettings {
        solid_zone: "ceiling".to_string(),
        ..settings(CouplingSchemeKind::Aitken)
    };
    let err = FluidStructureInterface::serial(Box::new(flow), Box::new(stress), wrong)
        .err()
        .unwrap();
    match err {
        CouplingError::Setup { what } => assert!(what.contains("ceiling")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn solve_before_begin_is_rejected() {
    let (mut fsi, _) = interface(settings(CouplingSchemeKind::Aitken));
    assert!(matches!(
        fsi.solve_time_step(),
        Err(CouplingError::InvalidArg { .. })
    ));
}

#[test]
fn run_records_steps_probe_and_progress() {
    let (mut fsi, _) = interface(settings(CouplingSchemeKind::IqnIls));
    let opts = RunOptions {
        dt: s(0.1),
        t_end: s(0.3),
        probe: Some(ProbeOptions {
            location: Vec3::new(0.52, 0.49, 0.0),
            record_velocity: true,
        }),
        ..Default::default()
    };
    let mut seen: Vec<FsiProgress> = Vec::new();
    let mut cb = |p: FsiProgress| seen.push(p);
    let record = run_fsi_with_progress(&mut fsi, &opts, Some(&mut cb)).unwrap();

    assert_eq!(record.steps.len(), 3);
    assert!(record.all_converged());
    assert_eq!(seen.len(), 3);
    assert!((seen[2].fraction_complete - 1.0).abs() < 1e-12);
    let times = record.times();
    assert!((times[2] - 0.3).abs() < 1e-12);

    assert_eq!(record.probe.len(), 3);
    let first = &record.probe[0];
    assert!((first.displacement.z - exact_deflection()).abs() < 1e-7);
    // the wall settles within the first step, then stays put
    let v0 = first.velocity.unwrap();
    assert!((v0.z - exact_deflection() / 0.1).abs() < 1e-5);
    assert!(record.probe[2].velocity.unwrap().norm() < 1e-5);
}

#[test]
fn probe_picks_the_nearest_solid_point() {
    let (fsi, _) = interface(settings(CouplingSchemeKind::Aitken));
    // 3x3 wall: points at multiples of 1/3
    let probe = PointHistory::new(
        fsi.stress(),
        fsi.comm(),
        Vec3::new(0.3, 0.7, 0.1),
        false,
    )
    .unwrap();
    let p = probe.point().unwrap();
    let point = fsi.stress().mesh_points()[p];
    assert!((point - Vec3::new(1.0 / 3.0, 2.0 / 3.0, 0.0)).norm() < 1e-12);
    assert!((probe.distance() - (point - Vec3::new(0.3, 0.7, 0.1)).norm()).abs() < 1e-12);
}

#[test]
fn zero_length_run_does_nothing() {
    let (mut fsi, counters) = interface(settings(CouplingSchemeKind::Aitken));
    let opts = RunOptions {
        t_end: s(0.0),
        ..Default::default()
    };
    let record = run_fsi(&mut fsi, &opts).unwrap();
    assert!(record.steps.is_empty());
    assert_eq!(Counters::get(&counters.flow_evolves), 0);
}
