use fsi_core::{Real, Vec3, ZoneId};
use fsi_interp::{
    InterpolationMethod, InterpolationSettings, InterpolatorCache, Transfer, ZoneInterpolator,
};
use fsi_mesh::shapes::{rectangle_zone, triangulated_rectangle_zone};
use fsi_mesh::{Zone, ZoneBuilder};
use proptest::prelude::*;

fn plate(id: u32, nu: usize, nv: usize, z: Real) -> Zone {
    rectangle_zone(
        ZoneId::from_index(id),
        format!("plate{id}"),
        Vec3::new(0.0, 0.0, z),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 0.5, 0.0),
        nu,
        nv,
    )
    .unwrap()
}

/// Same geometry as `zone` with points and faces numbered in reverse.
fn renumbered(zone: &Zone) -> Zone {
    let n = zone.n_points();
    let mut builder = ZoneBuilder::new(ZoneId::from_index(9), "renumbered");
    for p in zone.points().iter().rev() {
        builder.add_point(*p);
    }
    for face in zone.faces().iter().rev() {
        let pts: Vec<usize> = face.points.iter().map(|&p| n - 1 - p).collect();
        builder.add_face(pts);
    }
    builder.build().unwrap()
}

/// Unit square plus a zero-area triangle along its diagonal.
fn square_with_sliver() -> Zone {
    let mut builder = ZoneBuilder::new(ZoneId::from_index(5), "sliver");
    let p0 = builder.add_point(Vec3::new(0.0, 0.0, 0.0));
    let p1 = builder.add_point(Vec3::new(1.0, 0.0, 0.0));
    let p2 = builder.add_point(Vec3::new(1.0, 1.0, 0.0));
    let p3 = builder.add_point(Vec3::new(0.0, 1.0, 0.0));
    let mid = builder.add_point(Vec3::new(0.5, 0.5, 0.0));
    builder.add_face([p0, p1, p2, p3]);
    builder.add_face([p0, mid, p2]);
    builder.build().unwrap()
}

#[test]
fn zero_area_target_face_still_receives_a_value() {
    let source = rectangle_zone(
        ZoneId::from_index(0),
        "square",
        Vec3::zeros(),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        2,
        2,
    )
    .unwrap();
    let target = square_with_sliver();
    for method in [InterpolationMethod::Ggi, InterpolationMethod::Projection] {
        let settings = InterpolationSettings::with_method(method);
        let interp = ZoneInterpolator::build(&source, &target, &settings).unwrap();
        let out = interp
            .interpolate_faces_scalar(&[7.0; 4], Transfer::AreaWeighted)
            .unwrap();
        for (t, v) in out.iter().enumerate() {
            assert!((v - 7.0).abs() < 1e-12, "{method:?} face {t}: {v}");
        }
        let rows = interp.face_weights(Transfer::AreaWeighted).row_sums();
        assert!(rows.iter().all(|s| (s - 1.0).abs() < 1e-12), "{method:?}");
    }
}

#[test]
fn matching_zones_give_a_permutation() {
    for method in [InterpolationMethod::Ggi, InterpolationMethod::Projection] {
        let source = plate(0, 2, 2, 0.0);
        let target = renumbered(&source);
        let settings = InterpolationSettings::with_method(method);
        let interp = ZoneInterpolator::build(&source, &target, &settings).unwrap();

        let faces = interp.face_weights(Transfer::AreaWeighted);
        for t in 0..faces.n_target() {
            let row: Vec<_> = faces.row(t).collect();
            assert_eq!(row, vec![(source.n_faces() - 1 - t, 1.0)], "{method:?} face {t}");
        }
        let points = interp.point_weights();
        for t in 0..points.n_target() {
            let row: Vec<_> = points.row(t).collect();
            assert_eq!(row, vec![(source.n_points() - 1 - t, 1.0)], "{method:?} point {t}");
        }

        let values: Vec<Real> = (0..source.n_faces()).map(|f| f as Real * 1.5).collect();
        let mapped = interp
            .interpolate_faces_scalar(&values, Transfer::AreaWeighted)
            .unwrap();
        let expected: Vec<Real> = values.iter().rev().copied().collect();
        assert_eq!(mapped, expected);
    }
}

#[test]
fn repeated_calls_are_bit_identical() {
    let source = plate(0, 5, 3, 0.0);
    let target = triangulated_rectangle_zone(
        ZoneId::from_index(1),
        "tri",
        Vec3::new(0.0, 0.0, 0.002),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 0.5, 0.0),
        3,
        4,
    )
    .unwrap();
    let interp = ZoneInterpolator::build(&source, &target, &Default::default()).unwrap();
    let field: Vec<Vec3> = source
        .points()
        .iter()
        .map(|p| Vec3::new(p.x.sin(), p.y * p.y, 0.1))
        .collect();
    let a = interp.interpolate_points_vector(&field).unwrap();
    let b = interp.interpolate_points_vector(&field).unwrap();
    assert_eq!(a.len(), target.n_points());
    assert_eq!(a, b);

    let rebuilt = ZoneInterpolator::build(&source, &target, &Default::default()).unwrap();
    assert_eq!(rebuilt.point_weights(), interp.point_weights());
    assert_eq!(
        rebuilt.face_weights(Transfer::Conservative),
        interp.face_weights(Transfer::Conservative)
    );
}

#[test]
fn cache_hands_out_shared_weights() {
    let source = plate(0, 3, 3, 0.0);
    let target = plate(1, 2, 2, 0.0);
    let mut cache = InterpolatorCache::new(InterpolationSettings::default());
    let first = cache.get_or_build(&source, &target).unwrap();
    let second = cache.get_or_build(&source, &target).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(cache.builds(), 1);
}

fn method() -> impl Strategy<Value = InterpolationMethod> {
    prop_oneof![
        Just(InterpolationMethod::Ggi),
        Just(InterpolationMethod::Projection)
    ]
}

proptest! {
    #[test]
    fn constants_survive_area_weighted_transfer(
        nu_s in 1_usize..6,
        nv_s in 1_usize..6,
        nu_t in 1_usize..6,
        nv_t in 1_usize..6,
        gap in -0.01_f64..0.01,
        value in -10.0_f64..10.0,
        method in method(),
    ) {
        let source = plate(0, nu_s, nv_s, 0.0);
        let target = plate(1, nu_t, nv_t, gap);
        let settings = InterpolationSettings::with_method(method);
        let interp = ZoneInterpolator::build(&source, &target, &settings).unwrap();

        let faces = interp
            .interpolate_faces_scalar(&vec![value; source.n_faces()], Transfer::AreaWeighted)
            .unwrap();
        prop_assert_eq!(faces.len(), target.n_faces());
        for v in faces {
            prop_assert!((v - value).abs() <= 1e-9 * (1.0 + value.abs()));
        }

        let points = interp
            .interpolate_points_scalar(&vec![value; source.n_points()])
            .unwrap();
        prop_assert_eq!(points.len(), target.n_points());
        for v in points {
            prop_assert!((v - value).abs() <= 1e-9 * (1.0 + value.abs()));
        }
    }

    #[test]
    fn conservative_transfer_keeps_total(
        nu_s in 1_usize..6,
        nv_s in 1_usize..6,
        nu_t in 1_usize..6,
        nv_t in 1_usize..6,
        forces in prop::collection::vec(-5.0_f64..5.0, 25),
        method in method(),
    ) {
        let source = plate(0, nu_s, nv_s, 0.0);
        let target = triangulated_rectangle_zone(
            ZoneId::from_index(1),
            "tri",
            Vec3::zeros(),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.5, 0.0),
            nu_t,
            nv_t,
        )
        .unwrap();
        let settings = InterpolationSettings::with_method(method);
        let interp = ZoneInterpolator::build(&source, &target, &settings).unwrap();

        let field = &forces[..source.n_faces()];
        let out = interp
            .interpolate_faces_scalar(field, Transfer::Conservative)
            .unwrap();
        let before: Real = field.iter().sum();
        let after: Real = out.iter().sum();
        prop_assert!((before - after).abs() <= 1e-9 * (1.0 + before.abs()));
    }
}
