//! End-to-end properties of grid operations

// Tests are allowed to use expect/unwrap for cleaner error messages
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use sdfgrid_core::prelude::*;

/// Analytic sphere sampled at voxel centers
fn sphere(origin: Vec3, dims: u32, voxel_size: f32, radius: f32) -> Grid {
    let layout = GridLayout::new(UVec3::splat(dims), voxel_size, Mat4::from_translation(origin));
    let center = Vec3::splat(dims as f32 * voxel_size * 0.5);
    Grid::from_fn(layout, |v| {
        ((v.as_vec3() + 0.5) * voxel_size).distance(center) - radius
    })
    .expect("valid layout")
}

/// 4x4x4 unit grid, interior -1, boundary voxels 0
fn shell() -> Grid {
    let layout = GridLayout::new(UVec3::splat(4), 1.0, Mat4::IDENTITY);
    Grid::from_fn(layout, |v| {
        let on_boundary = v.cmpeq(UVec3::ZERO).any() || v.cmpeq(UVec3::splat(3)).any();
        if on_boundary { 0.0 } else { -1.0 }
    })
    .expect("valid layout")
}

#[test]
fn world_bounds_equal_transformed_corner_envelope() {
    let placements = [
        Mat4::IDENTITY,
        Mat4::from_translation(Vec3::new(-3.0, 1.0, 7.5)),
        Mat4::from_rotation_translation(Quat::from_rotation_x(1.2), Vec3::ONE),
        Mat4::from_scale_rotation_translation(
            Vec3::new(0.5, 2.0, 1.0),
            Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), 0.8),
            Vec3::new(4.0, -2.0, 0.0),
        ),
    ];

    for m in placements {
        let g = Grid::filled(GridLayout::new(UVec3::new(6, 3, 5), 0.2, m), 1.0).unwrap();
        let envelope =
            Aabb::from_points(g.local_bounds().corners().map(|c| m.transform_point3(c))).unwrap();
        let wb = g.world_bounds();
        for i in 0..3 {
            assert_relative_eq!(wb.min[i], envelope.min[i], epsilon = 1e-5);
            assert_relative_eq!(wb.max[i], envelope.max[i], epsilon = 1e-5);
        }
    }
}

#[test]
fn union_keeps_solid_regions_solid() {
    let ctx = SdfContext::default();
    let a = sphere(Vec3::ZERO, 10, 0.25, 1.0);
    let b = sphere(Vec3::new(1.75, 0.5, 0.0), 10, 0.25, 0.9);
    let u = union(&ctx, &a, &b).unwrap();

    let probes = [
        Vec3::splat(1.25),
        Vec3::new(2.9, 1.6, 1.2),
        Vec3::new(1.1, 1.9, 0.7),
        Vec3::new(3.4, 1.9, 1.3),
    ];
    for p in probes {
        let da = a.distance_at(p);
        let db = b.distance_at(p);
        if da <= 0.0 || db <= 0.0 {
            assert!(u.distance_at(p) <= 0.0, "point {p} should stay inside");
        }
        assert!(u.distance_at(p) <= da.min(db) + 1e-6);
    }
}

#[test]
fn intersection_of_disjoint_grids_is_empty() {
    let ctx = SdfContext::default();
    let a = sphere(Vec3::ZERO, 8, 0.5, 1.5);
    let b = sphere(Vec3::new(10.0, 0.0, 0.0), 8, 0.5, 1.5);
    assert!(intersects_bounds(&a, &b).is_none());
    assert!(intersection(&ctx, &a, &b, 0.0).unwrap().is_none());
}

#[test]
fn overlapping_spheres_intersect() {
    let ctx = SdfContext::default();
    let a = sphere(Vec3::ZERO, 8, 0.5, 1.5);
    let b = sphere(Vec3::new(2.0, 0.0, 0.0), 8, 0.5, 1.5);
    let hit = intersection(&ctx, &a, &b, 0.0).unwrap().expect("spheres overlap");
    assert!(hit.volume_voxel_count > 0);
    assert!(hit.grid.distance_at(Vec3::new(3.0, 2.0, 2.0)) <= 0.0);
}

#[test]
fn boundary_extrapolation_is_one_voxel_per_cell() {
    let g = shell();
    // One voxel past the x = 4 face
    assert_relative_eq!(g.distance_at(Vec3::new(4.5, 2.0, 2.0)), 1.0, epsilon = 1e-6);
    // Local x = 5 falls in cell 5, two cells past the last stored one
    assert_relative_eq!(g.distance_at(Vec3::new(5.0, 2.0, 2.0)), 2.0, epsilon = 1e-6);

    let interior = Grid::filled(GridLayout::new(UVec3::splat(4), 0.5, Mat4::IDENTITY), -1.0).unwrap();
    assert_relative_eq!(interior.distance_at(Vec3::new(2.25, 1.0, 1.0)), 0.5, epsilon = 1e-6);
}

#[test]
fn gradient_is_unit_length() {
    let g = sphere(Vec3::ZERO, 16, 0.25, 1.2);
    for p in [
        Vec3::new(3.1, 2.0, 2.0),
        Vec3::new(2.0, 0.9, 2.0),
        Vec3::new(2.6, 2.7, 1.4),
    ] {
        let n = g.gradient_at(p).unwrap();
        assert_relative_eq!(n.length(), 1.0, epsilon = 1e-5);
        // Points away from the sphere center
        assert!(n.dot(p - Vec3::splat(2.0)) > 0.0);
    }
}

#[test]
fn gradient_of_flat_field_is_an_error() {
    let g = Grid::filled(GridLayout::new(UVec3::splat(8), 1.0, Mat4::IDENTITY), -1.0).unwrap();
    assert!(matches!(
        g.gradient_at(Vec3::splat(4.0)),
        Err(Error::DegenerateGradient)
    ));
}

#[test]
fn identity_sweep_is_idempotent() {
    let ctx = SdfContext::default();
    let g = sphere(Vec3::new(1.0, -2.0, 0.5), 12, 0.25, 1.0);
    let swept = swept_volume(&ctx, &g, &[Mat4::IDENTITY]).unwrap();
    assert_eq!(swept.dimensions(), g.dimensions());
    for (s, o) in swept.voxel_data().iter().zip(g.voxel_data()) {
        assert_relative_eq!(*s, *o, epsilon = 1e-6);
    }
}

#[test]
fn union_of_separate_unit_grids_has_envelope_dimensions() {
    let ctx = SdfContext::default();
    let unit = |origin: Vec3| {
        Grid::filled(GridLayout::new(UVec3::ONE, 1.0, Mat4::from_translation(origin)), -0.5)
            .unwrap()
    };
    let a = unit(Vec3::ZERO);
    let b = unit(Vec3::new(3.0, 1.5, -2.0));
    let u = union(&ctx, &a, &b).unwrap();

    let envelope = a.world_bounds().union(&b.world_bounds()).size();
    let expected = envelope.ceil().as_uvec3();
    assert_eq!(expected, UVec3::new(4, 3, 3));
    assert_eq!(u.dimensions(), expected);
}

#[test]
fn rotated_grid_samples_through_its_transform() {
    let g = shell();
    let mut moved = g.clone();
    moved
        .set_local_to_world(Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2))
        .unwrap();
    // Local (1.5, 1.5, 1.5) lands at world (-1.5, 1.5, 1.5)
    assert_eq!(moved.distance_at(Vec3::new(-1.5, 1.5, 1.5)), -1.0);
    assert_eq!(g.distance_at(Vec3::new(1.5, 1.5, 1.5)), -1.0);
}

#[test]
fn sphere_carve_then_intersect_reports_remaining_overlap() {
    let ctx = SdfContext::default();
    let block = Grid::filled(GridLayout::new(UVec3::splat(8), 0.5, Mat4::IDENTITY), -1.0).unwrap();
    let carved = subtract_sphere(&ctx, &block, Vec3::splat(2.0), 1.0)
        .unwrap()
        .expect("block keeps solid voxels around the hole");
    let probe = sphere(Vec3::splat(1.0), 4, 0.5, 0.6);

    // Probe sits entirely inside the carved hole
    assert!(intersection(&ctx, &carved, &probe, 0.0).unwrap().is_none());
    // Without the carve the same probe overlaps the block
    assert!(intersection(&ctx, &block, &probe, 0.0).unwrap().is_some());
}

#[test]
fn subtraction_that_removes_everything_is_empty() {
    let ctx = SdfContext::default();
    let block = Grid::filled(GridLayout::new(UVec3::splat(2), 1.0, Mat4::IDENTITY), -1.0).unwrap();
    assert!(subtract_sphere(&ctx, &block, Vec3::ONE, 10.0).unwrap().is_none());
}

#[test]
fn union_too_large_to_count_is_resource_exhaustion() {
    let ctx = SdfContext::default();
    let speck = |origin: Vec3| {
        Grid::filled(GridLayout::new(UVec3::ONE, 1e-3, Mat4::from_translation(origin)), -1.0)
            .unwrap()
    };
    // 3e9 voxels per axis: the voxel count overflows u64
    let a = speck(Vec3::ZERO);
    let b = speck(Vec3::splat(3e6));
    assert!(matches!(
        union(&ctx, &a, &b),
        Err(Error::ResourceExhaustion(_))
    ));
}
