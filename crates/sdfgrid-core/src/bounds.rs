//! Axis-aligned bounding boxes and their behavior under affine maps
//!
//! Every destination grid is sized from these boxes, so all operations here err
//! on the side of over-approximation: a box may be larger than the region it bounds,
//! never smaller.

use glam::{Mat4, Vec3};

/// World- or local-space box, inclusive on both faces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box reaching `extents` either side of `center`
    pub fn from_center(center: Vec3, extents: Vec3) -> Self {
        Self::new(center - extents, center + extents)
    }

    /// Smallest box containing every point, or `None` for an empty iterator
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |acc, p| {
            Self::new(acc.min.min(p), acc.max.max(p))
        }))
    }

    /// Midpoint; the pivot `transform` maps as a point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-size along each axis
    pub fn extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Edge lengths, the quantity destination dimensions are rounded up from
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// The eight corners, x varying fastest
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Grown by `margin` on every face, e.g. to pad a bake around a surface
    pub fn expand(&self, margin: f32) -> Self {
        Self::new(
            self.min - Vec3::splat(margin),
            self.max + Vec3::splat(margin),
        )
    }

    /// Smallest box enclosing both; the destination box of a union
    pub fn union(&self, other: &Aabb) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// True when the boxes overlap or touch on every axis
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// The shared region of two boxes, `None` when they are disjoint on any axis
    pub fn intersect(&self, other: &Aabb) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        Some(Self::new(self.min.max(other.min), self.max.min(other.max)))
    }

    /// Re-fit the box after an affine map.
    ///
    /// The center is mapped as a point. Each basis column of `matrix` is scaled by the
    /// matching half-extent and the absolute contributions are summed per world axis.
    /// For rotations this encloses the rotated box, it does not hug it.
    pub fn transform(&self, matrix: &Mat4) -> Self {
        let extents = self.extents();
        let right = matrix.x_axis.truncate() * extents.x;
        let up = matrix.y_axis.truncate() * extents.y;
        let look = matrix.z_axis.truncate() * extents.z;

        Self::from_center(
            matrix.transform_point3(self.center()),
            right.abs() + up.abs() + look.abs(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Quat;

    fn unit() -> Aabb {
        Aabb::new(Vec3::ZERO, Vec3::ONE)
    }

    fn assert_box_eq(a: Aabb, b: Aabb) {
        for i in 0..3 {
            assert_relative_eq!(a.min[i], b.min[i], epsilon = 1e-5);
            assert_relative_eq!(a.max[i], b.max[i], epsilon = 1e-5);
        }
    }

    #[test]
    fn center_and_extents_round_trip() {
        let b = Aabb::from_center(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 1.0, 2.0));
        assert_eq!(b.min, Vec3::new(0.5, 1.0, 1.0));
        assert_eq!(b.max, Vec3::new(1.5, 3.0, 5.0));
        assert_eq!(b.center(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.extents(), Vec3::new(0.5, 1.0, 2.0));
    }

    #[test]
    fn union_encompasses_both() {
        let a = unit();
        let b = Aabb::new(Vec3::splat(3.0), Vec3::splat(4.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::ZERO);
        assert_eq!(u.max, Vec3::splat(4.0));
    }

    #[test]
    fn intersect_overlapping_boxes() {
        let a = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        let b = Aabb::new(Vec3::ONE, Vec3::splat(3.0));
        let i = a.intersect(&b).unwrap();
        assert_eq!(i.min, Vec3::ONE);
        assert_eq!(i.max, Vec3::splat(2.0));
    }

    #[test]
    fn intersect_disjoint_on_one_axis_is_none() {
        let a = unit();
        let b = Aabb::new(Vec3::new(0.0, 0.0, 1.5), Vec3::new(1.0, 1.0, 2.5));
        assert!(a.intersect(&b).is_none());
        assert!(!a.intersects(&b));
    }

    #[test]
    fn touching_boxes_intersect_with_zero_thickness() {
        let a = unit();
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let i = a.intersect(&b).unwrap();
        assert_eq!(i.size().x, 0.0);
    }

    #[test]
    fn transform_translation_moves_box() {
        let m = Mat4::from_translation(Vec3::new(5.0, -1.0, 2.0));
        let t = unit().transform(&m);
        assert_box_eq(t, Aabb::new(Vec3::new(5.0, -1.0, 2.0), Vec3::new(6.0, 0.0, 3.0)));
    }

    #[test]
    fn transform_matches_corner_envelope() {
        let matrices = [
            Mat4::IDENTITY,
            Mat4::from_rotation_z(0.7),
            Mat4::from_scale_rotation_translation(
                Vec3::new(2.0, 0.5, 1.5),
                Quat::from_euler(glam::EulerRot::XYZ, 0.3, -1.1, 2.0),
                Vec3::new(-3.0, 4.0, 0.25),
            ),
        ];
        let local = Aabb::new(Vec3::ZERO, Vec3::new(4.0, 2.0, 3.0));

        for m in matrices {
            let refit = local.transform(&m);
            let envelope =
                Aabb::from_points(local.corners().map(|c| m.transform_point3(c))).unwrap();
            assert_box_eq(refit, envelope);
        }
    }

    #[test]
    fn transform_never_undersizes_under_shear() {
        let m = Mat4::from_cols_array(&[
            1.0, 0.0, 0.0, 0.0, //
            0.8, 1.0, 0.0, 0.0, //
            0.0, 0.3, 1.0, 0.0, //
            1.0, 2.0, 3.0, 1.0,
        ]);
        let local = Aabb::new(Vec3::ZERO, Vec3::splat(2.0));
        let refit = local.transform(&m);
        for c in local.corners() {
            assert!(refit.expand(1e-5).contains(m.transform_point3(c)));
        }
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }
}
