//! Analytic primitives, all centered at the origin

use crate::Sdf;
use glam::{Vec2, Vec3};
use sdfgrid_core::bounds::Aabb;

/// Create a sphere with given radius
pub fn sphere(radius: f32) -> Sphere {
    Sphere { radius }
}

/// Create a box with given half-extents
pub fn box3(half_extents: Vec3) -> Box3 {
    Box3 { half_extents }
}

/// Create a cube with given edge length
pub fn cube(size: f32) -> Box3 {
    box3(Vec3::splat(size * 0.5))
}

/// Create a Y-aligned cylinder with given radius and total height
pub fn cylinder(radius: f32, height: f32) -> Cylinder {
    Cylinder {
        radius,
        half_height: height * 0.5,
    }
}

/// Create a Y-aligned capsule; `height` is the length of the straight section
pub fn capsule(radius: f32, height: f32) -> Capsule {
    Capsule {
        radius,
        half_height: height * 0.5,
    }
}

/// Create a torus lying in the XZ plane
pub fn torus(major_radius: f32, minor_radius: f32) -> Torus {
    Torus {
        major_radius,
        minor_radius,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub radius: f32,
}

impl Sdf for Sphere {
    fn distance(&self, p: Vec3) -> f32 {
        p.length() - self.radius
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_center(Vec3::ZERO, Vec3::splat(self.radius))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3 {
    pub half_extents: Vec3,
}

impl Sdf for Box3 {
    fn distance(&self, p: Vec3) -> f32 {
        let q = p.abs() - self.half_extents;
        q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_center(Vec3::ZERO, self.half_extents)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    pub radius: f32,
    pub half_height: f32,
}

impl Sdf for Cylinder {
    fn distance(&self, p: Vec3) -> f32 {
        let d = Vec2::new(p.x.hypot(p.z), p.y).abs() - Vec2::new(self.radius, self.half_height);
        d.x.max(d.y).min(0.0) + d.max(Vec2::ZERO).length()
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_center(
            Vec3::ZERO,
            Vec3::new(self.radius, self.half_height, self.radius),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub radius: f32,
    pub half_height: f32,
}

impl Sdf for Capsule {
    fn distance(&self, p: Vec3) -> f32 {
        let y = p.y.clamp(-self.half_height, self.half_height);
        (p - Vec3::new(0.0, y, 0.0)).length() - self.radius
    }

    fn bounds(&self) -> Aabb {
        Aabb::from_center(
            Vec3::ZERO,
            Vec3::new(self.radius, self.half_height + self.radius, self.radius),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Torus {
    pub major_radius: f32,
    pub minor_radius: f32,
}

impl Sdf for Torus {
    fn distance(&self, p: Vec3) -> f32 {
        let q = Vec2::new(p.x.hypot(p.z) - self.major_radius, p.y);
        q.length() - self.minor_radius
    }

    fn bounds(&self) -> Aabb {
        let r = self.major_radius + self.minor_radius;
        Aabb::from_center(Vec3::ZERO, Vec3::new(r, self.minor_radius, r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sphere_distance() {
        let s = sphere(1.0);
        assert_relative_eq!(s.distance(Vec3::ZERO), -1.0);
        assert_relative_eq!(s.distance(Vec3::new(2.0, 0.0, 0.0)), 1.0);
        assert_relative_eq!(s.distance(Vec3::new(0.0, 1.0, 0.0)), 0.0);
    }

    #[test]
    fn box_distance() {
        let b = cube(2.0);
        assert_relative_eq!(b.distance(Vec3::ZERO), -1.0);
        assert_relative_eq!(b.distance(Vec3::new(3.0, 0.0, 0.0)), 2.0);
        // Outside a corner the distance is Euclidean
        assert_relative_eq!(b.distance(Vec3::new(4.0, 5.0, 1.0)), 5.0);
    }

    #[test]
    fn cylinder_distance() {
        let c = cylinder(1.0, 4.0);
        assert_relative_eq!(c.distance(Vec3::ZERO), -1.0);
        assert_relative_eq!(c.distance(Vec3::new(0.0, 3.0, 0.0)), 1.0);
        assert_relative_eq!(c.distance(Vec3::new(0.0, 0.0, 3.0)), 2.0);
    }

    #[test]
    fn capsule_distance() {
        let c = capsule(0.5, 2.0);
        assert_relative_eq!(c.distance(Vec3::ZERO), -0.5);
        assert_relative_eq!(c.distance(Vec3::new(0.0, 2.5, 0.0)), 1.0);
        assert_relative_eq!(c.distance(Vec3::new(1.5, 1.0, 0.0)), 1.0);
    }

    #[test]
    fn torus_distance() {
        let t = torus(2.0, 0.5);
        assert_relative_eq!(t.distance(Vec3::new(2.0, 0.0, 0.0)), -0.5);
        assert_relative_eq!(t.distance(Vec3::ZERO), 1.5);
    }

    #[test]
    fn bounds_enclose_surface() {
        let cases: [(&dyn Sdf, Vec3); 3] = [
            (&capsule(0.5, 2.0), Vec3::new(0.5, 1.5, 0.5)),
            (&torus(2.0, 0.5), Vec3::new(2.5, 0.5, 2.5)),
            (&cylinder(1.0, 3.0), Vec3::new(1.0, 1.5, 1.0)),
        ];
        for (shape, extents) in cases {
            assert_eq!(shape.bounds().max, extents);
            assert_eq!(shape.bounds().min, -extents);
        }
    }
}
