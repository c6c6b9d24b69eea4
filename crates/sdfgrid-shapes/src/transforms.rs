//! Placement and union of analytic shapes

use crate::Sdf;
use glam::{Mat4, Quat, Vec3};
use sdfgrid_core::bounds::Aabb;

pub struct Translate<S: Sdf> {
    pub inner: S,
    pub offset: Vec3,
}

impl<S: Sdf> Translate<S> {
    pub fn new(inner: S, offset: Vec3) -> Self {
        Self { inner, offset }
    }
}

impl<S: Sdf> Sdf for Translate<S> {
    fn distance(&self, p: Vec3) -> f32 {
        self.inner.distance(p - self.offset)
    }

    fn bounds(&self) -> Aabb {
        let b = self.inner.bounds();
        Aabb::new(b.min + self.offset, b.max + self.offset)
    }
}

pub struct Rotate<S: Sdf> {
    pub inner: S,
    pub rotation: Quat,
    inverse: Quat,
}

impl<S: Sdf> Rotate<S> {
    pub fn new(inner: S, rotation: Quat) -> Self {
        Self {
            inner,
            rotation,
            inverse: rotation.inverse(),
        }
    }
}

impl<S: Sdf> Sdf for Rotate<S> {
    fn distance(&self, p: Vec3) -> f32 {
        self.inner.distance(self.inverse * p)
    }

    fn bounds(&self) -> Aabb {
        self.inner.bounds().transform(&Mat4::from_quat(self.rotation))
    }
}

/// Union (OR) of two shapes
pub struct Union<A: Sdf, B: Sdf> {
    pub a: A,
    pub b: B,
}

impl<A: Sdf, B: Sdf> Union<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

impl<A: Sdf, B: Sdf> Sdf for Union<A, B> {
    fn distance(&self, p: Vec3) -> f32 {
        self.a.distance(p).min(self.b.distance(p))
    }

    fn bounds(&self) -> Aabb {
        self.a.bounds().union(&self.b.bounds())
    }
}
