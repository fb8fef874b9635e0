//! Collision shapes attached to rigid bodies.
//!
//! A [`Collider`] is one of four primitive shapes. Each variant keeps a copy
//! of the owning body's world transform plus any dimensions derived from the
//! body's scale, so the narrow phase can read everything it needs without
//! going back to the body.
//!
//! Capsules and cylinders are always upright: their axis is world Y no matter
//! how the body is rotated.

use nalgebra::{Matrix3, UnitQuaternion, Vector3};

use crate::geometry::Obb;

/// Discriminant of a [`Collider`], useful for logging and dispatch tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeKind {
    Box,
    Capsule,
    Cylinder,
    Sphere,
}

/// An oriented box.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxCollider {
    half_extents: Vector3<f32>,
    scaled_half_extents: Vector3<f32>,
    position: Vector3<f32>,
    rotation: UnitQuaternion<f32>,
    rotation_matrix: Matrix3<f32>,
}

impl BoxCollider {
    pub fn new(half_extents: Vector3<f32>) -> Self {
        Self {
            half_extents,
            scaled_half_extents: half_extents,
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            rotation_matrix: Matrix3::identity(),
        }
    }

    /// World position of the center.
    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    /// Half-extents as constructed, before scaling.
    pub fn half_extents(&self) -> Vector3<f32> {
        self.half_extents
    }

    /// Half-extents after the body's scale has been applied.
    pub fn scaled_half_extents(&self) -> Vector3<f32> {
        self.scaled_half_extents
    }

    pub fn rotation_matrix(&self) -> &Matrix3<f32> {
        &self.rotation_matrix
    }

    /// The box as a world-space [`Obb`].
    pub fn obb(&self) -> Obb {
        Obb::new(self.position, &self.rotation_matrix, self.scaled_half_extents)
    }

    fn update_transform(&mut self, pos: Vector3<f32>, rot: UnitQuaternion<f32>, scale: Vector3<f32>) {
        self.scaled_half_extents = self.half_extents.component_mul(&scale);
        self.position = pos;
        self.rotation = rot;
        self.rotation_matrix = *rot.to_rotation_matrix().matrix();
    }

    fn local_inertia(&self, mass: f32) -> Vector3<f32> {
        let s = self.scaled_half_extents * 2.0;
        let k = mass / 12.0;
        Vector3::new(
            k * (s.y * s.y + s.z * s.z),
            k * (s.x * s.x + s.z * s.z),
            k * (s.x * s.x + s.y * s.y),
        )
    }
}

/// A Y-aligned capsule: a segment of length `height` swept by `radius`.
///
/// Radius and height are not affected by scale.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapsuleCollider {
    radius: f32,
    height: f32,
    position: Vector3<f32>,
    rotation: UnitQuaternion<f32>,
    scale: Vector3<f32>,
}

impl CapsuleCollider {
    pub fn new(radius: f32, height: f32) -> Self {
        Self {
            radius,
            height,
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// World position of the center.
    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Length of the inner segment (excluding the hemispherical caps).
    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    /// Upper end of the inner segment.
    pub fn top(&self) -> Vector3<f32> {
        self.position + Vector3::new(0.0, self.height * 0.5, 0.0)
    }

    /// Lower end of the inner segment.
    pub fn bottom(&self) -> Vector3<f32> {
        self.position - Vector3::new(0.0, self.height * 0.5, 0.0)
    }

    /// Scale is recorded but never applied to the radius or height.
    fn update_transform(&mut self, pos: Vector3<f32>, rot: UnitQuaternion<f32>, scale: Vector3<f32>) {
        self.position = pos;
        self.scale = scale;
        self.rotation = rot;
    }

    fn local_inertia(&self, mass: f32) -> Vector3<f32> {
        upright_inertia(mass, self.radius, self.height)
    }
}

/// A Y-aligned solid cylinder.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CylinderCollider {
    radius: f32,
    height: f32,
    scaled_radius: f32,
    scaled_height: f32,
    position: Vector3<f32>,
    rotation: UnitQuaternion<f32>,
}

impl CylinderCollider {
    pub fn new(radius: f32, height: f32) -> Self {
        Self {
            radius,
            height,
            scaled_radius: radius,
            scaled_height: height,
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// World position of the center.
    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Radius scaled by the mean of the X and Z scale factors.
    pub fn scaled_radius(&self) -> f32 {
        self.scaled_radius
    }

    /// Height scaled by the Y scale factor.
    pub fn scaled_height(&self) -> f32 {
        self.scaled_height
    }

    fn update_transform(&mut self, pos: Vector3<f32>, rot: UnitQuaternion<f32>, scale: Vector3<f32>) {
        self.position = pos;
        self.scaled_radius = self.radius * (scale.x + scale.z) * 0.5;
        self.scaled_height = self.height * scale.y;
        self.rotation = rot;
    }

    fn local_inertia(&self, mass: f32) -> Vector3<f32> {
        upright_inertia(mass, self.scaled_radius, self.scaled_height)
    }
}

/// A sphere.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SphereCollider {
    radius: f32,
    scaled_radius: f32,
    position: Vector3<f32>,
    rotation: UnitQuaternion<f32>,
}

impl SphereCollider {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            scaled_radius: radius,
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// World position of the center.
    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Radius scaled by the largest scale component.
    pub fn scaled_radius(&self) -> f32 {
        self.scaled_radius
    }

    fn update_transform(&mut self, pos: Vector3<f32>, rot: UnitQuaternion<f32>, scale: Vector3<f32>) {
        self.position = pos;
        self.scaled_radius = self.radius * scale.x.max(scale.y).max(scale.z);
        self.rotation = rot;
    }

    fn local_inertia(&self, mass: f32) -> Vector3<f32> {
        let i = 0.4 * mass * self.scaled_radius * self.scaled_radius;
        Vector3::new(i, i, i)
    }
}

/// Diagonal inertia of a Y-aligned solid cylinder; also used for capsules.
fn upright_inertia(mass: f32, r: f32, h: f32) -> Vector3<f32> {
    let axial = 0.5 * mass * r * r;
    let transverse = mass / 12.0 * (3.0 * r * r + h * h);
    Vector3::new(transverse, axial, transverse)
}

/// A collision shape attached to a [`RigidBody`](crate::body::RigidBody).
///
/// The shape is centered on the body's position. Its cached transform is
/// refreshed by the body whenever the body moves.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Collider {
    Box(BoxCollider),
    Capsule(CapsuleCollider),
    Cylinder(CylinderCollider),
    Sphere(SphereCollider),
}

impl Collider {
    /// A box with the given half-extents.
    pub fn cuboid(half_extents: Vector3<f32>) -> Self {
        Collider::Box(BoxCollider::new(half_extents))
    }

    /// An upright capsule; `height` is the length of the inner segment.
    pub fn capsule(radius: f32, height: f32) -> Self {
        Collider::Capsule(CapsuleCollider::new(radius, height))
    }

    /// An upright cylinder.
    pub fn cylinder(radius: f32, height: f32) -> Self {
        Collider::Cylinder(CylinderCollider::new(radius, height))
    }

    pub fn sphere(radius: f32) -> Self {
        Collider::Sphere(SphereCollider::new(radius))
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Collider::Box(_) => ShapeKind::Box,
            Collider::Capsule(_) => ShapeKind::Capsule,
            Collider::Cylinder(_) => ShapeKind::Cylinder,
            Collider::Sphere(_) => ShapeKind::Sphere,
        }
    }

    /// World position of the shape's center.
    pub fn position(&self) -> Vector3<f32> {
        match self {
            Collider::Box(b) => b.position,
            Collider::Capsule(c) => c.position,
            Collider::Cylinder(c) => c.position,
            Collider::Sphere(s) => s.position,
        }
    }

    /// World rotation last pushed by the owning body.
    pub fn rotation(&self) -> UnitQuaternion<f32> {
        match self {
            Collider::Box(b) => b.rotation,
            Collider::Capsule(c) => c.rotation,
            Collider::Cylinder(c) => c.rotation,
            Collider::Sphere(s) => s.rotation,
        }
    }

    /// Refresh the cached world transform and every scale-derived dimension.
    pub fn update_transform(&mut self, pos: Vector3<f32>, rot: UnitQuaternion<f32>, scale: Vector3<f32>) {
        match self {
            Collider::Box(b) => b.update_transform(pos, rot, scale),
            Collider::Capsule(c) => c.update_transform(pos, rot, scale),
            Collider::Cylinder(c) => c.update_transform(pos, rot, scale),
            Collider::Sphere(s) => s.update_transform(pos, rot, scale),
        }
    }

    /// Diagonal inertia in the shape's local frame for the given mass.
    ///
    /// Returns zero for non-positive mass.
    pub fn local_inertia(&self, mass: f32) -> Vector3<f32> {
        if mass <= 0.0 {
            return Vector3::zeros();
        }
        match self {
            Collider::Box(b) => b.local_inertia(mass),
            Collider::Capsule(c) => c.local_inertia(mass),
            Collider::Cylinder(c) => c.local_inertia(mass),
            Collider::Sphere(s) => s.local_inertia(mass),
        }
    }

    /// An oriented box enclosing the shape.
    ///
    /// Boxes return themselves; the upright shapes return a Y-aligned box.
    pub fn bounding_obb(&self) -> Obb {
        match self {
            Collider::Box(b) => b.obb(),
            Collider::Capsule(c) => Obb::axis_aligned(
                c.position,
                Vector3::new(c.radius, c.height * 0.5 + c.radius, c.radius),
            ),
            Collider::Cylinder(c) => Obb::axis_aligned(
                c.position,
                Vector3::new(c.scaled_radius, c.scaled_height * 0.5, c.scaled_radius),
            ),
            Collider::Sphere(s) => {
                let r = s.scaled_radius;
                Obb::axis_aligned(s.position, Vector3::new(r, r, r))
            }
        }
    }
}
