//! The simulation world: body registry, per-frame stepping and contact
//! resolution.
//!
//! Every step integrates the dynamic bodies, then runs a fixed number of
//! all-pairs resolution passes. There is no broad phase: each pass tests every
//! pair `i < j` in insertion order and resolves a contact as soon as it is
//! found, so later pairs see the corrections made for earlier ones.
//!
//! # Example
//! ```
//! use block_physics::{Collider, PhysicsWorld, RigidBody};
//! use nalgebra::Vector3;
//!
//! let mut world = PhysicsWorld::<16>::new();
//!
//! let floor = RigidBody::new_static(Collider::cuboid(Vector3::new(50.0, 10.0, 50.0)));
//! world.add_body(floor).unwrap();
//!
//! let ball = RigidBody::new(Collider::sphere(5.0), 1.0)
//!     .with_position(Vector3::new(0.0, 40.0, 0.0));
//! let id = world.add_body(ball).unwrap();
//!
//! for _ in 0..120 {
//!     world.step(1.0 / 60.0);
//! }
//! assert!(world.body(id).unwrap().is_on_ground());
//! ```

use log::{debug, trace, warn};
use nalgebra::{UnitQuaternion, Vector3};

use crate::body::RigidBody;
use crate::error::PhysicsError;
use crate::geometry::{ray_obb, EPSILON};
use crate::narrowphase::check_collision;

/// Handle to a body registered in a [`PhysicsWorld`].
///
/// Ids are never reused within one world, so a stale id simply stops
/// resolving after its body is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(usize);

impl BodyId {
    pub(crate) const fn from_raw(raw: usize) -> Self {
        BodyId(raw)
    }
}

/// Tunables for a [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldConfig {
    /// Gravity vector. Bodies receive `gravity · mass · dt` per step.
    pub gravity: Vector3<f32>,
    /// Resolution passes per step.
    pub iterations: u32,
    /// A contact normal with a Y component above this grounds the dynamic
    /// bodies involved.
    pub ground_normal_threshold: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vector3::new(0.0, -300.0, 0.0),
            iterations: 8,
            ground_normal_threshold: 0.7,
        }
    }
}

impl WorldConfig {
    /// Builder: set the gravity vector.
    pub fn with_gravity(mut self, gravity: Vector3<f32>) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder: set the number of resolution passes per step.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Builder: set the minimum contact normal `y` that grounds a body.
    pub fn with_ground_normal_threshold(mut self, threshold: f32) -> Self {
        self.ground_normal_threshold = threshold;
        self
    }
}

/// Result of [`PhysicsWorld::raycast`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub body: BodyId,
    /// Distance from the ray origin along the normalized direction.
    pub distance: f32,
    /// World-space entry point.
    pub point: Vector3<f32>,
}

/// The physics simulation world.
///
/// # Type Parameters
/// * `N` - Maximum number of bodies (compile-time capacity).
pub struct PhysicsWorld<const N: usize> {
    bodies: heapless::Vec<(BodyId, RigidBody), N>,
    config: WorldConfig,
    next_id: usize,
}

impl<const N: usize> Default for PhysicsWorld<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PhysicsWorld<N> {
    /// Create an empty world with the default [`WorldConfig`].
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create an empty world with the given configuration.
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            bodies: heapless::Vec::new(),
            config,
            next_id: 0,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut WorldConfig {
        &mut self.config
    }

    /// Set the gravity vector (e.g., `Vector3::new(0.0, -300.0, 0.0)`).
    pub fn set_gravity(&mut self, gravity: Vector3<f32>) {
        self.config.gravity = gravity;
    }

    /// Current gravity vector.
    pub fn gravity(&self) -> Vector3<f32> {
        self.config.gravity
    }

    // -- Registry --

    /// Register a body and return its id.
    pub fn add_body(&mut self, body: RigidBody) -> Result<BodyId, PhysicsError> {
        let id = BodyId::from_raw(self.next_id);
        let kind = body.collider().kind();
        if self.bodies.push((id, body)).is_err() {
            warn!("physics world full (max {}), body rejected", N);
            return Err(PhysicsError::WorldFull { capacity: N });
        }
        self.next_id += 1;
        debug!("added body {:?} ({:?})", id, kind);
        Ok(id)
    }

    /// Unregister a body, handing it back to the caller.
    ///
    /// Removing an id that is not registered returns `None` and changes
    /// nothing. The remaining bodies keep their relative order.
    pub fn remove_body(&mut self, id: BodyId) -> Option<RigidBody> {
        let index = self.index_of(id)?;
        let (_, body) = self.bodies.remove(index);
        debug!("removed body {:?}", id);
        Some(body)
    }

    /// Get an immutable reference to a body by its ID.
    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.iter().find(|(i, _)| *i == id).map(|(_, b)| b)
    }

    /// Get a mutable reference to a body by its ID.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.iter_mut().find(|(i, _)| *i == id).map(|(_, b)| b)
    }

    /// Whether `id` names a registered body.
    pub fn contains(&self, id: BodyId) -> bool {
        self.index_of(id).is_some()
    }

    /// Returns the number of registered bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Iterate over all bodies in insertion order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &RigidBody)> {
        self.bodies.iter().map(|(id, b)| (*id, b))
    }

    /// Teleport a body, zeroing its linear and angular velocity.
    ///
    /// Owners of static bodies call this every frame to keep the physics
    /// copy in step with their own transform.
    pub fn set_body_transform(
        &mut self,
        id: BodyId,
        position: Vector3<f32>,
        orientation: UnitQuaternion<f32>,
        scale: Vector3<f32>,
    ) -> Result<(), PhysicsError> {
        let body = self.body_mut(id).ok_or(PhysicsError::UnknownBody(id))?;
        body.set_transform(position, orientation, scale);
        body.set_velocity(Vector3::zeros());
        body.set_angular_velocity(Vector3::zeros());
        Ok(())
    }

    fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.iter().position(|(i, _)| *i == id)
    }

    // -- Simulation --

    /// Advance the simulation by `dt` seconds.
    ///
    /// Integrates every dynamic body, runs [`WorldConfig::iterations`]
    /// resolution passes, then clears the downward velocity of grounded
    /// bodies.
    ///
    /// # Insertion order
    ///
    /// Pairs are visited in insertion order and the contact normal points
    /// from the earlier body to the later one. A body is grounded only when
    /// that normal points up, so supporting bodies must be added before the
    /// bodies that rest on them. A ball added before its floor is never
    /// grounded: gravity keeps accelerating it, static contacts carry no
    /// impulse, and it eventually tunnels through the floor.
    pub fn step(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        for (_, body) in self.bodies.iter_mut() {
            body.set_on_ground(false);
            body.integrate(dt, gravity);
        }

        for _ in 0..self.config.iterations {
            self.resolve_collisions();
        }

        for (_, body) in self.bodies.iter_mut() {
            if body.is_dynamic() && body.is_on_ground() {
                let mut velocity = body.velocity();
                if velocity.y < 0.0 {
                    velocity.y = 0.0;
                    body.set_velocity(velocity);
                }
            }
        }
    }

    /// Run one resolution pass over every pair of bodies.
    ///
    /// Pairs where neither body is dynamic are skipped.
    pub fn resolve_collisions(&mut self) {
        let threshold = self.config.ground_normal_threshold;
        let len = self.bodies.len();

        for i in 0..len {
            for j in (i + 1)..len {
                let (head, tail) = self.bodies.split_at_mut(j);
                let (id_a, a) = &mut head[i];
                let (id_b, b) = &mut tail[0];

                if !a.is_dynamic() && !b.is_dynamic() {
                    continue;
                }

                if let Some(push) = check_collision(a.collider(), b.collider()) {
                    trace!("contact {:?} -> {:?}: push {:?}", id_a, id_b, push);
                    resolve_contact(a, b, push, threshold);
                }
            }
        }
    }

    /// Cast a ray against the bounding box of every body.
    ///
    /// Returns the nearest hit in front of `origin`. Rays starting inside a
    /// body do not report that body.
    pub fn raycast(&self, origin: Vector3<f32>, dir: Vector3<f32>) -> Option<RayHit> {
        let len = dir.norm();
        if len < EPSILON {
            return None;
        }
        let unit = dir / len;

        let mut nearest: Option<RayHit> = None;
        for (id, body) in self.bodies.iter() {
            let obb = body.collider().bounding_obb();
            if let Some(distance) = ray_obb(&origin, &unit, &obb) {
                if nearest.map_or(true, |hit| distance < hit.distance) {
                    nearest = Some(RayHit {
                        body: *id,
                        distance,
                        point: origin + unit * distance,
                    });
                }
            }
        }
        nearest
    }
}

/// Resolve one contact between `a` and `b`.
///
/// `push` points from `a` toward `b` and its length is the penetration depth.
fn resolve_contact(a: &mut RigidBody, b: &mut RigidBody, push: Vector3<f32>, ground_threshold: f32) {
    let depth = push.norm();
    if depth <= EPSILON {
        return;
    }
    let normal = push / depth;

    if normal.y > ground_threshold {
        if a.is_dynamic() {
            a.set_on_ground(true);
        }
        if b.is_dynamic() {
            b.set_on_ground(true);
        }
    }

    // Zero-mass bodies make the denominator infinite, which leaves t = 0.
    let vel_along_normal = (b.velocity() - a.velocity()).dot(&normal);
    let restitution = a.restitution().min(b.restitution());
    let inv_mass_sum = a.mass().recip() + b.mass().recip();
    let t = if inv_mass_sum.is_finite() && inv_mass_sum > 0.0 {
        -(1.0 + restitution) * vel_along_normal / inv_mass_sum
    } else {
        0.0
    };
    let impulse = normal * t;

    let contact = approximate_contact_point(a, b, &push);
    let rel_a = contact - a.position();
    let rel_b = contact - b.position();
    a.apply_impulse(-impulse, rel_a);
    b.apply_impulse(impulse, rel_b);

    match (a.is_dynamic(), b.is_dynamic()) {
        (true, true) => {
            a.translate(-push * 0.5);
            b.translate(push * 0.5);
        }
        (true, false) => a.translate(-push),
        (false, true) => b.translate(push),
        (false, false) => {}
    }
}

/// Approximate the contact point from the bodies' scale boxes.
///
/// Each body offers the corner of its half-scale box that faces the other
/// body along `push`, component by component; the contact is their midpoint.
/// This ignores the actual collider shapes.
fn approximate_contact_point(a: &RigidBody, b: &RigidBody, push: &Vector3<f32>) -> Vector3<f32> {
    let half_a = a.scale() * 0.5;
    let half_b = b.scale() * 0.5;
    let mut corner_a = a.position();
    let mut corner_b = b.position();
    for k in 0..3 {
        if push[k] > 0.0 {
            corner_a[k] += half_a[k];
            corner_b[k] -= half_b[k];
        } else {
            corner_a[k] -= half_a[k];
            corner_b[k] += half_b[k];
        }
    }
    (corner_a + corner_b) * 0.5
}
