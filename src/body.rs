//! Rigid bodies: mass properties, accumulated forces and per-step integration.
//!
//! # Example
//! ```
//! use block_physics::{Collider, RigidBody};
//! use nalgebra::Vector3;
//!
//! let mut ball = RigidBody::new(Collider::sphere(0.5), 1.0)
//!     .with_position(Vector3::new(0.0, 10.0, 0.0));
//! ball.integrate(1.0 / 60.0, Vector3::new(0.0, -300.0, 0.0));
//! assert!(ball.velocity().y < 0.0);
//! ```

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use crate::collider::Collider;

/// Angular velocity is scaled by this every integration step.
pub const ANGULAR_DAMPING: f32 = 0.98;

/// Below this squared angular speed the orientation is left untouched.
const MIN_ANGULAR_SPEED_SQ: f32 = 1e-6;

/// Determines how a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BodyType {
    /// Integrated every step and moved by contacts.
    Dynamic,
    /// Never integrated and never moved by contacts. Can still be
    /// repositioned manually.
    Static,
}

/// A rigid body owning exactly one [`Collider`].
///
/// The transform is private so that every change reaches the collider.
#[derive(Debug, Clone)]
pub struct RigidBody {
    collider: Collider,

    // -- Transform --
    position: Vector3<f32>,
    orientation: UnitQuaternion<f32>,
    scale: Vector3<f32>,

    // -- Motion --
    velocity: Vector3<f32>,
    angular_velocity: Vector3<f32>,
    force_accumulator: Vector3<f32>,
    torque_accumulator: Vector3<f32>,

    // -- Mass properties --
    mass: f32,
    inv_mass: f32,
    inertia: Vector3<f32>,
    inv_inertia: Vector3<f32>,

    // -- Material --
    /// Linear damping rate applied as `v *= 1 - friction·dt`.
    friction: f32,
    /// Stored for owners; integration does not read it.
    rolling_friction: f32,
    restitution: f32,

    /// Per-axis multipliers on linear velocity changes.
    linear_factor: Vector3<f32>,
    /// Per-axis multipliers on angular velocity changes.
    angular_factor: Vector3<f32>,

    body_type: BodyType,
    on_ground: bool,
}

impl RigidBody {
    /// Create a body with the given collider and mass.
    ///
    /// Bodies with positive mass start dynamic; anything else starts static.
    pub fn new(collider: Collider, mass: f32) -> Self {
        let body_type = if mass > 0.0 {
            BodyType::Dynamic
        } else {
            BodyType::Static
        };
        let mut body = Self {
            collider,
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            force_accumulator: Vector3::zeros(),
            torque_accumulator: Vector3::zeros(),
            mass,
            inv_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            inertia: Vector3::zeros(),
            inv_inertia: Vector3::zeros(),
            friction: 0.1,
            rolling_friction: 0.1,
            restitution: 0.1,
            linear_factor: Vector3::new(1.0, 1.0, 1.0),
            angular_factor: Vector3::new(1.0, 1.0, 1.0),
            body_type,
            on_ground: false,
        };
        body.sync_collider();
        body.update_inertia();
        body
    }

    /// Create a massless static body.
    pub fn new_static(collider: Collider) -> Self {
        Self::new(collider, 0.0)
    }

    // -- Builders --

    /// Builder: set initial position, orientation and scale.
    pub fn with_transform(
        mut self,
        position: Vector3<f32>,
        orientation: UnitQuaternion<f32>,
        scale: Vector3<f32>,
    ) -> Self {
        self.set_transform(position, orientation, scale);
        self
    }

    /// Builder: set initial position.
    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.set_position(position);
        self
    }

    /// Builder: set initial orientation.
    pub fn with_orientation(mut self, orientation: UnitQuaternion<f32>) -> Self {
        self.set_orientation(orientation);
        self
    }

    /// Builder: set initial velocity.
    pub fn with_velocity(mut self, velocity: Vector3<f32>) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder: set initial angular velocity (in radians per second).
    pub fn with_angular_velocity(mut self, angular_velocity: Vector3<f32>) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Set restitution, clamped to `[0, 1]`.
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.set_restitution(restitution);
        self
    }

    /// Builder: set linear damping rate.
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Builder: set rolling friction.
    pub fn with_rolling_friction(mut self, rolling_friction: f32) -> Self {
        self.rolling_friction = rolling_friction;
        self
    }

    /// Builder: set per-axis linear movement mask.
    pub fn with_linear_factor(mut self, factor: Vector3<f32>) -> Self {
        self.linear_factor = factor;
        self
    }

    /// Builder: set per-axis angular movement mask.
    pub fn with_angular_factor(mut self, factor: Vector3<f32>) -> Self {
        self.angular_factor = factor;
        self
    }

    /// Builder: choose dynamic or static.
    pub fn with_dynamic(mut self, dynamic: bool) -> Self {
        self.set_dynamic(dynamic);
        self
    }

    // -- Accessors --

    /// The body's collider, kept in sync with its transform.
    pub fn collider(&self) -> &Collider {
        &self.collider
    }

    /// World-space position.
    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    /// World-space orientation.
    pub fn orientation(&self) -> UnitQuaternion<f32> {
        self.orientation
    }

    /// Per-axis scale applied to the collider.
    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    /// Linear velocity.
    pub fn velocity(&self) -> Vector3<f32> {
        self.velocity
    }

    /// Angular velocity (in radians per second).
    pub fn angular_velocity(&self) -> Vector3<f32> {
        self.angular_velocity
    }

    /// Mass; zero or less for static bodies.
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// `1 / mass`, or zero for non-positive mass.
    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Diagonal inertia in the collider's local frame.
    pub fn inertia(&self) -> Vector3<f32> {
        self.inertia
    }

    /// Componentwise inverse of [`inertia`](Self::inertia); zero where the
    /// inertia component is zero.
    pub fn inv_inertia(&self) -> Vector3<f32> {
        self.inv_inertia
    }

    /// Linear damping rate.
    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Rolling friction.
    pub fn rolling_friction(&self) -> f32 {
        self.rolling_friction
    }

    /// Bounciness in `[0, 1]`.
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Per-axis linear movement mask.
    pub fn linear_factor(&self) -> Vector3<f32> {
        self.linear_factor
    }

    /// Per-axis angular movement mask.
    pub fn angular_factor(&self) -> Vector3<f32> {
        self.angular_factor
    }

    /// Dynamic or static.
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// Force accumulated since the last integration.
    pub fn accumulated_force(&self) -> Vector3<f32> {
        self.force_accumulator
    }

    /// Torque accumulated since the last integration.
    pub fn accumulated_torque(&self) -> Vector3<f32> {
        self.torque_accumulator
    }

    /// Shorthand for `body_type() == BodyType::Dynamic`.
    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    /// Whether a contact with an upward-facing normal touched this body
    /// during the last step.
    pub fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    // -- Mutators --

    /// Replace position, orientation and scale at once.
    ///
    /// The collider is refreshed and the inertia recomputed, since scale can
    /// change the collider's dimensions.
    pub fn set_transform(&mut self, position: Vector3<f32>, orientation: UnitQuaternion<f32>, scale: Vector3<f32>) {
        self.position = position;
        self.orientation = orientation;
        self.scale = scale;
        self.sync_collider();
        self.update_inertia();
    }

    /// Move the body, refreshing the collider.
    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
        self.sync_collider();
    }

    /// Rotate the body, refreshing the collider.
    pub fn set_orientation(&mut self, orientation: UnitQuaternion<f32>) {
        self.orientation = orientation;
        self.sync_collider();
    }

    /// Overwrite the linear velocity.
    pub fn set_velocity(&mut self, velocity: Vector3<f32>) {
        self.velocity = velocity;
    }

    /// Overwrite the angular velocity.
    pub fn set_angular_velocity(&mut self, angular_velocity: Vector3<f32>) {
        self.angular_velocity = angular_velocity;
    }

    /// Set linear damping rate.
    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    /// Set rolling friction.
    pub fn set_rolling_friction(&mut self, rolling_friction: f32) {
        self.rolling_friction = rolling_friction;
    }

    /// Set restitution, clamped to `[0, 1]`.
    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution.clamp(0.0, 1.0);
    }

    /// Set per-axis linear movement mask.
    pub fn set_linear_factor(&mut self, factor: Vector3<f32>) {
        self.linear_factor = factor;
    }

    /// Set per-axis angular movement mask.
    pub fn set_angular_factor(&mut self, factor: Vector3<f32>) {
        self.angular_factor = factor;
    }

    /// Switch between dynamic and static.
    pub fn set_dynamic(&mut self, dynamic: bool) {
        self.body_type = if dynamic {
            BodyType::Dynamic
        } else {
            BodyType::Static
        };
    }

    pub(crate) fn set_on_ground(&mut self, on_ground: bool) {
        self.on_ground = on_ground;
    }

    /// Shift the body by `delta`, keeping the collider in sync.
    pub(crate) fn translate(&mut self, delta: Vector3<f32>) {
        self.position += delta;
        self.sync_collider();
    }

    // -- Dynamics --

    /// `v += g·mass·dt` for dynamic bodies that are not grounded.
    pub fn apply_gravity(&mut self, dt: f32, gravity: Vector3<f32>) {
        if self.is_dynamic() && !self.on_ground {
            self.velocity += (gravity * self.mass * dt).component_mul(&self.linear_factor);
        }
    }

    /// Accumulate a force through the center of mass. Ignored on static bodies.
    ///
    /// Integration clears the accumulator without turning it into velocity;
    /// use [`apply_impulse`](Self::apply_impulse) to push a body.
    pub fn apply_force(&mut self, force: Vector3<f32>) {
        if self.is_dynamic() {
            self.force_accumulator += force;
        }
    }

    /// Accumulate a force at a world-space point, adding the resulting torque.
    pub fn apply_force_at_point(&mut self, force: Vector3<f32>, point: Vector3<f32>) {
        if !self.is_dynamic() {
            return;
        }
        self.force_accumulator += force;
        self.torque_accumulator += (point - self.position).cross(&force);
    }

    /// Accumulate a torque. Ignored on static bodies.
    pub fn apply_torque(&mut self, torque: Vector3<f32>) {
        if self.is_dynamic() {
            self.torque_accumulator += torque;
        }
    }

    /// Apply an instantaneous impulse at `rel_pos`, an offset from the body's
    /// position. Ignored on static bodies.
    pub fn apply_impulse(&mut self, impulse: Vector3<f32>, rel_pos: Vector3<f32>) {
        if !self.is_dynamic() {
            return;
        }
        self.velocity += (impulse * self.inv_mass).component_mul(&self.linear_factor);
        let ang = rel_pos.cross(&impulse).component_mul(&self.inv_inertia);
        self.angular_velocity += ang.component_mul(&self.angular_factor);
    }

    /// Advance this body by `dt` seconds.
    ///
    /// Velocity is updated before position (semi-implicit Euler), then the
    /// damping terms are applied and the accumulators cleared. Static bodies
    /// are left untouched.
    pub fn integrate(&mut self, dt: f32, gravity: Vector3<f32>) {
        if !self.is_dynamic() {
            return;
        }

        // --- Linear ---
        self.apply_gravity(dt, gravity);
        self.position += self.velocity * dt;

        // --- Angular ---
        let angular_acceleration = self.torque_accumulator.component_mul(&self.inv_inertia);
        self.angular_velocity += (angular_acceleration * dt).component_mul(&self.angular_factor);

        if self.angular_velocity.norm_squared() > MIN_ANGULAR_SPEED_SQ {
            // q' = q + 0.5·dt·(ω, 0)·q
            let w = &self.angular_velocity;
            let half_dt = 0.5 * dt;
            let dq = Quaternion::new(0.0, w.x * half_dt, w.y * half_dt, w.z * half_dt);
            let q = self.orientation.into_inner();
            self.orientation = UnitQuaternion::new_normalize(q + dq * q);
        }

        // --- Damping ---
        self.velocity *= 1.0 - self.friction * dt;
        self.angular_velocity *= ANGULAR_DAMPING;

        self.sync_collider();

        self.force_accumulator = Vector3::zeros();
        self.torque_accumulator = Vector3::zeros();
    }

    fn sync_collider(&mut self) {
        self.collider.update_transform(self.position, self.orientation, self.scale);
    }

    fn update_inertia(&mut self) {
        self.inertia = self.collider.local_inertia(self.mass);
        self.inv_inertia = self.inertia.map(|i| if i != 0.0 { 1.0 / i } else { 0.0 });
    }
}
