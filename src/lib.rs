#![no_std]
//! Rigid-body physics for a 3D block editor.
//!
//! Bodies carry one of four collider shapes (oriented box, upright capsule,
//! upright cylinder, sphere). A [`PhysicsWorld`] integrates them under a
//! single gravity vector and pushes overlapping pairs apart with
//! impulse-based response. Storage is fixed-capacity, so the crate runs
//! without an allocator.

pub mod body;
pub mod collider;
pub mod error;
pub mod geometry;
pub mod narrowphase;
pub mod world;

pub use body::{BodyType, RigidBody};
pub use collider::{Collider, ShapeKind};
pub use error::PhysicsError;
pub use world::{BodyId, PhysicsWorld, RayHit, WorldConfig};
