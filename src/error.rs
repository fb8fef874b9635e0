//! Physics error types.

use thiserror::Error;

use crate::world::BodyId;

/// Errors reported by [`PhysicsWorld`](crate::world::PhysicsWorld) operations.
///
/// Numerical routines never fail; only registration and by-id lookups do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhysicsError {
    /// The world already holds as many bodies as its capacity allows.
    #[error("physics world is full (capacity {capacity})")]
    WorldFull { capacity: usize },

    /// No body with this id is registered.
    #[error("unknown body: {0:?}")]
    UnknownBody(BodyId),
}
