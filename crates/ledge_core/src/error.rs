//! # Registry Error Types
//!
//! Every variant is a contract violation by the caller. Expected absence
//! (an empty query, an entity with no components) is never an error.

use thiserror::Error;

use crate::ecs::{Entity, SystemId};

/// Errors raised by the entity registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The identifier space is exhausted.
    #[error("entity limit reached: capacity {capacity}")]
    EntityLimit {
        /// Maximum number of live entities.
        capacity: usize,
    },

    /// The entity is not live (never created, or already destroyed).
    #[error("entity {0} is not alive")]
    DeadEntity(Entity),

    /// The entity does not own a component of the requested type.
    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        /// Entity that was queried.
        entity: Entity,
        /// Type name of the missing component.
        component: &'static str,
    },

    /// Too many component types were registered.
    #[error("component type limit reached: capacity {capacity}")]
    ComponentLimit {
        /// Maximum number of component types.
        capacity: usize,
    },

    /// The component type was never registered.
    #[error("component type {0} is not registered")]
    UnregisteredComponent(&'static str),

    /// The system handle does not belong to this registry.
    #[error("unknown system {0:?}")]
    UnknownSystem(SystemId),

    /// Two mutable borrows of the same storage were requested.
    #[error("cannot borrow {0} storage mutably twice")]
    AliasedComponents(&'static str),
}

/// Result type for registry operations.
pub type EcsResult<T> = Result<T, EcsError>;
