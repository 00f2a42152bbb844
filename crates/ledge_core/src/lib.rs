//! # LEDGE Core
//!
//! Entity registry for a tile-based platformer:
//! - Entities are 16-bit identifiers, recycled through a FIFO free queue
//! - Components live in dense per-type arrays (swap-remove on delete)
//! - Every entity carries a [`Signature`]; systems track the entities whose
//!   signature covers their own
//!
//! ## Rules
//!
//! 1. **Single writer** - all structural mutation goes through [`World`]
//! 2. **No stale membership** - system sets are recomputed on every
//!    add/remove/destroy, before the call returns
//! 3. **Loud contract violations** - missing components, dead entities and
//!    id exhaustion are reported as [`EcsError`]
//!
//! ## Example
//!
//! ```rust
//! use ledge_core::{Component, World};
//!
//! struct Health(i32);
//! impl Component for Health {}
//!
//! let mut world = World::new(64);
//! let health = world.register_component::<Health>().unwrap();
//! let mortal = world.register_system("death", &[health]).unwrap();
//!
//! let e = world.create_entity().unwrap();
//! world.add_component(e, Health(3)).unwrap();
//! assert!(world.system_contains(mortal, e).unwrap());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod ecs;
pub mod error;

pub use ecs::{
    Component, ComponentStorage, ComponentType, Entity, EntityAllocator, ErasedStorage,
    Signature, SystemId, World, MAX_COMPONENTS, MAX_ENTITIES,
};
pub use error::{EcsError, EcsResult};
