//! # Entity Component System
//!
//! ## Design
//!
//! - Entity ids are plain `u16` values with no embedded type information
//! - One dense [`ComponentStorage`] per component type
//! - An entity's [`Signature`] is the single source of truth for which
//!   systems track it
//! - Systems hold sets of entities; they never insert into them directly

mod component;
mod entity;
mod storage;
mod system;
mod world;

pub use component::{Component, ComponentType, Signature, MAX_COMPONENTS};
pub use entity::{Entity, EntityAllocator, MAX_ENTITIES};
pub use storage::{ComponentStorage, ErasedStorage};
pub use system::SystemId;
pub use world::World;
