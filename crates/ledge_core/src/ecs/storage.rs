//! # Component Storage
//!
//! Dense, hole-free storage for a single component type:
//! - `data[slot]` holds the component
//! - `owners[slot]` is the entity owning that slot
//! - `slots[entity]` is the slot owned by that entity
//!
//! Removal swaps the last element into the freed slot. Any reference taken
//! with [`ComponentStorage::get`] or [`ComponentStorage::get_mut`] is valid
//! only until the next insert or remove on the same storage; the borrow
//! checker enforces this for safe code.

use std::any::Any;
use std::collections::HashMap;

use super::component::Component;
use super::entity::Entity;

/// Dense storage for one component type.
///
/// # Example
///
/// ```rust
/// use ledge_core::{Component, ComponentStorage, Entity};
///
/// struct Tag(u8);
/// impl Component for Tag {}
///
/// let mut storage = ComponentStorage::new();
/// storage.insert(Entity::from_raw(3), Tag(1));
/// assert!(storage.contains(Entity::from_raw(3)));
/// ```
pub struct ComponentStorage<C: Component> {
    /// Packed component values.
    data: Vec<C>,
    /// Slot -> entity.
    owners: Vec<Entity>,
    /// Entity -> slot.
    slots: HashMap<Entity, usize>,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            owners: Vec::new(),
            slots: HashMap::new(),
        }
    }

    /// Inserts a component, overwriting any existing one for `entity`.
    ///
    /// Returns the replaced value, if any.
    pub fn insert(&mut self, entity: Entity, component: C) -> Option<C> {
        if let Some(&slot) = self.slots.get(&entity) {
            return Some(std::mem::replace(&mut self.data[slot], component));
        }

        let slot = self.data.len();
        self.data.push(component);
        self.owners.push(entity);
        self.slots.insert(entity, slot);
        None
    }

    /// Removes the component of `entity` by swapping the last slot into it.
    pub fn remove(&mut self, entity: Entity) -> Option<C> {
        let slot = self.slots.remove(&entity)?;
        let last = self.data.len() - 1;

        if slot != last {
            let moved = self.owners[last];
            self.owners.swap(slot, last);
            self.slots.insert(moved, slot);
        }

        self.owners.pop();
        let removed = self.data.swap_remove(slot);
        debug_assert_eq!(self.data.len(), self.owners.len());
        debug_assert_eq!(self.data.len(), self.slots.len());
        Some(removed)
    }

    /// Gets the component of `entity`.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&C> {
        self.slots.get(&entity).map(|&slot| &self.data[slot])
    }

    /// Gets the component of `entity` mutably.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut C> {
        let slot = *self.slots.get(&entity)?;
        self.data.get_mut(slot)
    }

    /// Checks whether `entity` has a component here.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.slots.contains_key(&entity)
    }

    /// Number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if nothing is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Owning entities in slot order.
    ///
    /// Slot order is insertion order until the first removal.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.owners
    }

    /// Iterates over `(entity, component)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &C)> {
        self.owners.iter().copied().zip(self.data.iter())
    }

    /// Iterates mutably over `(entity, component)` pairs in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut C)> {
        self.owners.iter().copied().zip(self.data.iter_mut())
    }
}

impl<C: Component> Default for ComponentStorage<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a storage, used by the registry to purge entities
/// without knowing their component types.
pub trait ErasedStorage {
    /// Drops the component of `entity`, if any. Returns whether one existed.
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Checks whether `entity` has a component here.
    fn contains_entity(&self, entity: Entity) -> bool;

    /// Number of stored components.
    fn count(&self) -> usize;

    /// Name of the stored component type.
    fn type_name(&self) -> &'static str;

    /// Upcast for downcasting to the concrete storage.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete storage.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedStorage for ComponentStorage<C> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn contains_entity(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn count(&self) -> usize {
        self.len()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    impl Component for Position {}

    fn e(raw: u16) -> Entity {
        Entity::from_raw(raw)
    }

    #[test]
    fn test_insert_and_get() {
        let mut storage = ComponentStorage::new();
        storage.insert(e(1), Position { x: 1.0, y: 2.0 });
        storage.insert(e(7), Position { x: 3.0, y: 4.0 });

        assert_eq!(storage.len(), 2);
        assert_eq!(storage.get(e(7)), Some(&Position { x: 3.0, y: 4.0 }));
        assert!(storage.get(e(2)).is_none());
    }

    #[test]
    fn test_insert_overwrites() {
        let mut storage = ComponentStorage::new();
        assert!(storage.insert(e(1), Position { x: 1.0, y: 1.0 }).is_none());

        let old = storage.insert(e(1), Position { x: 9.0, y: 9.0 });
        assert_eq!(old, Some(Position { x: 1.0, y: 1.0 }));
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get(e(1)).unwrap().x, 9.0);
    }

    #[test]
    fn test_swap_remove_keeps_mappings_in_sync() {
        let mut storage = ComponentStorage::new();
        for raw in 0..4 {
            storage.insert(e(raw), Position { x: f32::from(raw), y: 0.0 });
        }

        // Removing slot 1 moves the last element (entity 3) into it
        let removed = storage.remove(e(1)).unwrap();
        assert_eq!(removed.x, 1.0);
        assert_eq!(storage.entities(), &[e(0), e(3), e(2)]);
        assert_eq!(storage.get(e(3)).unwrap().x, 3.0);
        assert!(!storage.contains(e(1)));

        // Removing the last slot needs no swap
        storage.remove(e(2)).unwrap();
        assert_eq!(storage.entities(), &[e(0), e(3)]);
        assert!(storage.remove(e(2)).is_none());
    }

    #[test]
    fn test_iteration_is_hole_free() {
        let mut storage = ComponentStorage::new();
        for raw in 0..5 {
            storage.insert(e(raw), Position { x: 0.0, y: 0.0 });
        }
        storage.remove(e(0));
        storage.remove(e(3));

        for (_, pos) in storage.iter_mut() {
            pos.y += 1.0;
        }
        assert_eq!(storage.iter().count(), 3);
        assert!(storage.iter().all(|(_, pos)| pos.y == 1.0));
    }

    #[test]
    fn test_erased_view() {
        let mut storage = ComponentStorage::new();
        storage.insert(e(4), Position { x: 0.0, y: 0.0 });

        let erased: &mut dyn ErasedStorage = &mut storage;
        assert!(erased.contains_entity(e(4)));
        assert!(erased.type_name().ends_with("Position"));
        assert!(erased.remove_entity(e(4)));
        assert!(!erased.remove_entity(e(4)));
        assert_eq!(erased.count(), 0);
    }
}
