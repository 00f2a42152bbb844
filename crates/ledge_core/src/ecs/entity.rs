//! # Entity Management
//!
//! Entities are bare 16-bit identifiers. A destroyed id goes to the back of
//! a FIFO queue, so it is handed out again only after every id ahead of it
//! has been used.

use std::collections::VecDeque;
use std::fmt;

use crate::error::{EcsError, EcsResult};

/// Default maximum number of live entities.
pub const MAX_ENTITIES: usize = 5000;

/// Opaque entity identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Entity(u16);

impl Entity {
    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Returns the id as an index into per-entity arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues and recycles entity ids.
///
/// Every id is either live or queued in the free list, never both.
#[derive(Debug)]
pub struct EntityAllocator {
    /// Ids available for reuse, oldest first.
    free: VecDeque<Entity>,
    /// Liveness flag per id.
    alive: Vec<bool>,
    /// Number of live ids.
    alive_count: usize,
}

impl EntityAllocator {
    /// Creates an allocator for up to `capacity` live entities.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or does not fit the 16-bit id space.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            capacity <= usize::from(u16::MAX) + 1,
            "Capacity cannot exceed the 16-bit id space"
        );

        // Queue starts with every id in creation order
        let free = (0..capacity)
            .map(|raw| Entity::from_raw(raw as u16))
            .collect();

        Self {
            free,
            alive: vec![false; capacity],
            alive_count: 0,
        }
    }

    /// Maximum number of live entities.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.alive.len()
    }

    /// Number of currently live entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Takes the oldest free id.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityLimit`] when every id is live.
    pub fn allocate(&mut self) -> EcsResult<Entity> {
        let entity = self.free.pop_front().ok_or(EcsError::EntityLimit {
            capacity: self.capacity(),
        })?;
        debug_assert!(!self.alive[entity.index()], "free id {entity} was live");
        self.alive[entity.index()] = true;
        self.alive_count += 1;
        Ok(entity)
    }

    /// Returns a live id to the back of the free queue.
    ///
    /// # Errors
    ///
    /// [`EcsError::DeadEntity`] if the id is not live.
    pub fn release(&mut self, entity: Entity) -> EcsResult<()> {
        if !self.is_alive(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        self.alive[entity.index()] = false;
        self.alive_count -= 1;
        self.free.push_back(entity);
        Ok(())
    }

    /// Checks whether an id is live.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.get(entity.index()).copied().unwrap_or(false)
    }

    /// Iterates over live ids in ascending order.
    pub fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(raw, _)| Entity::from_raw(raw as u16))
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new(MAX_ENTITIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_allocation() {
        let mut allocator = EntityAllocator::new(8);

        let e0 = allocator.allocate().unwrap();
        let e1 = allocator.allocate().unwrap();
        assert_eq!(e0.raw(), 0);
        assert_eq!(e1.raw(), 1);
        assert_eq!(allocator.alive_count(), 2);
    }

    #[test]
    fn test_reuse_is_deferred() {
        let mut allocator = EntityAllocator::new(3);

        let e0 = allocator.allocate().unwrap();
        allocator.release(e0).unwrap();

        // Fresh ids come first; the released one waits its turn
        assert_eq!(allocator.allocate().unwrap().raw(), 1);
        assert_eq!(allocator.allocate().unwrap().raw(), 2);
        assert_eq!(allocator.allocate().unwrap(), e0);
    }

    #[test]
    fn test_limit_does_not_wrap() {
        let mut allocator = EntityAllocator::new(2);
        allocator.allocate().unwrap();
        allocator.allocate().unwrap();

        assert_eq!(
            allocator.allocate(),
            Err(EcsError::EntityLimit { capacity: 2 })
        );
    }

    #[test]
    fn test_double_release_is_an_error() {
        let mut allocator = EntityAllocator::new(4);
        let e = allocator.allocate().unwrap();

        allocator.release(e).unwrap();
        assert_eq!(allocator.release(e), Err(EcsError::DeadEntity(e)));
        assert_eq!(allocator.alive_count(), 0);
    }

    #[test]
    fn test_iter_alive() {
        let mut allocator = EntityAllocator::new(4);
        let a = allocator.allocate().unwrap();
        let b = allocator.allocate().unwrap();
        let c = allocator.allocate().unwrap();
        allocator.release(b).unwrap();

        let alive: Vec<_> = allocator.iter_alive().collect();
        assert_eq!(alive, vec![a, c]);
    }
}
