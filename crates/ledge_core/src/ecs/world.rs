//! # ECS World
//!
//! The single owner of entities, component storages and systems.
//! Every structural change goes through here so that the three views of an
//! entity (its signature, the storages and the system sets) never disagree.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use tracing::debug;

use super::component::{Component, ComponentType, Signature, MAX_COMPONENTS};
use super::entity::{Entity, EntityAllocator, MAX_ENTITIES};
use super::storage::{ComponentStorage, ErasedStorage};
use super::system::{SystemId, SystemRegistry};
use crate::error::{EcsError, EcsResult};

/// The ECS world.
///
/// Systems are passed a `&mut World` explicitly; there is no global registry.
///
/// # Example
///
/// ```rust
/// use ledge_core::{Component, World};
///
/// #[derive(Debug, PartialEq)]
/// struct Position(i32, i32);
/// impl Component for Position {}
///
/// let mut world = World::new(16);
/// let e = world.create_entity().unwrap();
/// world.add_component(e, Position(1, 2)).unwrap();
/// world.get_component_mut::<Position>(e).unwrap().0 = 5;
/// assert_eq!(world.get_component::<Position>(e), Ok(&Position(5, 2)));
/// ```
pub struct World {
    entities: EntityAllocator,
    /// Signature per entity index.
    signatures: Vec<Signature>,
    /// Storage per component type, indexed by [`ComponentType::index`].
    storages: Vec<Box<dyn ErasedStorage>>,
    types: HashMap<TypeId, ComponentType>,
    systems: SystemRegistry,
}

impl World {
    /// Creates a world for up to `capacity` live entities.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds the 16-bit id space.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entities: EntityAllocator::new(capacity),
            signatures: vec![Signature::EMPTY; capacity],
            storages: Vec::new(),
            types: HashMap::new(),
            systems: SystemRegistry::default(),
        }
    }

    /// Maximum number of live entities.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entities.capacity()
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.entities.alive_count()
    }

    /// Checks whether `entity` is live.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Iterates over live entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter_alive()
    }

    fn check_alive(&self, entity: Entity) -> EcsResult<()> {
        if self.is_alive(entity) {
            Ok(())
        } else {
            Err(EcsError::DeadEntity(entity))
        }
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity with an empty signature. Systems that require no
    /// components start tracking it immediately.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityLimit`] when every id is live.
    pub fn create_entity(&mut self) -> EcsResult<Entity> {
        let entity = self.entities.allocate()?;
        debug_assert!(self.signatures[entity.index()].is_empty());
        self.systems.signature_changed(entity, Signature::EMPTY);
        debug!(%entity, alive = self.alive_count(), "entity created");
        Ok(entity)
    }

    /// Destroys `entity`: drops all its components, leaves every system and
    /// returns the id to the back of the free queue.
    ///
    /// # Errors
    ///
    /// [`EcsError::DeadEntity`] if the entity is not live.
    pub fn destroy_entity(&mut self, entity: Entity) -> EcsResult<()> {
        self.check_alive(entity)?;

        for storage in &mut self.storages {
            storage.remove_entity(entity);
        }
        self.signatures[entity.index()].reset();
        self.systems.entity_destroyed(entity);
        self.entities.release(entity)?;

        debug!(%entity, alive = self.alive_count(), "entity destroyed");
        Ok(())
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Registers component type `C`, returning its id.
    ///
    /// Registering an already known type returns the existing id.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentLimit`] once [`MAX_COMPONENTS`] types exist.
    pub fn register_component<C: Component>(&mut self) -> EcsResult<ComponentType> {
        if let Some(&ty) = self.types.get(&TypeId::of::<C>()) {
            return Ok(ty);
        }
        if self.storages.len() >= MAX_COMPONENTS {
            return Err(EcsError::ComponentLimit {
                capacity: MAX_COMPONENTS,
            });
        }

        let ty = ComponentType::new(self.storages.len() as u8);
        self.storages.push(Box::new(ComponentStorage::<C>::new()));
        self.types.insert(TypeId::of::<C>(), ty);
        debug!(component = type_name::<C>(), id = ty.index(), "component registered");
        Ok(ty)
    }

    /// Id of component type `C`, if registered.
    #[must_use]
    pub fn component_type<C: Component>(&self) -> Option<ComponentType> {
        self.types.get(&TypeId::of::<C>()).copied()
    }

    fn require_type<C: Component>(&self) -> EcsResult<ComponentType> {
        self.component_type::<C>()
            .ok_or(EcsError::UnregisteredComponent(type_name::<C>()))
    }

    /// Typed view of the storage for `C`.
    #[must_use]
    pub fn storage<C: Component>(&self) -> Option<&ComponentStorage<C>> {
        let ty = self.component_type::<C>()?;
        self.storages[ty.index()]
            .as_any()
            .downcast_ref::<ComponentStorage<C>>()
    }

    fn storage_mut<C: Component>(&mut self, ty: ComponentType) -> &mut ComponentStorage<C> {
        match self.storages[ty.index()]
            .as_any_mut()
            .downcast_mut::<ComponentStorage<C>>()
        {
            Some(storage) => storage,
            None => unreachable!("storage {} holds a different type", ty.index()),
        }
    }

    /// Adds (or overwrites) the `C` component of `entity` and updates system
    /// membership.
    ///
    /// # Errors
    ///
    /// [`EcsError::DeadEntity`] for a dead entity, or
    /// [`EcsError::ComponentLimit`] when `C` is new and no type slot is left.
    pub fn add_component<C: Component>(&mut self, entity: Entity, component: C) -> EcsResult<()> {
        self.check_alive(entity)?;
        let ty = self.register_component::<C>()?;

        self.storage_mut::<C>(ty).insert(entity, component);

        let signature = &mut self.signatures[entity.index()];
        if !signature.contains(ty) {
            signature.set(ty);
            let signature = *signature;
            self.systems.signature_changed(entity, signature);
        }
        Ok(())
    }

    /// Removes the `C` component of `entity` and updates system membership.
    ///
    /// # Errors
    ///
    /// [`EcsError::DeadEntity`], [`EcsError::UnregisteredComponent`], or
    /// [`EcsError::MissingComponent`] if the entity has no `C`.
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> EcsResult<C> {
        self.check_alive(entity)?;
        let ty = self.require_type::<C>()?;

        let removed = self
            .storage_mut::<C>(ty)
            .remove(entity)
            .ok_or(EcsError::MissingComponent {
                entity,
                component: type_name::<C>(),
            })?;

        let signature = &mut self.signatures[entity.index()];
        debug_assert!(signature.contains(ty), "storage and signature disagree");
        signature.clear(ty);
        let signature = *signature;
        self.systems.signature_changed(entity, signature);
        Ok(removed)
    }

    /// Checks whether `entity` owns a `C`.
    #[must_use]
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        self.component_type::<C>().is_some_and(|ty| {
            self.is_alive(entity) && self.signatures[entity.index()].contains(ty)
        })
    }

    /// Borrows the `C` component of `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::DeadEntity`] or [`EcsError::MissingComponent`].
    pub fn get_component<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        self.check_alive(entity)?;
        self.storage::<C>()
            .and_then(|storage| storage.get(entity))
            .ok_or(EcsError::MissingComponent {
                entity,
                component: type_name::<C>(),
            })
    }

    /// Mutably borrows the `C` component of `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::DeadEntity`] or [`EcsError::MissingComponent`].
    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        self.check_alive(entity)?;
        let missing = EcsError::MissingComponent {
            entity,
            component: type_name::<C>(),
        };
        let Some(ty) = self.component_type::<C>() else {
            return Err(missing);
        };
        self.storage_mut::<C>(ty).get_mut(entity).ok_or(missing)
    }

    /// Mutably borrows two different components of the same entity.
    ///
    /// # Errors
    ///
    /// [`EcsError::AliasedComponents`] if `A` and `B` are the same type,
    /// otherwise as [`World::get_component_mut`].
    pub fn get_pair_mut<A: Component, B: Component>(
        &mut self,
        entity: Entity,
    ) -> EcsResult<(&mut A, &mut B)> {
        self.check_alive(entity)?;
        if TypeId::of::<A>() == TypeId::of::<B>() {
            return Err(EcsError::AliasedComponents(type_name::<A>()));
        }
        let a = self.component_type::<A>().ok_or(EcsError::MissingComponent {
            entity,
            component: type_name::<A>(),
        })?;
        let b = self.component_type::<B>().ok_or(EcsError::MissingComponent {
            entity,
            component: type_name::<B>(),
        })?;

        let (first, second) = if a.index() < b.index() {
            let (low, high) = self.storages.split_at_mut(b.index());
            (&mut low[a.index()], &mut high[0])
        } else {
            let (low, high) = self.storages.split_at_mut(a.index());
            (&mut high[0], &mut low[b.index()])
        };

        let first = first
            .as_any_mut()
            .downcast_mut::<ComponentStorage<A>>()
            .and_then(|storage| storage.get_mut(entity))
            .ok_or(EcsError::MissingComponent {
                entity,
                component: type_name::<A>(),
            })?;
        let second = second
            .as_any_mut()
            .downcast_mut::<ComponentStorage<B>>()
            .and_then(|storage| storage.get_mut(entity))
            .ok_or(EcsError::MissingComponent {
                entity,
                component: type_name::<B>(),
            })?;
        Ok((first, second))
    }

    /// Every entity owning a `C`, in storage order.
    ///
    /// Order is insertion order until the first removal from that storage.
    #[must_use]
    pub fn all_of<C: Component>(&self) -> Vec<Entity> {
        self.storage::<C>()
            .map(|storage| storage.entities().to_vec())
            .unwrap_or_default()
    }

    /// Signature of `entity` (empty for dead entities).
    #[must_use]
    pub fn signature(&self, entity: Entity) -> Signature {
        if self.is_alive(entity) {
            self.signatures[entity.index()]
        } else {
            Signature::EMPTY
        }
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Registers a system requiring every component in `required`.
    ///
    /// Live entities that already match are tracked immediately.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnregisteredComponent`] if a required type id was not
    /// issued by this world.
    pub fn register_system(
        &mut self,
        name: &'static str,
        required: &[ComponentType],
    ) -> EcsResult<SystemId> {
        self.add_system(name, required, false)
    }

    /// Like [`World::register_system`], but entities leaving the system are
    /// queued for [`World::drain_removed`].
    ///
    /// # Errors
    ///
    /// As [`World::register_system`].
    pub fn register_system_with_hook(
        &mut self,
        name: &'static str,
        required: &[ComponentType],
    ) -> EcsResult<SystemId> {
        self.add_system(name, required, true)
    }

    fn add_system(
        &mut self,
        name: &'static str,
        required: &[ComponentType],
        hook: bool,
    ) -> EcsResult<SystemId> {
        if required.iter().any(|ty| ty.index() >= self.storages.len()) {
            return Err(EcsError::UnregisteredComponent(name));
        }

        let signature = Signature::of(required);
        let id = self.systems.register(name, signature, hook);
        for entity in self.entities.iter_alive() {
            self.systems
                .evaluate(id, entity, self.signatures[entity.index()]);
        }
        debug!(system = name, ?signature, systems = self.systems.len(), "system registered");
        Ok(id)
    }

    /// Snapshot of the entities tracked by a system, in id order.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownSystem`].
    pub fn system_entities(&self, id: SystemId) -> EcsResult<Vec<Entity>> {
        Ok(self.systems.tracked(id)?.iter().copied().collect())
    }

    /// Checks whether a system tracks `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownSystem`].
    pub fn system_contains(&self, id: SystemId, entity: Entity) -> EcsResult<bool> {
        Ok(self.systems.tracked(id)?.contains(&entity))
    }

    /// Name a system was registered with.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownSystem`].
    pub fn system_name(&self, id: SystemId) -> EcsResult<&'static str> {
        self.systems.name(id)
    }

    /// Required signature of a system.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownSystem`].
    pub fn system_signature(&self, id: SystemId) -> EcsResult<Signature> {
        self.systems.signature(id)
    }

    /// Makes a system watch one specific entity, regardless of signature.
    ///
    /// # Errors
    ///
    /// [`EcsError::DeadEntity`] or [`EcsError::UnknownSystem`].
    pub fn add_watcher(&mut self, id: SystemId, entity: Entity) -> EcsResult<()> {
        self.check_alive(entity)?;
        self.systems.set_watched(id, entity)?;
        debug!(system = self.systems.name(id)?, %entity, "watcher added");
        Ok(())
    }

    /// The entity a system watches, if any.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownSystem`].
    pub fn watched(&self, id: SystemId) -> EcsResult<Option<Entity>> {
        self.systems.watched(id)
    }

    /// Takes the entities that left a hooked system since the last drain.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnknownSystem`].
    pub fn drain_removed(&mut self, id: SystemId) -> EcsResult<Vec<Entity>> {
        self.systems.drain_removed(id)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(MAX_ENTITIES)
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("alive", &self.alive_count())
            .field("capacity", &self.capacity())
            .field("components", &self.storages.len())
            .field("systems", &self.systems.len())
            .finish_non_exhaustive()
    }
}
