//! # System Registry
//!
//! A system is a named set of entities whose signature covers the system's
//! required signature. Membership is recomputed whenever an entity's
//! signature changes; nothing else may insert into a tracked set.
//!
//! Systems registered with a removal hook also collect every entity that
//! leaves their set, to be drained by the system on its next update.
//! A system may additionally *watch* one specific entity regardless of
//! signature (e.g. the camera following the player).

use std::collections::BTreeSet;

use tracing::trace;

use super::component::Signature;
use super::entity::Entity;
use crate::error::{EcsError, EcsResult};

/// Handle to a registered system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SystemId(u16);

impl SystemId {
    /// Returns the handle as an index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct SystemEntry {
    name: &'static str,
    signature: Signature,
    tracked: BTreeSet<Entity>,
    removal_hook: bool,
    removed: Vec<Entity>,
    watched: Option<Entity>,
}

impl SystemEntry {
    fn notify_removed(&mut self, entity: Entity) {
        if self.removal_hook {
            self.removed.push(entity);
        }
    }
}

/// All systems of a world, in registration order.
#[derive(Debug, Default)]
pub(crate) struct SystemRegistry {
    systems: Vec<SystemEntry>,
}

impl SystemRegistry {
    pub(crate) fn register(
        &mut self,
        name: &'static str,
        signature: Signature,
        removal_hook: bool,
    ) -> SystemId {
        let id = SystemId(self.systems.len() as u16);
        self.systems.push(SystemEntry {
            name,
            signature,
            tracked: BTreeSet::new(),
            removal_hook,
            removed: Vec::new(),
            watched: None,
        });
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.systems.len()
    }

    fn entry(&self, id: SystemId) -> EcsResult<&SystemEntry> {
        self.systems
            .get(id.index())
            .ok_or(EcsError::UnknownSystem(id))
    }

    fn entry_mut(&mut self, id: SystemId) -> EcsResult<&mut SystemEntry> {
        self.systems
            .get_mut(id.index())
            .ok_or(EcsError::UnknownSystem(id))
    }

    /// Re-evaluates `entity` against every system.
    pub(crate) fn signature_changed(&mut self, entity: Entity, signature: Signature) {
        for system in &mut self.systems {
            if signature.contains_all(system.signature) {
                if system.tracked.insert(entity) {
                    trace!(system = system.name, %entity, "entity joined system");
                }
            } else if system.tracked.remove(&entity) {
                trace!(system = system.name, %entity, "entity left system");
                system.notify_removed(entity);
            }
        }
    }

    /// Re-evaluates `entity` against one system only.
    pub(crate) fn evaluate(&mut self, id: SystemId, entity: Entity, signature: Signature) {
        if let Some(system) = self.systems.get_mut(id.index()) {
            if signature.contains_all(system.signature) {
                system.tracked.insert(entity);
            }
        }
    }

    /// Drops `entity` from every tracked set and watcher.
    pub(crate) fn entity_destroyed(&mut self, entity: Entity) {
        for system in &mut self.systems {
            let was_tracked = system.tracked.remove(&entity);
            let was_watched = system.watched == Some(entity);
            if was_watched {
                system.watched = None;
            }
            if was_tracked || was_watched {
                system.notify_removed(entity);
            }
        }
    }

    pub(crate) fn tracked(&self, id: SystemId) -> EcsResult<&BTreeSet<Entity>> {
        self.entry(id).map(|system| &system.tracked)
    }

    pub(crate) fn name(&self, id: SystemId) -> EcsResult<&'static str> {
        self.entry(id).map(|system| system.name)
    }

    pub(crate) fn signature(&self, id: SystemId) -> EcsResult<Signature> {
        self.entry(id).map(|system| system.signature)
    }

    pub(crate) fn set_watched(&mut self, id: SystemId, entity: Entity) -> EcsResult<()> {
        self.entry_mut(id)?.watched = Some(entity);
        Ok(())
    }

    pub(crate) fn watched(&self, id: SystemId) -> EcsResult<Option<Entity>> {
        self.entry(id).map(|system| system.watched)
    }

    pub(crate) fn drain_removed(&mut self, id: SystemId) -> EcsResult<Vec<Entity>> {
        Ok(std::mem::take(&mut self.entry_mut(id)?.removed))
    }
}
