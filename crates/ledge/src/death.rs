//! Removes dead non-player entities. The player is never destroyed here;
//! the session respawns it instead.

use ledge_core::{EcsResult, Entity, SystemId, World};
use tracing::debug;

use crate::components::{Health, Player};
use crate::events::{EventSender, GameEvent};

/// Destroys every non-player entity whose health is zero or below.
#[derive(Debug)]
pub struct DeathSystem {
    id: SystemId,
}

impl DeathSystem {
    /// Registers the system.
    ///
    /// # Errors
    ///
    /// Registry errors from component or system registration.
    pub fn new(world: &mut World) -> EcsResult<Self> {
        let health = world.register_component::<Health>()?;
        Ok(Self {
            id: world.register_system("death", &[health])?,
        })
    }

    /// Registry handle.
    #[must_use]
    pub const fn id(&self) -> SystemId {
        self.id
    }

    /// Runs the pass and returns what it destroyed.
    ///
    /// # Errors
    ///
    /// Registry errors.
    pub fn update(&self, world: &mut World, events: &EventSender) -> EcsResult<Vec<Entity>> {
        let mut destroyed = Vec::new();
        for entity in world.system_entities(self.id)? {
            if world.has_component::<Player>(entity)
                || world.get_component::<Health>(entity)?.hitpoints > 0
            {
                continue;
            }
            world.destroy_entity(entity)?;
            debug!(%entity, "entity died");
            events.send(GameEvent::EntityDestroyed { entity });
            destroyed.push(entity);
        }
        Ok(destroyed)
    }
}
