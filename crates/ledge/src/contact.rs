//! # Contact Checks
//!
//! Box-versus-box tests between the player and the gameplay entities, and
//! between projectiles and anything with health. They run after both tile
//! passes, using boxes recomputed from the current transforms.

use ledge_core::{EcsResult, Entity, World};
use tracing::{debug, trace};

use crate::components::{
    Checkpoint, Collision, Enemy, Goal, Health, Physics, Pickup, PickupKind, Player, Projectile,
    Transform,
};
use crate::events::{EventSender, GameEvent};
use crate::math::Rect;

/// Box of `entity` at its current transform, if it has both components.
fn hitbox(world: &World, entity: Entity) -> Option<Rect> {
    let transform = world.get_component::<Transform>(entity).ok()?;
    let collision = world.get_component::<Collision>(entity).ok()?;
    Some(collision.rect_at(transform))
}

/// Box of the player; unlike [`hitbox`] a missing component is an error.
fn player_box(world: &World, player: Entity) -> EcsResult<Rect> {
    let transform = world.get_component::<Transform>(player)?;
    Ok(world.get_component::<Collision>(player)?.rect_at(transform))
}

fn stop(world: &mut World, entity: Entity) {
    if let Ok(physics) = world.get_component_mut::<Physics>(entity) {
        physics.velocity.x = 0.0;
        physics.velocity.y = 0.0;
    }
}

/// Projectiles against every non-player entity with [`Health`].
///
/// A hit stops the target, takes the projectile's damage from it and
/// destroys the projectile, which then tests nothing else. Returns the
/// destroyed projectiles; each also emits [`GameEvent::EntityDestroyed`].
///
/// # Errors
///
/// Registry errors.
pub fn projectiles_vs_health(world: &mut World, events: &EventSender) -> EcsResult<Vec<Entity>> {
    let mut spent = Vec::new();
    for projectile in world.all_of::<Projectile>() {
        let Some(shot) = hitbox(world, projectile) else {
            continue;
        };
        let damage = world.get_component::<Projectile>(projectile)?.damage;

        let target = world.all_of::<Health>().into_iter().find(|&target| {
            !world.has_component::<Player>(target)
                && hitbox(world, target).is_some_and(|rect| rect.intersects(shot))
        });
        let Some(target) = target else {
            continue;
        };

        stop(world, target);
        world.get_component_mut::<Health>(target)?.hitpoints -= damage;
        world.destroy_entity(projectile)?;
        trace!(%projectile, %target, damage, "projectile hit");
        events.send(GameEvent::EntityDestroyed { entity: projectile });
        spent.push(projectile);
    }
    Ok(spent)
}

/// Collects every pickup the player overlaps.
///
/// Each one runs its pickup behavior, emits
/// [`GameEvent::PickupCollected`] and is destroyed, all in this call.
/// Returns the kinds collected, in storage order.
///
/// # Errors
///
/// Registry errors, including those raised by a pickup behavior.
pub fn collect_pickups(
    world: &mut World,
    player: Entity,
    timestep: f32,
    events: &EventSender,
) -> EcsResult<Vec<PickupKind>> {
    let reach = player_box(world, player)?;
    let mut collected = Vec::new();

    for item in world.all_of::<Pickup>() {
        if !hitbox(world, item).is_some_and(|rect| rect.intersects(reach)) {
            continue;
        }
        let pickup = world.get_component::<Pickup>(item)?.clone();
        pickup.on_pickup.run(world, item, timestep, events)?;
        world.destroy_entity(item)?;

        debug!(pickup = %item, kind = ?pickup.kind, "pickup collected");
        events.send(GameEvent::PickupCollected {
            pickup: item,
            kind: pickup.kind,
            message: pickup.message,
        });
        collected.push(pickup.kind);
    }
    Ok(collected)
}

/// First checkpoint the player overlaps.
///
/// # Errors
///
/// Registry errors.
pub fn touched_checkpoint(world: &World, player: Entity) -> EcsResult<Option<Entity>> {
    let reach = player_box(world, player)?;
    Ok(world
        .all_of::<Checkpoint>()
        .into_iter()
        .find(|&checkpoint| hitbox(world, checkpoint).is_some_and(|rect| rect.intersects(reach))))
}

/// Activates the first not-yet-activated goal the player overlaps.
///
/// # Errors
///
/// Registry errors, including those raised by the goal's behavior.
pub fn reach_goal(
    world: &mut World,
    player: Entity,
    timestep: f32,
    events: &EventSender,
) -> EcsResult<Option<Entity>> {
    let reach = player_box(world, player)?;
    for goal in world.all_of::<Goal>() {
        let component = *world.get_component::<Goal>(goal)?;
        if component.activated || !hitbox(world, goal).is_some_and(|rect| rect.intersects(reach)) {
            continue;
        }
        component.on_activated.run(world, goal, timestep, events)?;
        return Ok(Some(goal));
    }
    Ok(None)
}

/// The first enemy overlapping the player stops and costs the player one
/// hitpoint.
///
/// # Errors
///
/// Registry errors, or the player lacking [`Health`].
pub fn player_vs_enemies(world: &mut World, player: Entity) -> EcsResult<Option<Entity>> {
    let reach = player_box(world, player)?;
    let enemy = world
        .all_of::<Enemy>()
        .into_iter()
        .find(|&enemy| hitbox(world, enemy).is_some_and(|rect| rect.intersects(reach)));

    if let Some(enemy) = enemy {
        stop(world, enemy);
        world.get_component_mut::<Health>(player)?.hitpoints -= 1;
        debug!(%enemy, "player hit by enemy");
    }
    Ok(enemy)
}
