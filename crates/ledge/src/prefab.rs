//! # Prefabs
//!
//! Assembles gameplay objects from components. Tuning values live here
//! rather than in config; they describe what each object *is*.

use ledge_core::{EcsResult, Entity, World};

use crate::behavior::Behavior;
use crate::components::{
    Checkpoint, Collision, EdgeCheck, Enemy, Facing, Goal, Health, Input, Physics, Pickup,
    PickupKind, Player, Projectile, Script, State, Transform,
};
use crate::input::{Action, ActionSet};
use crate::math::Vec2;

/// Projectile box edge length.
pub const PROJECTILE_SIZE: i32 = 4;
/// Projectile box offset from its transform.
pub const PROJECTILE_OFFSET: Vec2 = Vec2::new(4.0, 4.0);
/// Horizontal projectile speed.
pub const PROJECTILE_SPEED: f32 = 280.0;

fn spawn(world: &mut World, position: Vec2, collision: Collision) -> EcsResult<Entity> {
    let entity = world.create_entity()?;
    let transform = Transform::at(position);
    let mut collision = collision;
    collision.sync(&transform);
    world.add_component(entity, transform)?;
    world.add_component(entity, collision)?;
    Ok(entity)
}

/// The player. Starts able to walk only; jumping and shooting come from
/// pickups.
///
/// # Errors
///
/// Registry errors (e.g. the entity limit is reached).
pub fn player(world: &mut World, position: Vec2) -> EcsResult<Entity> {
    let entity = spawn(world, position, Collision::new(Vec2::new(8.0, 4.0), 8, 20))?;
    world.add_component(
        entity,
        Physics {
            acceleration: Vec2::new(95.0, 0.0),
            air_acceleration: Vec2::new(25.0, 0.0),
            max_velocity: Vec2::new(125.0, 300.0),
            jump_power: 260.0,
            friction: 30.0,
            air_friction: 5.0,
            ..Physics::default()
        },
    )?;
    world.add_component(
        entity,
        Input {
            allowed: ActionSet::of(&[Action::Left, Action::Right]),
        },
    )?;
    world.add_component(entity, Script::new(Behavior::PlayerTick))?;
    world.add_component(entity, Health { hitpoints: 1 })?;
    world.add_component(entity, Facing::East)?;
    world.add_component(entity, State::Idle)?;
    world.add_component(entity, Player)?;
    Ok(entity)
}

/// A floating collectible granting `kind`.
///
/// # Errors
///
/// Registry errors.
pub fn pickup(world: &mut World, position: Vec2, kind: PickupKind) -> EcsResult<Entity> {
    let (on_pickup, message) = match kind {
        PickupKind::Weapon => (Behavior::GrantWeapon, "Found a blaster! Shoot to fire."),
        PickupKind::Jump => (Behavior::GrantJump, "Found jump boosters! You can jump now."),
        PickupKind::Boots => (
            Behavior::GrantBoots,
            "Found heat boots! Walk carefully over spikes.",
        ),
        PickupKind::Walljump => (
            Behavior::GrantWalljump,
            "Found climbing gloves! Jump off walls.",
        ),
    };

    let entity = spawn(world, position, Collision::new(Vec2::new(1.0, 1.0), 14, 14))?;
    world.add_component(
        entity,
        Physics {
            max_velocity: Vec2::new(100.0, 100.0),
            gravity: 0.0,
            ..Physics::default()
        },
    )?;
    world.add_component(entity, Script::new(Behavior::PickupIdle))?;
    world.add_component(
        entity,
        Pickup {
            kind,
            on_pickup,
            message: Some(message.to_owned()),
        },
    )?;
    Ok(entity)
}

/// A respawn point, inactive until touched.
///
/// # Errors
///
/// Registry errors.
pub fn checkpoint(world: &mut World, position: Vec2) -> EcsResult<Entity> {
    let entity = spawn(world, position, Collision::new(Vec2::new(3.0, 3.0), 10, 10))?;
    world.add_component(
        entity,
        Checkpoint {
            on_activated: Behavior::CheckpointActivated,
            active: false,
        },
    )?;
    world.add_component(entity, State::Idle)?;
    Ok(entity)
}

/// The level exit.
///
/// # Errors
///
/// Registry errors.
pub fn goal(world: &mut World, position: Vec2) -> EcsResult<Entity> {
    let entity = spawn(world, position, Collision::new(Vec2::new(3.0, 3.0), 10, 10))?;
    world.add_component(
        entity,
        Goal {
            on_activated: Behavior::GoalActivated,
            activated: false,
        },
    )?;
    world.add_component(entity, State::Idle)?;
    Ok(entity)
}

/// A patrolling enemy that turns at walls and ledges.
///
/// # Errors
///
/// Registry errors.
pub fn enemy(world: &mut World, position: Vec2) -> EcsResult<Entity> {
    let entity = spawn(world, position, Collision::new(Vec2::new(1.0, 1.0), 15, 15))?;
    world.add_component(
        entity,
        Physics {
            acceleration: Vec2::new(15.0, 0.0),
            air_acceleration: Vec2::new(5.0, 0.0),
            max_velocity: Vec2::new(50.0, 300.0),
            friction: 10.0,
            air_friction: 5.0,
            ..Physics::default()
        },
    )?;
    world.add_component(entity, Script::new(Behavior::EnemyPatrol))?;
    world.add_component(entity, Health { hitpoints: 3 })?;
    world.add_component(entity, EdgeCheck::default())?;
    world.add_component(entity, Facing::East)?;
    world.add_component(entity, State::Running)?;
    world.add_component(entity, Enemy)?;
    Ok(entity)
}

/// A projectile flying toward `facing`. Gravity does not apply.
///
/// # Errors
///
/// Registry errors.
pub fn projectile(world: &mut World, position: Vec2, facing: Facing) -> EcsResult<Entity> {
    let entity = spawn(
        world,
        position,
        Collision::new(PROJECTILE_OFFSET, PROJECTILE_SIZE, PROJECTILE_SIZE),
    )?;
    world.add_component(
        entity,
        Physics {
            velocity: Vec2::new(PROJECTILE_SPEED * facing.sign(), 0.0),
            max_velocity: Vec2::new(PROJECTILE_SPEED, PROJECTILE_SPEED),
            gravity: 0.0,
            ..Physics::default()
        },
    )?;
    world.add_component(entity, facing)?;
    world.add_component(entity, Projectile::default())?;
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rect;

    #[test]
    fn test_player_box_is_synced() {
        let mut world = World::new(8);
        let player = player(&mut world, Vec2::new(10.0, 20.0)).unwrap();
        assert_eq!(
            world.get_component::<Collision>(player).unwrap().rect,
            Rect::new(18, 24, 8, 20)
        );
        let allowed = world.get_component::<Input>(player).unwrap().allowed;
        assert!(allowed.contains(Action::Right));
        assert!(!allowed.contains(Action::Jump));
    }

    #[test]
    fn test_projectile_direction() {
        let mut world = World::new(8);
        let west = projectile(&mut world, Vec2::ZERO, Facing::West).unwrap();
        assert_eq!(
            world.get_component::<Physics>(west).unwrap().velocity,
            Vec2::new(-PROJECTILE_SPEED, 0.0)
        );
        assert_eq!(world.get_component::<Projectile>(west).unwrap().damage, 1);
        assert_eq!(world.all_of::<Projectile>(), vec![west]);
    }

    #[test]
    fn test_pickup_carries_message() {
        let mut world = World::new(8);
        let item = pickup(&mut world, Vec2::ZERO, PickupKind::Boots).unwrap();
        let component = world.get_component::<Pickup>(item).unwrap();
        assert_eq!(component.on_pickup, Behavior::GrantBoots);
        assert!(component.message.is_some());
    }
}
