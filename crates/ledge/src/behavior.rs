//! # Behaviors
//!
//! Per-entity scripted logic as a closed set of variants. A behavior is
//! stored by value on [`Script`], [`Pickup`], [`Checkpoint`] and [`Goal`]
//! components and always runs as `behavior.run(world, entity, timestep,
//! audio)`. Any state it needs lives on the entity's own components.

use std::f32::consts::FRAC_PI_2;

use ledge_core::{EcsResult, Entity, SystemId, World};
use tracing::{debug, info};

use crate::components::{
    Boots, Collision, EdgeCheck, Facing, Goal, Input, Physics, Player, Script, State, Walljump,
    Weapon,
};
use crate::events::{EventSender, Sound};
use crate::input::Action;
use crate::physics::accelerate;

/// Seconds per full bob of an idle pickup.
const PICKUP_BOB_PERIOD: f32 = 4.0;

/// Scripted behavior attached to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Behavior {
    /// Updates the player's animation state and weapon timer.
    PlayerTick,
    /// Walks back and forth, turning at walls and ledges.
    EnemyPatrol,
    /// Slow vertical bob of an uncollected pickup.
    PickupIdle,
    /// Gives the player a weapon and allows shooting.
    GrantWeapon,
    /// Allows the player to jump.
    GrantJump,
    /// Gives the player boots.
    GrantBoots,
    /// Gives the player walljumping.
    GrantWalljump,
    /// Switches a checkpoint on.
    CheckpointActivated,
    /// Switches the goal on.
    GoalActivated,
}

impl Behavior {
    /// Runs the behavior for `entity`.
    ///
    /// Components a behavior touches but the entity lacks are skipped, so
    /// a behavior can be attached to anything.
    ///
    /// # Errors
    ///
    /// Registry errors (e.g. `entity` is dead).
    pub fn run(
        self,
        world: &mut World,
        entity: Entity,
        timestep: f32,
        audio: &EventSender,
    ) -> EcsResult<()> {
        match self {
            Self::PlayerTick => player_tick(world, entity, timestep),
            Self::EnemyPatrol => enemy_patrol(world, entity),
            Self::PickupIdle => pickup_idle(world, entity, timestep),
            Self::GrantWeapon => grant(world, self, |world, player| {
                world.add_component(player, Weapon::default())?;
                allow(world, player, Action::Shoot)
            }),
            Self::GrantJump => grant(world, self, |world, player| {
                allow(world, player, Action::Jump)
            }),
            Self::GrantBoots => grant(world, self, |world, player| {
                world.add_component(player, Boots)
            }),
            Self::GrantWalljump => grant(world, self, |world, player| {
                world.add_component(player, Walljump)
            }),
            Self::CheckpointActivated => {
                set_state(world, entity, State::Active)?;
                audio.play(Some(entity), Sound::CheckpointActivated, 1.0);
                Ok(())
            }
            Self::GoalActivated => {
                set_state(world, entity, State::Active)?;
                if let Ok(goal) = world.get_component_mut::<Goal>(entity) {
                    goal.activated = true;
                }
                audio.play(Some(entity), Sound::Goal, 1.0);
                Ok(())
            }
        }
    }
}

/// Sets `entity`'s [`State`] if it has one.
///
/// # Errors
///
/// [`ledge_core::EcsError::DeadEntity`] if `entity` is not alive.
pub fn set_state(world: &mut World, entity: Entity, state: State) -> EcsResult<()> {
    if !world.is_alive(entity) {
        return Err(ledge_core::EcsError::DeadEntity(entity));
    }
    if let Ok(current) = world.get_component_mut::<State>(entity) {
        *current = state;
    }
    Ok(())
}

fn player_tick(world: &mut World, entity: Entity, timestep: f32) -> EcsResult<()> {
    let grounded = world.get_component::<Physics>(entity)?.touching_ground;
    if let Ok(state) = world.get_component_mut::<State>(entity) {
        if !grounded {
            *state = State::Jumping;
        } else if *state == State::Jumping {
            *state = State::Idle;
        }
    }
    if let Ok(weapon) = world.get_component_mut::<Weapon>(entity) {
        weapon.since_last_shot_ms += timestep * 1000.0;
    }
    Ok(())
}

fn enemy_patrol(world: &mut World, entity: Entity) -> EcsResult<()> {
    let collision = *world.get_component::<Collision>(entity)?;
    let edge = world
        .get_component::<EdgeCheck>(entity)
        .copied()
        .unwrap_or_default();
    let facing = world.get_component_mut::<Facing>(entity)?;

    let blocked = match *facing {
        Facing::East => collision.colliding_right || edge.on_right_edge,
        Facing::West => collision.colliding_left || edge.on_left_edge,
    };
    if blocked {
        *facing = match *facing {
            Facing::East => Facing::West,
            Facing::West => Facing::East,
        };
    }
    let direction = *facing;

    accelerate(world.get_component_mut::<Physics>(entity)?, direction);
    set_state(world, entity, State::Running)
}

fn pickup_idle(world: &mut World, entity: Entity, timestep: f32) -> EcsResult<()> {
    let script = world.get_component_mut::<Script>(entity)?;
    let phase = script.timer;
    script.timer += timestep;
    let wrapped = script.timer >= PICKUP_BOB_PERIOD;
    if wrapped {
        script.timer = 0.0;
    }

    let physics = world.get_component_mut::<Physics>(entity)?;
    if wrapped {
        physics.velocity.y = 0.0;
    } else {
        physics.velocity.y += (phase * FRAC_PI_2).cos() / 4.0;
    }
    Ok(())
}

/// Applies an upgrade to the first player.
fn grant(
    world: &mut World,
    behavior: Behavior,
    apply: impl FnOnce(&mut World, Entity) -> EcsResult<()>,
) -> EcsResult<()> {
    let Some(player) = world.all_of::<Player>().first().copied() else {
        debug!(?behavior, "no player to grant to");
        return Ok(());
    };
    apply(world, player)?;
    info!(?behavior, %player, "upgrade granted");
    Ok(())
}

fn allow(world: &mut World, entity: Entity, action: Action) -> EcsResult<()> {
    world.get_component_mut::<Input>(entity)?.allowed.insert(action);
    Ok(())
}

/// Runs every entity's [`Script`] once per tick.
#[derive(Debug)]
pub struct ScriptSystem {
    id: SystemId,
}

impl ScriptSystem {
    /// Registers the system.
    ///
    /// # Errors
    ///
    /// Registry errors from component or system registration.
    pub fn new(world: &mut World) -> EcsResult<Self> {
        let script = world.register_component::<Script>()?;
        Ok(Self {
            id: world.register_system("script", &[script])?,
        })
    }

    /// Registry handle.
    #[must_use]
    pub const fn id(&self) -> SystemId {
        self.id
    }

    /// Runs each script. Entities destroyed by an earlier script in the same
    /// pass are skipped.
    ///
    /// # Errors
    ///
    /// Registry errors raised by a behavior.
    pub fn update(&self, world: &mut World, timestep: f32, audio: &EventSender) -> EcsResult<()> {
        for entity in world.system_entities(self.id)? {
            if !world.is_alive(entity) {
                continue;
            }
            let behavior = world.get_component::<Script>(entity)?.behavior;
            behavior.run(world, entity, timestep, audio)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventBus, GameEvent};
    use crate::math::Vec2;
    use crate::prefab;

    #[test]
    fn test_grants_reach_the_player() {
        let mut world = World::new(32);
        let bus = EventBus::new(8);
        let player = prefab::player(&mut world, Vec2::ZERO).unwrap();
        let pickup = world.create_entity().unwrap();

        Behavior::GrantWeapon
            .run(&mut world, pickup, 0.0, &bus.sender())
            .unwrap();
        Behavior::GrantJump
            .run(&mut world, pickup, 0.0, &bus.sender())
            .unwrap();
        Behavior::GrantBoots
            .run(&mut world, pickup, 0.0, &bus.sender())
            .unwrap();

        let allowed = world.get_component::<Input>(player).unwrap().allowed;
        assert!(allowed.contains(Action::Shoot));
        assert!(allowed.contains(Action::Jump));
        assert!(world.has_component::<Weapon>(player));
        assert!(world.has_component::<Boots>(player));
        assert!(!world.has_component::<Walljump>(player));
    }

    #[test]
    fn test_grant_without_player_is_harmless() {
        let mut world = World::new(8);
        let bus = EventBus::new(8);
        let pickup = world.create_entity().unwrap();
        Behavior::GrantWalljump
            .run(&mut world, pickup, 0.0, &bus.sender())
            .unwrap();
    }

    #[test]
    fn test_goal_activation() {
        let mut world = World::new(8);
        let bus = EventBus::new(8);
        let goal = prefab::goal(&mut world, Vec2::ZERO).unwrap();

        Behavior::GoalActivated
            .run(&mut world, goal, 0.0, &bus.sender())
            .unwrap();
        assert!(world.get_component::<Goal>(goal).unwrap().activated);
        assert_eq!(world.get_component::<State>(goal), Ok(&State::Active));
        assert_eq!(
            bus.receiver().drain(),
            vec![GameEvent::PlaySound {
                source: Some(goal),
                sound: Sound::Goal,
                volume: 1.0,
            }]
        );
    }

    #[test]
    fn test_enemy_turns_at_walls_and_edges() {
        let mut world = World::new(8);
        let bus = EventBus::new(8);
        let enemy = prefab::enemy(&mut world, Vec2::ZERO).unwrap();
        world.get_component_mut::<Physics>(enemy).unwrap().touching_ground = true;

        Behavior::EnemyPatrol
            .run(&mut world, enemy, 0.0, &bus.sender())
            .unwrap();
        assert_eq!(world.get_component::<Facing>(enemy), Ok(&Facing::East));
        assert_eq!(world.get_component::<Physics>(enemy).unwrap().velocity.x, 15.0);

        world.get_component_mut::<EdgeCheck>(enemy).unwrap().on_right_edge = true;
        Behavior::EnemyPatrol
            .run(&mut world, enemy, 0.0, &bus.sender())
            .unwrap();
        assert_eq!(world.get_component::<Facing>(enemy), Ok(&Facing::West));
        assert_eq!(world.get_component::<Physics>(enemy).unwrap().velocity.x, 0.0);
        assert_eq!(world.get_component::<State>(enemy), Ok(&State::Running));
    }

    #[test]
    fn test_pickup_bob_wraps() {
        let mut world = World::new(8);
        let bus = EventBus::new(8);
        let system = ScriptSystem::new(&mut world).unwrap();
        let pickup = prefab::pickup(&mut world, Vec2::ZERO, crate::components::PickupKind::Jump)
            .unwrap();

        system.update(&mut world, 1.0, &bus.sender()).unwrap();
        // cos(0) / 4
        assert_eq!(world.get_component::<Physics>(pickup).unwrap().velocity.y, 0.25);

        for _ in 0..3 {
            system.update(&mut world, 1.0, &bus.sender()).unwrap();
        }
        assert_eq!(world.get_component::<Script>(pickup).unwrap().timer, 0.0);
        assert_eq!(world.get_component::<Physics>(pickup).unwrap().velocity.y, 0.0);
    }

    #[test]
    fn test_player_tick_advances_weapon_timer() {
        let mut world = World::new(8);
        let bus = EventBus::new(8);
        let system = ScriptSystem::new(&mut world).unwrap();
        let player = prefab::player(&mut world, Vec2::ZERO).unwrap();
        world
            .add_component(
                player,
                Weapon {
                    cooldown_ms: 250.0,
                    since_last_shot_ms: 0.0,
                },
            )
            .unwrap();

        system.update(&mut world, 0.1, &bus.sender()).unwrap();
        let weapon = world.get_component::<Weapon>(player).unwrap();
        assert!((weapon.since_last_shot_ms - 100.0).abs() < 1e-3);
        assert_eq!(world.get_component::<State>(player), Ok(&State::Jumping));
    }
}
