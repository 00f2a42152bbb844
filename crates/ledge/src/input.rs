//! # Input System
//!
//! Turns the host's per-tick [`InputState`] into movement for every entity
//! with [`Input`] and [`Physics`]:
//! - Left/Right accelerate (ground or air rate) and turn the entity
//! - Jump within the coyote window, or off a wall with [`Walljump`]
//! - Shoot when a [`Weapon`] is off cooldown
//!
//! An action only has an effect if the entity's [`ActionSet`] allows it.

use ledge_core::{EcsResult, Entity, SystemId, World};
use tracing::trace;

use crate::behavior::set_state;
use crate::components::{Collision, Facing, Input, Physics, State, Transform, Walljump, Weapon};
use crate::config::PhysicsConfig;
use crate::events::{EventSender, Sound};
use crate::math::Vec2;
use crate::physics::accelerate;
use crate::prefab;

/// Something the player can do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move left.
    Left,
    /// Move right.
    Right,
    /// Jump (edge-triggered).
    Jump,
    /// Crouch; currently only logged.
    Down,
    /// Fire the weapon (edge-triggered).
    Shoot,
}

impl Action {
    /// Every action.
    pub const ALL: [Self; 5] = [Self::Left, Self::Right, Self::Jump, Self::Down, Self::Shoot];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Small set of [`Action`]s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ActionSet(u8);

impl ActionSet {
    /// No actions.
    pub const EMPTY: Self = Self(0);

    /// Set of the given actions.
    #[must_use]
    pub fn of(actions: &[Action]) -> Self {
        actions.iter().fold(Self::EMPTY, |mut set, action| {
            set.insert(*action);
            set
        })
    }

    /// Adds an action. Adding twice is a no-op.
    #[inline]
    pub fn insert(&mut self, action: Action) {
        self.0 |= action.bit();
    }

    /// Removes an action.
    #[inline]
    pub fn remove(&mut self, action: Action) {
        self.0 &= !action.bit();
    }

    /// Checks for an action.
    #[inline]
    #[must_use]
    pub const fn contains(self, action: Action) -> bool {
        self.0 & action.bit() != 0
    }
}

/// Which actions are held, and which went down this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    down: ActionSet,
    pressed: ActionSet,
}

impl InputState {
    /// Nothing held.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            down: ActionSet::EMPTY,
            pressed: ActionSet::EMPTY,
        }
    }

    /// Marks `action` held, and pressed if it was not held before.
    pub fn press(&mut self, action: Action) {
        if !self.down.contains(action) {
            self.pressed.insert(action);
        }
        self.down.insert(action);
    }

    /// Marks `action` released.
    pub fn release(&mut self, action: Action) {
        self.down.remove(action);
        self.pressed.remove(action);
    }

    /// Clears the pressed edges; call after each tick.
    pub fn end_tick(&mut self) {
        self.pressed = ActionSet::EMPTY;
    }

    /// Held this tick.
    #[inline]
    #[must_use]
    pub const fn is_down(&self, action: Action) -> bool {
        self.down.contains(action)
    }

    /// Went down this tick.
    #[inline]
    #[must_use]
    pub const fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(action)
    }
}

/// Applies player input.
#[derive(Debug)]
pub struct InputSystem {
    id: SystemId,
    coyote_ticks: u32,
    walljump_kick: f32,
}

impl InputSystem {
    /// Registers the system (requires [`Input`] and [`Physics`]).
    ///
    /// # Errors
    ///
    /// Registry errors from component or system registration.
    pub fn new(world: &mut World, config: &PhysicsConfig) -> EcsResult<Self> {
        let input = world.register_component::<Input>()?;
        let physics = world.register_component::<Physics>()?;
        Ok(Self {
            id: world.register_system("input", &[input, physics])?,
            coyote_ticks: config.coyote_ticks,
            walljump_kick: config.walljump_kick,
        })
    }

    /// Registry handle.
    #[must_use]
    pub const fn id(&self) -> SystemId {
        self.id
    }

    /// Applies `state` to every controlled entity. Returns spawned
    /// projectiles.
    ///
    /// # Errors
    ///
    /// Registry errors (e.g. entity limit reached while spawning).
    pub fn update(
        &self,
        world: &mut World,
        state: &InputState,
        audio: &EventSender,
    ) -> EcsResult<Vec<Entity>> {
        let mut spawned = Vec::new();
        for entity in world.system_entities(self.id)? {
            let allowed = world.get_component::<Input>(entity)?.allowed;
            let wants = |action: Action| allowed.contains(action);

            let direction = if state.is_down(Action::Left) && wants(Action::Left) {
                Some(Facing::West)
            } else if state.is_down(Action::Right) && wants(Action::Right) {
                Some(Facing::East)
            } else {
                None
            };
            if let Some(direction) = direction {
                self.steer(world, entity, direction)?;
            }

            if state.is_pressed(Action::Jump) && wants(Action::Jump) {
                self.jump(world, entity, audio)?;
            } else if state.is_down(Action::Down) && wants(Action::Down) {
                trace!(%entity, "down held");
            }

            if state.is_pressed(Action::Shoot) && wants(Action::Shoot) {
                if let Some(projectile) = shoot(world, entity, audio)? {
                    spawned.push(projectile);
                }
            }
        }
        Ok(spawned)
    }

    fn steer(&self, world: &mut World, entity: Entity, direction: Facing) -> EcsResult<()> {
        let physics = world.get_component_mut::<Physics>(entity)?;
        accelerate(physics, direction);
        let grounded = physics.touching_ground;

        if grounded {
            set_state(world, entity, State::Running)?;
        }
        if let Ok(facing) = world.get_component_mut::<Facing>(entity) {
            *facing = direction;
        }
        Ok(())
    }

    fn jump(&self, world: &mut World, entity: Entity, audio: &EventSender) -> EcsResult<()> {
        let physics = *world.get_component::<Physics>(entity)?;

        if physics.off_ground_count < self.coyote_ticks {
            let physics = world.get_component_mut::<Physics>(entity)?;
            physics.velocity.y = -physics.jump_power;
            physics.touching_ground = false;
            physics.off_ground_count = self.coyote_ticks;
            set_state(world, entity, State::Jumping)?;
            audio.play(Some(entity), Sound::Jump, 1.0);
            return Ok(());
        }

        if !world.has_component::<Walljump>(entity) {
            return Ok(());
        }
        let Ok(collision) = world.get_component::<Collision>(entity) else {
            return Ok(());
        };
        if !(collision.colliding_left || collision.colliding_right) {
            return Ok(());
        }

        // Kick away from the wall
        let away = if collision.colliding_left { 1.0 } else { -1.0 };
        let physics = world.get_component_mut::<Physics>(entity)?;
        physics.velocity.x += self.walljump_kick * away;
        physics.velocity.y = -physics.jump_power;
        set_state(world, entity, State::Jumping)?;
        audio.play(Some(entity), Sound::Walljump, 1.0);
        Ok(())
    }
}

/// Fires `entity`'s weapon if it has one and it is ready.
fn shoot(world: &mut World, entity: Entity, audio: &EventSender) -> EcsResult<Option<Entity>> {
    match world.get_component::<Weapon>(entity) {
        Ok(weapon) if weapon.ready() => {}
        _ => return Ok(None),
    }

    let transform = *world.get_component::<Transform>(entity)?;
    let origin = match world.get_component::<Collision>(entity) {
        Ok(collision) => collision.rect_at(&transform).center(),
        Err(_) => transform.position,
    };
    let facing = world
        .get_component::<Facing>(entity)
        .copied()
        .unwrap_or_default();

    let projectile = prefab::projectile(world, centered_projectile(origin), facing)?;
    world.get_component_mut::<Weapon>(entity)?.since_last_shot_ms = 0.0;
    audio.play(Some(entity), Sound::Shoot, 1.0);
    trace!(%entity, %projectile, ?facing, "shot fired");
    Ok(Some(projectile))
}

/// Transform position that centers a projectile's box on `origin`.
fn centered_projectile(origin: Vec2) -> Vec2 {
    let half = prefab::PROJECTILE_SIZE as f32 / 2.0;
    origin - prefab::PROJECTILE_OFFSET - Vec2::new(half, half)
}
