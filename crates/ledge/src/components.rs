//! # Gameplay Components
//!
//! Plain data attached to entities. Anything with behavior refers to a
//! [`Behavior`] by value; nothing here holds a reference to another entity.

use ledge_core::Component;

use crate::behavior::Behavior;
use crate::input::ActionSet;
use crate::math::{to_pixel, Rect, Vec2};

/// Where an entity is, and where it was at the start of the tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    /// Current position.
    pub position: Vec2,
    /// Position before this tick's X integration.
    pub last_position: Vec2,
}

impl Transform {
    /// Transform resting at `position`.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            last_position: position,
        }
    }
}

impl Component for Transform {}

/// Motion state and tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Physics {
    /// Pixels per second.
    pub velocity: Vec2,
    /// Speed gained per tick of input while grounded.
    pub acceleration: Vec2,
    /// Speed gained per tick of input while airborne.
    pub air_acceleration: Vec2,
    /// Speed caps (`y` caps falling only).
    pub max_velocity: Vec2,
    /// Upward speed of a jump.
    pub jump_power: f32,
    /// Added to `velocity.y` every tick.
    pub gravity: f32,
    /// Horizontal decay per tick while grounded.
    pub friction: f32,
    /// Horizontal decay per tick while airborne.
    pub air_friction: f32,
    /// Standing on something solid.
    pub touching_ground: bool,
    /// Ticks since `touching_ground` was last true.
    pub off_ground_count: u32,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            air_acceleration: Vec2::ZERO,
            max_velocity: Vec2::ZERO,
            jump_power: 0.0,
            gravity: 10.0,
            friction: 0.0,
            air_friction: 0.0,
            touching_ground: false,
            off_ground_count: 0,
        }
    }
}

impl Component for Physics {}

/// Collision box and the resolver's per-side contact flags.
///
/// The rectangle's size is fixed; its position is derived from the
/// transform whenever [`Collision::sync`] runs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Collision {
    /// Offset of the box from the transform position.
    pub offset: Vec2,
    /// The box in pixel space.
    pub rect: Rect,
    /// Blocked on the left last resolve.
    pub colliding_left: bool,
    /// Blocked on the right last resolve.
    pub colliding_right: bool,
    /// Blocked above last resolve.
    pub colliding_up: bool,
    /// Blocked below last resolve.
    pub colliding_down: bool,
}

impl Collision {
    /// A `w` x `h` box at `offset` from the transform.
    #[must_use]
    pub const fn new(offset: Vec2, w: i32, h: i32) -> Self {
        Self {
            offset,
            rect: Rect::new(0, 0, w, h),
            colliding_left: false,
            colliding_right: false,
            colliding_up: false,
            colliding_down: false,
        }
    }

    /// Recomputes the box's x from the transform.
    #[inline]
    pub fn sync_x(&mut self, transform: &Transform) {
        self.rect.x = to_pixel(transform.position.x + self.offset.x);
    }

    /// Recomputes the box's y from the transform.
    #[inline]
    pub fn sync_y(&mut self, transform: &Transform) {
        self.rect.y = to_pixel(transform.position.y + self.offset.y);
    }

    /// Recomputes the box's position from the transform.
    #[inline]
    pub fn sync(&mut self, transform: &Transform) {
        self.sync_x(transform);
        self.sync_y(transform);
    }

    /// Box position for `transform` without mutating the component.
    #[must_use]
    pub fn rect_at(&self, transform: &Transform) -> Rect {
        let mut synced = *self;
        synced.sync(transform);
        synced.rect
    }
}

impl Component for Collision {}

/// Hit points. Zero or below means dead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    /// Remaining hit points.
    pub hitpoints: i32,
}

impl Component for Health {}

/// Animation state, read by the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum State {
    /// Standing still.
    #[default]
    Idle,
    /// Switched on (checkpoints, goal).
    Active,
    /// Moving along the ground.
    Running,
    /// Airborne.
    Jumping,
}

impl Component for State {}

/// Which way an entity faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Right.
    #[default]
    East,
    /// Left.
    West,
}

impl Facing {
    /// `1.0` for east, `-1.0` for west.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::East => 1.0,
            Self::West => -1.0,
        }
    }
}

impl Component for Facing {}

/// Marks a projectile. Any solid hit destroys it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Projectile {
    /// Hit points taken from an enemy on contact.
    pub damage: i32,
}

impl Default for Projectile {
    fn default() -> Self {
        Self { damage: 1 }
    }
}

impl Component for Projectile {}

/// Lets hazards be stood on at low speed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Boots;

impl Component for Boots {}

/// Allows jumping off a wall being pushed against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Walljump;

impl Component for Walljump {}

/// Shooting ability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weapon {
    /// Minimum time between shots.
    pub cooldown_ms: f32,
    /// Time since the last shot.
    pub since_last_shot_ms: f32,
}

impl Weapon {
    /// True once the cooldown has elapsed.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.since_last_shot_ms >= self.cooldown_ms
    }
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            cooldown_ms: 250.0,
            since_last_shot_ms: 250.0,
        }
    }
}

impl Component for Weapon {}

/// Tracks whether the ground ends just past either foot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeCheck {
    /// No solid tile below-left.
    pub on_left_edge: bool,
    /// No solid tile below-right.
    pub on_right_edge: bool,
}

impl Component for EdgeCheck {}

/// Marks the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Player;

impl Component for Player {}

/// Marks an enemy that hurts the player on contact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Enemy;

impl Component for Enemy {}

/// Upgrade granted by a pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PickupKind {
    /// Shooting.
    Weapon,
    /// Jumping.
    Jump,
    /// Standing on hazards.
    Boots,
    /// Walljumping.
    Walljump,
}

/// A collectible. Destroyed on first touch.
#[derive(Clone, Debug, PartialEq)]
pub struct Pickup {
    /// What it grants.
    pub kind: PickupKind,
    /// Run once, on collection.
    pub on_pickup: Behavior,
    /// Dialogue shown on collection.
    pub message: Option<String>,
}

impl Component for Pickup {}

/// A respawn point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Checkpoint {
    /// Run when the player first touches it.
    pub on_activated: Behavior,
    /// The player respawns here.
    pub active: bool,
}

impl Component for Checkpoint {}

/// The level exit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Goal {
    /// Run once, when the player reaches it.
    pub on_activated: Behavior,
    /// Set by `on_activated`; an activated goal is ignored.
    pub activated: bool,
}

impl Component for Goal {}

/// Per-tick behavior plus its private timer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Script {
    /// What to run.
    pub behavior: Behavior,
    /// Free-running timer owned by the behavior.
    pub timer: f32,
}

impl Script {
    /// Script with a zeroed timer.
    #[must_use]
    pub const fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            timer: 0.0,
        }
    }
}

impl Component for Script {}

/// Actions an entity currently responds to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Input {
    /// Allowed actions.
    pub allowed: ActionSet,
}

impl Component for Input {}
