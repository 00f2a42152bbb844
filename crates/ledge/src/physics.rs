//! # Physics Integrator
//!
//! Moves entities one axis at a time. The session runs X, resolves X
//! against the tile grid, then does the same for Y; the axes are never
//! integrated together.

use ledge_core::{EcsResult, SystemId, World};

use crate::components::{Collision, Facing, Physics, Transform};
use crate::math::move_to_zero;

/// Integrates velocity for every entity with [`Transform`] and [`Physics`].
#[derive(Debug)]
pub struct PhysicsSystem {
    id: SystemId,
}

impl PhysicsSystem {
    /// Registers the system.
    ///
    /// # Errors
    ///
    /// Registry errors from component or system registration.
    pub fn new(world: &mut World) -> EcsResult<Self> {
        let transform = world.register_component::<Transform>()?;
        let physics = world.register_component::<Physics>()?;
        Ok(Self {
            id: world.register_system("physics", &[transform, physics])?,
        })
    }

    /// Registry handle.
    #[must_use]
    pub const fn id(&self) -> SystemId {
        self.id
    }

    /// Horizontal step: advance by `velocity.x`, then apply friction.
    ///
    /// # Errors
    ///
    /// Registry errors.
    pub fn update_x(&self, world: &mut World, timestep: f32) -> EcsResult<()> {
        for entity in world.system_entities(self.id)? {
            let (transform, physics) = world.get_pair_mut::<Transform, Physics>(entity)?;
            transform.last_position = transform.position;
            if physics.velocity.x == 0.0 {
                continue;
            }

            transform.position.x += physics.velocity.x * timestep;
            let friction = if physics.touching_ground {
                physics.friction
            } else {
                physics.air_friction
            };
            physics.velocity.x = move_to_zero(physics.velocity.x, friction);

            let transform = *transform;
            if let Ok(collision) = world.get_component_mut::<Collision>(entity) {
                collision.sync_x(&transform);
            }
        }
        Ok(())
    }

    /// Vertical step: count airborne ticks, apply gravity, advance.
    ///
    /// # Errors
    ///
    /// Registry errors.
    pub fn update_y(&self, world: &mut World, timestep: f32) -> EcsResult<()> {
        for entity in world.system_entities(self.id)? {
            let (transform, physics) = world.get_pair_mut::<Transform, Physics>(entity)?;
            physics.off_ground_count = if physics.touching_ground {
                0
            } else {
                physics.off_ground_count.saturating_add(1)
            };

            physics.velocity.y += physics.gravity;
            if physics.velocity.y > physics.max_velocity.y {
                physics.velocity.y = physics.max_velocity.y;
            }
            transform.position.y += physics.velocity.y * timestep;

            let transform = *transform;
            if let Ok(collision) = world.get_component_mut::<Collision>(entity) {
                collision.sync_y(&transform);
            }
        }
        Ok(())
    }
}

/// Speeds `physics` up toward `direction`, never past `max_velocity.x`.
///
/// Uses the ground or air rate depending on `touching_ground`. An entity
/// already faster than the cap (e.g. after a walljump kick) keeps its speed.
pub fn accelerate(physics: &mut Physics, direction: Facing) {
    let sign = direction.sign();
    let max = physics.max_velocity.x;
    let rate = if physics.touching_ground {
        physics.acceleration.x
    } else {
        physics.air_acceleration.x
    };

    let speed = physics.velocity.x * sign;
    if speed < max {
        physics.velocity.x = (speed + rate).min(max) * sign;
    }
}
