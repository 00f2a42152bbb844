//! # Collision Resolver
//!
//! Resolves each axis against the tile grid right after that axis was
//! integrated:
//!
//! ```text
//! velocity sign ──> leading edge ──> tiles on that edge ──> blocking tile
//!                                                              │
//!             ┌───────────────┬───────────────┬────────────────┘
//!             v               v               v
//!       projectile?      solid/boots      hazard (down)
//!       destroy, stop    snap + flag      health = 0
//! ```
//!
//! Every entity is read as a copy, resolved, and written back, so the only
//! structural change in a pass is the projectile short-circuit.

use ledge_core::{EcsResult, Entity, SystemId, World};
use tracing::{debug, trace};

use crate::behavior::set_state;
use crate::components::{Boots, Collision, EdgeCheck, Health, Physics, Projectile, State, Transform};
use crate::config::CollisionConfig;
use crate::level::{Level, TileType};

/// Resolves tile collisions for every entity with [`Transform`],
/// [`Physics`] and [`Collision`].
#[derive(Debug)]
pub struct CollisionSystem {
    id: SystemId,
    config: CollisionConfig,
}

/// Copy of the three components a resolve pass works on.
#[derive(Clone, Copy)]
struct Body {
    transform: Transform,
    physics: Physics,
    collision: Collision,
}

impl Body {
    fn load(world: &World, entity: Entity) -> EcsResult<Self> {
        Ok(Self {
            transform: *world.get_component::<Transform>(entity)?,
            physics: *world.get_component::<Physics>(entity)?,
            collision: *world.get_component::<Collision>(entity)?,
        })
    }

    fn store(self, world: &mut World, entity: Entity) -> EcsResult<()> {
        *world.get_component_mut::<Transform>(entity)? = self.transform;
        *world.get_component_mut::<Physics>(entity)? = self.physics;
        *world.get_component_mut::<Collision>(entity)? = self.collision;
        Ok(())
    }

    fn snap_to_floor(&mut self, tile_y: i32, tile_size: i32) {
        let collision = &mut self.collision;
        self.transform.position.y =
            (tile_y * tile_size - collision.rect.h) as f32 - collision.offset.y;
        collision.sync(&self.transform);
        collision.colliding_down = true;
        self.physics.touching_ground = true;
        self.physics.velocity.y = 0.0;
    }
}

/// Outcome of resolving one entity on one axis.
enum Resolved {
    /// Nothing in the way.
    Free(Body),
    /// Snapped against a tile.
    Blocked(Body),
    /// The entity is a projectile that hit a solid tile.
    ProjectileHit,
}

impl CollisionSystem {
    /// Registers the system.
    ///
    /// # Errors
    ///
    /// Registry errors from component or system registration.
    pub fn new(world: &mut World, config: CollisionConfig) -> EcsResult<Self> {
        let transform = world.register_component::<Transform>()?;
        let physics = world.register_component::<Physics>()?;
        let collision = world.register_component::<Collision>()?;
        Ok(Self {
            id: world.register_system("collision", &[transform, physics, collision])?,
            config,
        })
    }

    /// Registry handle.
    #[must_use]
    pub const fn id(&self) -> SystemId {
        self.id
    }

    /// Resolves horizontal movement.
    ///
    /// A projectile hitting a solid tile is destroyed and ends the pass;
    /// the destroyed entity is returned.
    ///
    /// # Errors
    ///
    /// Registry errors.
    pub fn resolve_x(&self, world: &mut World, level: &Level) -> EcsResult<Option<Entity>> {
        for entity in world.system_entities(self.id)? {
            let body = Body::load(world, entity)?;
            match self.sweep_x(world, entity, body, level) {
                Resolved::Free(body) => body.store(world, entity)?,
                Resolved::Blocked(body) => {
                    body.store(world, entity)?;
                    if body.physics.touching_ground {
                        set_state(world, entity, State::Idle)?;
                    }
                }
                Resolved::ProjectileHit => {
                    world.destroy_entity(entity)?;
                    trace!(%entity, axis = "x", "projectile hit a wall");
                    return Ok(Some(entity));
                }
            }
        }
        Ok(None)
    }

    fn sweep_x(&self, world: &World, entity: Entity, mut body: Body, level: &Level) -> Resolved {
        let ts = level.tile_size();
        let rect = body.collision.rect;
        let velocity = body.physics.velocity.x;

        if velocity == 0.0 {
            body.collision.colliding_left = false;
            body.collision.colliding_right = false;
            return Resolved::Free(body);
        }

        let moving_left = velocity < 0.0;
        if moving_left {
            body.collision.colliding_right = false;
        } else {
            body.collision.colliding_left = false;
        }

        let column = if moving_left {
            level.tile_coord(rect.x - 1)
        } else {
            level.tile_coord(rect.right() + 1)
        };
        // Every candidate shares the column, so any hit gives the same snap
        let blocked = (level.tile_coord(rect.y)..=level.tile_coord(rect.bottom() - 1))
            .any(|row| level.type_at(column, row) == TileType::Solid);

        if !blocked {
            if moving_left {
                body.collision.colliding_left = false;
            } else {
                body.collision.colliding_right = false;
            }
            return Resolved::Free(body);
        }
        if world.has_component::<Projectile>(entity) {
            return Resolved::ProjectileHit;
        }

        let collision = &mut body.collision;
        body.transform.position.x = if moving_left {
            collision.colliding_left = true;
            (column * ts + ts) as f32 - collision.offset.x
        } else {
            collision.colliding_right = true;
            (column * ts - collision.rect.w) as f32 - collision.offset.x
        };
        collision.sync(&body.transform);
        body.physics.velocity.x = 0.0;
        Resolved::Blocked(body)
    }

    /// Resolves vertical movement, including hazards.
    ///
    /// Hazard deaths only zero the entity's health; the death pass removes
    /// it later. Returns a projectile destroyed by a solid hit, as
    /// [`CollisionSystem::resolve_x`] does.
    ///
    /// # Errors
    ///
    /// Registry errors.
    pub fn resolve_y(
        &self,
        world: &mut World,
        level: &Level,
        timestep: f32,
    ) -> EcsResult<Option<Entity>> {
        for entity in world.system_entities(self.id)? {
            let body = Body::load(world, entity)?;
            match self.sweep_y(world, entity, body, level, timestep) {
                Resolved::Free(body) | Resolved::Blocked(body) => body.store(world, entity)?,
                Resolved::ProjectileHit => {
                    world.destroy_entity(entity)?;
                    trace!(%entity, axis = "y", "projectile hit a wall");
                    return Ok(Some(entity));
                }
            }
        }
        Ok(None)
    }

    fn sweep_y(
        &self,
        world: &mut World,
        entity: Entity,
        mut body: Body,
        level: &Level,
        timestep: f32,
    ) -> Resolved {
        let ts = level.tile_size();
        let rect = body.collision.rect;
        let velocity = body.physics.velocity.y;

        if velocity == 0.0 {
            body.collision.colliding_up = false;
            body.collision.colliding_down = false;
            return Resolved::Free(body);
        }

        let columns = level.tile_coord(rect.x)..=level.tile_coord(rect.right() - 1);
        let touches = |row: i32, tile_type: TileType| {
            columns
                .clone()
                .any(|column| level.type_at(column, row) == tile_type)
        };

        if velocity < 0.0 {
            body.collision.colliding_down = false;
            body.physics.touching_ground = false;

            let row = level.tile_coord(rect.y);
            if !touches(row, TileType::Solid) {
                body.collision.colliding_up = false;
                return Resolved::Free(body);
            }
            if world.has_component::<Projectile>(entity) {
                return Resolved::ProjectileHit;
            }

            body.transform.position.y = (row * ts + ts) as f32 - body.collision.offset.y;
            body.collision.sync(&body.transform);
            body.collision.colliding_up = true;
            body.physics.velocity.y = 0.0;
            return Resolved::Blocked(body);
        }

        body.collision.colliding_up = false;
        // A slow fall tests the row under the feet, a fast one the row they
        // already reached
        let lead = if velocity * timestep < 1.0 { 0 } else { 1 };
        let row = level.tile_coord(rect.bottom() - lead);

        if touches(row, TileType::Solid) {
            if world.has_component::<Projectile>(entity) {
                return Resolved::ProjectileHit;
            }
            body.snap_to_floor(row, ts);
            return Resolved::Blocked(body);
        }

        if touches(row, TileType::Hazard) {
            let safe = world.has_component::<Boots>(entity)
                && velocity * timestep < self.config.boots_landing_threshold;
            if safe {
                body.snap_to_floor(row, ts);
                return Resolved::Blocked(body);
            }
            if let Ok(health) = world.get_component_mut::<Health>(entity) {
                health.hitpoints = 0;
            }
            body.physics.velocity.x = 0.0;
            body.physics.velocity.y = 0.0;
            debug!(%entity, row, "landed on a hazard");
            return Resolved::Free(body);
        }

        body.collision.colliding_down = false;
        body.physics.touching_ground = false;
        Resolved::Free(body)
    }

    /// Updates [`EdgeCheck`] from the tiles just below each foot.
    ///
    /// Entities airborne for longer than the configured number of ticks
    /// report no edges.
    ///
    /// # Errors
    ///
    /// Registry errors.
    pub fn check_edges(&self, world: &mut World, level: &Level) -> EcsResult<()> {
        for entity in world.system_entities(self.id)? {
            if !world.has_component::<EdgeCheck>(entity) {
                continue;
            }
            let physics = *world.get_component::<Physics>(entity)?;
            let rect = world.get_component::<Collision>(entity)?.rect;

            let edge = if physics.off_ground_count > self.config.edge_suppress_after {
                EdgeCheck::default()
            } else {
                let below = level.tile_coord(rect.bottom());
                let open = |column: i32| {
                    level.contains(column, below) && level.type_at(column, below) != TileType::Solid
                };
                EdgeCheck {
                    on_left_edge: open(level.tile_coord(rect.x - 1)),
                    on_right_edge: open(level.tile_coord(rect.right())),
                }
            };
            *world.get_component_mut::<EdgeCheck>(entity)? = edge;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Rect, Vec2};

    const TS: i32 = 16;

    // 8 x 6 tiles; a wall at column 5, a hazard strip at row 4
    const MAP: &str = "
........
........
.....#..
.....#..
..^^....
########
";

    fn setup() -> (World, CollisionSystem, Level) {
        let mut world = World::new(32);
        let system = CollisionSystem::new(&mut world, CollisionConfig::default()).unwrap();
        let level = Level::from_ascii(MAP, TS).unwrap();
        (world, system, level)
    }

    fn body(world: &mut World, position: Vec2, velocity: Vec2) -> Entity {
        let e = world.create_entity().unwrap();
        let transform = Transform::at(position);
        let mut collision = Collision::new(Vec2::ZERO, 8, 8);
        collision.sync(&transform);
        world.add_component(e, transform).unwrap();
        world
            .add_component(
                e,
                Physics {
                    velocity,
                    ..Physics::default()
                },
            )
            .unwrap();
        world.add_component(e, collision).unwrap();
        e
    }

    #[test]
    fn test_wall_on_the_right_snaps_flush() {
        let (mut world, system, level) = setup();
        // Right edge at 79, wall starts at 80
        let e = body(&mut world, Vec2::new(71.0, 40.0), Vec2::new(120.0, 0.0));

        assert_eq!(system.resolve_x(&mut world, &level).unwrap(), None);
        let collision = world.get_component::<Collision>(e).unwrap();
        assert_eq!(collision.rect.right(), 80);
        assert!(collision.colliding_right);
        assert!(!collision.colliding_left);
        assert_eq!(world.get_component::<Physics>(e).unwrap().velocity.x, 0.0);
        assert_eq!(world.get_component::<Transform>(e).unwrap().position.x, 72.0);
    }

    #[test]
    fn test_wall_on_the_left_snaps_flush() {
        let (mut world, system, level) = setup();
        let e = body(&mut world, Vec2::new(96.5, 40.0), Vec2::new(-60.0, 0.0));

        system.resolve_x(&mut world, &level).unwrap();
        let collision = world.get_component::<Collision>(e).unwrap();
        assert_eq!(collision.rect.x, 96);
        assert!(collision.colliding_left);
    }

    #[test]
    fn test_open_space_clears_flags() {
        let (mut world, system, level) = setup();
        let e = body(&mut world, Vec2::new(16.0, 16.0), Vec2::new(30.0, 0.0));
        world.get_component_mut::<Collision>(e).unwrap().colliding_right = true;
        world.get_component_mut::<Collision>(e).unwrap().colliding_left = true;

        system.resolve_x(&mut world, &level).unwrap();
        let collision = world.get_component::<Collision>(e).unwrap();
        assert!(!collision.colliding_right);
        assert!(!collision.colliding_left);
        assert_eq!(world.get_component::<Physics>(e).unwrap().velocity.x, 30.0);
    }

    #[test]
    fn test_projectile_is_destroyed_without_moving() {
        let (mut world, system, level) = setup();
        let e = body(&mut world, Vec2::new(71.0, 40.0), Vec2::new(280.0, 0.0));
        world.add_component(e, Projectile::default()).unwrap();

        assert_eq!(system.resolve_x(&mut world, &level).unwrap(), Some(e));
        assert!(!world.is_alive(e));
    }

    #[test]
    fn test_landing_on_solid() {
        let (mut world, system, level) = setup();
        // Feet at row 5 (y = 80), slow fall
        let e = body(&mut world, Vec2::new(8.0, 72.5), Vec2::new(0.0, 10.0));

        system.resolve_y(&mut world, &level, 1.0 / 60.0).unwrap();
        let physics = world.get_component::<Physics>(e).unwrap();
        assert!(physics.touching_ground);
        assert_eq!(physics.velocity.y, 0.0);
        let collision = world.get_component::<Collision>(e).unwrap();
        assert!(collision.colliding_down);
        assert_eq!(collision.rect.bottom(), 80);
    }

    #[test]
    fn test_falling_with_nothing_below() {
        let (mut world, system, level) = setup();
        let e = body(&mut world, Vec2::new(8.0, 8.0), Vec2::new(0.0, 10.0));
        world.get_component_mut::<Physics>(e).unwrap().touching_ground = true;

        system.resolve_y(&mut world, &level, 1.0 / 60.0).unwrap();
        assert!(!world.get_component::<Physics>(e).unwrap().touching_ground);
        assert!(!world.get_component::<Collision>(e).unwrap().colliding_down);
    }

    #[test]
    fn test_ceiling_bump() {
        let (mut world, system, level) = setup();
        // Head inside the wall tile at row 3
        let e = body(&mut world, Vec2::new(82.0, 62.0), Vec2::new(0.0, -200.0));

        system.resolve_y(&mut world, &level, 1.0 / 60.0).unwrap();
        let collision = world.get_component::<Collision>(e).unwrap();
        assert!(collision.colliding_up);
        assert_eq!(collision.rect.y, 64);
        assert_eq!(world.get_component::<Physics>(e).unwrap().velocity.y, 0.0);
    }

    #[test]
    fn test_hazard_kills_without_boots() {
        let (mut world, system, level) = setup();
        let e = body(&mut world, Vec2::new(36.0, 56.5), Vec2::new(40.0, 5.0));
        world.add_component(e, Health { hitpoints: 3 }).unwrap();

        system.resolve_y(&mut world, &level, 1.0 / 60.0).unwrap();
        assert_eq!(world.get_component::<Health>(e).unwrap().hitpoints, 0);
        assert_eq!(world.get_component::<Physics>(e).unwrap().velocity, Vec2::ZERO);
        // Still alive; the death pass removes it
        assert!(world.is_alive(e));
    }

    #[test]
    fn test_boots_stand_on_hazard_when_slow() {
        let (mut world, system, level) = setup();
        let e = body(&mut world, Vec2::new(36.0, 56.5), Vec2::new(0.0, 10.0));
        world.add_component(e, Health { hitpoints: 1 }).unwrap();
        world.add_component(e, Boots).unwrap();

        system.resolve_y(&mut world, &level, 1.0 / 60.0).unwrap();
        assert_eq!(world.get_component::<Health>(e).unwrap().hitpoints, 1);
        let physics = world.get_component::<Physics>(e).unwrap();
        assert!(physics.touching_ground);
        assert_eq!(physics.velocity.y, 0.0);
        assert_eq!(world.get_component::<Collision>(e).unwrap().rect.bottom(), 64);
    }

    #[test]
    fn test_boots_do_not_save_a_fast_landing() {
        let (mut world, system, level) = setup();
        let e = body(&mut world, Vec2::new(36.0, 57.0), Vec2::new(0.0, 120.0));
        world.add_component(e, Health { hitpoints: 1 }).unwrap();
        world.add_component(e, Boots).unwrap();

        system.resolve_y(&mut world, &level, 1.0 / 60.0).unwrap();
        assert_eq!(world.get_component::<Health>(e).unwrap().hitpoints, 0);
    }

    #[test]
    fn test_zero_velocity_is_idempotent() {
        let (mut world, system, level) = setup();
        let e = body(&mut world, Vec2::new(20.0, 20.0), Vec2::ZERO);

        system.resolve_x(&mut world, &level).unwrap();
        system.resolve_y(&mut world, &level, 1.0 / 60.0).unwrap();
        let first = (
            *world.get_component::<Transform>(e).unwrap(),
            *world.get_component::<Collision>(e).unwrap(),
        );
        system.resolve_x(&mut world, &level).unwrap();
        system.resolve_y(&mut world, &level, 1.0 / 60.0).unwrap();
        let second = (
            *world.get_component::<Transform>(e).unwrap(),
            *world.get_component::<Collision>(e).unwrap(),
        );
        assert_eq!(first, second);
        assert_eq!(second.1.rect, Rect::new(20, 20, 8, 8));
    }

    #[test]
    fn test_edges() {
        let (mut world, system, level) = setup();
        // Standing on the floor (row 5) at x 100..108, wall column is 5
        let e = body(&mut world, Vec2::new(100.0, 72.0), Vec2::ZERO);
        world.add_component(e, EdgeCheck::default()).unwrap();

        system.check_edges(&mut world, &level).unwrap();
        assert_eq!(world.get_component::<EdgeCheck>(e), Ok(&EdgeCheck::default()));

        // Above the hazard strip the tiles below are not solid
        let over = body(&mut world, Vec2::new(40.0, 56.0), Vec2::ZERO);
        world.add_component(over, EdgeCheck::default()).unwrap();
        system.check_edges(&mut world, &level).unwrap();
        let edge = world.get_component::<EdgeCheck>(over).unwrap();
        assert!(edge.on_left_edge && edge.on_right_edge);

        // Long airborne: suppressed
        world.get_component_mut::<Physics>(over).unwrap().off_ground_count = 5;
        system.check_edges(&mut world, &level).unwrap();
        assert_eq!(world.get_component::<EdgeCheck>(over), Ok(&EdgeCheck::default()));
    }
}
