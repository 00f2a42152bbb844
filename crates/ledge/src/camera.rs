//! # Camera Follower
//!
//! Chases a goal anchored on the watched entity, each axis on its own:
//!
//! - the speed scales with the distance left, relative to the trailing
//!   window, and tops out at the configured maximum
//! - just past the window's edge the camera moves at exactly the maximum
//! - the result is clamped to the level; a clamped axis reports no motion

use ledge_core::{EcsResult, Entity, SystemId, World};

use crate::components::{Collision, Transform};
use crate::config::CameraConfig;
use crate::math::Vec2;

/// Follows one entity across the level.
#[derive(Debug)]
pub struct CameraSystem {
    id: SystemId,
    config: CameraConfig,
    /// Largest valid position per axis.
    bounds: Vec2,
    position: Vec2,
    delta: Vec2,
    /// Goal of the last step or snap.
    goal: Vec2,
}

impl CameraSystem {
    /// Registers the camera for a level of `level_size` pixels.
    ///
    /// # Errors
    ///
    /// Registry errors from component or system registration.
    pub fn new(world: &mut World, config: CameraConfig, level_size: (i32, i32)) -> EcsResult<Self> {
        let transform = world.register_component::<Transform>()?;
        let collision = world.register_component::<Collision>()?;
        let bounds = Vec2::new(
            (level_size.0 - config.viewport_width).max(0) as f32,
            (level_size.1 - config.viewport_height).max(0) as f32,
        );
        Ok(Self {
            id: world.register_system("camera", &[transform, collision])?,
            config,
            bounds,
            position: Vec2::ZERO,
            delta: Vec2::ZERO,
            goal: Vec2::ZERO,
        })
    }

    /// Registry handle.
    #[must_use]
    pub const fn id(&self) -> SystemId {
        self.id
    }

    /// Starts following `entity`.
    ///
    /// # Errors
    ///
    /// Registry errors (e.g. `entity` is dead).
    pub fn follow(&self, world: &mut World, entity: Entity) -> EcsResult<()> {
        world.add_watcher(self.id, entity)
    }

    /// Top-left corner of the view in level pixels.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Translation to apply when drawing the level.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        -self.position
    }

    /// Movement of the last update.
    #[must_use]
    pub const fn delta(&self) -> Vec2 {
        self.delta
    }

    /// The last goal lies on or past the left or right level edge, so the
    /// view cannot center the target horizontally.
    #[must_use]
    pub fn at_x_edge(&self) -> bool {
        self.goal.x <= 0.0 || self.goal.x >= self.bounds.x
    }

    /// The last goal lies on or past the top or bottom level edge.
    #[must_use]
    pub fn at_y_edge(&self) -> bool {
        self.goal.y <= 0.0 || self.goal.y >= self.bounds.y
    }

    /// View position that centers the watched entity, if any.
    ///
    /// # Errors
    ///
    /// Registry errors.
    pub fn goal(&self, world: &World) -> EcsResult<Option<Vec2>> {
        let Some(target) = self.watched_target(world)? else {
            return Ok(None);
        };
        let transform = world.get_component::<Transform>(target)?;
        let center = match world.get_component::<Collision>(target) {
            Ok(collision) => collision.rect_at(transform).center(),
            Err(_) => transform.position,
        };
        let half_view = Vec2::new(
            self.config.viewport_width as f32 / 2.0,
            self.config.viewport_height as f32 / 2.0,
        );
        Ok(Some(center - half_view))
    }

    fn watched_target(&self, world: &World) -> EcsResult<Option<Entity>> {
        Ok(world
            .watched(self.id)?
            .filter(|&entity| world.is_alive(entity)))
    }

    /// Moves toward the watched entity. Without one the camera stays put.
    ///
    /// # Errors
    ///
    /// Registry errors.
    pub fn update(&mut self, world: &World, timestep: f32) -> EcsResult<()> {
        match self.goal(world)? {
            Some(goal) => self.step_toward(goal, timestep),
            None => self.delta = Vec2::ZERO,
        }
        Ok(())
    }

    /// Moves the camera one tick toward `goal`.
    pub fn step_toward(&mut self, goal: Vec2, timestep: f32) {
        let (x, dx) = self.step_axis(self.position.x, goal.x, self.bounds.x, timestep);
        let (y, dy) = self.step_axis(self.position.y, goal.y, self.bounds.y, timestep);
        self.position = Vec2::new(x, y);
        self.delta = Vec2::new(dx, dy);
        self.goal = goal;
    }

    /// Jumps straight to `goal` (clamped), e.g. after a respawn.
    pub fn snap(&mut self, goal: Vec2) {
        self.position = Vec2::new(goal.x.clamp(0.0, self.bounds.x), goal.y.clamp(0.0, self.bounds.y));
        self.delta = Vec2::ZERO;
        self.goal = goal;
    }

    fn step_axis(&self, current: f32, goal: f32, upper: f32, timestep: f32) -> (f32, f32) {
        let diff = goal - current;
        let distance = diff.abs();
        let trail = self.config.max_trail_distance;

        let scale = if distance > trail && distance <= trail + self.config.overshoot_margin {
            1.0
        } else {
            (distance / trail).min(1.0)
        };
        let step = scale * self.config.max_speed * timestep;
        let next = current + step.min(distance) * diff.signum();

        if next < 0.0 {
            (0.0, 0.0)
        } else if next > upper {
            (upper, 0.0)
        } else {
            (next, next - current)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: f32 = 1.0 / 60.0;

    fn camera(level: (i32, i32)) -> CameraSystem {
        let mut world = World::new(4);
        CameraSystem::new(&mut world, CameraConfig::default(), level).unwrap()
    }

    #[test]
    fn test_converges_to_goal() {
        let mut camera = camera((1000, 600));
        let goal = Vec2::new(400.0, 250.0);
        for _ in 0..2000 {
            camera.step_toward(goal, TS);
        }
        assert!((camera.position().x - goal.x).abs() < 1e-3);
        assert!((camera.position().y - goal.y).abs() < 1e-3);
        assert_eq!(camera.offset(), -camera.position());
    }

    #[test]
    fn test_far_goal_moves_at_max_speed() {
        let mut camera = camera((2000, 600));
        camera.step_toward(Vec2::new(500.0, 0.0), TS);
        // 300 px/s at 60 Hz, however far the goal
        assert!((camera.position().x - 5.0).abs() < 1e-4);

        let mut previous = camera.position().x;
        for _ in 0..60 {
            camera.step_toward(Vec2::new(500.0, 0.0), TS);
            let moved = camera.position().x - previous;
            assert!(moved > 0.0 && moved <= 5.0 + 1e-4);
            previous = camera.position().x;
        }
    }

    #[test]
    fn test_just_past_window_keeps_full_speed() {
        let mut camera = camera((2000, 600));
        camera.step_toward(Vec2::new(65.0, 0.0), TS);
        assert!((camera.delta().x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_eases_inside_window() {
        let mut camera = camera((2000, 600));
        camera.step_toward(Vec2::new(32.0, 0.0), TS);
        // Half the window away: half speed
        assert!((camera.position().x - 2.5).abs() < 1e-4);
        assert!((camera.delta().x - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_clamped_to_level() {
        let mut camera = camera((400, 200));
        for _ in 0..600 {
            camera.step_toward(Vec2::new(10_000.0, -500.0), TS);
            let p = camera.position();
            assert!((0.0..=80.0).contains(&p.x));
            assert!((0.0..=20.0).contains(&p.y));
        }
        assert_eq!(camera.position(), Vec2::new(80.0, 0.0));
        assert!(camera.at_x_edge() && camera.at_y_edge());
        assert_eq!(camera.delta(), Vec2::ZERO);
    }

    #[test]
    fn test_edges_follow_the_goal() {
        let mut camera = camera((400, 200));
        camera.step_toward(Vec2::new(40.0, 10.0), TS);
        assert!(!camera.at_x_edge() && !camera.at_y_edge());

        // Still moving toward it, but the goal itself is past the edge
        camera.step_toward(Vec2::new(90.0, 10.0), TS);
        assert!(camera.position().x < 80.0);
        assert!(camera.at_x_edge() && !camera.at_y_edge());

        camera.snap(Vec2::new(40.0, 0.0));
        assert!(!camera.at_x_edge() && camera.at_y_edge());
    }

    #[test]
    fn test_level_smaller_than_view() {
        let mut camera = camera((100, 100));
        camera.step_toward(Vec2::new(50.0, 50.0), TS);
        assert_eq!(camera.position(), Vec2::ZERO);
    }

    #[test]
    fn test_follows_watched_entity() {
        let mut world = World::new(8);
        let mut camera = CameraSystem::new(&mut world, CameraConfig::default(), (2000, 1000)).unwrap();
        let e = world.create_entity().unwrap();
        let transform = Transform::at(Vec2::new(600.0, 400.0));
        let mut collision = Collision::new(Vec2::ZERO, 10, 10);
        collision.sync(&transform);
        world.add_component(e, transform).unwrap();
        world.add_component(e, collision).unwrap();

        camera.update(&world, TS).unwrap();
        assert_eq!(camera.position(), Vec2::ZERO);

        camera.follow(&mut world, e).unwrap();
        assert_eq!(camera.goal(&world).unwrap(), Some(Vec2::new(445.0, 315.0)));
        camera.update(&world, TS).unwrap();
        assert!(camera.position().x > 0.0 && camera.position().y > 0.0);
    }
}
