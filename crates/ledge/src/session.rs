//! # Session
//!
//! One playthrough of a level. The session owns the world, the systems and
//! the event bus, and runs the fixed tick order:
//!
//! ```text
//! ┌───────────┐   ┌───────┐   ┌─────────────┐   ┌─────────────┐   ┌────────┐
//! │ countdown │──>│ input │──>│ physics X/Y │──>│  contacts   │──>│ camera │
//! │  scripts  │   │       │   │ + collision │   │ death pass  │   │        │
//! └───────────┘   └───────┘   └─────────────┘   └─────────────┘   └────────┘
//! ```
//!
//! While the player is dead only the respawn delay runs; after the goal is
//! reached only the camera moves.

use ledge_core::{Entity, World};
use tracing::{debug, info};

use crate::behavior::{set_state, ScriptSystem};
use crate::camera::CameraSystem;
use crate::collision::CollisionSystem;
use crate::components::{Checkpoint, Collision, Enemy, Health, Physics, PickupKind, State, Transform};
use crate::config::GameConfig;
use crate::contact;
use crate::death::DeathSystem;
use crate::error::GameResult;
use crate::events::{EventBus, EventReceiver, EventSender, GameEvent, Sound};
use crate::input::{InputState, InputSystem};
use crate::level::Level;
use crate::math::Vec2;
use crate::physics::PhysicsSystem;
use crate::prefab;

/// Where everything starts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LevelLayout {
    /// Player spawn, also the first respawn point.
    pub player_spawn: Vec2,
    /// Collectibles.
    pub pickups: Vec<(Vec2, PickupKind)>,
    /// Respawn points.
    pub checkpoints: Vec<Vec2>,
    /// Level exits.
    pub goals: Vec<Vec2>,
    /// Enemies present from the start, respawned with the player.
    pub enemies: Vec<Vec2>,
    /// Enemies added to the roster once boots are collected.
    pub reinforcements: Vec<Vec2>,
}

/// Level timer. The player respawns when it runs out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Countdown {
    length: f32,
    remaining: f32,
}

impl Countdown {
    /// A full countdown of `seconds`.
    #[must_use]
    pub const fn new(seconds: f32) -> Self {
        Self {
            length: seconds,
            remaining: seconds,
        }
    }

    /// Counts down by `dt` seconds, stopping at zero.
    pub fn update(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    /// Ran out.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Back to full length.
    pub fn reset(&mut self) {
        self.remaining = self.length;
    }

    /// Whole seconds left, rounded up, as a HUD shows them.
    #[must_use]
    pub fn seconds_left(&self) -> u32 {
        self.remaining.ceil() as u32
    }
}

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Pickups collected, in collection order.
    pub collected: Vec<PickupKind>,
    /// Checkpoint newly touched this tick.
    pub checkpoint: Option<Entity>,
    /// The goal was reached this tick.
    pub goal_reached: bool,
    /// Entities removed this tick: spent projectiles and the dead.
    pub destroyed: Vec<Entity>,
    /// Projectiles fired.
    pub shots: usize,
    /// The player was put back at the respawn point.
    pub respawned: bool,
}

/// Totals across the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Ticks run.
    pub ticks: u64,
    /// Pickups collected.
    pub pickups_collected: u64,
    /// Projectiles fired.
    pub shots: u64,
    /// Entities destroyed.
    pub destroyed: u64,
    /// Player respawns.
    pub respawns: u64,
    /// Most live entities seen at the end of a tick.
    pub peak_entities: usize,
}

/// A running level.
pub struct Session {
    config: GameConfig,
    world: World,
    level: Level,
    scripts: ScriptSystem,
    input: InputSystem,
    physics: PhysicsSystem,
    collision: CollisionSystem,
    death: DeathSystem,
    camera: CameraSystem,
    bus: EventBus,
    events: EventSender,
    player: Entity,
    respawn_point: Vec2,
    countdown: Countdown,
    enemy_roster: Vec<Vec2>,
    reinforcements: Vec<Vec2>,
    on_checkpoint: bool,
    death_timer_ms: f32,
    complete: bool,
    stats: FrameStats,
}

impl Session {
    /// Builds the world for `level` and spawns everything in `layout`.
    ///
    /// # Errors
    ///
    /// [`crate::GameError::InvalidConfig`] for a bad config, or registry
    /// errors (e.g. the layout does not fit in `max_entities`).
    pub fn new(config: GameConfig, level: Level, layout: LevelLayout) -> GameResult<Self> {
        config.validate()?;
        let mut world = World::new(config.simulation.max_entities);

        let scripts = ScriptSystem::new(&mut world)?;
        let input = InputSystem::new(&mut world, &config.physics)?;
        let physics = PhysicsSystem::new(&mut world)?;
        let collision = CollisionSystem::new(&mut world, config.collision.clone())?;
        let death = DeathSystem::new(&mut world)?;
        let mut camera = CameraSystem::new(&mut world, config.camera.clone(), level.pixel_size())?;

        let player = prefab::player(&mut world, layout.player_spawn)?;
        for &(position, kind) in &layout.pickups {
            prefab::pickup(&mut world, position, kind)?;
        }
        for &position in &layout.checkpoints {
            prefab::checkpoint(&mut world, position)?;
        }
        for &position in &layout.goals {
            prefab::goal(&mut world, position)?;
        }
        camera.follow(&mut world, player)?;
        if let Some(goal) = camera.goal(&world)? {
            camera.snap(goal);
        }

        let bus = EventBus::new(config.simulation.event_capacity);
        let events = bus.sender();
        let countdown = Countdown::new(config.session.countdown_seconds);

        let mut session = Self {
            config,
            world,
            level,
            scripts,
            input,
            physics,
            collision,
            death,
            camera,
            bus,
            events,
            player,
            respawn_point: layout.player_spawn,
            countdown,
            enemy_roster: layout.enemies,
            reinforcements: layout.reinforcements,
            on_checkpoint: false,
            death_timer_ms: 0.0,
            complete: false,
            stats: FrameStats::default(),
        };
        session.respawn_enemies()?;
        info!(
            entities = session.world.alive_count(),
            level_width = session.level.width(),
            level_height = session.level.height(),
            "session started"
        );
        Ok(session)
    }

    /// Runs one tick with the host's input for it.
    ///
    /// # Errors
    ///
    /// Registry errors, which mean the world is out of sync.
    pub fn tick(&mut self, input: &InputState) -> GameResult<TickReport> {
        let ts = self.config.simulation.timestep;
        let mut report = TickReport::default();
        self.stats.ticks += 1;

        if self.complete {
            self.camera.update(&self.world, ts)?;
            return Ok(report);
        }

        if self.world.get_component::<Health>(self.player)?.hitpoints <= 0 {
            if self.death_timer_ms == 0.0 {
                self.events.play(Some(self.player), Sound::Dead, 1.0);
                info!("player died");
            }
            self.death_timer_ms += ts * 1000.0;
            if self.death_timer_ms > self.config.session.respawn_delay_ms {
                self.respawn()?;
                report.respawned = true;
            }
            return Ok(report);
        }

        self.countdown.update(ts);
        if self.countdown.is_zero() {
            debug!("countdown ran out");
            self.respawn()?;
            report.respawned = true;
        }

        self.scripts.update(&mut self.world, ts, &self.events)?;
        report.shots = self.input.update(&mut self.world, input, &self.events)?.len();

        self.physics.update_x(&mut self.world, ts)?;
        let spent_x = self.collision.resolve_x(&mut self.world, &self.level)?;
        self.physics.update_y(&mut self.world, ts)?;
        let spent_y = self.collision.resolve_y(&mut self.world, &self.level, ts)?;
        for entity in spent_x.into_iter().chain(spent_y) {
            self.events.send(GameEvent::EntityDestroyed { entity });
            report.destroyed.push(entity);
        }
        self.collision.check_edges(&mut self.world, &self.level)?;

        report
            .destroyed
            .extend(contact::projectiles_vs_health(&mut self.world, &self.events)?);
        report.collected = contact::collect_pickups(&mut self.world, self.player, ts, &self.events)?;
        if report.collected.contains(&PickupKind::Boots) && !self.reinforcements.is_empty() {
            self.enemy_roster.append(&mut self.reinforcements);
            self.respawn_enemies()?;
        }

        report.checkpoint = self.update_checkpoints(ts)?;

        if let Some(goal) = contact::reach_goal(&mut self.world, self.player, ts, &self.events)? {
            self.complete = true;
            report.goal_reached = true;
            self.events.send(GameEvent::GoalReached { goal });
            info!(%goal, ticks = self.stats.ticks, "goal reached");
        }

        contact::player_vs_enemies(&mut self.world, self.player)?;
        report
            .destroyed
            .extend(self.death.update(&mut self.world, &self.events)?);

        self.camera.update(&self.world, ts)?;

        self.stats.pickups_collected += report.collected.len() as u64;
        self.stats.shots += report.shots as u64;
        self.stats.destroyed += report.destroyed.len() as u64;
        self.stats.peak_entities = self.stats.peak_entities.max(self.world.alive_count());
        Ok(report)
    }

    /// Moves the respawn point to a touched checkpoint and makes it the only
    /// active one. Returns the checkpoint on the first tick of contact.
    fn update_checkpoints(&mut self, ts: f32) -> GameResult<Option<Entity>> {
        let Some(touched) = contact::touched_checkpoint(&self.world, self.player)? else {
            self.on_checkpoint = false;
            return Ok(None);
        };

        let position = self.world.get_component::<Transform>(touched)?.position;
        self.respawn_point = Vec2::new(position.x, position.y - self.config.session.checkpoint_lift);

        for checkpoint in self.world.all_of::<Checkpoint>() {
            if checkpoint == touched {
                self.world.get_component_mut::<Checkpoint>(checkpoint)?.active = true;
            } else {
                self.world.get_component_mut::<Checkpoint>(checkpoint)?.active = false;
                set_state(&mut self.world, checkpoint, State::Idle)?;
            }
        }

        if self.on_checkpoint {
            return Ok(None);
        }
        self.on_checkpoint = true;
        self.countdown.reset();
        let behavior = self.world.get_component::<Checkpoint>(touched)?.on_activated;
        behavior.run(&mut self.world, touched, ts, &self.events)?;
        self.events.send(GameEvent::CheckpointActivated {
            checkpoint: touched,
        });
        debug!(checkpoint = %touched, "checkpoint activated");
        Ok(Some(touched))
    }

    /// Puts the player back at the respawn point with one hitpoint and
    /// resets the enemies.
    fn respawn(&mut self) -> GameResult<()> {
        let transform = Transform::at(self.respawn_point);
        *self.world.get_component_mut::<Transform>(self.player)? = transform;
        self.world.get_component_mut::<Collision>(self.player)?.sync(&transform);
        let physics = self.world.get_component_mut::<Physics>(self.player)?;
        physics.velocity = Vec2::ZERO;

        self.world.get_component_mut::<Health>(self.player)?.hitpoints = 1;
        self.countdown.reset();
        self.death_timer_ms = 0.0;
        self.events.play(None, Sound::CheckpointRespawn, 0.8);
        self.respawn_enemies()?;
        self.events.send(GameEvent::PlayerRespawned);

        self.stats.respawns += 1;
        info!(x = self.respawn_point.x, y = self.respawn_point.y, "player respawned");
        Ok(())
    }

    fn respawn_enemies(&mut self) -> GameResult<()> {
        for enemy in self.world.all_of::<Enemy>() {
            self.world.destroy_entity(enemy)?;
        }
        for &position in &self.enemy_roster {
            prefab::enemy(&mut self.world, position)?;
        }
        debug!(enemies = self.enemy_roster.len(), "enemies respawned");
        Ok(())
    }

    /// The world, for rendering and inspection.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for hosts and tests that script scenarios.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The tile grid.
    #[must_use]
    pub const fn level(&self) -> &Level {
        &self.level
    }

    /// The player entity. It is never destroyed.
    #[must_use]
    pub const fn player(&self) -> Entity {
        self.player
    }

    /// The camera.
    #[must_use]
    pub const fn camera(&self) -> &CameraSystem {
        &self.camera
    }

    /// Where the player will respawn.
    #[must_use]
    pub const fn respawn_point(&self) -> Vec2 {
        self.respawn_point
    }

    /// The level timer.
    #[must_use]
    pub const fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// The goal has been reached.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Totals so far.
    #[must_use]
    pub const fn stats(&self) -> FrameStats {
        self.stats
    }

    /// A receiver for the session's events.
    #[must_use]
    pub fn events(&self) -> EventReceiver {
        self.bus.receiver()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("world", &self.world)
            .field("player", &self.player)
            .field("complete", &self.complete)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
