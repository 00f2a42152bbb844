//! # Game Configuration
//!
//! Every tuning constant of the tick lives here, grouped by the system that
//! reads it. Missing keys fall back to [`Default`], so a config file only
//! needs the values it changes:
//!
//! ```toml
//! [camera]
//! max_speed = 240.0
//!
//! [collision]
//! boots_landing_threshold = 0.5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GameError, GameResult};

/// Tick timing and world sizing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Fixed step per tick, in seconds.
    pub timestep: f32,
    /// Maximum number of live entities.
    pub max_entities: usize,
    /// Event channel capacity.
    pub event_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            max_entities: ledge_core::MAX_ENTITIES,
            event_capacity: 256,
        }
    }
}

/// Camera follower tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Top speed in pixels per second.
    pub max_speed: f32,
    /// Distance the camera may trail its goal before moving at full speed.
    pub max_trail_distance: f32,
    /// Band past the trail distance in which the camera moves at exactly
    /// `max_speed`.
    pub overshoot_margin: f32,
    /// Viewport width in pixels.
    pub viewport_width: i32,
    /// Viewport height in pixels.
    pub viewport_height: i32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            max_speed: 300.0,
            max_trail_distance: 64.0,
            overshoot_margin: 2.0,
            viewport_width: 320,
            viewport_height: 180,
        }
    }
}

/// Collision resolver tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollisionConfig {
    /// Boots only make a hazard safe when the entity moves down less than
    /// this many pixels in the tick.
    pub boots_landing_threshold: f32,
    /// Edge flags are cleared once an entity has been airborne for more
    /// ticks than this.
    pub edge_suppress_after: u32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            boots_landing_threshold: 1.0,
            edge_suppress_after: 4,
        }
    }
}

/// Player movement tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicsConfig {
    /// Ticks after leaving the ground during which a jump is still allowed.
    pub coyote_ticks: u32,
    /// Horizontal speed added away from the wall on a walljump.
    pub walljump_kick: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            coyote_ticks: 5,
            walljump_kick: 200.0,
        }
    }
}

/// Session rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Countdown length; the player respawns when it reaches zero.
    pub countdown_seconds: f32,
    /// Time the dead player stays down before respawning.
    pub respawn_delay_ms: f32,
    /// Respawn point height above the checkpoint's origin.
    pub checkpoint_lift: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_seconds: 9999.0,
            respawn_delay_ms: 1500.0,
            checkpoint_lift: 8.0,
        }
    }
}

/// Complete runtime configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Tick timing and world sizing.
    pub simulation: SimulationConfig,
    /// Camera follower.
    pub camera: CameraConfig,
    /// Collision resolver.
    pub collision: CollisionConfig,
    /// Player movement.
    pub physics: PhysicsConfig,
    /// Session rules.
    pub session: SessionConfig,
}

impl GameConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`GameError::Parse`] for malformed TOML or unknown keys, and
    /// [`GameError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> GameResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`GameError::Io`] if the file cannot be read, otherwise as
    /// [`GameConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Rejects values the tick cannot run with.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> GameResult<()> {
        let sim = &self.simulation;
        if !(sim.timestep.is_finite() && sim.timestep > 0.0) {
            return Err(invalid(format!(
                "simulation.timestep must be positive, got {}",
                sim.timestep
            )));
        }
        if sim.max_entities == 0 || sim.max_entities > usize::from(u16::MAX) + 1 {
            return Err(invalid(format!(
                "simulation.max_entities must be in 1..=65536, got {}",
                sim.max_entities
            )));
        }
        if sim.event_capacity == 0 {
            return Err(invalid("simulation.event_capacity must be positive".into()));
        }

        let camera = &self.camera;
        if camera.viewport_width <= 0 || camera.viewport_height <= 0 {
            return Err(invalid(format!(
                "camera viewport must be non-empty, got {}x{}",
                camera.viewport_width, camera.viewport_height
            )));
        }
        if camera.max_trail_distance.is_nan() || camera.max_trail_distance <= 0.0 {
            return Err(invalid(format!(
                "camera.max_trail_distance must be positive, got {}",
                camera.max_trail_distance
            )));
        }
        if camera.max_speed < 0.0 || camera.overshoot_margin < 0.0 {
            return Err(invalid(
                "camera.max_speed and camera.overshoot_margin must not be negative".into(),
            ));
        }

        if self.session.respawn_delay_ms < 0.0 || self.session.countdown_seconds <= 0.0 {
            return Err(invalid(
                "session.respawn_delay_ms must not be negative and session.countdown_seconds must be positive"
                    .into(),
            ));
        }
        Ok(())
    }
}

fn invalid(message: String) -> GameError {
    GameError::InvalidConfig(message)
}
