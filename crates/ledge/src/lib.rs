//! # LEDGE
//!
//! Runtime core of a tile platformer, built on the `ledge_core` registry.
//!
//! ## Tick
//!
//! ```text
//! Input ─> Physics X ─> Collide X ─> Physics Y ─> Collide Y ─> Contacts ─> Camera
//! ```
//!
//! Each axis is integrated and resolved on its own. Cross-entity contacts
//! (pickups, checkpoints, goal, enemies, projectiles) run once the tile
//! passes are done. Sound cues and gameplay notifications leave the tick
//! through [`events`]; rendering and audio playback belong to the host.
//!
//! ## Example
//!
//! ```rust
//! use ledge::{GameConfig, InputState, Level, LevelLayout, Session, Vec2};
//!
//! let level = Level::from_ascii("..........\n..........\n##########", 16).unwrap();
//! let layout = LevelLayout {
//!     player_spawn: Vec2::new(16.0, 0.0),
//!     ..LevelLayout::default()
//! };
//! let mut session = Session::new(GameConfig::default(), level, layout).unwrap();
//!
//! let input = InputState::new();
//! for _ in 0..60 {
//!     session.tick(&input).unwrap();
//! }
//! assert!(session.world().is_alive(session.player()));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod behavior;
pub mod camera;
pub mod collision;
pub mod components;
pub mod config;
pub mod contact;
pub mod death;
pub mod error;
pub mod events;
pub mod input;
pub mod level;
pub mod math;
pub mod physics;
pub mod prefab;
pub mod session;

pub use behavior::{Behavior, ScriptSystem};
pub use camera::CameraSystem;
pub use collision::CollisionSystem;
pub use config::GameConfig;
pub use death::DeathSystem;
pub use error::{GameError, GameResult};
pub use events::{EventBus, EventReceiver, EventSender, GameEvent, Sound};
pub use input::{Action, ActionSet, InputState, InputSystem};
pub use level::{Level, Tile, TileType};
pub use math::{Rect, Vec2};
pub use physics::PhysicsSystem;
pub use session::{Countdown, FrameStats, LevelLayout, Session, TickReport};
