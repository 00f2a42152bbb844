//! # LEDGE Event System
//!
//! Everything the tick wants the outside world to know about leaves through
//! here: sound cues for the audio layer, and gameplay notifications for the
//! HUD and dialogue box.
//!
//! ```text
//! ┌─────────────┐      ┌─────────────┐      ┌─────────────┐
//! │    Tick     │─────>│   Event     │─────>│ Audio / HUD │
//! │  (systems)  │      │   Channel   │      │   (host)    │
//! └─────────────┘      └─────────────┘      └─────────────┘
//! ```
//!
//! Sending never blocks the tick: when the channel is full the event is
//! dropped and a warning is logged.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use ledge_core::Entity;
use tracing::warn;

use crate::components::PickupKind;

/// Sound cues, mirroring the host's sound bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sound {
    /// Ground jump.
    Jump,
    /// Jump off a wall.
    Walljump,
    /// Weapon fired.
    Shoot,
    /// A checkpoint became active.
    CheckpointActivated,
    /// The player was put back at a checkpoint.
    CheckpointRespawn,
    /// The goal was reached.
    Goal,
    /// The player died.
    Dead,
}

/// Events emitted by the tick.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// Play a sound.
    PlaySound {
        /// Entity the sound belongs to (`None` for global sounds).
        source: Option<Entity>,
        /// Which sound.
        sound: Sound,
        /// Volume in `0.0..=1.0`.
        volume: f32,
    },

    /// The player collected a pickup.
    PickupCollected {
        /// The pickup entity (already destroyed).
        pickup: Entity,
        /// What it granted.
        kind: PickupKind,
        /// Dialogue text to show, if any.
        message: Option<String>,
    },

    /// The player touched a checkpoint.
    CheckpointActivated {
        /// The checkpoint entity.
        checkpoint: Entity,
    },

    /// The player reached the goal.
    GoalReached {
        /// The goal entity.
        goal: Entity,
    },

    /// The player was reset to the active checkpoint.
    PlayerRespawned,

    /// An entity was removed by the death pass or a collision.
    EntityDestroyed {
        /// Entity that was destroyed.
        entity: Entity,
    },
}

/// Event bus for the tick.
///
/// Bounded so a host that stops draining cannot grow memory without limit.
pub struct EventBus {
    /// Sender end - held by the systems.
    sender: Sender<GameEvent>,
    /// Receiver end - held by the host.
    receiver: Receiver<GameEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum events in flight before new ones are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates a sender handle.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Creates a receiver handle.
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }
}

/// Handle for sending events. Behaviors receive this as their audio sink.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<GameEvent>,
}

impl EventSender {
    /// Sends an event without blocking.
    ///
    /// Returns `false` if the event was dropped.
    #[inline]
    pub fn send(&self, event: GameEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(?event, "event channel full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Queues a sound cue.
    #[inline]
    pub fn play(&self, source: Option<Entity>, sound: Sound, volume: f32) -> bool {
        self.send(GameEvent::PlaySound {
            source,
            sound,
            volume,
        })
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<GameEvent>,
}

impl EventReceiver {
    /// Receives all pending events (non-blocking).
    #[inline]
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event (non-blocking).
    #[inline]
    pub fn try_recv(&self) -> Option<GameEvent> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bus_basic() {
        let bus = EventBus::new(16);
        let sender = bus.sender();
        let receiver = bus.receiver();

        assert!(sender.play(None, Sound::Jump, 1.0));
        assert!(sender.send(GameEvent::PlayerRespawned));
        assert_eq!(receiver.pending_count(), 2);

        let events = receiver.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            GameEvent::PlaySound {
                sound: Sound::Jump,
                ..
            }
        ));
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn test_full_channel_drops() {
        let bus = EventBus::new(1);
        let sender = bus.sender();

        assert!(sender.send(GameEvent::PlayerRespawned));
        assert!(!sender.send(GameEvent::PlayerRespawned));
        assert_eq!(bus.receiver().drain().len(), 1);
    }
}
