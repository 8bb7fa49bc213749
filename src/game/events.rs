//! Match event notifications
//!
//! Serializable payloads broadcast to whatever display surface is listening
//! (chat, boss bars, spectator feeds). Delivery is fire-and-forget; the
//! engines never depend on a receiver being present.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::GameState;

/// Events emitted by the match engines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MatchEvent {
    /// A participant joined while the match was waiting
    ParticipantJoined { id: Uuid, display_name: String },

    /// A participant left before or during the match
    ParticipantLeft { id: Uuid },

    /// Lifecycle state changed
    StateChanged { from: GameState, to: GameState },

    /// The zone advanced to a new shrink phase
    ZonePhaseAdvanced {
        phase: u32,
        target_radius: f32,
        shrink_secs: f32,
    },

    /// Out-of-zone damage applied to a participant
    ZoneDamage { id: Uuid, amount: f32 },

    /// A participant was eliminated
    Eliminated {
        victim: Uuid,
        /// None for environmental (zone) deaths
        killer: Option<Uuid>,
        assists: Vec<Uuid>,
        placement: u32,
    },

    /// The zone collapsed with more than one participant alive
    DeathmatchStarted { alive: u32 },

    /// Match over
    MatchEnded {
        winner: Option<Uuid>,
        duration_secs: u32,
    },
}
