//! Match engine modules

pub mod combat;
pub mod director;
pub mod events;
pub mod state;
pub mod zone;

pub use combat::CombatAttributionEngine;
pub use director::{MatchDirector, Participant};
pub use events::MatchEvent;
pub use state::{GameState, GameStateMachine, InvalidStateError};
pub use zone::{Zone, ZoneEngine, ZonePhase, ZonePhaseTable};

use uuid::Uuid;

/// Boundary to whatever owns participant positions (the host world). The
/// engine reads positions for zone-membership checks; it does not own or
/// simulate movement.
pub trait PositionSource: Send + Sync {
    /// Current positions of participants still in play
    fn live_positions(&self) -> Vec<(Uuid, (f32, f32))>;
}

/// Errors surfaced by the match director for invalid caller contracts.
/// Missing data (unknown ids, expired records) is never an error.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("match is not accepting participants while {0}")]
    JoinClosed(GameState),

    #[error("match is full ({0} participants)")]
    MatchFull(usize),

    #[error("participant {0} already joined")]
    AlreadyJoined(Uuid),

    #[error("need {need} participants to start, have {have}")]
    NotEnoughParticipants { have: usize, need: usize },

    #[error("cannot start match while {0}")]
    NotStartable(GameState),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
}

/// Fixed position provider for tests
#[cfg(test)]
pub(crate) struct StaticPositions {
    positions: parking_lot::RwLock<Vec<(Uuid, (f32, f32))>>,
}

#[cfg(test)]
impl StaticPositions {
    pub fn new(positions: Vec<(Uuid, (f32, f32))>) -> Self {
        Self {
            positions: parking_lot::RwLock::new(positions),
        }
    }

    pub fn place(&self, id: Uuid, at: (f32, f32)) {
        let mut positions = self.positions.write();
        if let Some(entry) = positions.iter_mut().find(|(pid, _)| *pid == id) {
            entry.1 = at;
        } else {
            positions.push((id, at));
        }
    }
}

#[cfg(test)]
impl PositionSource for StaticPositions {
    fn live_positions(&self) -> Vec<(Uuid, (f32, f32))> {
        self.positions.read().clone()
    }
}
