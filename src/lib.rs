//! Battle royale match engine
//!
//! Logical match state only: a lifecycle state machine, a shrinking safe
//! zone with timed phases and out-of-zone damage, and a combat-attribution
//! engine that turns damage events into kill/assist credit. Positions and
//! rendering belong to the host; the engine consumes positions and produces
//! damage, elimination, and state decisions.

pub mod config;
pub mod game;
pub mod util;

pub use config::MatchSettings;
pub use game::{
    CombatAttributionEngine, GameState, MatchDirector, MatchError, MatchEvent, Participant,
    PositionSource, ZoneEngine, ZonePhase, ZonePhaseTable,
};
