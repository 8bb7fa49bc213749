//! Match lifecycle state machine
//!
//! The machine itself is a passive state holder plus classification
//! predicates; validity of transitions is the director's responsibility, and
//! the admin surface may set any state directly.

use std::fmt;
use std::str::FromStr;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Match lifecycle states, totally ordered by declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    /// Waiting for participants to join
    Waiting,
    /// Countdown before the match goes live
    Starting,
    /// Match in progress, zone shrinking
    Active,
    /// Zone fully collapsed, final showdown
    Deathmatch,
    /// Match over, standings final
    Ending,
}

impl GameState {
    /// Participants may only join while waiting
    pub fn can_join(self) -> bool {
        matches!(self, GameState::Waiting)
    }

    /// The simulation is running (zone ticks, damage applies)
    pub fn is_in_progress(self) -> bool {
        matches!(self, GameState::Active | GameState::Deathmatch)
    }

    /// The match has gone live at some point (includes the aftermath)
    pub fn has_started(self) -> bool {
        matches!(
            self,
            GameState::Active | GameState::Deathmatch | GameState::Ending
        )
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameState::Waiting => "waiting",
            GameState::Starting => "starting",
            GameState::Active => "active",
            GameState::Deathmatch => "deathmatch",
            GameState::Ending => "ending",
        };
        f.write_str(name)
    }
}

/// Error for state names the admin surface cannot resolve
#[derive(Debug, thiserror::Error)]
#[error("unknown game state: {0}")]
pub struct InvalidStateError(pub String);

impl FromStr for GameState {
    type Err = InvalidStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "waiting" => Ok(GameState::Waiting),
            "starting" => Ok(GameState::Starting),
            "active" => Ok(GameState::Active),
            "deathmatch" => Ok(GameState::Deathmatch),
            "ending" => Ok(GameState::Ending),
            other => Err(InvalidStateError(other.to_string())),
        }
    }
}

/// Holds the current match state
pub struct GameStateMachine {
    state: RwLock<GameState>,
}

impl GameStateMachine {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(GameState::Waiting),
        }
    }

    pub fn get(&self) -> GameState {
        *self.state.read()
    }

    /// Unconditional swap; returns the previous state
    pub fn set(&self, new_state: GameState) -> GameState {
        std::mem::replace(&mut *self.state.write(), new_state)
    }
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [GameState; 5] = [
        GameState::Waiting,
        GameState::Starting,
        GameState::Active,
        GameState::Deathmatch,
        GameState::Ending,
    ];

    #[test]
    fn predicates_match_lifecycle() {
        assert!(GameState::Waiting.can_join());
        for state in ALL_STATES.iter().filter(|s| **s != GameState::Waiting) {
            assert!(!state.can_join(), "{state} should not be joinable");
        }

        assert!(GameState::Active.is_in_progress());
        assert!(GameState::Deathmatch.is_in_progress());
        assert!(!GameState::Waiting.is_in_progress());
        assert!(!GameState::Starting.is_in_progress());
        assert!(!GameState::Ending.is_in_progress());

        assert!(GameState::Active.has_started());
        assert!(GameState::Deathmatch.has_started());
        assert!(GameState::Ending.has_started());
        assert!(!GameState::Waiting.has_started());
        assert!(!GameState::Starting.has_started());
    }

    #[test]
    fn predicates_are_mutually_consistent() {
        for state in ALL_STATES {
            if state.is_in_progress() {
                assert!(state.has_started(), "{state} in progress but not started");
                assert!(!state.can_join(), "{state} in progress but joinable");
            }
            if state.can_join() {
                assert!(!state.has_started(), "{state} joinable but started");
            }
        }
    }

    #[test]
    fn states_are_totally_ordered() {
        assert!(GameState::Waiting < GameState::Starting);
        assert!(GameState::Starting < GameState::Active);
        assert!(GameState::Active < GameState::Deathmatch);
        assert!(GameState::Deathmatch < GameState::Ending);
    }

    #[test]
    fn machine_swaps_and_reports_previous() {
        let machine = GameStateMachine::new();
        assert_eq!(machine.get(), GameState::Waiting);

        let prev = machine.set(GameState::Starting);
        assert_eq!(prev, GameState::Waiting);
        assert_eq!(machine.get(), GameState::Starting);

        // Admin override may jump anywhere, including backwards
        let prev = machine.set(GameState::Waiting);
        assert_eq!(prev, GameState::Starting);
        assert_eq!(machine.get(), GameState::Waiting);
    }

    #[test]
    fn state_names_round_trip() {
        for state in ALL_STATES {
            let parsed: GameState = state.to_string().parse().unwrap();
            assert_eq!(parsed, state);
        }
        assert!("limbo".parse::<GameState>().is_err());
        assert_eq!("DEATHMATCH".parse::<GameState>().unwrap(), GameState::Deathmatch);
    }
}
