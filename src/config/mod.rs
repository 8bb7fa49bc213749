//! Configuration module - environment variable parsing
//!
//! All settings are read once at match creation and immutable thereafter.
//! The zone phase table is plain configuration data and can be replaced per
//! arena via a JSON file (`ZONE_PHASES_FILE`).

use std::env;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Match settings loaded from environment variables (with defaults)
#[derive(Clone, Debug)]
pub struct MatchSettings {
    /// Minimum participants required to start the countdown
    pub min_participants: usize,
    /// Maximum participants per match
    pub max_participants: usize,
    /// Health each participant starts with
    pub starting_health: f32,
    /// Hard cap on the active phase (seconds)
    pub game_duration_secs: u32,
    /// Arena radius; also the initial zone radius
    pub arena_radius: f32,
    /// Arena identifier (zone reference frame)
    pub arena_name: String,
    /// Extra delay before the first zone shrink (seconds)
    pub zone_grace_secs: f32,
    /// Whether the match enters deathmatch once the zone has collapsed
    pub deathmatch_enabled: bool,
    /// Hard cap on the deathmatch phase (seconds)
    pub deathmatch_time_limit_secs: u32,
    /// Rolling window for killer/assist/in-combat attribution (seconds)
    pub combat_window_secs: f32,
    /// Reserved for team-aware attribution
    pub teams_enabled: bool,
    /// Reserved for team-aware attribution
    pub team_size: usize,
    /// Ordered zone shrink schedule
    pub zone_phases: Vec<ZonePhaseSettings>,
}

/// One entry of the zone shrink schedule. Raw values; clamping to valid
/// ranges happens when the engine builds its phase table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZonePhaseSettings {
    /// Delay before advancing past this phase (seconds)
    pub wait_secs: f32,
    /// Time to shrink to `target_radius` (seconds)
    pub shrink_secs: f32,
    /// Radius the zone shrinks to in this phase
    pub target_radius: f32,
    /// Damage applied per scan to participants outside the zone
    pub damage_per_tick: f32,
    /// Interval between out-of-zone damage scans (seconds)
    pub tick_interval_secs: f32,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            min_participants: 2,
            max_participants: 60,
            starting_health: 100.0,
            game_duration_secs: 1800,
            arena_radius: 750.0,
            arena_name: "arena".to_string(),
            zone_grace_secs: 30.0,
            deathmatch_enabled: true,
            deathmatch_time_limit_secs: 300,
            combat_window_secs: 10.0,
            teams_enabled: false,
            team_size: 1,
            zone_phases: default_zone_phases(),
        }
    }
}

/// Standard 7-phase schedule: 750 down to a 20-radius collapse, with damage
/// ramping from 1.0 to 10.0 per scan. Phase 0's target equals the default
/// arena radius, so the first real shrink is phase 0 -> phase 1.
pub fn default_zone_phases() -> Vec<ZonePhaseSettings> {
    vec![
        ZonePhaseSettings {
            wait_secs: 60.0,
            shrink_secs: 90.0,
            target_radius: 750.0,
            damage_per_tick: 1.0,
            tick_interval_secs: 1.0,
        },
        ZonePhaseSettings {
            wait_secs: 90.0,
            shrink_secs: 60.0,
            target_radius: 500.0,
            damage_per_tick: 2.0,
            tick_interval_secs: 1.0,
        },
        ZonePhaseSettings {
            wait_secs: 75.0,
            shrink_secs: 45.0,
            target_radius: 300.0,
            damage_per_tick: 3.0,
            tick_interval_secs: 1.0,
        },
        ZonePhaseSettings {
            wait_secs: 60.0,
            shrink_secs: 30.0,
            target_radius: 150.0,
            damage_per_tick: 4.0,
            tick_interval_secs: 1.0,
        },
        ZonePhaseSettings {
            wait_secs: 45.0,
            shrink_secs: 20.0,
            target_radius: 75.0,
            damage_per_tick: 6.0,
            tick_interval_secs: 1.0,
        },
        ZonePhaseSettings {
            wait_secs: 30.0,
            shrink_secs: 15.0,
            target_radius: 40.0,
            damage_per_tick: 8.0,
            tick_interval_secs: 1.0,
        },
        ZonePhaseSettings {
            wait_secs: 20.0,
            shrink_secs: 10.0,
            target_radius: 20.0,
            damage_per_tick: 10.0,
            tick_interval_secs: 1.0,
        },
    ]
}

impl MatchSettings {
    /// Load settings from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let zone_phases = match env::var("ZONE_PHASES_FILE") {
            Ok(path) => load_zone_phases(Path::new(&path))?,
            Err(_) => defaults.zone_phases,
        };

        Ok(Self {
            min_participants: env_or("MIN_PARTICIPANTS", defaults.min_participants)?,
            max_participants: env_or("MAX_PARTICIPANTS", defaults.max_participants)?,
            starting_health: env_or("STARTING_HEALTH", defaults.starting_health)?,
            game_duration_secs: env_or("GAME_DURATION_SECS", defaults.game_duration_secs)?,
            arena_radius: env_or("ARENA_RADIUS", defaults.arena_radius)?,
            arena_name: env::var("ARENA_NAME").unwrap_or(defaults.arena_name),
            zone_grace_secs: env_or("ZONE_GRACE_SECS", defaults.zone_grace_secs)?,
            deathmatch_enabled: env_or("DEATHMATCH_ENABLED", defaults.deathmatch_enabled)?,
            deathmatch_time_limit_secs: env_or(
                "DEATHMATCH_TIME_LIMIT_SECS",
                defaults.deathmatch_time_limit_secs,
            )?,
            combat_window_secs: env_or("COMBAT_WINDOW_SECS", defaults.combat_window_secs)?,
            teams_enabled: env_or("TEAMS_ENABLED", defaults.teams_enabled)?,
            team_size: env_or("TEAM_SIZE", defaults.team_size)?,
            zone_phases,
        })
    }
}

/// Load a per-arena zone phase table from a JSON file
pub fn load_zone_phases(path: &Path) -> Result<Vec<ZonePhaseSettings>, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::PhaseFile(path.display().to_string(), e))?;
    parse_zone_phases(&raw)
}

/// Parse a zone phase table from JSON
pub fn parse_zone_phases(raw: &str) -> Result<Vec<ZonePhaseSettings>, ConfigError> {
    let phases: Vec<ZonePhaseSettings> = serde_json::from_str(raw)?;
    if phases.is_empty() {
        return Err(ConfigError::EmptyPhaseTable);
    }
    Ok(phases)
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Failed to read zone phase file {0}: {1}")]
    PhaseFile(String, #[source] std::io::Error),

    #[error("Malformed zone phase table: {0}")]
    PhaseFormat(#[from] serde_json::Error),

    #[error("Zone phase table must contain at least one phase")]
    EmptyPhaseTable,
}
