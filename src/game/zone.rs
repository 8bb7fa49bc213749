//! Shrinking zone - phase table, linear shrink, out-of-zone damage
//!
//! The zone walks an immutable ordered phase table. Each phase shrinks the
//! circle to its target radius, then holds until its wait duration elapses
//! and the next phase begins. Participants outside the circle take periodic
//! attacker-less damage on the current phase's scan cadence.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ZonePhaseSettings;
use crate::util::scheduler::TickScheduler;
use crate::util::time::{Clock, ENGINE_TICK};

use super::events::MatchEvent;
use super::PositionSource;

/// Scheduler registration names owned by the zone engine
pub const ZONE_TICK_TASK: &str = "zone-tick";
pub const ZONE_DAMAGE_TASK: &str = "zone-damage";

/// Tolerance for "shrink complete" radius comparisons
pub const RADIUS_EPSILON: f32 = 0.01;

const MIN_SHRINK: Duration = Duration::from_secs(1);
const MIN_DAMAGE_INTERVAL: Duration = Duration::from_millis(50);

/// One immutable step of the shrink schedule. Values are normalized at
/// construction: waits and radii/damage clamped to non-negative, shrink
/// durations to at least one second, scan intervals to at least one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZonePhase {
    pub id: u32,
    pub wait: Duration,
    pub shrink: Duration,
    pub target_radius: f32,
    pub damage_per_tick: f32,
    pub tick_interval: Duration,
}

impl ZonePhase {
    pub fn new(
        id: u32,
        wait_secs: f32,
        shrink_secs: f32,
        target_radius: f32,
        damage_per_tick: f32,
        tick_interval_secs: f32,
    ) -> Self {
        Self {
            id,
            wait: Duration::from_secs_f32(wait_secs.max(0.0)),
            shrink: Duration::from_secs_f32(shrink_secs.max(0.0)).max(MIN_SHRINK),
            target_radius: target_radius.max(0.0),
            damage_per_tick: damage_per_tick.max(0.0),
            tick_interval: Duration::from_secs_f32(tick_interval_secs.max(0.0))
                .max(MIN_DAMAGE_INTERVAL),
        }
    }
}

/// Ordered, immutable list of zone phases
#[derive(Debug, Clone)]
pub struct ZonePhaseTable {
    phases: Vec<ZonePhase>,
}

impl ZonePhaseTable {
    /// Build from configuration entries. An empty table falls back to the
    /// standard schedule.
    pub fn from_settings(settings: &[ZonePhaseSettings]) -> Self {
        if settings.is_empty() {
            warn!("Empty zone phase table, using standard schedule");
            return Self::standard();
        }
        let phases = settings
            .iter()
            .enumerate()
            .map(|(i, s)| {
                ZonePhase::new(
                    i as u32,
                    s.wait_secs,
                    s.shrink_secs,
                    s.target_radius,
                    s.damage_per_tick,
                    s.tick_interval_secs,
                )
            })
            .collect();
        Self { phases }
    }

    /// Default 7-phase schedule
    pub fn standard() -> Self {
        Self::from_settings(&crate::config::default_zone_phases())
    }

    pub fn get(&self, index: usize) -> Option<&ZonePhase> {
        self.phases.get(index)
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.phases.len().saturating_sub(1)
    }
}

/// The shrinking safe area. Owned by the zone engine; mutated only by
/// `tick` and `start_shrink`.
#[derive(Debug, Clone)]
pub struct Zone {
    /// Reference frame (arena) this zone lives in
    pub arena: String,
    pub center: (f32, f32),
    pub current_radius: f32,
    pub target_radius: f32,
    pub start_radius: f32,
    pub shrink_started_at: u64,
    pub shrink_duration_ms: u64,
    pub shrinking: bool,
}

impl Zone {
    fn new(arena: String, center: (f32, f32), radius: f32) -> Self {
        Self {
            arena,
            center,
            current_radius: radius,
            target_radius: radius,
            start_radius: radius,
            shrink_started_at: 0,
            shrink_duration_ms: 0,
            shrinking: false,
        }
    }

    fn start_shrink(&mut self, target_radius: f32, duration: Duration, now: u64) {
        self.start_radius = self.current_radius;
        self.target_radius = target_radius;
        self.shrink_started_at = now;
        self.shrink_duration_ms = duration.as_millis() as u64;
        self.shrinking = true;
    }

    /// Shrink progress in [0, 1]; monotonic non-decreasing while shrinking
    pub fn shrink_progress(&self, now: u64) -> f32 {
        if !self.shrinking || self.shrink_duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.shrink_started_at) as f32;
        (elapsed / self.shrink_duration_ms as f32).min(1.0)
    }

    /// Strictly outside the circle
    pub fn is_outside(&self, x: f32, y: f32) -> bool {
        let dx = x - self.center.0;
        let dy = y - self.center.1;
        dx * dx + dy * dy > self.current_radius * self.current_radius
    }
}

/// One out-of-zone damage decision, handed to the director for application
#[derive(Debug, Clone, Copy)]
pub struct ZoneHit {
    pub victim: Uuid,
    pub amount: f32,
}

struct ZoneRuntime {
    zone: Option<Zone>,
    phase_index: usize,
    phase_started_at: u64,
    active: bool,
}

/// Owns the current zone, advances phases on its own cadence, and emits
/// damage decisions for participants caught outside.
pub struct ZoneEngine {
    me: Weak<ZoneEngine>,
    phases: ZonePhaseTable,
    arena: String,
    grace: Duration,
    clock: Arc<dyn Clock>,
    scheduler: Arc<TickScheduler>,
    positions: Arc<dyn PositionSource>,
    damage_tx: mpsc::UnboundedSender<ZoneHit>,
    events: broadcast::Sender<MatchEvent>,
    state: RwLock<ZoneRuntime>,
}

impl ZoneEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        phases: ZonePhaseTable,
        arena: String,
        grace: Duration,
        clock: Arc<dyn Clock>,
        scheduler: Arc<TickScheduler>,
        positions: Arc<dyn PositionSource>,
        damage_tx: mpsc::UnboundedSender<ZoneHit>,
        events: broadcast::Sender<MatchEvent>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            phases,
            arena,
            grace,
            clock,
            scheduler,
            positions,
            damage_tx,
            events,
            state: RwLock::new(ZoneRuntime {
                zone: None,
                phase_index: 0,
                phase_started_at: 0,
                active: false,
            }),
        })
    }

    /// Create the zone and register the periodic callbacks. No-op if
    /// already active. Requires a tokio runtime.
    pub fn start(&self, center: (f32, f32), initial_radius: f32) {
        if !self.begin(center, initial_radius) {
            return;
        }
        let Some(engine) = self.me.upgrade() else {
            return;
        };

        let ticker = engine.clone();
        self.scheduler.schedule(ZONE_TICK_TASK, ENGINE_TICK, move || {
            ticker.tick();
        });

        let interval = self
            .phases
            .get(0)
            .map(|p| p.tick_interval)
            .unwrap_or(Duration::from_secs(1));
        self.scheduler.schedule(ZONE_DAMAGE_TASK, interval, move || {
            engine.damage_scan();
        });
    }

    /// Reset the phase index and place the zone, without scheduling.
    /// Returns false if the engine was already active.
    pub fn begin(&self, center: (f32, f32), initial_radius: f32) -> bool {
        let mut rt = self.state.write();
        if rt.active {
            debug!(arena = %self.arena, "Zone already active, ignoring start");
            return false;
        }
        rt.phase_index = 0;
        rt.phase_started_at = self.clock.now_millis();
        rt.zone = Some(Zone::new(self.arena.clone(), center, initial_radius.max(0.0)));
        rt.active = true;
        info!(arena = %self.arena, radius = initial_radius, "Zone started");
        true
    }

    /// Cancel the periodic callbacks and drop the zone. Idempotent and safe
    /// before `start`.
    pub fn stop(&self) {
        self.scheduler.cancel(ZONE_TICK_TASK);
        self.scheduler.cancel(ZONE_DAMAGE_TASK);

        let mut rt = self.state.write();
        if rt.active {
            info!(arena = %self.arena, "Zone stopped");
        }
        rt.zone = None;
        rt.active = false;
    }

    /// Fast-cadence update: interpolate the radius while shrinking, snap at
    /// completion, and advance the phase once its wait has elapsed.
    pub fn tick(&self) {
        let now = self.clock.now_millis();
        let mut guard = self.state.write();
        let rt = &mut *guard;
        if !rt.active {
            return;
        }
        let Some(zone) = rt.zone.as_mut() else {
            return;
        };

        if zone.shrinking {
            let elapsed = now.saturating_sub(zone.shrink_started_at);
            if elapsed >= zone.shrink_duration_ms {
                zone.current_radius = zone.target_radius;
                zone.shrinking = false;
            } else {
                let progress = elapsed as f32 / zone.shrink_duration_ms as f32;
                zone.current_radius =
                    zone.start_radius - (zone.start_radius - zone.target_radius) * progress;
            }
            return;
        }

        let Some(phase) = self.phases.get(rt.phase_index) else {
            return;
        };
        let mut wait_ms = phase.wait.as_millis() as u64;
        if rt.phase_index == 0 {
            wait_ms += self.grace.as_millis() as u64;
        }
        if now.saturating_sub(rt.phase_started_at) >= wait_ms {
            self.advance_phase_locked(rt, now);
        }
    }

    /// Advance to the next phase and start its shrink. No-op with a warning
    /// at the last index. Also exposed to the admin surface.
    pub fn next_phase(&self) {
        let now = self.clock.now_millis();
        let mut rt = self.state.write();
        if !rt.active {
            return;
        }
        self.advance_phase_locked(&mut rt, now);
    }

    fn advance_phase_locked(&self, rt: &mut ZoneRuntime, now: u64) {
        if rt.phase_index >= self.phases.last_index() {
            warn!(
                arena = %self.arena,
                phase = rt.phase_index,
                "Zone already at final phase, cannot advance"
            );
            return;
        }

        rt.phase_index += 1;
        let Some(phase) = self.phases.get(rt.phase_index).copied() else {
            return;
        };

        if let Some(zone) = rt.zone.as_mut() {
            zone.start_shrink(phase.target_radius, phase.shrink, now);
        }
        rt.phase_started_at = now;

        info!(
            arena = %self.arena,
            phase = rt.phase_index,
            target_radius = phase.target_radius,
            shrink_secs = phase.shrink.as_secs_f32(),
            "Zone advancing to next phase"
        );
        let _ = self.events.send(MatchEvent::ZonePhaseAdvanced {
            phase: rt.phase_index as u32,
            target_radius: phase.target_radius,
            shrink_secs: phase.shrink.as_secs_f32(),
        });

        // The damage cadence follows the phase's scan interval
        if self.scheduler.is_scheduled(ZONE_DAMAGE_TASK) {
            if let Some(engine) = self.me.upgrade() {
                self.scheduler
                    .schedule(ZONE_DAMAGE_TASK, phase.tick_interval, move || {
                        engine.damage_scan();
                    });
            }
        }
    }

    /// Scan participant positions and emit one attacker-less hit per
    /// participant strictly outside the zone. Runs on the current phase's
    /// scan cadence.
    pub fn damage_scan(&self) {
        let (zone, damage) = {
            let rt = self.state.read();
            if !rt.active {
                return;
            }
            let Some(zone) = rt.zone.clone() else {
                return;
            };
            let damage = self
                .phases
                .get(rt.phase_index)
                .map(|p| p.damage_per_tick)
                .unwrap_or(0.0);
            (zone, damage)
        };

        if damage <= 0.0 {
            return;
        }

        for (id, (x, y)) in self.positions.live_positions() {
            if zone.is_outside(x, y) {
                let _ = self.damage_tx.send(ZoneHit {
                    victim: id,
                    amount: damage,
                });
                let _ = self.events.send(MatchEvent::ZoneDamage { id, amount: damage });
            }
        }
    }

    /// True once the last phase's shrink is fully complete
    pub fn should_trigger_deathmatch(&self) -> bool {
        let rt = self.state.read();
        if !rt.active || rt.phase_index < self.phases.last_index() {
            return false;
        }
        match &rt.zone {
            Some(zone) => {
                !zone.shrinking && (zone.current_radius - zone.target_radius).abs() < RADIUS_EPSILON
            }
            None => false,
        }
    }

    pub fn current_zone(&self) -> Option<Zone> {
        self.state.read().zone.clone()
    }

    pub fn current_phase_index(&self) -> usize {
        self.state.read().phase_index
    }

    pub fn current_phase(&self) -> Option<ZonePhase> {
        let rt = self.state.read();
        self.phases.get(rt.phase_index).copied()
    }

    pub fn is_active(&self) -> bool {
        self.state.read().active
    }
}
