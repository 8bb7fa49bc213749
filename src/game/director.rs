//! Match coordination - routes zone and combat damage into eliminations and
//! drives lifecycle transitions from zone collapse and alive-count signals.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::MatchSettings;
use crate::util::scheduler::TickScheduler;
use crate::util::time::{Clock, ENGINE_TICK};

use super::combat::CombatAttributionEngine;
use super::events::MatchEvent;
use super::state::{GameState, GameStateMachine};
use super::zone::{ZoneEngine, ZoneHit, ZonePhaseTable};
use super::{MatchError, PositionSource};

/// Scheduler registration name for the director's housekeeping tick
pub const DIRECTOR_TICK_TASK: &str = "director-tick";

/// A participant's authoritative match record. Created on join, mutated
/// throughout the match, retained for stat reads after elimination.
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: Uuid,
    pub display_name: String,
    pub alive: bool,
    pub health: f32,
    /// Final rank; 0 until eliminated or the match ends
    pub placement: u32,
    pub kills: u32,
    pub assists: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub joined_at: u64,
    pub survival_secs: u32,
}

impl Participant {
    fn new(id: Uuid, display_name: String, health: f32, joined_at: u64) -> Self {
        Self {
            id,
            display_name,
            alive: true,
            health,
            placement: 0,
            kills: 0,
            assists: 0,
            damage_dealt: 0.0,
            damage_taken: 0.0,
            joined_at,
            survival_secs: 0,
        }
    }
}

/// Owns one state machine, one zone engine, one attribution engine, and the
/// participant set for a single match. All engine state is private to this
/// instance; there is no cross-match sharing.
pub struct MatchDirector {
    pub id: Uuid,
    me: Weak<MatchDirector>,
    settings: MatchSettings,
    machine: GameStateMachine,
    zone: Arc<ZoneEngine>,
    combat: CombatAttributionEngine,
    participants: DashMap<Uuid, Participant>,
    scheduler: Arc<TickScheduler>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<MatchEvent>,
    zone_rx: Mutex<mpsc::UnboundedReceiver<ZoneHit>>,
    winner: RwLock<Option<Uuid>>,
    started_at: AtomicU64,
    deathmatch_at: AtomicU64,
}

impl MatchDirector {
    pub fn new(
        settings: MatchSettings,
        positions: Arc<dyn PositionSource>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let scheduler = Arc::new(TickScheduler::new());
        let (events, _) = broadcast::channel(256);
        let (damage_tx, damage_rx) = mpsc::unbounded_channel();

        let zone = ZoneEngine::new(
            ZonePhaseTable::from_settings(&settings.zone_phases),
            settings.arena_name.clone(),
            Duration::from_secs_f32(settings.zone_grace_secs.max(0.0)),
            clock.clone(),
            scheduler.clone(),
            positions,
            damage_tx,
            events.clone(),
        );

        let combat = CombatAttributionEngine::new(
            Duration::from_secs_f32(settings.combat_window_secs.max(0.0)),
            clock.clone(),
        );

        Arc::new_cyclic(|me| Self {
            id: Uuid::new_v4(),
            me: me.clone(),
            settings,
            machine: GameStateMachine::new(),
            zone,
            combat,
            participants: DashMap::new(),
            scheduler,
            clock,
            events,
            zone_rx: Mutex::new(damage_rx),
            winner: RwLock::new(None),
            started_at: AtomicU64::new(0),
            deathmatch_at: AtomicU64::new(0),
        })
    }

    /// Listen for match events (notification sink; fire-and-forget)
    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> GameState {
        self.machine.get()
    }

    /// Unconditional state change (admin/debug surface and internal
    /// triggers). Returns the previous state.
    pub fn set_state(&self, new_state: GameState) -> GameState {
        let prev = self.machine.set(new_state);
        if prev != new_state {
            info!(match_id = %self.id, from = %prev, to = %new_state, "Match state changed");
            let _ = self.events.send(MatchEvent::StateChanged {
                from: prev,
                to: new_state,
            });
        }
        prev
    }

    /// Admin surface: set the state by name
    pub fn set_state_by_name(&self, name: &str) -> Result<GameState, MatchError> {
        let state: GameState = name.parse()?;
        Ok(self.set_state(state))
    }

    /// Register a participant. Only allowed while the match is waiting.
    pub fn join(&self, id: Uuid, display_name: impl Into<String>) -> Result<(), MatchError> {
        let state = self.state();
        if !state.can_join() {
            return Err(MatchError::JoinClosed(state));
        }
        if self.participants.len() >= self.settings.max_participants {
            return Err(MatchError::MatchFull(self.participants.len()));
        }
        if self.participants.contains_key(&id) {
            return Err(MatchError::AlreadyJoined(id));
        }

        let display_name = display_name.into();
        let participant = Participant::new(
            id,
            display_name.clone(),
            self.settings.starting_health,
            self.clock.now_millis(),
        );
        self.participants.insert(id, participant);

        info!(
            match_id = %self.id,
            participant = %id,
            count = self.participants.len(),
            "Participant joined"
        );
        let _ = self
            .events
            .send(MatchEvent::ParticipantJoined { id, display_name });
        Ok(())
    }

    /// Drop a participant. Mid-match this counts as an elimination so the
    /// placement ladder stays consistent; while waiting it is a plain
    /// removal.
    pub fn leave(&self, id: Uuid) {
        if self.state().is_in_progress() {
            let alive = self.participants.get(&id).map(|p| p.alive).unwrap_or(false);
            if alive {
                self.eliminate(id);
            }
            let _ = self.events.send(MatchEvent::ParticipantLeft { id });
        } else if self.participants.remove(&id).is_some() {
            let _ = self.events.send(MatchEvent::ParticipantLeft { id });
        }
    }

    /// External trigger: enough participants gathered, begin the countdown
    pub fn begin_countdown(&self) -> Result<(), MatchError> {
        let state = self.state();
        if state != GameState::Waiting {
            return Err(MatchError::NotStartable(state));
        }
        let have = self.participants.len();
        if have < self.settings.min_participants {
            return Err(MatchError::NotEnoughParticipants {
                have,
                need: self.settings.min_participants,
            });
        }
        self.set_state(GameState::Starting);
        Ok(())
    }

    /// External trigger: countdown elapsed, go live. Starts the zone and the
    /// director's periodic tick. Requires a tokio runtime.
    pub fn start_match(&self) -> Result<(), MatchError> {
        let state = self.state();
        if state != GameState::Starting {
            return Err(MatchError::NotStartable(state));
        }

        self.set_state(GameState::Active);
        self.started_at
            .store(self.clock.now_millis(), Ordering::SeqCst);
        self.zone.start((0.0, 0.0), self.settings.arena_radius);

        if let Some(director) = self.me.upgrade() {
            self.scheduler
                .schedule(DIRECTOR_TICK_TASK, ENGINE_TICK, move || {
                    director.tick();
                });
        }

        info!(match_id = %self.id, participants = self.participants.len(), "Match live");
        Ok(())
    }

    /// Housekeeping tick: apply pending zone damage, then re-check win,
    /// deathmatch, and timer conditions.
    pub fn tick(&self) {
        if !self.state().is_in_progress() {
            return;
        }

        let hits: Vec<ZoneHit> = {
            let mut rx = self.zone_rx.lock();
            let mut hits = Vec::new();
            while let Ok(hit) = rx.try_recv() {
                hits.push(hit);
            }
            hits
        };
        for hit in hits {
            self.record_damage(hit.victim, None, hit.amount);
        }

        self.check_transitions();
        self.check_timers();
    }

    /// Apply damage to a participant. Player-caused hits (`attacker` set)
    /// are recorded into attribution before health is touched, so a lethal
    /// hit is always visible to the killer lookup at elimination time.
    /// Environmental damage (`attacker` none) bypasses attribution entirely.
    /// Unknown victims are tolerated: attribution totals still accumulate,
    /// health application is skipped.
    pub fn record_damage(&self, victim: Uuid, attacker: Option<Uuid>, amount: f32) {
        if let Some(attacker) = attacker {
            self.combat.record_damage(victim, attacker, amount);
            if let Some(mut p) = self.participants.get_mut(&attacker) {
                p.damage_dealt += amount;
            }
        }

        let lethal = match self.participants.get_mut(&victim) {
            Some(mut p) if p.alive => {
                p.damage_taken += amount;
                p.health = (p.health - amount).max(0.0);
                p.health <= 0.0
            }
            _ => false,
        };

        if lethal {
            self.eliminate(victim);
        }
    }

    /// One-way elimination: credit killer and assisters from attribution,
    /// record placement and survival time, clear the victim's combat state,
    /// and re-check transitions.
    fn eliminate(&self, victim: Uuid) {
        let killer = self.combat.get_killer(victim);
        let assists = self.combat.get_assisters(victim, killer);
        let placement = self.alive_count() as u32;
        let now = self.clock.now_millis();

        let newly_dead = match self.participants.get_mut(&victim) {
            Some(mut p) if p.alive => {
                p.alive = false;
                p.health = 0.0;
                p.placement = placement;
                p.survival_secs = (now.saturating_sub(p.joined_at) / 1000) as u32;
                true
            }
            _ => false,
        };
        if !newly_dead {
            return;
        }

        if let Some(killer_id) = killer {
            if let Some(mut p) = self.participants.get_mut(&killer_id) {
                p.kills += 1;
            }
        }
        for assist_id in &assists {
            if let Some(mut p) = self.participants.get_mut(assist_id) {
                p.assists += 1;
            }
        }

        self.combat.clear_player(victim);

        info!(
            match_id = %self.id,
            victim = %victim,
            killer = ?killer,
            assists = assists.len(),
            placement,
            "Participant eliminated"
        );
        let _ = self.events.send(MatchEvent::Eliminated {
            victim,
            killer,
            assists,
            placement,
        });

        self.check_transitions();
    }

    fn check_transitions(&self) {
        let state = self.state();
        if !state.is_in_progress() {
            return;
        }

        let alive: Vec<Uuid> = self
            .participants
            .iter()
            .filter(|p| p.alive)
            .map(|p| p.id)
            .collect();

        if alive.len() <= 1 {
            self.finish(alive.first().copied());
        } else if state != GameState::Deathmatch
            && self.settings.deathmatch_enabled
            && self.zone.should_trigger_deathmatch()
        {
            self.enter_deathmatch(alive.len() as u32);
        }
    }

    fn check_timers(&self) {
        let now = self.clock.now_millis();
        match self.state() {
            GameState::Active => {
                let started = self.started_at.load(Ordering::SeqCst);
                let limit = u64::from(self.settings.game_duration_secs) * 1000;
                if started > 0 && limit > 0 && now.saturating_sub(started) >= limit {
                    debug!(match_id = %self.id, "Game duration exhausted");
                    if self.settings.deathmatch_enabled {
                        self.enter_deathmatch(self.alive_count() as u32);
                    } else {
                        self.finish(self.best_remaining());
                    }
                }
            }
            GameState::Deathmatch => {
                let entered = self.deathmatch_at.load(Ordering::SeqCst);
                let limit = u64::from(self.settings.deathmatch_time_limit_secs) * 1000;
                if entered > 0 && limit > 0 && now.saturating_sub(entered) >= limit {
                    debug!(match_id = %self.id, "Deathmatch time limit exhausted");
                    self.finish(self.best_remaining());
                }
            }
            _ => {}
        }
    }

    fn enter_deathmatch(&self, alive: u32) {
        self.set_state(GameState::Deathmatch);
        self.deathmatch_at
            .store(self.clock.now_millis(), Ordering::SeqCst);
        info!(match_id = %self.id, alive, "Deathmatch started");
        let _ = self.events.send(MatchEvent::DeathmatchStarted { alive });
    }

    /// Best participant still alive, ranked by kills then damage dealt.
    /// Used when a timer forces the match to end without a last survivor.
    fn best_remaining(&self) -> Option<Uuid> {
        self.ranked_survivors().first().copied()
    }

    fn ranked_survivors(&self) -> Vec<Uuid> {
        let mut alive: Vec<(Uuid, u32, f32)> = self
            .participants
            .iter()
            .filter(|p| p.alive)
            .map(|p| (p.id, p.kills, p.damage_dealt))
            .collect();
        alive.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then(b.2.partial_cmp(&a.2).unwrap_or(CmpOrdering::Equal))
        });
        alive.into_iter().map(|(id, _, _)| id).collect()
    }

    /// End the match: record the winner, assign final placements and
    /// survival times to everyone still alive, and stop the periodic tasks.
    /// Idempotent.
    fn finish(&self, winner: Option<Uuid>) {
        let prev = self.set_state(GameState::Ending);
        if prev == GameState::Ending {
            return;
        }
        *self.winner.write() = winner;

        let mut standings = self.ranked_survivors();
        if let Some(winner_id) = winner {
            standings.retain(|id| *id != winner_id);
            standings.insert(0, winner_id);
        }
        let now = self.clock.now_millis();
        for (rank, id) in standings.iter().enumerate() {
            if let Some(mut p) = self.participants.get_mut(id) {
                p.placement = (rank + 1) as u32;
                p.survival_secs = (now.saturating_sub(p.joined_at) / 1000) as u32;
            }
        }

        self.zone.stop();
        self.scheduler.cancel(DIRECTOR_TICK_TASK);

        let started = self.started_at.load(Ordering::SeqCst);
        let duration_secs = if started > 0 {
            (now.saturating_sub(started) / 1000) as u32
        } else {
            0
        };

        info!(match_id = %self.id, winner = ?winner, duration_secs, "Match ended");
        let _ = self.events.send(MatchEvent::MatchEnded {
            winner,
            duration_secs,
        });
    }

    /// Tear everything down: zone callbacks, periodic tasks, combat state
    pub fn shutdown(&self) {
        self.zone.stop();
        self.scheduler.cancel_all();
        self.combat.clear_all();
        self.set_state(GameState::Ending);
    }

    pub fn alive_count(&self) -> usize {
        self.participants.iter().filter(|p| p.alive).count()
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn participant(&self, id: Uuid) -> Option<Participant> {
        self.participants.get(&id).map(|p| p.clone())
    }

    pub fn participants_snapshot(&self) -> Vec<Participant> {
        self.participants.iter().map(|p| p.clone()).collect()
    }

    pub fn winner(&self) -> Option<Uuid> {
        *self.winner.read()
    }

    /// Admin/debug access to the zone engine (`start`, `stop`, `next_phase`)
    pub fn zone_engine(&self) -> &Arc<ZoneEngine> {
        &self.zone
    }

    pub fn combat_engine(&self) -> &CombatAttributionEngine {
        &self.combat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::StaticPositions;
    use crate::util::time::ManualClock;

    fn settings() -> MatchSettings {
        MatchSettings {
            min_participants: 2,
            max_participants: 8,
            ..MatchSettings::default()
        }
    }

    fn director_with(
        settings: MatchSettings,
        positions: Arc<StaticPositions>,
    ) -> (Arc<MatchDirector>, Arc<ManualClock>) {
        let clock = ManualClock::new(1_000_000);
        let director = MatchDirector::new(settings, positions, clock.clone());
        (director, clock)
    }

    fn join_n(director: &MatchDirector, n: usize) -> Vec<Uuid> {
        (0..n)
            .map(|i| {
                let id = Uuid::new_v4();
                director.join(id, format!("bot_{i}")).unwrap();
                id
            })
            .collect()
    }

    /// Put the match in the active state without a tokio runtime
    fn go_live(director: &Arc<MatchDirector>) {
        director.set_state(GameState::Active);
        director.zone_engine().begin((0.0, 0.0), 750.0);
    }

    #[test]
    fn join_rules_enforced() {
        let (director, _clock) = director_with(settings(), Arc::new(StaticPositions::new(vec![])));
        let players = join_n(&director, 8);

        assert!(matches!(
            director.join(Uuid::new_v4(), "late"),
            Err(MatchError::MatchFull(8))
        ));
        assert!(matches!(
            director.join(players[0], "again"),
            Err(MatchError::AlreadyJoined(_))
        ));

        director.set_state(GameState::Active);
        let late = Uuid::new_v4();
        // Room frees up but the match is no longer joinable
        director.leave(players[0]);
        assert!(matches!(
            director.join(late, "late"),
            Err(MatchError::JoinClosed(GameState::Active))
        ));
    }

    #[test]
    fn countdown_requires_minimum() {
        let (director, _clock) = director_with(settings(), Arc::new(StaticPositions::new(vec![])));
        join_n(&director, 1);
        assert!(matches!(
            director.begin_countdown(),
            Err(MatchError::NotEnoughParticipants { have: 1, need: 2 })
        ));

        join_n(&director, 1);
        director.begin_countdown().unwrap();
        assert_eq!(director.state(), GameState::Starting);

        assert!(matches!(
            director.begin_countdown(),
            Err(MatchError::NotStartable(GameState::Starting))
        ));
    }

    #[test]
    fn lethal_hit_credits_killer_and_assists() {
        let (director, _clock) = director_with(settings(), Arc::new(StaticPositions::new(vec![])));
        let ids = join_n(&director, 3);
        let (p1, p2, p3) = (ids[0], ids[1], ids[2]);
        go_live(&director);

        director.record_damage(p1, Some(p3), 30.0);
        director.record_damage(p1, Some(p2), 70.0); // lethal

        let victim = director.participant(p1).unwrap();
        assert!(!victim.alive);
        assert_eq!(victim.placement, 3);
        assert_eq!(victim.health, 0.0);
        assert!((victim.damage_taken - 100.0).abs() < f32::EPSILON);

        assert_eq!(director.participant(p2).unwrap().kills, 1);
        assert_eq!(director.participant(p3).unwrap().assists, 1);
        assert_eq!(director.alive_count(), 2);
        assert_eq!(director.state(), GameState::Active);

        // Victim's combat state was cleared on elimination
        assert_eq!(director.combat_engine().get_killer(p1), None);
    }

    #[test]
    fn last_elimination_ends_the_match() {
        let (director, _clock) = director_with(settings(), Arc::new(StaticPositions::new(vec![])));
        let ids = join_n(&director, 2);
        go_live(&director);

        director.record_damage(ids[0], Some(ids[1]), 100.0);

        assert_eq!(director.state(), GameState::Ending);
        assert_eq!(director.winner(), Some(ids[1]));
        let winner = director.participant(ids[1]).unwrap();
        assert_eq!(winner.placement, 1);
        assert_eq!(director.participant(ids[0]).unwrap().placement, 2);
    }

    #[test]
    fn zone_damage_kills_without_a_killer() {
        let positions = Arc::new(StaticPositions::new(vec![]));
        let mut cfg = settings();
        cfg.starting_health = 2.0;
        let (director, _clock) = director_with(cfg, positions.clone());
        let ids = join_n(&director, 2);
        positions.place(ids[0], (10.0, 0.0)); // inside
        positions.place(ids[1], (900.0, 0.0)); // outside
        go_live(&director);

        let mut events = director.subscribe();

        // Two scans at 1.0 damage each are lethal for 2.0 health
        director.zone_engine().damage_scan();
        director.tick();
        assert_eq!(director.participant(ids[1]).unwrap().health, 1.0);

        director.zone_engine().damage_scan();
        director.tick();

        let dead = director.participant(ids[1]).unwrap();
        assert!(!dead.alive);
        assert_eq!(director.state(), GameState::Ending);
        assert_eq!(director.winner(), Some(ids[0]));
        // Nobody gets kill credit for the zone
        assert_eq!(director.participant(ids[0]).unwrap().kills, 0);

        let mut saw_unattributed_elimination = false;
        while let Ok(event) = events.try_recv() {
            if let MatchEvent::Eliminated { victim, killer, .. } = event {
                assert_eq!(victim, ids[1]);
                assert_eq!(killer, None);
                saw_unattributed_elimination = true;
            }
        }
        assert!(saw_unattributed_elimination);
    }

    #[test]
    fn zone_collapse_triggers_deathmatch_once() {
        let (director, clock) = director_with(settings(), Arc::new(StaticPositions::new(vec![])));
        join_n(&director, 3);
        go_live(&director);

        let zone = director.zone_engine().clone();
        for _ in 0..6 {
            zone.next_phase();
        }
        clock.advance_secs(600);
        zone.tick();
        assert!(zone.should_trigger_deathmatch());

        director.tick();
        assert_eq!(director.state(), GameState::Deathmatch);

        // Further ticks stay in deathmatch
        director.tick();
        assert_eq!(director.state(), GameState::Deathmatch);
    }

    #[test]
    fn deathmatch_time_limit_picks_best_survivor() {
        let mut cfg = settings();
        cfg.deathmatch_time_limit_secs = 60;
        let (director, clock) = director_with(cfg, Arc::new(StaticPositions::new(vec![])));
        let ids = join_n(&director, 3);
        go_live(&director);

        // ids[0] takes a kill before deathmatch
        director.record_damage(ids[2], Some(ids[0]), 100.0);
        assert_eq!(director.alive_count(), 2);

        let zone = director.zone_engine().clone();
        for _ in 0..6 {
            zone.next_phase();
        }
        clock.advance_secs(600);
        zone.tick();
        director.tick();
        assert_eq!(director.state(), GameState::Deathmatch);

        clock.advance_secs(61);
        director.tick();

        assert_eq!(director.state(), GameState::Ending);
        assert_eq!(director.winner(), Some(ids[0]));
        assert_eq!(director.participant(ids[0]).unwrap().placement, 1);
        assert_eq!(director.participant(ids[1]).unwrap().placement, 2);
    }

    #[test]
    fn game_duration_forces_deathmatch() {
        let mut cfg = settings();
        cfg.game_duration_secs = 120;
        let (director, clock) = director_with(cfg, Arc::new(StaticPositions::new(vec![])));
        join_n(&director, 3);
        go_live(&director);
        director
            .started_at
            .store(clock.now_millis(), Ordering::SeqCst);

        clock.advance_secs(119);
        director.tick();
        assert_eq!(director.state(), GameState::Active);

        clock.advance_secs(2);
        director.tick();
        assert_eq!(director.state(), GameState::Deathmatch);
    }

    #[test]
    fn mid_match_leave_counts_as_elimination() {
        let (director, _clock) = director_with(settings(), Arc::new(StaticPositions::new(vec![])));
        let ids = join_n(&director, 3);
        go_live(&director);

        director.leave(ids[0]);
        let gone = director.participant(ids[0]).unwrap();
        assert!(!gone.alive);
        assert_eq!(gone.placement, 3);
        assert_eq!(director.alive_count(), 2);
        assert_eq!(director.state(), GameState::Active);
    }

    #[test]
    fn unknown_ids_are_tolerated() {
        let (director, _clock) = director_with(settings(), Arc::new(StaticPositions::new(vec![])));
        join_n(&director, 2);
        go_live(&director);

        let ghost = Uuid::new_v4();
        let other = Uuid::new_v4();
        director.record_damage(ghost, Some(other), 50.0);

        assert_eq!(director.alive_count(), 2);
        assert!((director.combat_engine().get_damage_dealt(other) - 50.0).abs() < f32::EPSILON);
        assert!((director.combat_engine().get_damage_taken(ghost) - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn admin_state_override_by_name() {
        let (director, _clock) = director_with(settings(), Arc::new(StaticPositions::new(vec![])));
        let prev = director.set_state_by_name("deathmatch").unwrap();
        assert_eq!(prev, GameState::Waiting);
        assert_eq!(director.state(), GameState::Deathmatch);
        assert!(director.set_state_by_name("limbo").is_err());
    }

    #[tokio::test]
    async fn start_match_schedules_and_shutdown_cancels() {
        let (director, _clock) = director_with(settings(), Arc::new(StaticPositions::new(vec![])));
        join_n(&director, 2);

        assert!(matches!(
            director.start_match(),
            Err(MatchError::NotStartable(GameState::Waiting))
        ));

        director.begin_countdown().unwrap();
        director.start_match().unwrap();
        assert_eq!(director.state(), GameState::Active);
        assert!(director.zone_engine().is_active());

        director.shutdown();
        assert!(!director.zone_engine().is_active());
        assert_eq!(director.state(), GameState::Ending);
    }
}
