//! Combat attribution - damage log, killer/assist credit, in-combat checks
//!
//! Records every player-caused hit and answers three time-windowed questions
//! at elimination time: who landed the last hit, who helped, and who is
//! currently in combat. The per-participant running damage totals accumulate
//! for the whole match and are never pruned; only attribution is windowed.
//! Expiry is evaluated lazily at read time, there is no background sweep.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use uuid::Uuid;

use crate::util::time::Clock;

/// Default rolling window for killer/assist/in-combat attribution
pub const DEFAULT_COMBAT_WINDOW: Duration = Duration::from_secs(10);

/// One damage event against a victim
#[derive(Debug, Clone, Copy)]
pub struct CombatRecord {
    pub attacker: Uuid,
    pub amount: f32,
    pub at: u64,
}

/// Tracks damage events and derives kill/assist/in-combat facts.
/// All methods take `&self`; the backing maps are safe under concurrent
/// recording from simultaneous hits in the same tick.
pub struct CombatAttributionEngine {
    window_ms: u64,
    clock: Arc<dyn Clock>,
    /// Victim-indexed hit logs, append-only in arrival order
    records: DashMap<Uuid, Vec<CombatRecord>>,
    /// Attacker-indexed lifetime totals
    damage_dealt: DashMap<Uuid, f32>,
    /// Victim-indexed lifetime totals
    damage_taken: DashMap<Uuid, f32>,
}

impl CombatAttributionEngine {
    pub fn new(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            window_ms: window.as_millis() as u64,
            clock,
            records: DashMap::new(),
            damage_dealt: DashMap::new(),
            damage_taken: DashMap::new(),
        }
    }

    /// Append a hit against `victim` and bump both running totals. Unknown
    /// ids are fine; entries are created lazily.
    pub fn record_damage(&self, victim: Uuid, attacker: Uuid, amount: f32) {
        let at = self.clock.now_millis();
        self.records.entry(victim).or_default().push(CombatRecord {
            attacker,
            amount,
            at,
        });
        *self.damage_dealt.entry(attacker).or_insert(0.0) += amount;
        *self.damage_taken.entry(victim).or_insert(0.0) += amount;
    }

    /// Attacker of the most recent hit against `victim`, if it is still
    /// within the attribution window. `None` for unknown victims, empty
    /// logs, or an expired last hit.
    pub fn get_killer(&self, victim: Uuid) -> Option<Uuid> {
        let now = self.clock.now_millis();
        let log = self.records.get(&victim)?;
        let last = log.iter().max_by_key(|r| r.at)?;
        if self.in_window(last.at, now) {
            Some(last.attacker)
        } else {
            None
        }
    }

    /// Distinct attackers that damaged `victim` within the window, excluding
    /// `killer`, in first-seen order. Multiple hits from one attacker yield
    /// exactly one entry.
    pub fn get_assisters(&self, victim: Uuid, killer: Option<Uuid>) -> Vec<Uuid> {
        let now = self.clock.now_millis();
        let Some(log) = self.records.get(&victim) else {
            return Vec::new();
        };

        let mut assisters = Vec::new();
        for record in log.iter() {
            if !self.in_window(record.at, now) {
                continue;
            }
            if Some(record.attacker) == killer {
                continue;
            }
            if !assisters.contains(&record.attacker) {
                assisters.push(record.attacker);
            }
        }
        assisters
    }

    /// True if `id` appears as attacker or victim in any record within the
    /// window. Being hit counts as much as hitting someone.
    pub fn is_in_combat(&self, id: Uuid) -> bool {
        let now = self.clock.now_millis();

        if let Some(log) = self.records.get(&id) {
            if log.iter().any(|r| self.in_window(r.at, now)) {
                return true;
            }
        }

        self.records.iter().any(|entry| {
            entry
                .value()
                .iter()
                .any(|r| r.attacker == id && self.in_window(r.at, now))
        })
    }

    /// Lifetime damage dealt by `id`; 0.0 if never recorded
    pub fn get_damage_dealt(&self, id: Uuid) -> f32 {
        self.damage_dealt.get(&id).map(|v| *v).unwrap_or(0.0)
    }

    /// Lifetime damage taken by `id`; 0.0 if never recorded
    pub fn get_damage_taken(&self, id: Uuid) -> f32 {
        self.damage_taken.get(&id).map(|v| *v).unwrap_or(0.0)
    }

    /// Drop every record involving `id` (as victim or attacker) and zero
    /// both of its running totals. Called on elimination.
    pub fn clear_player(&self, id: Uuid) {
        self.records.remove(&id);
        for mut entry in self.records.iter_mut() {
            entry.value_mut().retain(|r| r.attacker != id);
        }
        self.damage_dealt.remove(&id);
        self.damage_taken.remove(&id);
    }

    /// Full reset, e.g. on match shutdown
    pub fn clear_all(&self) {
        self.records.clear();
        self.damage_dealt.clear();
        self.damage_taken.clear();
    }

    fn in_window(&self, at: u64, now: u64) -> bool {
        now.saturating_sub(at) <= self.window_ms
    }
}
