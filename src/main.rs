//! Royale Engine - demo match runner
//!
//! Runs one simulated match end to end: seeded bots drift around the arena,
//! trade hits when close, and get squeezed by the shrinking zone until a
//! winner remains. Useful for exercising the engine without a host server.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use royale_engine::config::MatchSettings;
use royale_engine::game::{MatchDirector, MatchEvent, PositionSource};
use royale_engine::util::time::SystemClock;

/// In-memory world: bot positions, driven by a seeded random walk
struct SimWorld {
    positions: DashMap<Uuid, (f32, f32)>,
    rng: Mutex<ChaCha8Rng>,
    arena_radius: f32,
}

impl SimWorld {
    fn new(seed: u64, arena_radius: f32) -> Self {
        Self {
            positions: DashMap::new(),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            arena_radius,
        }
    }

    fn spawn(&self, id: Uuid) {
        let mut rng = self.rng.lock();
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let distance = rng.gen_range(0.0..self.arena_radius * 0.9);
        self.positions
            .insert(id, (angle.cos() * distance, angle.sin() * distance));
    }

    fn drift(&self) {
        let mut rng = self.rng.lock();
        for mut entry in self.positions.iter_mut() {
            let (x, y) = *entry.value();
            *entry.value_mut() = (
                x + rng.gen_range(-15.0..15.0),
                y + rng.gen_range(-15.0..15.0),
            );
        }
    }

    fn remove(&self, id: Uuid) {
        self.positions.remove(&id);
    }

    /// Pairs of bots close enough to trade hits
    fn skirmishes(&self, range: f32) -> Vec<(Uuid, Uuid)> {
        let snapshot: Vec<(Uuid, (f32, f32))> =
            self.positions.iter().map(|e| (*e.key(), *e.value())).collect();
        let mut pairs = Vec::new();
        for i in 0..snapshot.len() {
            for j in (i + 1)..snapshot.len() {
                let (a, (ax, ay)) = snapshot[i];
                let (b, (bx, by)) = snapshot[j];
                let (dx, dy) = (bx - ax, by - ay);
                if dx * dx + dy * dy <= range * range {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }
}

impl PositionSource for SimWorld {
    fn live_positions(&self) -> Vec<(Uuid, (f32, f32))> {
        self.positions.iter().map(|e| (*e.key(), *e.value())).collect()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let settings = MatchSettings::from_env()?;
    let bots: usize = std::env::var("DEMO_BOTS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8);
    let seed: u64 = std::env::var("DEMO_SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(rand::random);

    info!(bots, seed, "Starting demo match");

    let world = Arc::new(SimWorld::new(seed, settings.arena_radius));
    let director = MatchDirector::new(settings, world.clone(), Arc::new(SystemClock));

    for i in 0..bots {
        let id = Uuid::new_v4();
        world.spawn(id);
        director.join(id, format!("bot_{i}"))?;
    }
    director.begin_countdown()?;
    director.start_match()?;

    // Event feed: log everything, prune eliminated bots from the world
    let mut events = director.subscribe();
    let feed_world = world.clone();
    let feed = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(?event, "match event");
            match event {
                MatchEvent::Eliminated { victim, .. } => feed_world.remove(victim),
                MatchEvent::MatchEnded { .. } => break,
                _ => {}
            }
        }
    });

    // Bot behavior: drift, and trade hits when close
    let sim_world = world.clone();
    let sim_director = director.clone();
    let sim = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(200));
        loop {
            ticker.tick().await;
            sim_world.drift();
            for (a, b) in sim_world.skirmishes(120.0) {
                let amount = {
                    let mut rng = sim_world.rng.lock();
                    rng.gen_range(2.0..8.0)
                };
                sim_director.record_damage(b, Some(a), amount);
            }
            if !sim_director.state().is_in_progress() && sim_director.winner().is_some() {
                break;
            }
        }
    });

    tokio::select! {
        _ = feed => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }
    sim.abort();
    director.shutdown();

    let mut standings = director.participants_snapshot();
    standings.sort_by_key(|p| if p.placement == 0 { u32::MAX } else { p.placement });
    info!("Final standings:");
    for p in standings {
        info!(
            name = %p.display_name,
            placement = p.placement,
            kills = p.kills,
            assists = p.assists,
            damage_dealt = p.damage_dealt,
            survival_secs = p.survival_secs,
            "participant"
        );
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
