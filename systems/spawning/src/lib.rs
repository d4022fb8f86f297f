#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system driving the enemy side's summon cadence.
//!
//! The enemy side spends no MP; instead this system counts battle ticks and,
//! on a fixed interval, picks a unit type the enemy witch may summon and that
//! the catalog marks as enemy-available. Selection uses a seeded linear
//! congruential generator so two sessions with the same seed produce the same
//! enemy composition. The world still enforces the per-side roster cap; the
//! system checks it too so rejected cadence slots are not wasted as events.

use witch_battle_core::{Command, Event, PlayMode, Side, UnitTypeId};

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;

/// Default number of battle ticks between enemy summons.
pub const DEFAULT_SPAWN_INTERVAL: u32 = 90;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: u32,
    roster_cap: usize,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cadence, cap and seed.
    #[must_use]
    pub const fn new(spawn_interval: u32, roster_cap: usize, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            roster_cap,
            rng_seed,
        }
    }
}

/// Pure system that deterministically emits enemy summon commands.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: u32,
    roster_cap: usize,
    counter: u32,
    rng_state: u64,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            roster_cap: config.roster_cap,
            counter: 0,
            rng_state: config.rng_seed,
        }
    }

    /// Consumes tick events and the candidate pool to emit summon commands.
    ///
    /// `candidates` is the enemy witch's summonable list already filtered to
    /// enemy-available catalog entries; `enemy_count` is the number of living
    /// enemy units. The cadence counter only advances in battle mode, so a
    /// modal window freezes the spawn timer along with the rest of play.
    pub fn handle(
        &mut self,
        events: &[Event],
        play_mode: PlayMode,
        candidates: &[UnitTypeId],
        enemy_count: usize,
        out: &mut Vec<Command>,
    ) {
        if play_mode != PlayMode::Battle {
            return;
        }

        if self.spawn_interval == 0 || candidates.is_empty() {
            return;
        }

        let ticks = events
            .iter()
            .filter(|event| matches!(event, Event::TickAdvanced { .. }))
            .count() as u32;
        if ticks == 0 {
            return;
        }

        self.counter += ticks;
        let mut attempts = 0;
        while self.counter >= self.spawn_interval {
            self.counter -= self.spawn_interval;
            attempts += 1;
        }

        let mut projected = enemy_count;
        for _ in 0..attempts {
            if projected >= self.roster_cap {
                break;
            }
            let unit_type = self.select_candidate(candidates);
            out.push(Command::SummonUnit {
                side: Side::Enemy,
                unit_type,
            });
            projected += 1;
        }
    }

    fn select_candidate(&mut self, candidates: &[UnitTypeId]) -> UnitTypeId {
        debug_assert!(!candidates.is_empty(), "select_candidate requires candidates");
        let value = self.advance_rng();
        let index = (value % candidates.len() as u64) as usize;
        candidates[index].clone()
    }

    fn advance_rng(&mut self) -> u64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        self.rng_state
    }
}
