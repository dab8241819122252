//! Epoch-based monster spawn scheduler.
//!
//! Time is cut into fixed-length epochs after a lead-in:
//! `epoch(t) = floor((t + length - lead_in) / length)`, so epoch 0 is the
//! quiet lead-in and epoch `e >= 1` covers
//! `[(e - 1) * length + lead_in, e * length + lead_in)`.
//!
//! Each epoch gets a sorted schedule of (time, species) entries generated
//! from an RNG derived from `(seed, epoch)` alone, so a schedule never
//! depends on frame timing. When a frame crosses several epoch boundaries
//! every skipped epoch is generated and emitted in order.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Millis;
use crate::config::SpawnConfig;
use crate::events::SimEvent;
use crate::monster::{Monster, MonsterId, Species};
use crate::physics::PlayField;
use crate::random::derived;
use crate::rigidbody::Facing;

/// Hands out monster identities in increasing order
#[derive(Debug, Clone, Default)]
pub struct MonsterIdGenerator {
    next: u64,
}

impl MonsterIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> MonsterId {
        let id = MonsterId(self.next);
        self.next += 1;
        id
    }

    pub fn issued(&self) -> u64 {
        self.next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub at: Millis,
    pub species: Species,
}

#[derive(Debug, Clone)]
pub struct Spawner {
    config: SpawnConfig,
    seed: u64,
    epoch: i64,
    schedule: Vec<SpawnEntry>,
    cursor: usize,
    ids: MonsterIdGenerator,
}

impl Spawner {
    pub fn new(config: SpawnConfig, seed: u64) -> Self {
        assert!(config.epoch_length_ms > 0, "epoch length must be positive");
        assert!(
            config.weights.iter().any(|(_, w)| *w > 0),
            "spawn table needs a positive weight"
        );
        Self {
            config,
            seed,
            epoch: 0,
            schedule: Vec::new(),
            cursor: 0,
            ids: MonsterIdGenerator::new(),
        }
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    /// Epoch whose schedule is loaded
    pub fn epoch(&self) -> i64 {
        self.epoch
    }

    pub fn schedule(&self) -> &[SpawnEntry] {
        &self.schedule
    }

    /// Entries of the loaded schedule not yet emitted
    pub fn pending(&self) -> &[SpawnEntry] {
        &self.schedule[self.cursor..]
    }

    pub fn ids(&self) -> &MonsterIdGenerator {
        &self.ids
    }

    pub fn epoch_at(&self, t: Millis) -> i64 {
        let length = self.config.epoch_length_ms;
        (t + length - self.config.lead_in_ms).div_euclid(length)
    }

    pub fn epoch_start(&self, epoch: i64) -> Millis {
        (epoch - 1) * self.config.epoch_length_ms + self.config.lead_in_ms
    }

    /// Configured entry count: grows by `growth_per_epoch` up to the cap
    pub fn entry_count(&self, epoch: i64) -> usize {
        if epoch <= 0 {
            return 0;
        }
        let growth = (epoch - 1).saturating_mul(self.config.growth_per_epoch as i64);
        let count = (self.config.base_count as i64).saturating_add(growth);
        count.min(self.config.max_count as i64) as usize
    }

    /// Generate the sorted schedule for `epoch`
    pub fn generate(&self, epoch: i64) -> Vec<SpawnEntry> {
        let mut rng = derived(self.seed, "spawn", epoch);
        let start = self.epoch_start(epoch);
        let mut entries: Vec<SpawnEntry> = (0..self.entry_count(epoch))
            .map(|_| SpawnEntry {
                at: start + rng.gen_range(0..self.config.epoch_length_ms),
                species: self.pick_species(&mut rng),
            })
            .collect();
        entries.sort_by_key(|entry| entry.at);
        entries
    }

    fn pick_species<R: Rng>(&self, rng: &mut R) -> Species {
        let total: u32 = self.config.weights.iter().map(|(_, w)| *w).sum();
        let roll = rng.gen_range(0..total);
        let mut cumulative = 0;
        for &(species, weight) in &self.config.weights {
            cumulative += weight;
            if roll < cumulative {
                return species;
            }
        }
        unreachable!("roll {roll} is below the total weight {total}")
    }

    fn level_up(&mut self, epoch: i64, events: &mut Vec<SimEvent>) {
        self.schedule = self.generate(epoch);
        self.cursor = 0;
        self.epoch = epoch;
        info!(epoch, entries = self.schedule.len(), "spawn epoch started");
        events.push(SimEvent::EpochStarted {
            epoch,
            entries: self.schedule.len(),
        });
    }

    /// Emit every schedule entry due by `now` as a new monster, catching up
    /// through every epoch boundary crossed since the last call
    pub fn frame<R: Rng>(
        &mut self,
        now: Millis,
        field: &PlayField,
        rng: &mut R,
        events: &mut Vec<SimEvent>,
    ) -> Vec<Monster> {
        let mut spawned = Vec::new();
        loop {
            while let Some(entry) = self.schedule.get(self.cursor).copied() {
                if entry.at > now {
                    break;
                }
                self.cursor += 1;
                let side = if rng.gen_bool(0.5) {
                    Facing::Left
                } else {
                    Facing::Right
                };
                let id = self.ids.next_id();
                events.push(SimEvent::MonsterSpawned {
                    id,
                    species: entry.species,
                    side,
                });
                spawned.push(Monster::spawn(id, entry.species, side, field, now, rng));
            }

            if self.epoch_at(now) <= self.epoch {
                break;
            }
            self.level_up(self.epoch + 1, events);
        }
        spawned
    }
}
