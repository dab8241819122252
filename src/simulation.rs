//! Per-frame simulation step.
//!
//! One call to [`Simulation::step`] per rendered frame, in this order:
//!
//! 1. combo expiry
//! 2. spawner emits due monsters
//! 3. character input, movement and spell timeline
//! 4. projectiles whose activation time has come join the world
//! 5. monsters, projectiles and items move
//! 6. collisions: character/monster, projectile/monster, guardian/monster,
//!    character/item
//! 7. liveness passes remove expired entities (monster removal may drop an
//!    item)

use bevy::math::IVec2;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::activation::ActivationQueue;
use crate::character::{Character, ComboTracker};
use crate::clock::{FrameTime, Millis};
use crate::collision::{process_one, process_pairs};
use crate::config::{ConfigError, SimulationConfig};
use crate::constants::GUARDIAN_DAMAGE;
use crate::container::{EntityContainer, FrameContext};
use crate::events::SimEvent;
use crate::input::InputSnapshot;
use crate::item::SkillItem;
use crate::monster::{DamageOutcome, Monster};
use crate::physics::PlayField;
use crate::projectile::Projectile;
use crate::random::{seeded, SimRng};
use crate::spawner::Spawner;

/// Running totals for the summary log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    pub frames: u64,
    pub monsters_spawned: u64,
    pub monsters_killed: u64,
    pub projectiles_fired: u64,
    pub skills_learned: u64,
    pub items_dropped: u64,
    pub best_combo: u32,
}

#[derive(Debug, Clone)]
pub struct Simulation {
    field: PlayField,
    rng: SimRng,
    item_drop_chance: f64,
    pub character: Character,
    monsters: EntityContainer<Monster>,
    projectiles: EntityContainer<Projectile>,
    items: EntityContainer<SkillItem>,
    pending: ActivationQueue<Projectile>,
    spawner: Spawner,
    events: Vec<SimEvent>,
    stats: SimStats,
    now: Millis,
}

impl Simulation {
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let field = config.field.build();
        let character = Character::new(&field, 0);
        Ok(Self {
            rng: seeded(config.seed),
            item_drop_chance: config.item_drop_chance,
            character,
            monsters: EntityContainer::new(),
            projectiles: EntityContainer::new(),
            items: EntityContainer::new(),
            pending: ActivationQueue::new(),
            spawner: Spawner::new(config.spawn.clone(), config.seed),
            events: Vec::new(),
            stats: SimStats::default(),
            now: 0,
            field,
        })
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn field(&self) -> &PlayField {
        &self.field
    }

    pub fn monsters(&self) -> &[Monster] {
        self.monsters.as_slice()
    }

    pub fn projectiles(&self) -> &[Projectile] {
        self.projectiles.as_slice()
    }

    /// Projectiles waiting for their activation time
    pub fn pending_projectiles(&self) -> usize {
        self.pending.len()
    }

    pub fn items(&self) -> &[SkillItem] {
        self.items.as_slice()
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    /// Events produced by the last step
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn insert_monster(&mut self, monster: Monster) {
        self.monsters.insert(monster);
    }

    pub fn insert_item(&mut self, item: SkillItem) {
        self.items.insert(item);
    }

    /// Advance one frame; returns the events it produced
    pub fn step(&mut self, time: FrameTime, input: &InputSnapshot) -> &[SimEvent] {
        assert!(
            time.now >= self.now,
            "clock went backwards ({} < {})",
            time.now,
            self.now
        );
        let now = time.now;
        self.now = now;
        self.events.clear();
        self.stats.frames += 1;

        self.character.begin_frame(now);

        for monster in self
            .spawner
            .frame(now, &self.field, &mut self.rng, &mut self.events)
        {
            self.stats.monsters_spawned += 1;
            self.monsters.insert(monster);
        }

        self.character.control(input, now, &mut self.events);
        {
            let mut ctx = FrameContext {
                now,
                dt: time.elapsed,
                field: &self.field,
                rng: &mut self.rng,
            };
            self.character.frame_move(&mut ctx);
        }
        for projectile in self.character.on_skill(now, &mut self.events) {
            self.stats.projectiles_fired += 1;
            self.pending.schedule(projectile.created_at, projectile);
        }

        for (_, mut projectile) in self.pending.release(now) {
            projectile.activate(now);
            self.projectiles.insert(projectile);
        }

        {
            let mut ctx = FrameContext {
                now,
                dt: time.elapsed,
                field: &self.field,
                rng: &mut self.rng,
            };
            self.monsters.frame_move(&mut ctx);
            self.projectiles.frame_move(&mut ctx);
            self.items.frame_move(&mut ctx);
        }
        self.character.update_guardians(now);

        self.collide(now);
        self.remove_expired(now);

        self.stats.best_combo = self.stats.best_combo.max(self.character.combo.best());
        &self.events
    }

    fn collide(&mut self, now: Millis) {
        let events = &mut self.events;
        let stats = &mut self.stats;

        process_one(
            &mut self.character,
            self.monsters.as_mut_slice(),
            |character, monster| {
                character.on_collided(monster, now, events);
            },
        );

        let combo = &mut self.character.combo;
        process_pairs(
            self.projectiles.as_mut_slice(),
            self.monsters.as_mut_slice(),
            |projectile, monster| {
                if let Some(hit) = projectile.on_collided(monster, now) {
                    record_hit(combo, events, stats, monster, hit.damage, hit.outcome, now);
                }
            },
        );

        process_pairs(
            self.character.guardians.as_mut_slice(),
            self.monsters.as_mut_slice(),
            |guardian, monster| {
                if !guardian.ledger.try_hit(monster.id, now) {
                    return;
                }
                let outcome = monster.damage(GUARDIAN_DAMAGE, now, 0, 0);
                if outcome.landed() {
                    record_hit(combo, events, stats, monster, GUARDIAN_DAMAGE, outcome, now);
                }
            },
        );

        let rng = &mut self.rng;
        process_one(
            &mut self.character,
            self.items.as_mut_slice(),
            |character, item| {
                if character.learn_skill(item.skill, now, rng, events).is_some() {
                    stats.skills_learned += 1;
                    item.pick(now);
                }
            },
        );
    }

    fn remove_expired(&mut self, now: Millis) {
        let events = &mut self.events;
        let rng = &mut self.rng;
        let items = &mut self.items;
        let stats = &mut self.stats;
        let drop_chance = self.item_drop_chance;

        self.monsters.frame(now, |monster| {
            let position = monster.body.position;
            events.push(SimEvent::MonsterRemoved {
                id: monster.id,
                species: monster.species,
                position,
            });
            if rng.gen_bool(drop_chance) {
                let item = SkillItem::random(position, now, rng);
                events.push(SimEvent::ItemDropped {
                    position,
                    skill: item.skill,
                });
                stats.items_dropped += 1;
                items.insert(item);
            }
        });
        self.projectiles.frame(now, |_| {});
        self.items.frame(now, |_| {});
    }
}

fn record_hit(
    combo: &mut ComboTracker,
    events: &mut Vec<SimEvent>,
    stats: &mut SimStats,
    monster: &Monster,
    damage: i32,
    outcome: DamageOutcome,
    now: Millis,
) {
    let position: IVec2 = monster.body.position;
    events.push(SimEvent::MonsterDamaged {
        id: monster.id,
        species: monster.species,
        position,
        amount: damage,
        hp: monster.hp,
    });
    let count = combo.add(now);
    events.push(SimEvent::ComboChanged { combo: count });
    if outcome == DamageOutcome::Died {
        stats.monsters_killed += 1;
        debug!(id = monster.id.0, combo = count, "monster killed");
        events.push(SimEvent::MonsterDied {
            id: monster.id,
            species: monster.species,
            position,
        });
    }
}
