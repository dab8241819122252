//! Skill projectiles.
//!
//! One projectile kind per [`SkillType`]. Projectiles are created by the
//! character's casting timeline with an activation time and wait in an
//! [`ActivationQueue`](crate::activation::ActivationQueue) until it
//! arrives; on the activation frame they integrate only the overshoot
//! since that time.
//!
//! Every projectile keeps a [`HitLedger`] so overlapping a monster on
//! consecutive frames damages it at most once per cooldown.

use std::collections::HashMap;

use bevy::math::{IRect, IVec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::Millis;
use crate::collision::Collidable;
use crate::constants::HIT_LEDGER_COOLDOWN_MS;
use crate::container::{FrameContext, SimEntity};
use crate::monster::{DamageOutcome, Monster, MonsterId};
use crate::rigidbody::{Facing, Rigidbody};
use crate::skill::SkillType;

pub mod kinds;

pub use kinds::{cast_pattern, Shot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileState {
    Normal,
    /// Ember resting on the ground
    Stuck,
    /// Arrow after its first hit
    Boosted,
    Die,
}

/// Per-monster "last hit at" record
#[derive(Debug, Clone)]
pub struct HitLedger {
    last_hit: HashMap<MonsterId, Millis>,
    cooldown: Millis,
}

impl Default for HitLedger {
    fn default() -> Self {
        Self::new(HIT_LEDGER_COOLDOWN_MS)
    }
}

impl HitLedger {
    pub fn new(cooldown: Millis) -> Self {
        Self {
            last_hit: HashMap::new(),
            cooldown,
        }
    }

    /// Record a hit on `id` unless one was recorded less than `cooldown`
    /// ago; returns whether the hit counts
    pub fn try_hit(&mut self, id: MonsterId, now: Millis) -> bool {
        match self.last_hit.get(&id) {
            Some(&at) if now - at < self.cooldown => false,
            _ => {
                self.last_hit.insert(id, now);
                true
            }
        }
    }

    pub fn last_hit(&self, id: MonsterId) -> Option<Millis> {
        self.last_hit.get(&id).copied()
    }

    /// Forget hits whose cooldown has run out
    pub fn prune(&mut self, now: Millis) {
        let cooldown = self.cooldown;
        self.last_hit.retain(|_, at| now - *at < cooldown);
    }

    pub fn len(&self) -> usize {
        self.last_hit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_hit.is_empty()
    }
}

/// A damaging hit a projectile landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitReport {
    pub damage: i32,
    pub outcome: DamageOutcome,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub body: Rigidbody<ProjectileState>,
    pub skill: SkillType,
    /// Effective cast power
    pub level: i32,
    /// Activation time
    pub created_at: Millis,
    ledger: HitLedger,
    hits: u32,
    catch_up: Option<Millis>,
}

impl Projectile {
    /// Build a projectile at `position` moving with `velocity`; `facing`
    /// mirrors the kind's collision shape
    pub fn new(
        skill: SkillType,
        level: i32,
        position: IVec2,
        velocity: IVec2,
        facing: Facing,
        created_at: Millis,
    ) -> Self {
        let mut body = Rigidbody::new(
            position,
            kinds::local_range(skill, facing),
            ProjectileState::Normal,
            created_at,
        );
        body.facing = facing;
        body.velocity = velocity;
        body.acceleration = kinds::acceleration(skill);
        Self {
            body,
            skill,
            level,
            created_at,
            ledger: HitLedger::default(),
            hits: 0,
            catch_up: None,
        }
    }

    pub fn state(&self) -> ProjectileState {
        self.body.state()
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn ledger(&self) -> &HitLedger {
        &self.ledger
    }

    pub fn visual_key(&self) -> &'static str {
        kinds::visual_key(self.skill)
    }

    /// Enter the live world at `now`, moving only by the overshoot past the
    /// activation time on the first frame
    pub fn activate(&mut self, now: Millis) {
        self.body
            .set_state_at(ProjectileState::Normal, self.created_at, now);
        self.catch_up = Some(now - self.created_at);
    }

    pub(crate) fn die(&mut self, now: Millis) {
        if self.state() != ProjectileState::Die {
            debug!(skill = self.skill.name(), hits = self.hits, "projectile expired");
            self.body.set_state(ProjectileState::Die, now);
        }
    }

    /// Damage `monster` unless this projectile already hit it within the
    /// ledger cooldown
    pub fn on_collided(&mut self, monster: &mut Monster, now: Millis) -> Option<HitReport> {
        if !self.ledger.try_hit(monster.id, now) {
            return None;
        }
        let (damage, knockback) = self.strike(&monster.global_range());
        let outcome = monster.damage(damage, now, knockback.x, knockback.y);
        if !outcome.landed() {
            return None;
        }
        self.hits += 1;
        self.after_hit(now);
        Some(HitReport { damage, outcome })
    }
}

impl SimEntity for Projectile {
    fn frame_move(&mut self, ctx: &mut FrameContext<'_>) {
        let dt = self.catch_up.take().unwrap_or(ctx.dt);
        self.advance(ctx, dt);
    }

    fn frame(&mut self, _now: Millis) -> bool {
        self.state() != ProjectileState::Die
    }
}

impl Collidable for Projectile {
    fn global_range(&self) -> IRect {
        self.body.global_range()
    }

    fn is_collidable(&self) -> bool {
        self.state() != ProjectileState::Die
    }
}
