//! Per-kind projectile tuning: shape, movement law, lifetime, damage and
//! the casting pattern that emits them.
//!
//! Shapes and velocities are written for a caster facing right and are
//! mirrored for a caster facing left.

use bevy::math::{IRect, IVec2};

use super::{Projectile, ProjectileState};
use crate::clock::Millis;
use crate::constants::GRAVITY;
use crate::container::FrameContext;
use crate::rigidbody::{overlaps, rect, Facing};
use crate::skill::SkillType;

const EMBER_LIFETIME_MS: Millis = 3000;
const SLASH_LIFETIME_MS: Millis = 250;
const SHOCKWAVE_LIFETIME_MS: Millis = 2000;
const METEOR_LIFETIME_MS: Millis = 4000;
const TORNADO_LIFETIME_MS: Millis = 2000;

const METEOR_ALTITUDE: i32 = 600_000;
const METEOR_SPACING: i32 = 150_000;
const METEOR_DELAY_MS: Millis = 250;

/// Caster-relative emission point of most kinds (chest height)
const CHEST: i32 = 80_000;

/// One projectile emitted by a cast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shot {
    /// Emission time relative to spell start
    pub offset: Millis,
    /// Activation delay after emission
    pub delay: Millis,
    /// Emission point relative to the caster's position, facing right
    pub origin: IVec2,
    /// Initial velocity, facing right
    pub velocity: IVec2,
}

impl Shot {
    const fn at(offset: Millis, origin: IVec2, velocity: IVec2) -> Self {
        Self {
            offset,
            delay: 0,
            origin,
            velocity,
        }
    }

    /// Build the projectile for a caster at `caster` facing `facing`,
    /// emitted at `emitted_at`
    pub fn launch(
        &self,
        skill: SkillType,
        level: i32,
        caster: IVec2,
        facing: Facing,
        emitted_at: Millis,
    ) -> Projectile {
        let sign = facing.sign();
        let origin = IVec2::new(self.origin.x * sign, self.origin.y);
        let velocity = IVec2::new(self.velocity.x * sign, self.velocity.y);
        // a shot emitted straight up or down keeps the caster's facing
        let facing = Facing::from_sign(velocity.x, facing);
        Projectile::new(
            skill,
            level,
            caster + origin,
            velocity,
            facing,
            emitted_at + self.delay,
        )
    }
}

/// Shots emitted by one cast of `skill`; `intensified` selects the widened
/// pattern of a flush bonus
pub fn cast_pattern(skill: SkillType, intensified: bool) -> Vec<Shot> {
    match (skill, intensified) {
        (SkillType::Ember, false) => vec![Shot::at(100, IVec2::new(40_000, CHEST), IVec2::new(600, 900))],
        (SkillType::Ember, true) => [700, 900, 1100]
            .into_iter()
            .map(|vy| Shot::at(100, IVec2::new(40_000, CHEST), IVec2::new(600, vy)))
            .collect(),
        (SkillType::Arrow, false) => vec![Shot::at(50, IVec2::new(50_000, CHEST), IVec2::new(1200, 0))],
        (SkillType::Arrow, true) => [-30_000, 0, 30_000]
            .into_iter()
            .map(|dy| Shot::at(50, IVec2::new(50_000, CHEST + dy), IVec2::new(1200, 0)))
            .collect(),
        (SkillType::Slash, false) => vec![Shot::at(80, IVec2::ZERO, IVec2::ZERO)],
        (SkillType::Slash, true) => vec![
            Shot::at(80, IVec2::ZERO, IVec2::ZERO),
            Shot::at(180, IVec2::ZERO, IVec2::ZERO),
        ],
        (SkillType::Shockwave, false) => vec![Shot::at(120, IVec2::new(40_000, 0), IVec2::new(700, 0))],
        (SkillType::Shockwave, true) => vec![
            Shot::at(120, IVec2::new(40_000, 0), IVec2::new(700, 0)),
            Shot::at(120, IVec2::new(-40_000, 0), IVec2::new(-700, 0)),
        ],
        (SkillType::Meteor, intensified) => {
            let count = if intensified { 5 } else { 3 };
            (0..count)
                .map(|i| Shot {
                    offset: 100,
                    delay: i as Millis * METEOR_DELAY_MS,
                    origin: IVec2::new(200_000 + i * METEOR_SPACING, METEOR_ALTITUDE),
                    velocity: IVec2::new(150, -300),
                })
                .collect()
        }
        (SkillType::Tornado, false) => vec![Shot::at(150, IVec2::new(60_000, 0), IVec2::new(250, 0))],
        (SkillType::Tornado, true) => vec![
            Shot::at(150, IVec2::new(60_000, 0), IVec2::new(250, 0)),
            Shot {
                delay: 500,
                ..Shot::at(150, IVec2::new(60_000, 0), IVec2::new(250, 0))
            },
        ],
    }
}

pub(super) fn visual_key(skill: SkillType) -> &'static str {
    match skill {
        SkillType::Ember => "projectile/ember",
        SkillType::Arrow => "projectile/arrow",
        SkillType::Slash => "projectile/slash",
        SkillType::Shockwave => "projectile/shockwave",
        SkillType::Meteor => "projectile/meteor",
        SkillType::Tornado => "projectile/tornado",
    }
}

/// Collision shape relative to the projectile position
pub(super) fn local_range(skill: SkillType, facing: Facing) -> IRect {
    let right = match skill {
        SkillType::Ember => rect(-20_000, -20_000, 20_000, 20_000),
        SkillType::Arrow => rect(-30_000, -8_000, 30_000, 8_000),
        SkillType::Slash => rect(0, 0, 160_000, 150_000),
        SkillType::Shockwave => rect(-40_000, 0, 40_000, 60_000),
        SkillType::Meteor => rect(-50_000, 0, 50_000, 100_000),
        SkillType::Tornado => rect(-60_000, 0, 60_000, 200_000),
    };
    match facing {
        Facing::Right => right,
        Facing::Left => rect(-right.max.x, right.min.y, -right.min.x, right.max.y),
    }
}

pub(super) fn acceleration(skill: SkillType) -> IVec2 {
    match skill {
        SkillType::Arrow | SkillType::Slash => IVec2::ZERO,
        _ => IVec2::new(0, GRAVITY),
    }
}

fn lifetime(skill: SkillType) -> Option<Millis> {
    match skill {
        SkillType::Ember => Some(EMBER_LIFETIME_MS),
        SkillType::Slash => Some(SLASH_LIFETIME_MS),
        SkillType::Shockwave => Some(SHOCKWAVE_LIFETIME_MS),
        SkillType::Meteor => Some(METEOR_LIFETIME_MS),
        SkillType::Tornado => Some(TORNADO_LIFETIME_MS),
        SkillType::Arrow => None,
    }
}

fn shockwave_budget(level: i32) -> u32 {
    (3 + level / 3) as u32
}

impl Projectile {
    /// Move by `dt` and apply lifetime rules
    pub(super) fn advance(&mut self, ctx: &mut FrameContext<'_>, dt: Millis) {
        let now = ctx.now;
        match self.state() {
            ProjectileState::Die => return,
            ProjectileState::Stuck => {}
            ProjectileState::Normal | ProjectileState::Boosted => {
                let outcome = ctx.field.integrate(&mut self.body, dt);
                if outcome.landed {
                    match self.skill {
                        SkillType::Ember => {
                            self.body.set_state(ProjectileState::Stuck, now);
                            self.body.velocity = IVec2::ZERO;
                            self.body.acceleration = IVec2::ZERO;
                        }
                        SkillType::Meteor => self.die(now),
                        _ => {}
                    }
                }
                if ctx.field.is_outside_x(&self.body.global_range()) {
                    self.die(now);
                }
            }
        }
        if let Some(lifetime) = lifetime(self.skill) {
            if now - self.created_at >= lifetime {
                self.die(now);
            }
        }
    }

    /// Damage and knockback dealt to a target occupying `target`
    pub(super) fn strike(&self, target: &IRect) -> (i32, IVec2) {
        let level = self.level;
        let sign = self.body.facing.sign();
        match self.skill {
            SkillType::Ember => match self.state() {
                ProjectileState::Stuck => ((20 + 6 * level) / 2, IVec2::new(200 * sign, 300)),
                _ => (20 + 6 * level, IVec2::new(400 * sign, 600)),
            },
            SkillType::Arrow => (15 + 5 * level, IVec2::new(500 * sign, 300)),
            SkillType::Slash => {
                let range = self.body.global_range();
                let slice = (range.max.y - range.min.y) / 3;
                let top = rect(range.min.x, range.max.y - slice, range.max.x, range.max.y);
                if overlaps(&top, target) {
                    (30 + 8 * level, IVec2::new(200 * sign, 1200))
                } else {
                    (20 + 6 * level, IVec2::new(600 * sign, 200))
                }
            }
            SkillType::Shockwave => (18 + 5 * level, IVec2::new(300 * sign, 800)),
            SkillType::Meteor => (35 + 7 * level, IVec2::new(300 * sign, 700)),
            SkillType::Tornado => (8 + 3 * level, IVec2::new(0, 900)),
        }
    }

    /// Kind-specific reaction to a landed hit
    pub(super) fn after_hit(&mut self, now: Millis) {
        match (self.skill, self.state()) {
            (SkillType::Arrow, ProjectileState::Normal) => {
                self.body.set_state(ProjectileState::Boosted, now);
                self.body.velocity *= 2;
            }
            (SkillType::Arrow, ProjectileState::Boosted) => self.die(now),
            (SkillType::Shockwave, _) if self.hits >= shockwave_budget(self.level) => self.die(now),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Collidable;
    use crate::container::SimEntity;
    use crate::monster::{Monster, MonsterId, MonsterState, Species};
    use crate::physics::PlayField;
    use crate::random::{seeded, SimRng};

    fn field() -> PlayField {
        PlayField::new(0, 2_000_000, 0, vec![rect(0, -50_000, 2_000_000, 0)])
    }

    fn step(p: &mut Projectile, field: &PlayField, rng: &mut SimRng, now: Millis, dt: Millis) {
        let mut ctx = FrameContext {
            now,
            dt,
            field,
            rng,
        };
        p.frame_move(&mut ctx);
    }

    /// A monster standing in the field, already past its entry
    fn monster_at(id: u64, x: i32) -> Monster {
        let field = field();
        let mut rng = seeded(id);
        let mut monster = Monster::spawn(MonsterId(id), Species::Walker, Facing::Left, &field, 0, &mut rng);
        let mut now = 0;
        while monster.state() == MonsterState::Entering {
            now += 16;
            let mut ctx = FrameContext {
                now,
                dt: 16,
                field: &field,
                rng: &mut rng,
            };
            monster.frame_move(&mut ctx);
        }
        monster.body.position.x = x;
        monster
    }

    #[test]
    fn test_left_facing_mirrors_shape() {
        let r = local_range(SkillType::Slash, Facing::Left);
        assert_eq!(r, rect(-160_000, 0, 0, 150_000));
    }

    #[test]
    fn test_activation_integrates_overshoot() {
        let field = field();
        let mut rng = seeded(0);
        let shot = cast_pattern(SkillType::Arrow, false)[0];
        let mut arrow = shot.launch(SkillType::Arrow, 1, IVec2::new(100_000, 0), Facing::Right, 1000);
        arrow.activate(1010);
        step(&mut arrow, &field, &mut rng, 1010, 16);
        // 10 ms of overshoot, not a full frame
        assert_eq!(arrow.body.position.x, 150_000 + 1200 * 10);
        step(&mut arrow, &field, &mut rng, 1026, 16);
        assert_eq!(arrow.body.position.x, 150_000 + 1200 * 26);
    }

    #[test]
    fn test_arrow_boosts_then_dies() {
        let mut arrow = Projectile::new(SkillType::Arrow, 2, IVec2::ZERO, IVec2::new(1200, 0), Facing::Right, 0);
        let mut a = monster_at(1, 500_000);
        let mut b = monster_at(2, 900_000);
        assert!(arrow.on_collided(&mut a, 100).is_some());
        assert_eq!(arrow.state(), ProjectileState::Boosted);
        assert_eq!(arrow.body.velocity.x, 2400);
        assert_eq!(a.hp, a.max_hp - 25);
        assert!(arrow.on_collided(&mut b, 120).is_some());
        assert_eq!(arrow.state(), ProjectileState::Die);
        assert!(!arrow.is_collidable());
    }

    #[test]
    fn test_ledger_blocks_repeat_hits() {
        let mut tornado = Projectile::new(SkillType::Tornado, 1, IVec2::ZERO, IVec2::ZERO, Facing::Right, 0);
        let mut m = monster_at(3, 500_000);
        assert!(tornado.on_collided(&mut m, 0).is_some());
        assert!(tornado.on_collided(&mut m, 999).is_none());
        assert!(tornado.on_collided(&mut m, 1000).is_some());
        assert_eq!(tornado.hits(), 2);
    }

    #[test]
    fn test_ember_sticks_and_halves_damage() {
        let field = field();
        let mut rng = seeded(0);
        let mut ember = Projectile::new(SkillType::Ember, 4, IVec2::new(100_000, 80_000), IVec2::new(600, 900), Facing::Right, 0);
        let mut now = 0;
        while ember.state() == ProjectileState::Normal {
            now += 16;
            step(&mut ember, &field, &mut rng, now, 16);
            assert!(now < EMBER_LIFETIME_MS);
        }
        assert_eq!(ember.state(), ProjectileState::Stuck);
        assert_eq!(ember.body.global_range().min.y, 0);
        let target = ember.body.global_range();
        assert_eq!(ember.strike(&target).0, (20 + 24) / 2);

        step(&mut ember, &field, &mut rng, EMBER_LIFETIME_MS, 16);
        assert_eq!(ember.state(), ProjectileState::Die);
        assert!(!ember.frame(EMBER_LIFETIME_MS));
    }

    #[test]
    fn test_slash_top_slice_uppercuts() {
        let slash = Projectile::new(SkillType::Slash, 1, IVec2::ZERO, IVec2::ZERO, Facing::Right, 0);
        let high = rect(50_000, 120_000, 80_000, 300_000);
        let low = rect(50_000, 0, 80_000, 40_000);
        assert_eq!(slash.strike(&high), (38, IVec2::new(200, 1200)));
        assert_eq!(slash.strike(&low), (26, IVec2::new(600, 200)));
    }

    #[test]
    fn test_shockwave_hit_budget() {
        let mut wave = Projectile::new(SkillType::Shockwave, 3, IVec2::ZERO, IVec2::new(700, 0), Facing::Right, 0);
        for id in 0..3 {
            let mut m = monster_at(10 + id, 500_000);
            assert!(wave.on_collided(&mut m, 10).is_some());
            assert_eq!(wave.state(), ProjectileState::Normal);
        }
        let mut last = monster_at(20, 500_000);
        assert!(wave.on_collided(&mut last, 10).is_some());
        assert_eq!(wave.state(), ProjectileState::Die);
    }

    #[test]
    fn test_meteor_explodes_on_ground() {
        let field = field();
        let mut rng = seeded(0);
        let shots = cast_pattern(SkillType::Meteor, false);
        assert_eq!(shots.len(), 3);
        assert_eq!(shots[2].delay, 2 * METEOR_DELAY_MS);

        let mut meteor = shots[0].launch(SkillType::Meteor, 1, IVec2::new(100_000, 0), Facing::Left, 0);
        assert_eq!(meteor.body.position.x, 100_000 - 200_000);
        meteor.body.position.x = 500_000;
        let mut now = 0;
        while meteor.state() != ProjectileState::Die {
            now += 16;
            step(&mut meteor, &field, &mut rng, now, 16);
            assert!(now < METEOR_LIFETIME_MS, "meteor never landed");
        }
        assert_eq!(meteor.body.position.y, 0);
    }

    #[test]
    fn test_arrow_dies_leaving_field() {
        let field = field();
        let mut rng = seeded(0);
        let mut arrow = Projectile::new(SkillType::Arrow, 1, IVec2::new(1_950_000, 80_000), IVec2::new(1200, 0), Facing::Right, 0);
        step(&mut arrow, &field, &mut rng, 16, 16);
        assert_eq!(arrow.state(), ProjectileState::Normal);
        for i in 2..10 {
            step(&mut arrow, &field, &mut rng, 16 * i, 16);
        }
        assert_eq!(arrow.state(), ProjectileState::Die);
    }
}
