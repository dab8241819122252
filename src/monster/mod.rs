//! Monsters: shared state machine over four species.
//!
//! `Entering` -> `Normal` -> `Hit` -> ... -> `Die`. A monster spawns just
//! outside a field edge and walks in; it becomes `Normal` (and collidable)
//! once its global range lies fully inside the field. Species only differ
//! in their `Normal` behaviour, see [`species`].

use bevy::math::{IRect, IVec2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::Millis;
use crate::collision::Collidable;
use crate::constants::{
    GRAVITY, KNOCKBACK_DRAG_DIVISOR, MONSTER_DIE_MS, MONSTER_HIT_GUARD_MS, MONSTER_HIT_MS,
    PREV_HP_SMOOTHING,
};
use crate::container::{FrameContext, SimEntity};
use crate::physics::PlayField;
use crate::rigidbody::{rect, Facing, Rigidbody};

pub mod species;

pub use species::{Species, SpeciesStats};
use species::{spawn_altitude, Behavior};

/// Monotonically assigned monster identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonsterState {
    /// Walking in from outside the field; not collidable
    Entering,
    Normal,
    Hit,
    /// Death timer running; not collidable
    Die,
}

/// What a call to [`Monster::damage`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The monster cannot take damage right now
    Ignored,
    /// Damage taken, knockback (re)started
    Hit,
    /// Damage taken inside the hit guard window, knockback kept
    Absorbed,
    Died,
}

impl DamageOutcome {
    pub fn landed(self) -> bool {
        !matches!(self, DamageOutcome::Ignored)
    }
}

#[derive(Debug, Clone)]
pub struct Monster {
    pub body: Rigidbody<MonsterState>,
    pub id: MonsterId,
    pub species: Species,
    pub hp: i32,
    pub max_hp: i32,
    /// Trails `hp`, smoothed once per frame
    pub prev_hp: i32,
    /// Velocity of the last knockback taken
    pub knockback: IVec2,
    behavior: Behavior,
    grounded: bool,
}

impl Monster {
    /// Place a new monster just outside the `side` edge of the field,
    /// facing inward
    pub fn spawn<R: Rng>(
        id: MonsterId,
        species: Species,
        side: Facing,
        field: &PlayField,
        now: Millis,
        rng: &mut R,
    ) -> Self {
        let stats = species.stats();
        let (x, facing) = match side {
            Facing::Left => (field.left - stats.half_width, Facing::Right),
            Facing::Right => (field.right + stats.half_width, Facing::Left),
        };
        let y = spawn_altitude(species, field.floor, rng);
        let mut body = Rigidbody::new(
            IVec2::new(x, y),
            rect(-stats.half_width, 0, stats.half_width, stats.height),
            MonsterState::Entering,
            now,
        );
        body.facing = facing;
        body.velocity = IVec2::new(stats.entry_speed * facing.sign(), 0);

        Self {
            body,
            id,
            species,
            hp: stats.max_hp,
            max_hp: stats.max_hp,
            prev_hp: stats.max_hp,
            knockback: IVec2::ZERO,
            behavior: Behavior::new(species),
            grounded: false,
        }
    }

    pub fn state(&self) -> MonsterState {
        self.body.state()
    }

    pub fn is_dying(&self) -> bool {
        self.state() == MonsterState::Die
    }

    pub fn visual_key(&self) -> &'static str {
        self.species.visual_key()
    }

    /// Take `amount` damage with knockback `(vx, vy)`.
    ///
    /// Sets a drag of `-vx / 1000` so the knockback decays to a stop, and
    /// turns to face along the knockback.
    pub fn damage(&mut self, amount: i32, now: Millis, vx: i32, vy: i32) -> DamageOutcome {
        let state = self.state();
        if matches!(state, MonsterState::Entering | MonsterState::Die) {
            return DamageOutcome::Ignored;
        }

        self.hp = (self.hp - amount).max(0);
        if self.hp <= 0 {
            self.body.set_state(MonsterState::Die, now);
            self.apply_knockback(vx, vy);
            self.body.acceleration.y = GRAVITY;
            debug!(id = self.id.0, species = self.species.name(), "monster died");
            return DamageOutcome::Died;
        }

        if state == MonsterState::Hit && self.body.state_time(now) < MONSTER_HIT_GUARD_MS {
            return DamageOutcome::Absorbed;
        }

        self.body.set_state(MonsterState::Hit, now);
        self.apply_knockback(vx, vy);
        DamageOutcome::Hit
    }

    fn apply_knockback(&mut self, vx: i32, vy: i32) {
        let vy = if self.takes_vertical_knockback() { vy } else { 0 };
        self.knockback = IVec2::new(vx, vy);
        self.body.velocity = self.knockback;
        self.body.acceleration.x = -vx / KNOCKBACK_DRAG_DIVISOR;
        self.body.facing = Facing::from_sign(vx, self.body.facing);
    }

    fn enter(&mut self, ctx: &mut FrameContext<'_>) {
        self.body.position = self.body.position_after_move(ctx.dt);
        if ctx.field.contains_x(&self.body.global_range()) {
            self.body.set_state(MonsterState::Normal, ctx.now);
            self.resume_patrol(ctx.now, ctx.rng);
            debug!(id = self.id.0, species = self.species.name(), "monster entered field");
        }
    }
}

impl SimEntity for Monster {
    fn frame_move(&mut self, ctx: &mut FrameContext<'_>) {
        match self.state() {
            MonsterState::Entering => self.enter(ctx),
            MonsterState::Normal => self.patrol(ctx),
            MonsterState::Hit => {
                let outcome = ctx.field.integrate_bounded(&mut self.body, ctx.dt);
                self.grounded = outcome.landed;
                if self
                    .body
                    .set_state_if_time_over(MonsterState::Normal, ctx.now, MONSTER_HIT_MS)
                {
                    self.resume_patrol(ctx.now, ctx.rng);
                }
            }
            MonsterState::Die => {
                ctx.field.integrate_bounded(&mut self.body, ctx.dt);
            }
        }
    }

    fn frame(&mut self, now: Millis) -> bool {
        self.prev_hp = (self.prev_hp * PREV_HP_SMOOTHING + self.hp) / (PREV_HP_SMOOTHING + 1);
        !(self.is_dying() && self.body.state_time(now) >= MONSTER_DIE_MS)
    }
}

impl Collidable for Monster {
    fn global_range(&self) -> IRect {
        self.body.global_range()
    }

    fn is_collidable(&self) -> bool {
        matches!(self.state(), MonsterState::Normal | MonsterState::Hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded;

    fn field() -> PlayField {
        PlayField::new(0, 1_000_000, 0, vec![rect(-100_000, -50_000, 1_100_000, 0)])
    }

    fn step(monster: &mut Monster, field: &PlayField, now: Millis, dt: Millis) {
        let mut rng = seeded(3);
        let mut ctx = FrameContext {
            now,
            dt,
            field,
            rng: &mut rng,
        };
        monster.frame_move(&mut ctx);
    }

    fn entered(species: Species) -> Monster {
        let field = field();
        let mut rng = seeded(1);
        let mut monster = Monster::spawn(MonsterId(1), species, Facing::Left, &field, 0, &mut rng);
        let mut now = 0;
        while monster.state() == MonsterState::Entering {
            now += 16;
            step(&mut monster, &field, now, 16);
            assert!(now < 10_000, "monster never entered");
        }
        monster
    }

    #[test]
    fn test_spawn_outside_and_not_collidable() {
        let field = field();
        let mut rng = seeded(1);
        let monster = Monster::spawn(MonsterId(7), Species::Walker, Facing::Right, &field, 0, &mut rng);
        assert!(field.is_outside_x(&monster.global_range()));
        assert_eq!(monster.body.facing, Facing::Left);
        assert!(!monster.is_collidable());
    }

    #[test]
    fn test_enters_field_then_collidable() {
        let monster = entered(Species::Walker);
        assert_eq!(monster.state(), MonsterState::Normal);
        assert!(field().contains_x(&monster.global_range()));
        assert!(monster.is_collidable());
        assert_eq!(monster.body.velocity.x, Species::Walker.stats().speed);
    }

    #[test]
    fn test_damage_hit_then_die() {
        let mut monster = entered(Species::Hopper);
        let now = monster.body.state_started_at();
        assert_eq!(monster.damage(10, now, -600, 200), DamageOutcome::Hit);
        assert_eq!(monster.hp, 50);
        assert_eq!(monster.body.facing, Facing::Left);
        assert_eq!(monster.body.acceleration.x, 0);
        assert_eq!(monster.knockback, IVec2::new(-600, 200));

        assert_eq!(monster.damage(10, now + 100, 2000, 0), DamageOutcome::Absorbed);
        assert_eq!(monster.body.velocity.x, -600);
        assert_eq!(monster.damage(10, now + 300, 2000, 0), DamageOutcome::Hit);
        assert_eq!(monster.body.acceleration.x, -2);

        assert_eq!(monster.damage(100, now + 400, 0, 0), DamageOutcome::Died);
        assert_eq!(monster.hp, 0);
        assert!(!monster.is_collidable());
        assert_eq!(monster.damage(1, now + 500, 0, 0), DamageOutcome::Ignored);
    }

    #[test]
    fn test_hit_returns_to_normal() {
        let field = field();
        let mut monster = entered(Species::Walker);
        let start = monster.body.state_started_at();
        monster.damage(1, start, 500, 0);
        step(&mut monster, &field, start + MONSTER_HIT_MS - 1, 16);
        assert_eq!(monster.state(), MonsterState::Hit);
        step(&mut monster, &field, start + MONSTER_HIT_MS + 7, 16);
        assert_eq!(monster.state(), MonsterState::Normal);
        assert_eq!(monster.body.state_started_at(), start + MONSTER_HIT_MS);
    }

    #[test]
    fn test_dies_after_timer() {
        let mut monster = entered(Species::Drifter);
        let t = monster.body.state_started_at();
        monster.damage(1000, t, 0, 0);
        assert!(monster.frame(t + MONSTER_DIE_MS - 1));
        assert!(!monster.frame(t + MONSTER_DIE_MS));
    }

    #[test]
    fn test_prev_hp_trails_without_overshoot() {
        let mut monster = entered(Species::Walker);
        let t = monster.body.state_started_at();
        monster.damage(60, t, 0, 0);
        let mut last = monster.prev_hp;
        for _ in 0..500 {
            monster.frame(t);
            assert!(monster.prev_hp <= last);
            assert!(monster.prev_hp >= monster.hp);
            last = monster.prev_hp;
        }
    }

    #[test]
    fn test_faller_rests_on_first_landing() {
        let field = field();
        let mut monster = entered(Species::Faller);
        let mut now = monster.body.state_started_at();
        for _ in 0..400 {
            now += 16;
            step(&mut monster, &field, now, 16);
        }
        assert_eq!(monster.body.position.y, 0);
        assert_eq!(monster.body.velocity, IVec2::ZERO);
        assert!(!monster.takes_vertical_knockback());
    }

    #[test]
    fn test_walker_turns_at_edge() {
        let field = field();
        let mut monster = entered(Species::Walker);
        let mut now = monster.body.state_started_at();
        let mut turned = false;
        for _ in 0..1000 {
            now += 16;
            step(&mut monster, &field, now, 16);
            assert!(field.contains_x(&monster.global_range()));
            if monster.body.facing == Facing::Left {
                turned = true;
                break;
            }
        }
        assert!(turned);
        assert!(monster.body.velocity.x < 0);
    }

    #[test]
    fn test_hopper_hops_when_timer_due() {
        let field = field();
        let mut monster = entered(Species::Hopper);
        let Behavior::Hopper { next_hop_at } = monster.behavior else {
            panic!("hopper without hop timer");
        };
        let mut now = monster.body.state_started_at();
        while now + 16 < next_hop_at {
            now += 16;
            step(&mut monster, &field, now, 16);
            assert!(monster.grounded);
            assert_eq!(monster.body.position.y, 0);
        }

        let dt = next_hop_at - now;
        step(&mut monster, &field, next_hop_at, dt);
        assert!(!monster.grounded);
        assert_eq!(monster.body.velocity.y, species::HOP_VELOCITY + GRAVITY * dt as i32);
        assert!(monster.body.position.y > 0);
        let Behavior::Hopper { next_hop_at: rescheduled } = monster.behavior else {
            unreachable!()
        };
        assert!(rescheduled > next_hop_at);
    }

    #[test]
    fn test_drifter_glides_to_new_altitude() {
        let field = field();
        let mut monster = entered(Species::Drifter);
        let Behavior::Drifter { next_move_at, .. } = monster.behavior else {
            panic!("drifter without move timer");
        };
        let altitude = monster.body.position.y;
        let mut now = monster.body.state_started_at();
        while now + 16 < next_move_at {
            now += 16;
            step(&mut monster, &field, now, 16);
            assert_eq!(monster.body.position.y, altitude);
        }
        let dt = next_move_at - now;
        now = next_move_at;
        step(&mut monster, &field, now, dt);

        let Behavior::Drifter { next_move_at: redraw_at, target_y } = monster.behavior else {
            unreachable!()
        };
        let (low, high) = species::DRIFT_ALTITUDE;
        assert!((field.floor + low..=field.floor + high).contains(&target_y));
        assert!(redraw_at > next_move_at);

        let side = (target_y - monster.body.position.y).signum();
        let initial = (target_y - monster.body.position.y).abs();
        let mut last = initial;
        while now + 16 < redraw_at {
            now += 16;
            step(&mut monster, &field, now, 16);
            let offset = target_y - monster.body.position.y;
            assert!(offset.signum() == side || offset == 0, "overshot {target_y}");
            assert!(offset.abs() <= last);
            last = offset.abs();
        }
        assert!(last <= initial / 5 || last < species::DRIFT_SMOOTHING_MS);
    }
}
