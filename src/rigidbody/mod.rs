//! Shared rigidbody and timed-state record.
//!
//! Every dynamic object (character, monster, projectile, item) carries a
//! `Rigidbody<S>` where `S` is its own state tag. The body owns integer
//! position/velocity/acceleration, a collision rectangle in entity-local
//! space and the clock time at which the current state began.
//!
//! The world-space rectangle is always derived from the local one and the
//! position; it is never stored.

use bevy::math::{IRect, IVec2, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::clock::Millis;
use crate::constants::{WORLD_LIMIT, WORLD_SCALE};

/// Horizontal facing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Facing for a signed horizontal quantity; zero keeps `fallback`
    pub fn from_sign(value: i32, fallback: Facing) -> Self {
        match value.signum() {
            -1 => Facing::Left,
            1 => Facing::Right,
            _ => fallback,
        }
    }
}

/// Translate a rectangle by an offset
#[inline]
pub fn translate(rect: IRect, by: IVec2) -> IRect {
    IRect {
        min: rect.min + by,
        max: rect.max + by,
    }
}

/// Strict AABB overlap: touching edges do not count
#[inline]
pub fn overlaps(a: &IRect, b: &IRect) -> bool {
    a.min.x < b.max.x && b.min.x < a.max.x && a.min.y < b.max.y && b.min.y < a.max.y
}

/// Rectangle from `left bottom right top`
#[inline]
pub fn rect(left: i32, bottom: i32, right: i32, top: i32) -> IRect {
    IRect {
        min: IVec2::new(left, bottom),
        max: IVec2::new(right, top),
    }
}

/// Fixed-point world position in render units
#[inline]
pub fn to_render(position: IVec2) -> Vec2 {
    position.as_vec2() / WORLD_SCALE as f32
}

/// Clamp an integrated coordinate into `[-WORLD_LIMIT, WORLD_LIMIT]`
#[inline]
fn saturate(value: i64) -> i32 {
    value.clamp(-(WORLD_LIMIT as i64), WORLD_LIMIT as i64) as i32
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rigidbody<S> {
    pub position: IVec2,
    pub velocity: IVec2,
    pub acceleration: IVec2,
    /// Collision rectangle relative to `position`
    pub range: IRect,
    pub facing: Facing,
    state: S,
    state_started_at: Millis,
}

impl<S: Copy + PartialEq + Debug> Rigidbody<S> {
    pub fn new(position: IVec2, range: IRect, state: S, now: Millis) -> Self {
        Self {
            position,
            velocity: IVec2::ZERO,
            acceleration: IVec2::ZERO,
            range,
            facing: Facing::default(),
            state,
            state_started_at: now,
        }
    }

    /// Collision rectangle in world coordinates
    #[inline]
    pub fn global_range(&self) -> IRect {
        translate(self.range, self.position)
    }

    /// `velocity + acceleration * dt`, saturating at [`WORLD_LIMIT`]
    pub fn velocity_after_move(&self, dt: Millis) -> IVec2 {
        let axis =
            |v: i32, a: i32| -> i32 { saturate((v as i64).saturating_add((a as i64).saturating_mul(dt))) };
        IVec2::new(
            axis(self.velocity.x, self.acceleration.x),
            axis(self.velocity.y, self.acceleration.y),
        )
    }

    /// `position + (velocity - acceleration * dt / 2) * dt`
    ///
    /// `velocity` is the end-of-step velocity, so the result is the exact
    /// displacement under constant acceleration over `dt`. Long steps
    /// saturate at [`WORLD_LIMIT`] instead of wrapping.
    pub fn position_after_move(&self, dt: Millis) -> IVec2 {
        let axis = |p: i32, v: i32, a: i32| -> i32 {
            let half_dv = (a as i64).saturating_mul(dt) / 2;
            let displacement = (v as i64).saturating_sub(half_dv).saturating_mul(dt);
            saturate((p as i64).saturating_add(displacement))
        };
        IVec2::new(
            axis(self.position.x, self.velocity.x, self.acceleration.x),
            axis(self.position.y, self.velocity.y, self.acceleration.y),
        )
    }

    #[inline]
    pub fn state(&self) -> S {
        self.state
    }

    #[inline]
    pub fn state_started_at(&self) -> Millis {
        self.state_started_at
    }

    /// Time spent in the current state
    #[inline]
    pub fn state_time(&self, now: Millis) -> Millis {
        now - self.state_started_at
    }

    pub fn set_state(&mut self, state: S, now: Millis) {
        self.state = state;
        self.state_started_at = now;
    }

    /// Enter `state` as if it had started at `start`, which must not be in
    /// the future
    pub fn set_state_at(&mut self, state: S, start: Millis, now: Millis) {
        assert!(
            start <= now,
            "state {state:?} cannot start in the future ({start} > {now})"
        );
        self.state = state;
        self.state_started_at = start;
    }

    /// Move to `state` once the current one has lasted `elapsed`.
    ///
    /// The new start time is the old one plus exactly `elapsed`, so chains
    /// of timed states keep their remainder instead of drifting to `now`.
    pub fn set_state_if_time_over(&mut self, state: S, now: Millis, elapsed: Millis) -> bool {
        if self.state_time(now) < elapsed {
            return false;
        }
        self.state = state;
        self.state_started_at += elapsed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Phase {
        A,
        B,
    }

    fn body() -> Rigidbody<Phase> {
        Rigidbody::new(IVec2::new(1000, 2000), rect(-10, 0, 10, 40), Phase::A, 0)
    }

    #[test]
    fn test_global_range_translates_local() {
        let mut b = body();
        assert_eq!(b.global_range(), rect(990, 2000, 1010, 2040));
        b.position = IVec2::new(-5, 7);
        assert_eq!(b.global_range(), rect(-15, 7, 5, 47));
    }

    #[test]
    fn test_position_after_move_exact_integral() {
        let mut b = body();
        b.velocity = IVec2::new(3, 0);
        b.acceleration = IVec2::new(0, -10);
        let dt = 100;
        b.velocity = b.velocity_after_move(dt);
        assert_eq!(b.velocity, IVec2::new(3, -1000));
        // p + v0*dt + a*dt^2/2
        assert_eq!(b.position_after_move(dt), IVec2::new(1300, 2000 - 50_000));
    }

    #[test]
    fn test_long_step_saturates() {
        let mut b = body();
        b.acceleration = IVec2::new(0, -4);
        let dt = 40_000;
        b.velocity = b.velocity_after_move(dt);
        assert_eq!(b.velocity.y, -160_000);
        assert_eq!(b.position_after_move(dt).y, -WORLD_LIMIT);

        b.velocity = IVec2::new(i32::MAX, 0);
        b.acceleration = IVec2::new(i32::MAX, 0);
        assert_eq!(b.velocity_after_move(i64::MAX).x, WORLD_LIMIT);
        b.acceleration = IVec2::ZERO;
        assert_eq!(b.position_after_move(1_000_000).x, WORLD_LIMIT);
    }

    #[test]
    fn test_state_if_time_over_preserves_remainder() {
        let mut b = body();
        assert!(!b.set_state_if_time_over(Phase::B, 299, 300));
        assert_eq!(b.state(), Phase::A);
        assert_eq!(b.state_started_at(), 0);

        assert!(b.set_state_if_time_over(Phase::B, 317, 300));
        assert_eq!(b.state(), Phase::B);
        assert_eq!(b.state_started_at(), 300);
        assert_eq!(b.state_time(317), 17);
    }

    #[test]
    #[should_panic]
    fn test_future_state_start_rejected() {
        let mut b = body();
        b.set_state_at(Phase::B, 50, 10);
    }

    #[test]
    fn test_overlap_is_strict() {
        let a = rect(0, 0, 10, 10);
        assert!(overlaps(&a, &rect(9, 9, 20, 20)));
        assert!(!overlaps(&a, &rect(10, 0, 20, 10)));
        assert!(!overlaps(&a, &rect(0, 10, 10, 20)));
    }

    #[test]
    fn test_to_render_scales_down() {
        assert_eq!(to_render(IVec2::new(1_200_000, -35_500)), Vec2::new(1200.0, -35.5));
        assert_eq!(to_render(IVec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_facing_from_sign() {
        assert_eq!(Facing::from_sign(-4, Facing::Right), Facing::Left);
        assert_eq!(Facing::from_sign(0, Facing::Left), Facing::Left);
        assert_eq!(Facing::Left.flipped(), Facing::Right);
    }
}
