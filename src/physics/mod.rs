//! Playfield geometry and integration.
//!
//! The field is a horizontal band `[left, right]` plus an ordered list of
//! static ground segments. Bodies integrate under constant acceleration
//! and are clamped onto the top surface of any segment their bottom edge
//! passes through on the way down. Upward motion is never clamped, so
//! platforms can be jumped through from below.

use bevy::math::{IRect, IVec2};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::clock::Millis;
use crate::rigidbody::{translate, Rigidbody};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayField {
    pub left: i32,
    pub right: i32,
    /// Height at which ground-walking monsters enter the field
    pub floor: i32,
    segments: Vec<IRect>,
}

/// Result of one integration step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// A ground segment stopped the fall this step
    pub landed: bool,
    /// The body was pushed back inside the field X bounds
    pub hit_wall: bool,
}

impl PlayField {
    pub fn new(left: i32, right: i32, floor: i32, segments: Vec<IRect>) -> Self {
        assert!(right > left, "field right edge must lie right of the left edge");
        Self {
            left,
            right,
            floor,
            segments,
        }
    }

    pub fn segments(&self) -> &[IRect] {
        &self.segments
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// `range` lies entirely within the field X bounds
    pub fn contains_x(&self, range: &IRect) -> bool {
        range.min.x >= self.left && range.max.x <= self.right
    }

    /// `range` lies entirely outside the field X bounds
    pub fn is_outside_x(&self, range: &IRect) -> bool {
        range.max.x <= self.left || range.min.x >= self.right
    }

    /// Resolve a downward move of a bottom edge spanning `[left, right]`.
    ///
    /// Returns the highest segment top lying within `[target_y, start_y]`
    /// among segments that overlap the span horizontally.
    pub fn resolve_fall(&self, left: i32, right: i32, start_y: i32, target_y: i32) -> Option<i32> {
        self.segments
            .iter()
            .filter(|seg| seg.min.x < right && left < seg.max.x)
            .map(|seg| seg.max.y)
            .filter(|&top| target_y <= top && top <= start_y)
            .max()
    }

    /// Highest segment top under the horizontal span, if any
    pub fn ground_below(&self, left: i32, right: i32, y: i32) -> Option<i32> {
        self.resolve_fall(left, right, y, i32::MIN)
    }

    /// Advance `body` by `dt` against the ground.
    ///
    /// Horizontal acceleration is only ever drag: once it would flip the
    /// sign of the velocity, both are zeroed.
    pub fn integrate<S: Copy + PartialEq + Debug>(
        &self,
        body: &mut Rigidbody<S>,
        dt: Millis,
    ) -> MoveOutcome {
        let before = body.velocity;
        let mut velocity = body.velocity_after_move(dt);
        if body.acceleration.x != 0 && before.x != 0 && velocity.x.signum() != before.x.signum()
        {
            velocity.x = 0;
            body.acceleration.x = 0;
        }
        body.velocity = velocity;

        let target = body.position_after_move(dt);
        let start_bottom = body.global_range().min.y;
        let moved = translate(body.range, target);
        body.position.x = target.x;

        let mut outcome = MoveOutcome::default();
        match self.resolve_fall(moved.min.x, moved.max.x, start_bottom, moved.min.y) {
            Some(top) if top != moved.min.y => {
                body.position.y = top - body.range.min.y;
                body.velocity.y = 0;
                outcome.landed = true;
            }
            _ => body.position.y = target.y,
        }
        outcome
    }

    /// Push `body` back inside the field X bounds
    pub fn clamp_x<S: Copy + PartialEq + Debug>(&self, body: &mut Rigidbody<S>) -> bool {
        let range = body.global_range();
        let shift = if range.min.x < self.left {
            self.left - range.min.x
        } else if range.max.x > self.right {
            self.right - range.max.x
        } else {
            0
        };
        body.position += IVec2::new(shift, 0);
        shift != 0
    }

    /// Integrate, then keep the body inside the field
    pub fn integrate_bounded<S: Copy + PartialEq + Debug>(
        &self,
        body: &mut Rigidbody<S>,
        dt: Millis,
    ) -> MoveOutcome {
        let mut outcome = self.integrate(body, dt);
        outcome.hit_wall = self.clamp_x(body);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rigidbody::rect;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Idle;

    fn field(segments: Vec<IRect>) -> PlayField {
        PlayField::new(0, 1_000_000, 0, segments)
    }

    #[test]
    fn test_resolve_picks_highest_qualifying_top() {
        let f = field(vec![
            rect(0, -100, 1000, 0),
            rect(0, 0, 1000, 500),
            rect(0, 0, 1000, 2000),
        ]);
        assert_eq!(f.resolve_fall(10, 20, 1000, -50), Some(500));
        assert_eq!(f.resolve_fall(10, 20, 3000, -50), Some(2000));
    }

    #[test]
    fn test_resolve_ignores_upward_and_disjoint() {
        let f = field(vec![rect(0, 0, 1000, 500)]);
        assert_eq!(f.resolve_fall(10, 20, 400, 600), None);
        assert_eq!(f.resolve_fall(1000, 1200, 600, 0), None);
    }

    #[test]
    fn test_integrate_lands_on_segment() {
        let f = field(vec![rect(0, -1000, 1_000_000, 0)]);
        let mut body = Rigidbody::new(IVec2::new(500, 10_000), rect(-10, 0, 10, 50), Idle, 0);
        body.acceleration = IVec2::new(0, -10);

        let outcome = f.integrate(&mut body, 100);
        assert!(outcome.landed);
        assert_eq!(body.position.y, 0);
        assert_eq!(body.velocity.y, 0);
    }

    #[test]
    fn test_long_step_keeps_resting_body_on_ground() {
        let f = field(vec![rect(-100_000, -50_000, 1_100_000, 0)]);
        let mut body = Rigidbody::new(IVec2::new(500_000, 0), rect(-35_000, 0, 35_000, 160_000), Idle, 0);
        body.acceleration = IVec2::new(0, crate::constants::GRAVITY);

        let outcome = f.integrate_bounded(&mut body, 40_000);
        assert!(outcome.landed);
        assert!(!outcome.hit_wall);
        assert_eq!(body.position, IVec2::new(500_000, 0));
        assert_eq!(body.velocity.y, 0);
    }

    #[test]
    fn test_jump_passes_through_platform_from_below() {
        let f = field(vec![rect(0, 900, 1000, 1000)]);
        let mut body = Rigidbody::new(IVec2::new(500, 0), rect(-10, 0, 10, 50), Idle, 0);
        body.velocity = IVec2::new(0, 30);
        let outcome = f.integrate(&mut body, 50);
        assert!(!outcome.landed);
        assert_eq!(body.position.y, 1500);
    }

    #[test]
    fn test_drag_stops_at_zero() {
        let f = field(vec![]);
        let mut body = Rigidbody::new(IVec2::new(500, 0), rect(-10, 0, 10, 50), Idle, 0);
        body.velocity = IVec2::new(1000, 0);
        body.acceleration = IVec2::new(-1, 0);
        f.integrate(&mut body, 600);
        assert_eq!(body.velocity.x, 400);
        f.integrate(&mut body, 600);
        assert_eq!(body.velocity.x, 0);
        assert_eq!(body.acceleration.x, 0);
    }

    #[test]
    fn test_clamp_x() {
        let f = PlayField::new(0, 1000, 0, vec![]);
        let mut body = Rigidbody::new(IVec2::new(995, 0), rect(-10, 0, 10, 50), Idle, 0);
        assert!(f.clamp_x(&mut body));
        assert_eq!(body.position.x, 990);
        assert!(f.contains_x(&body.global_range()));
    }
}
