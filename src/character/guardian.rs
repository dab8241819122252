//! Orbiting guardian hit zones granted by pair bonuses.
//!
//! Guardians circle the character's center and damage monsters they touch,
//! without knockback, each gated by its own hit ledger.

use std::f64::consts::TAU;

use bevy::math::{IRect, IVec2};

use crate::clock::Millis;
use crate::collision::Collidable;
use crate::constants::{GUARDIAN_HALF_SIZE, GUARDIAN_ORBIT_RADIUS, GUARDIAN_PERIOD_MS};
use crate::projectile::HitLedger;
use crate::rigidbody::rect;

#[derive(Debug, Clone)]
pub struct Guardian {
    /// Evenly spaced phase index among `count` guardians
    index: usize,
    count: usize,
    range: IRect,
    pub ledger: HitLedger,
}

impl Guardian {
    pub fn new(index: usize, count: usize) -> Self {
        Self {
            index,
            count,
            range: rect(0, 0, 0, 0),
            ledger: HitLedger::default(),
        }
    }

    /// Orbit offset from the center at `now`
    pub fn offset(&self, now: Millis) -> IVec2 {
        let turn = now.rem_euclid(GUARDIAN_PERIOD_MS) as f64 / GUARDIAN_PERIOD_MS as f64;
        let angle = TAU * (turn + self.index as f64 / self.count as f64);
        let radius = GUARDIAN_ORBIT_RADIUS as f64;
        IVec2::new(
            (radius * angle.cos()).round() as i32,
            (radius * angle.sin()).round() as i32,
        )
    }

    /// Move the hit zone around `center` and drop expired ledger entries
    pub fn update(&mut self, center: IVec2, now: Millis) {
        let at = center + self.offset(now);
        let h = GUARDIAN_HALF_SIZE;
        self.range = rect(at.x - h, at.y - h, at.x + h, at.y + h);
        self.ledger.prune(now);
    }
}

impl Collidable for Guardian {
    fn global_range(&self) -> IRect {
        self.range
    }

    fn is_collidable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monster::MonsterId;

    #[test]
    fn test_orbit_radius_and_phase() {
        let a = Guardian::new(0, 2);
        let b = Guardian::new(1, 2);
        assert_eq!(a.offset(0), IVec2::new(GUARDIAN_ORBIT_RADIUS, 0));
        assert_eq!(b.offset(0), IVec2::new(-GUARDIAN_ORBIT_RADIUS, 0));
        assert_eq!(a.offset(GUARDIAN_PERIOD_MS), a.offset(0));

        let quarter = a.offset(GUARDIAN_PERIOD_MS / 4);
        assert!(quarter.x.abs() <= 1);
        assert_eq!(quarter.y, GUARDIAN_ORBIT_RADIUS);
    }

    #[test]
    fn test_update_centers_range() {
        let mut g = Guardian::new(0, 1);
        g.update(IVec2::new(1000, 2000), 0);
        let r = g.global_range();
        assert_eq!(r.center(), IVec2::new(1000 + GUARDIAN_ORBIT_RADIUS, 2000));
        assert_eq!(r.width(), 2 * GUARDIAN_HALF_SIZE);
    }

    #[test]
    fn test_update_forgets_cooled_down_hits() {
        let mut g = Guardian::new(0, 1);
        for id in 0..50 {
            assert!(g.ledger.try_hit(MonsterId(id), id as Millis * 100));
        }
        g.update(IVec2::ZERO, 5000);
        // hits at 4100..=4900 are still cooling down
        assert_eq!(g.ledger.len(), 9);
        assert_eq!(g.ledger.last_hit(MonsterId(40)), None);
        assert!(!g.ledger.try_hit(MonsterId(41), 5000));

        g.update(IVec2::ZERO, 6000);
        assert!(g.ledger.is_empty());
    }
}
