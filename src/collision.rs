//! Brute-force pairwise AABB collision dispatch.
//!
//! The dispatcher only filters and tests; what a hit means, and whether a
//! repeated hit counts, is decided by the handler.

use bevy::math::IRect;

use crate::rigidbody::overlaps;

pub trait Collidable {
    fn global_range(&self) -> IRect;

    /// Whether this entity currently takes part in collision tests
    fn is_collidable(&self) -> bool;
}

#[inline]
fn colliding<A: Collidable + ?Sized, B: Collidable + ?Sized>(a: &A, b: &B) -> bool {
    a.is_collidable() && b.is_collidable() && overlaps(&a.global_range(), &b.global_range())
}

/// Call `handler` for every collidable, overlapping pair across two lists.
///
/// Collidability is re-checked per pair, so an entity the handler kills
/// stops colliding for the rest of the pass. Returns the handler call count.
pub fn process_pairs<A, B, F>(a: &mut [A], b: &mut [B], mut handler: F) -> usize
where
    A: Collidable,
    B: Collidable,
    F: FnMut(&mut A, &mut B),
{
    let mut calls = 0;
    for left in a.iter_mut() {
        for right in b.iter_mut() {
            if colliding(left, right) {
                handler(left, right);
                calls += 1;
            }
        }
    }
    calls
}

/// Call `handler` for every collidable entity in `many` overlapping `one`
pub fn process_one<A, B, F>(one: &mut A, many: &mut [B], mut handler: F) -> usize
where
    A: Collidable + ?Sized,
    B: Collidable,
    F: FnMut(&mut A, &mut B),
{
    let mut calls = 0;
    for other in many.iter_mut() {
        if colliding(one, other) {
            handler(one, other);
            calls += 1;
        }
    }
    calls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rigidbody::rect;

    #[derive(Debug)]
    struct Box2 {
        range: IRect,
        active: bool,
        hits: u32,
    }

    impl Box2 {
        fn new(left: i32, right: i32, active: bool) -> Self {
            Self {
                range: rect(left, 0, right, 10),
                active,
                hits: 0,
            }
        }
    }

    impl Collidable for Box2 {
        fn global_range(&self) -> IRect {
            self.range
        }

        fn is_collidable(&self) -> bool {
            self.active
        }
    }

    #[test]
    fn test_pair_count_skips_inactive() {
        // a0 overlaps b0,b1; a1 overlaps b2; a2 (inactive) overlaps all
        let mut a = vec![
            Box2::new(0, 20, true),
            Box2::new(40, 50, true),
            Box2::new(0, 100, false),
        ];
        let mut b = vec![
            Box2::new(5, 10, true),
            Box2::new(15, 25, true),
            Box2::new(45, 60, true),
        ];
        let calls = process_pairs(&mut a, &mut b, |x, y| {
            x.hits += 1;
            y.hits += 1;
        });
        assert_eq!(calls, 3);
        assert_eq!(a[0].hits, 2);
        assert_eq!(a[1].hits, 1);
        assert_eq!(a[2].hits, 0);
    }

    #[test]
    fn test_handler_can_disable_target() {
        let mut one = Box2::new(0, 100, true);
        let mut many = vec![Box2::new(0, 10, true), Box2::new(20, 30, true)];
        let calls = process_one(&mut one, &mut many, |o, _| o.active = false);
        assert_eq!(calls, 1);
    }
}
