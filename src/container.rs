//! Ordered entity container with O(1) swap-and-pop removal.
//!
//! `frame_move` runs every entity's movement update; `frame` runs every
//! liveness check and removes the entities that report dead. Removal swaps
//! the dead entity with the last one, so iteration is index based and the
//! same index is re-examined after a swap. Order is not preserved.

use crate::clock::Millis;
use crate::physics::PlayField;
use crate::random::SimRng;

/// Per-frame context handed to movement updates
pub struct FrameContext<'a> {
    pub now: Millis,
    pub dt: Millis,
    pub field: &'a PlayField,
    pub rng: &'a mut SimRng,
}

/// A dynamic entity stepped by the simulation
pub trait SimEntity {
    /// Movement and state-machine update for this frame
    fn frame_move(&mut self, ctx: &mut FrameContext<'_>);

    /// End-of-frame bookkeeping; returns `false` once the entity should be
    /// removed
    fn frame(&mut self, now: Millis) -> bool;
}

#[derive(Debug, Clone)]
pub struct EntityContainer<T> {
    items: Vec<T>,
}

impl<T> Default for EntityContainer<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: SimEntity> EntityContainer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, entity: T) {
        self.items.push(entity);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn frame_move(&mut self, ctx: &mut FrameContext<'_>) {
        for entity in &mut self.items {
            entity.frame_move(ctx);
        }
    }

    /// Run liveness checks, calling `on_removed` once for every entity
    /// before it is dropped
    pub fn frame<F: FnMut(&T)>(&mut self, now: Millis, mut on_removed: F) -> usize {
        let mut removed = 0;
        let mut i = 0;
        while i < self.items.len() {
            if self.items[i].frame(now) {
                i += 1;
                continue;
            }
            on_removed(&self.items[i]);
            self.items.swap_remove(i);
            removed += 1;
        }
        removed
    }
}
