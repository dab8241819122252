//! Scheduled activation queue.
//!
//! Entities created ahead of time (delayed projectiles) wait here instead
//! of sitting in the live world in a dormant state. Once the clock passes
//! an entity's activation time it is released, oldest first, together with
//! that time so the caller can catch up on the overshoot.

use crate::clock::Millis;

#[derive(Debug, Clone)]
struct Scheduled<T> {
    at: Millis,
    entity: T,
}

#[derive(Debug, Clone)]
pub struct ActivationQueue<T> {
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for ActivationQueue<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T> ActivationQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: Millis, entity: T) {
        self.pending.push(Scheduled { at, entity });
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_activation(&self) -> Option<Millis> {
        self.pending.iter().map(|s| s.at).min()
    }

    /// Take every entity whose activation time is `<= now`, ordered by
    /// activation time (ties keep scheduling order)
    pub fn release(&mut self, now: Millis) -> Vec<(Millis, T)> {
        let (mut ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|s| s.at <= now);
        self.pending = waiting;
        ready.sort_by_key(|s| s.at);
        ready.into_iter().map(|s| (s.at, s.entity)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_only_due_entities() {
        let mut queue = ActivationQueue::new();
        queue.schedule(300, "c");
        queue.schedule(100, "a");
        queue.schedule(200, "b");
        queue.schedule(100, "a2");

        assert_eq!(queue.next_activation(), Some(100));
        let ready = queue.release(200);
        assert_eq!(ready, vec![(100, "a"), (100, "a2"), (200, "b")]);
        assert_eq!(queue.len(), 1);

        assert!(queue.release(299).is_empty());
        assert_eq!(queue.release(1000), vec![(300, "c")]);
        assert!(queue.is_empty());
    }
}
