//! Shuffled, non-repeating target order

use rand::Rng;
use tracing::debug;

use super::target::{Direction, DIRECTION_REPEATS, FOCUS_IMAGE_COUNT};

/// Hands out a fixed multiset of targets in a uniformly shuffled order.
#[derive(Debug, Clone)]
pub struct TargetScheduler<T> {
    sequence: Vec<T>,
    cursor: usize,
}

impl<T: Clone> TargetScheduler<T> {
    /// Shuffle `multiset` and start from the front.
    pub fn new<R: Rng + ?Sized>(multiset: Vec<T>, rng: &mut R) -> Self {
        let mut scheduler = Self {
            sequence: Vec::new(),
            cursor: 0,
        };
        scheduler.initialize(multiset, rng);
        scheduler
    }

    /// Replace the sequence with a fresh shuffle of `multiset`.
    pub fn initialize<R: Rng + ?Sized>(&mut self, mut multiset: Vec<T>, rng: &mut R) {
        // Fisher-Yates, back to front
        for i in (1..multiset.len()).rev() {
            let j = rng.gen_range(0..=i);
            multiset.swap(i, j);
        }
        debug!("Target sequence of {} initialized", multiset.len());
        self.sequence = multiset;
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.sequence.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.sequence.len()
    }

    /// Targets handed out so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    pub fn sequence(&self) -> &[T] {
        &self.sequence
    }
}

impl<T: Clone> Iterator for TargetScheduler<T> {
    type Item = T;

    /// Next target, or `None` once every target has been handed out.
    fn next(&mut self) -> Option<T> {
        let target = self.sequence.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(target)
    }
}

impl TargetScheduler<u8> {
    /// Focus images `1..=20`, each exactly once.
    pub fn focus_images<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new((1..=FOCUS_IMAGE_COUNT).collect(), rng)
    }
}

impl TargetScheduler<Direction> {
    /// The four directions, five times each.
    pub fn directions<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let multiset = Direction::ALL
            .iter()
            .flat_map(|d| std::iter::repeat(*d).take(DIRECTION_REPEATS))
            .collect();
        Self::new(multiset, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn drain<T: Clone>(scheduler: &mut TargetScheduler<T>) -> Vec<T> {
        scheduler.by_ref().collect()
    }

    #[test]
    fn test_focus_images_are_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut scheduler = TargetScheduler::focus_images(&mut rng);
        let mut drawn = drain(&mut scheduler);
        assert_eq!(drawn.len(), 20);
        assert!(scheduler.is_exhausted());
        assert_eq!(scheduler.next(), None);
        drawn.sort_unstable();
        assert_eq!(drawn, (1..=20).collect::<Vec<u8>>());
    }

    #[test]
    fn test_directions_keep_multiplicity() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut scheduler = TargetScheduler::directions(&mut rng);
        let drawn = drain(&mut scheduler);
        assert_eq!(drawn.len(), 20);
        for d in Direction::ALL {
            assert_eq!(drawn.iter().filter(|x| **x == d).count(), 5);
        }
    }

    #[test]
    fn test_same_seed_same_order() {
        let a = TargetScheduler::focus_images(&mut StdRng::seed_from_u64(3));
        let b = TargetScheduler::focus_images(&mut StdRng::seed_from_u64(3));
        assert_eq!(a.sequence(), b.sequence());
    }

    #[test]
    fn test_shuffle_is_not_identity_for_all_seeds() {
        let identity: Vec<u8> = (1..=20).collect();
        let shuffled = (0..10u64).any(|seed| {
            TargetScheduler::focus_images(&mut StdRng::seed_from_u64(seed)).sequence()
                != identity.as_slice()
        });
        assert!(shuffled);
    }

    #[test]
    fn test_reinitialize_resets_cursor() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut scheduler = TargetScheduler::new(vec![1, 2, 3], &mut rng);
        scheduler.next();
        assert_eq!(scheduler.remaining(), 2);
        scheduler.initialize(vec![9], &mut rng);
        assert_eq!(scheduler.remaining(), 1);
        assert_eq!(scheduler.next(), Some(9));
        assert_eq!(scheduler.next(), None);
    }

    #[test]
    fn test_empty_multiset_is_exhausted() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut scheduler: TargetScheduler<u8> = TargetScheduler::new(Vec::new(), &mut rng);
        assert!(scheduler.is_empty());
        assert!(scheduler.is_exhausted());
        assert_eq!(scheduler.next(), None);
    }
}
