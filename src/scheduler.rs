use std::sync::atomic::{AtomicUsize, Ordering};

/// Hands out block indices through a single atomic cursor.
///
/// Every call to `claim_next` returns a distinct index, so each block is
/// computed by exactly one worker. Claim order between workers is not
/// constrained, which is why the increment is relaxed.
#[derive(Debug)]
pub struct BlockScheduler {
    cursor: AtomicUsize,
    total_blocks: usize,
}

impl BlockScheduler {
    /// `first_unclaimed` is the worker count: blocks `0..workers` are
    /// handed out up front, one per worker.
    pub fn new(total_blocks: usize, first_unclaimed: usize) -> Self {
        BlockScheduler {
            cursor: AtomicUsize::new(first_unclaimed),
            total_blocks,
        }
    }

    pub fn claim_next(&self) -> usize {
        self.cursor.fetch_add(1, Ordering::Relaxed)
    }

    pub fn has_remaining(&self, index: usize) -> bool {
        index < self.total_blocks
    }

    pub fn is_exhausted(&self) -> bool {
        !self.has_remaining(self.cursor())
    }

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    pub fn total_blocks(&self) -> usize {
        self.total_blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn claims_start_after_preassigned_blocks() {
        let scheduler = BlockScheduler::new(13, 4);

        assert_eq!(scheduler.claim_next(), 4);
        assert_eq!(scheduler.claim_next(), 5);
        assert_eq!(scheduler.cursor(), 6);
    }

    #[test]
    fn exhaustion_follows_cursor() {
        let scheduler = BlockScheduler::new(3, 2);
        assert!(!scheduler.is_exhausted());

        assert_eq!(scheduler.claim_next(), 2);
        assert!(scheduler.is_exhausted());
        assert!(!scheduler.has_remaining(3));
        assert!(scheduler.has_remaining(2));
    }

    #[test]
    fn oversubscribed_start_is_already_exhausted() {
        let scheduler = BlockScheduler::new(3, 8);
        assert!(scheduler.is_exhausted());
    }

    #[test]
    fn concurrent_claims_are_unique() {
        let scheduler = Arc::new(BlockScheduler::new(usize::MAX, 0));
        let per_thread = 10_000;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let scheduler = Arc::clone(&scheduler);
                thread::spawn(move || {
                    (0..per_thread)
                        .map(|_| scheduler.claim_next())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for index in handle.join().unwrap() {
                assert!(seen.insert(index), "index {} claimed twice", index);
            }
        }

        assert_eq!(seen.len(), 8 * per_thread);
        assert!((0..8 * per_thread).all(|i| seen.contains(&i)));
    }
}
