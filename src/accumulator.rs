use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Shared floating-point total. Workers merge into it once each, when
/// they finish, so the compare-exchange loop in `add` sees at most one
/// attempt per worker under contention.
#[derive(Debug, Default)]
pub struct GlobalAccumulator {
    bits: AtomicU64,
    merges: AtomicUsize,
}

impl GlobalAccumulator {
    pub fn new() -> Self {
        GlobalAccumulator {
            bits: AtomicU64::new(0f64.to_bits()),
            merges: AtomicUsize::new(0),
        }
    }

    pub fn add(&self, value: f64) {
        // The closure always returns Some, so fetch_update cannot fail.
        let _ = self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some((f64::from_bits(bits) + value).to_bits())
            });
        self.merges.fetch_add(1, Ordering::Relaxed);
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub fn merges(&self) -> usize {
        self.merges.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_at_zero() {
        let acc = GlobalAccumulator::new();
        assert_eq!(acc.load(), 0.0);
        assert_eq!(acc.merges(), 0);
    }

    #[test]
    fn concurrent_adds_are_not_lost() {
        let acc = Arc::new(GlobalAccumulator::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let acc = Arc::clone(&acc);
                thread::spawn(move || acc.add(i as f64 + 0.5))
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        // 0.5 + 1.5 + ... + 15.5, exact in binary floating point
        assert_eq!(acc.load(), 128.0);
        assert_eq!(acc.merges(), 16);
    }
}
