//! Reuse pool for short-lived value objects.
//!
//! `acquire` moves an instance out of the pool and `release` moves it back,
//! so a released instance cannot be touched by its former holder. The pool
//! never refuses an `acquire`: when empty it builds a fresh instance. Idle
//! instances beyond `soft_cap` are dropped on release, which bounds the
//! memory the pool holds once demand falls.

/// Counters describing a pool's lifetime traffic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances ever constructed (seed + growth).
    pub created: usize,
    pub acquired: usize,
    pub released: usize,
    /// Released instances discarded because the pool was at its soft cap.
    pub dropped: usize,
}

impl PoolStats {
    /// Instances currently held outside the pool. Releasing an instance the
    /// pool never handed out counts against this, floored at zero.
    pub fn live(&self) -> usize {
        self.acquired.saturating_sub(self.released)
    }
}

pub struct ObjectPool<T> {
    free: Vec<T>,
    create: fn() -> T,
    reset: fn(&mut T),
    soft_cap: usize,
    stats: PoolStats,
}

impl<T> ObjectPool<T> {
    /// Build a pool pre-seeded with `initial` instances.
    pub fn new(create: fn() -> T, reset: fn(&mut T), initial: usize, soft_cap: usize) -> Self {
        let soft_cap = soft_cap.max(initial);
        let mut free = Vec::with_capacity(initial);
        free.extend((0..initial).map(|_| create()));
        Self {
            free,
            create,
            reset,
            soft_cap,
            stats: PoolStats {
                created: initial,
                ..PoolStats::default()
            },
        }
    }

    /// Take an instance, building a new one if the pool is empty.
    pub fn acquire(&mut self) -> T {
        self.stats.acquired += 1;
        match self.free.pop() {
            Some(item) => item,
            None => {
                self.stats.created += 1;
                (self.create)()
            }
        }
    }

    /// Reset `item` and return it to the pool.
    pub fn release(&mut self, mut item: T) {
        self.stats.released += 1;
        if self.free.len() >= self.soft_cap {
            self.stats.dropped += 1;
            return;
        }
        (self.reset)(&mut item);
        self.free.push(item);
    }

    /// Idle instances ready for reuse.
    pub fn idle(&self) -> usize {
        self.free.len()
    }

    pub fn soft_cap(&self) -> usize {
        self.soft_cap
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("idle", &self.free.len())
            .field("soft_cap", &self.soft_cap)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Default, PartialEq)]
    struct Slot {
        value: i32,
    }

    fn slot_pool(initial: usize, soft_cap: usize) -> ObjectPool<Slot> {
        ObjectPool::new(Slot::default, |s| s.value = 0, initial, soft_cap)
    }

    #[test]
    fn test_seeded_instances_reused_before_growth() {
        let mut pool = slot_pool(3, 16);
        let a = pool.acquire();
        let b = pool.acquire();
        let c = pool.acquire();
        assert_eq!(pool.stats().created, 3);
        assert_eq!(pool.idle(), 0);

        let d = pool.acquire();
        assert_eq!(pool.stats().created, 4, "empty pool grows instead of failing");

        for s in [a, b, c, d] {
            pool.release(s);
        }
        assert_eq!(pool.idle(), 4);
        assert_eq!(pool.stats().live(), 0);
    }

    #[test]
    fn test_release_resets_instance() {
        let mut pool = slot_pool(0, 16);
        let mut s = pool.acquire();
        s.value = 42;
        pool.release(s);
        assert_eq!(pool.acquire(), Slot { value: 0 });
    }

    #[test]
    fn test_soft_cap_drops_excess_releases() {
        let mut pool = slot_pool(0, 2);
        let held: Vec<Slot> = (0..5).map(|_| pool.acquire()).collect();
        for s in held {
            pool.release(s);
        }
        assert_eq!(pool.idle(), 2);
        assert_eq!(pool.stats().dropped, 3);
        assert_eq!(pool.stats().live(), 0);
    }

    #[test]
    fn test_foreign_release_keeps_live_at_zero() {
        let mut pool = slot_pool(0, 4);
        pool.release(Slot { value: 7 });
        assert_eq!(pool.stats().live(), 0);
        assert_eq!(pool.idle(), 1);
        assert_eq!(pool.acquire(), Slot { value: 0 });
    }

    #[test]
    fn test_soft_cap_never_below_seed() {
        let pool = slot_pool(10, 4);
        assert_eq!(pool.soft_cap(), 10);
        assert_eq!(pool.idle(), 10);
    }

    proptest! {
        #[test]
        fn prop_live_count_tracks_outstanding(
            ops in proptest::collection::vec(any::<bool>(), 0..200),
        ) {
            let mut pool = slot_pool(4, 8);
            let mut held = Vec::new();
            for acquire in ops {
                if acquire || held.is_empty() {
                    held.push(pool.acquire());
                } else if let Some(s) = held.pop() {
                    pool.release(s);
                }
                let stats = pool.stats();
                prop_assert_eq!(stats.live(), held.len());
                prop_assert_eq!(stats.created - stats.dropped, pool.idle() + held.len());
                prop_assert!(pool.idle() <= pool.soft_cap());
            }
        }
    }
}
