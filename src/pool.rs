//! Generic object pool for recycling high-churn objects
//!
//! Amortizes allocation cost for transient objects (particles, projectiles,
//! effect instances) by handing them out from a free list instead of
//! constructing them every frame. Bookkeeping lives in the pool: callers hold
//! a copyable [`PoolHandle`] and the payload type carries no pool metadata.
//!
//! Every managed object is owned by exactly one of two collections at any
//! instant: the free list (available for reuse) or the active table (checked
//! out). The free list is bounded by `max_size`; the active table is not.

use rustc_hash::FxHashMap;

/// Handle to a checked-out pool object
///
/// Ids increase monotonically and are never reused, so a stale handle after
/// release simply fails lookups instead of aliasing a recycled object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle(u64);

impl PoolHandle {
    /// Raw id, for diagnostics
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Recycle pool for one object type
///
/// `acquire` pops the most recently freed object (LIFO keeps recently-touched
/// memory hot) or constructs a new one via the factory; it never fails and
/// never blocks. `release` resets the object and returns it to the free list
/// while the list is below `max_size`; beyond that the object is dropped,
/// bounding steady-state memory.
pub struct ObjectPool<T> {
    /// Objects available for reuse, most recently freed last
    free: Vec<T>,
    /// Checked-out objects, keyed by handle id
    active: FxHashMap<u64, T>,
    factory: Box<dyn FnMut() -> T>,
    reset: Box<dyn FnMut(&mut T)>,
    /// Upper bound on the free list length
    max_size: usize,
    next_id: u64,
}

impl<T> ObjectPool<T> {
    /// Create a pool and eagerly construct `initial_size` objects
    pub fn new(
        mut factory: impl FnMut() -> T + 'static,
        reset: impl FnMut(&mut T) + 'static,
        initial_size: usize,
        max_size: usize,
    ) -> Self {
        // The free list never exceeds max_size, including the eager fill
        let fill = initial_size.min(max_size);
        let mut free = Vec::with_capacity(fill);
        for _ in 0..fill {
            free.push(factory());
        }
        Self {
            free,
            active: FxHashMap::default(),
            factory: Box::new(factory),
            reset: Box::new(reset),
            max_size,
            next_id: 0,
        }
    }

    /// Check out an object, reusing the most recently freed one if available
    pub fn acquire(&mut self) -> PoolHandle {
        let obj = match self.free.pop() {
            Some(obj) => obj,
            None => (self.factory)(),
        };
        let id = self.next_id;
        self.next_id += 1;
        self.active.insert(id, obj);
        PoolHandle(id)
    }

    /// Borrow a checked-out object
    #[inline]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.active.get(&handle.0)
    }

    /// Mutably borrow a checked-out object
    #[inline]
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.active.get_mut(&handle.0)
    }

    /// Return an object to the pool
    ///
    /// Stale or foreign handles are inert (returns false), which makes double
    /// release a no-op. The object is reset before it re-enters the free
    /// list; if the free list is already at `max_size` the object is dropped.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        let Some(mut obj) = self.active.remove(&handle.0) else {
            return false;
        };
        (self.reset)(&mut obj);
        if self.free.len() < self.max_size {
            self.free.push(obj);
        } else {
            tracing::trace!(handle = handle.0, "pool at capacity, dropping object");
        }
        true
    }

    /// Release every checked-out object in one pass
    pub fn release_all(&mut self) {
        let drained: Vec<T> = self.active.drain().map(|(_, obj)| obj).collect();
        for mut obj in drained {
            (self.reset)(&mut obj);
            if self.free.len() < self.max_size {
                self.free.push(obj);
            }
        }
    }

    /// Drop all bookkeeping and objects without running `reset`
    pub fn clear(&mut self) {
        self.free.clear();
        self.active.clear();
    }

    /// Number of objects waiting in the free list
    #[inline]
    pub fn pool_size(&self) -> usize {
        self.free.len()
    }

    /// Number of checked-out objects
    #[inline]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Objects currently managed by the pool, free and active combined
    #[inline]
    pub fn total_count(&self) -> usize {
        self.free.len() + self.active.len()
    }

    /// Iterate over checked-out objects
    pub fn iter_active(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.active.iter().map(|(&id, obj)| (PoolHandle(id), obj))
    }

    /// Iterate mutably over checked-out objects
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (PoolHandle, &mut T)> {
        self.active
            .iter_mut()
            .map(|(&id, obj)| (PoolHandle(id), obj))
    }
}
