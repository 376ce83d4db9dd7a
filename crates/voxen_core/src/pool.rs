//! A generation-tagged object pool: fixed storage with an explicit free
//! list for O(1) allocate/free, plus a per-slot generation counter so that
//! a [`PoolHandle`] obtained before a slot was recycled can never be
//! mistaken for the object that now occupies that slot.
//!
//! This is a plain stack-based pool, not a free-list graph: handed-back
//! slots are pushed onto a `Vec` used as a stack and popped LIFO.

/// A handle to a slot in a [`Pool`]. Carries the slot index and the
/// generation that was current when the handle was issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    index: usize,
    generation: u32,
}

struct Slot<T> {
    value: Option<T>,
    generation: u32,
}

/// A fixed-capacity pool of reusable objects of type `T`.
///
/// `T` is typically expensive to allocate (e.g. a chunk's dense voxel
/// array) and cheap to reset, so the pool keeps freed slots around instead
/// of dropping them.
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
}

impl<T> Pool<T> {
    /// Creates an empty pool. Slots are created lazily by [`Pool::acquire`]
    /// up to `capacity`; the pool never grows past it.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Returns the number of live (checked-out) objects.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Returns the number of pooled (checked-in, reusable) objects.
    #[must_use]
    pub fn pooled_count(&self) -> usize {
        self.free.len()
    }

    /// Acquires a slot, reusing a freed one if available, or calling
    /// `make` to produce a fresh value if the pool has room to grow.
    ///
    /// Returns `None` if the pool is at capacity and has no freed slots.
    pub fn acquire(&mut self, make: impl FnOnce() -> T) -> Option<(PoolHandle, &mut T)> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.generation = slot.generation.wrapping_add(1);
            slot.value = Some(make());
            return Some((
                PoolHandle { index, generation: slot.generation },
                slot.value.as_mut().unwrap_or_else(|| unreachable!()),
            ));
        }

        if self.slots.len() == self.slots.capacity() && self.slots.capacity() != 0 {
            return None;
        }

        let index = self.slots.len();
        self.slots.push(Slot { value: Some(make()), generation: 0 });
        let slot = &mut self.slots[index];
        Some((PoolHandle { index, generation: 0 }, slot.value.as_mut().unwrap_or_else(|| unreachable!())))
    }

    /// Returns a slot to the pool, dropping its value. Returns `true` if
    /// the handle was valid (matched the slot's current generation).
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index) else {
            return false;
        };
        if slot.generation != handle.generation || slot.value.is_none() {
            return false;
        }
        slot.value = None;
        self.free.push(handle.index);
        true
    }

    /// Gets a shared reference, or `None` if the handle is stale (its slot
    /// has since been recycled to a different generation) or empty.
    #[must_use]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Gets a mutable reference, or `None` if the handle is stale or empty.
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_and_release_round_trip() {
        let mut pool: Pool<u32> = Pool::new(4);
        let (handle, value) = pool.acquire(|| 42).unwrap();
        *value = 43;
        assert_eq!(pool.get(handle), Some(&43));
        assert!(pool.release(handle));
        assert_eq!(pool.get(handle), None);
    }

    #[test]
    fn recycled_slot_gets_new_generation() {
        let mut pool: Pool<u32> = Pool::new(4);
        let (h1, _) = pool.acquire(|| 1).unwrap();
        pool.release(h1);
        let (h2, _) = pool.acquire(|| 2).unwrap();

        // Same slot is reused, but the stale handle must not resolve.
        assert_ne!(h1.generation, h2.generation);
        assert_eq!(pool.get(h1), None);
        assert_eq!(pool.get(h2), Some(&2));
    }

    #[test]
    fn pool_respects_capacity() {
        let mut pool: Pool<u32> = Pool::new(1);
        let (h1, _) = pool.acquire(|| 1).unwrap();
        assert!(pool.acquire(|| 2).is_none());
        pool.release(h1);
        assert!(pool.acquire(|| 2).is_some());
    }
}
