//! The exclusive resource primitive.

use std::sync::Mutex;

use gridlock_core::{ProcessId, ResourceId};
use tracing::debug;

/// An exclusively-held unit of contention.
///
/// At any instant the holder cell is either empty or names exactly one
/// process; transitions between the two are atomic under the internal
/// mutex. Resources are created once at startup by the harness and
/// mutated only through [`acquire_if_free`](Resource::acquire_if_free)
/// and [`release`](Resource::release).
pub struct Resource {
    id: ResourceId,
    holder: Mutex<Option<ProcessId>>,
}

impl Resource {
    /// Create an unheld resource.
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            holder: Mutex::new(None),
        }
    }

    /// This resource's identifier.
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Grant the resource to `pid` if it is free, returning whether the
    /// caller now holds it.
    ///
    /// Granting is idempotent for the current holder: a node re-acquiring
    /// a resource it already holds gets `true` without a state change.
    /// For any other caller the attempt fails while the resource is held.
    pub fn acquire_if_free(&self, pid: ProcessId) -> bool {
        let mut holder = self.holder.lock().unwrap();
        match *holder {
            None => {
                debug!(resource = %self.id, process = %pid, "resource assigned");
                *holder = Some(pid);
                true
            }
            Some(current) => current == pid,
        }
    }

    /// Snapshot of the current holder, read under the mutex.
    pub fn holder(&self) -> Option<ProcessId> {
        *self.holder.lock().unwrap()
    }

    /// Clear the holder unconditionally.
    ///
    /// Releasing an already-free resource is a no-op. The effect is
    /// observable to any subsequent `acquire_if_free` caller.
    pub fn release(&self) {
        *self.holder.lock().unwrap() = None;
    }
}

// Compile-time assertion: Resource is shared across node threads.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Resource>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn acquire_free_resource_succeeds() {
        let r = Resource::new(ResourceId(1));
        assert!(r.acquire_if_free(ProcessId(1)));
        assert_eq!(r.holder(), Some(ProcessId(1)));
    }

    #[test]
    fn acquire_held_resource_fails_for_non_holder() {
        let r = Resource::new(ResourceId(1));
        assert!(r.acquire_if_free(ProcessId(1)));
        assert!(!r.acquire_if_free(ProcessId(2)));
        assert_eq!(r.holder(), Some(ProcessId(1)));
    }

    #[test]
    fn reacquire_by_holder_is_idempotent() {
        let r = Resource::new(ResourceId(1));
        assert!(r.acquire_if_free(ProcessId(1)));
        assert!(r.acquire_if_free(ProcessId(1)));
        assert_eq!(r.holder(), Some(ProcessId(1)));
    }

    #[test]
    fn release_clears_holder() {
        let r = Resource::new(ResourceId(1));
        r.acquire_if_free(ProcessId(1));
        r.release();
        assert_eq!(r.holder(), None);
        assert!(r.acquire_if_free(ProcessId(2)));
    }

    #[test]
    fn release_of_free_resource_is_noop() {
        let r = Resource::new(ResourceId(1));
        r.release();
        assert_eq!(r.holder(), None);
    }

    #[test]
    fn concurrent_acquire_grants_exactly_one_winner() {
        let r = Arc::new(Resource::new(ResourceId(7)));
        let wins = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (1..=16u32)
            .map(|pid| {
                let r = Arc::clone(&r);
                let wins = Arc::clone(&wins);
                thread::spawn(move || {
                    if r.acquire_if_free(ProcessId(pid)) {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(wins.load(Ordering::SeqCst), 1);
        assert!(r.holder().is_some());
    }
}
