//! Resource selection: the seam between the node run loop and randomness.

use smallvec::SmallVec;

/// Indices into the resource pool chosen for one batch of requests.
///
/// Uses `SmallVec<[usize; 4]>` so typical draws (bounded by the pool
/// size, small in practice) stay off the heap.
pub type Selection = SmallVec<[usize; 4]>;

/// Chooses which resources a node requests next.
///
/// A node consults its selector whenever its request list is empty. The
/// production implementation draws a random wrapped run of the pool;
/// tests substitute scripted selectors to construct exact contention
/// scenarios.
///
/// Returned indices must be in `0..pool_size` and duplicate-free. An
/// empty selection is valid and means the node idles that pass.
pub trait ResourceSelector: Send {
    /// Choose pool indices for the next batch of requests.
    fn select(&mut self, pool_size: usize) -> Selection;
}
