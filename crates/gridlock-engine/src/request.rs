//! A node's timestamped claim on a resource.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::resource::Resource;

/// An outstanding claim on a resource, pending or granted.
///
/// The creation timestamp is never refreshed: a request granted on a
/// later pass keeps its original `created_at`, so one timestamp serves
/// both the wait-suspect check (while pending) and the usage-complete
/// check (once held), matching the real contention duration.
pub struct ResourceRequest {
    resource: Arc<Resource>,
    created_at: Instant,
}

impl ResourceRequest {
    /// Record a claim on `resource` starting now.
    pub fn new(resource: Arc<Resource>) -> Self {
        Self {
            resource,
            created_at: Instant::now(),
        }
    }

    /// The claimed resource.
    pub fn resource(&self) -> &Arc<Resource> {
        &self.resource
    }

    /// Whether this request's age exceeds `threshold`.
    ///
    /// Callers parameterize the threshold: the wait-suspect threshold
    /// for pending requests, the usage-complete threshold for held ones.
    pub fn older_than(&self, threshold: Duration) -> bool {
        self.created_at.elapsed() > threshold
    }

    /// Shift the creation timestamp into the past, for tests that need
    /// aged requests without sleeping.
    #[cfg(test)]
    pub(crate) fn backdate(&mut self, by: Duration) {
        self.created_at -= by;
    }
}
