//! The shared node directory: id-to-mailbox lookup for probe delivery.

use crossbeam_channel::Sender;
use gridlock_core::{ProbeMessage, ProcessId};
use indexmap::IndexMap;

/// The reachable half of a process node: its id and mailbox sender.
///
/// Handles are created by the harness before any node thread starts and
/// live in the shared [`Directory`]. Cloning the sender is how any node
/// enqueues a probe into another node's mailbox; the receiving half is
/// owned exclusively by the target node's thread.
pub struct NodeHandle {
    pid: ProcessId,
    probe_tx: Sender<ProbeMessage>,
}

impl NodeHandle {
    /// Create a handle from a node's id and the sender half of its mailbox.
    pub fn new(pid: ProcessId, probe_tx: Sender<ProbeMessage>) -> Self {
        Self { pid, probe_tx }
    }

    /// The node this handle reaches.
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Enqueue a probe into the node's mailbox.
    ///
    /// Best-effort: a node that already terminated has dropped its
    /// receiver, and the probe is simply lost with its demand.
    pub fn deliver(&self, probe: ProbeMessage) {
        let _ = self.probe_tx.send(probe);
    }
}

/// Read-only mapping from process id to [`NodeHandle`].
///
/// Built once by the harness and shared via `Arc`; never mutated after
/// wiring, so it needs no synchronization of its own. Insertion order is
/// the node id order.
pub struct Directory {
    nodes: IndexMap<ProcessId, NodeHandle>,
}

impl Directory {
    /// Build the directory from every node's handle.
    pub fn new(handles: impl IntoIterator<Item = NodeHandle>) -> Self {
        Self {
            nodes: handles.into_iter().map(|h| (h.pid(), h)).collect(),
        }
    }

    /// Look up the handle for `pid`.
    pub fn get(&self, pid: ProcessId) -> Option<&NodeHandle> {
        self.nodes.get(&pid)
    }

    /// Number of nodes in the directory.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
