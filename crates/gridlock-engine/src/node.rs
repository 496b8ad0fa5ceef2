//! The process node: request/acquire/release lifecycle and the
//! edge-chasing detection protocol.
//!
//! Each node runs on its own thread. No operation blocks on another
//! node: acquisition is try-and-fail, the mailbox read is non-blocking,
//! and forward progress between passes is driven by a fixed sleep. The
//! only early exit is harakiri after confirming a deadlock this node
//! initiated.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use gridlock_core::{ProbeMessage, ProcessId, ResourceSelector};
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::directory::Directory;
use crate::gate::DetectionGate;
use crate::request::ResourceRequest;
use crate::resource::Resource;

/// How a node's run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The wall-clock budget elapsed.
    Budget,
    /// The node confirmed a deadlock it initiated and self-terminated.
    Deadlock,
}

/// Per-node summary returned to the harness when the thread joins.
#[derive(Clone, Debug)]
pub struct NodeOutcome {
    /// The node this outcome describes.
    pub pid: ProcessId,
    /// How the run ended.
    pub termination: Termination,
    /// Run-loop passes completed.
    pub passes: u64,
    /// Detection rounds this node won the gate for.
    pub rounds_initiated: u64,
    /// Transit probes relayed on behalf of other initiators.
    pub probes_forwarded: u64,
}

/// A process contending for resources and participating in detection.
pub(crate) struct ProcessNode {
    pid: ProcessId,
    mailbox: Receiver<ProbeMessage>,
    pool: Arc<[Arc<Resource>]>,
    requests: Vec<ResourceRequest>,
    directory: Arc<Directory>,
    gate: Arc<DetectionGate>,
    selector: Box<dyn ResourceSelector>,
    run_for: Duration,
    wait_suspect: Duration,
    usage_complete: Duration,
    pass_interval: Duration,
    passes: u64,
    rounds_initiated: u64,
    probes_forwarded: u64,
}

impl ProcessNode {
    pub(crate) fn new(
        pid: ProcessId,
        mailbox: Receiver<ProbeMessage>,
        pool: Arc<[Arc<Resource>]>,
        directory: Arc<Directory>,
        gate: Arc<DetectionGate>,
        selector: Box<dyn ResourceSelector>,
        config: &SimConfig,
    ) -> Self {
        Self {
            pid,
            mailbox,
            pool,
            requests: Vec::new(),
            directory,
            gate,
            selector,
            run_for: config.run_for,
            wait_suspect: config.wait_suspect,
            usage_complete: config.usage_complete,
            pass_interval: config.pass_interval,
            passes: 0,
            rounds_initiated: 0,
            probes_forwarded: 0,
        }
    }

    /// Run the node until its budget elapses or it resolves a deadlock.
    ///
    /// Consumes self; the mailbox receiver drops on return, after which
    /// probes addressed to this node are lost with its demand.
    pub(crate) fn run(mut self) -> NodeOutcome {
        let started = Instant::now();
        info!(process = %self.pid, "process started");

        while started.elapsed() < self.run_for {
            self.passes += 1;

            if self.requests.is_empty() {
                self.draw_requests();
            }

            if self.handle_probe() {
                self.harakiri();
                return self.outcome(Termination::Deadlock);
            }

            if self.scan_requests() {
                self.initiate_detection();
            } else {
                self.release_expired();
            }

            thread::sleep(self.pass_interval);
        }

        info!(process = %self.pid, passes = self.passes, "budget elapsed");
        self.outcome(Termination::Budget)
    }

    fn outcome(&self, termination: Termination) -> NodeOutcome {
        NodeOutcome {
            pid: self.pid,
            termination,
            passes: self.passes,
            rounds_initiated: self.rounds_initiated,
            probes_forwarded: self.probes_forwarded,
        }
    }

    /// Create one request per resource chosen by the selector.
    fn draw_requests(&mut self) {
        for index in self.selector.select(self.pool.len()) {
            let resource = Arc::clone(&self.pool[index]);
            info!(process = %self.pid, resource = %resource.id(), "requesting resource");
            self.requests.push(ResourceRequest::new(resource));
        }
    }

    /// Drain at most one probe from the mailbox.
    ///
    /// Returns `true` when the probe carries this node's own id as
    /// initiator: the probe walked a full cycle of the wait-for graph
    /// back to where it started, so the system is deadlocked. The gate
    /// is released here; the caller performs the terminal resolution.
    fn handle_probe(&mut self) -> bool {
        let Ok(probe) = self.mailbox.try_recv() else {
            return false;
        };
        debug!(process = %self.pid, %probe, "probe received");

        if probe.initiator == self.pid {
            info!(process = %self.pid, "own probe returned: deadlock confirmed");
            self.gate.finish();
            return true;
        }

        // Transit probe: walk the next edges of the wait-for graph.
        self.probes_forwarded += 1;
        for holder in self.stale_neighbours() {
            self.send_probe(probe.forwarded(self.pid, holder));
        }
        false
    }

    /// Try to acquire every outstanding request, in list order.
    ///
    /// Returns `true` when a pending request has gone stale, in which
    /// case scanning stops at that request: the first stale wait is
    /// sufficient to trigger a detection attempt this pass.
    fn scan_requests(&mut self) -> bool {
        for req in &self.requests {
            if req.resource().acquire_if_free(self.pid) {
                continue;
            }
            if req.older_than(self.wait_suspect) {
                info!(
                    process = %self.pid,
                    resource = %req.resource().id(),
                    "request has gone stale"
                );
                return true;
            }
        }
        false
    }

    /// Start a detection round if no round is already in flight.
    fn initiate_detection(&mut self) {
        if !self.gate.try_begin() {
            debug!(process = %self.pid, "detection already in flight, skipping");
            return;
        }
        info!(process = %self.pid, "initiating deadlock detection");
        self.rounds_initiated += 1;
        for holder in self.stale_neighbours() {
            self.send_probe(ProbeMessage::new(self.pid, self.pid, holder));
        }
    }

    /// Holders of this node's stale waits.
    ///
    /// A neighbour in the wait-for graph is the node currently holding a
    /// resource this node has waited on past the suspect threshold. A
    /// resource this node holds itself is not a wait, and a holder that
    /// released in the meantime yields no edge.
    fn stale_neighbours(&self) -> SmallVec<[ProcessId; 4]> {
        let mut neighbours = SmallVec::new();
        for req in &self.requests {
            if !req.older_than(self.wait_suspect) {
                continue;
            }
            let Some(holder) = req.resource().holder() else {
                continue;
            };
            if holder != self.pid {
                neighbours.push(holder);
            }
        }
        neighbours
    }

    fn send_probe(&self, probe: ProbeMessage) {
        debug!(process = %self.pid, %probe, "sending probe");
        if let Some(handle) = self.directory.get(probe.receiver) {
            handle.deliver(probe);
        }
    }

    /// Release held requests whose usage ran past the completion
    /// threshold, removing them from the request list.
    fn release_expired(&mut self) {
        let pid = self.pid;
        let threshold = self.usage_complete;
        self.requests.retain(|req| {
            if req.resource().holder() == Some(pid) && req.older_than(threshold) {
                info!(process = %pid, resource = %req.resource().id(), "usage complete, releasing");
                req.resource().release();
                false
            } else {
                true
            }
        });
    }

    /// Break the cycle by removing this node's demand entirely: every
    /// resource in the request list, held or still pending, is released
    /// regardless of age.
    fn harakiri(&mut self) {
        info!(process = %self.pid, "performing harakiri to break the deadlock");
        for req in self.requests.drain(..) {
            req.resource().release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::NodeHandle;
    use crossbeam_channel::{unbounded, Receiver, Sender};
    use gridlock_core::ResourceId;
    use gridlock_test_utils::ScriptedSelector;
    use smallvec::smallvec;

    /// One real node plus a mailbox we hold for a phantom peer (pid 2),
    /// so tests can observe what the node sends without a second thread.
    struct Rig {
        node: ProcessNode,
        node_tx: Sender<ProbeMessage>,
        peer_rx: Receiver<ProbeMessage>,
        pool: Arc<[Arc<Resource>]>,
        gate: Arc<DetectionGate>,
    }

    fn rig(resources: u32, script: Vec<Vec<usize>>) -> Rig {
        let pool: Arc<[Arc<Resource>]> = (1..=resources)
            .map(|i| Arc::new(Resource::new(ResourceId(i))))
            .collect::<Vec<_>>()
            .into();
        let (node_tx, node_rx) = unbounded();
        let (peer_tx, peer_rx) = unbounded();
        let directory = Arc::new(Directory::new([
            NodeHandle::new(ProcessId(1), node_tx.clone()),
            NodeHandle::new(ProcessId(2), peer_tx),
        ]));
        let gate = Arc::new(DetectionGate::new());
        let config = SimConfig {
            wait_suspect: Duration::from_secs(5),
            usage_complete: Duration::from_secs(10),
            ..SimConfig::default()
        };
        let node = ProcessNode::new(
            ProcessId(1),
            node_rx,
            Arc::clone(&pool),
            directory,
            Arc::clone(&gate),
            Box::new(ScriptedSelector::new(script)),
            &config,
        );
        Rig {
            node,
            node_tx,
            peer_rx,
            pool,
            gate,
        }
    }

    #[test]
    fn draw_follows_the_selector_script() {
        let mut r = rig(3, vec![vec![0, 2]]);
        r.node.draw_requests();
        let ids: Vec<_> = r
            .node
            .requests
            .iter()
            .map(|req| req.resource().id())
            .collect();
        assert_eq!(ids, vec![ResourceId(1), ResourceId(3)]);
    }

    #[test]
    fn empty_draw_idles_the_pass() {
        let mut r = rig(3, vec![vec![]]);
        r.node.draw_requests();
        assert!(r.node.requests.is_empty());
    }

    #[test]
    fn scan_acquires_free_resources() {
        let mut r = rig(2, vec![vec![0, 1]]);
        r.node.draw_requests();
        assert!(!r.node.scan_requests());
        assert_eq!(r.pool[0].holder(), Some(ProcessId(1)));
        assert_eq!(r.pool[1].holder(), Some(ProcessId(1)));
    }

    #[test]
    fn stale_pending_request_flags_detection() {
        let mut r = rig(1, vec![vec![0]]);
        r.pool[0].acquire_if_free(ProcessId(2));
        r.node.draw_requests();
        r.node.requests[0].backdate(Duration::from_secs(6));
        assert!(r.node.scan_requests());
    }

    #[test]
    fn held_request_never_flags_detection() {
        let mut r = rig(1, vec![vec![0]]);
        r.node.draw_requests();
        assert!(!r.node.scan_requests());
        // Held far past both thresholds: still not a wait.
        r.node.requests[0].backdate(Duration::from_secs(60));
        assert!(!r.node.scan_requests());
    }

    #[test]
    fn first_stale_request_stops_the_scan() {
        let mut r = rig(2, vec![vec![0, 1]]);
        r.pool[0].acquire_if_free(ProcessId(2));
        r.node.draw_requests();
        r.node.requests[0].backdate(Duration::from_secs(6));
        assert!(r.node.scan_requests());
        // Resource 2 was acquirable but the scan stopped before it.
        assert_eq!(r.pool[1].holder(), None);
    }

    #[test]
    fn initiation_sends_probes_to_stale_holders() {
        let mut r = rig(1, vec![vec![0]]);
        r.pool[0].acquire_if_free(ProcessId(2));
        r.node.draw_requests();
        r.node.requests[0].backdate(Duration::from_secs(6));

        r.node.initiate_detection();

        assert_eq!(r.node.rounds_initiated, 1);
        assert!(r.gate.in_flight());
        let probe = r.peer_rx.try_recv().unwrap();
        assert_eq!(probe.initiator, ProcessId(1));
        assert_eq!(probe.sender, ProcessId(1));
        assert_eq!(probe.receiver, ProcessId(2));
    }

    #[test]
    fn initiation_skips_when_a_round_is_in_flight() {
        let mut r = rig(1, vec![vec![0]]);
        r.pool[0].acquire_if_free(ProcessId(2));
        r.node.draw_requests();
        r.node.requests[0].backdate(Duration::from_secs(6));

        assert!(r.gate.try_begin());
        r.node.initiate_detection();

        assert_eq!(r.node.rounds_initiated, 0);
        assert!(r.peer_rx.try_recv().is_err());
    }

    #[test]
    fn transit_probe_is_forwarded_with_initiator_preserved() {
        let mut r = rig(1, vec![vec![0]]);
        r.pool[0].acquire_if_free(ProcessId(2));
        r.node.draw_requests();
        r.node.requests[0].backdate(Duration::from_secs(6));

        r.node_tx
            .send(ProbeMessage::new(ProcessId(9), ProcessId(2), ProcessId(1)))
            .unwrap();
        assert!(!r.node.handle_probe());

        assert_eq!(r.node.probes_forwarded, 1);
        let hop = r.peer_rx.try_recv().unwrap();
        assert_eq!(hop.initiator, ProcessId(9));
        assert_eq!(hop.sender, ProcessId(1));
        assert_eq!(hop.receiver, ProcessId(2));
    }

    #[test]
    fn transit_probe_dies_without_stale_waits() {
        let mut r = rig(1, vec![vec![0]]);
        r.node.draw_requests();

        r.node_tx
            .send(ProbeMessage::new(ProcessId(9), ProcessId(2), ProcessId(1)))
            .unwrap();
        assert!(!r.node.handle_probe());
        assert!(r.peer_rx.try_recv().is_err());
    }

    #[test]
    fn own_probe_confirms_deadlock_and_releases_the_gate() {
        let mut r = rig(1, vec![vec![0]]);
        assert!(r.gate.try_begin());
        r.node_tx
            .send(ProbeMessage::new(ProcessId(1), ProcessId(2), ProcessId(1)))
            .unwrap();
        assert!(r.node.handle_probe());
        assert!(!r.gate.in_flight());
    }

    #[test]
    fn empty_mailbox_is_a_normal_pass() {
        let mut r = rig(1, vec![vec![0]]);
        assert!(!r.node.handle_probe());
    }

    #[test]
    fn harakiri_releases_held_and_pending_resources() {
        let mut r = rig(2, vec![vec![0, 1]]);
        // Hold one, leave the other pending under a different holder.
        r.pool[1].acquire_if_free(ProcessId(2));
        r.node.draw_requests();
        r.node.scan_requests();
        assert_eq!(r.pool[0].holder(), Some(ProcessId(1)));

        r.node.harakiri();

        assert!(r.node.requests.is_empty());
        assert_eq!(r.pool[0].holder(), None);
        // Pending requests are force-released too, out from under the
        // other holder; it re-acquires on its next pass.
        assert_eq!(r.pool[1].holder(), None);
    }

    #[test]
    fn release_expired_frees_only_aged_held_requests() {
        let mut r = rig(2, vec![vec![0, 1]]);
        r.node.draw_requests();
        r.node.scan_requests();
        r.node.requests[0].backdate(Duration::from_secs(11));

        r.node.release_expired();

        assert_eq!(r.pool[0].holder(), None);
        assert_eq!(r.pool[1].holder(), Some(ProcessId(1)));
        assert_eq!(r.node.requests.len(), 1);
        assert_eq!(r.node.requests[0].resource().id(), ResourceId(2));
    }

    #[test]
    fn granted_request_keeps_its_original_timestamp() {
        let mut r = rig(1, vec![vec![0]]);
        r.pool[0].acquire_if_free(ProcessId(2));
        r.node.draw_requests();
        r.node.requests[0].backdate(Duration::from_secs(11));

        // The other holder lets go; the request is granted on a later
        // pass but its age still reflects the full contention duration.
        r.pool[0].release();
        assert!(!r.node.scan_requests());
        r.node.release_expired();
        assert!(r.node.requests.is_empty());
        assert_eq!(r.pool[0].holder(), None);
    }

    #[test]
    fn stale_neighbours_skip_released_holders() {
        let mut r = rig(2, vec![vec![0, 1]]);
        r.pool[0].acquire_if_free(ProcessId(2));
        r.node.draw_requests();
        r.node.requests[0].backdate(Duration::from_secs(6));
        r.node.requests[1].backdate(Duration::from_secs(6));
        // First wait's holder releases before probes go out; the second
        // request is free and unheld, so no edge exists there either.
        r.pool[0].release();

        let neighbours = r.node.stale_neighbours();
        let expected: SmallVec<[ProcessId; 4]> = smallvec![];
        assert_eq!(neighbours, expected);
    }
}
