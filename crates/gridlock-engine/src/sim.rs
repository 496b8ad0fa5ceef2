//! Simulation harness: wiring, thread spawn, and the run report.
//!
//! The harness is pure composition: it builds the resource pool and the
//! node set, gives every node the same pool, gate, and directory, starts
//! every node concurrently, and blocks until all have finished.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::unbounded;
use gridlock_core::{ProcessId, ResourceId, ResourceSelector};
use tracing::info;

use crate::config::{ConfigError, SimConfig};
use crate::directory::{Directory, NodeHandle};
use crate::gate::DetectionGate;
use crate::node::{NodeOutcome, ProcessNode, Termination};
use crate::resource::Resource;
use crate::selector::RandomSelector;

// ── SimError ───────────────────────────────────────────────────────

/// Errors from running a wired simulation.
///
/// The run loop itself has no abnormal exit; these cover the harness's
/// own failure modes around it.
#[derive(Debug)]
pub enum SimError {
    /// A node thread could not be spawned.
    SpawnFailed {
        /// The node whose thread failed to spawn.
        pid: ProcessId,
        /// Description from the spawn attempt.
        reason: String,
    },
    /// A node thread panicked instead of returning an outcome.
    NodePanicked {
        /// The node whose thread panicked.
        pid: ProcessId,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnFailed { pid, reason } => {
                write!(f, "failed to spawn thread for process {pid}: {reason}")
            }
            Self::NodePanicked { pid } => {
                write!(f, "process {pid} panicked")
            }
        }
    }
}

impl Error for SimError {}

// ── SimReport ──────────────────────────────────────────────────────

/// Summary of a completed run: one outcome per node, in id order.
#[derive(Clone, Debug)]
pub struct SimReport {
    /// Per-node outcomes.
    pub outcomes: Vec<NodeOutcome>,
    /// Wall-clock time from wiring to the last join.
    pub elapsed: Duration,
}

impl SimReport {
    /// Nodes that resolved a deadlock via harakiri.
    pub fn deadlocked(&self) -> impl Iterator<Item = &NodeOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.termination == Termination::Deadlock)
    }

    /// Number of nodes that self-terminated.
    pub fn deadlock_count(&self) -> usize {
        self.deadlocked().count()
    }
}

// ── Simulation ─────────────────────────────────────────────────────

/// A validated, ready-to-run contention session.
pub struct Simulation {
    config: SimConfig,
    selectors: Vec<Box<dyn ResourceSelector>>,
    pool: Arc<[Arc<Resource>]>,
}

impl Simulation {
    /// Build a simulation with per-node seeded [`RandomSelector`]s.
    ///
    /// Each node's selector stream is derived from `config.seed XOR pid`
    /// so a run is reproducible given its seed.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let selectors = (1..=config.process_count)
            .map(|pid| {
                Box::new(RandomSelector::seeded(config.seed ^ u64::from(pid)))
                    as Box<dyn ResourceSelector>
            })
            .collect();
        Ok(Self::wire(config, selectors))
    }

    /// Build a simulation with one injected selector per node, in id
    /// order. Used by tests to construct exact contention scenarios.
    pub fn with_selectors(
        config: SimConfig,
        selectors: Vec<Box<dyn ResourceSelector>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if selectors.len() != config.process_count as usize {
            return Err(ConfigError::SelectorCountMismatch {
                supplied: selectors.len(),
                expected: config.process_count,
            });
        }
        Ok(Self::wire(config, selectors))
    }

    fn wire(config: SimConfig, selectors: Vec<Box<dyn ResourceSelector>>) -> Self {
        let pool: Arc<[Arc<Resource>]> = (1..=config.resource_count)
            .map(|i| Arc::new(Resource::new(ResourceId(i))))
            .collect::<Vec<_>>()
            .into();
        Self {
            config,
            selectors,
            pool,
        }
    }

    /// The shared resource pool, in id order.
    ///
    /// Available before [`run`](Simulation::run) so callers can seed an
    /// ownership state (granting is idempotent for the holder, so a
    /// node's own draw then picks the seeded resource back up), and
    /// cloneable for inspecting holders after the run.
    pub fn resources(&self) -> &[Arc<Resource>] {
        &self.pool
    }

    /// Run every node to completion and collect the report.
    ///
    /// Spawns one named thread per node and joins them all; a node
    /// finishes either by budget exhaustion or by harakiri.
    pub fn run(self) -> Result<SimReport, SimError> {
        let started = Instant::now();
        let config = self.config;
        let pool = self.pool;
        let gate = Arc::new(DetectionGate::new());

        // Every mailbox sender goes into the directory before any node
        // starts; the directory is immutable from here on.
        let mut inboxes = Vec::with_capacity(config.process_count as usize);
        let mut handles = Vec::with_capacity(config.process_count as usize);
        for pid in 1..=config.process_count {
            let (tx, rx) = unbounded();
            handles.push(NodeHandle::new(ProcessId(pid), tx));
            inboxes.push((ProcessId(pid), rx));
        }
        let directory = Arc::new(Directory::new(handles));

        info!(
            processes = config.process_count,
            resources = config.resource_count,
            seed = config.seed,
            "simulation wired"
        );

        let mut threads = Vec::with_capacity(inboxes.len());
        for ((pid, mailbox), selector) in inboxes.into_iter().zip(self.selectors) {
            let node = ProcessNode::new(
                pid,
                mailbox,
                Arc::clone(&pool),
                Arc::clone(&directory),
                Arc::clone(&gate),
                selector,
                &config,
            );
            let handle = thread::Builder::new()
                .name(format!("gridlock-node-{pid}"))
                .spawn(move || node.run())
                .map_err(|e| SimError::SpawnFailed {
                    pid,
                    reason: e.to_string(),
                })?;
            threads.push((pid, handle));
        }

        let mut outcomes = Vec::with_capacity(threads.len());
        for (pid, handle) in threads {
            match handle.join() {
                Ok(outcome) => outcomes.push(outcome),
                Err(_) => return Err(SimError::NodePanicked { pid }),
            }
        }

        let elapsed = started.elapsed();
        let deadlocks = outcomes
            .iter()
            .filter(|o| o.termination == Termination::Deadlock)
            .count();
        info!(?elapsed, deadlocks, "simulation finished");
        Ok(SimReport { outcomes, elapsed })
    }
}
