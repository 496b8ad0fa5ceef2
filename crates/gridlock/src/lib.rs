//! Gridlock: a resource contention simulator with Chandy-Misra-Haas
//! deadlock detection.
//!
//! This is the top-level facade crate that re-exports the public API
//! from the Gridlock sub-crates. For most users, adding `gridlock` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use gridlock::prelude::*;
//! use std::time::Duration;
//!
//! // A short contention session: 3 processes, 2 resources.
//! let config = SimConfig {
//!     process_count: 3,
//!     resource_count: 2,
//!     seed: 42,
//!     run_for: Duration::from_millis(60),
//!     wait_suspect: Duration::from_millis(15),
//!     usage_complete: Duration::from_millis(25),
//!     pass_interval: Duration::from_millis(5),
//! };
//!
//! let report = Simulation::new(config).unwrap().run().unwrap();
//! assert_eq!(report.outcomes.len(), 3);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `gridlock-core` | IDs, the probe message, the selector trait |
//! | [`engine`] | `gridlock-engine` | Resources, process nodes, the detection gate, the harness |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`gridlock-core`).
///
/// Contains [`types::ProcessId`], [`types::ResourceId`], the
/// [`types::ProbeMessage`] wire record, and the
/// [`types::ResourceSelector`] seam.
pub use gridlock_core as types;

/// The simulation engine (`gridlock-engine`).
///
/// [`engine::Simulation`] wires and runs a contention session;
/// [`engine::Resource`], [`engine::DetectionGate`], and the node
/// lifecycle live here too.
pub use gridlock_engine as engine;

/// Common imports for typical Gridlock usage.
///
/// ```rust
/// use gridlock::prelude::*;
/// ```
pub mod prelude {
    pub use gridlock_core::{ProbeMessage, ProcessId, ResourceId, ResourceSelector, Selection};

    pub use gridlock_engine::{
        ConfigError, DetectionGate, NodeOutcome, Resource, SimConfig, SimError, SimReport,
        Simulation, Termination,
    };
}
