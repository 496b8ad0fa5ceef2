//! Simulation engine driving Gridlock contention runs.
//!
//! Provides the exclusive [`Resource`] primitive, the per-node
//! request/acquire/release lifecycle, the Chandy-Misra-Haas probe
//! propagation protocol, the process-wide [`DetectionGate`], and the
//! [`Simulation`] harness that wires and runs a full contention session.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod directory;
pub mod gate;
pub mod node;
pub mod request;
pub mod resource;
pub mod selector;
pub mod sim;

pub use config::{ConfigError, SimConfig};
pub use directory::{Directory, NodeHandle};
pub use gate::DetectionGate;
pub use node::{NodeOutcome, Termination};
pub use request::ResourceRequest;
pub use resource::Resource;
pub use selector::RandomSelector;
pub use sim::{SimError, SimReport, Simulation};
