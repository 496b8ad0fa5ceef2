//! Core types and traits for the Gridlock contention simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Gridlock workspace:
//! typed process and resource IDs, the probe message exchanged between
//! process nodes, and the resource selection trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod id;
pub mod probe;
pub mod select;

pub use id::{ProcessId, ResourceId};
pub use probe::ProbeMessage;
pub use select::{ResourceSelector, Selection};
