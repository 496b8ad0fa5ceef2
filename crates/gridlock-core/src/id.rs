//! Strongly-typed identifiers for processes and resources.

use std::fmt;

/// Identifies a process node within a simulation.
///
/// Processes are created at simulation startup and assigned sequential
/// IDs starting from 1. The ID doubles as the probe wire format's actor
/// identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub u32);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProcessId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a resource within the shared pool.
///
/// Resources are created once at simulation startup with sequential IDs
/// starting from 1 and are never destroyed during a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u32);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ResourceId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
