//! The probe message exchanged by the edge-chasing detection protocol.

use std::fmt;

use crate::id::ProcessId;

/// A Chandy-Misra-Haas probe, the only inter-node wire format.
///
/// A probe walks the implicit wait-for graph one edge at a time. The
/// `initiator` field is fixed for the lifetime of a detection round;
/// `sender` and `receiver` are rewritten at each hop. A probe arriving
/// back at its initiator proves a cycle through that node.
///
/// # Examples
///
/// ```
/// use gridlock_core::{ProbeMessage, ProcessId};
///
/// let probe = ProbeMessage::new(ProcessId(1), ProcessId(1), ProcessId(2));
/// let hop = probe.forwarded(ProcessId(2), ProcessId(3));
///
/// assert_eq!(hop.initiator, ProcessId(1));
/// assert_eq!(hop.sender, ProcessId(2));
/// assert_eq!(hop.receiver, ProcessId(3));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProbeMessage {
    /// The node that started this detection round.
    pub initiator: ProcessId,
    /// The node that sent this hop.
    pub sender: ProcessId,
    /// The node this hop is addressed to.
    pub receiver: ProcessId,
}

impl ProbeMessage {
    /// Create a probe for the first hop of a detection round.
    pub fn new(initiator: ProcessId, sender: ProcessId, receiver: ProcessId) -> Self {
        Self {
            initiator,
            sender,
            receiver,
        }
    }

    /// Derive the next-hop probe.
    ///
    /// The initiator is carried over unchanged; only the hop endpoints
    /// are rewritten.
    pub fn forwarded(&self, sender: ProcessId, receiver: ProcessId) -> Self {
        Self {
            initiator: self.initiator,
            sender,
            receiver,
        }
    }
}

impl fmt::Display for ProbeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "probe({} -> {}, initiated by {})",
            self.sender, self.receiver, self.initiator
        )
    }
}
