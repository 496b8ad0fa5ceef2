//! Test utilities for Gridlock development.
//!
//! Provides deterministic [`ResourceSelector`] implementations so tests
//! can construct exact contention scenarios: a scripted selector that
//! replays a fixed sequence of draws, and an idle selector that never
//! requests anything.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::VecDeque;

use gridlock_core::{ResourceSelector, Selection};

/// Replays a fixed script of draws, then idles forever.
///
/// Each call to `select` pops the next scripted draw; once the script is
/// exhausted every draw is empty. Indices are taken as-is, so a script
/// can pin down exactly which resources each node contends for.
pub struct ScriptedSelector {
    script: VecDeque<Vec<usize>>,
}

impl ScriptedSelector {
    pub fn new(script: impl IntoIterator<Item = Vec<usize>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// A selector whose only draw is `picks`.
    pub fn once(picks: Vec<usize>) -> Self {
        Self::new([picks])
    }
}

impl ResourceSelector for ScriptedSelector {
    fn select(&mut self, _pool_size: usize) -> Selection {
        self.script
            .pop_front()
            .map(Selection::from_vec)
            .unwrap_or_default()
    }
}

/// Never requests anything.
pub struct IdleSelector;

impl ResourceSelector for IdleSelector {
    fn select(&mut self, _pool_size: usize) -> Selection {
        Selection::new()
    }
}
