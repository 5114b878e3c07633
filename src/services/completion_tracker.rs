//! Completed-set snapshot and diffing.

use std::collections::HashSet;

/// Names that entered and left the completed set between two polls.
///
/// Both lists keep discovery order: `added` follows the order of the new
/// poll, `removed` the order of the previous snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl CompletionDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Remembers the previously observed completed set.
#[derive(Debug, Default)]
pub struct CompletionTracker {
    previous: Vec<String>,
    index: HashSet<String>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `added = current \ previous`, `removed = previous \ current`.
    pub fn diff(&self, current: &[String]) -> CompletionDiff {
        let current_set: HashSet<&str> = current.iter().map(String::as_str).collect();
        let mut emitted = HashSet::new();

        let added = current
            .iter()
            .filter(|name| !self.index.contains(*name) && emitted.insert(name.as_str()))
            .cloned()
            .collect();

        let removed = self
            .previous
            .iter()
            .filter(|name| !current_set.contains(name.as_str()))
            .cloned()
            .collect();

        CompletionDiff { added, removed }
    }

    /// Replace the snapshot wholesale; duplicates keep their first position.
    pub fn commit(&mut self, current: Vec<String>) {
        self.index.clear();
        self.previous.clear();
        for name in current {
            if self.index.insert(name.clone()) {
                self.previous.push(name);
            }
        }
    }

    /// Diff against the snapshot, then replace it.
    pub fn observe(&mut self, current: Vec<String>) -> CompletionDiff {
        let diff = self.diff(&current);
        self.commit(current);
        diff
    }

    pub fn completed(&self) -> &[String] {
        &self.previous
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    pub fn clear(&mut self) {
        self.previous.clear();
        self.index.clear();
    }
}
