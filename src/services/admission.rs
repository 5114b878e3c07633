//! Capacity policy and backlog for live instances.

use std::collections::VecDeque;

/// Default number of concurrently live instances.
pub const DEFAULT_CAPACITY: usize = 3;

/// Fixed capacity plus a FIFO backlog of names waiting for a slot.
#[derive(Debug)]
pub struct AdmissionController {
    capacity: usize,
    pending: VecDeque<String>,
}

impl Default for AdmissionController {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl AdmissionController {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            pending: VecDeque::new(),
        }
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Admission is permitted while `live < capacity`.
    pub const fn has_capacity(&self, live: usize) -> bool {
        live < self.capacity
    }

    /// Append to the backlog; returns false if already queued.
    pub fn enqueue(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.is_pending(&name) {
            return false;
        }
        self.pending.push_back(name);
        true
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.pending.iter().any(|p| p == name)
    }

    /// Drop a name from the backlog without admitting it.
    pub fn remove_pending(&mut self, name: &str) -> bool {
        match self.pending.iter().position(|p| p == name) {
            Some(idx) => {
                self.pending.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Remove and return the earliest queued name for which `accept` yields a
    /// value. Names it rejects keep their place.
    pub fn take_first<T, F>(&mut self, mut accept: F) -> Option<(String, T)>
    where
        F: FnMut(&str) -> Option<T>,
    {
        let (idx, value) = self
            .pending
            .iter()
            .enumerate()
            .find_map(|(idx, name)| accept(name).map(|value| (idx, value)))?;
        self.pending.remove(idx).map(|name| (name, value))
    }

    pub fn pending(&self) -> Vec<String> {
        self.pending.iter().cloned().collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
