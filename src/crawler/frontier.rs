use crate::url::normalize_url;
use std::collections::{HashSet, VecDeque};

/// Breadth-first crawl frontier with a visited set
///
/// Every URL is normalized on the way in, so the visited set never holds two
/// normalization-equivalent entries. The queue may hold duplicates (two
/// pages can discover the same link before either copy is popped); the
/// visited check at pop time filters them.
pub(crate) struct Frontier {
    queue: VecDeque<(String, u32)>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
        }
    }

    /// Enqueues a URL at the given depth unless it was already visited
    pub fn push(&mut self, url: &str, depth: u32) {
        let normalized = normalize_url(url);
        if self.visited.contains(&normalized) {
            return;
        }
        self.queue.push_back((normalized, depth));
    }

    /// Removes and returns the oldest pending entry
    pub fn pop(&mut self) -> Option<(String, u32)> {
        self.queue.pop_front()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(&normalize_url(url))
    }

    /// Marks a URL visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(normalize_url(url))
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Total distinct pages seen so far: visited plus still queued
    pub fn discovered(&self) -> usize {
        self.visited.len() + self.queue.len()
    }
}
