//! Bounded in-memory cache of engine evaluations, keyed by position.
//!
//! Callers own the cache and pass it where it is needed. When full, the
//! entry inserted longest ago is evicted; updating an existing key does not
//! refresh its place in that order.

use std::collections::{HashMap, VecDeque};

use chess_core::notation::normalize_fen;
use serde::{Deserialize, Serialize};

/// Engine verdict for a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineEval {
    /// Coordinate form, e.g. `f3e5`
    pub best_move: String,
    /// Centipawns from the side to move's point of view
    pub cp: i32,
}

#[derive(Debug, Clone)]
pub struct EvalCache {
    capacity: usize,
    entries: HashMap<String, EngineEval>,
    order: VecDeque<String>,
}

impl EvalCache {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a position; move counters in `fen` are ignored.
    pub fn get(&self, fen: &str) -> Option<&EngineEval> {
        self.entries.get(&normalize_fen(fen))
    }

    pub fn contains(&self, fen: &str) -> bool {
        self.entries.contains_key(&normalize_fen(fen))
    }

    /// Insert or update. Returns the evicted position key, if any.
    pub fn insert(&mut self, fen: &str, eval: EngineEval) -> Option<String> {
        let key = normalize_fen(fen);
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = eval;
            return None;
        }

        let mut evicted = None;
        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                tracing::trace!(fen = %oldest, "Evicted cached evaluation");
                evicted = Some(oldest);
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, eval);
        evicted
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
