//! Causality primitives every node carries: identity, a Lamport clock, an
//! operation stack, and a registry of known peers and resources.
//!
//! A [`Remote`](crate::Remote) owns exactly one [`CausalState`] and exposes
//! it as a public field. The verb layer never reads or writes it; higher
//! layers record what they did and what they learned here.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::transport::Method;

/// One entry on a node's operation stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub method: Method,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Clock value assigned when the operation was recorded.
    pub clock: u64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CausalState {
    /// Stable for the lifetime of the node.
    pub id: Uuid,
    pub clock: u64,
    pub stack: Vec<Operation>,
    pub known: HashMap<String, Value>,
}

impl Default for CausalState {
    fn default() -> Self {
        Self::new()
    }
}

impl CausalState {
    /// Fresh state: new UUIDv7 identity, clock 0, empty stack and registry.
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            clock: 0,
            stack: Vec::new(),
            known: HashMap::new(),
        }
    }

    /// Advance the clock for a local event and return the new value.
    pub fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Merge a clock value seen on a message from elsewhere.
    pub fn observe(&mut self, remote_clock: u64) -> u64 {
        self.clock = self.clock.max(remote_clock) + 1;
        self.clock
    }

    /// Tick and push an operation stamped with the new clock value, which
    /// is returned.
    pub fn record(
        &mut self,
        method: Method,
        path: impl Into<String>,
        payload: Option<Value>,
    ) -> u64 {
        let clock = self.tick();
        self.push(Operation {
            method,
            path: path.into(),
            payload,
            clock,
            recorded_at: Utc::now(),
        });
        clock
    }

    /// Push an operation as-is; the clock is not touched.
    pub fn push(&mut self, operation: Operation) {
        self.stack.push(operation);
    }

    /// Oldest first.
    pub fn stack(&self) -> &[Operation] {
        &self.stack
    }

    /// The most recently pushed operation.
    pub fn last(&self) -> Option<&Operation> {
        self.stack.last()
    }

    pub fn pop(&mut self) -> Option<Operation> {
        self.stack.pop()
    }

    /// Store (or replace) what is known about `id`; returns the old entry.
    pub fn remember(&mut self, id: impl Into<String>, descriptor: Value) -> Option<Value> {
        self.known.insert(id.into(), descriptor)
    }

    pub fn known(&self, id: &str) -> Option<&Value> {
        self.known.get(id)
    }

    /// Registered identifiers, sorted.
    pub fn known_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.known.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
