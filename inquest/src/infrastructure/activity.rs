// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Activity Monitor
//!
//! Bounded ring buffer of the last 500 stage activity events, shared by every
//! investigation running in the process. Multi-reader: consumers poll
//! [`ActivityMonitor::recent`] and filter by investigation id. The buffer is
//! the only cross-investigation mutable structure besides the ledger and the
//! memory stores, and it is mutex-guarded like them.

use inquest_domain::events::{ActivityEvent, ActivityStep};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Maximum retained events.
pub const ACTIVITY_BUFFER_CAP: usize = 500;

/// Thread-safe bounded activity buffer.
pub struct ActivityMonitor {
    events: Mutex<VecDeque<ActivityEvent>>,
}

impl ActivityMonitor {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(ACTIVITY_BUFFER_CAP)),
        }
    }

    /// Appends an event, evicting the oldest when the buffer is full.
    pub fn emit(&self, event: ActivityEvent) {
        let mut events = self.events.lock();
        if events.len() == ACTIVITY_BUFFER_CAP {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Convenience wrapper building the event in place.
    pub fn emit_step(
        &self,
        agent: &str,
        step: ActivityStep,
        investigation_id: Option<String>,
        payload: &[(&str, serde_json::Value)],
    ) {
        let mut event = ActivityEvent::now(agent, step, investigation_id);
        for (key, value) in payload {
            event = event.with_payload(*key, value.clone());
        }
        self.emit(event);
    }

    /// The last `n` events (oldest first), optionally filtered by
    /// investigation id.
    pub fn recent(&self, n: usize, investigation_id: Option<&str>) -> Vec<ActivityEvent> {
        let events = self.events.lock();
        let filtered: Vec<ActivityEvent> = events
            .iter()
            .filter(|e| match investigation_id {
                Some(id) => e.investigation_id.as_deref() == Some(id),
                None => true,
            })
            .cloned()
            .collect();
        let start = filtered.len().saturating_sub(n);
        filtered[start..].to_vec()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl Default for ActivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}
