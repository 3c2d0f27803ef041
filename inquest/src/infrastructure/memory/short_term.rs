// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Short-term memory: in-process key/value entries scoped by investigation
//! (and optionally agent), each with an importance weight that decides
//! whether consolidation promotes it to long-term memory.

use parking_lot::Mutex;
use std::collections::BTreeMap;

/// One short-term entry.
#[derive(Debug, Clone)]
pub struct StmEntry {
    pub investigation_id: String,
    pub agent_id: Option<String>,
    pub key: String,
    pub content: serde_json::Value,
    pub importance: f64,
}

/// Mutex-guarded short-term store.
pub struct ShortTermMemory {
    store: Mutex<BTreeMap<String, StmEntry>>,
}

impl ShortTermMemory {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(BTreeMap::new()),
        }
    }

    fn composite_key(investigation_id: &str, agent_id: Option<&str>, key: &str) -> String {
        format!("{}:{}:{}", investigation_id, agent_id.unwrap_or("global"), key)
    }

    pub fn store(
        &self,
        investigation_id: &str,
        key: &str,
        content: serde_json::Value,
        importance: f64,
        agent_id: Option<&str>,
    ) {
        let entry = StmEntry {
            investigation_id: investigation_id.to_string(),
            agent_id: agent_id.map(String::from),
            key: key.to_string(),
            content,
            importance,
        };
        self.store
            .lock()
            .insert(Self::composite_key(investigation_id, agent_id, key), entry);
    }

    /// Entries for an investigation, optionally filtered by agent and
    /// minimum importance.
    pub fn retrieve(
        &self,
        investigation_id: &str,
        agent_id: Option<&str>,
        min_importance: Option<f64>,
    ) -> Vec<StmEntry> {
        let store = self.store.lock();
        store
            .values()
            .filter(|e| e.investigation_id == investigation_id)
            .filter(|e| agent_id.is_none() || e.agent_id.as_deref() == agent_id)
            .filter(|e| min_importance.is_none_or(|min| e.importance >= min))
            .cloned()
            .collect()
    }

    pub fn get_content(
        &self,
        investigation_id: &str,
        key: &str,
        agent_id: Option<&str>,
    ) -> Option<serde_json::Value> {
        self.store
            .lock()
            .get(&Self::composite_key(investigation_id, agent_id, key))
            .map(|e| e.content.clone())
    }

    /// Drops every entry of one investigation.
    pub fn clear(&self, investigation_id: &str) {
        self.store
            .lock()
            .retain(|_, e| e.investigation_id != investigation_id);
    }
}

impl Default for ShortTermMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_and_retrieve_by_investigation() {
        let stm = ShortTermMemory::new();
        stm.store("inv1", "k1", serde_json::json!(1), 0.5, None);
        stm.store("inv2", "k1", serde_json::json!(2), 0.5, None);
        assert_eq!(stm.retrieve("inv1", None, None).len(), 1);
    }

    #[test]
    fn importance_filter_applies() {
        let stm = ShortTermMemory::new();
        stm.store("inv1", "low", serde_json::json!(1), 0.2, None);
        stm.store("inv1", "high", serde_json::json!(2), 0.9, None);
        let important = stm.retrieve("inv1", None, Some(0.8));
        assert_eq!(important.len(), 1);
        assert_eq!(important[0].key, "high");
    }

    #[test]
    fn agent_scoping_separates_entries() {
        let stm = ShortTermMemory::new();
        stm.store("inv1", "k", serde_json::json!("global"), 0.5, None);
        stm.store("inv1", "k", serde_json::json!("scoped"), 0.5, Some("ingest"));
        assert_eq!(
            stm.get_content("inv1", "k", Some("ingest")),
            Some(serde_json::json!("scoped"))
        );
        assert_eq!(stm.get_content("inv1", "k", None), Some(serde_json::json!("global")));
    }

    #[test]
    fn clear_scopes_to_investigation() {
        let stm = ShortTermMemory::new();
        stm.store("inv1", "k", serde_json::json!(1), 0.5, None);
        stm.store("inv2", "k", serde_json::json!(2), 0.5, None);
        stm.clear("inv1");
        assert!(stm.retrieve("inv1", None, None).is_empty());
        assert_eq!(stm.retrieve("inv2", None, None).len(), 1);
    }
}
