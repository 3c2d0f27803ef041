// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Episodic memory: append-only JSON-lines log of agent decisions, one
//! episode per line. Reads tail the file and filter in memory.

use chrono::{DateTime, Utc};
use inquest_domain::error::InvestigationError;
use inquest_domain::services::datetime_serde;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

const EPISODES_FILE: &str = "episodes.jsonl";
const MAX_REASONING_CHARS: usize = 500;

/// One recorded agent decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub agent_id: String,
    pub investigation_id: String,
    pub action: String,
    pub reasoning: String,
    pub success: bool,
    #[serde(with = "datetime_serde")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// JSONL-backed episodic log.
pub struct EpisodicMemory {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl EpisodicMemory {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            lock: Mutex::new(()),
        }
    }

    pub fn record(
        &self,
        agent_id: &str,
        investigation_id: &str,
        action: &str,
        reasoning: &str,
        success: bool,
        metadata: Option<serde_json::Value>,
    ) -> Result<(), InvestigationError> {
        let episode = Episode {
            agent_id: agent_id.to_string(),
            investigation_id: investigation_id.to_string(),
            action: action.to_string(),
            reasoning: reasoning.chars().take(MAX_REASONING_CHARS).collect(),
            success,
            timestamp: Utc::now(),
            metadata: metadata.unwrap_or(serde_json::Value::Null),
        };
        let line = serde_json::to_string(&episode)?;

        let _guard = self.lock.lock();
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| InvestigationError::io_error(format!("episodic dir: {}", e)))?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(EPISODES_FILE))
            .map_err(|e| InvestigationError::io_error(format!("episodic open: {}", e)))?;
        writeln!(file, "{}", line)
            .map_err(|e| InvestigationError::io_error(format!("episodic write: {}", e)))
    }

    /// Recent episodes, newest last, optionally filtered.
    pub fn episodes(
        &self,
        investigation_id: Option<&str>,
        agent_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Episode>, InvestigationError> {
        let _guard = self.lock.lock();
        let path = self.dir.join(EPISODES_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(InvestigationError::io_error(format!("episodic read: {}", e))),
        };
        let episodes: Vec<Episode> = content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str(l).ok())
            .filter(|e: &Episode| {
                investigation_id.is_none_or(|id| e.investigation_id == id)
                    && agent_id.is_none_or(|id| e.agent_id == id)
            })
            .collect();
        let start = episodes.len().saturating_sub(limit);
        Ok(episodes[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn record_and_read_back() {
        let dir = TempDir::new().unwrap();
        let episodic = EpisodicMemory::new(dir.path().to_path_buf());
        episodic
            .record("ingest", "inv1", "ingested 3 documents", "", true, None)
            .unwrap();
        episodic
            .record("synthesis", "inv1", "built 2 hypotheses", "from patterns", true, None)
            .unwrap();
        let all = episodic.episodes(Some("inv1"), None, 10).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].agent_id, "synthesis");
    }

    #[test]
    fn filters_by_agent() {
        let dir = TempDir::new().unwrap();
        let episodic = EpisodicMemory::new(dir.path().to_path_buf());
        episodic.record("a", "inv1", "x", "", true, None).unwrap();
        episodic.record("b", "inv1", "y", "", false, None).unwrap();
        let only_b = episodic.episodes(None, Some("b"), 10).unwrap();
        assert_eq!(only_b.len(), 1);
        assert!(!only_b[0].success);
    }

    #[test]
    fn reasoning_is_truncated() {
        let dir = TempDir::new().unwrap();
        let episodic = EpisodicMemory::new(dir.path().to_path_buf());
        let long = "r".repeat(1000);
        episodic.record("a", "inv1", "x", &long, true, None).unwrap();
        let episodes = episodic.episodes(None, None, 1).unwrap();
        assert_eq!(episodes[0].reasoning.len(), MAX_REASONING_CHARS);
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let episodic = EpisodicMemory::new(dir.path().to_path_buf());
        assert!(episodic.episodes(None, None, 10).unwrap().is_empty());
    }
}
