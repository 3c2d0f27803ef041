// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Long-term memory: JSON knowledge base on disk. Three files — learned
//! patterns (last 500), entity profiles (last 20 per entity), investigation
//! history (last 100) — each read-modify-written under one mutex.

use inquest_domain::error::InvestigationError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const PATTERNS_FILE: &str = "patterns.json";
const PROFILES_FILE: &str = "entity_profiles.json";
const HISTORY_FILE: &str = "investigation_history.json";

const MAX_PATTERNS: usize = 500;
const MAX_PROFILES_PER_ENTITY: usize = 20;
const MAX_HISTORY: usize = 100;

/// A learned pattern in the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPattern {
    pub pattern_type: String,
    pub description: String,
    pub evidence: Vec<String>,
    pub confidence: f64,
    pub investigation_id: Option<String>,
}

/// One profile observation of an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredProfile {
    pub profile: serde_json::Value,
    pub investigation_id: Option<String>,
}

/// Mutex-guarded JSON knowledge base.
pub struct LongTermMemory {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl LongTermMemory {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            lock: Mutex::new(()),
        }
    }

    fn load<T: for<'de> Deserialize<'de>>(path: &Path, default: T) -> T {
        match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or(default),
            Err(_) => default,
        }
    }

    fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), InvestigationError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| InvestigationError::io_error(format!("knowledge base dir: {}", e)))?;
        let payload = serde_json::to_vec_pretty(value)?;
        std::fs::write(path, payload)
            .map_err(|e| InvestigationError::io_error(format!("knowledge base write: {}", e)))
    }

    pub fn store_pattern(
        &self,
        pattern_type: &str,
        description: &str,
        evidence: Vec<String>,
        confidence: f64,
        investigation_id: Option<&str>,
    ) -> Result<(), InvestigationError> {
        let _guard = self.lock.lock();
        let path = self.dir.join(PATTERNS_FILE);
        let mut patterns: Vec<StoredPattern> = Self::load(&path, Vec::new());
        patterns.push(StoredPattern {
            pattern_type: pattern_type.to_string(),
            description: description.to_string(),
            evidence,
            confidence,
            investigation_id: investigation_id.map(String::from),
        });
        if patterns.len() > MAX_PATTERNS {
            let excess = patterns.len() - MAX_PATTERNS;
            patterns.drain(..excess);
        }
        self.save(&path, &patterns)
    }

    pub fn get_patterns(
        &self,
        pattern_type: Option<&str>,
        min_confidence: f64,
    ) -> Result<Vec<StoredPattern>, InvestigationError> {
        let _guard = self.lock.lock();
        let patterns: Vec<StoredPattern> = Self::load(&self.dir.join(PATTERNS_FILE), Vec::new());
        Ok(patterns
            .into_iter()
            .filter(|p| pattern_type.is_none_or(|t| p.pattern_type == t))
            .filter(|p| p.confidence >= min_confidence)
            .collect())
    }

    pub fn store_entity_profile(
        &self,
        entity_text: &str,
        profile: serde_json::Value,
        investigation_id: Option<&str>,
    ) -> Result<(), InvestigationError> {
        let _guard = self.lock.lock();
        let path = self.dir.join(PROFILES_FILE);
        let mut profiles: std::collections::BTreeMap<String, Vec<StoredProfile>> =
            Self::load(&path, Default::default());
        let key = if entity_text.trim().is_empty() {
            "_unknown".to_string()
        } else {
            entity_text.trim().to_string()
        };
        let entry = profiles.entry(key).or_default();
        entry.push(StoredProfile {
            profile,
            investigation_id: investigation_id.map(String::from),
        });
        if entry.len() > MAX_PROFILES_PER_ENTITY {
            let excess = entry.len() - MAX_PROFILES_PER_ENTITY;
            entry.drain(..excess);
        }
        self.save(&path, &profiles)
    }

    pub fn get_entity_profiles(
        &self,
        entity_text: Option<&str>,
    ) -> Result<std::collections::BTreeMap<String, Vec<StoredProfile>>, InvestigationError> {
        let _guard = self.lock.lock();
        let profiles: std::collections::BTreeMap<String, Vec<StoredProfile>> =
            Self::load(&self.dir.join(PROFILES_FILE), Default::default());
        match entity_text {
            None => Ok(profiles),
            Some(text) => {
                let key = text.trim();
                Ok(profiles.into_iter().filter(|(k, _)| k == key).collect())
            }
        }
    }

    pub fn append_investigation_history(
        &self,
        investigation_id: &str,
        summary: serde_json::Value,
    ) -> Result<(), InvestigationError> {
        let _guard = self.lock.lock();
        let path = self.dir.join(HISTORY_FILE);
        let mut history: Vec<serde_json::Value> = Self::load(&path, Vec::new());
        let mut entry = serde_json::Map::new();
        entry.insert(
            "investigation_id".to_string(),
            serde_json::Value::String(investigation_id.to_string()),
        );
        if let serde_json::Value::Object(map) = summary {
            entry.extend(map);
        }
        history.push(serde_json::Value::Object(entry));
        if history.len() > MAX_HISTORY {
            let excess = history.len() - MAX_HISTORY;
            history.drain(..excess);
        }
        self.save(&path, &history)
    }

    pub fn get_investigation_history(
        &self,
        limit: usize,
    ) -> Result<Vec<serde_json::Value>, InvestigationError> {
        let _guard = self.lock.lock();
        let history: Vec<serde_json::Value> = Self::load(&self.dir.join(HISTORY_FILE), Vec::new());
        let start = history.len().saturating_sub(limit);
        Ok(history[start..].to_vec())
    }
}
