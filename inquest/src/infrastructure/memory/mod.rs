// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Memory Facade
//!
//! One entry point over the three memory layers:
//!
//! - **Short-term**: in-memory per-investigation key/value store, cleared on
//!   consolidation.
//! - **Long-term**: JSON knowledge base on disk (patterns, entity profiles,
//!   investigation history) with bounded retention.
//! - **Episodic**: append-only JSON-lines log of agent decisions.
//!
//! Consolidation runs once per completed investigation (after the compliance
//! gate): important short-term entries and the run's top patterns are
//! promoted to long-term memory, a history entry is appended, and the
//! short-term slate is wiped.

mod episodic;
mod long_term;
mod short_term;

pub use episodic::{Episode, EpisodicMemory};
pub use long_term::{LongTermMemory, StoredPattern};
pub use short_term::{ShortTermMemory, StmEntry};

use inquest_domain::aggregates::InvestigationState;
use inquest_domain::error::InvestigationError;
use std::path::PathBuf;
use tracing::info;

/// Short-term entries at or above this importance survive consolidation.
pub const STM_IMPORTANCE_THRESHOLD: f64 = 0.8;
/// State patterns promoted to long-term memory per run.
const PATTERNS_PROMOTED: usize = 20;

/// Facade over all memory layers.
pub struct MemoryManager {
    stm: ShortTermMemory,
    ltm: LongTermMemory,
    episodic: EpisodicMemory,
}

impl MemoryManager {
    pub fn new(knowledge_base_dir: PathBuf) -> Self {
        Self {
            stm: ShortTermMemory::new(),
            ltm: LongTermMemory::new(knowledge_base_dir.clone()),
            episodic: EpisodicMemory::new(knowledge_base_dir.join("episodic")),
        }
    }

    pub fn stm(&self) -> &ShortTermMemory {
        &self.stm
    }

    pub fn ltm(&self) -> &LongTermMemory {
        &self.ltm
    }

    pub fn episodic(&self) -> &EpisodicMemory {
        &self.episodic
    }

    /// Long-term patterns scored by keyword overlap with the query text.
    pub fn query_patterns_by_concept(
        &self,
        query: &str,
        min_confidence: f64,
        limit: usize,
    ) -> Result<Vec<StoredPattern>, InvestigationError> {
        let patterns = self.ltm.get_patterns(None, min_confidence)?;
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(patterns.into_iter().take(limit).collect());
        }
        let words: Vec<&str> = query.split_whitespace().collect();
        let mut scored: Vec<(usize, StoredPattern)> = patterns
            .into_iter()
            .filter_map(|p| {
                let haystack =
                    format!("{} {}", p.description.to_lowercase(), p.evidence.join(" ").to_lowercase());
                let score = words.iter().filter(|w| haystack.contains(*w)).count();
                (score > 0).then_some((score, p))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored.into_iter().map(|(_, p)| p).take(limit).collect())
    }

    /// End-of-investigation consolidation: promote important short-term
    /// entries and the run's top patterns, append history, clear short-term.
    pub fn consolidate(
        &self,
        investigation_id: &str,
        state: &InvestigationState,
    ) -> Result<(), InvestigationError> {
        for entry in self.stm.retrieve(investigation_id, None, Some(STM_IMPORTANCE_THRESHOLD)) {
            if let Some(pattern_type) = entry.content.get("pattern_type").and_then(|v| v.as_str()) {
                self.ltm.store_pattern(
                    pattern_type,
                    entry.content.get("description").and_then(|v| v.as_str()).unwrap_or(""),
                    Vec::new(),
                    entry
                        .content
                        .get("confidence")
                        .and_then(|v| v.as_f64())
                        .unwrap_or(0.5),
                    Some(investigation_id),
                )?;
            }
            if let Some(entity) = entry.content.get("entity").and_then(|v| v.as_str()) {
                self.ltm
                    .store_entity_profile(entity, entry.content.clone(), Some(investigation_id))?;
            }
        }

        for pattern in state.patterns.iter().take(PATTERNS_PROMOTED) {
            let evidence = if pattern.evidence.is_empty() {
                pattern.entities_involved.iter().map(|e| e.to_string()).collect()
            } else {
                pattern.evidence.clone()
            };
            self.ltm.store_pattern(
                &pattern.category.to_string(),
                &pattern.description,
                evidence,
                pattern.confidence,
                Some(investigation_id),
            )?;
        }

        self.ltm.append_investigation_history(
            investigation_id,
            serde_json::json!({
                "document_count": state.documents.len(),
                "entity_count": state.entities.len(),
                "relationship_count": state.relationships.len(),
                "current_step": state.current_step,
                "odos_status": state.odos_status.map(|s| s.to_string()),
            }),
        )?;
        self.stm.clear(investigation_id);
        info!("consolidated memories for {}", investigation_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inquest_domain::entities::{Pattern, PatternCategory, Severity};
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> MemoryManager {
        MemoryManager::new(dir.path().to_path_buf())
    }

    fn pattern(description: &str) -> Pattern {
        Pattern {
            pattern_id: "p1".to_string(),
            category: PatternCategory::Frequency,
            description: description.to_string(),
            entities_involved: vec![],
            severity: Severity::Low,
            occurrences: 3,
            confidence: 0.8,
            evidence: vec!["contrato".to_string()],
        }
    }

    #[test]
    fn consolidation_promotes_patterns_and_clears_stm() {
        let dir = TempDir::new().unwrap();
        let memory = manager(&dir);
        memory.stm().store(
            "inv1",
            "finding",
            serde_json::json!({"pattern_type": "frequency", "description": "x", "confidence": 0.9}),
            0.9,
            None,
        );
        let mut state = InvestigationState::default();
        state.patterns.push(pattern("Term 'contrato' count 5"));

        memory.consolidate("inv1", &state).unwrap();

        let stored = memory.ltm().get_patterns(None, 0.0).unwrap();
        assert!(stored.len() >= 2);
        assert!(memory.stm().retrieve("inv1", None, None).is_empty());
        let history = memory.ltm().get_investigation_history(10).unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn low_importance_stm_entries_are_not_promoted() {
        let dir = TempDir::new().unwrap();
        let memory = manager(&dir);
        memory.stm().store(
            "inv1",
            "noise",
            serde_json::json!({"pattern_type": "frequency", "description": "n"}),
            0.2,
            None,
        );
        memory.consolidate("inv1", &InvestigationState::default()).unwrap();
        assert!(memory.ltm().get_patterns(None, 0.0).unwrap().is_empty());
    }

    #[test]
    fn concept_query_ranks_by_overlap() {
        let dir = TempDir::new().unwrap();
        let memory = manager(&dir);
        memory
            .ltm()
            .store_pattern("frequency", "pagamento offshore recorrente", vec![], 0.9, None)
            .unwrap();
        memory
            .ltm()
            .store_pattern("frequency", "relatório técnico", vec![], 0.9, None)
            .unwrap();
        let hits = memory.query_patterns_by_concept("pagamento offshore", 0.0, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].description.contains("offshore"));
    }
}
