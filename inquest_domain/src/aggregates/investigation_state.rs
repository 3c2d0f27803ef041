// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Investigation State
//!
//! The single mutable record threaded through the ten-stage pipeline. The
//! orchestrator owns the value and hands each stage a mutable reference;
//! stages never call each other and communicate only through these fields.
//!
//! ## Write discipline
//!
//! Each stage is the sole writer of its output fields and may read any field
//! written by an earlier stage. Nothing is deleted within a run; a value is
//! replaced only by the stage that originally wrote it. A strict
//! happens-before holds: stage N sees all writes of stages 1..N−1.
//!
//! ## Versioning
//!
//! `version` is monotone and `last_updated` is refreshed by
//! [`InvestigationState::touch_for_save`] on every external save (checkpoint
//! or investigation-store write), never by in-memory mutation.
//!
//! ## Collections
//!
//! Keyed collections are `BTreeMap`s so iteration order is deterministic;
//! parallel per-document work merges into them in sorted order, making
//! results equivalent to sequential execution up to stable ordering.

use crate::entities::{
    Anomaly, Classification, ComplianceReport, ComplianceStatus, Contradiction,
    CryptographyFinding, CryptoSegment, Document, Entity, Hypothesis, Lead, NarrativeThread,
    Pattern, Relationship, SemanticLink, TemporalAnomaly, TimelineEvent,
};
use crate::services::datetime_serde;
use crate::value_objects::{DocumentId, EntityId, InvestigationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-run configuration stamped into the state by the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    pub uploads_path: Option<String>,
    pub investigation_id: Option<InvestigationId>,
}

/// One row of the centrality leaderboard in [`GraphMetadata`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopEntity {
    pub entity_id: EntityId,
    pub text: String,
    pub centrality: f64,
    pub community: Option<i64>,
}

/// Read-back statistics and derived rankings from the graph store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub node_count: usize,
    pub edge_count: usize,
    #[serde(default)]
    pub entity_types: BTreeMap<String, usize>,
    #[serde(default)]
    pub top_entities: Vec<TopEntity>,
    /// Bridge entities ranked by betweenness, `(entity_id, text, score)`.
    #[serde(default)]
    pub bridges: Vec<(EntityId, String, f64)>,
    pub community_count: usize,
}

/// Central state of one investigation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationState {
    // Ingestion
    pub documents: BTreeMap<DocumentId, Document>,
    pub extracted_text: BTreeMap<DocumentId, String>,

    // Classification
    pub classifications: BTreeMap<DocumentId, Classification>,

    // Entity extraction
    pub entities: BTreeMap<EntityId, Entity>,
    /// Canonical text → entity ids carrying that text.
    pub entity_registry: BTreeMap<String, Vec<EntityId>>,
    pub relationships: Vec<Relationship>,

    // Cryptanalysis
    pub encrypted_segments: Vec<CryptoSegment>,
    pub cryptography_findings: Vec<CryptographyFinding>,
    /// Segment id → decoded text.
    pub decrypted_content: BTreeMap<String, String>,

    // Semantic linking
    pub semantic_links: Vec<SemanticLink>,
    pub contradictions: Vec<Contradiction>,
    pub narrative_threads: Vec<NarrativeThread>,

    // Timeline
    pub timeline: Vec<TimelineEvent>,
    pub temporal_anomalies: Vec<TemporalAnomaly>,

    // Pattern recognition
    pub patterns: Vec<Pattern>,
    pub outliers: Vec<String>,
    pub anomalies: Vec<Anomaly>,

    // Graph construction
    pub graph_metadata: GraphMetadata,
    pub centrality_scores: BTreeMap<EntityId, f64>,
    pub communities: BTreeMap<i64, Vec<EntityId>>,

    // Synthesis
    pub hypotheses: Vec<Hypothesis>,
    pub leads: Vec<Lead>,
    pub report_summary: Option<String>,

    // Compliance gate
    pub odos_status: Option<ComplianceStatus>,
    pub delta_e: f64,
    pub fidelity: f64,
    pub rcf: f64,
    pub compliance_report: ComplianceReport,

    // Run bookkeeping
    pub current_step: String,
    pub iteration_count: u32,
    pub human_feedback: Option<String>,
    pub error_log: Vec<String>,
    pub config: RunConfig,

    // External-save versioning
    pub version: u64,
    #[serde(with = "datetime_serde::opt")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl InvestigationState {
    /// Fresh state: all collections empty, `current_step = initialization`,
    /// version 1, only the config sub-record populated.
    pub fn new(config: RunConfig) -> Self {
        Self {
            documents: BTreeMap::new(),
            extracted_text: BTreeMap::new(),
            classifications: BTreeMap::new(),
            entities: BTreeMap::new(),
            entity_registry: BTreeMap::new(),
            relationships: Vec::new(),
            encrypted_segments: Vec::new(),
            cryptography_findings: Vec::new(),
            decrypted_content: BTreeMap::new(),
            semantic_links: Vec::new(),
            contradictions: Vec::new(),
            narrative_threads: Vec::new(),
            timeline: Vec::new(),
            temporal_anomalies: Vec::new(),
            patterns: Vec::new(),
            outliers: Vec::new(),
            anomalies: Vec::new(),
            graph_metadata: GraphMetadata::default(),
            centrality_scores: BTreeMap::new(),
            communities: BTreeMap::new(),
            hypotheses: Vec::new(),
            leads: Vec::new(),
            report_summary: None,
            odos_status: None,
            delta_e: 0.0,
            fidelity: 0.0,
            rcf: 0.0,
            compliance_report: ComplianceReport::default(),
            current_step: "initialization".to_string(),
            iteration_count: 0,
            human_feedback: None,
            error_log: Vec::new(),
            config,
            version: 1,
            last_updated: None,
        }
    }

    /// The investigation id stamped into the run config, if any.
    pub fn investigation_id(&self) -> Option<&InvestigationId> {
        self.config.investigation_id.as_ref()
    }

    /// Appends an error entry; errors are data, not control flow.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error_log.push(message.into());
    }

    /// Bumps the version and refreshes `last_updated`. Called by persistence
    /// adapters immediately before serializing the state.
    pub fn touch_for_save(&mut self) {
        self.version += 1;
        self.last_updated = Some(Utc::now());
    }

    /// True once the compliance gate has produced a verdict.
    pub fn gate_ran(&self) -> bool {
        self.odos_status.is_some()
    }

    /// Whether the content hash already has a document in this state.
    pub fn has_content_hash(&self, file_hash: &str) -> bool {
        self.documents.values().any(|d| d.file_hash == file_hash)
    }

    /// Entities whose document set contains the given document.
    pub fn entities_in_document(&self, doc_id: &DocumentId) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| e.documents.contains(doc_id))
            .collect()
    }
}

impl Default for InvestigationState {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EntityType, ExtractionStatus};
    use std::collections::BTreeMap as Map;

    #[test]
    fn fresh_state_is_empty_with_version_one() {
        let state = InvestigationState::default();
        assert!(state.documents.is_empty());
        assert!(state.error_log.is_empty());
        assert_eq!(state.version, 1);
        assert_eq!(state.current_step, "initialization");
        assert!(state.last_updated.is_none());
        assert!(!state.gate_ran());
    }

    #[test]
    fn touch_for_save_is_monotone() {
        let mut state = InvestigationState::default();
        state.touch_for_save();
        let v1 = state.version;
        state.touch_for_save();
        assert!(state.version > v1);
        assert!(state.last_updated.is_some());
    }

    #[test]
    fn content_hash_lookup_sees_documents() {
        let mut state = InvestigationState::default();
        let doc_id = DocumentId::parse("0123456789abcdef").unwrap();
        state.documents.insert(
            doc_id.clone(),
            Document {
                doc_id,
                filename: "a.txt".to_string(),
                file_type: "text/plain".to_string(),
                file_hash: "abc123".to_string(),
                size_bytes: 1,
                upload_timestamp: Utc::now(),
                source: None,
                file_path: None,
                status: ExtractionStatus::Success,
                extraction_method: "plaintext".to_string(),
                ocr_confidence: 0.0,
                processing_time_ms: 0,
                error_message: None,
                language: "en".to_string(),
                page_count: None,
                author: None,
                created: None,
                modified: None,
                priority_score: None,
                metadata: Map::new(),
            },
        );
        assert!(state.has_content_hash("abc123"));
        assert!(!state.has_content_hash("other"));
    }

    #[test]
    fn entities_in_document_filters_by_doc_set() {
        let mut state = InvestigationState::default();
        let d1 = DocumentId::parse("0000000000000001").unwrap();
        let d2 = DocumentId::parse("0000000000000002").unwrap();
        let in_d1 = Entity::from_mention("João Silva", EntityType::Person, 0.9, d1.clone(), None);
        let in_d2 = Entity::from_mention("TechCorp", EntityType::Org, 0.9, d2, None);
        state.entities.insert(in_d1.entity_id.clone(), in_d1);
        state.entities.insert(in_d2.entity_id.clone(), in_d2);
        let found = state.entities_in_document(&d1);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "João Silva");
    }

    #[test]
    fn state_roundtrips_through_json() {
        let mut state = InvestigationState::default();
        state.current_step = "ingestion_complete".to_string();
        state.touch_for_save();
        let json = serde_json::to_string(&state).unwrap();
        let back: InvestigationState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.current_step, state.current_step);
        assert_eq!(back.version, state.version);
        assert_eq!(back.last_updated, state.last_updated);
    }
}
