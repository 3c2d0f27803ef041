// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Relationship
//!
//! A symmetric-by-construction co-occurrence between two entities. Endpoints
//! are sorted at construction so equality checks and graph MERGE operations
//! see one canonical ordering; canonicalization happens before any equality
//! check, never after.
//!
//! ## Invariants
//!
//! - Endpoints are distinct and sorted (`source <= target` by id).
//! - `weight == evidence_count == evidence.len()`.
//! - `relationship_type` is `ASSOCIATED_WITH` when the endpoint types differ,
//!   `CO_OCCURRENCE` when they match.
//! - `confidence = min(0.95, 0.7 + 0.05 * min(evidence_count, 5))`.

use crate::entities::EntityType;
use crate::value_objects::{DocumentId, EntityId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kind of a co-occurrence edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipType {
    #[serde(rename = "ASSOCIATED_WITH")]
    AssociatedWith,
    #[serde(rename = "CO_OCCURRENCE")]
    CoOccurrence,
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AssociatedWith => "ASSOCIATED_WITH",
            Self::CoOccurrence => "CO_OCCURRENCE",
        };
        write!(f, "{}", s)
    }
}

/// A canonicalized co-occurrence relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    source_entity_id: EntityId,
    target_entity_id: EntityId,
    relationship_type: RelationshipType,
    weight: f64,
    evidence_doc_ids: BTreeSet<DocumentId>,
    evidence_count: usize,
    pub context: Option<String>,
    confidence: f64,
}

impl Relationship {
    /// Builds a canonical co-occurrence edge from two entity endpoints and
    /// the set of documents in which both appear.
    ///
    /// Returns `None` when the endpoints are the same entity or the evidence
    /// set is empty; such pairs carry no signal.
    pub fn co_occurrence(
        a: (&EntityId, EntityType),
        b: (&EntityId, EntityType),
        evidence: BTreeSet<DocumentId>,
    ) -> Option<Self> {
        if a.0 == b.0 || evidence.is_empty() {
            return None;
        }
        let relationship_type = if a.1 != b.1 {
            RelationshipType::AssociatedWith
        } else {
            RelationshipType::CoOccurrence
        };
        // Sort endpoints before anything compares or persists this edge
        let ((source, _), (target, _)) = if a.0 <= b.0 { (a, b) } else { (b, a) };
        let evidence_count = evidence.len();
        let confidence = (0.7 + 0.05 * evidence_count.min(5) as f64).min(0.95);
        Some(Self {
            source_entity_id: source.clone(),
            target_entity_id: target.clone(),
            relationship_type,
            weight: evidence_count as f64,
            evidence_doc_ids: evidence,
            evidence_count,
            context: Some(format!("Co-occurred in {} document(s)", evidence_count)),
            confidence,
        })
    }

    pub fn source_entity_id(&self) -> &EntityId {
        &self.source_entity_id
    }

    pub fn target_entity_id(&self) -> &EntityId {
        &self.target_entity_id
    }

    pub fn relationship_type(&self) -> RelationshipType {
        self.relationship_type
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn evidence_doc_ids(&self) -> &BTreeSet<DocumentId> {
        &self.evidence_doc_ids
    }

    pub fn evidence_count(&self) -> usize {
        self.evidence_count
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Canonical unordered key of the edge.
    pub fn pair(&self) -> (&EntityId, &EntityId) {
        (&self.source_entity_id, &self.target_entity_id)
    }

    /// True if the edge touches the given entity.
    pub fn involves(&self, id: &EntityId) -> bool {
        &self.source_entity_id == id || &self.target_entity_id == id
    }
}
