// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Semantic Link
//!
//! A cross-document similarity edge. The pair is ordered at construction
//! (`doc_id_1 < doc_id_2` lexicographically) so each unordered pair exists at
//! most once in the state.

use crate::value_objects::DocumentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Similarity edge between two documents, above the configured threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticLink {
    doc_id_1: DocumentId,
    doc_id_2: DocumentId,
    similarity_score: f64,
    pub link_type: String,
    pub rationale: Option<String>,
    pub shared_entities: Vec<String>,
    pub shared_concepts: Vec<String>,
}

impl SemanticLink {
    /// Builds a link, swapping the endpoints into lexicographic order and
    /// rounding the similarity to four decimals. Returns `None` for a
    /// self-link.
    pub fn new(
        a: DocumentId,
        b: DocumentId,
        similarity: f64,
        rationale: Option<String>,
        shared_entities: Vec<String>,
        shared_concepts: Vec<String>,
    ) -> Option<Self> {
        if a == b {
            return None;
        }
        let (doc_id_1, doc_id_2) = if a < b { (a, b) } else { (b, a) };
        Some(Self {
            doc_id_1,
            doc_id_2,
            similarity_score: (similarity * 10_000.0).round() / 10_000.0,
            link_type: "semantic".to_string(),
            rationale,
            shared_entities,
            shared_concepts,
        })
    }

    pub fn doc_id_1(&self) -> &DocumentId {
        &self.doc_id_1
    }

    pub fn doc_id_2(&self) -> &DocumentId {
        &self.doc_id_2
    }

    pub fn similarity_score(&self) -> f64 {
        self.similarity_score
    }

    /// Canonical unordered key of the link.
    pub fn pair(&self) -> (&DocumentId, &DocumentId) {
        (&self.doc_id_1, &self.doc_id_2)
    }

    pub fn involves(&self, doc_id: &DocumentId) -> bool {
        &self.doc_id_1 == doc_id || &self.doc_id_2 == doc_id
    }
}

/// Kind of rule-based contradiction between linked documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionKind {
    NumericMismatch,
    DateMismatch,
}

impl fmt::Display for ContradictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NumericMismatch => "numeric_mismatch",
            Self::DateMismatch => "date_mismatch",
        };
        write!(f, "{}", s)
    }
}

/// A rule-based contradiction found on a linked pair: both documents carry
/// token sets of the same kind (numbers or dates) and the sets are disjoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contradiction {
    pub doc_id_1: DocumentId,
    pub doc_id_2: DocumentId,
    pub kind: ContradictionKind,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(n: u8) -> DocumentId {
        DocumentId::parse(&format!("{:016x}", n)).unwrap()
    }

    #[test]
    fn endpoints_are_ordered() {
        let link = SemanticLink::new(doc(2), doc(1), 0.8, None, vec![], vec![]).unwrap();
        assert!(link.doc_id_1() < link.doc_id_2());
    }

    #[test]
    fn self_links_are_rejected() {
        assert!(SemanticLink::new(doc(1), doc(1), 0.9, None, vec![], vec![]).is_none());
    }

    #[test]
    fn similarity_rounds_to_four_decimals() {
        let link = SemanticLink::new(doc(1), doc(2), 0.123456, None, vec![], vec![]).unwrap();
        assert_eq!(link.similarity_score(), 0.1235);
    }

    #[test]
    fn contradiction_kind_displays_snake_case() {
        assert_eq!(ContradictionKind::NumericMismatch.to_string(), "numeric_mismatch");
        assert_eq!(ContradictionKind::DateMismatch.to_string(), "date_mismatch");
    }
}
