// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Hypotheses and Leads
//!
//! The synthesized investigative output: ranked [`Hypothesis`] records under
//! review, and actionable [`Lead`]s with priorities.

use crate::value_objects::{DocumentId, EntityId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review status of a hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisStatus {
    UnderReview,
    Accepted,
    Rejected,
}

impl Default for HypothesisStatus {
    fn default() -> Self {
        Self::UnderReview
    }
}

impl fmt::Display for HypothesisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnderReview => "under_review",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

/// An investigative hypothesis with its supporting evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hypothesis {
    pub hypothesis_id: String,
    pub title: String,
    pub description: String,
    confidence: f64,
    pub supporting_evidence: Vec<String>,
    pub entities_involved: Vec<EntityId>,
    pub doc_ids_supporting: Vec<DocumentId>,
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub status: HypothesisStatus,
}

/// Title cap applied at construction.
pub const MAX_TITLE_CHARS: usize = 80;

impl Hypothesis {
    /// Builds a hypothesis; the title defaults to the description truncated
    /// to 80 characters, confidence is clamped to `[0,1]`, status starts
    /// `under_review`.
    pub fn new(
        hypothesis_id: impl Into<String>,
        title: Option<String>,
        description: impl Into<String>,
        confidence: f64,
    ) -> Self {
        let description = description.into();
        let title = title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| crate::services::text::truncate(&description, MAX_TITLE_CHARS));
        Self {
            hypothesis_id: hypothesis_id.into(),
            title,
            description,
            confidence: confidence.clamp(0.0, 1.0),
            supporting_evidence: Vec::new(),
            entities_involved: Vec::new(),
            doc_ids_supporting: Vec::new(),
            next_steps: Vec::new(),
            status: HypothesisStatus::UnderReview,
        }
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.supporting_evidence = evidence;
        self
    }

    pub fn with_entities(mut self, entities: Vec<EntityId>) -> Self {
        self.entities_involved = entities;
        self
    }

    pub fn with_next_steps(mut self, steps: Vec<String>) -> Self {
        self.next_steps = steps;
        self
    }
}

/// Priority of an actionable lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadPriority {
    Low,
    Medium,
    High,
}

impl fmt::Display for LeadPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// An actionable investigative lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub lead_id: String,
    pub action: String,
    pub priority: LeadPriority,
    pub justification: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_defaults_to_truncated_description() {
        let long = "x".repeat(120);
        let h = Hypothesis::new("H1", None, long, 0.8);
        assert_eq!(h.title.len(), MAX_TITLE_CHARS);
    }

    #[test]
    fn explicit_title_is_kept() {
        let h = Hypothesis::new("H1", Some("Central actor".to_string()), "desc", 0.8);
        assert_eq!(h.title, "Central actor");
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(Hypothesis::new("H1", None, "d", 1.7).confidence(), 1.0);
        assert_eq!(Hypothesis::new("H1", None, "d", -0.3).confidence(), 0.0);
    }

    #[test]
    fn status_defaults_to_under_review() {
        let h = Hypothesis::new("H1", None, "d", 0.5);
        assert_eq!(h.status, HypothesisStatus::UnderReview);
    }

    #[test]
    fn lead_priority_orders_low_to_high() {
        assert!(LeadPriority::High > LeadPriority::Medium);
        assert!(LeadPriority::Medium > LeadPriority::Low);
    }
}
