// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Patterns, Anomalies and Narrative Threads
//!
//! Structural and statistical signals produced by pattern recognition and the
//! semantic linker: recurring structures ([`Pattern`]), statistical outliers
//! ([`Anomaly`]), duplicate-date conflicts ([`TemporalAnomaly`]) and
//! connected components of the document-link graph ([`NarrativeThread`]).

use crate::entities::Severity;
use crate::value_objects::{DocumentId, EntityId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a recognized pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    HighDegree,
    Community,
    TemporalSequence,
    Frequency,
}

impl fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::HighDegree => "high_degree",
            Self::Community => "community",
            Self::TemporalSequence => "temporal_sequence",
            Self::Frequency => "frequency",
        };
        write!(f, "{}", s)
    }
}

/// A recognized pattern with its evidence sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    pub pattern_id: String,
    pub category: PatternCategory,
    pub description: String,
    pub entities_involved: Vec<EntityId>,
    pub severity: Severity,
    pub occurrences: usize,
    pub confidence: f64,
    pub evidence: Vec<String>,
}

/// A statistical anomaly flagged by z-scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    /// `statistical_outlier` for degree outliers, `statistical` for term
    /// frequency outliers.
    pub category: String,
    pub description: String,
    pub severity: Severity,
    /// Entity id or term the anomaly refers to.
    pub entity: String,
    pub z_score: f64,
}

/// A duplicate-date conflict on the timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalAnomaly {
    /// Always `possible_duplicate_date` for timeline conflicts.
    pub kind: String,
    pub description: String,
    pub conflicting_events: Vec<String>,
    /// Day-resolution date the events collide on.
    pub date: String,
}

/// A connected component of the document-link graph, anchored on its most
/// central document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeThread {
    pub thread_id: String,
    pub title: String,
    pub doc_ids: Vec<DocumentId>,
    pub summary: String,
}
