// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document Classification
//!
//! Per-document classification results: domain, document type, language,
//! priority score and the reasons behind it.
//!
//! ## Invariant
//!
//! Relevance is a pure function of the rounded priority score:
//! `≥0.8 critical`, `≥0.6 high`, `≥0.4 medium`, else `low`. The constructor
//! enforces clamping to `[0,1]` and rounding to two decimals, so the pair is
//! always consistent.

use crate::value_objects::DocumentId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Domain a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainTag {
    Finance,
    Legal,
    Technical,
    Corporate,
    Administrative,
    Other,
}

impl fmt::Display for DomainTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Finance => "finance",
            Self::Legal => "legal",
            Self::Technical => "technical",
            Self::Corporate => "corporate",
            Self::Administrative => "administrative",
            Self::Other => "other",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DomainTag {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "finance" => Ok(Self::Finance),
            "legal" => Ok(Self::Legal),
            "technical" => Ok(Self::Technical),
            "corporate" => Ok(Self::Corporate),
            "administrative" => Ok(Self::Administrative),
            "other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

/// Structural type of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Contract,
    Invoice,
    Report,
    Email,
    Technical,
    Legal,
    Fragment,
    Other,
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Contract => "contract",
            Self::Invoice => "invoice",
            Self::Report => "report",
            Self::Email => "email",
            Self::Technical => "technical",
            Self::Legal => "legal",
            Self::Fragment => "fragment",
            Self::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Estimated relevance band derived from the priority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    Critical,
    High,
    Medium,
    Low,
}

impl Relevance {
    /// Banding rule: `≥0.8 critical`, `≥0.6 high`, `≥0.4 medium`, else low.
    pub fn from_priority(priority: f64) -> Self {
        if priority >= 0.8 {
            Self::Critical
        } else if priority >= 0.6 {
            Self::High
        } else if priority >= 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for Relevance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        write!(f, "{}", s)
    }
}

/// Classification results for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub doc_id: DocumentId,
    pub domain: DomainTag,
    pub document_type: DocType,
    pub language: String,

    priority_score: f64,
    estimated_relevance: Relevance,

    pub doc_type_confidence: f64,
    pub domain_confidence: f64,
    pub language_confidence: f64,

    pub priority_reasons: Vec<String>,
    pub keywords_detected: Vec<String>,
    /// 1-based ingestion index.
    pub processing_order: usize,
}

/// Keyword cap carried on every classification.
pub const MAX_KEYWORDS: usize = 30;

impl Classification {
    /// Builds a classification, clamping the priority to `[0,1]`, rounding it
    /// to two decimals, deriving the relevance band, and capping keywords.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        doc_id: DocumentId,
        domain: DomainTag,
        document_type: DocType,
        language: String,
        priority_score: f64,
        doc_type_confidence: f64,
        domain_confidence: f64,
        language_confidence: f64,
        priority_reasons: Vec<String>,
        mut keywords_detected: Vec<String>,
        processing_order: usize,
    ) -> Self {
        let clamped = priority_score.clamp(0.0, 1.0);
        let rounded = (clamped * 100.0).round() / 100.0;
        keywords_detected.truncate(MAX_KEYWORDS);
        Self {
            doc_id,
            domain,
            document_type,
            language,
            priority_score: rounded,
            estimated_relevance: Relevance::from_priority(rounded),
            doc_type_confidence,
            domain_confidence,
            language_confidence,
            priority_reasons,
            keywords_detected,
            processing_order,
        }
    }

    pub fn priority_score(&self) -> f64 {
        self.priority_score
    }

    pub fn estimated_relevance(&self) -> Relevance {
        self.estimated_relevance
    }

    /// The suspicious-pattern projection is the reasons list itself; the two
    /// were one field in practice and are kept as one here.
    pub fn suspicious_patterns(&self) -> &[String] {
        &self.priority_reasons
    }
}
