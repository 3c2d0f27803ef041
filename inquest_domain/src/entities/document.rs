// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document Entity
//!
//! A [`Document`] is a processed file in one investigation, identified by the
//! first 16 hex characters of its SHA-256 content hash. It records what was
//! extracted, how, and with what outcome.
//!
//! ## Invariants
//!
//! - The content hash is unique per investigation; ingestion deduplicates on
//!   it before a `Document` is ever constructed.
//! - A document is never both in the ingested set and in quarantine under the
//!   same hash: quarantine happens only on `failed`, and a failed file gets a
//!   document record whose status says so.
//! - `status` is always one of the five [`ExtractionStatus`] values.

use crate::services::datetime_serde;
use crate::value_objects::DocumentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Outcome of text extraction for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Success,
    Partial,
    Encrypted,
    Unsupported,
    Failed,
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Encrypted => "encrypted",
            Self::Unsupported => "unsupported",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// A processed file and its extraction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    // Identity fields (always first)
    pub doc_id: DocumentId,
    pub filename: String,

    // Content identity
    pub file_type: String,
    pub file_hash: String,
    pub size_bytes: u64,

    // Provenance
    #[serde(with = "datetime_serde")]
    pub upload_timestamp: DateTime<Utc>,
    pub source: Option<String>,
    pub file_path: Option<String>,

    // Extraction record
    pub status: ExtractionStatus,
    pub extraction_method: String,
    pub ocr_confidence: f64,
    pub processing_time_ms: u64,
    pub error_message: Option<String>,

    // Detected attributes
    pub language: String,
    pub page_count: Option<u32>,
    pub author: Option<String>,
    #[serde(with = "datetime_serde::opt")]
    pub created: Option<DateTime<Utc>>,
    #[serde(with = "datetime_serde::opt")]
    pub modified: Option<DateTime<Utc>>,

    // Set by classification
    pub priority_score: Option<f64>,

    // Free-form metadata (user description, producer, extractor extras)
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    /// True for statuses that yielded usable text.
    pub fn has_usable_text(&self) -> bool {
        matches!(self.status, ExtractionStatus::Success | ExtractionStatus::Partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document {
            doc_id: DocumentId::parse("0123456789abcdef").unwrap(),
            filename: "contract.txt".to_string(),
            file_type: "text/plain".to_string(),
            file_hash: "0123456789abcdef".repeat(4),
            size_bytes: 120,
            upload_timestamp: Utc::now(),
            source: Some("/uploads".to_string()),
            file_path: Some("/uploads/contract.txt".to_string()),
            status: ExtractionStatus::Success,
            extraction_method: "plaintext".to_string(),
            ocr_confidence: 0.0,
            processing_time_ms: 3,
            error_message: None,
            language: "pt".to_string(),
            page_count: None,
            author: None,
            created: None,
            modified: None,
            priority_score: None,
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ExtractionStatus::Encrypted).unwrap();
        assert_eq!(json, "\"encrypted\"");
    }

    #[test]
    fn usable_text_tracks_status() {
        let mut doc = sample();
        assert!(doc.has_usable_text());
        doc.status = ExtractionStatus::Encrypted;
        assert!(!doc.has_usable_text());
    }

    #[test]
    fn document_roundtrips_through_json() {
        let doc = sample();
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.doc_id, doc.doc_id);
        assert_eq!(back.status, doc.status);
        assert_eq!(back.upload_timestamp, doc.upload_timestamp);
    }
}
