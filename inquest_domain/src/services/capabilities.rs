// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Capability Ports
//!
//! Every optional third-party concern — format extraction, OCR, NER,
//! embeddings, steganography, narrative generation, PDF rendering — is a
//! trait with a `probe()`. An absent capability degrades the corresponding
//! output (no OCR text, regex-only entities, no narrative); it never fails
//! the pipeline.

use crate::entities::{EntityType, ExtractionStatus};
use crate::error::InvestigationError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;

/// Result of text extraction for one file.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    pub status: ExtractionStatus,
    pub method: String,
    pub ocr_confidence: f64,
    pub page_count: Option<u32>,
    pub author: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl Extraction {
    /// Successful extraction with the given text and method name.
    pub fn success(text: String, method: impl Into<String>) -> Self {
        Self {
            text,
            status: ExtractionStatus::Success,
            method: method.into(),
            ocr_confidence: 0.0,
            page_count: None,
            author: None,
            created: None,
            modified: None,
            error_message: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Terminal extraction outcome without text.
    pub fn without_text(
        status: ExtractionStatus,
        method: impl Into<String>,
        error_message: Option<String>,
    ) -> Self {
        Self {
            text: String::new(),
            status,
            method: method.into(),
            ocr_confidence: 0.0,
            page_count: None,
            author: None,
            created: None,
            modified: None,
            error_message,
            metadata: BTreeMap::new(),
        }
    }
}

/// Format-specific text extractor. Registered by extension; the ingestion
/// stage dispatches on a MIME sniff plus the extension.
pub trait TextExtractor: Send + Sync {
    /// True when the backend behind this extractor is actually usable.
    fn probe(&self) -> bool;

    /// Extensions (lowercase, with dot) this extractor handles.
    fn supports(&self, extension: &str) -> bool;

    /// Extracts text from raw file bytes.
    fn extract(&self, path: &Path, raw: &[u8]) -> Result<Extraction, InvestigationError>;

    fn name(&self) -> &'static str;
}

/// OCR engine for rasterized pages and images.
pub trait OcrEngine: Send + Sync {
    fn probe(&self) -> bool;

    /// Recognized text and a confidence in `[0,1]`.
    fn recognize(&self, raw: &[u8], languages: &str) -> Result<(String, f64), InvestigationError>;
}

/// A raw entity mention before merging.
#[derive(Debug, Clone)]
pub struct RawMention {
    pub text: String,
    pub entity_type: EntityType,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
}

/// Named-entity recognizer constrained to a type whitelist.
pub trait NamedEntityRecognizer: Send + Sync {
    fn probe(&self) -> bool;

    /// Mentions in the text whose types are in `allowed`.
    fn extract(&self, text: &str, allowed: &[EntityType]) -> Vec<RawMention>;
}

/// Embedding provider for the vector index.
pub trait EmbeddingProvider: Send + Sync {
    fn probe(&self) -> bool;

    fn dimension(&self) -> usize;

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, InvestigationError>;

    fn embed_one(&self, text: &str) -> Result<Vec<f32>, InvestigationError> {
        Ok(self.embed(&[text])?.into_iter().next().unwrap_or_default())
    }
}

/// Least-significant-bit steganography reader for PNG uploads.
pub trait StegoReader: Send + Sync {
    fn probe(&self) -> bool;

    /// Hidden payload, if any.
    fn reveal(&self, path: &Path) -> Result<Option<String>, InvestigationError>;
}

/// Optional LLM narrative generation. Absence disables narrative output
/// without error.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    fn probe(&self) -> bool;

    /// Short narrative for the given prompt, or `None` when unavailable.
    async fn summarize(&self, prompt: &str) -> Result<Option<String>, InvestigationError>;
}

/// Optional PDF report renderer.
pub trait ReportRenderer: Send + Sync {
    fn probe(&self) -> bool;

    fn render_pdf(&self, report_json: &serde_json::Value, path: &Path)
        -> Result<(), InvestigationError>;
}
