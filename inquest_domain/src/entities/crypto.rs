// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cryptanalysis Records
//!
//! [`CryptoSegment`] is a contiguous encoded span found inside a document;
//! [`CryptographyFinding`] is the investigator-facing record derived from it
//! (or from an encrypted input file, which produces a finding without a
//! segment).

use crate::value_objects::DocumentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored excerpt caps.
pub const MAX_SEGMENT_CONTENT: usize = 500;
pub const MAX_ENCODED_EXCERPT: usize = 200;
pub const MAX_DECODED_PREVIEW: usize = 150;

/// Detected encoding scheme of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CryptoScheme {
    Base64,
    Hex,
    Rot13,
    Caesar { shift: u8 },
    Stego,
}

impl fmt::Display for CryptoScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base64 => write!(f, "base64"),
            Self::Hex => write!(f, "hex"),
            Self::Rot13 => write!(f, "rot13"),
            Self::Caesar { .. } => write!(f, "caesar"),
            Self::Stego => write!(f, "stego"),
        }
    }
}

/// A contiguous span of a document identified as encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoSegment {
    pub segment_id: String,
    /// Owning document; empty doc id for segments found outside documents
    /// (e.g. steganography in uploaded images).
    pub doc_id: Option<DocumentId>,
    /// Raw content, truncated for storage.
    pub content: String,
    pub start_pos: usize,
    pub end_pos: usize,
    pub crypto_type: CryptoScheme,
    pub confidence: f64,
    pub decrypted_content: Option<String>,
}

impl CryptoSegment {
    /// True when decoding succeeded.
    pub fn is_decoded(&self) -> bool {
        self.decrypted_content.is_some()
    }
}

/// Investigator-facing cryptography finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptographyFinding {
    /// Owning document id, or a path-like reference for image findings.
    pub document_id: String,
    /// `base64_encoded`, `hex_encoded`, `caesar_encoded`, `pdf_encrypted`,
    /// `steganography`, …
    pub finding_type: String,
    pub location: Option<String>,
    pub encoded_text: Option<String>,
    pub decoded_preview: Option<String>,
    pub confidence: f64,
    pub algorithm: Option<String>,
    /// Set on `pdf_encrypted` findings.
    #[serde(default)]
    pub requires_password: bool,
}

impl CryptographyFinding {
    /// Builds the finding for a decoded (or undecoded) segment: a 200-char
    /// encoded excerpt, a 150-char decoded preview, confidence 0.95 when
    /// decoded and 0.7 otherwise.
    pub fn from_segment(segment: &CryptoSegment, location: String) -> Self {
        let encoded = ellipsized(&segment.content, MAX_ENCODED_EXCERPT);
        let decoded = segment
            .decrypted_content
            .as_deref()
            .map(|d| ellipsized(d, MAX_DECODED_PREVIEW));
        Self {
            document_id: segment
                .doc_id
                .as_ref()
                .map(|d| d.to_string())
                .unwrap_or_default(),
            finding_type: format!("{}_encoded", segment.crypto_type),
            location: Some(location),
            encoded_text: Some(encoded),
            decoded_preview: decoded,
            confidence: if segment.is_decoded() { 0.95 } else { 0.7 },
            algorithm: Some(segment.crypto_type.to_string()),
            requires_password: false,
        }
    }

    /// Finding emitted when an encrypted PDF short-circuits extraction.
    pub fn pdf_encrypted(doc_id: &DocumentId) -> Self {
        Self {
            document_id: doc_id.to_string(),
            finding_type: "pdf_encrypted".to_string(),
            location: None,
            encoded_text: None,
            decoded_preview: None,
            confidence: 1.0,
            algorithm: None,
            requires_password: true,
        }
    }
}

fn ellipsized(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut out: String = text.chars().take(max).collect();
        out.push_str("...");
        out
    } else {
        text.to_string()
    }
}
