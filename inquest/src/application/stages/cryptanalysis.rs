// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cryptanalysis Stage
//!
//! Scans each document's text (first 3000 characters, to bound cost) for
//! encoded segments — Base64, hexadecimal, Caesar candidates — decodes what
//! it can, and records a segment plus an investigator-facing finding per hit.
//! When a steganography reader is present, PNG files in the uploads
//! directory are checked for LSB payloads.

use crate::application::stages::{InvestigationStage, StageContext};
use async_trait::async_trait;
use inquest_domain::aggregates::InvestigationState;
use inquest_domain::entities::{CryptoScheme, CryptoSegment, CryptographyFinding};
use inquest_domain::error::InvestigationError;
use inquest_domain::services::capabilities::StegoReader;
use inquest_domain::services::{cryptanalysis, text};
use std::path::PathBuf;
use tracing::info;

/// Scan budget per document.
const SCAN_CHARS: usize = 3000;

/// Stage 4: cryptanalysis.
pub struct CryptanalysisStage;

impl CryptanalysisStage {
    fn scheme_of(span: &cryptanalysis::DetectedSpan) -> CryptoScheme {
        match span.scheme {
            "base64" => CryptoScheme::Base64,
            "hex" => CryptoScheme::Hex,
            "rot13" => CryptoScheme::Rot13,
            "caesar" => CryptoScheme::Caesar {
                shift: span.shift.unwrap_or(0),
            },
            _ => CryptoScheme::Stego,
        }
    }

    fn location(scanned: &str, start: usize, end: usize) -> String {
        let line = scanned[..start.min(scanned.len())].matches('\n').count() + 1;
        format!("char {}-{}, line ~{}", start, end, line)
    }
}

#[async_trait]
impl InvestigationStage for CryptanalysisStage {
    fn name(&self) -> &'static str {
        "cryptanalysis_hunter"
    }

    fn step_label(&self) -> &'static str {
        "cryptanalysis"
    }

    async fn run(
        &self,
        state: &mut InvestigationState,
        ctx: &StageContext,
    ) -> Result<(), InvestigationError> {
        let mut segment_counter = 0usize;

        let doc_ids: Vec<_> = state.extracted_text.keys().cloned().collect();
        for doc_id in doc_ids {
            let doc_text = state.extracted_text.get(&doc_id).cloned().unwrap_or_default();
            if doc_text.is_empty() {
                continue;
            }
            let scanned = text::slice_chars(&doc_text, SCAN_CHARS);

            for span in cryptanalysis::detect_all(scanned) {
                segment_counter += 1;
                let segment_id = format!("seg_{}_{}", doc_id, segment_counter);
                let decoded = cryptanalysis::decode_span(&span);
                if let Some(decoded_text) = &decoded {
                    state
                        .decrypted_content
                        .insert(segment_id.clone(), decoded_text.clone());
                }
                let segment = CryptoSegment {
                    segment_id,
                    doc_id: Some(doc_id.clone()),
                    content: text::truncate(&span.content, 500),
                    start_pos: span.start,
                    end_pos: span.end,
                    crypto_type: Self::scheme_of(&span),
                    confidence: 0.9,
                    decrypted_content: decoded,
                };
                let finding = CryptographyFinding::from_segment(
                    &segment,
                    Self::location(scanned, span.start, span.end),
                );
                state.encrypted_segments.push(segment);
                state.cryptography_findings.push(finding);
            }
        }

        // LSB steganography over PNG uploads, capability-gated
        if ctx.stego.probe() {
            let uploads: PathBuf = state
                .config
                .uploads_path
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(|| ctx.config.uploads_dir.clone());
            if uploads.is_dir() {
                let mut png_files: Vec<PathBuf> = std::fs::read_dir(&uploads)
                    .map_err(|e| InvestigationError::io_error(format!("read_dir: {}", e)))?
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.path())
                    .filter(|p| {
                        p.extension()
                            .and_then(|e| e.to_str())
                            .is_some_and(|e| e.eq_ignore_ascii_case("png"))
                    })
                    .collect();
                png_files.sort();
                for path in png_files {
                    let Some(revealed) = ctx.stego.reveal(&path)? else {
                        continue;
                    };
                    segment_counter += 1;
                    let segment_id = format!("stego_{}", segment_counter);
                    state
                        .decrypted_content
                        .insert(segment_id.clone(), revealed.clone());
                    state.encrypted_segments.push(CryptoSegment {
                        segment_id,
                        doc_id: None,
                        content: text::truncate(&revealed, 500),
                        start_pos: 0,
                        end_pos: 0,
                        crypto_type: CryptoScheme::Stego,
                        confidence: 0.8,
                        decrypted_content: Some(revealed.clone()),
                    });
                    state.cryptography_findings.push(CryptographyFinding {
                        document_id: path.display().to_string(),
                        finding_type: "steganography".to_string(),
                        location: Some(format!(
                            "image {}",
                            path.file_name().and_then(|n| n.to_str()).unwrap_or("?")
                        )),
                        encoded_text: None,
                        decoded_preview: Some(text::truncate(&revealed, 200)),
                        confidence: 0.8,
                        algorithm: Some("lsb".to_string()),
                        requires_password: false,
                    });
                }
            }
        }

        state.current_step = "cryptanalysis_complete".to_string();
        info!(
            "segments: {}, findings: {}",
            state.encrypted_segments.len(),
            state.cryptography_findings.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_reports_line_numbers() {
        let scanned = "first\nsecond\nthird";
        let loc = CryptanalysisStage::location(scanned, 14, 18);
        assert_eq!(loc, "char 14-18, line ~3");
    }

    #[test]
    fn scheme_mapping_carries_caesar_shift() {
        let span = cryptanalysis::DetectedSpan {
            scheme: "caesar",
            start: 0,
            end: 10,
            content: "abc".to_string(),
            shift: Some(7),
        };
        assert_eq!(
            CryptanalysisStage::scheme_of(&span),
            CryptoScheme::Caesar { shift: 7 }
        );
    }
}
