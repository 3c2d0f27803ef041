// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Ingestion Stage
//!
//! Walks the uploads directory and turns each regular file into a
//! [`Document`]: extension and size gating, streaming content hash,
//! deduplication against the state and the processing ledger, extraction
//! dispatch, text normalization, language detection, quarantine of failed
//! files, and the optional `descriptions.json` attachment.
//!
//! Failure policy: any per-file error is captured in the error log and the
//! ledger; the stage never aborts the run.

use crate::application::stages::{InvestigationStage, StageContext};
use async_trait::async_trait;
use inquest_domain::aggregates::InvestigationState;
use inquest_domain::entities::{CryptographyFinding, Document, ExtractionStatus};
use inquest_domain::error::InvestigationError;
use inquest_domain::repositories::{DocStatus, ProcessingLedger};
use inquest_domain::services::{language, text};
use inquest_domain::value_objects::DocumentId;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

const DESCRIPTIONS_FILE: &str = "descriptions.json";
const HASH_CHUNK_BYTES: usize = 8192;

/// Stage 1: document ingestion.
pub struct IngestionStage;

impl IngestionStage {
    /// Streaming SHA-256 of a file, 8 KiB chunks.
    fn hash_file(path: &Path) -> Result<String, InvestigationError> {
        let mut file = std::fs::File::open(path)
            .map_err(|e| InvestigationError::io_error(format!("open {}: {}", path.display(), e)))?;
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; HASH_CHUNK_BYTES];
        loop {
            let read = file
                .read(&mut buffer)
                .map_err(|e| InvestigationError::io_error(format!("read {}: {}", path.display(), e)))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }
        Ok(hex::encode(hasher.finalize()))
    }

    fn read_descriptions(uploads: &Path) -> BTreeMap<String, String> {
        let path = uploads.join(DESCRIPTIONS_FILE);
        let Ok(bytes) = std::fs::read(&path) else {
            return BTreeMap::new();
        };
        match serde_json::from_slice::<BTreeMap<String, serde_json::Value>>(&bytes) {
            Ok(map) => map
                .into_iter()
                .filter(|(k, _)| k != DESCRIPTIONS_FILE)
                .filter_map(|(k, v)| {
                    let text = match v {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (!text.trim().is_empty()).then(|| (k, text))
                })
                .collect(),
            Err(e) => {
                warn!("descriptions.json unreadable: {}", e);
                BTreeMap::new()
            }
        }
    }

    /// Copies a failed file into quarantine under a random suffix.
    fn quarantine(quarantine_dir: &Path, path: &Path, reason: &str) {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| format!(".{}", s))
            .unwrap_or_default();
        let dest = quarantine_dir.join(format!("{}_{:08x}{}", stem, rand::random::<u32>(), ext));
        if let Err(e) = std::fs::create_dir_all(quarantine_dir).and_then(|_| std::fs::copy(path, &dest))
        {
            warn!("quarantine failed for {}: {}", path.display(), e);
        } else {
            warn!("quarantined {} to {} ({})", path.display(), dest.display(), reason);
        }
    }

    fn extension_of(path: &Path) -> String {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|s| format!(".{}", s.to_lowercase()))
            .unwrap_or_default()
    }

    /// Processes one file end to end. Per-file errors bubble to the caller,
    /// which records them without aborting the stage.
    #[allow(clippy::too_many_arguments)]
    async fn ingest_one(
        &self,
        state: &mut InvestigationState,
        ctx: &StageContext,
        path: &Path,
        file_hash: &str,
        investigation_id: &str,
        descriptions: &BTreeMap<String, String>,
    ) -> Result<(), InvestigationError> {
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        let extension = Self::extension_of(path);
        let size_bytes = std::fs::metadata(path)
            .map_err(|e| InvestigationError::io_error(format!("stat {}: {}", path.display(), e)))?
            .len();

        ctx.ledger.mark_start(file_hash, investigation_id).await?;

        let doc_id = DocumentId::from_content_hash(file_hash)?;
        let started = Instant::now();
        let raw = std::fs::read(path)
            .map_err(|e| InvestigationError::io_error(format!("read {}: {}", path.display(), e)))?;
        let extraction = ctx.extractors.extract(path, &raw, &extension);
        let processing_time_ms = started.elapsed().as_millis() as u64;

        if extraction.status == ExtractionStatus::Encrypted {
            state
                .cryptography_findings
                .push(CryptographyFinding::pdf_encrypted(&doc_id));
        }
        if extraction.status == ExtractionStatus::Failed {
            Self::quarantine(
                &ctx.config.quarantine_dir,
                path,
                extraction.error_message.as_deref().unwrap_or("extraction failed"),
            );
        }

        let normalized = text::normalize(&extraction.text);
        let mut status = extraction.status;
        if normalized.is_empty() && status == ExtractionStatus::Success {
            status = ExtractionStatus::Partial;
        }
        let detected_language = if normalized.is_empty() {
            "unknown".to_string()
        } else {
            language::detect(&normalized).code
        };

        let mut metadata = extraction.metadata;
        if let Some(description) = descriptions.get(&filename) {
            metadata.insert("user_description".to_string(), description.trim().to_string());
        }

        let document = Document {
            doc_id: doc_id.clone(),
            filename: filename.clone(),
            file_type: extraction.method.clone(),
            file_hash: file_hash.to_string(),
            size_bytes,
            upload_timestamp: chrono::Utc::now(),
            source: path.parent().map(|p| p.display().to_string()),
            file_path: Some(path.display().to_string()),
            status,
            extraction_method: extraction.method,
            ocr_confidence: extraction.ocr_confidence,
            processing_time_ms,
            error_message: extraction.error_message,
            language: detected_language,
            page_count: extraction.page_count,
            author: extraction.author,
            created: extraction.created,
            modified: extraction.modified,
            priority_score: None,
            metadata,
        };

        state.extracted_text.insert(doc_id.clone(), normalized.clone());
        state.documents.insert(doc_id, document);

        if matches!(status, ExtractionStatus::Success | ExtractionStatus::Partial) {
            ctx.ledger.mark_success(file_hash, investigation_id).await?;
            info!("ingested: {} ({} chars)", filename, normalized.len());
        } else {
            ctx.ledger
                .mark_failed(file_hash, investigation_id, "ingest_documents")
                .await?;
            warn!("document {}: status={}", filename, status);
        }
        Ok(())
    }
}

#[async_trait]
impl InvestigationStage for IngestionStage {
    fn name(&self) -> &'static str {
        "ingest_documents"
    }

    fn step_label(&self) -> &'static str {
        "ingestion"
    }

    async fn run(
        &self,
        state: &mut InvestigationState,
        ctx: &StageContext,
    ) -> Result<(), InvestigationError> {
        let uploads: PathBuf = state
            .config
            .uploads_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| ctx.config.uploads_dir.clone());
        if !uploads.is_dir() {
            state.record_error(format!("Upload dir not found: {}", uploads.display()));
            return Ok(());
        }
        let investigation_id = state
            .investigation_id()
            .map(|id| id.to_string())
            .unwrap_or_default();

        let descriptions = Self::read_descriptions(&uploads);

        let mut files: Vec<PathBuf> = std::fs::read_dir(&uploads)
            .map_err(|e| InvestigationError::io_error(format!("read_dir: {}", e)))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_file())
            .filter(|p| p.file_name().and_then(|n| n.to_str()) != Some(DESCRIPTIONS_FILE))
            .collect();
        files.sort();
        if files.is_empty() {
            warn!("no files found in uploads directory");
            state.record_error("No files to ingest".to_string());
            return Ok(());
        }

        let mut ingested = 0u64;
        for path in files {
            let extension = Self::extension_of(&path);
            if !ctx.config.supports_extension(&extension) {
                warn!("unsupported format: {}", path.display());
                continue;
            }
            let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            if size > ctx.config.max_file_size_bytes() {
                warn!(
                    "file too large (>{}MB): {}",
                    ctx.config.max_file_size_mb,
                    path.display()
                );
                continue;
            }

            let file_hash = match Self::hash_file(&path) {
                Ok(hash) => hash,
                Err(e) => {
                    state.record_error(format!("Ingestion doc error {}: {}", path.display(), e));
                    continue;
                }
            };
            if state.has_content_hash(&file_hash) {
                info!("skipping duplicate: {}", path.display());
                continue;
            }
            if ctx.ledger.status(&file_hash, &investigation_id).await? == Some(DocStatus::Done) {
                info!("skipping already processed (ledger DONE): {}", path.display());
                continue;
            }

            match self
                .ingest_one(state, ctx, &path, &file_hash, &investigation_id, &descriptions)
                .await
            {
                Ok(()) => ingested += 1,
                Err(e) => {
                    let _ = ctx
                        .ledger
                        .mark_failed(&file_hash, &investigation_id, "ingest_documents")
                        .await;
                    state.record_error(format!("Ingestion doc error {}: {}", path.display(), e));
                }
            }
        }

        ctx.metrics.record_documents_ingested(ingested);
        state.current_step = "ingestion_complete".to_string();
        info!("ingested {} documents", state.documents.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased_with_dot() {
        assert_eq!(IngestionStage::extension_of(Path::new("A.TXT")), ".txt");
        assert_eq!(IngestionStage::extension_of(Path::new("noext")), "");
    }

    #[test]
    fn hash_is_stable_for_same_content() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"same content").unwrap();
        let h1 = IngestionStage::hash_file(&file).unwrap();
        let h2 = IngestionStage::hash_file(&file).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn descriptions_filter_empty_and_self() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("descriptions.json"),
            br#"{"a.txt": "important contract", "b.txt": "", "descriptions.json": "x"}"#,
        )
        .unwrap();
        let descriptions = IngestionStage::read_descriptions(dir.path());
        assert_eq!(descriptions.len(), 1);
        assert_eq!(descriptions["a.txt"], "important contract");
    }
}
