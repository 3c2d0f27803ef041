// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Composition Root
//!
//! Wires the stage context from configuration: SQLite ledger, in-process
//! graph/vector stores, the local embedding provider, the rule-based NER
//! backend, the extraction registry, and the no-op capability fallbacks.
//! The binary and the end-to-end tests both build their engine here.

use crate::application::stages::StageContext;
use crate::infrastructure::activity::ActivityMonitor;
use crate::infrastructure::adapters::{
    ExtractorRegistry, HashEmbedding, InMemoryGraphStore, InMemoryVectorStore, NoOpNarrative,
    NoOpOcr, NoOpRenderer, NoOpStego, RuleBasedNer,
};
use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::memory::MemoryManager;
use crate::infrastructure::metrics::MetricsService;
use crate::infrastructure::reports::ReportWriter;
use crate::infrastructure::repositories::{FileCheckpointStore, SqliteLedger};
use inquest_domain::error::InvestigationError;
use inquest_domain::repositories::CheckpointStore;
use inquest_domain::services::capabilities::OcrEngine;
use std::sync::Arc;
use tracing::warn;

/// Builds the full stage context from configuration.
///
/// The `openai` embedding provider needs a network-backed adapter; without
/// one installed the engine degrades to the local provider with a warning,
/// per the capability rules.
pub async fn build_context(config: Arc<EngineConfig>) -> Result<StageContext, InvestigationError> {
    config.ensure_directories()?;

    let ledger = Arc::new(SqliteLedger::from_file(&config.ledger_db_path).await?);

    if config.embedding_provider != "local" {
        warn!(
            "embedding provider '{}' has no installed backend; using local feature hashing",
            config.embedding_provider
        );
    }
    let embeddings = Arc::new(HashEmbedding::new(config.embedding_dimension));

    let ocr: Arc<dyn OcrEngine> = Arc::new(NoOpOcr);
    let extractors = Arc::new(ExtractorRegistry::with_builtins(ocr, &config.ocr_languages));

    let renderer = Arc::new(NoOpRenderer);
    let reports = Arc::new(ReportWriter::new(config.reports_dir.clone(), renderer));

    Ok(StageContext {
        ledger,
        graph: Arc::new(InMemoryGraphStore::new()),
        vector: Arc::new(InMemoryVectorStore::new()),
        embeddings,
        ner: Arc::new(RuleBasedNer),
        extractors,
        stego: Arc::new(NoOpStego),
        narrative: Arc::new(NoOpNarrative),
        reports,
        activity: Arc::new(ActivityMonitor::new()),
        metrics: Arc::new(MetricsService::new()?),
        memory: Arc::new(MemoryManager::new(config.knowledge_base_dir.clone())),
        config,
    })
}

/// Checkpoint backend, enabled when `checkpoint_dir` is configured.
pub fn build_checkpoint_store(config: &EngineConfig) -> Option<Arc<dyn CheckpointStore>> {
    config
        .checkpoint_dir
        .as_ref()
        .map(|dir| Arc::new(FileCheckpointStore::new(dir.clone())) as Arc<dyn CheckpointStore>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inquest_domain::services::capabilities::{
        EmbeddingProvider, NamedEntityRecognizer, NarrativeGenerator,
    };
    use tempfile::TempDir;

    fn temp_config(dir: &TempDir) -> EngineConfig {
        let root = dir.path();
        EngineConfig {
            data_dir: root.join("data"),
            uploads_dir: root.join("data/uploads"),
            quarantine_dir: root.join("data/quarantine"),
            reports_dir: root.join("data/reports"),
            knowledge_base_dir: root.join("data/knowledge_base"),
            investigations_dir: root.join("data/investigations"),
            ledger_db_path: root.join("data/ledger.db"),
            ..EngineConfig::default()
        }
    }

    #[tokio::test]
    async fn context_builds_with_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Arc::new(temp_config(&dir));
        let ctx = build_context(Arc::clone(&config)).await.unwrap();
        assert!(ctx.embeddings.probe());
        assert!(ctx.ner.probe());
        assert!(!ctx.narrative.probe());
    }

    #[tokio::test]
    async fn checkpoint_store_follows_config() {
        let dir = TempDir::new().unwrap();
        let mut config = temp_config(&dir);
        assert!(build_checkpoint_store(&config).is_none());
        config.checkpoint_dir = Some(dir.path().join("checkpoints"));
        assert!(build_checkpoint_store(&config).is_some());
    }
}
