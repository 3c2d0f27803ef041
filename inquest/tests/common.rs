// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Shared helpers for the integration and end-to-end suites: a fully
//! in-process engine over a temporary directory tree.

use inquest::application::stages::StageContext;
use inquest::application::InvestigationPipeline;
use inquest::infrastructure::composition::{build_checkpoint_store, build_context};
use inquest::infrastructure::config::EngineConfig;
use inquest_bootstrap::shutdown::CancellationToken;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// An engine wired entirely against a temp directory.
pub struct TestEngine {
    pub config: Arc<EngineConfig>,
    pub ctx: Arc<StageContext>,
    // Keeps the temp tree alive for the engine's lifetime
    #[allow(dead_code)]
    pub root: TempDir,
}

/// Configuration rooted in a fresh temp directory. The similarity threshold
/// is lowered so the lexical test corpus can actually link; production keeps
/// the 0.75 default.
pub fn test_config(root: &TempDir, checkpoints: bool) -> EngineConfig {
    let base = root.path();
    EngineConfig {
        data_dir: base.join("data"),
        uploads_dir: base.join("data/uploads"),
        quarantine_dir: base.join("data/quarantine"),
        reports_dir: base.join("data/reports"),
        knowledge_base_dir: base.join("data/knowledge_base"),
        investigations_dir: base.join("data/investigations"),
        ledger_db_path: base.join("data/processing_ledger.db"),
        checkpoint_dir: checkpoints.then(|| base.join("data/checkpoints")),
        semantic_similarity_threshold: 0.35,
        ..EngineConfig::default()
    }
}

pub async fn test_engine(checkpoints: bool) -> TestEngine {
    let root = TempDir::new().expect("temp dir");
    let config = Arc::new(test_config(&root, checkpoints));
    let ctx = Arc::new(build_context(Arc::clone(&config)).await.expect("context"));
    TestEngine { config, ctx, root }
}

impl TestEngine {
    pub fn uploads(&self) -> &Path {
        &self.config.uploads_dir
    }

    pub fn write_upload(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.config.uploads_dir.join(name);
        std::fs::create_dir_all(&self.config.uploads_dir).expect("uploads dir");
        std::fs::write(&path, content).expect("write upload");
        path
    }

    pub fn pipeline(&self, interrupt_allowed: bool) -> InvestigationPipeline {
        let checkpoints = if interrupt_allowed {
            build_checkpoint_store(&self.config)
        } else {
            None
        };
        InvestigationPipeline::new(
            Arc::clone(&self.ctx),
            checkpoints,
            true,
            CancellationToken::detached(),
        )
    }

    pub fn pipeline_with_token(&self, token: CancellationToken) -> InvestigationPipeline {
        InvestigationPipeline::new(
            Arc::clone(&self.ctx),
            build_checkpoint_store(&self.config),
            true,
            token,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inquest_domain::services::capabilities::EmbeddingProvider;

    #[tokio::test]
    async fn test_engine_builds() {
        let engine = test_engine(false).await;
        assert!(engine.uploads().ends_with("uploads"));
        assert!(engine.ctx.embeddings.probe());
    }
}
