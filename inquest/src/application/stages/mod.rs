// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Stages
//!
//! Each of the ten analytical stages implements [`InvestigationStage`]:
//! it takes the mutable investigation state and the shared [`StageContext`]
//! of injected dependencies, mutates its output fields, and sets
//! `current_step` on success. Stages never call each other — the
//! orchestrator invokes them in topological order and owns error capture.
//!
//! External stores are used only inside the stage that needs them, opened on
//! stage start and closed on stage end on all paths.

pub mod classification;
pub mod compliance_gate;
pub mod cryptanalysis;
pub mod entity_extraction;
pub mod graph_builder;
pub mod ingestion;
pub mod pattern_recognition;
pub mod semantic_linker;
pub mod synthesis;
pub mod timeline;

use crate::infrastructure::activity::ActivityMonitor;
use crate::infrastructure::adapters::ExtractorRegistry;
use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::memory::MemoryManager;
use crate::infrastructure::metrics::MetricsService;
use crate::infrastructure::reports::ReportWriter;
use async_trait::async_trait;
use inquest_domain::aggregates::InvestigationState;
use inquest_domain::error::InvestigationError;
use inquest_domain::repositories::{GraphStore, ProcessingLedger, VectorStore};
use inquest_domain::services::capabilities::{
    EmbeddingProvider, NamedEntityRecognizer, NarrativeGenerator, StegoReader,
};
use std::sync::Arc;

/// Shared dependencies injected into every stage.
pub struct StageContext {
    pub config: Arc<EngineConfig>,
    pub ledger: Arc<dyn ProcessingLedger>,
    pub graph: Arc<dyn GraphStore>,
    pub vector: Arc<dyn VectorStore>,
    pub embeddings: Arc<dyn EmbeddingProvider>,
    pub ner: Arc<dyn NamedEntityRecognizer>,
    pub extractors: Arc<ExtractorRegistry>,
    pub stego: Arc<dyn StegoReader>,
    pub narrative: Arc<dyn NarrativeGenerator>,
    pub reports: Arc<ReportWriter>,
    pub activity: Arc<ActivityMonitor>,
    pub metrics: Arc<MetricsService>,
    pub memory: Arc<MemoryManager>,
}

/// One node of the analytical pipeline.
#[async_trait]
pub trait InvestigationStage: Send + Sync {
    /// Node name used for registration, activity events and the ledger.
    fn name(&self) -> &'static str;

    /// Step label: stages record `<label>_complete` in `current_step`.
    fn step_label(&self) -> &'static str;

    /// Executes the stage against the shared state. An `Err` is captured by
    /// the orchestrator into `error_log`; the pipeline advances either way.
    async fn run(
        &self,
        state: &mut InvestigationState,
        ctx: &StageContext,
    ) -> Result<(), InvestigationError>;
}
