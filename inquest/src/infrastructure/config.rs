// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Engine Configuration
//!
//! One configuration record for the whole engine, loadable from a TOML file
//! and `INQUEST_*` environment variables (environment wins). Every recognized
//! option of the external-interface contract is a field; unknown keys are
//! ignored so deployments can carry extra settings.
//!
//! A missing uploads directory is a fatal configuration error at startup;
//! everything else has a usable default.

use inquest_domain::error::InvestigationError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Compliance-gate thresholds of the decision table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceThresholds {
    pub max_delta_e_valid: f64,
    pub min_fidelity_valid: f64,
    pub max_delta_e_review: f64,
    pub min_fidelity_review: f64,
    pub min_rcf: f64,
}

impl Default for ComplianceThresholds {
    fn default() -> Self {
        Self {
            max_delta_e_valid: 0.05,
            min_fidelity_valid: 0.99,
            max_delta_e_review: 0.10,
            min_fidelity_review: 0.95,
            min_rcf: 0.95,
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Directory layout
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub quarantine_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub knowledge_base_dir: PathBuf,
    pub investigations_dir: PathBuf,
    pub ledger_db_path: PathBuf,
    /// Enables the checkpoint backend when set.
    pub checkpoint_dir: Option<PathBuf>,

    // Ingestion
    pub supported_extensions: Vec<String>,
    pub max_file_size_mb: u64,
    pub max_retries: u32,

    // OCR
    pub ocr_languages: String,
    pub tesseract_cmd: Option<String>,

    // NER
    pub ner_model_pt: String,
    pub ner_model_en: String,
    pub entity_types: Vec<String>,
    pub min_entity_confidence: f64,

    // Embeddings / vector store
    pub embedding_provider: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub vector_host: String,
    pub vector_port: u16,
    pub vector_collection: String,

    // Graph store
    pub graph_uri: String,
    pub graph_user: String,
    pub graph_password: String,
    pub graph_database: String,

    // Semantic linking
    pub semantic_similarity_threshold: f64,
    pub min_shared_entities: usize,
    pub max_links_per_document: usize,

    // Pattern recognition
    pub outlier_threshold: f64,
    pub min_cluster_size: usize,

    // Compliance gate
    pub compliance: ComplianceThresholds,

    // Orchestration
    /// Suspend before the compliance gate for human review.
    pub interrupt_before_gate: bool,

    // Logging
    pub log_level: String,

    // Optional LLM narrative
    pub llm_api_key: Option<String>,
    pub llm_model: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("data");
        Self {
            uploads_dir: data_dir.join("uploads"),
            quarantine_dir: data_dir.join("quarantine"),
            reports_dir: data_dir.join("reports"),
            knowledge_base_dir: data_dir.join("knowledge_base"),
            investigations_dir: data_dir.join("investigations"),
            ledger_db_path: data_dir.join("processing_ledger.db"),
            checkpoint_dir: None,
            data_dir,
            supported_extensions: [
                ".pdf", ".docx", ".doc", ".txt", ".xlsx", ".xls", ".csv", ".json", ".xml",
                ".html", ".eml", ".msg", ".png", ".jpg", ".jpeg", ".mp3", ".wav",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            max_file_size_mb: 100,
            max_retries: 5,
            ocr_languages: "por+eng".to_string(),
            tesseract_cmd: None,
            ner_model_pt: "pt_core_news_lg".to_string(),
            ner_model_en: "en_core_web_lg".to_string(),
            entity_types: [
                "PERSON", "ORG", "GPE", "LOC", "DATE", "MONEY", "PERCENT", "PHONE", "EMAIL",
                "CPF", "CNPJ",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            min_entity_confidence: 0.7,
            embedding_provider: "local".to_string(),
            embedding_model: "feature-hashing-384".to_string(),
            embedding_dimension: 384,
            vector_host: "localhost".to_string(),
            vector_port: 8000,
            vector_collection: "inquest_documents".to_string(),
            graph_uri: "bolt://localhost:7687".to_string(),
            graph_user: "neo4j".to_string(),
            graph_password: String::new(),
            graph_database: "neo4j".to_string(),
            semantic_similarity_threshold: 0.75,
            min_shared_entities: 2,
            max_links_per_document: 50,
            outlier_threshold: 3.0,
            min_cluster_size: 3,
            compliance: ComplianceThresholds::default(),
            interrupt_before_gate: true,
            log_level: "info".to_string(),
            llm_api_key: None,
            llm_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from an optional TOML file and `INQUEST_*`
    /// environment variables; the environment overrides the file.
    pub fn load(config_file: Option<&Path>) -> Result<Self, InvestigationError> {
        let mut builder = config::Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(config::Environment::with_prefix("INQUEST").separator("__"));
        let loaded = builder
            .build()
            .map_err(|e| InvestigationError::invalid_config(format!("Config load failed: {}", e)))?;
        loaded
            .try_deserialize()
            .map_err(|e| InvestigationError::invalid_config(format!("Config parse failed: {}", e)))
    }

    /// Creates every directory the engine writes to.
    pub fn ensure_directories(&self) -> Result<(), InvestigationError> {
        for dir in [
            &self.data_dir,
            &self.uploads_dir,
            &self.quarantine_dir,
            &self.reports_dir,
            &self.knowledge_base_dir,
            &self.investigations_dir,
        ] {
            std::fs::create_dir_all(dir)
                .map_err(|e| InvestigationError::io_error(format!("mkdir {}: {}", dir.display(), e)))?;
        }
        if let Some(dir) = &self.checkpoint_dir {
            std::fs::create_dir_all(dir)
                .map_err(|e| InvestigationError::io_error(format!("mkdir {}: {}", dir.display(), e)))?;
        }
        if let Some(parent) = self.ledger_db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| InvestigationError::io_error(format!("mkdir {}: {}", parent.display(), e)))?;
        }
        Ok(())
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    /// True when the extension (lowercase, with dot) is ingestible.
    pub fn supports_extension(&self, extension: &str) -> bool {
        self.supported_extensions.iter().any(|e| e == extension)
    }

    /// Narrative generation is enabled only when an API key is configured.
    pub fn narrative_enabled(&self) -> bool {
        self.llm_api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let config = EngineConfig::default();
        assert_eq!(config.max_file_size_mb, 100);
        assert_eq!(config.semantic_similarity_threshold, 0.75);
        assert_eq!(config.min_shared_entities, 2);
        assert_eq!(config.max_links_per_document, 50);
        assert_eq!(config.outlier_threshold, 3.0);
        assert_eq!(config.min_cluster_size, 3);
        assert!(config.interrupt_before_gate);
        assert!(config.checkpoint_dir.is_none());
        assert!(!config.narrative_enabled());
    }

    #[test]
    fn extension_check_is_exact() {
        let config = EngineConfig::default();
        assert!(config.supports_extension(".pdf"));
        assert!(config.supports_extension(".eml"));
        assert!(!config.supports_extension(".exe"));
    }

    #[test]
    fn compliance_thresholds_default_to_decision_table() {
        let t = ComplianceThresholds::default();
        assert_eq!(t.max_delta_e_valid, 0.05);
        assert_eq!(t.min_fidelity_valid, 0.99);
        assert_eq!(t.max_delta_e_review, 0.10);
        assert_eq!(t.min_fidelity_review, 0.95);
        assert_eq!(t.min_rcf, 0.95);
    }

    #[test]
    fn max_file_size_converts_to_bytes() {
        let config = EngineConfig::default();
        assert_eq!(config.max_file_size_bytes(), 100 * 1024 * 1024);
    }
}
