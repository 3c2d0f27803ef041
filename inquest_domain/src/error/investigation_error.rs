// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! A hierarchical error type for the investigation domain. Errors are
//! organized by failure category so the orchestrator and the CLI can handle
//! them systematically:
//!
//! - **Configuration errors** are fatal at startup (§ error taxonomy).
//! - **Per-document errors** (unsupported type, too large, extraction or
//!   decode failure, encrypted input) are recorded on the document and in the
//!   ledger; they never abort a run.
//! - **Stage errors** are caught by the orchestrator, appended to the state's
//!   `error_log`, and the pipeline advances.
//! - **External-store errors** (graph, vector) degrade the stage's derived
//!   fields to empty defaults with a warning.
//! - **Cancellation** is the only error that terminates a run early, and it
//!   preserves partial state.
//!
//! The enum is `Clone` so errors can be logged and recorded in state without
//! giving up ownership.

use thiserror::Error;

/// Domain-specific errors for the investigation engine.
///
/// Each variant carries a descriptive message. Helper constructors accept
/// `impl Into<String>` so call sites stay terse.
#[derive(Error, Debug, Clone)]
pub enum InvestigationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Ingestion failed: {0}")]
    IngestionFailed(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Unsupported document: {0}")]
    UnsupportedDocument(String),

    #[error("Document too large: {0}")]
    DocumentTooLarge(String),

    #[error("Encrypted input: {0}")]
    EncryptedInput(String),

    #[error("Decode failed: {0}")]
    DecodeFailed(String),

    #[error("Stage failed: {0}")]
    StageFailed(String),

    #[error("Graph store error: {0}")]
    GraphStoreError(String),

    #[error("Vector store error: {0}")]
    VectorStoreError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Compliance gate error: {0}")]
    ComplianceError(String),

    #[error("Investigation not found: {0}")]
    InvestigationNotFound(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Metrics error: {0}")]
    MetricsError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl InvestigationError {
    /// Creates a new configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a new ingestion error
    pub fn ingestion_failed(msg: impl Into<String>) -> Self {
        Self::IngestionFailed(msg.into())
    }

    /// Creates a new extraction error
    pub fn extraction_failed(msg: impl Into<String>) -> Self {
        Self::ExtractionFailed(msg.into())
    }

    /// Creates a new stage error
    pub fn stage_failed(msg: impl Into<String>) -> Self {
        Self::StageFailed(msg.into())
    }

    /// Creates a new IO error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::IoError(msg.into())
    }

    /// Creates a new database error
    pub fn database_error(msg: impl Into<String>) -> Self {
        Self::DatabaseError(msg.into())
    }

    /// Creates a new serialization error
    pub fn serialization_error(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Creates a new validation error
    pub fn validation_error(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Creates a new cancellation error
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Creates a new internal error
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// True when the error indicates a transient condition worth retrying.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::IoError(_) | Self::DatabaseError(_) | Self::GraphStoreError(_) | Self::VectorStoreError(_)
        )
    }

    /// Category label used in logs and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "configuration",
            Self::IngestionFailed(_)
            | Self::ExtractionFailed(_)
            | Self::UnsupportedDocument(_)
            | Self::DocumentTooLarge(_)
            | Self::EncryptedInput(_)
            | Self::DecodeFailed(_) => "document",
            Self::StageFailed(_) => "stage",
            Self::GraphStoreError(_) | Self::VectorStoreError(_) => "external_store",
            Self::IoError(_) | Self::DatabaseError(_) | Self::SerializationError(_) => "infrastructure",
            Self::ValidationError(_) | Self::ComplianceError(_) => "compliance",
            Self::InvestigationNotFound(_) => "lookup",
            Self::Cancelled(_) => "cancelled",
            Self::MetricsError(_) => "metrics",
            Self::InternalError(_) => "internal",
        }
    }
}

impl From<std::io::Error> for InvestigationError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for InvestigationError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
