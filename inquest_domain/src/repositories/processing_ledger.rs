// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Processing Ledger Port
//!
//! A durable table keyed by `(document_hash, investigation_id)` recording
//! per-document processing status across runs. Ingestion is its only client:
//! it skips documents marked `DONE` (at-most-once processing) and can retry
//! `FAILED` ones up to a retry budget. The ledger is shared between
//! concurrently running investigations; implementations upsert
//! transactionally on the composite key. Cancellation never rolls it back.

use crate::error::InvestigationError;
use crate::services::datetime_serde;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Processing status of one document within one investigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "PROCESSING")]
    Processing,
    #[serde(rename = "DONE")]
    Done,
    #[serde(rename = "FAILED")]
    Failed,
}

impl fmt::Display for DocStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for DocStatus {
    type Err = InvestigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PROCESSING" => Ok(Self::Processing),
            "DONE" => Ok(Self::Done),
            "FAILED" => Ok(Self::Failed),
            other => Err(InvestigationError::validation_error(format!(
                "Unknown ledger status: {}",
                other
            ))),
        }
    }
}

/// One ledger row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub doc_hash: String,
    pub investigation_id: String,
    pub status: DocStatus,
    pub last_stage: Option<String>,
    pub retry_count: u32,
    #[serde(with = "datetime_serde")]
    pub updated_at: DateTime<Utc>,
}

/// Durable per-document processing ledger.
#[async_trait]
pub trait ProcessingLedger: Send + Sync {
    /// Marks a document `PROCESSING` (upsert).
    async fn mark_start(&self, doc_hash: &str, investigation_id: &str)
        -> Result<(), InvestigationError>;

    /// Marks a document `DONE` (upsert).
    async fn mark_success(&self, doc_hash: &str, investigation_id: &str)
        -> Result<(), InvestigationError>;

    /// Marks a document `FAILED` and increments its retry count (upsert).
    async fn mark_failed(
        &self,
        doc_hash: &str,
        investigation_id: &str,
        last_stage: &str,
    ) -> Result<(), InvestigationError>;

    /// Current status, or `None` when the pair is not in the ledger.
    async fn status(
        &self,
        doc_hash: &str,
        investigation_id: &str,
    ) -> Result<Option<DocStatus>, InvestigationError>;

    /// `PENDING` and `FAILED` rows with `retry_count < max_retries`.
    async fn list_pending(
        &self,
        investigation_id: &str,
        max_retries: u32,
    ) -> Result<Vec<LedgerEntry>, InvestigationError>;
}
