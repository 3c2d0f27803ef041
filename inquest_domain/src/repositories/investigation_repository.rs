// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Investigation Repository Port
//!
//! Durable investigation records: a `meta.json` (identity, lifecycle,
//! version, batch history) and a `state.json` (full state serialization,
//! timestamps as ISO-8601 strings) per investigation.

use crate::aggregates::InvestigationState;
use crate::error::InvestigationError;
use crate::services::datetime_serde;
use crate::value_objects::InvestigationId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ingestion batch appended to an investigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRecord {
    pub batch_id: String,
    #[serde(with = "datetime_serde")]
    pub added_at: DateTime<Utc>,
    pub doc_count: usize,
    pub entity_count_before: Option<usize>,
    pub entity_count_after: Option<usize>,
}

/// Investigation metadata persisted alongside the state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationMeta {
    pub id: InvestigationId,
    pub name: String,
    #[serde(with = "datetime_serde")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_serde")]
    pub updated_at: DateTime<Utc>,
    pub status: String,
    pub version: u64,
    #[serde(default)]
    pub batches: Vec<BatchRecord>,
}

/// Durable investigation records.
#[async_trait]
pub trait InvestigationRepository: Send + Sync {
    /// Creates a new investigation record; the name defaults to the id.
    async fn create(
        &self,
        id: &InvestigationId,
        name: Option<&str>,
    ) -> Result<InvestigationMeta, InvestigationError>;

    /// All investigations, newest first by `updated_at`.
    async fn list(&self) -> Result<Vec<InvestigationMeta>, InvestigationError>;

    /// Metadata for one investigation.
    async fn meta(&self, id: &InvestigationId)
        -> Result<Option<InvestigationMeta>, InvestigationError>;

    /// Persists the full state, bumping its version via `touch_for_save`
    /// and refreshing the metadata's `updated_at`/`version`.
    async fn save_state(
        &self,
        id: &InvestigationId,
        state: &mut InvestigationState,
    ) -> Result<(), InvestigationError>;

    /// Loads the full state, or `None` when never saved.
    async fn load_state(
        &self,
        id: &InvestigationId,
    ) -> Result<Option<InvestigationState>, InvestigationError>;

    /// Appends a batch record to the investigation's history.
    async fn append_batch(
        &self,
        id: &InvestigationId,
        batch: BatchRecord,
    ) -> Result<(), InvestigationError>;
}
