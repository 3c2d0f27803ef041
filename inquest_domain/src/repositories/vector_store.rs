// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Vector Store Port
//!
//! Chunk-level similarity index. Every chunk is scoped to its document id;
//! distance is in `[0, ∞)` with lower meaning more similar, and callers
//! convert to similarity as `max(0, 1 − distance)`.

use crate::error::InvestigationError;
use crate::value_objects::DocumentId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One similarity hit from a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryHit {
    pub chunk_id: String,
    /// The indexed chunk text.
    pub document: String,
    pub doc_id: DocumentId,
    pub distance: f64,
}

impl QueryHit {
    /// Distance → similarity conversion used across the engine.
    pub fn similarity(&self) -> f64 {
        (1.0 - self.distance).max(0.0)
    }
}

/// Chunk-level vector index.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts or replaces a chunk with its embedding and owning document.
    async fn upsert(
        &self,
        chunk_id: &str,
        text: &str,
        embedding: &[f32],
        doc_id: &DocumentId,
    ) -> Result<(), InvestigationError>;

    /// The `n` nearest chunks, optionally restricted to the given documents.
    async fn query(
        &self,
        embedding: &[f32],
        n: usize,
        filter_doc_ids: Option<&[DocumentId]>,
    ) -> Result<Vec<QueryHit>, InvestigationError>;
}
