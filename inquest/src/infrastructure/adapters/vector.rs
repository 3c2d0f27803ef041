// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Vector Store and Embedding Adapters
//!
//! The in-memory vector store keeps L2-normalized embeddings and serves
//! cosine distance (`1 − cosine similarity`), which matches the engine-wide
//! `similarity = max(0, 1 − distance)` conversion.
//!
//! The `local` embedding provider is deterministic feature hashing over
//! lowercased word tokens: no model download, stable across runs, good
//! enough for lexical-overlap similarity. A remote provider (`openai`) is a
//! replaceable adapter; offline it degrades to the local provider with a
//! warning at composition time.

use async_trait::async_trait;
use inquest_domain::error::InvestigationError;
use inquest_domain::repositories::{QueryHit, VectorStore};
use inquest_domain::services::capabilities::EmbeddingProvider;
use inquest_domain::value_objects::DocumentId;
use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Deterministic feature-hashing bag-of-words embedder.
pub struct HashEmbedding {
    dimension: usize,
}

impl HashEmbedding {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(8),
        }
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dimension
    }
}

impl EmbeddingProvider for HashEmbedding {
    fn probe(&self) -> bool {
        true
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, InvestigationError> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0f32; self.dimension];
                for token in text
                    .to_lowercase()
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|t| t.len() >= 2)
                {
                    vector[self.bucket(token)] += 1.0;
                }
                let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
                if norm > 0.0 {
                    for v in vector.iter_mut() {
                        *v /= norm;
                    }
                }
                vector
            })
            .collect())
    }
}

struct StoredChunk {
    text: String,
    doc_id: DocumentId,
    embedding: Vec<f32>,
}

/// In-memory cosine-distance vector store, chunk-keyed.
pub struct InMemoryVectorStore {
    chunks: RwLock<BTreeMap<String, StoredChunk>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(BTreeMap::new()),
        }
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            (dot / (norm_a * norm_b)) as f64
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(
        &self,
        chunk_id: &str,
        text: &str,
        embedding: &[f32],
        doc_id: &DocumentId,
    ) -> Result<(), InvestigationError> {
        self.chunks.write().insert(
            chunk_id.to_string(),
            StoredChunk {
                text: text.to_string(),
                doc_id: doc_id.clone(),
                embedding: embedding.to_vec(),
            },
        );
        Ok(())
    }

    async fn query(
        &self,
        embedding: &[f32],
        n: usize,
        filter_doc_ids: Option<&[DocumentId]>,
    ) -> Result<Vec<QueryHit>, InvestigationError> {
        let chunks = self.chunks.read();
        let mut hits: Vec<QueryHit> = chunks
            .iter()
            .filter(|(_, chunk)| match filter_doc_ids {
                Some(ids) => ids.contains(&chunk.doc_id),
                None => true,
            })
            .map(|(id, chunk)| QueryHit {
                chunk_id: id.clone(),
                document: chunk.text.clone(),
                doc_id: chunk.doc_id.clone(),
                distance: 1.0 - Self::cosine_similarity(embedding, &chunk.embedding),
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        hits.truncate(n);
        Ok(hits)
    }
}
