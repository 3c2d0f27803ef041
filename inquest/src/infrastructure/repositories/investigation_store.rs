// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # File Investigation Store
//!
//! One directory per investigation under the investigations root:
//! `meta.json` (identity, lifecycle, version, batch history, last 100
//! batches) and `state.json` (full state, timestamps as ISO-8601 strings).

use async_trait::async_trait;
use chrono::Utc;
use inquest_domain::aggregates::InvestigationState;
use inquest_domain::error::InvestigationError;
use inquest_domain::repositories::{BatchRecord, InvestigationMeta, InvestigationRepository};
use inquest_domain::value_objects::InvestigationId;
use std::path::PathBuf;

const META_FILE: &str = "meta.json";
const STATE_FILE: &str = "state.json";
const MAX_BATCHES: usize = 100;

/// Filesystem-backed investigation repository.
pub struct FileInvestigationStore {
    root: PathBuf,
}

impl FileInvestigationStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn dir_for(&self, id: &InvestigationId) -> PathBuf {
        self.root.join(id.as_str())
    }

    async fn read_meta(&self, id: &InvestigationId) -> Result<Option<InvestigationMeta>, InvestigationError> {
        let path = self.dir_for(id).join(META_FILE);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(InvestigationError::io_error(format!("meta read: {}", e))),
        }
    }

    async fn write_meta(&self, meta: &InvestigationMeta) -> Result<(), InvestigationError> {
        let dir = self.dir_for(&meta.id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| InvestigationError::io_error(format!("investigation dir: {}", e)))?;
        let payload = serde_json::to_vec_pretty(meta)?;
        tokio::fs::write(dir.join(META_FILE), payload)
            .await
            .map_err(|e| InvestigationError::io_error(format!("meta write: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl InvestigationRepository for FileInvestigationStore {
    async fn create(
        &self,
        id: &InvestigationId,
        name: Option<&str>,
    ) -> Result<InvestigationMeta, InvestigationError> {
        let now = Utc::now();
        let meta = InvestigationMeta {
            id: id.clone(),
            name: name.unwrap_or(id.as_str()).to_string(),
            created_at: now,
            updated_at: now,
            status: "active".to_string(),
            version: 1,
            batches: Vec::new(),
        };
        self.write_meta(&meta).await?;
        Ok(meta)
    }

    async fn list(&self) -> Result<Vec<InvestigationMeta>, InvestigationError> {
        let mut result = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(result),
            Err(e) => return Err(InvestigationError::io_error(format!("list: {}", e))),
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| InvestigationError::io_error(format!("list entry: {}", e)))?
        {
            let meta_path = entry.path().join(META_FILE);
            if let Ok(bytes) = tokio::fs::read(&meta_path).await {
                if let Ok(meta) = serde_json::from_slice::<InvestigationMeta>(&bytes) {
                    result.push(meta);
                }
            }
        }
        result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(result)
    }

    async fn meta(
        &self,
        id: &InvestigationId,
    ) -> Result<Option<InvestigationMeta>, InvestigationError> {
        self.read_meta(id).await
    }

    async fn save_state(
        &self,
        id: &InvestigationId,
        state: &mut InvestigationState,
    ) -> Result<(), InvestigationError> {
        let dir = self.dir_for(id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| InvestigationError::io_error(format!("investigation dir: {}", e)))?;
        state.touch_for_save();
        let payload = serde_json::to_vec_pretty(state)?;
        tokio::fs::write(dir.join(STATE_FILE), payload)
            .await
            .map_err(|e| InvestigationError::io_error(format!("state write: {}", e)))?;

        let mut meta = match self.read_meta(id).await? {
            Some(meta) => meta,
            None => self.create(id, None).await?,
        };
        meta.updated_at = Utc::now();
        meta.version = state.version;
        self.write_meta(&meta).await
    }

    async fn load_state(
        &self,
        id: &InvestigationId,
    ) -> Result<Option<InvestigationState>, InvestigationError> {
        let path = self.dir_for(id).join(STATE_FILE);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(InvestigationError::io_error(format!("state read: {}", e))),
        }
    }

    async fn append_batch(
        &self,
        id: &InvestigationId,
        batch: BatchRecord,
    ) -> Result<(), InvestigationError> {
        let Some(mut meta) = self.read_meta(id).await? else {
            return Err(InvestigationError::InvestigationNotFound(id.to_string()));
        };
        meta.batches.push(batch);
        if meta.batches.len() > MAX_BATCHES {
            let excess = meta.batches.len() - MAX_BATCHES;
            meta.batches.drain(..excess);
        }
        meta.updated_at = Utc::now();
        self.write_meta(&meta).await
    }
}
