// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # File Checkpoint Store
//!
//! One JSON state snapshot per thread id, overwritten after every stage. The
//! write goes through a temp file and a rename so a crash mid-write never
//! corrupts the last good checkpoint.

use async_trait::async_trait;
use inquest_domain::aggregates::InvestigationState;
use inquest_domain::error::InvestigationError;
use inquest_domain::repositories::CheckpointStore;
use std::path::PathBuf;

/// Filesystem-backed checkpoint store.
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, thread_id: &str) -> PathBuf {
        // Thread ids are uuids or caller-supplied tokens; keep the file name safe
        let safe: String = thread_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn save(
        &self,
        thread_id: &str,
        state: &mut InvestigationState,
    ) -> Result<(), InvestigationError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| InvestigationError::io_error(format!("checkpoint dir: {}", e)))?;
        state.touch_for_save();
        let payload = serde_json::to_vec_pretty(state)?;
        let path = self.path_for(thread_id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &payload)
            .await
            .map_err(|e| InvestigationError::io_error(format!("checkpoint write: {}", e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| InvestigationError::io_error(format!("checkpoint rename: {}", e)))?;
        Ok(())
    }

    async fn load(&self, thread_id: &str) -> Result<Option<InvestigationState>, InvestigationError> {
        let path = self.path_for(thread_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(InvestigationError::io_error(format!("checkpoint read: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inquest_domain::aggregates::RunConfig;
    use tempfile::TempDir;

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(dir.path().to_path_buf());
        let mut state = InvestigationState::new(RunConfig::default());
        state.current_step = "ingestion_complete".to_string();
        store.save("thread-1", &mut state).await.unwrap();

        let loaded = store.load("thread-1").await.unwrap().unwrap();
        assert_eq!(loaded.current_step, "ingestion_complete");
        assert_eq!(loaded.version, state.version);
    }

    #[tokio::test]
    async fn save_bumps_version_each_time() {
        let dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(dir.path().to_path_buf());
        let mut state = InvestigationState::default();
        store.save("t", &mut state).await.unwrap();
        let v1 = state.version;
        store.save("t", &mut state).await.unwrap();
        assert!(state.version > v1);
    }

    #[tokio::test]
    async fn missing_thread_loads_none() {
        let dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(dir.path().to_path_buf());
        assert!(store.load("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn hostile_thread_ids_stay_in_dir() {
        let dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(dir.path().to_path_buf());
        let mut state = InvestigationState::default();
        store.save("../escape", &mut state).await.unwrap();
        assert!(store.load("../escape").await.unwrap().is_some());
        // Nothing escaped the checkpoint directory
        assert!(dir.path().join("___escape.json").exists());
    }
}
