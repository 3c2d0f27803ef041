// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Checkpoint Store Port
//!
//! Durable state snapshots keyed by thread id. When configured, the
//! orchestrator writes a checkpoint after every stage; `resume(thread_id)`
//! loads the latest snapshot and continues from the stage after its recorded
//! `current_step`. Only the latest snapshot per thread is retained.

use crate::aggregates::InvestigationState;
use crate::error::InvestigationError;
use async_trait::async_trait;

/// Durable per-thread state snapshots.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Persists the state as the thread's latest checkpoint, bumping the
    /// state's version via `touch_for_save` before serializing.
    async fn save(&self, thread_id: &str, state: &mut InvestigationState)
        -> Result<(), InvestigationError>;

    /// Loads the thread's latest checkpoint, or `None` when the thread has
    /// never checkpointed.
    async fn load(&self, thread_id: &str) -> Result<Option<InvestigationState>, InvestigationError>;
}
