// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Activity Event
//!
//! One entry in the activity stream: a stage started, ended, or errored for a
//! given investigation. Consumers poll the bounded ring buffer and filter by
//! investigation id; the event itself is immutable.

use crate::services::datetime_serde;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What the stage was doing when the event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStep {
    Start,
    End,
    Error,
}

impl fmt::Display for ActivityStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// A stage activity record tagged with its investigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Stage (node) name, e.g. `ingest_documents`.
    pub agent: String,
    pub step: ActivityStep,
    #[serde(with = "datetime_serde")]
    pub timestamp: DateTime<Utc>,
    pub investigation_id: Option<String>,
    #[serde(default)]
    pub payload: BTreeMap<String, serde_json::Value>,
}

impl ActivityEvent {
    pub fn now(agent: impl Into<String>, step: ActivityStep, investigation_id: Option<String>) -> Self {
        Self {
            agent: agent.into(),
            step,
            timestamp: Utc::now(),
            investigation_id,
            payload: BTreeMap::new(),
        }
    }

    pub fn with_payload(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }
}
