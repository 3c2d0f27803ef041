// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Type-safe investigation identifier.
//!
//! The investigation id doubles as the checkpoint thread id: `resume`
//! continues the thread with the same id, and the processing ledger scopes
//! every document row to it.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one investigation (a UUID v4 in canonical string form).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvestigationId(String);

impl InvestigationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps a caller-supplied id (e.g. a resumed thread id). Any non-empty
    /// string is accepted; the ledger and checkpoint store treat the id as
    /// an opaque key.
    pub fn from_string(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::new()
        } else {
            Self(value)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for InvestigationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InvestigationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
