// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Type-safe entity identifier.
//!
//! Entity ids are generated, not content-derived: two runs over the same
//! corpus may assign different ids to the same merged entity. Identity of the
//! *entity* is the (normalized_text, type) merge key; the id exists so graphs
//! and relationships have a stable handle within one investigation.

use crate::error::InvestigationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generated identifier of a merged entity (`e_` + 8 hex characters).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Generates a fresh id.
    pub fn new() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("e_{}", &hex[..8]))
    }

    /// Reconstructs an id from its stored form.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` unless the value matches `e_` + 8 hex chars.
    pub fn parse(value: &str) -> Result<Self, InvestigationError> {
        let suffix = value
            .strip_prefix("e_")
            .ok_or_else(|| InvestigationError::validation_error(format!("Invalid entity id: {}", value)))?;
        if suffix.len() != 8 || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvestigationError::validation_error(format!(
                "Invalid entity id: {}",
                value
            )));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_prefix_and_length() {
        let id = EntityId::new();
        assert!(id.as_str().starts_with("e_"));
        assert_eq!(id.as_str().len(), 10);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(EntityId::new(), EntityId::new());
    }

    #[test]
    fn parse_accepts_generated_form() {
        let id = EntityId::new();
        assert_eq!(EntityId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn parse_rejects_bad_forms() {
        assert!(EntityId::parse("x_12345678").is_err());
        assert!(EntityId::parse("e_123").is_err());
        assert!(EntityId::parse("e_zzzzzzzz").is_err());
    }
}
