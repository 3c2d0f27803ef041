// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document Identifier
//!
//! A document is identified by the first 16 hexadecimal characters of its
//! SHA-256 content hash. The id is therefore content-addressed: the same
//! bytes always produce the same id, which is what makes deduplication and
//! the processing ledger work across runs.

use crate::error::InvestigationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix length taken from the full content hash.
pub const DOC_ID_LEN: usize = 16;

/// Type-safe document identifier derived from the content hash.
///
/// # Examples
///
/// ```
/// use inquest_domain::value_objects::DocumentId;
///
/// let id = DocumentId::from_content_hash(
///     "a3f5c9e18b2d47608c1e5a7f9b3d2c4e6a8f0b1c3d5e7f9a0b2c4d6e8f0a1b2c",
/// ).unwrap();
/// assert_eq!(id.as_str(), "a3f5c9e18b2d4760");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Derives the document id from a full content hash (hex string).
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the hash is shorter than 16 characters or
    /// contains non-hex characters.
    pub fn from_content_hash(hash: &str) -> Result<Self, InvestigationError> {
        if hash.len() < DOC_ID_LEN {
            return Err(InvestigationError::validation_error(format!(
                "Content hash too short for document id: {} chars",
                hash.len()
            )));
        }
        let prefix = &hash[..DOC_ID_LEN];
        if !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvestigationError::validation_error(format!(
                "Content hash is not hexadecimal: {}",
                prefix
            )));
        }
        Ok(Self(prefix.to_ascii_lowercase()))
    }

    /// Reconstructs an id from its stored string form.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` unless the value is exactly 16 hex chars.
    pub fn parse(value: &str) -> Result<Self, InvestigationError> {
        if value.len() != DOC_ID_LEN || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvestigationError::validation_error(format!(
                "Invalid document id: {}",
                value
            )));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_16_char_prefix() {
        let hash = "deadbeefcafebabe0123456789abcdef0123456789abcdef0123456789abcdef";
        let id = DocumentId::from_content_hash(hash).unwrap();
        assert_eq!(id.as_str(), "deadbeefcafebabe");
    }

    #[test]
    fn rejects_short_hash() {
        assert!(DocumentId::from_content_hash("abc").is_err());
    }

    #[test]
    fn rejects_non_hex() {
        assert!(DocumentId::parse("zzzzzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn parse_roundtrip() {
        let id = DocumentId::parse("0123456789abcdef").unwrap();
        assert_eq!(DocumentId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn same_hash_same_id() {
        let hash = "ffffffffffffffff0000000000000000ffffffffffffffff0000000000000000";
        assert_eq!(
            DocumentId::from_content_hash(hash).unwrap(),
            DocumentId::from_content_hash(hash).unwrap()
        );
    }
}
