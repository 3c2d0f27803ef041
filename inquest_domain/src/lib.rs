// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Inquest Domain
//!
//! The investigation domain represents the core business logic of the Inquest
//! intelligence engine. It is independent of databases, file systems, vector
//! stores, graph stores and user interfaces, all of which are reached through
//! ports defined here and implemented in the application crate.
//!
//! ## Domain Concepts
//!
//! ### The investigation state
//! A single mutable [`InvestigationState`] record is threaded through the
//! ten-stage analytical pipeline. Each stage is the sole writer of its output
//! fields and may read anything written by earlier stages. The state carries a
//! monotone `version` and a `last_updated` timestamp that are bumped on every
//! external save.
//!
//! ### Entities
//! Evidence-bearing records with identity:
//!
//! - [`Document`]: a processed file, identified by its content-hash prefix
//! - [`Entity`]: a merged noun-like reference (person, organization, email, …)
//! - [`Relationship`]: canonicalized co-occurrence between two entities
//! - [`SemanticLink`]: cross-document similarity above threshold
//! - [`TimelineEvent`]: a dated event reconstructed from document text
//! - `CryptoSegment` / `CryptographyFinding`: encoded spans and what they hide
//! - [`Pattern`] / `Anomaly`: structural and statistical signals
//! - [`Hypothesis`] / `Lead`: synthesized investigative output
//! - `ComplianceReport`: the gate's verdict with its metrics
//!
//! ### Value objects
//! Self-validating identifiers: [`DocumentId`] (first 16 hex characters of
//! the content hash), [`EntityId`], [`InvestigationId`].
//!
//! ### Domain services
//! Stateless logic that does not belong to one entity: text normalization,
//! language detection, chunking, classical-cipher detection and decoding,
//! RFC3339 datetime serialization.
//!
//! ### Ports
//! Async traits for everything the pipeline needs from the outside world:
//! the processing ledger, checkpoint store, investigation repository, graph
//! store, vector store, and the optional capabilities (OCR, NER, embeddings,
//! steganography, narrative generation, report rendering). Every capability
//! exposes `probe()`; absence degrades output, never fails the run.
//!
//! ## Error Handling
//!
//! All fallible domain operations return [`InvestigationError`]. Above the
//! per-document level errors are data, not control flow: stages record them
//! and the pipeline advances.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;
pub mod value_objects;

// Re-export commonly used types for convenient access
pub use aggregates::InvestigationState;
pub use entities::{
    Document, Entity, Hypothesis, Pattern, Relationship, SemanticLink, TimelineEvent,
};
pub use error::InvestigationError;
pub use events::ActivityEvent;
pub use value_objects::{DocumentId, EntityId, InvestigationId};
