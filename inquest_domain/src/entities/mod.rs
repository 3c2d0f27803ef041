// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain entities of the investigation knowledge base.
//!
//! Everything a stage writes into the state is a typed record defined here.
//! Construction normalizes shape (canonical endpoints, ordered pairs, derived
//! counts) so that downstream stages never re-check structural invariants.

pub mod classification;
pub mod compliance;
pub mod crypto;
pub mod document;
pub mod entity;
pub mod hypothesis;
pub mod pattern;
pub mod relationship;
pub mod semantic_link;
pub mod timeline_event;

pub use classification::{Classification, DocType, DomainTag, Relevance};
pub use compliance::{ComplianceReport, ComplianceStatus, OdosViolation, Severity};
pub use crypto::{CryptoScheme, CryptoSegment, CryptographyFinding};
pub use document::{Document, ExtractionStatus};
pub use entity::{Entity, EntityType};
pub use hypothesis::{Hypothesis, HypothesisStatus, Lead, LeadPriority};
pub use pattern::{Anomaly, NarrativeThread, Pattern, PatternCategory, TemporalAnomaly};
pub use relationship::{Relationship, RelationshipType};
pub use semantic_link::{Contradiction, ContradictionKind, SemanticLink};
pub use timeline_event::{EventType, TimelineEvent};
