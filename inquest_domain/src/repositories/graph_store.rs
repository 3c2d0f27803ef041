// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Graph Store Port
//!
//! Externalizes the entity graph. Writes are idempotent MERGEs keyed by
//! entity id, so concurrent investigations sharing a store stay consistent.
//! Analytics (`pagerank`, `louvain`, `betweenness`) return empty maps on
//! failure — derived rankings degrade, the run never aborts on the store.
//!
//! Connection lifecycle is scoped to the stage that uses the store: open on
//! stage start, close on stage end, on all paths including errors.

use crate::entities::{Entity, Relationship};
use crate::error::InvestigationError;
use crate::value_objects::EntityId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Node/edge counts and type histogram read back from the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    #[serde(default)]
    pub entity_types: BTreeMap<String, usize>,
}

/// One neighbor row from [`GraphStore::neighbors`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborRow {
    pub entity_id: EntityId,
    pub text: String,
}

/// External entity-graph store.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn connect(&self) -> Result<(), InvestigationError>;

    async fn close(&self) -> Result<(), InvestigationError>;

    /// MERGE on the entity id: create or update the node's properties.
    async fn merge_entity(&self, entity: &Entity) -> Result<(), InvestigationError>;

    /// MERGE of the typed edge between the relationship's endpoints.
    async fn merge_related_edge(&self, relationship: &Relationship)
        -> Result<(), InvestigationError>;

    async fn stats(&self) -> Result<GraphStats, InvestigationError>;

    /// PageRank-equivalent centrality per entity. Empty map on analytic
    /// failure, never an error.
    async fn pagerank(&self) -> Result<BTreeMap<EntityId, f64>, InvestigationError>;

    /// Louvain-style community assignment: community id → member entities.
    /// Empty map on analytic failure.
    async fn louvain(&self) -> Result<BTreeMap<i64, Vec<EntityId>>, InvestigationError>;

    /// Betweenness centrality per entity. Empty map on analytic failure.
    async fn betweenness(&self) -> Result<BTreeMap<EntityId, f64>, InvestigationError>;

    /// Distinct neighbors of the given entities, up to `limit_per_id` each.
    async fn neighbors(
        &self,
        ids: &[EntityId],
        limit_per_id: usize,
    ) -> Result<Vec<NeighborRow>, InvestigationError>;

    /// Removes every node and edge. Dangerous; CLI-gated.
    async fn clear(&self) -> Result<(), InvestigationError>;
}
