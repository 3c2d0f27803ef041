// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # In-Memory Graph Store
//!
//! The default `GraphStore` backend: MERGE semantics on entity id, typed
//! edges keyed by canonical endpoint pair, and analytics computed in-process
//! (PageRank power iteration, Louvain-style communities, Brandes
//! betweenness). A Bolt-speaking backend is a replaceable adapter with the
//! same port; failures of the analytics degrade to empty maps either way.
//!
//! Writes are idempotent, so concurrent investigations sharing the store
//! converge to the same nodes regardless of interleaving.

use crate::infrastructure::analysis;
use async_trait::async_trait;
use inquest_domain::entities::{Entity, Relationship};
use inquest_domain::error::InvestigationError;
use inquest_domain::repositories::{GraphStats, GraphStore, NeighborRow};
use inquest_domain::value_objects::EntityId;
use parking_lot::RwLock;
use petgraph::graph::UnGraph;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Clone)]
struct NodeRecord {
    text: String,
    entity_type: String,
    // Stored to honor the merge contract; only read back by external backends
    #[allow(dead_code)]
    confidence: f64,
    #[allow(dead_code)]
    normalized_text: String,
}

#[derive(Clone)]
struct EdgeRecord {
    relationship_type: String,
    weight: f64,
    evidence_docs: Vec<String>,
}

#[derive(Default)]
struct GraphData {
    nodes: BTreeMap<EntityId, NodeRecord>,
    edges: BTreeMap<(EntityId, EntityId), EdgeRecord>,
}

impl GraphData {
    /// Petgraph projection with a stable id ↔ index mapping (sorted by id).
    fn project(&self) -> (UnGraph<EntityId, f64>, Vec<EntityId>) {
        let mut graph = UnGraph::new_undirected();
        let ids: Vec<EntityId> = self.nodes.keys().cloned().collect();
        let indices: BTreeMap<&EntityId, _> =
            ids.iter().map(|id| (id, graph.add_node(id.clone()))).collect();
        for ((source, target), edge) in &self.edges {
            if let (Some(&a), Some(&b)) = (indices.get(source), indices.get(target)) {
                graph.add_edge(a, b, edge.weight);
            }
        }
        (graph, ids)
    }
}

/// In-memory `GraphStore` implementation.
pub struct InMemoryGraphStore {
    data: RwLock<GraphData>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(GraphData::default()),
        }
    }
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn connect(&self) -> Result<(), InvestigationError> {
        debug!("in-memory graph store connected");
        Ok(())
    }

    async fn close(&self) -> Result<(), InvestigationError> {
        debug!("in-memory graph store closed");
        Ok(())
    }

    async fn merge_entity(&self, entity: &Entity) -> Result<(), InvestigationError> {
        let mut data = self.data.write();
        data.nodes.insert(
            entity.entity_id.clone(),
            NodeRecord {
                text: entity.text.clone(),
                entity_type: entity.entity_type.to_string(),
                confidence: entity.confidence,
                normalized_text: entity.normalized_text.clone(),
            },
        );
        Ok(())
    }

    async fn merge_related_edge(&self, relationship: &Relationship) -> Result<(), InvestigationError> {
        let mut data = self.data.write();
        let key = (
            relationship.source_entity_id().clone(),
            relationship.target_entity_id().clone(),
        );
        data.edges.insert(
            key,
            EdgeRecord {
                relationship_type: relationship.relationship_type().to_string(),
                weight: relationship.weight(),
                evidence_docs: relationship
                    .evidence_doc_ids()
                    .iter()
                    .map(|d| d.to_string())
                    .collect(),
            },
        );
        Ok(())
    }

    async fn stats(&self) -> Result<GraphStats, InvestigationError> {
        let data = self.data.read();
        let mut entity_types = BTreeMap::new();
        for node in data.nodes.values() {
            *entity_types.entry(node.entity_type.clone()).or_insert(0) += 1;
        }
        Ok(GraphStats {
            node_count: data.nodes.len(),
            edge_count: data.edges.len(),
            entity_types,
        })
    }

    async fn pagerank(&self) -> Result<BTreeMap<EntityId, f64>, InvestigationError> {
        let data = self.data.read();
        let (graph, ids) = data.project();
        let ranks = analysis::pagerank(&graph);
        Ok(ids.into_iter().zip(ranks).collect())
    }

    async fn louvain(&self) -> Result<BTreeMap<i64, Vec<EntityId>>, InvestigationError> {
        let data = self.data.read();
        let (graph, ids) = data.project();
        let communities = analysis::louvain_communities(&graph);
        Ok(communities
            .into_iter()
            .map(|(community, members)| {
                (community, members.into_iter().map(|i| ids[i].clone()).collect())
            })
            .collect())
    }

    async fn betweenness(&self) -> Result<BTreeMap<EntityId, f64>, InvestigationError> {
        let data = self.data.read();
        let (graph, ids) = data.project();
        let scores = analysis::betweenness_centrality(&graph);
        Ok(ids.into_iter().zip(scores).collect())
    }

    async fn neighbors(
        &self,
        ids: &[EntityId],
        limit_per_id: usize,
    ) -> Result<Vec<NeighborRow>, InvestigationError> {
        let data = self.data.read();
        let mut rows = Vec::new();
        let mut seen = std::collections::BTreeSet::new();
        for id in ids {
            let mut found = 0usize;
            for ((source, target), _) in data.edges.iter() {
                if found >= limit_per_id {
                    break;
                }
                let other = if source == id {
                    Some(target)
                } else if target == id {
                    Some(source)
                } else {
                    None
                };
                if let Some(other) = other {
                    if seen.insert(other.clone()) {
                        if let Some(node) = data.nodes.get(other) {
                            rows.push(NeighborRow {
                                entity_id: other.clone(),
                                text: node.text.clone(),
                            });
                            found += 1;
                        }
                    }
                }
            }
        }
        Ok(rows)
    }

    async fn clear(&self) -> Result<(), InvestigationError> {
        let mut data = self.data.write();
        data.nodes.clear();
        data.edges.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inquest_domain::entities::EntityType;
    use inquest_domain::value_objects::DocumentId;
    use std::collections::BTreeSet;

    fn doc(n: u8) -> DocumentId {
        DocumentId::parse(&format!("{:016x}", n)).unwrap()
    }

    fn entity(name: &str) -> Entity {
        Entity::from_mention(name, EntityType::Person, 0.9, doc(1), None)
    }

    fn edge(a: &Entity, b: &Entity) -> Relationship {
        let evidence: BTreeSet<DocumentId> = [doc(1)].into_iter().collect();
        Relationship::co_occurrence(
            (&a.entity_id, a.entity_type),
            (&b.entity_id, b.entity_type),
            evidence,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn merge_is_idempotent() {
        let store = InMemoryGraphStore::new();
        let a = entity("Ana Souza");
        store.merge_entity(&a).await.unwrap();
        store.merge_entity(&a).await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.node_count, 1);
    }

    #[tokio::test]
    async fn stats_count_nodes_edges_and_types() {
        let store = InMemoryGraphStore::new();
        let a = entity("Ana Souza");
        let b = entity("Bruno Lima");
        store.merge_entity(&a).await.unwrap();
        store.merge_entity(&b).await.unwrap();
        store.merge_related_edge(&edge(&a, &b)).await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.node_count, 2);
        assert_eq!(stats.edge_count, 1);
        assert_eq!(stats.entity_types.get("PERSON"), Some(&2));
    }

    #[tokio::test]
    async fn analytics_cover_all_nodes() {
        let store = InMemoryGraphStore::new();
        let a = entity("Ana Souza");
        let b = entity("Bruno Lima");
        let c = entity("Carla Reis");
        for e in [&a, &b, &c] {
            store.merge_entity(e).await.unwrap();
        }
        store.merge_related_edge(&edge(&a, &b)).await.unwrap();
        store.merge_related_edge(&edge(&b, &c)).await.unwrap();

        let ranks = store.pagerank().await.unwrap();
        assert_eq!(ranks.len(), 3);
        let communities = store.louvain().await.unwrap();
        let members: usize = communities.values().map(|v| v.len()).sum();
        assert_eq!(members, 3);
        let betweenness = store.betweenness().await.unwrap();
        assert!(betweenness[&b.entity_id] > betweenness[&a.entity_id]);
    }

    #[tokio::test]
    async fn neighbors_respects_limit() {
        let store = InMemoryGraphStore::new();
        let hub = entity("Hub Central");
        store.merge_entity(&hub).await.unwrap();
        let mut spokes = Vec::new();
        for i in 0..5 {
            let spoke = entity(&format!("Spoke Number{}", i));
            store.merge_entity(&spoke).await.unwrap();
            store.merge_related_edge(&edge(&hub, &spoke)).await.unwrap();
            spokes.push(spoke);
        }
        let rows = store.neighbors(&[hub.entity_id.clone()], 3).await.unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn clear_wipes_everything() {
        let store = InMemoryGraphStore::new();
        store.merge_entity(&entity("Ana Souza")).await.unwrap();
        store.clear().await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.node_count, 0);
    }
}
