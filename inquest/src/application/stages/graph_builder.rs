// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Graph Construction Stage
//!
//! Externalizes entities and relationships to the graph store (idempotent
//! MERGEs), reads back statistics, and derives centrality, communities and
//! betweenness. Failed analytics degrade to empty maps with a warning; the
//! store is closed on every path.

use crate::application::stages::{InvestigationStage, StageContext};
use async_trait::async_trait;
use inquest_domain::aggregates::{GraphMetadata, InvestigationState, TopEntity};
use inquest_domain::error::InvestigationError;
use inquest_domain::repositories::GraphStore;
use inquest_domain::value_objects::EntityId;
use std::collections::BTreeMap;
use tracing::{info, warn};

const TOP_ENTITIES: usize = 20;
const TOP_BRIDGES: usize = 15;

/// Stage 8: knowledge-graph construction.
pub struct GraphBuilderStage;

impl GraphBuilderStage {
    async fn build(
        state: &mut InvestigationState,
        ctx: &StageContext,
    ) -> Result<(), InvestigationError> {
        for entity in state.entities.values() {
            ctx.graph.merge_entity(entity).await?;
        }
        for relationship in &state.relationships {
            ctx.graph.merge_related_edge(relationship).await?;
        }

        let stats = ctx.graph.stats().await?;

        let centrality = match ctx.graph.pagerank().await {
            Ok(scores) => scores,
            Err(e) => {
                warn!("centrality failed: {}", e);
                BTreeMap::new()
            }
        };
        let communities = match ctx.graph.louvain().await {
            Ok(communities) => communities,
            Err(e) => {
                warn!("community detection failed: {}", e);
                BTreeMap::new()
            }
        };
        let betweenness = match ctx.graph.betweenness().await {
            Ok(scores) => scores,
            Err(e) => {
                warn!("betweenness failed: {}", e);
                BTreeMap::new()
            }
        };

        // Top entities by centrality, tagged with their community
        let community_of: BTreeMap<&EntityId, i64> = communities
            .iter()
            .flat_map(|(&community, members)| members.iter().map(move |m| (m, community)))
            .collect();
        let mut ranked: Vec<(&EntityId, f64)> =
            centrality.iter().map(|(id, &score)| (id, score)).collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        let top_entities: Vec<TopEntity> = ranked
            .iter()
            .take(TOP_ENTITIES)
            .map(|(id, score)| TopEntity {
                entity_id: (*id).clone(),
                text: state
                    .entities
                    .get(*id)
                    .map(|e| e.text.clone())
                    .unwrap_or_else(|| id.to_string()),
                centrality: (score * 10_000.0).round() / 10_000.0,
                community: community_of.get(id).copied(),
            })
            .collect();

        let mut bridge_ranked: Vec<(&EntityId, f64)> =
            betweenness.iter().map(|(id, &score)| (id, score)).collect();
        bridge_ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        let bridges: Vec<(EntityId, String, f64)> = bridge_ranked
            .iter()
            .take(TOP_BRIDGES)
            .map(|(id, score)| {
                (
                    (*id).clone(),
                    state
                        .entities
                        .get(*id)
                        .map(|e| e.text.clone())
                        .unwrap_or_else(|| id.to_string()),
                    (score * 10_000.0).round() / 10_000.0,
                )
            })
            .collect();

        state.graph_metadata = GraphMetadata {
            node_count: stats.node_count,
            edge_count: stats.edge_count,
            entity_types: stats.entity_types,
            top_entities,
            bridges,
            community_count: communities.len(),
        };
        state.centrality_scores = centrality;
        state.communities = communities;
        info!(
            "graph: {} nodes, {} edges",
            state.graph_metadata.node_count, state.graph_metadata.edge_count
        );
        Ok(())
    }
}

#[async_trait]
impl InvestigationStage for GraphBuilderStage {
    fn name(&self) -> &'static str {
        "build_knowledge_graph"
    }

    fn step_label(&self) -> &'static str {
        "knowledge_graph"
    }

    async fn run(
        &self,
        state: &mut InvestigationState,
        ctx: &StageContext,
    ) -> Result<(), InvestigationError> {
        ctx.graph.connect().await?;
        // Close on all paths, success or error
        let result = Self::build(state, ctx).await;
        if let Err(e) = ctx.graph.close().await {
            warn!("graph close failed: {}", e);
        }
        result?;
        state.current_step = "knowledge_graph_complete".to_string();
        Ok(())
    }
}
