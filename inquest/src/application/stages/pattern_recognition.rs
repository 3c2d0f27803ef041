// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pattern Recognition Stage
//!
//! Four analyses over the in-memory graph and corpus:
//!
//! - **Degree**: top-ten entities by degree become `high_degree` patterns;
//!   z-scores at or above the outlier threshold also raise anomalies.
//! - **Community**: modularity-based clusters of at least the configured
//!   minimum size become `community` patterns.
//! - **Temporal sequence**: two or more timeline events yield one pattern
//!   summarizing the leading event types.
//! - **Term frequency**: the top fifteen corpus terms (length ≥ 4) become
//!   `frequency` patterns, with z-score outliers flagged.

use crate::application::stages::{InvestigationStage, StageContext};
use crate::infrastructure::analysis;
use async_trait::async_trait;
use inquest_domain::aggregates::InvestigationState;
use inquest_domain::entities::{Anomaly, Pattern, PatternCategory, Severity};
use inquest_domain::error::InvestigationError;
use inquest_domain::value_objects::EntityId;
use petgraph::graph::UnGraph;
use std::collections::BTreeMap;
use tracing::info;

const TOP_DEGREE_ENTITIES: usize = 10;
const TOP_FREQUENT_TERMS: usize = 15;
const MIN_TERM_LEN: usize = 4;

fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        0.0
    } else {
        (value - mean) / std_dev
    }
}

/// Stage 7: pattern recognition.
pub struct PatternRecognitionStage;

impl PatternRecognitionStage {
    fn build_graph(state: &InvestigationState) -> (UnGraph<EntityId, f64>, Vec<EntityId>) {
        let mut graph = UnGraph::new_undirected();
        let ids: Vec<EntityId> = state.entities.keys().cloned().collect();
        let indices: BTreeMap<&EntityId, _> =
            ids.iter().map(|id| (id, graph.add_node(id.clone()))).collect();
        for relationship in &state.relationships {
            if let (Some(&a), Some(&b)) = (
                indices.get(relationship.source_entity_id()),
                indices.get(relationship.target_entity_id()),
            ) {
                graph.add_edge(a, b, relationship.weight());
            }
        }
        (graph, ids)
    }

    fn degree_analysis(
        state: &mut InvestigationState,
        graph: &UnGraph<EntityId, f64>,
        ids: &[EntityId],
        outlier_threshold: f64,
    ) {
        if graph.node_count() == 0 {
            return;
        }
        let degrees: Vec<usize> = graph
            .node_indices()
            .map(|i| graph.neighbors(i).count())
            .collect();
        let n = degrees.len() as f64;
        let mean = degrees.iter().sum::<usize>() as f64 / n;
        let variance = degrees.iter().map(|&d| (d as f64 - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        let mut ranked: Vec<(usize, &EntityId)> = degrees
            .iter()
            .copied()
            .zip(ids.iter())
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        for (degree, entity_id) in ranked.into_iter().take(TOP_DEGREE_ENTITIES) {
            let z = z_score(degree as f64, mean, std_dev);
            state.patterns.push(Pattern {
                pattern_id: format!("central_{}", entity_id),
                category: PatternCategory::HighDegree,
                description: format!("Entity degree {}", degree),
                entities_involved: vec![entity_id.clone()],
                severity: if z > 2.0 { Severity::High } else { Severity::Medium },
                occurrences: 1,
                confidence: (0.5 + 0.1 * degree as f64).min(0.95),
                evidence: vec![entity_id.to_string()],
            });
            if std_dev > 0.0 && z >= outlier_threshold {
                state.anomalies.push(Anomaly {
                    category: "statistical_outlier".to_string(),
                    description: format!("Entity degree {} (z={:.2})", degree, z),
                    severity: if z > 3.0 { Severity::High } else { Severity::Medium },
                    entity: entity_id.to_string(),
                    z_score: (z * 100.0).round() / 100.0,
                });
            }
        }
    }

    fn community_analysis(
        state: &mut InvestigationState,
        graph: &UnGraph<EntityId, f64>,
        ids: &[EntityId],
        min_cluster_size: usize,
    ) {
        let communities = analysis::louvain_communities(graph);
        for (community_id, members) in communities {
            if members.len() < min_cluster_size {
                continue;
            }
            let entity_ids: Vec<EntityId> = members.iter().map(|&i| ids[i].clone()).collect();
            state.patterns.push(Pattern {
                pattern_id: format!("cluster_{}", community_id),
                category: PatternCategory::Community,
                description: format!("Cluster with {} entities", entity_ids.len()),
                entities_involved: entity_ids.iter().take(20).cloned().collect(),
                severity: Severity::Low,
                occurrences: 1,
                confidence: 0.8,
                evidence: entity_ids.iter().take(5).map(|e| e.to_string()).collect(),
            });
        }
    }

    fn temporal_analysis(state: &mut InvestigationState) {
        if state.timeline.len() < 2 {
            return;
        }
        let types: Vec<String> = state.timeline.iter().map(|e| e.event_type.to_string()).collect();
        let mut description = types.iter().take(5).cloned().collect::<Vec<_>>().join(" -> ");
        if types.len() > 5 {
            description.push_str(&format!(" ({} events)", types.len()));
        }
        state.patterns.push(Pattern {
            pattern_id: "temporal_sequence_1".to_string(),
            category: PatternCategory::TemporalSequence,
            description,
            entities_involved: Vec::new(),
            severity: Severity::Medium,
            occurrences: 1,
            confidence: 0.75,
            evidence: types.into_iter().take(5).collect(),
        });
    }

    fn frequency_analysis(state: &mut InvestigationState, outlier_threshold: f64) {
        let mut term_counts: BTreeMap<String, usize> = BTreeMap::new();
        for doc_text in state.extracted_text.values() {
            for word in doc_text.to_lowercase().split_whitespace() {
                if word.chars().count() >= MIN_TERM_LEN {
                    *term_counts.entry(word.to_string()).or_insert(0) += 1;
                }
            }
        }
        if term_counts.is_empty() {
            return;
        }
        let n = term_counts.len() as f64;
        let mean = term_counts.values().sum::<usize>() as f64 / n;
        let variance = term_counts
            .values()
            .map(|&c| (c as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        let std_dev = variance.sqrt();

        let mut ranked: Vec<(&String, &usize)> = term_counts.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (term, &count) in ranked.into_iter().take(TOP_FREQUENT_TERMS) {
            if std_dev > 0.0 {
                let z = z_score(count as f64, mean, std_dev);
                if z >= outlier_threshold {
                    state.outliers.push(term.clone());
                    state.anomalies.push(Anomaly {
                        category: "statistical".to_string(),
                        description: format!("Term '{}' count {} (z={:.2})", term, count, z),
                        severity: if z > 3.0 { Severity::High } else { Severity::Medium },
                        entity: term.clone(),
                        z_score: (z * 100.0).round() / 100.0,
                    });
                }
            }
            let id_stem: String = term.chars().take(20).collect();
            state.patterns.push(Pattern {
                pattern_id: format!("freq_{}", id_stem),
                category: PatternCategory::Frequency,
                description: format!("Term '{}' count {}", term, count),
                entities_involved: Vec::new(),
                severity: Severity::Low,
                occurrences: count,
                confidence: (0.5 + count as f64 / 100.0).min(0.9),
                evidence: vec![term.clone()],
            });
        }
    }
}

#[async_trait]
impl InvestigationStage for PatternRecognitionStage {
    fn name(&self) -> &'static str {
        "pattern_recognition"
    }

    fn step_label(&self) -> &'static str {
        "pattern_recognition"
    }

    async fn run(
        &self,
        state: &mut InvestigationState,
        ctx: &StageContext,
    ) -> Result<(), InvestigationError> {
        let outlier_threshold = ctx.config.outlier_threshold;
        let min_cluster_size = ctx.config.min_cluster_size;

        if !state.entities.is_empty() && !state.relationships.is_empty() {
            let (graph, ids) = Self::build_graph(state);
            Self::degree_analysis(state, &graph, &ids, outlier_threshold);
            Self::community_analysis(state, &graph, &ids, min_cluster_size);
        }
        Self::temporal_analysis(state);
        Self::frequency_analysis(state, outlier_threshold);

        state.current_step = "pattern_recognition_complete".to_string();
        info!(
            "patterns: {}, anomalies: {}",
            state.patterns.len(),
            state.anomalies.len()
        );
        Ok(())
    }
}
