// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Synthesis Stage
//!
//! Aggregates patterns, centrality, timeline and links into investigative
//! output: up to five hypotheses (from top patterns, else from the most
//! central entities), actionable leads, a markdown narrative summary, and
//! the persisted report artifacts.

use crate::application::stages::{InvestigationStage, StageContext};
use async_trait::async_trait;
use inquest_domain::aggregates::InvestigationState;
use inquest_domain::entities::{Hypothesis, Lead, LeadPriority};
use inquest_domain::error::InvestigationError;
use inquest_domain::services::text;
use inquest_domain::value_objects::EntityId;
use tracing::{info, warn};

const MAX_HYPOTHESES: usize = 5;
const REPORT_TOP_ITEMS: usize = 10;

/// Stage 9: intelligence synthesis.
pub struct SynthesisStage;

impl SynthesisStage {
    fn hypotheses_from_patterns(state: &InvestigationState) -> Vec<Hypothesis> {
        state
            .patterns
            .iter()
            .take(MAX_HYPOTHESES)
            .enumerate()
            .map(|(i, pattern)| {
                let evidence = if pattern.evidence.is_empty() {
                    pattern.entities_involved.iter().map(|e| e.to_string()).collect()
                } else {
                    pattern.evidence.clone()
                };
                Hypothesis::new(
                    format!("H{}", i + 1),
                    Some(text::truncate(&pattern.description, 80)),
                    pattern.description.clone(),
                    pattern.confidence,
                )
                .with_evidence(evidence)
                .with_entities(pattern.entities_involved.clone())
            })
            .collect()
    }

    fn hypotheses_from_centrality(state: &InvestigationState) -> Vec<Hypothesis> {
        let mut ranked: Vec<(&EntityId, f64)> = state
            .centrality_scores
            .iter()
            .map(|(id, &score)| (id, score))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        ranked
            .into_iter()
            .take(MAX_HYPOTHESES)
            .enumerate()
            .map(|(i, (entity_id, score))| {
                let name = state
                    .entities
                    .get(entity_id)
                    .map(|e| e.text.clone())
                    .unwrap_or_else(|| entity_id.to_string());
                Hypothesis::new(
                    format!("H{}", i + 1),
                    Some(text::truncate(&format!("Central entity: {}", name), 80)),
                    format!("Entity '{}' is central (score {:.3})", name, score),
                    (score * 2.0).min(1.0),
                )
                .with_entities(vec![entity_id.clone()])
                .with_next_steps(vec!["Review documents mentioning this entity".to_string()])
            })
            .collect()
    }

    fn build_leads(state: &InvestigationState) -> Vec<Lead> {
        let mut leads = state.leads.clone();
        if leads.is_empty() && !state.timeline.is_empty() {
            leads.push(Lead {
                lead_id: "L1".to_string(),
                action: "Review chronological events".to_string(),
                priority: LeadPriority::High,
                justification: format!("{} timeline events", state.timeline.len()),
            });
        }
        if !state.semantic_links.is_empty()
            && !leads.iter().any(|l| l.action.contains("linked documents"))
        {
            leads.push(Lead {
                lead_id: format!("L{}", leads.len() + 1),
                action: "Review linked documents".to_string(),
                priority: LeadPriority::Medium,
                justification: format!("{} semantic links", state.semantic_links.len()),
            });
        }
        leads
    }

    fn build_report_summary(state: &InvestigationState) -> String {
        let mut parts: Vec<String> = Vec::new();

        parts.push("## Executive Summary".to_string());
        parts.push(format!(
            "This investigation processed {} documents, extracting {} entities and {} relationships.",
            state.documents.len(),
            state.entities.len(),
            state.relationships.len()
        ));
        if !state.timeline.is_empty() {
            parts.push(format!("Timeline: {} events reconstructed.", state.timeline.len()));
        }
        parts.push(String::new());

        parts.push("## Key Findings".to_string());
        if state.patterns.is_empty() {
            parts.push("- No structured patterns identified; see hypotheses and leads.".to_string());
        } else {
            for pattern in state.patterns.iter().take(5) {
                parts.push(format!("- {}", text::truncate(&pattern.description, 200)));
            }
        }
        parts.push(String::new());

        parts.push("## Hypotheses (confidence-ranked)".to_string());
        let mut ranked = state.hypotheses.clone();
        ranked.sort_by(|a, b| {
            b.confidence()
                .partial_cmp(&a.confidence())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for hypothesis in ranked.iter().take(REPORT_TOP_ITEMS) {
            parts.push(format!(
                "- [{}] {} (confidence: {:.2})",
                hypothesis.hypothesis_id,
                text::truncate(&hypothesis.title, 100),
                hypothesis.confidence()
            ));
        }
        parts.push(String::new());

        parts.push("## Actionable Leads".to_string());
        for lead in state.leads.iter().take(REPORT_TOP_ITEMS) {
            let justification = if lead.justification.is_empty() {
                String::new()
            } else {
                format!(" — {}", text::truncate(&lead.justification, 80))
            };
            parts.push(format!(
                "- [{}] {}{}",
                lead.priority,
                text::truncate(&lead.action, 120),
                justification
            ));
        }
        parts.push(String::new());

        if !state.timeline.is_empty() {
            parts.push("## Timeline (summary)".to_string());
            parts.push(format!(
                "{} events; review full timeline for chronology.",
                state.timeline.len()
            ));
        }
        if state.graph_metadata.node_count > 0 || state.graph_metadata.edge_count > 0 {
            parts.push("## Network".to_string());
            parts.push(format!(
                "Graph: {} nodes, {} edges.",
                state.graph_metadata.node_count, state.graph_metadata.edge_count
            ));
        }
        parts.join("\n")
    }
}

#[async_trait]
impl InvestigationStage for SynthesisStage {
    fn name(&self) -> &'static str {
        "synthesis"
    }

    fn step_label(&self) -> &'static str {
        "synthesis"
    }

    async fn run(
        &self,
        state: &mut InvestigationState,
        ctx: &StageContext,
    ) -> Result<(), InvestigationError> {
        if state.hypotheses.is_empty() && !state.patterns.is_empty() {
            state.hypotheses = Self::hypotheses_from_patterns(state);
        }
        if state.hypotheses.is_empty() && !state.centrality_scores.is_empty() {
            state.hypotheses = Self::hypotheses_from_centrality(state);
        }
        state.leads = Self::build_leads(state);
        state.report_summary = Some(Self::build_report_summary(state));

        if let Err(e) = ctx.reports.write(state) {
            warn!("report write failed: {}", e);
        }

        state.current_step = "synthesis_complete".to_string();
        info!(
            "hypotheses: {}, leads: {}",
            state.hypotheses.len(),
            state.leads.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inquest_domain::entities::{Pattern, PatternCategory, Severity};

    fn pattern(description: &str, confidence: f64) -> Pattern {
        Pattern {
            pattern_id: "p".to_string(),
            category: PatternCategory::Frequency,
            description: description.to_string(),
            entities_involved: vec![],
            severity: Severity::Low,
            occurrences: 1,
            confidence,
            evidence: vec!["term".to_string()],
        }
    }

    #[test]
    fn hypotheses_derive_from_top_patterns() {
        let mut state = InvestigationState::default();
        for i in 0..8 {
            state.patterns.push(pattern(&format!("pattern {}", i), 0.7));
        }
        let hypotheses = SynthesisStage::hypotheses_from_patterns(&state);
        assert_eq!(hypotheses.len(), MAX_HYPOTHESES);
        assert_eq!(hypotheses[0].hypothesis_id, "H1");
        assert_eq!(hypotheses[0].confidence(), 0.7);
    }

    #[test]
    fn centrality_hypotheses_scale_confidence() {
        let mut state = InvestigationState::default();
        let id = EntityId::new();
        state.centrality_scores.insert(id, 0.3);
        let hypotheses = SynthesisStage::hypotheses_from_centrality(&state);
        assert_eq!(hypotheses.len(), 1);
        assert!((hypotheses[0].confidence() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn leads_follow_timeline_and_links() {
        let mut state = InvestigationState::default();
        assert!(SynthesisStage::build_leads(&state).is_empty());

        state.timeline.push(inquest_domain::entities::TimelineEvent {
            event_id: "ev".to_string(),
            timestamp: None,
            timestamp_confidence: 0.85,
            description: String::new(),
            entities_involved: vec![],
            source_doc_ids: vec![],
            date: None,
            event_type: inquest_domain::entities::EventType::Event,
        });
        let leads = SynthesisStage::build_leads(&state);
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].priority, LeadPriority::High);
    }

    #[test]
    fn report_summary_has_required_sections() {
        let mut state = InvestigationState::default();
        state.patterns.push(pattern("something recurrent", 0.8));
        state.hypotheses = SynthesisStage::hypotheses_from_patterns(&state);
        let summary = SynthesisStage::build_report_summary(&state);
        assert!(summary.contains("## Executive Summary"));
        assert!(summary.contains("## Key Findings"));
        assert!(summary.contains("## Hypotheses"));
        assert!(summary.contains("## Actionable Leads"));
    }
}
