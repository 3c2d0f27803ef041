// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Compliance Gate Stage
//!
//! The publication gate. Three metric computations — drift (ΔE), fidelity,
//! reasoning coherence (RCF) — plus the ethical rule layer, feeding the
//! decision table:
//!
//! | Condition | Verdict |
//! |---|---|
//! | ΔE < 0.05 ∧ fidelity ≥ 0.99 ∧ RCF ≥ 0.95 | VALID |
//! | ΔE < 0.10 ∧ fidelity ≥ 0.95 | NEEDS_REVIEW |
//! | otherwise | BLOCKED |
//!
//! A BLOCKED from the rule layer overrides everything; a NEEDS_REVIEW from
//! it downgrades a metric-VALID verdict. Any internal failure in this stage
//! resolves to NEEDS_REVIEW with zeroed metrics and the error as the
//! recommendation — the gate never leaves a run without a verdict.

use crate::application::stages::{InvestigationStage, StageContext};
use async_trait::async_trait;
use inquest_domain::aggregates::InvestigationState;
use inquest_domain::entities::{ComplianceStatus, OdosViolation, Severity};
use inquest_domain::error::InvestigationError;
use inquest_domain::services::capabilities::NarrativeGenerator;
use inquest_domain::value_objects::{DocumentId, EntityId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Entities cited by this many hypotheses trigger the bias check.
const BIAS_HYPOTHESIS_COUNT: usize = 3;
/// Minimum distinct supporting documents to clear the bias check.
const BIAS_MIN_DISTINCT_DOCS: usize = 2;

/// Outcome of the ethical rule layer.
struct OdosOutcome {
    status: ComplianceStatus,
    message: String,
    violations: Vec<OdosViolation>,
}

/// Stage 10: the compliance gate.
pub struct ComplianceGateStage;

impl ComplianceGateStage {
    /// Ethical rules: critical PII blocks immediately; a finding citing an
    /// entity with neither relationship evidence nor supporting documents
    /// needs review; otherwise valid.
    fn run_odos_rules(state: &InvestigationState) -> OdosOutcome {
        if state.compliance_report.pii_critical {
            return OdosOutcome {
                status: ComplianceStatus::Blocked,
                message: "PII critical: review required".to_string(),
                violations: vec![OdosViolation {
                    violation_type: "pii_exposure".to_string(),
                    count: 1,
                    severity: Severity::Critical,
                    message: "Critical PII present in compliance report".to_string(),
                }],
            };
        }
        if state.hypotheses.is_empty() && state.leads.is_empty() {
            return OdosOutcome {
                status: ComplianceStatus::Valid,
                message: "No findings to validate".to_string(),
                violations: Vec::new(),
            };
        }

        let mut entity_to_docs: BTreeMap<&EntityId, BTreeSet<&DocumentId>> = BTreeMap::new();
        for relationship in &state.relationships {
            for entity_id in [relationship.source_entity_id(), relationship.target_entity_id()] {
                entity_to_docs
                    .entry(entity_id)
                    .or_default()
                    .extend(relationship.evidence_doc_ids().iter());
            }
        }

        for hypothesis in &state.hypotheses {
            for entity_id in &hypothesis.entities_involved {
                let backed = entity_to_docs
                    .get(entity_id)
                    .is_some_and(|docs| !docs.is_empty());
                if !backed && hypothesis.doc_ids_supporting.is_empty() {
                    return OdosOutcome {
                        status: ComplianceStatus::NeedsReview,
                        message: format!(
                            "Entity {} in findings without evidence in relationships or documents",
                            entity_id
                        ),
                        violations: vec![OdosViolation {
                            violation_type: "unbacked_entity".to_string(),
                            count: 1,
                            severity: Severity::Medium,
                            message: format!("Entity {} lacks evidence backing", entity_id),
                        }],
                    };
                }
            }
        }

        OdosOutcome {
            status: ComplianceStatus::Valid,
            message: "Rule validation passed".to_string(),
            violations: Vec::new(),
        }
    }

    /// ΔE: contradictions normalized by links, raised by hypothesis
    /// confidence variance; plus confirmation-bias alerts.
    fn guardian_check(state: &InvestigationState) -> (f64, Vec<String>) {
        let links = state.semantic_links.len().max(1);
        let mut delta_e = (state.contradictions.len() as f64 / links as f64).min(1.0);

        let confidences: Vec<f64> = state.hypotheses.iter().map(|h| h.confidence()).collect();
        if confidences.len() >= 2 {
            let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
            let variance = confidences.iter().map(|c| (c - mean).powi(2)).sum::<f64>()
                / (confidences.len() - 1) as f64;
            delta_e = delta_e.max((2.0 * variance).min(1.0));
        }

        let mut bias_alerts = Vec::new();
        if !state.hypotheses.is_empty() {
            let mut entity_counts: BTreeMap<&EntityId, usize> = BTreeMap::new();
            for hypothesis in &state.hypotheses {
                for entity_id in &hypothesis.entities_involved {
                    *entity_counts.entry(entity_id).or_insert(0) += 1;
                }
            }
            let distinct_docs: BTreeSet<&DocumentId> = state
                .hypotheses
                .iter()
                .flat_map(|h| h.doc_ids_supporting.iter())
                .collect();
            for (entity_id, count) in entity_counts {
                if count >= BIAS_HYPOTHESIS_COUNT && distinct_docs.len() < BIAS_MIN_DISTINCT_DOCS {
                    bias_alerts.push(format!(
                        "Possible confirmation bias: entity {} in {} hypotheses with few distinct docs",
                        entity_id, count
                    ));
                }
            }
        }
        (delta_e, bias_alerts)
    }

    /// Fidelity: mean confidence of entities cited by hypotheses; without
    /// hypotheses, the decode rate of encrypted segments; else 0.99.
    fn compute_fidelity(state: &InvestigationState) -> f64 {
        if state.hypotheses.is_empty() {
            if !state.encrypted_segments.is_empty() {
                return state.decrypted_content.len() as f64 / state.encrypted_segments.len() as f64;
            }
            return 0.99;
        }
        let cited: BTreeSet<&EntityId> = state
            .hypotheses
            .iter()
            .flat_map(|h| h.entities_involved.iter())
            .collect();
        let confidences: Vec<f64> = cited
            .iter()
            .filter_map(|id| state.entities.get(*id).map(|e| e.confidence))
            .collect();
        if confidences.is_empty() {
            0.99
        } else {
            confidences.iter().sum::<f64>() / confidences.len() as f64
        }
    }

    /// RCF: one minus the normalized contradiction rate, once there are at
    /// least two hypotheses to cohere.
    fn compute_rcf(state: &InvestigationState) -> f64 {
        if state.hypotheses.len() < 2 {
            return 0.95;
        }
        let links = state.semantic_links.len().max(1);
        let rate = (state.contradictions.len() as f64 / links as f64).min(1.0);
        (1.0 - rate).clamp(0.0, 1.0)
    }

    async fn evaluate(
        state: &mut InvestigationState,
        ctx: &StageContext,
    ) -> Result<(), InvestigationError> {
        let thresholds = &ctx.config.compliance;

        let odos = Self::run_odos_rules(state);
        let (delta_e, bias_alerts) = Self::guardian_check(state);
        let fidelity = Self::compute_fidelity(state);
        let rcf = Self::compute_rcf(state);

        state.delta_e = delta_e;
        state.fidelity = fidelity;
        state.rcf = rcf;
        state.compliance_report.delta_e = delta_e;
        state.compliance_report.fidelity = fidelity;
        state.compliance_report.rcf = rcf;
        state.compliance_report.bias_alerts = bias_alerts;
        state.compliance_report.violations = odos.violations;

        let final_status = if odos.status == ComplianceStatus::Blocked {
            state.compliance_report.recommendations =
                vec!["Resolve critical rule violations (e.g. PII) before publishing.".to_string()];
            ComplianceStatus::Blocked
        } else {
            let mut status = if delta_e < thresholds.max_delta_e_valid
                && fidelity >= thresholds.min_fidelity_valid
                && rcf >= thresholds.min_rcf
            {
                state.compliance_report.recommendations = Vec::new();
                ComplianceStatus::Valid
            } else if delta_e < thresholds.max_delta_e_review
                && fidelity >= thresholds.min_fidelity_review
            {
                state.compliance_report.recommendations =
                    vec!["Human review recommended: delta_e or fidelity near threshold.".to_string()];
                ComplianceStatus::NeedsReview
            } else {
                state.compliance_report.recommendations = vec![
                    format!(
                        "Delta-E {:.3} or fidelity {:.3} below threshold.",
                        delta_e, fidelity
                    ),
                    "Improve evidence backing or reduce contradictions before publishing."
                        .to_string(),
                ];
                ComplianceStatus::Blocked
            };
            // A rule-layer NEEDS_REVIEW downgrades a metric VALID
            if odos.status == ComplianceStatus::NeedsReview && status == ComplianceStatus::Valid {
                status = ComplianceStatus::NeedsReview;
                state
                    .compliance_report
                    .recommendations
                    .insert(0, odos.message.clone());
            }
            status
        };

        state.odos_status = Some(final_status);
        state.compliance_report.overall_status = Some(final_status);

        if ctx.narrative.probe() {
            let violations_summary = state
                .compliance_report
                .violations
                .iter()
                .map(|v| format!("{}({})", v.violation_type, v.count))
                .collect::<Vec<_>>()
                .join("; ");
            let prompt = format!(
                "In two or three sentences, summarize the compliance verdict: violations={}, \
                 fidelity={:.2}, rcf={:.2}, delta_e={:.3}, status={}. Neutral, executive tone.",
                if violations_summary.is_empty() { "none" } else { &violations_summary },
                fidelity,
                rcf,
                delta_e,
                final_status,
            );
            match ctx.narrative.summarize(&prompt).await {
                Ok(Some(narrative)) => state.compliance_report.narrative = Some(narrative),
                Ok(None) => {}
                Err(e) => warn!("compliance narrative skipped: {}", e),
            }
        }

        info!(
            "gate: status={}, delta_e={:.3}, fidelity={:.3}, rcf={:.3}",
            final_status, delta_e, fidelity, rcf
        );
        Ok(())
    }
}

#[async_trait]
impl InvestigationStage for ComplianceGateStage {
    fn name(&self) -> &'static str {
        "odos_guardian"
    }

    fn step_label(&self) -> &'static str {
        "odos_guardian"
    }

    async fn run(
        &self,
        state: &mut InvestigationState,
        ctx: &StageContext,
    ) -> Result<(), InvestigationError> {
        if let Err(e) = Self::evaluate(state, ctx).await {
            // The gate always yields a verdict: internal failure resolves to
            // NEEDS_REVIEW with zeroed metrics
            state.delta_e = 0.0;
            state.fidelity = 0.0;
            state.rcf = 0.0;
            state.compliance_report.delta_e = 0.0;
            state.compliance_report.fidelity = 0.0;
            state.compliance_report.rcf = 0.0;
            state.compliance_report.overall_status = Some(ComplianceStatus::NeedsReview);
            state.compliance_report.recommendations = vec![e.to_string()];
            state.odos_status = Some(ComplianceStatus::NeedsReview);
            state.record_error(format!("Compliance gate error: {}", e));
        }
        state.current_step = "odos_guardian_complete".to_string();
        Ok(())
    }
}
