// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Orchestrator
//!
//! Owns the registry of the ten named stages and drives them in topological
//! order over one mutable [`InvestigationState`]. Stages never call each
//! other; all coupling is through the state.
//!
//! Responsibilities, in stage order:
//!
//! - cancellation check between stages (partial state preserved, ledger
//!   untouched);
//! - human-in-the-loop interruption **before** the compliance gate when
//!   enabled and a checkpoint backend exists — `resume(thread_id)`
//!   continues from the checkpoint;
//! - activity start/end/error emission when constructed `monitored`;
//! - stage error capture into `error_log` (the pipeline always advances);
//! - a durable checkpoint after every stage when a backend is configured;
//! - terminal routing on the gate's verdict (report / refinement / blocked);
//! - memory consolidation after a completed gate.

use crate::application::stages::{
    classification::ClassificationStage, compliance_gate::ComplianceGateStage,
    cryptanalysis::CryptanalysisStage, entity_extraction::EntityExtractionStage,
    graph_builder::GraphBuilderStage, ingestion::IngestionStage,
    pattern_recognition::PatternRecognitionStage, semantic_linker::SemanticLinkerStage,
    synthesis::SynthesisStage, timeline::TimelineStage, InvestigationStage, StageContext,
};
use inquest_bootstrap::shutdown::CancellationToken;
use inquest_domain::aggregates::{InvestigationState, RunConfig};
use inquest_domain::error::InvestigationError;
use inquest_domain::events::ActivityStep;
use inquest_domain::repositories::CheckpointStore;
use inquest_domain::value_objects::InvestigationId;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

const GATE_STAGE: &str = "odos_guardian";
const GATE_COMPLETE_STEP: &str = "odos_guardian_complete";

/// Terminal category of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Gate verdict VALID: the report may be published.
    Report,
    /// Gate verdict NEEDS_REVIEW: human refinement required.
    Refinement,
    /// Gate verdict BLOCKED.
    Blocked,
    /// Suspended before the gate for human review; resumable.
    Interrupted,
    /// Cancelled between stages; partial state persisted.
    Cancelled,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Refinement => "refinement",
            Self::Blocked => "blocked",
            Self::Interrupted => "interrupted",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Result of `run`/`resume`: the terminal category, the thread id (needed to
/// resume an interrupted run), and the final state.
pub struct RunResult {
    pub outcome: RunOutcome,
    pub thread_id: String,
    pub state: InvestigationState,
}

/// The ten-stage investigation pipeline.
pub struct InvestigationPipeline {
    ctx: Arc<StageContext>,
    stages: Vec<Box<dyn InvestigationStage>>,
    checkpoints: Option<Arc<dyn CheckpointStore>>,
    monitored: bool,
    cancellation: CancellationToken,
}

impl InvestigationPipeline {
    /// Builds the pipeline with its fixed node registry. `monitored` wires
    /// activity emission around every stage.
    pub fn new(
        ctx: Arc<StageContext>,
        checkpoints: Option<Arc<dyn CheckpointStore>>,
        monitored: bool,
        cancellation: CancellationToken,
    ) -> Self {
        let stages: Vec<Box<dyn InvestigationStage>> = vec![
            Box::new(IngestionStage),
            Box::new(ClassificationStage),
            Box::new(EntityExtractionStage),
            Box::new(CryptanalysisStage),
            Box::new(SemanticLinkerStage),
            Box::new(TimelineStage),
            Box::new(PatternRecognitionStage),
            Box::new(GraphBuilderStage),
            Box::new(SynthesisStage),
            Box::new(ComplianceGateStage),
        ];
        Self {
            ctx,
            stages,
            checkpoints,
            monitored,
            cancellation,
        }
    }

    /// Node names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Starts a fresh run. The thread id doubles as the investigation id;
    /// a generated one is used when the caller does not provide it.
    pub async fn run(
        &self,
        uploads_path: Option<String>,
        thread_id: Option<String>,
    ) -> Result<RunResult, InvestigationError> {
        let investigation_id = match thread_id {
            Some(id) => InvestigationId::from_string(id),
            None => InvestigationId::new(),
        };
        let state = InvestigationState::new(RunConfig {
            uploads_path,
            investigation_id: Some(investigation_id.clone()),
        });
        info!("starting investigation {}", investigation_id);
        self.execute(state, investigation_id.as_str().to_string(), 0, true)
            .await
    }

    /// Resumes a checkpointed thread from the stage after its recorded
    /// progress. The gate interrupt does not re-fire on resume.
    pub async fn resume(&self, thread_id: &str) -> Result<RunResult, InvestigationError> {
        let Some(checkpoints) = &self.checkpoints else {
            return Err(InvestigationError::invalid_config(
                "resume requires a configured checkpoint backend",
            ));
        };
        let Some(state) = checkpoints.load(thread_id).await? else {
            return Err(InvestigationError::InvestigationNotFound(thread_id.to_string()));
        };
        let start = self.resume_index(&state.current_step);
        info!(
            "resuming thread {} from stage index {} (step {})",
            thread_id, start, state.current_step
        );
        self.execute(state, thread_id.to_string(), start, false).await
    }

    /// Index of the first stage still to run for a recorded `current_step`
    /// (`<label>_complete` and `<label>_partial` both count as done).
    fn resume_index(&self, current_step: &str) -> usize {
        for (i, stage) in self.stages.iter().enumerate().rev() {
            if current_step.starts_with(stage.step_label()) {
                return i + 1;
            }
        }
        0
    }

    fn emit(&self, agent: &str, step: ActivityStep, state: &InvestigationState, error: Option<&str>) {
        if !self.monitored {
            return;
        }
        let investigation_id = state.investigation_id().map(|id| id.to_string());
        let mut payload: Vec<(&str, serde_json::Value)> =
            vec![("docs", serde_json::json!(state.documents.len()))];
        if let Some(message) = error {
            payload.push(("error", serde_json::json!(message)));
        }
        self.ctx.activity.emit_step(agent, step, investigation_id, &payload);
    }

    async fn execute(
        &self,
        mut state: InvestigationState,
        thread_id: String,
        start_index: usize,
        allow_interrupt: bool,
    ) -> Result<RunResult, InvestigationError> {
        self.ctx.metrics.investigation_started();

        for (index, stage) in self.stages.iter().enumerate() {
            if index < start_index {
                continue;
            }
            if self.cancellation.is_cancelled() {
                warn!("run cancelled before stage {}", stage.name());
                if let Some(checkpoints) = &self.checkpoints {
                    if let Err(e) = checkpoints.save(&thread_id, &mut state).await {
                        warn!("cancel checkpoint failed: {}", e);
                    }
                }
                self.ctx.metrics.investigation_finished("cancelled");
                return Ok(RunResult {
                    outcome: RunOutcome::Cancelled,
                    thread_id,
                    state,
                });
            }

            if stage.name() == GATE_STAGE
                && allow_interrupt
                && self.ctx.config.interrupt_before_gate
            {
                if let Some(checkpoints) = &self.checkpoints {
                    checkpoints.save(&thread_id, &mut state).await?;
                    info!("interrupted before compliance gate; resume with thread {}", thread_id);
                    self.ctx.metrics.investigation_finished("interrupted");
                    return Ok(RunResult {
                        outcome: RunOutcome::Interrupted,
                        thread_id,
                        state,
                    });
                }
                // Interrupting without a checkpoint backend would strand the
                // run, so the gate proceeds
                warn!("interrupt_before_gate set but no checkpoint backend; continuing");
            }

            self.emit(stage.name(), ActivityStep::Start, &state, None);
            let started = Instant::now();
            match stage.run(&mut state, &self.ctx).await {
                Ok(()) => {
                    self.emit(stage.name(), ActivityStep::End, &state, None);
                }
                Err(e) => {
                    warn!("stage {} failed: {}", stage.name(), e);
                    state.record_error(format!("{} error: {}", stage.name(), e));
                    state.current_step = format!("{}_partial", stage.step_label());
                    self.ctx.metrics.record_stage_error(stage.name());
                    self.emit(stage.name(), ActivityStep::Error, &state, Some(&e.to_string()));
                }
            }
            self.ctx
                .metrics
                .observe_stage_duration(stage.name(), started.elapsed().as_secs_f64());

            if let Some(checkpoints) = &self.checkpoints {
                if let Err(e) = checkpoints.save(&thread_id, &mut state).await {
                    warn!("checkpoint save failed after {}: {}", stage.name(), e);
                }
            }
        }

        let outcome = Self::route(&state);

        if state.current_step == GATE_COMPLETE_STEP {
            if let Err(e) = self.ctx.memory.consolidate(&thread_id, &state) {
                warn!("memory consolidation failed: {}", e);
            }
            if let Err(e) = self.ctx.memory.episodic().record(
                "orchestrator",
                &thread_id,
                &format!("investigation finished: {}", outcome.as_str()),
                "",
                outcome == RunOutcome::Report,
                None,
            ) {
                warn!("episode record failed: {}", e);
            }
        }

        self.ctx.metrics.investigation_finished(outcome.as_str());
        info!("investigation {} finished: {}", thread_id, outcome.as_str());
        Ok(RunResult {
            outcome,
            thread_id,
            state,
        })
    }

    /// Terminal branching on the gate's verdict. A run that reached the end
    /// without a verdict (gate errored into review, or was skipped) routes
    /// to refinement.
    fn route(state: &InvestigationState) -> RunOutcome {
        use inquest_domain::entities::ComplianceStatus;
        match state.odos_status {
            Some(ComplianceStatus::Valid) => RunOutcome::Report,
            Some(ComplianceStatus::Blocked) => RunOutcome::Blocked,
            _ => RunOutcome::Refinement,
        }
    }
}
