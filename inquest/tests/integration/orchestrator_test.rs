// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Orchestrator behavior: stage registration, activity emission, error
//! capture, interruption before the gate, resume, cancellation, and memory
//! consolidation after a completed run.

use crate::common::test_engine;
use inquest::application::RunOutcome;
use inquest_bootstrap::shutdown::CancellationToken;
use inquest_domain::entities::ComplianceStatus;

#[tokio::test]
async fn pipeline_registers_ten_stages_in_order() {
    let engine = test_engine(false).await;
    let pipeline = engine.pipeline(false);
    assert_eq!(
        pipeline.stage_names(),
        vec![
            "ingest_documents",
            "classify_documents",
            "extract_entities",
            "cryptanalysis_hunter",
            "semantic_linker",
            "timeline",
            "pattern_recognition",
            "build_knowledge_graph",
            "synthesis",
            "odos_guardian",
        ]
    );
}

#[tokio::test]
async fn missing_uploads_directory_is_recorded_not_fatal() {
    let engine = test_engine(false).await;
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some("/nonexistent/uploads".to_string()), None)
        .await
        .unwrap();
    assert!(result
        .state
        .error_log
        .iter()
        .any(|e| e.contains("Upload dir not found")));
    // The run still terminates through the gate
    assert!(result.state.gate_ran());
}

#[tokio::test]
async fn monitored_run_emits_start_and_end_events() {
    let engine = test_engine(false).await;
    engine.write_upload("a.txt", b"um texto qualquer para o teste de atividade");
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();

    let events = engine.ctx.activity.recent(100, Some(&result.thread_id));
    assert!(!events.is_empty());
    assert!(events.iter().any(|e| e.agent == "ingest_documents"));
    assert!(events.iter().any(|e| e.agent == "odos_guardian"));
}

#[tokio::test]
async fn interrupt_before_gate_then_resume_completes() {
    let engine = test_engine(true).await;
    engine.write_upload("a.txt", b"conteudo simples para interrupcao e retomada");
    let pipeline = engine.pipeline(true);

    let first = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();
    assert_eq!(first.outcome, RunOutcome::Interrupted);
    assert!(!first.state.gate_ran());
    assert_eq!(first.state.current_step, "synthesis_complete");

    let resumed = pipeline.resume(&first.thread_id).await.unwrap();
    assert!(resumed.state.gate_ran());
    assert_eq!(resumed.state.current_step, "odos_guardian_complete");
    assert_ne!(resumed.outcome, RunOutcome::Interrupted);
}

#[tokio::test]
async fn resume_without_backend_is_a_config_error() {
    let engine = test_engine(false).await;
    let pipeline = engine.pipeline(false);
    assert!(pipeline.resume("thread-x").await.is_err());
}

#[tokio::test]
async fn cancelled_token_stops_the_run_and_preserves_state() {
    let engine = test_engine(true).await;
    engine.write_upload("a.txt", b"documento que nunca sera processado");
    let token = CancellationToken::detached();
    token.cancel();
    let pipeline = engine.pipeline_with_token(token);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();
    assert_eq!(result.outcome, RunOutcome::Cancelled);
    assert!(!result.state.gate_ran());
    assert!(result.state.documents.is_empty());
}

#[tokio::test]
async fn completed_run_consolidates_memory() {
    let engine = test_engine(false).await;
    std::fs::create_dir_all(engine.uploads()).unwrap();
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();
    assert_eq!(result.state.current_step, "odos_guardian_complete");

    let history = engine.ctx.memory.ltm().get_investigation_history(10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["investigation_id"], result.thread_id.as_str());
}

#[tokio::test]
async fn empty_corpus_terminates_valid() {
    let engine = test_engine(false).await;
    std::fs::create_dir_all(engine.uploads()).unwrap();
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();

    assert_eq!(result.state.odos_status, Some(ComplianceStatus::Valid));
    assert_eq!(result.outcome, RunOutcome::Report);
    assert!(result.state.entities.is_empty());
    assert!(result.state.semantic_links.is_empty());
    assert!(result.state.hypotheses.is_empty());
}
