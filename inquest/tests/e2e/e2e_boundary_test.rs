// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Boundary behaviors: single documents, unsupported and oversized files,
//! classification of high-priority markers, description attachments.

use crate::common::{test_config, test_engine};
use inquest::application::InvestigationPipeline;
use inquest::infrastructure::composition::build_context;
use inquest_bootstrap::shutdown::CancellationToken;
use inquest_domain::entities::{DocType, Relevance};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn single_document_yields_no_links_or_contradictions() {
    let engine = test_engine(false).await;
    engine.write_upload(
        "unico.txt",
        "Relatório único com datas 15/01/2024 e entidades como Maria Santos.".as_bytes(),
    );
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();

    assert_eq!(result.state.documents.len(), 1);
    assert!(result.state.semantic_links.is_empty());
    assert!(result.state.contradictions.is_empty());
    assert!(result.state.narrative_threads.is_empty());
}

#[tokio::test]
async fn unsupported_extension_is_ignored() {
    let engine = test_engine(false).await;
    engine.write_upload("binario.exe", b"MZ not a document");
    engine.write_upload("texto.txt", b"um documento de verdade entre os arquivos");
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();

    assert_eq!(result.state.documents.len(), 1);
    assert_eq!(result.state.documents.values().next().unwrap().filename, "texto.txt");
}

#[tokio::test]
async fn oversized_files_are_skipped() {
    let root = TempDir::new().unwrap();
    let mut config = test_config(&root, false);
    config.max_file_size_mb = 0; // everything is too large
    let config = Arc::new(config);
    let ctx = Arc::new(build_context(Arc::clone(&config)).await.unwrap());
    std::fs::create_dir_all(&config.uploads_dir).unwrap();
    std::fs::write(config.uploads_dir.join("grande.txt"), b"some bytes").unwrap();

    let pipeline =
        InvestigationPipeline::new(Arc::clone(&ctx), None, false, CancellationToken::detached());
    let result = pipeline
        .run(Some(config.uploads_dir.display().to_string()), None)
        .await
        .unwrap();
    assert!(result.state.documents.is_empty());
}

#[tokio::test]
async fn confidential_reference_document_classifies_critical() {
    let engine = test_engine(false).await;
    let body = format!(
        "Documento confidencial sobre o processo. Detalhes conforme anexo X citado. {}",
        "palavra ".repeat(60)
    );
    engine.write_upload("sigiloso.txt", body.as_bytes());
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();

    let classification = result.state.classifications.values().next().unwrap();
    assert!(classification.priority_score() >= 0.85);
    assert!(classification
        .priority_reasons
        .contains(&"contains_keyword_confidencial".to_string()));
    assert!(classification
        .priority_reasons
        .contains(&"references_other_docs".to_string()));
    assert_eq!(classification.estimated_relevance(), Relevance::Critical);
    // The document record carries the same score
    let document = result.state.documents.values().next().unwrap();
    assert_eq!(document.priority_score, Some(classification.priority_score()));
}

#[tokio::test]
async fn fragment_documents_classify_low_priority() {
    let engine = test_engine(false).await;
    engine.write_upload("curto.txt", b"apenas tres palavras");
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();

    let classification = result.state.classifications.values().next().unwrap();
    assert_eq!(classification.document_type, DocType::Fragment);
    assert_eq!(classification.priority_score(), 0.3);
}

#[tokio::test]
async fn descriptions_json_attaches_to_document_metadata() {
    let engine = test_engine(false).await;
    engine.write_upload("nota.txt", b"uma nota relevante para a descricao anexada");
    engine.write_upload(
        "descriptions.json",
        br#"{"nota.txt": "Entregue pela fonte confidencial"}"#,
    );
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();

    // descriptions.json itself is never ingested
    assert_eq!(result.state.documents.len(), 1);
    let document = result.state.documents.values().next().unwrap();
    assert_eq!(
        document.metadata.get("user_description").map(String::as_str),
        Some("Entregue pela fonte confidencial")
    );
}

#[tokio::test]
async fn state_round_trips_through_serialization() {
    let engine = test_engine(false).await;
    engine.write_upload(
        "doc.txt",
        "Contrato entre Maria Santos e TechCorp assinado em 15/01/2024.".as_bytes(),
    );
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();

    let json = serde_json::to_string(&result.state).unwrap();
    let back: inquest_domain::aggregates::InvestigationState = serde_json::from_str(&json).unwrap();
    assert_eq!(back.documents.len(), result.state.documents.len());
    assert_eq!(back.entities.len(), result.state.entities.len());
    assert_eq!(back.current_step, result.state.current_step);
    assert_eq!(back.version, result.state.version);
    assert_eq!(
        back.timeline.first().map(|e| e.timestamp),
        result.state.timeline.first().map(|e| e.timestamp)
    );
}
