// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Full-pipeline run over a small Portuguese corpus: documents, entities,
//! relationships, semantic links, timeline and the gate, end to end.

use crate::common::test_engine;
use inquest_domain::entities::{EntityType, ExtractionStatus};

const DOC_MEETING: &str =
    "Reunião entre João Silva e Maria Santos. Data: 15/01/2024. TechCorp. joao@tech.com.";
const DOC_CONTRACT: &str =
    "Contrato TechCorp e InnovaTech. Maria Santos. 20/01/2024. R$ 500.000.";

#[tokio::test]
async fn two_document_corpus_links_and_relates() {
    let engine = test_engine(false).await;
    engine.write_upload("reuniao.txt", DOC_MEETING.as_bytes());
    engine.write_upload("contrato.txt", DOC_CONTRACT.as_bytes());
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();
    let state = &result.state;

    // Both documents ingested with usable text
    assert_eq!(state.documents.len(), 2);
    assert!(state
        .documents
        .values()
        .all(|d| d.status == ExtractionStatus::Success));

    // Entity roster: people, orgs, email, date, money
    assert!(state.entities.len() >= 5);
    let find = |text: &str, entity_type: EntityType| {
        state
            .entities
            .values()
            .find(|e| e.normalized_text == text && e.entity_type == entity_type)
    };
    let maria = find("Maria Santos", EntityType::Person).expect("Maria Santos");
    let techcorp = find("Techcorp", EntityType::Org).expect("TechCorp");
    assert!(find("João Silva", EntityType::Person).is_some());
    assert!(find("Innovatech", EntityType::Org).is_some());
    assert!(find("joao@tech.com", EntityType::Email).is_some());
    assert!(state.entities.values().any(|e| e.entity_type == EntityType::Date));
    assert!(state.entities.values().any(|e| e.entity_type == EntityType::Money));

    // Both appear in both documents: frequency and surface variations
    assert_eq!(maria.frequency, 2);
    assert_eq!(techcorp.frequency, 2);
    assert!(techcorp.variations.contains("TechCorp"));

    // Co-occurrence between TechCorp and Maria Santos with evidence in both
    let relationship = state
        .relationships
        .iter()
        .find(|r| r.involves(&maria.entity_id) && r.involves(&techcorp.entity_id))
        .expect("TechCorp–Maria Santos relationship");
    assert_eq!(relationship.evidence_count(), 2);
    assert_eq!(relationship.weight(), 2.0);

    // One semantic link above the configured threshold, sharing both names
    assert_eq!(state.semantic_links.len(), 1);
    let link = &state.semantic_links[0];
    assert!(link.similarity_score() >= engine.config.semantic_similarity_threshold);
    assert!(link.doc_id_1() < link.doc_id_2());
    assert!(link.shared_entities.contains(&"Maria Santos".to_string()));
    assert!(link.shared_entities.contains(&"Techcorp".to_string()));

    // Two dated events, chronologically ordered
    assert_eq!(state.timeline.len(), 2);
    assert_eq!(state.timeline[0].date.as_deref(), Some("2024-01-15"));
    assert_eq!(state.timeline[1].date.as_deref(), Some("2024-01-20"));

    // The gate ran and produced a verdict with its metrics
    assert!(state.gate_ran());
    assert!(state.compliance_report.overall_status.is_some());
    assert!(!state.hypotheses.is_empty());
    assert!(!state.leads.is_empty());
}

#[tokio::test]
async fn report_artifact_is_written() {
    let engine = test_engine(false).await;
    engine.write_upload("reuniao.txt", DOC_MEETING.as_bytes());
    engine.write_upload("contrato.txt", DOC_CONTRACT.as_bytes());
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();

    let reports: Vec<_> = std::fs::read_dir(&engine.config.reports_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            name.starts_with("report_") && name.ends_with(".json")
        })
        .collect();
    assert_eq!(reports.len(), 1);

    let payload: serde_json::Value =
        serde_json::from_slice(&std::fs::read(reports[0].path()).unwrap()).unwrap();
    assert_eq!(payload["document_count"], 2);
    let summary = result.state.report_summary.as_deref().unwrap();
    assert!(summary.contains("## Executive Summary"));
    assert!(summary.contains("## Hypotheses"));
}

#[tokio::test]
async fn graph_metadata_reflects_externalized_entities() {
    let engine = test_engine(false).await;
    engine.write_upload("reuniao.txt", DOC_MEETING.as_bytes());
    engine.write_upload("contrato.txt", DOC_CONTRACT.as_bytes());
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();
    let state = &result.state;

    assert_eq!(state.graph_metadata.node_count, state.entities.len());
    assert_eq!(state.graph_metadata.edge_count, state.relationships.len());
    assert_eq!(state.centrality_scores.len(), state.entities.len());
    assert!(!state.graph_metadata.top_entities.is_empty());
    assert!(state.graph_metadata.top_entities.len() <= 20);
}
