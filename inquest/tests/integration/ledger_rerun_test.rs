// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! At-most-once processing: the ledger makes a second run over the same
//! uploads skip every DONE document.

use crate::common::test_engine;
use inquest_domain::repositories::{DocStatus, ProcessingLedger};

#[tokio::test]
async fn second_run_skips_ledger_done_documents() {
    let engine = test_engine(false).await;
    engine.write_upload(
        "contrato.txt",
        "Contrato de prestação de serviços entre as partes com valor acordado.".as_bytes(),
    );
    let pipeline = engine.pipeline(false);

    let first = pipeline
        .run(
            Some(engine.uploads().display().to_string()),
            Some("case-1".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(first.state.documents.len(), 1);
    let document = first.state.documents.values().next().unwrap();
    assert_eq!(
        engine
            .ctx
            .ledger
            .status(&document.file_hash, "case-1")
            .await
            .unwrap(),
        Some(DocStatus::Done)
    );

    // Same investigation id, fresh state: the ledger gates re-ingestion
    let second = pipeline
        .run(
            Some(engine.uploads().display().to_string()),
            Some("case-1".to_string()),
        )
        .await
        .unwrap();
    assert!(second.state.documents.is_empty());
    assert_eq!(
        engine
            .ctx
            .ledger
            .status(&document.file_hash, "case-1")
            .await
            .unwrap(),
        Some(DocStatus::Done)
    );
}

#[tokio::test]
async fn different_investigation_reprocesses_the_same_file() {
    let engine = test_engine(false).await;
    engine.write_upload("nota.txt", b"uma nota compartilhada entre investigacoes distintas");
    let pipeline = engine.pipeline(false);

    let first = pipeline
        .run(
            Some(engine.uploads().display().to_string()),
            Some("case-a".to_string()),
        )
        .await
        .unwrap();
    let second = pipeline
        .run(
            Some(engine.uploads().display().to_string()),
            Some("case-b".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(first.state.documents.len(), 1);
    assert_eq!(second.state.documents.len(), 1);
    // Content-addressed ids are identical across investigations
    assert_eq!(
        first.state.documents.keys().next(),
        second.state.documents.keys().next()
    );
}

#[tokio::test]
async fn duplicate_content_in_one_run_is_ingested_once() {
    let engine = test_engine(false).await;
    engine.write_upload("original.txt", b"conteudo duplicado byte a byte para teste");
    engine.write_upload("copia.txt", b"conteudo duplicado byte a byte para teste");
    let pipeline = engine.pipeline(false);

    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();
    // Same content hash: only the first file lands in the state
    assert_eq!(result.state.documents.len(), 1);
}
