// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Cryptanalysis through the whole pipeline: embedded Base64 payloads,
//! encrypted PDF short-circuits, Caesar shift suggestions.

use crate::common::test_engine;
use inquest_domain::entities::{CryptoScheme, ExtractionStatus};

#[tokio::test]
async fn embedded_base64_payload_is_found_and_decoded() {
    let engine = test_engine(false).await;
    // Short words around the payload keep letter runs below the Caesar
    // detector's minimum
    engine.write_upload(
        "payload.txt",
        b"Ref 4412: SGVsbG8gd29ybGQsIHRoaXMgaXMgc2VjcmV0IQ== (code 7788).",
    );
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();
    let state = &result.state;

    let segment = state
        .encrypted_segments
        .iter()
        .find(|s| s.crypto_type == CryptoScheme::Base64)
        .expect("base64 segment");
    assert!(segment.is_decoded());
    assert!(segment
        .decrypted_content
        .as_deref()
        .unwrap()
        .contains("Hello world"));
    assert!(state.decrypted_content.contains_key(&segment.segment_id));

    let finding = state
        .cryptography_findings
        .iter()
        .find(|f| f.finding_type == "base64_encoded")
        .expect("base64 finding");
    assert_eq!(finding.confidence, 0.95);
    assert!(finding.decoded_preview.as_deref().unwrap().contains("Hello world"));
    assert!(finding.location.as_deref().unwrap().starts_with("char "));
}

#[tokio::test]
async fn encrypted_pdf_short_circuits_with_finding() {
    let engine = test_engine(false).await;
    engine.write_upload(
        "locked.pdf",
        b"%PDF-1.7\ntrailer << /Encrypt 5 0 R /ID [<aa><bb>] >>\n%%EOF",
    );
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();
    let state = &result.state;

    assert_eq!(state.documents.len(), 1);
    let document = state.documents.values().next().unwrap();
    assert_eq!(document.status, ExtractionStatus::Encrypted);
    assert!(state.extracted_text.values().next().unwrap().is_empty());

    let finding = state
        .cryptography_findings
        .iter()
        .find(|f| f.finding_type == "pdf_encrypted")
        .expect("pdf_encrypted finding");
    assert!(finding.requires_password);
    assert_eq!(finding.document_id, document.doc_id.to_string());
}

#[tokio::test]
async fn caesar_block_gets_a_shift_in_range() {
    let engine = test_engine(false).await;
    // "the quick brown fox..." shifted by three
    engine.write_upload(
        "cifra.txt",
        b"wkh txlfn eurzq ira mxpsv ryhu wkh odcb grj dqg nhhsv uxqqlqj iruzdug",
    );
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();
    let state = &result.state;

    let segment = state
        .encrypted_segments
        .iter()
        .find(|s| matches!(s.crypto_type, CryptoScheme::Caesar { .. }))
        .expect("caesar segment");
    let CryptoScheme::Caesar { shift } = segment.crypto_type else {
        unreachable!();
    };
    assert!(shift <= 25);
    // Frequency correlation round-trips to a printable candidate
    assert!(segment.is_decoded());
    assert!(segment.decrypted_content.as_deref().unwrap().is_ascii());
}

#[tokio::test]
async fn hex_block_is_decoded() {
    let engine = test_engine(false).await;
    engine.write_upload("dump.txt", b"id 9: 48656c6c6f20776f726c6421 end.");
    let pipeline = engine.pipeline(false);
    let result = pipeline
        .run(Some(engine.uploads().display().to_string()), None)
        .await
        .unwrap();
    let state = &result.state;

    let segment = state
        .encrypted_segments
        .iter()
        .find(|s| s.crypto_type == CryptoScheme::Hex)
        .expect("hex segment");
    assert_eq!(segment.decrypted_content.as_deref(), Some("Hello world!"));
}
