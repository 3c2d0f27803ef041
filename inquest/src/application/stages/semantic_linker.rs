// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Semantic Linker Stage
//!
//! Indexes each document's text as chunks into the vector store, then links
//! document pairs whose similarity (`max(0, 1 − distance)`) clears the
//! configured threshold: at most one link per unordered pair, capped per
//! document, optionally requiring a minimum number of shared entities. Each
//! link carries shared entity texts and shared concepts.
//!
//! On linked pairs, a rule-based contradiction check compares numeric and
//! date token sets; disjoint non-empty sets raise a contradiction. Finally,
//! narrative threads are the connected components of the link graph, titled
//! by the most central member's first informative sentence.

use crate::application::stages::{InvestigationStage, StageContext};
use async_trait::async_trait;
use inquest_domain::aggregates::InvestigationState;
use inquest_domain::entities::{Contradiction, ContradictionKind, NarrativeThread, SemanticLink};
use inquest_domain::error::InvestigationError;
use inquest_domain::repositories::VectorStore;
use inquest_domain::services::capabilities::EmbeddingProvider;
use inquest_domain::services::{chunking, text};
use inquest_domain::value_objects::DocumentId;
use once_cell::sync::Lazy;
use petgraph::unionfind::UnionFind;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Query budget per document.
const QUERY_CHARS: usize = 2000;
/// Contradiction scan budget per document.
const CONTRADICTION_CHARS: usize = 5000;
/// Shared concepts kept per link.
const MAX_SHARED_CONCEPTS: usize = 10;

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,3}(?:\.\d{3})*(?:,\d+)?|\d+[.,]\d+").expect("number regex"));
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}|\d{2}/\d{2}/\d{4}").expect("date regex"));

/// Stage 5: cross-document semantic linking.
pub struct SemanticLinkerStage;

impl SemanticLinkerStage {
    /// Entity texts present in both documents' evidence sets.
    fn shared_entities(
        state: &InvestigationState,
        a: &DocumentId,
        b: &DocumentId,
    ) -> Vec<String> {
        let mut shared = Vec::new();
        for entity in state.entities.values() {
            if entity.documents.contains(a) && entity.documents.contains(b) {
                if !shared.contains(&entity.text) {
                    shared.push(entity.text.clone());
                }
            }
        }
        shared
    }

    fn shared_concepts(text_a: &str, text_b: &str) -> Vec<String> {
        let a = text::concept_words(text_a, 3000);
        let b = text::concept_words(text_b, 3000);
        a.intersection(&b).take(MAX_SHARED_CONCEPTS).cloned().collect()
    }

    fn contradictions_for(
        a: &DocumentId,
        b: &DocumentId,
        text_a: &str,
        text_b: &str,
    ) -> Vec<Contradiction> {
        let mut found = Vec::new();
        let window_a = text::slice_chars(text_a, CONTRADICTION_CHARS);
        let window_b = text::slice_chars(text_b, CONTRADICTION_CHARS);

        let numbers_a: BTreeSet<&str> = NUMBER_RE.find_iter(window_a).map(|m| m.as_str()).collect();
        let numbers_b: BTreeSet<&str> = NUMBER_RE.find_iter(window_b).map(|m| m.as_str()).collect();
        if !numbers_a.is_empty() && !numbers_b.is_empty() && numbers_a.is_disjoint(&numbers_b) {
            found.push(Contradiction {
                doc_id_1: a.clone(),
                doc_id_2: b.clone(),
                kind: ContradictionKind::NumericMismatch,
                description: "Different numeric values in linked docs".to_string(),
            });
        }

        let dates_a: BTreeSet<&str> = DATE_RE.find_iter(window_a).map(|m| m.as_str()).collect();
        let dates_b: BTreeSet<&str> = DATE_RE.find_iter(window_b).map(|m| m.as_str()).collect();
        if !dates_a.is_empty() && !dates_b.is_empty() && dates_a.is_disjoint(&dates_b) {
            found.push(Contradiction {
                doc_id_1: a.clone(),
                doc_id_2: b.clone(),
                kind: ContradictionKind::DateMismatch,
                description: "Different dates in linked docs".to_string(),
            });
        }
        found
    }
}

#[async_trait]
impl InvestigationStage for SemanticLinkerStage {
    fn name(&self) -> &'static str {
        "semantic_linker"
    }

    fn step_label(&self) -> &'static str {
        "semantic_linking"
    }

    async fn run(
        &self,
        state: &mut InvestigationState,
        ctx: &StageContext,
    ) -> Result<(), InvestigationError> {
        let doc_ids: Vec<DocumentId> = state.extracted_text.keys().cloned().collect();
        if doc_ids.len() < 2 {
            state.current_step = "semantic_linking_complete".to_string();
            return Ok(());
        }
        if !ctx.embeddings.probe() {
            warn!("embedding provider unavailable; semantic linking skipped");
            state.current_step = "semantic_linking_complete".to_string();
            return Ok(());
        }

        // Index every document's chunks
        for doc_id in &doc_ids {
            let doc_text = state.extracted_text.get(doc_id).cloned().unwrap_or_default();
            let chunks = chunking::chunk_for_indexing(&doc_text);
            if chunks.is_empty() {
                continue;
            }
            let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
            let embeddings = ctx.embeddings.embed(&refs)?;
            for (i, (chunk, embedding)) in chunks.iter().zip(&embeddings).enumerate() {
                ctx.vector
                    .upsert(&format!("{}_{}", doc_id, i), chunk, embedding, doc_id)
                    .await?;
            }
        }

        let threshold = ctx.config.semantic_similarity_threshold;
        let max_per_doc = ctx.config.max_links_per_document;
        let min_shared = ctx.config.min_shared_entities;

        let mut links: Vec<SemanticLink> = Vec::new();
        let mut seen_pairs: BTreeSet<(DocumentId, DocumentId)> = BTreeSet::new();

        for doc_id in &doc_ids {
            let doc_text = state.extracted_text.get(doc_id).cloned().unwrap_or_default();
            let query_text = text::slice_chars(&doc_text, QUERY_CHARS);
            if query_text.trim().is_empty() {
                continue;
            }
            let query_embedding = ctx.embeddings.embed_one(query_text)?;
            let hits = ctx
                .vector
                .query(&query_embedding, max_per_doc + doc_ids.len(), None)
                .await?;

            let mut count_for_doc = 0usize;
            for hit in hits {
                if count_for_doc >= max_per_doc {
                    break;
                }
                if &hit.doc_id == doc_id {
                    continue;
                }
                let pair = if doc_id < &hit.doc_id {
                    (doc_id.clone(), hit.doc_id.clone())
                } else {
                    (hit.doc_id.clone(), doc_id.clone())
                };
                if seen_pairs.contains(&pair) {
                    continue;
                }
                let similarity = hit.similarity();
                if similarity < threshold {
                    continue;
                }
                let shared = Self::shared_entities(state, doc_id, &hit.doc_id);
                if min_shared > 0 && !shared.is_empty() && shared.len() < min_shared {
                    continue;
                }
                let other_text = state
                    .extracted_text
                    .get(&hit.doc_id)
                    .cloned()
                    .unwrap_or_default();
                let concepts = Self::shared_concepts(query_text, &other_text);
                let rationale = Some(text::truncate(&hit.document, 200));
                if let Some(link) = SemanticLink::new(
                    doc_id.clone(),
                    hit.doc_id.clone(),
                    similarity,
                    rationale,
                    shared,
                    concepts,
                ) {
                    seen_pairs.insert(pair);
                    count_for_doc += 1;
                    links.push(link);
                }
            }
        }

        // Rule-based contradictions on linked pairs
        let mut contradictions = Vec::new();
        for link in &links {
            let text_a = state
                .extracted_text
                .get(link.doc_id_1())
                .cloned()
                .unwrap_or_default();
            let text_b = state
                .extracted_text
                .get(link.doc_id_2())
                .cloned()
                .unwrap_or_default();
            contradictions.extend(Self::contradictions_for(
                link.doc_id_1(),
                link.doc_id_2(),
                &text_a,
                &text_b,
            ));
        }

        // Narrative threads: connected components of the link graph
        let index_of: BTreeMap<&DocumentId, usize> =
            doc_ids.iter().enumerate().map(|(i, d)| (d, i)).collect();
        let mut components: UnionFind<usize> = UnionFind::new(doc_ids.len());
        for link in &links {
            if let (Some(&a), Some(&b)) = (index_of.get(link.doc_id_1()), index_of.get(link.doc_id_2()))
            {
                components.union(a, b);
            }
        }
        let mut doc_scores: BTreeMap<&DocumentId, f64> = BTreeMap::new();
        for link in &links {
            *doc_scores.entry(link.doc_id_1()).or_insert(0.0) += link.similarity_score();
            *doc_scores.entry(link.doc_id_2()).or_insert(0.0) += link.similarity_score();
        }
        let mut clusters: BTreeMap<usize, Vec<DocumentId>> = BTreeMap::new();
        for (i, doc_id) in doc_ids.iter().enumerate() {
            clusters.entry(components.find(i)).or_default().push(doc_id.clone());
        }
        let mut threads = Vec::new();
        for (index, (_, members)) in clusters.into_iter().enumerate() {
            if members.len() < 2 {
                continue;
            }
            let central = members
                .iter()
                .max_by(|a, b| {
                    let sa = doc_scores.get(a).copied().unwrap_or(0.0);
                    let sb = doc_scores.get(b).copied().unwrap_or(0.0);
                    sa.partial_cmp(&sb).unwrap_or(std::cmp::Ordering::Equal)
                })
                .cloned()
                .unwrap_or_else(|| members[0].clone());
            let central_text = state.extracted_text.get(&central).cloned().unwrap_or_default();
            let title = text::first_informative_sentence(&central_text, 150)
                .unwrap_or_else(|| format!("Cluster {}", index));
            threads.push(NarrativeThread {
                thread_id: format!("thread_{}", index),
                title: title.clone(),
                doc_ids: members,
                summary: title,
            });
        }

        state.semantic_links = links;
        state.contradictions = contradictions;
        state.narrative_threads = threads;
        state.current_step = "semantic_linking_complete".to_string();
        info!(
            "links: {}, contradictions: {}, threads: {}",
            state.semantic_links.len(),
            state.contradictions.len(),
            state.narrative_threads.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(n: u8) -> DocumentId {
        DocumentId::parse(&format!("{:016x}", n)).unwrap()
    }

    #[test]
    fn disjoint_numbers_raise_contradiction() {
        let found = SemanticLinkerStage::contradictions_for(
            &doc(1),
            &doc(2),
            "valor de 100,50 pago",
            "valor de 999,99 pago",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, ContradictionKind::NumericMismatch);
    }

    #[test]
    fn shared_numbers_do_not_contradict() {
        let found = SemanticLinkerStage::contradictions_for(
            &doc(1),
            &doc(2),
            "valor 100,50",
            "o mesmo 100,50 em outro doc",
        );
        assert!(found.is_empty());
    }

    #[test]
    fn disjoint_dates_raise_contradiction() {
        let found = SemanticLinkerStage::contradictions_for(
            &doc(1),
            &doc(2),
            "evento em 15/01/2024",
            "evento em 20/02/2024",
        );
        assert!(found.iter().any(|c| c.kind == ContradictionKind::DateMismatch));
    }

    #[test]
    fn shared_concepts_ignore_stop_words() {
        let concepts =
            SemanticLinkerStage::shared_concepts("the contrato pagamento", "contrato de pagamento");
        assert!(concepts.contains(&"contrato".to_string()));
        assert!(concepts.contains(&"pagamento".to_string()));
        assert!(!concepts.contains(&"the".to_string()));
    }
}
