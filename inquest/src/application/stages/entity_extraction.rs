// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Entity Extraction Stage
//!
//! Per document: NER constrained to the configured type set, plus regex
//! extraction of emails, phones and Brazilian identifiers (CPF, CNPJ).
//! Mentions merge by `(normalized_text, type)`; frequency is the number of
//! distinct documents carrying the entity. Co-occurrence relationships are
//! emitted per unordered entity pair per document and aggregated across the
//! corpus.
//!
//! Per-document work fans out on the rayon pool; the merge is deterministic
//! because results are combined in sorted document order.

use crate::application::stages::{InvestigationStage, StageContext};
use async_trait::async_trait;
use inquest_domain::aggregates::InvestigationState;
use inquest_domain::entities::{Entity, EntityType, Relationship};
use inquest_domain::error::InvestigationError;
use inquest_domain::services::capabilities::{NamedEntityRecognizer, RawMention};
use inquest_domain::services::text;
use inquest_domain::value_objects::{DocumentId, EntityId};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use tracing::info;

/// Per-document text budget.
const MAX_TEXT_CHARS: usize = 1_000_000;
/// Minimum text length worth scanning.
const MIN_TEXT_CHARS: usize = 10;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email regex")
});
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\+?55\s?)?(?:\(?\d{2}\)?[\s-]?)?\d{4,5}[\s-]?\d{4}\b").expect("phone regex")
});
static CPF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}\.?\d{3}\.?\d{3}-?\d{2}\b").expect("cpf regex"));
static CNPJ_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2}\b").expect("cnpj regex"));

/// Stage 3: entity extraction and co-occurrence relationships.
pub struct EntityExtractionStage;

impl EntityExtractionStage {
    /// All raw mentions of one document: NER plus the regex extractors.
    fn mentions_of(
        ctx: &StageContext,
        allowed: &[EntityType],
        doc_text: &str,
    ) -> Vec<RawMention> {
        let capped = text::slice_chars(doc_text, MAX_TEXT_CHARS);
        let mut mentions = ctx.ner.extract(capped, allowed);

        let regex_sets: [(&Regex, EntityType); 4] = [
            (&EMAIL_RE, EntityType::Email),
            (&PHONE_RE, EntityType::Phone),
            (&CPF_RE, EntityType::Cpf),
            (&CNPJ_RE, EntityType::Cnpj),
        ];
        for (pattern, entity_type) in regex_sets {
            if !allowed.contains(&entity_type) {
                continue;
            }
            for m in pattern.find_iter(capped) {
                // CPF/CNPJ shapes also satisfy the loose phone pattern;
                // keep the more specific type
                if entity_type == EntityType::Phone
                    && (CPF_RE.is_match(m.as_str()) || CNPJ_RE.is_match(m.as_str()))
                {
                    continue;
                }
                mentions.push(RawMention {
                    text: m.as_str().to_string(),
                    entity_type,
                    start: m.start(),
                    end: m.end(),
                    confidence: 1.0,
                });
            }
        }
        mentions.sort_by_key(|m| (m.start, m.end));
        mentions
    }

    fn allowed_types(ctx: &StageContext) -> Vec<EntityType> {
        ctx.config
            .entity_types
            .iter()
            .filter_map(|name| EntityType::from_str(name).ok())
            .collect()
    }
}

#[async_trait]
impl InvestigationStage for EntityExtractionStage {
    fn name(&self) -> &'static str {
        "extract_entities"
    }

    fn step_label(&self) -> &'static str {
        "entity_extraction"
    }

    async fn run(
        &self,
        state: &mut InvestigationState,
        ctx: &StageContext,
    ) -> Result<(), InvestigationError> {
        let allowed = Self::allowed_types(ctx);

        // Fan out per document; BTreeMap input keeps the collected order
        // sorted by document id, so the merge below is deterministic.
        let docs: Vec<(DocumentId, String)> = state
            .extracted_text
            .iter()
            .filter(|(_, t)| t.trim().len() >= MIN_TEXT_CHARS)
            .map(|(id, t)| (id.clone(), t.clone()))
            .collect();
        let mut per_doc: Vec<(DocumentId, Vec<RawMention>)> = docs
            .par_iter()
            .map(|(doc_id, doc_text)| {
                (doc_id.clone(), Self::mentions_of(ctx, &allowed, doc_text))
            })
            .collect();
        per_doc.sort_by(|a, b| a.0.cmp(&b.0));

        // Merge by (normalized_text, type)
        let mut by_key: BTreeMap<(String, EntityType), Entity> = BTreeMap::new();
        for (doc_id, mentions) in &per_doc {
            let doc_text = state.extracted_text.get(doc_id).cloned().unwrap_or_default();
            for mention in mentions {
                let margin = match mention.entity_type {
                    EntityType::Email | EntityType::Phone => 30,
                    EntityType::Cpf | EntityType::Cnpj => 0,
                    _ => 50,
                };
                let context = (margin > 0)
                    .then(|| text::context_window(&doc_text, mention.start, mention.end, margin));
                let key = (
                    inquest_domain::entities::entity::normalize_mention(
                        &mention.text,
                        mention.entity_type,
                    ),
                    mention.entity_type,
                );
                match by_key.get_mut(&key) {
                    Some(entity) => entity.absorb_mention(&mention.text, doc_id.clone(), context),
                    None => {
                        let entity = Entity::from_mention(
                            &mention.text,
                            mention.entity_type,
                            mention.confidence,
                            doc_id.clone(),
                            context,
                        );
                        by_key.insert(key, entity);
                    }
                }
            }
        }

        // Registry: canonical text → entity ids
        let mut registry: BTreeMap<String, Vec<EntityId>> = BTreeMap::new();
        for entity in by_key.values() {
            let key = entity.normalized_text.trim();
            if key.is_empty() {
                continue;
            }
            let ids = registry.entry(key.to_string()).or_default();
            if !ids.contains(&entity.entity_id) {
                ids.push(entity.entity_id.clone());
            }
        }

        // Co-occurrence: entity ids per document, then unordered pairs
        let mut doc_to_entities: BTreeMap<DocumentId, BTreeSet<EntityId>> = BTreeMap::new();
        for entity in by_key.values() {
            for doc_id in &entity.documents {
                doc_to_entities
                    .entry(doc_id.clone())
                    .or_default()
                    .insert(entity.entity_id.clone());
            }
        }
        let mut pair_evidence: BTreeMap<(EntityId, EntityId), BTreeSet<DocumentId>> =
            BTreeMap::new();
        for (doc_id, entity_ids) in &doc_to_entities {
            let ids: Vec<&EntityId> = entity_ids.iter().collect();
            for (i, a) in ids.iter().enumerate() {
                for b in &ids[i + 1..] {
                    let key = if a <= b {
                        ((*a).clone(), (*b).clone())
                    } else {
                        ((*b).clone(), (*a).clone())
                    };
                    pair_evidence.entry(key).or_default().insert(doc_id.clone());
                }
            }
        }

        let id_to_type: BTreeMap<&EntityId, EntityType> = by_key
            .values()
            .map(|e| (&e.entity_id, e.entity_type))
            .collect();
        let mut relationships: Vec<Relationship> = Vec::new();
        for ((a, b), evidence) in pair_evidence {
            let (Some(&type_a), Some(&type_b)) = (id_to_type.get(&a), id_to_type.get(&b)) else {
                continue;
            };
            if let Some(relationship) =
                Relationship::co_occurrence((&a, type_a), (&b, type_b), evidence)
            {
                relationships.push(relationship);
            }
        }

        state.entities = by_key
            .into_values()
            .map(|e| (e.entity_id.clone(), e))
            .collect();
        state.entity_registry = registry;
        state.relationships = relationships;
        state.current_step = "entity_extraction_complete".to_string();
        info!(
            "entities: {}, relationships: {}",
            state.entities.len(),
            state.relationships.len()
        );
        Ok(())
    }
}
