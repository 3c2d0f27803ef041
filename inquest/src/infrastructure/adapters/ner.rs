// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Rule-Based NER Backend
//!
//! Lexical named-entity recognition used when no statistical model is
//! installed: capitalized multi-word spans become people (or organizations
//! when they carry a corporate suffix), camel-case tokens become
//! organizations, and date/money/percent mentions match fixed patterns.
//! Precision over recall; the regex extractors for emails, phones and
//! Brazilian identifiers run separately in the extraction stage.

use inquest_domain::entities::EntityType;
use inquest_domain::services::capabilities::{NamedEntityRecognizer, RawMention};
use once_cell::sync::Lazy;
use regex::Regex;

static MULTIWORD_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-ZÀ-Ý][a-zà-ÿ]+(?:\s+[A-ZÀ-Ý][a-zà-ÿ]+)+\b").expect("name regex")
});

/// Tokens with an internal capital (TechCorp, InnovaTech).
static CAMEL_ORG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-zà-ÿ]+[A-Z][A-Za-zà-ÿ]*\b").expect("camel org regex"));

static ORG_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:ltda|s\.a\.|inc|corp|ltd|gmbh|holding|group)\.?$").expect("org suffix")
});

static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\d{4}-\d{2}-\d{2}|\d{2}/\d{2}/\d{4}|\d{2}-\d{2}-\d{4}|\d{1,2}\s+de\s+(?i:janeiro|fevereiro|março|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro)\s+de\s+\d{4}",
    )
    .expect("date regex")
});

static MONEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:R\$|US\$|\$|€)\s?\d[\d.,]*|\d[\d.,]*\s?(?i:reais|dólares|euros)")
        .expect("money regex")
});

static PERCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:[.,]\d+)?\s?%").expect("percent regex"));

/// Lexical NER backend.
pub struct RuleBasedNer;

impl RuleBasedNer {
    fn push_if_allowed(
        mentions: &mut Vec<RawMention>,
        allowed: &[EntityType],
        text: &str,
        entity_type: EntityType,
        start: usize,
        end: usize,
    ) {
        if allowed.contains(&entity_type) {
            mentions.push(RawMention {
                text: text.to_string(),
                entity_type,
                start,
                end,
                confidence: 0.9,
            });
        }
    }
}

impl NamedEntityRecognizer for RuleBasedNer {
    fn probe(&self) -> bool {
        true
    }

    fn extract(&self, text: &str, allowed: &[EntityType]) -> Vec<RawMention> {
        let mut mentions = Vec::new();

        for m in MULTIWORD_NAME.find_iter(text) {
            let entity_type = if ORG_SUFFIX.is_match(m.as_str()) {
                EntityType::Org
            } else {
                EntityType::Person
            };
            Self::push_if_allowed(&mut mentions, allowed, m.as_str(), entity_type, m.start(), m.end());
        }

        for m in CAMEL_ORG.find_iter(text) {
            // Skip camel tokens inside an already-captured span
            if mentions.iter().any(|x| m.start() >= x.start && m.end() <= x.end) {
                continue;
            }
            Self::push_if_allowed(&mut mentions, allowed, m.as_str(), EntityType::Org, m.start(), m.end());
        }

        for m in DATE.find_iter(text) {
            Self::push_if_allowed(&mut mentions, allowed, m.as_str(), EntityType::Date, m.start(), m.end());
        }
        for m in MONEY.find_iter(text) {
            Self::push_if_allowed(&mut mentions, allowed, m.as_str(), EntityType::Money, m.start(), m.end());
        }
        for m in PERCENT.find_iter(text) {
            Self::push_if_allowed(&mut mentions, allowed, m.as_str(), EntityType::Percent, m.start(), m.end());
        }

        mentions.sort_by_key(|m| (m.start, m.end));
        mentions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_types() -> Vec<EntityType> {
        EntityType::all().to_vec()
    }

    fn extract(text: &str) -> Vec<RawMention> {
        RuleBasedNer.extract(text, &all_types())
    }

    #[test]
    fn capitalized_pairs_become_people() {
        let mentions = extract("Reunião entre João Silva e Maria Santos.");
        let people: Vec<_> = mentions
            .iter()
            .filter(|m| m.entity_type == EntityType::Person)
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(people, vec!["João Silva", "Maria Santos"]);
    }

    #[test]
    fn camel_tokens_become_orgs() {
        let mentions = extract("Contrato TechCorp e InnovaTech assinado.");
        let orgs: Vec<_> = mentions
            .iter()
            .filter(|m| m.entity_type == EntityType::Org)
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(orgs, vec!["TechCorp", "InnovaTech"]);
    }

    #[test]
    fn corporate_suffix_flips_person_to_org() {
        let mentions = extract("Pagamento para Acme Holding efetuado.");
        assert!(mentions
            .iter()
            .any(|m| m.entity_type == EntityType::Org && m.text == "Acme Holding"));
    }

    #[test]
    fn dates_and_money_match() {
        let mentions = extract("Data: 15/01/2024. Valor R$ 500.000.");
        assert!(mentions.iter().any(|m| m.entity_type == EntityType::Date));
        assert!(mentions
            .iter()
            .any(|m| m.entity_type == EntityType::Money && m.text.starts_with("R$")));
    }

    #[test]
    fn percent_matches() {
        let mentions = extract("Aumento de 12,5 % no período.");
        assert!(mentions.iter().any(|m| m.entity_type == EntityType::Percent));
    }

    #[test]
    fn whitelist_filters_types() {
        let mentions = RuleBasedNer.extract("João Silva pagou R$ 100", &[EntityType::Money]);
        assert!(mentions.iter().all(|m| m.entity_type == EntityType::Money));
    }

    #[test]
    fn lowercase_words_break_name_spans() {
        let mentions = extract("a reunião de ontem foi longa");
        assert!(mentions.iter().all(|m| m.entity_type != EntityType::Person));
    }
}
