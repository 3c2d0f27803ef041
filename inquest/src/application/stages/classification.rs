// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Classification Stage
//!
//! Scores every document with extracted text on four axes: domain, document
//! type, language, and priority. Domain and type come from keyword hits in
//! the first 5000/3000 characters; priority starts at 0.5 and is boosted by
//! type, domain, boost keywords, suspicious patterns and cross-references,
//! then clamped to `[0,1]` and rounded to two decimals. Documents under 50
//! words are filed as fragments at priority 0.3.

use crate::application::stages::{InvestigationStage, StageContext};
use async_trait::async_trait;
use inquest_domain::aggregates::InvestigationState;
use inquest_domain::entities::{Classification, DocType, DomainTag};
use inquest_domain::error::InvestigationError;
use inquest_domain::services::{language, text};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

const DOMAIN_WINDOW: usize = 5000;
const DOC_TYPE_WINDOW: usize = 3000;
const FRAGMENT_WORD_COUNT: usize = 50;

static DOMAIN_KEYWORDS: &[(DomainTag, &[&str])] = &[
    (
        DomainTag::Finance,
        &[
            "offshore", "transação", "valor", "pagamento", "orçamento", "cnpj", "cpf", "payment",
            "budget", "invoice", "transaction",
        ],
    ),
    (
        DomainTag::Legal,
        &["contrato", "cláusula", "juiz", "tribunal", "lei", "contract", "clause", "court", "law"],
    ),
    (
        DomainTag::Technical,
        &["api", "software", "sistema", "desenvolvimento", "code", "implementation"],
    ),
    (
        DomainTag::Corporate,
        &["reunião", "diretor", "empresa", "meeting", "ceo", "board"],
    ),
    (
        DomainTag::Administrative,
        &["nota fiscal", "memorando", "memo", "relatório interno"],
    ),
];

static DOC_TYPE_KEYWORDS: &[(DocType, &[&str])] = &[
    (
        DocType::Contract,
        &["contrato", "contract", "termo", "agreement", "cláusula", "parte"],
    ),
    (
        DocType::Invoice,
        &["nota fiscal", "invoice", "nf-", "valor total", "valor r$"],
    ),
    (
        DocType::Report,
        &["relatório", "report", "análise", "analysis", "conclusão"],
    ),
    (
        DocType::Email,
        &["from:", "to:", "subject:", "re:", "assunto", "enviado por"],
    ),
    (DocType::Technical, &["especificação", "spec", "requisito", "requirement"]),
    (DocType::Legal, &["petição", "sentença", "autos"]),
];

static PRIORITY_BOOST_KEYWORDS: &[&str] =
    &["confidencial", "restricted", "secret", "confidential", "urgente", "urgent"];

static REFERENCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)conforme\s+(anexo|doc\.?|documento)\s*[x\d]").expect("reference regex")
});

static REDACTION_BLOCKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[█*]{3,}").expect("redaction regex"));
static REPEATED_ELLIPSIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\.\.\s*\.\.\.").expect("ellipsis regex"));
static BRACKET_GAPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]{2,}").expect("bracket regex"));

/// Stage 2: document classification.
pub struct ClassificationStage;

impl ClassificationStage {
    fn classify_domain(text_content: &str) -> (DomainTag, f64) {
        let window = text::slice_chars(text_content, DOMAIN_WINDOW).to_lowercase();
        let mut best = (DomainTag::Other, 0usize);
        for (domain, keywords) in DOMAIN_KEYWORDS {
            let hits = keywords.iter().filter(|k| window.contains(*k)).count();
            if hits > best.1 {
                best = (*domain, hits);
            }
        }
        if best.1 == 0 {
            return (DomainTag::Other, 0.5);
        }
        let confidence = (0.5 + 0.1 * best.1 as f64).min(0.95);
        (best.0, (confidence * 100.0).round() / 100.0)
    }

    fn classify_doc_type(text_content: &str) -> (DocType, f64) {
        let window = text::slice_chars(text_content, DOC_TYPE_WINDOW).to_lowercase();
        let mut best = (DocType::Other, 0usize);
        for (doc_type, keywords) in DOC_TYPE_KEYWORDS {
            let hits = keywords.iter().filter(|k| window.contains(*k)).count();
            if hits > best.1 {
                best = (*doc_type, hits);
            }
        }
        if best.1 == 0 {
            return (DocType::Other, 0.5);
        }
        let confidence = (0.5 + 0.1 * best.1 as f64).min(0.95);
        (best.0, (confidence * 100.0).round() / 100.0)
    }

    fn detect_keywords(text_content: &str) -> Vec<String> {
        let window = text::slice_chars(text_content, DOC_TYPE_WINDOW).to_lowercase();
        let mut found = Vec::new();
        for keyword in PRIORITY_BOOST_KEYWORDS
            .iter()
            .chain(["offshore", "transação", "contrato", "nota fiscal"].iter())
        {
            if window.contains(keyword) && !found.contains(&keyword.to_string()) {
                found.push(keyword.to_string());
            }
        }
        for (_, keywords) in DOMAIN_KEYWORDS {
            for keyword in *keywords {
                if window.contains(keyword) && !found.contains(&keyword.to_string()) {
                    found.push(keyword.to_string());
                }
            }
        }
        found
    }

    fn suspicious_pattern_count(text_content: &str) -> usize {
        [&*REDACTION_BLOCKS, &*REPEATED_ELLIPSIS, &*BRACKET_GAPS]
            .iter()
            .filter(|pattern| pattern.is_match(text_content))
            .count()
    }

    fn priority_score(doc_type: DocType, domain: DomainTag, text_content: &str) -> (f64, Vec<String>) {
        let mut score = 0.5;
        let mut reasons = Vec::new();
        let lowered = text_content.to_lowercase();

        if matches!(doc_type, DocType::Contract | DocType::Invoice | DocType::Report) {
            score += 0.2;
            reasons.push(format!("doc_type_{}", doc_type));
        }
        if matches!(domain, DomainTag::Finance | DomainTag::Legal) {
            score += 0.2;
            reasons.push(format!("domain_{}", domain));
        }
        if PRIORITY_BOOST_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            score += 0.3;
            reasons.push("contains_keyword_confidencial".to_string());
        }
        if lowered.contains("offshore") || lowered.contains("transação") {
            score += 0.15;
            reasons.push("high_relevance_keywords".to_string());
        }
        let suspicious = Self::suspicious_pattern_count(text_content);
        if suspicious > 0 {
            score += 0.1 * suspicious.min(3) as f64;
            reasons.push("suspicious_patterns".to_string());
        }
        if REFERENCE_PATTERN.is_match(text_content) {
            score += 0.15;
            reasons.push("references_other_docs".to_string());
        }
        (score, reasons)
    }
}

#[async_trait]
impl InvestigationStage for ClassificationStage {
    fn name(&self) -> &'static str {
        "classify_documents"
    }

    fn step_label(&self) -> &'static str {
        "classification"
    }

    async fn run(
        &self,
        state: &mut InvestigationState,
        _ctx: &StageContext,
    ) -> Result<(), InvestigationError> {
        let doc_ids: Vec<_> = state.extracted_text.keys().cloned().collect();

        for (index, doc_id) in doc_ids.iter().enumerate() {
            let content = state.extracted_text.get(doc_id).cloned().unwrap_or_default();
            let word_count = content.split_whitespace().count();
            let processing_order = index + 1;

            let classification = if word_count < FRAGMENT_WORD_COUNT {
                Classification::new(
                    doc_id.clone(),
                    DomainTag::Other,
                    DocType::Fragment,
                    "unknown".to_string(),
                    0.3,
                    0.8,
                    0.5,
                    0.5,
                    vec!["short_document".to_string()],
                    Vec::new(),
                    processing_order,
                )
            } else {
                let (domain, domain_confidence) = Self::classify_domain(&content);
                let (doc_type, doc_type_confidence) = Self::classify_doc_type(&content);
                let guess = language::detect(&content);
                let keywords = Self::detect_keywords(&content);
                let (mut priority, mut reasons) = Self::priority_score(doc_type, domain, &content);
                if guess.code == "unknown" {
                    priority = (priority - 0.2).max(0.0);
                    reasons.push("language_unknown".to_string());
                }
                Classification::new(
                    doc_id.clone(),
                    domain,
                    doc_type,
                    guess.code,
                    priority,
                    doc_type_confidence,
                    domain_confidence,
                    guess.confidence,
                    reasons,
                    keywords,
                    processing_order,
                )
            };

            if let Some(document) = state.documents.get_mut(doc_id) {
                document.priority_score = Some(classification.priority_score());
            }
            state.classifications.insert(doc_id.clone(), classification);
        }

        state.current_step = "classification_complete".to_string();
        info!("classified {} documents", state.classifications.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inquest_domain::entities::Relevance;
    use inquest_domain::value_objects::DocumentId;

    fn run_on(content: &str) -> Classification {
        let doc_id = DocumentId::parse("0123456789abcdef").unwrap();
        let word_count = content.split_whitespace().count();
        if word_count < FRAGMENT_WORD_COUNT {
            return Classification::new(
                doc_id,
                DomainTag::Other,
                DocType::Fragment,
                "unknown".to_string(),
                0.3,
                0.8,
                0.5,
                0.5,
                vec!["short_document".to_string()],
                Vec::new(),
                1,
            );
        }
        let (domain, dc) = ClassificationStage::classify_domain(content);
        let (doc_type, tc) = ClassificationStage::classify_doc_type(content);
        let (priority, reasons) = ClassificationStage::priority_score(doc_type, domain, content);
        Classification::new(
            doc_id,
            domain,
            doc_type,
            "pt".to_string(),
            priority,
            tc,
            dc,
            0.9,
            reasons,
            vec![],
            1,
        )
    }

    fn pad(text: &str) -> String {
        // Pads past the fragment threshold without adding keywords
        format!("{} {}", text, "palavra ".repeat(60))
    }

    #[test]
    fn short_documents_are_fragments() {
        let c = run_on("muito curto");
        assert_eq!(c.document_type, DocType::Fragment);
        assert_eq!(c.priority_score(), 0.3);
        assert_eq!(c.priority_reasons, vec!["short_document".to_string()]);
    }

    #[test]
    fn finance_contract_boosts_priority() {
        let c = run_on(&pad(
            "Contrato de pagamento entre as partes. Valor da transação conforme cláusula.",
        ));
        assert_eq!(c.domain, DomainTag::Finance);
        assert_eq!(c.document_type, DocType::Contract);
        assert!(c.priority_score() >= 0.9);
    }

    #[test]
    fn confidential_reference_reaches_critical() {
        let c = run_on(&pad(
            "Documento confidencial. Dados conforme anexo X do processo.",
        ));
        assert!(c.priority_score() >= 0.85, "got {}", c.priority_score());
        assert!(c.priority_reasons.contains(&"contains_keyword_confidencial".to_string()));
        assert!(c.priority_reasons.contains(&"references_other_docs".to_string()));
        assert_eq!(c.estimated_relevance(), Relevance::Critical);
    }

    #[test]
    fn suspicious_patterns_add_bounded_boost() {
        let c = run_on(&pad("Relatório com trechos ████ ocultos e ... ... cortes."));
        assert!(c.priority_reasons.contains(&"suspicious_patterns".to_string()));
    }

    #[test]
    fn domain_confidence_saturates() {
        let many_hits = pad(
            "pagamento valor orçamento invoice transaction payment budget offshore cnpj cpf transação",
        );
        let (_, confidence) = ClassificationStage::classify_domain(&many_hits);
        assert!(confidence <= 0.95);
    }
}
