// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Entity
//!
//! A merged noun-like reference extracted from the corpus. Mentions from all
//! documents are bucketed by the merge key `(normalized_text, type)`: two
//! mentions denote the same entity iff both components are equal.
//!
//! ## Canonical form
//!
//! - People, organizations and geo references are title-cased
//! - Identifiers (CPF, CNPJ) and phone numbers keep digits only
//! - Emails are lowercased
//! - Everything else has its whitespace collapsed
//!
//! ## Invariant
//!
//! `frequency == documents.len()` at all times; [`Entity::absorb_mention`]
//! maintains it.

use crate::value_objects::{DocumentId, EntityId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Maximum sampled contexts retained per entity.
pub const MAX_CONTEXTS: usize = 10;
/// Characters of context kept around a mention.
pub const CONTEXT_CHARS: usize = 50;

/// Type tag of an extracted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "PERSON")]
    Person,
    #[serde(rename = "ORG")]
    Org,
    #[serde(rename = "GPE")]
    Gpe,
    #[serde(rename = "LOC")]
    Loc,
    #[serde(rename = "DATE")]
    Date,
    #[serde(rename = "MONEY")]
    Money,
    #[serde(rename = "PERCENT")]
    Percent,
    #[serde(rename = "EMAIL")]
    Email,
    #[serde(rename = "PHONE")]
    Phone,
    #[serde(rename = "CPF")]
    Cpf,
    #[serde(rename = "CNPJ")]
    Cnpj,
    #[serde(rename = "OTHER")]
    Other,
}

impl EntityType {
    /// All recognized types, in declaration order.
    pub fn all() -> &'static [EntityType] {
        &[
            Self::Person,
            Self::Org,
            Self::Gpe,
            Self::Loc,
            Self::Date,
            Self::Money,
            Self::Percent,
            Self::Email,
            Self::Phone,
            Self::Cpf,
            Self::Cnpj,
            Self::Other,
        ]
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Person => "PERSON",
            Self::Org => "ORG",
            Self::Gpe => "GPE",
            Self::Loc => "LOC",
            Self::Date => "DATE",
            Self::Money => "MONEY",
            Self::Percent => "PERCENT",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Cpf => "CPF",
            Self::Cnpj => "CNPJ",
            Self::Other => "OTHER",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for EntityType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PERSON" | "PER" => Ok(Self::Person),
            "ORG" => Ok(Self::Org),
            "GPE" => Ok(Self::Gpe),
            "LOC" => Ok(Self::Loc),
            "DATE" => Ok(Self::Date),
            "MONEY" => Ok(Self::Money),
            "PERCENT" => Ok(Self::Percent),
            "EMAIL" => Ok(Self::Email),
            "PHONE" => Ok(Self::Phone),
            "CPF" => Ok(Self::Cpf),
            "CNPJ" => Ok(Self::Cnpj),
            "OTHER" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

/// Canonical form of a mention for the given type.
pub fn normalize_mention(text: &str, entity_type: EntityType) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match entity_type {
        EntityType::Person | EntityType::Org | EntityType::Gpe | EntityType::Loc => {
            title_case(&collapsed)
        }
        EntityType::Phone | EntityType::Cpf | EntityType::Cnpj => {
            collapsed.chars().filter(|c| c.is_ascii_digit()).collect()
        }
        EntityType::Email => collapsed.to_lowercase(),
        _ => collapsed,
    }
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A merged entity with its evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: EntityId,
    /// Canonical display text (equals `normalized_text`).
    pub text: String,
    pub entity_type: EntityType,
    pub normalized_text: String,
    pub confidence: f64,
    pub documents: BTreeSet<DocumentId>,
    pub frequency: usize,
    pub contexts: Vec<String>,
    pub variations: BTreeSet<String>,
}

impl Entity {
    /// Starts a new merged entity from its first mention.
    pub fn from_mention(
        surface: &str,
        entity_type: EntityType,
        confidence: f64,
        doc_id: DocumentId,
        context: Option<String>,
    ) -> Self {
        let normalized = normalize_mention(surface, entity_type);
        let mut entity = Self {
            entity_id: EntityId::new(),
            text: normalized.clone(),
            entity_type,
            normalized_text: normalized,
            confidence,
            documents: BTreeSet::new(),
            frequency: 0,
            contexts: Vec::new(),
            variations: BTreeSet::new(),
        };
        entity.absorb_mention(surface, doc_id, context);
        entity
    }

    /// Merge key: two mentions belong to the same entity iff their
    /// `(normalized_text, type)` pairs are equal.
    pub fn merge_key(&self) -> (String, EntityType) {
        (self.normalized_text.clone(), self.entity_type)
    }

    /// Folds another mention into this entity, maintaining
    /// `frequency == documents.len()`, the context cap, and the variation set.
    pub fn absorb_mention(&mut self, surface: &str, doc_id: DocumentId, context: Option<String>) {
        self.documents.insert(doc_id);
        self.frequency = self.documents.len();
        self.variations.insert(surface.trim().to_string());
        if let Some(ctx) = context {
            if !ctx.is_empty() && self.contexts.len() < MAX_CONTEXTS {
                self.contexts.push(crate::services::text::truncate(&ctx, 200));
            }
        }
    }
}
