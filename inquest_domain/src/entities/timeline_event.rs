// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Timeline Event
//!
//! A dated event reconstructed from a date mention in a document. The event
//! type is inferred from keywords in the surrounding description. Events with
//! no resolvable timestamp sort after all dated events.

use crate::services::datetime_serde;
use crate::value_objects::DocumentId;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Default confidence assigned to a pattern-extracted date.
pub const DEFAULT_TIMESTAMP_CONFIDENCE: f64 = 0.85;
/// Description cap in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Kind of event, inferred from the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "MEETING")]
    Meeting,
    #[serde(rename = "CONTRACT")]
    Contract,
    #[serde(rename = "TRANSACTION")]
    Transaction,
    #[serde(rename = "TRAVEL")]
    Travel,
    #[serde(rename = "SIGNATURE")]
    Signature,
    #[serde(rename = "DELIVERY")]
    Delivery,
    #[serde(rename = "EVENT")]
    Event,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Meeting => "MEETING",
            Self::Contract => "CONTRACT",
            Self::Transaction => "TRANSACTION",
            Self::Travel => "TRAVEL",
            Self::Signature => "SIGNATURE",
            Self::Delivery => "DELIVERY",
            Self::Event => "EVENT",
        };
        write!(f, "{}", s)
    }
}

static EVENT_TYPE_PATTERNS: Lazy<Vec<(Regex, EventType)>> = Lazy::new(|| {
    [
        (r"(?i)\b(?:reunião|meeting|reunir|encontro)\b", EventType::Meeting),
        (r"(?i)\b(?:contrato|contract|acordo|agreement)\b", EventType::Contract),
        (
            r"(?i)\b(?:pagamento|transferência|transfer|payment|transação)\b",
            EventType::Transaction,
        ),
        (r"(?i)\b(?:viagem|travel|deslocamento)\b", EventType::Travel),
        (r"(?i)\b(?:assinatura|signature|assinado)\b", EventType::Signature),
        (r"(?i)\b(?:entrega|delivery)\b", EventType::Delivery),
    ]
    .into_iter()
    .map(|(pat, t)| (Regex::new(pat).expect("event type regex"), t))
    .collect()
});

impl EventType {
    /// Infers the event type from a description by keyword matching;
    /// `EVENT` when nothing matches.
    pub fn infer(description: &str) -> Self {
        for (pattern, event_type) in EVENT_TYPE_PATTERNS.iter() {
            if pattern.is_match(description) {
                return *event_type;
            }
        }
        Self::Event
    }
}

/// A reconstructed event on the investigation timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub event_id: String,
    #[serde(with = "datetime_serde::opt")]
    pub timestamp: Option<DateTime<Utc>>,
    pub timestamp_confidence: f64,
    pub description: String,
    pub entities_involved: Vec<String>,
    pub source_doc_ids: Vec<DocumentId>,
    /// Derived `YYYY-MM-DD` string when the timestamp resolved.
    pub date: Option<String>,
    pub event_type: EventType,
}

impl TimelineEvent {
    /// Chronological ordering: dated events ascending, undated events last.
    pub fn chronological(a: &TimelineEvent, b: &TimelineEvent) -> Ordering {
        match (a.timestamp, b.timestamp) {
            (Some(ta), Some(tb)) => ta.cmp(&tb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.event_id.cmp(&b.event_id),
        }
    }

    /// Day-resolution key used for duplicate-date anomaly detection.
    pub fn day_key(&self) -> Option<String> {
        self.timestamp.map(|t| t.format("%Y-%m-%d").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: &str, ts: Option<DateTime<Utc>>) -> TimelineEvent {
        TimelineEvent {
            event_id: id.to_string(),
            timestamp: ts,
            timestamp_confidence: DEFAULT_TIMESTAMP_CONFIDENCE,
            description: String::new(),
            entities_involved: vec![],
            source_doc_ids: vec![],
            date: ts.map(|t| t.format("%Y-%m-%d").to_string()),
            event_type: EventType::Event,
        }
    }

    #[test]
    fn infer_matches_pt_and_en_keywords() {
        assert_eq!(EventType::infer("Reunião entre diretores"), EventType::Meeting);
        assert_eq!(EventType::infer("contract signed by"), EventType::Contract);
        assert_eq!(EventType::infer("pagamento efetuado"), EventType::Transaction);
        assert_eq!(EventType::infer("nothing relevant"), EventType::Event);
    }

    #[test]
    fn undated_events_sort_last() {
        let dated = event("a", Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()));
        let undated = event("b", None);
        assert_eq!(
            TimelineEvent::chronological(&dated, &undated),
            Ordering::Less
        );
    }

    #[test]
    fn chronological_sorts_ascending() {
        let early = event("a", Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()));
        let late = event("b", Some(Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap()));
        let mut events = vec![late.clone(), early.clone()];
        events.sort_by(TimelineEvent::chronological);
        assert_eq!(events[0].event_id, "a");
    }

    #[test]
    fn day_key_has_day_resolution() {
        let morning = event("a", Some(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()));
        let evening = event("b", Some(Utc.with_ymd_and_hms(2024, 1, 15, 21, 0, 0).unwrap()));
        assert_eq!(morning.day_key(), evening.day_key());
    }
}
