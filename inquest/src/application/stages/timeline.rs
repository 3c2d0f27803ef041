// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Timeline Stage
//!
//! Extracts date mentions with a fixed pattern set (ISO, DD/MM/YYYY,
//! DD-MM-YYYY, Portuguese and English long forms), builds one event per
//! match with a ±80-character description window, infers the event type from
//! description keywords, attaches entities whose surface text appears in the
//! description, sorts chronologically (undated last), and flags days with
//! two or more events as possible duplicates.

use crate::application::stages::{InvestigationStage, StageContext};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use inquest_domain::aggregates::InvestigationState;
use inquest_domain::entities::{EventType, TemporalAnomaly, TimelineEvent};
use inquest_domain::entities::timeline_event::DEFAULT_TIMESTAMP_CONFIDENCE;
use inquest_domain::error::InvestigationError;
use inquest_domain::services::text;
use inquest_domain::value_objects::DocumentId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

const DESCRIPTION_MARGIN: usize = 80;
const MAX_EVENT_ENTITIES: usize = 10;

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("iso regex"));
static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}/\d{2}/\d{4}").expect("slash regex"));
static DASH_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{2}-\d{2}-\d{4}").expect("dash regex"));
static PT_LONG_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d{1,2})\s+de\s+(janeiro|fevereiro|março|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro)\s+de\s+(\d{4})",
    )
    .expect("pt long regex")
});
static EN_LONG_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2}),?\s+(\d{4})",
    )
    .expect("en long regex")
});

fn pt_month(name: &str) -> Option<u32> {
    let months = [
        "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
        "outubro", "novembro", "dezembro",
    ];
    months
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name) || *m == name.to_lowercase())
        .map(|i| i as u32 + 1)
}

fn en_month(name: &str) -> Option<u32> {
    let months = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];
    months
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

/// One date mention: resolved timestamp plus its span.
struct DateMatch {
    timestamp: DateTime<Utc>,
    start: usize,
    end: usize,
}

fn to_utc(date: NaiveDate) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0).expect("midnight"), Utc)
}

fn extract_dates(doc_text: &str) -> Vec<DateMatch> {
    let mut found = Vec::new();

    for m in ISO_DATE.find_iter(doc_text) {
        if let Ok(date) = NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d") {
            found.push(DateMatch {
                timestamp: to_utc(date),
                start: m.start(),
                end: m.end(),
            });
        }
    }
    for m in SLASH_DATE.find_iter(doc_text) {
        if let Ok(date) = NaiveDate::parse_from_str(m.as_str(), "%d/%m/%Y") {
            found.push(DateMatch {
                timestamp: to_utc(date),
                start: m.start(),
                end: m.end(),
            });
        }
    }
    for m in DASH_DATE.find_iter(doc_text) {
        if let Ok(date) = NaiveDate::parse_from_str(m.as_str(), "%d-%m-%Y") {
            found.push(DateMatch {
                timestamp: to_utc(date),
                start: m.start(),
                end: m.end(),
            });
        }
    }
    for captures in PT_LONG_DATE.captures_iter(doc_text) {
        let full = captures.get(0).expect("match");
        let day: u32 = captures[1].parse().unwrap_or(0);
        let year: i32 = captures[3].parse().unwrap_or(0);
        if let Some(month) = pt_month(&captures[2]) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                found.push(DateMatch {
                    timestamp: to_utc(date),
                    start: full.start(),
                    end: full.end(),
                });
            }
        }
    }
    for captures in EN_LONG_DATE.captures_iter(doc_text) {
        let full = captures.get(0).expect("match");
        let day: u32 = captures[2].parse().unwrap_or(0);
        let year: i32 = captures[3].parse().unwrap_or(0);
        if let Some(month) = en_month(&captures[1]) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                found.push(DateMatch {
                    timestamp: to_utc(date),
                    start: full.start(),
                    end: full.end(),
                });
            }
        }
    }
    found
}

/// Stage 6: timeline reconstruction.
pub struct TimelineStage;

impl TimelineStage {
    fn entities_in_description(
        state: &InvestigationState,
        doc_id: &DocumentId,
        description: &str,
    ) -> Vec<String> {
        let lowered = description.to_lowercase();
        let mut found = Vec::new();
        for entity in state.entities.values() {
            if found.len() >= MAX_EVENT_ENTITIES {
                break;
            }
            if !entity.documents.contains(doc_id) {
                continue;
            }
            if !entity.text.is_empty()
                && lowered.contains(&entity.text.to_lowercase())
                && !found.contains(&entity.text)
            {
                found.push(entity.text.clone());
            }
        }
        found
    }
}

#[async_trait]
impl InvestigationStage for TimelineStage {
    fn name(&self) -> &'static str {
        "timeline"
    }

    fn step_label(&self) -> &'static str {
        "timeline"
    }

    async fn run(
        &self,
        state: &mut InvestigationState,
        _ctx: &StageContext,
    ) -> Result<(), InvestigationError> {
        let mut event_counter = 0usize;
        let mut events: Vec<TimelineEvent> = Vec::new();

        for (doc_id, doc_text) in &state.extracted_text {
            if doc_text.is_empty() {
                continue;
            }
            for date_match in extract_dates(doc_text) {
                event_counter += 1;
                let description = text::truncate(
                    text::context_window(
                        doc_text,
                        date_match.start,
                        date_match.end,
                        DESCRIPTION_MARGIN,
                    )
                    .trim(),
                    200,
                );
                let event_type = EventType::infer(&description);
                let entities = Self::entities_in_description(state, doc_id, &description);
                let suffix = &Uuid::new_v4().simple().to_string()[..6];
                events.push(TimelineEvent {
                    event_id: format!("ev_{}_{}", event_counter, suffix),
                    timestamp: Some(date_match.timestamp),
                    timestamp_confidence: DEFAULT_TIMESTAMP_CONFIDENCE,
                    description,
                    entities_involved: entities,
                    source_doc_ids: vec![doc_id.clone()],
                    date: Some(date_match.timestamp.format("%Y-%m-%d").to_string()),
                    event_type,
                });
            }
        }

        events.sort_by(TimelineEvent::chronological);

        // Duplicate-date anomalies at day resolution
        let mut by_day: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for event in &events {
            if let Some(day) = event.day_key() {
                by_day.entry(day).or_default().push(event.event_id.clone());
            }
        }
        let mut anomalies = Vec::new();
        for (day, event_ids) in by_day {
            if event_ids.len() >= 2 {
                anomalies.push(TemporalAnomaly {
                    kind: "possible_duplicate_date".to_string(),
                    description: format!("Multiple events on same date {}", day),
                    conflicting_events: event_ids,
                    date: day,
                });
            }
        }

        state.timeline = events;
        state.temporal_anomalies = anomalies;
        state.current_step = "timeline_complete".to_string();
        info!(
            "timeline: {} events, anomalies: {}",
            state.timeline.len(),
            state.temporal_anomalies.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_supported_formats() {
        let text_content = "Em 2024-01-15 e depois 20/01/2024, também 05-03-2024, \
                            além de 7 de março de 2024 e January 9, 2024.";
        let dates = extract_dates(text_content);
        assert_eq!(dates.len(), 5);
    }

    #[test]
    fn invalid_calendar_dates_are_dropped() {
        assert!(extract_dates("dia 99/99/2024 inválido").is_empty());
        assert!(extract_dates("data 2024-13-45 inválida").is_empty());
    }

    #[test]
    fn slash_dates_parse_day_first() {
        let dates = extract_dates("prazo: 05/03/2024");
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].timestamp.format("%Y-%m-%d").to_string(), "2024-03-05");
    }

    #[test]
    fn pt_long_form_resolves_month() {
        let dates = extract_dates("assinado em 15 de janeiro de 2024");
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].timestamp.format("%Y-%m-%d").to_string(), "2024-01-15");
    }
}
