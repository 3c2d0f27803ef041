// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Report Artifacts
//!
//! Writes the timestamped JSON report (`report_<YYYYMMDD_HHMMSS>.json`) and,
//! when a renderer capability is present, the matching PDF.

use chrono::Utc;
use inquest_domain::aggregates::InvestigationState;
use inquest_domain::error::InvestigationError;
use inquest_domain::services::capabilities::ReportRenderer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Report file writer.
pub struct ReportWriter {
    reports_dir: PathBuf,
    renderer: Arc<dyn ReportRenderer>,
}

impl ReportWriter {
    pub fn new(reports_dir: PathBuf, renderer: Arc<dyn ReportRenderer>) -> Self {
        Self {
            reports_dir,
            renderer,
        }
    }

    /// Serializes the report payload for one run.
    pub fn report_payload(state: &InvestigationState) -> serde_json::Value {
        serde_json::json!({
            "document_count": state.documents.len(),
            "entity_count": state.entities.len(),
            "relationship_count": state.relationships.len(),
            "timeline_events": state.timeline.len(),
            "semantic_links": state.semantic_links.len(),
            "hypotheses": state.hypotheses,
            "leads": state.leads,
            "report_summary": state.report_summary,
        })
    }

    /// Writes `report_<ts>.json` (and `report_<ts>.pdf` when the renderer is
    /// available). Returns the JSON path.
    pub fn write(&self, state: &InvestigationState) -> Result<PathBuf, InvestigationError> {
        std::fs::create_dir_all(&self.reports_dir)
            .map_err(|e| InvestigationError::io_error(format!("reports dir: {}", e)))?;
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let payload = Self::report_payload(state);

        let json_path = self.reports_dir.join(format!("report_{}.json", timestamp));
        std::fs::write(&json_path, serde_json::to_vec_pretty(&payload)?)
            .map_err(|e| InvestigationError::io_error(format!("report write: {}", e)))?;
        info!("report written: {}", json_path.display());

        if self.renderer.probe() {
            let pdf_path = self.reports_dir.join(format!("report_{}.pdf", timestamp));
            self.renderer.render_pdf(&payload, Path::new(&pdf_path))?;
            info!("report PDF written: {}", pdf_path.display());
        }
        Ok(json_path)
    }
}
