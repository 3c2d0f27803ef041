// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! No-op capability fallbacks.
//!
//! Every optional external tool has a fallback whose `probe()` returns
//! false. The pipeline checks the probe and degrades the corresponding
//! output instead of failing.

use async_trait::async_trait;
use inquest_domain::error::InvestigationError;
use inquest_domain::services::capabilities::{
    NarrativeGenerator, OcrEngine, ReportRenderer, StegoReader,
};
use std::path::Path;

/// OCR fallback: absent engine, no recognized text.
pub struct NoOpOcr;

impl OcrEngine for NoOpOcr {
    fn probe(&self) -> bool {
        false
    }

    fn recognize(&self, _raw: &[u8], _languages: &str) -> Result<(String, f64), InvestigationError> {
        Ok((String::new(), 0.0))
    }
}

/// Steganography fallback: PNG scan skipped.
pub struct NoOpStego;

impl StegoReader for NoOpStego {
    fn probe(&self) -> bool {
        false
    }

    fn reveal(&self, _path: &Path) -> Result<Option<String>, InvestigationError> {
        Ok(None)
    }
}

/// Narrative fallback: no LLM configured, no narrative text.
pub struct NoOpNarrative;

#[async_trait]
impl NarrativeGenerator for NoOpNarrative {
    fn probe(&self) -> bool {
        false
    }

    async fn summarize(&self, _prompt: &str) -> Result<Option<String>, InvestigationError> {
        Ok(None)
    }
}

/// PDF-report fallback: JSON report only.
pub struct NoOpRenderer;

impl ReportRenderer for NoOpRenderer {
    fn probe(&self) -> bool {
        false
    }

    fn render_pdf(
        &self,
        _report_json: &serde_json::Value,
        _path: &Path,
    ) -> Result<(), InvestigationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_probes_report_absent() {
        assert!(!NoOpOcr.probe());
        assert!(!NoOpStego.probe());
        assert!(!NoOpNarrative.probe());
        assert!(!NoOpRenderer.probe());
    }

    #[tokio::test]
    async fn noop_narrative_returns_none() {
        let narrative = NoOpNarrative;
        assert!(narrative.summarize("prompt").await.unwrap().is_none());
    }
}
