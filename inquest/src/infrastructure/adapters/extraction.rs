// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Extraction Adapters
//!
//! Format-specific text extractors behind the `TextExtractor` port, plus the
//! registry that dispatches on a MIME sniff and the file extension.
//!
//! PDF handling is tiered: the raw-scan backend recognizes the `%PDF` magic
//! and probes the `/Encrypt` dictionary — encrypted files short-circuit to
//! status `encrypted` so ingestion can emit a cryptography finding. Text
//! extraction from PDF internals, office formats and audio needs external
//! backends; without one the document degrades to `partial` or
//! `unsupported` instead of failing the run.

use inquest_domain::entities::ExtractionStatus;
use inquest_domain::error::InvestigationError;
use inquest_domain::services::capabilities::{Extraction, OcrEngine, TextExtractor};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));

/// Plain text formats read as UTF-8 (lossy).
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn probe(&self) -> bool {
        true
    }

    fn supports(&self, extension: &str) -> bool {
        matches!(extension, ".txt" | ".json")
    }

    fn extract(&self, _path: &Path, raw: &[u8]) -> Result<Extraction, InvestigationError> {
        Ok(Extraction::success(
            String::from_utf8_lossy(raw).into_owned(),
            "plaintext",
        ))
    }

    fn name(&self) -> &'static str {
        "plaintext"
    }
}

/// XML/HTML: strip tags, keep text content.
pub struct MarkupExtractor;

impl TextExtractor for MarkupExtractor {
    fn probe(&self) -> bool {
        true
    }

    fn supports(&self, extension: &str) -> bool {
        matches!(extension, ".xml" | ".html")
    }

    fn extract(&self, _path: &Path, raw: &[u8]) -> Result<Extraction, InvestigationError> {
        let text = String::from_utf8_lossy(raw);
        let stripped = TAG_RE.replace_all(&text, " ").into_owned();
        Ok(Extraction::success(stripped, "markup_strip"))
    }

    fn name(&self) -> &'static str {
        "markup_strip"
    }
}

/// CSV rendered row by row, fields joined with spaces.
pub struct CsvExtractor;

impl TextExtractor for CsvExtractor {
    fn probe(&self) -> bool {
        true
    }

    fn supports(&self, extension: &str) -> bool {
        extension == ".csv"
    }

    fn extract(&self, _path: &Path, raw: &[u8]) -> Result<Extraction, InvestigationError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(raw);
        let mut lines = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| InvestigationError::extraction_failed(format!("csv: {}", e)))?;
            lines.push(record.iter().collect::<Vec<_>>().join(" "));
        }
        Ok(Extraction::success(lines.join("\n"), "csv"))
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}

/// RFC822-style email: subject/from/to/date headers plus the body, HTML
/// bodies tag-stripped.
pub struct EmlExtractor;

impl TextExtractor for EmlExtractor {
    fn probe(&self) -> bool {
        true
    }

    fn supports(&self, extension: &str) -> bool {
        matches!(extension, ".eml" | ".msg")
    }

    fn extract(&self, _path: &Path, raw: &[u8]) -> Result<Extraction, InvestigationError> {
        let text = String::from_utf8_lossy(raw);
        let mut parts = Vec::new();
        let mut author = None;

        let (headers, body) = match text.split_once("\r\n\r\n").or_else(|| text.split_once("\n\n")) {
            Some((h, b)) => (h, b),
            None => (text.as_ref(), ""),
        };
        for line in headers.lines() {
            let lower = line.to_lowercase();
            for prefix in ["subject:", "from:", "to:", "date:"] {
                if lower.starts_with(prefix) {
                    parts.push(line.trim().to_string());
                    if prefix == "from:" {
                        author = Some(line[5..].trim().to_string());
                    }
                }
            }
        }
        let body = if TAG_RE.is_match(body) {
            TAG_RE.replace_all(body, " ").into_owned()
        } else {
            body.to_string()
        };
        if !body.trim().is_empty() {
            parts.push(body.trim().to_string());
        }

        let mut extraction = Extraction::success(parts.join("\n\n"), "email");
        extraction.author = author;
        Ok(extraction)
    }

    fn name(&self) -> &'static str {
        "email"
    }
}

/// PDF raw-scan backend: detects the `%PDF` magic and the `/Encrypt`
/// dictionary. Yields no text itself; an OCR tier may add some.
pub struct PdfExtractor {
    ocr: Arc<dyn OcrEngine>,
    ocr_languages: String,
}

impl PdfExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>, ocr_languages: String) -> Self {
        Self { ocr, ocr_languages }
    }

    fn is_pdf(raw: &[u8]) -> bool {
        raw.starts_with(b"%PDF")
    }

    fn is_encrypted(raw: &[u8]) -> bool {
        raw.windows(8).any(|w| w == b"/Encrypt")
    }
}

impl TextExtractor for PdfExtractor {
    fn probe(&self) -> bool {
        true
    }

    fn supports(&self, extension: &str) -> bool {
        extension == ".pdf"
    }

    fn extract(&self, _path: &Path, raw: &[u8]) -> Result<Extraction, InvestigationError> {
        if !Self::is_pdf(raw) {
            return Ok(Extraction::without_text(
                ExtractionStatus::Failed,
                "pdf_raw_scan",
                Some("not a PDF: missing %PDF header".to_string()),
            ));
        }
        if Self::is_encrypted(raw) {
            return Ok(Extraction::without_text(
                ExtractionStatus::Encrypted,
                "pdf_raw_scan",
                Some("PDF is password-protected".to_string()),
            ));
        }
        // Native text tier unavailable in the raw-scan backend; fall through
        // to OCR when an engine is present.
        if self.ocr.probe() {
            let (text, confidence) = self.ocr.recognize(raw, &self.ocr_languages)?;
            if !text.trim().is_empty() {
                let mut extraction = Extraction::success(text, "pdf_ocr");
                extraction.ocr_confidence = confidence;
                return Ok(extraction);
            }
        }
        Ok(Extraction::without_text(
            ExtractionStatus::Partial,
            "pdf_raw_scan",
            Some("no PDF text backend available".to_string()),
        ))
    }

    fn name(&self) -> &'static str {
        "pdf_raw_scan"
    }
}

/// Images go through OCR when an engine is present; otherwise they are kept
/// with empty text and status `partial`.
pub struct ImageExtractor {
    ocr: Arc<dyn OcrEngine>,
    ocr_languages: String,
}

impl ImageExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>, ocr_languages: String) -> Self {
        Self { ocr, ocr_languages }
    }
}

impl TextExtractor for ImageExtractor {
    fn probe(&self) -> bool {
        true
    }

    fn supports(&self, extension: &str) -> bool {
        matches!(extension, ".png" | ".jpg" | ".jpeg")
    }

    fn extract(&self, _path: &Path, raw: &[u8]) -> Result<Extraction, InvestigationError> {
        if self.ocr.probe() {
            let (text, confidence) = self.ocr.recognize(raw, &self.ocr_languages)?;
            let mut extraction = Extraction::success(text, "tesseract_ocr");
            extraction.ocr_confidence = confidence;
            return Ok(extraction);
        }
        Ok(Extraction::without_text(
            ExtractionStatus::Partial,
            "image_skip",
            None,
        ))
    }

    fn name(&self) -> &'static str {
        "image"
    }
}

/// Office and audio formats that need an external backend the raw engine
/// does not bundle.
pub struct BackendlessExtractor {
    extensions: &'static [&'static str],
    method: &'static str,
}

impl BackendlessExtractor {
    pub fn office() -> Self {
        Self {
            extensions: &[".docx", ".doc", ".xlsx", ".xls"],
            method: "office_unavailable",
        }
    }

    pub fn audio() -> Self {
        Self {
            extensions: &[".mp3", ".wav"],
            method: "audio_unavailable",
        }
    }
}

impl TextExtractor for BackendlessExtractor {
    fn probe(&self) -> bool {
        false
    }

    fn supports(&self, extension: &str) -> bool {
        self.extensions.contains(&extension)
    }

    fn extract(&self, _path: &Path, _raw: &[u8]) -> Result<Extraction, InvestigationError> {
        Ok(Extraction::without_text(
            ExtractionStatus::Unsupported,
            self.method,
            Some("no extraction backend installed for this format".to_string()),
        ))
    }

    fn name(&self) -> &'static str {
        self.method
    }
}

/// Dispatches extraction by MIME sniff and extension.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    /// Registry with the built-in backends. PDF sniffing wins over the
    /// extension so a mislabeled PDF is still treated as one.
    pub fn with_builtins(ocr: Arc<dyn OcrEngine>, ocr_languages: &str) -> Self {
        Self {
            extractors: vec![
                Box::new(PdfExtractor::new(Arc::clone(&ocr), ocr_languages.to_string())),
                Box::new(PlainTextExtractor),
                Box::new(MarkupExtractor),
                Box::new(CsvExtractor),
                Box::new(EmlExtractor),
                Box::new(ImageExtractor::new(ocr, ocr_languages.to_string())),
                Box::new(BackendlessExtractor::office()),
                Box::new(BackendlessExtractor::audio()),
            ],
        }
    }

    /// Extracts text, dispatching on the `%PDF` sniff first and the lowercase
    /// extension second. Unknown extensions yield status `unsupported`.
    pub fn extract(&self, path: &Path, raw: &[u8], extension: &str) -> Extraction {
        let chosen = if PdfExtractor::is_pdf(raw) {
            self.extractors.iter().find(|e| e.supports(".pdf"))
        } else {
            self.extractors.iter().find(|e| e.supports(extension))
        };
        let Some(extractor) = chosen else {
            return Extraction::without_text(
                ExtractionStatus::Unsupported,
                "no_extractor",
                Some(format!("no extractor for {}", extension)),
            );
        };
        match extractor.extract(path, raw) {
            Ok(extraction) => extraction,
            Err(e) => Extraction::without_text(
                ExtractionStatus::Failed,
                extractor.name(),
                Some(e.to_string()),
            ),
        }
    }
}
