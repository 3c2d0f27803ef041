// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Compliance Report
//!
//! The output of the compliance gate: the overall verdict, the three metrics
//! that drove it (ΔE drift, fidelity, RCF reasoning coherence), the ethical
//! rule violations, bias alerts, and recommendations for anything short of
//! VALID.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic severity scale shared by violations, patterns and anomalies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

/// Verdict of the compliance gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStatus {
    #[serde(rename = "VALID")]
    Valid,
    #[serde(rename = "NEEDS_REVIEW")]
    NeedsReview,
    #[serde(rename = "BLOCKED")]
    Blocked,
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Valid => "VALID",
            Self::NeedsReview => "NEEDS_REVIEW",
            Self::Blocked => "BLOCKED",
        };
        write!(f, "{}", s)
    }
}

/// A violation raised by the ethical rule layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OdosViolation {
    /// `pii_exposure`, `unbacked_entity`, …
    pub violation_type: String,
    pub count: usize,
    pub severity: Severity,
    pub message: String,
}

/// The gate's full report. Present (with `overall_status = None`) from state
/// creation; the gate fills it in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub overall_status: Option<ComplianceStatus>,
    pub fidelity: f64,
    pub rcf: f64,
    pub delta_e: f64,
    #[serde(default)]
    pub violations: Vec<OdosViolation>,
    #[serde(default)]
    pub bias_alerts: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub narrative: Option<String>,
    /// Set by upstream review tooling when critical PII was found in the
    /// report; forces BLOCKED.
    #[serde(default)]
    pub pii_critical: bool,
}
