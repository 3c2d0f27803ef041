// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metrics Service
//!
//! In-process Prometheus registry for the engine: documents ingested, stage
//! durations and errors, active investigations, completed runs by verdict.
//! Export endpoints are out of scope; the registry is queryable via
//! [`MetricsService::gather`].

use inquest_domain::error::InvestigationError;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;

#[derive(Clone)]
pub struct MetricsService {
    registry: Arc<Registry>,

    documents_ingested_total: IntCounter,
    stage_duration_seconds: HistogramVec,
    stage_errors_total: IntCounterVec,
    active_investigations: IntGauge,
    investigations_completed_total: IntCounterVec,
}

impl MetricsService {
    pub fn new() -> Result<Self, InvestigationError> {
        let registry = Registry::new();

        let documents_ingested_total = IntCounter::with_opts(
            Opts::new("documents_ingested_total", "Total documents ingested").namespace("inquest"),
        )
        .map_err(|e| InvestigationError::MetricsError(format!("documents_ingested_total: {}", e)))?;

        let stage_duration_seconds = HistogramVec::new(
            HistogramOpts::new("stage_duration_seconds", "Time spent per pipeline stage")
                .namespace("inquest")
                .buckets(vec![0.01, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0]),
            &["stage"],
        )
        .map_err(|e| InvestigationError::MetricsError(format!("stage_duration_seconds: {}", e)))?;

        let stage_errors_total = IntCounterVec::new(
            Opts::new("stage_errors_total", "Stage errors captured by the orchestrator")
                .namespace("inquest"),
            &["stage"],
        )
        .map_err(|e| InvestigationError::MetricsError(format!("stage_errors_total: {}", e)))?;

        let active_investigations = IntGauge::with_opts(
            Opts::new("active_investigations", "Investigations currently running").namespace("inquest"),
        )
        .map_err(|e| InvestigationError::MetricsError(format!("active_investigations: {}", e)))?;

        let investigations_completed_total = IntCounterVec::new(
            Opts::new(
                "investigations_completed_total",
                "Completed investigations by terminal status",
            )
            .namespace("inquest"),
            &["status"],
        )
        .map_err(|e| {
            InvestigationError::MetricsError(format!("investigations_completed_total: {}", e))
        })?;

        registry
            .register(Box::new(documents_ingested_total.clone()))
            .and_then(|_| registry.register(Box::new(stage_duration_seconds.clone())))
            .and_then(|_| registry.register(Box::new(stage_errors_total.clone())))
            .and_then(|_| registry.register(Box::new(active_investigations.clone())))
            .and_then(|_| registry.register(Box::new(investigations_completed_total.clone())))
            .map_err(|e| InvestigationError::MetricsError(format!("register: {}", e)))?;

        Ok(Self {
            registry: Arc::new(registry),
            documents_ingested_total,
            stage_duration_seconds,
            stage_errors_total,
            active_investigations,
            investigations_completed_total,
        })
    }

    pub fn record_documents_ingested(&self, count: u64) {
        self.documents_ingested_total.inc_by(count);
    }

    pub fn observe_stage_duration(&self, stage: &str, seconds: f64) {
        self.stage_duration_seconds.with_label_values(&[stage]).observe(seconds);
    }

    pub fn record_stage_error(&self, stage: &str) {
        self.stage_errors_total.with_label_values(&[stage]).inc();
    }

    pub fn investigation_started(&self) {
        self.active_investigations.inc();
    }

    pub fn investigation_finished(&self, status: &str) {
        self.active_investigations.dec();
        self.investigations_completed_total.with_label_values(&[status]).inc();
    }

    /// Snapshot of all metric families.
    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_register_and_gather() {
        let metrics = MetricsService::new().unwrap();
        metrics.record_documents_ingested(3);
        metrics.observe_stage_duration("ingest_documents", 0.2);
        metrics.record_stage_error("synthesis");
        metrics.investigation_started();
        metrics.investigation_finished("VALID");
        let families = metrics.gather();
        assert!(families.iter().any(|f| f.get_name().contains("documents_ingested_total")));
    }
}
