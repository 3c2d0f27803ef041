// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # SQLite Processing Ledger
//!
//! Durable `(doc_hash, investigation_id)` table backing the processing
//! ledger port. Upserts ride SQLite's `ON CONFLICT` on the composite primary
//! key, so concurrent investigations sharing the database file stay
//! transactional without explicit locking. Timestamps are stored as RFC3339
//! text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inquest_domain::error::InvestigationError;
use inquest_domain::repositories::{DocStatus, LedgerEntry, ProcessingLedger};
use sqlx::{Row, SqlitePool};
use std::path::Path;

const TABLE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS doc_processing_ledger (
    doc_hash TEXT NOT NULL,
    investigation_id TEXT NOT NULL,
    status TEXT NOT NULL,
    last_stage TEXT,
    retry_count INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (doc_hash, investigation_id)
)
"#;

/// SQLite-backed processing ledger.
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Wraps an existing pool, creating the table if needed.
    pub async fn new(pool: SqlitePool) -> Result<Self, InvestigationError> {
        sqlx::query(TABLE_SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| InvestigationError::database_error(format!("create ledger table: {}", e)))?;
        Ok(Self { pool })
    }

    /// Opens (or creates) the ledger database at the given path.
    pub async fn from_file(path: &Path) -> Result<Self, InvestigationError> {
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&url)
            .await
            .map_err(|e| InvestigationError::database_error(format!("open ledger db: {}", e)))?;
        Self::new(pool).await
    }

    /// In-memory ledger for tests and ephemeral runs.
    pub async fn in_memory() -> Result<Self, InvestigationError> {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .map_err(|e| InvestigationError::database_error(format!("open in-memory db: {}", e)))?;
        Self::new(pool).await
    }

    async fn upsert(
        &self,
        doc_hash: &str,
        investigation_id: &str,
        status: DocStatus,
        last_stage: &str,
        increment_retry: bool,
    ) -> Result<(), InvestigationError> {
        let now = Utc::now().to_rfc3339();
        let retry_update = if increment_retry {
            "retry_count = retry_count + 1"
        } else {
            "retry_count = retry_count"
        };
        let initial_retry: i64 = if increment_retry { 1 } else { 0 };
        let query = format!(
            r#"
            INSERT INTO doc_processing_ledger
                (doc_hash, investigation_id, status, last_stage, retry_count, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(doc_hash, investigation_id) DO UPDATE SET
                status = excluded.status,
                last_stage = excluded.last_stage,
                {},
                updated_at = excluded.updated_at
            "#,
            retry_update
        );
        sqlx::query(&query)
            .bind(doc_hash)
            .bind(investigation_id)
            .bind(status.to_string())
            .bind(last_stage)
            .bind(initial_retry)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| InvestigationError::database_error(format!("ledger upsert: {}", e)))?;
        Ok(())
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<LedgerEntry, InvestigationError> {
        let status: String = row.get("status");
        let updated_at: String = row.get("updated_at");
        Ok(LedgerEntry {
            doc_hash: row.get("doc_hash"),
            investigation_id: row.get("investigation_id"),
            status: status.parse()?,
            last_stage: row.get("last_stage"),
            retry_count: row.get::<i64, _>("retry_count") as u32,
            updated_at: DateTime::parse_from_rfc3339(&updated_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    InvestigationError::serialization_error(format!("ledger timestamp: {}", e))
                })?,
        })
    }
}

#[async_trait]
impl ProcessingLedger for SqliteLedger {
    async fn mark_start(
        &self,
        doc_hash: &str,
        investigation_id: &str,
    ) -> Result<(), InvestigationError> {
        self.upsert(doc_hash, investigation_id, DocStatus::Processing, "ingest_documents", false)
            .await
    }

    async fn mark_success(
        &self,
        doc_hash: &str,
        investigation_id: &str,
    ) -> Result<(), InvestigationError> {
        self.upsert(doc_hash, investigation_id, DocStatus::Done, "ingest_documents", false)
            .await
    }

    async fn mark_failed(
        &self,
        doc_hash: &str,
        investigation_id: &str,
        last_stage: &str,
    ) -> Result<(), InvestigationError> {
        self.upsert(doc_hash, investigation_id, DocStatus::Failed, last_stage, true)
            .await
    }

    async fn status(
        &self,
        doc_hash: &str,
        investigation_id: &str,
    ) -> Result<Option<DocStatus>, InvestigationError> {
        let row = sqlx::query(
            "SELECT status FROM doc_processing_ledger WHERE doc_hash = ? AND investigation_id = ?",
        )
        .bind(doc_hash)
        .bind(investigation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| InvestigationError::database_error(format!("ledger status: {}", e)))?;
        match row {
            None => Ok(None),
            Some(row) => {
                let status: String = row.get("status");
                Ok(Some(status.parse()?))
            }
        }
    }

    async fn list_pending(
        &self,
        investigation_id: &str,
        max_retries: u32,
    ) -> Result<Vec<LedgerEntry>, InvestigationError> {
        let rows = sqlx::query(
            r#"
            SELECT doc_hash, investigation_id, status, last_stage, retry_count, updated_at
            FROM doc_processing_ledger
            WHERE investigation_id = ? AND status IN (?, ?) AND retry_count < ?
            ORDER BY doc_hash
            "#,
        )
        .bind(investigation_id)
        .bind(DocStatus::Pending.to_string())
        .bind(DocStatus::Failed.to_string())
        .bind(max_retries as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| InvestigationError::database_error(format!("ledger list_pending: {}", e)))?;
        rows.iter().map(Self::row_to_entry).collect()
    }
}
