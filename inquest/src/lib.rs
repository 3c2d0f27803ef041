// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Inquest
//!
//! Investigation intelligence engine: ingest a directory of heterogeneous
//! documents, build an evidence-linked knowledge base, and produce ranked
//! hypotheses, leads, a narrative report and a compliance verdict.
//!
//! The crate is layered:
//!
//! - **application**: the ten analytical stages and the orchestrator that
//!   threads the investigation state through them.
//! - **infrastructure**: configuration, logging, metrics, the activity
//!   stream, the SQLite processing ledger, checkpoint and investigation
//!   stores, graph/vector adapters, the capability fallbacks, and the memory
//!   facade.
//!
//! The domain model lives in `inquest-domain`; entry-point concerns (signal
//! handling, bootstrap logging) live in `inquest-bootstrap`.

pub mod application;
pub mod infrastructure;
