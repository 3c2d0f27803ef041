// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Infrastructure ports: async traits the application layer implements.
//!
//! The domain defines the operations and their contracts; the stores behind
//! them (SQLite, filesystem, in-memory, remote services) are replaceable
//! adapters. Analytics operations on the graph store degrade to empty maps on
//! failure instead of erroring, per the external-interface contract.

mod checkpoint_store;
mod graph_store;
mod investigation_repository;
mod processing_ledger;
mod vector_store;

pub use checkpoint_store::CheckpointStore;
pub use graph_store::{GraphStats, GraphStore, NeighborRow};
pub use investigation_repository::{BatchRecord, InvestigationMeta, InvestigationRepository};
pub use processing_ledger::{DocStatus, LedgerEntry, ProcessingLedger};
pub use vector_store::{QueryHit, VectorStore};
