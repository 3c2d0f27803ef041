// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Store implementations behind the domain repository ports.

pub mod checkpoint_store;
pub mod investigation_store;
pub mod sqlite_ledger;

pub use checkpoint_store::FileCheckpointStore;
pub use investigation_store::FileInvestigationStore;
pub use sqlite_ledger::SqliteLedger;
