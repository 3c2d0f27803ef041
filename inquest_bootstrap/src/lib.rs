// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Inquest Bootstrap
//!
//! Entry-point concerns for the Inquest investigation engine, kept separate
//! from both the domain and the application layers so that `main` stays a
//! thin composition root:
//!
//! - [`logger`]: a minimal logging abstraction usable before the tracing
//!   subscriber is installed (and in tests, where no subscriber exists).
//! - [`shutdown`]: signal-driven shutdown coordination. The engine checks the
//!   [`shutdown::CancellationToken`] between pipeline stages; cancellation
//!   preserves partial state and never rolls the processing ledger back.

pub mod logger;
pub mod shutdown;

pub use logger::{BootstrapLogger, ConsoleLogger, NoOpLogger};
pub use shutdown::{CancellationToken, ShutdownCoordinator, DEFAULT_GRACE_PERIOD_SECS};
