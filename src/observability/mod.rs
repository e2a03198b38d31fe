//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline stages and the RPC client produce:
//!     → logging.rs (structured log events on stderr)
//!     → metrics.rs (counters, histograms via the `metrics` facade)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never free-form key material
//! - stdout is reserved for the command result
//! - Metrics are no-ops until an embedding application installs a recorder

pub mod logging;
pub mod metrics;
