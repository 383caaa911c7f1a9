//! Shared utilities for the Remit ledger.

pub mod logging;
pub mod stats;

pub use logging::{init_logging, LogFormat};
pub use stats::StatsCounter;
