//! Remit node: hosts the escrow engine for concurrent callers.
//!
//! Wires the ledger engine to an asset custody backend, loads configuration
//! and snapshots, and keeps operation statistics.

pub mod config;
pub mod error;
pub mod node;

pub use config::NodeConfig;
pub use error::NodeError;
pub use node::LedgerNode;
