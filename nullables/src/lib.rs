//! Nullable infrastructure for deterministic testing.
//!
//! External collaborators are abstracted behind traits. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests and in the
//! daemon's simulation mode.

pub mod custody;

pub use custody::NullCustody;
