//! # TC Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Message fixtures for handshakes, frames and deaths
//! - Determinism harness replaying message streams
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
