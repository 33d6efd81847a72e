//! # Skirmish Test Utilities
//!
//! Shared testing utilities for the engine crates:
//! - Fixture entity builders
//! - Scenario and terrain builders
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod scenario;

/// Re-export proptest for convenience.
pub use proptest;
