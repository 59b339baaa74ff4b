//! # NIGHTSHIFT Shared
//!
//! Common types used by the cycle engine and anything that consumes its output.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - threading primitives
//! - random number generators
//! - the engine itself
//!
//! It is vocabulary only.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod parts;

pub use parts::{PartKind, PartTally};
