//! Convoy Core
//!
//! Core types for the Convoy delivery pipeline.
//!
//! This crate contains:
//! - Domain types: configuration, artifacts, run state, deployment plans
//! - The pipeline error taxonomy
//!
//! No I/O happens here; the engine and clients build on these types.

pub mod domain;
pub mod error;
