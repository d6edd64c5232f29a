//! Core domain types
//!
//! These structures are shared between the resolver (which produces the
//! configuration), the stages (which consume it and hand artifacts to each
//! other), and the orchestrator (which tracks run state).

pub mod artifact;
pub mod assembly;
pub mod config;
pub mod deploy;
pub mod run;
pub mod secret;
