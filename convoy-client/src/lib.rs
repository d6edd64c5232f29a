//! Convoy remote service clients
//!
//! Typed HTTP clients for the external collaborators the pipeline
//! consumes:
//! - The remote parameter store (hierarchical key/value configuration)
//! - The Git hosting provider (head revision lookup, snapshot download)
//!
//! Both follow the same shape: a base URL plus a configured `reqwest`
//! client, with response handling that converts non-success statuses into
//! typed errors. Absence of a parameter is a typed outcome, not an error.

pub mod error;
mod git;
mod params;

pub use error::{ClientError, Result};
pub use git::GitHostClient;
pub use params::ParameterStoreClient;
