//! Artifact hand-off types
//!
//! An artifact is a named, immutable handle to a bundle of files produced
//! by one stage and consumed by later stages. Two named artifacts exist in
//! this system: the source snapshot and the synthesized deployment bundle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Name of the source snapshot artifact
pub const SOURCE_OUTPUT: &str = "SourceOutput";

/// Name of the synthesized deployment bundle artifact
pub const ASSEMBLY_OUTPUT: &str = "AssemblyOutput";

/// A named handle to a bundle of files within the run workspace
///
/// Exactly one stage produces an artifact; consumption never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    /// Filesystem location of the bundle
    pub location: PathBuf,
    /// Stage that produced the artifact
    pub produced_by: String,
}

/// Reference to a published container image
///
/// The tag is the source revision the image was built from, which makes
/// every deployed image traceable to an exact snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    pub registry_uri: String,
    pub tag: String,
}

impl ImageReference {
    pub fn new(registry_uri: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            registry_uri: registry_uri.into(),
            tag: tag.into(),
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.registry_uri, self.tag)
    }
}
