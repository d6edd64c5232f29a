//! Stage implementations
//!
//! The four stages of the delivery workflow, in their pipeline order:
//! source fetch, synthesis, image build, deployment.

mod build;
mod deploy;
mod source;
mod synth;

pub use build::BuildStage;
pub use deploy::DeployStage;
pub use source::SourceStage;
pub use synth::SynthStage;
