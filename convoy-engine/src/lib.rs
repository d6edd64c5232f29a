//! Convoy Engine
//!
//! The pipeline itself: configuration resolution, stage implementations,
//! and the orchestrator that wires them into a single ordered workflow.
//!
//! Architecture:
//! - Resolver: merges environment defaults with remote parameter overrides
//! - Stages: source fetch, synthesis, image build, deployment
//! - Orchestrator: validates the stage graph at construction time and
//!   executes it strictly sequentially with artifact hand-off
//! - Seams: parameter store, Git host, image builder, and provisioner are
//!   traits so runs can be exercised against in-memory fakes

pub mod builder;
pub mod container;
pub mod orchestrator;
pub mod provision;
pub mod remote;
pub mod resolver;
pub mod stage;
pub mod stages;
