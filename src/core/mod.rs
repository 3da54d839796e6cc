//! Core data structures for multibuild.
//!
//! This module contains the foundational types used throughout the crate:
//! - Targets and the target table
//! - The immutable build manifest
//! - Output layout on disk
//! - Phases, their results and the error type

pub mod errors;
pub mod layout;
pub mod manifest;
pub mod phase;
pub mod target;

pub use errors::BuildError;
pub use layout::Layout;
pub use manifest::{BuildManifest, MANIFEST_FILE};
pub use phase::{Phase, PhaseResult, TargetOutcome};
pub use target::{Target, TargetSet};
