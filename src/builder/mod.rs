//! Per-target CMake driving.
//!
//! This module validates the toolchain, builds the CMake command lines of a
//! target and runs its configure, build and install phases.

pub mod cmake;
pub mod environment;
pub mod runner;

pub use cmake::CMakeInvocation;
pub use environment::{BuildEnvironment, ToolchainLookup, ToolchainOrigin};
pub use runner::TargetRunner;
