//! multibuild - drive a CMake project once per target architecture
//!
//! This crate validates the cross toolchain, runs configure, build and
//! install for every configured target in order, summarizes the installed
//! outputs and packages the shared libraries into a single archive.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for multibuild unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides mock implementations for process execution
/// and tool lookup.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{BuildError, BuildManifest, Layout, Phase, Target, TargetSet};
pub use crate::ops::{BuildOptions, BuildReport, PackageOutcome};
