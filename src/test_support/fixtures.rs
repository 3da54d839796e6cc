//! Test fixtures for common test scenarios.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::manifest::{BuildManifest, ToolchainSettings};
use crate::core::target::{Target, TargetSet};

/// A scratch invocation directory with a fake toolchain root inside it.
pub struct Workspace {
    pub dir: TempDir,
    pub toolchain: PathBuf,
}

impl Workspace {
    /// Create a workspace whose toolchain root contains the CMake
    /// toolchain file.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let toolchain = dir.path().join("ndk");
        let file = toolchain.join(ToolchainSettings::default().file);
        std::fs::create_dir_all(file.parent().expect("toolchain file parent"))
            .expect("create toolchain dir");
        std::fs::write(&file, "# toolchain\n").expect("write toolchain file");
        Workspace { dir, toolchain }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A flagless target set with the given names, in order.
pub fn targets(names: &[&str]) -> TargetSet {
    TargetSet::new(
        names
            .iter()
            .map(|name| Target::new(*name, Vec::<String>::new()))
            .collect(),
    )
    .expect("valid target set")
}

/// The default manifest restricted to synthetic targets.
pub fn manifest_with(names: &[&str]) -> BuildManifest {
    BuildManifest::default().with_targets(targets(names))
}
