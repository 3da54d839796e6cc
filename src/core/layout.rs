//! Filesystem layout of a build run.
//!
//! All paths hang off the invocation root. Per-target paths are partitioned
//! by target name so targets never share a directory.

use std::path::{Path, PathBuf};

use crate::core::manifest::BuildManifest;
use crate::core::target::TargetSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
    output_dir: PathBuf,
    build_prefix: String,
    package_name: String,
    archive_file: String,
}

impl Layout {
    /// A relative `root` is resolved against the current directory, since
    /// external tools run with other working directories.
    pub fn new(root: impl Into<PathBuf>, manifest: &BuildManifest) -> Self {
        Layout {
            root: absolute_root(root.into()),
            output_dir: manifest.output.dir.clone(),
            build_prefix: manifest.output.build_prefix.clone(),
            package_name: manifest.package.name.clone(),
            archive_file: manifest.package.archive_file_name(),
        }
    }

    /// Invocation directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `build-<target>/`: generator and compiler state.
    pub fn build_dir(&self, target: &str) -> PathBuf {
        self.root.join(format!("{}{}", self.build_prefix, target))
    }

    /// Root of all install directories.
    pub fn output_root(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    /// `<output-root>/<target>/`: install prefix of one target.
    pub fn install_dir(&self, target: &str) -> PathBuf {
        self.output_root().join(target)
    }

    /// `<output-root>/<target>/lib/`: installed libraries of one target.
    pub fn lib_dir(&self, target: &str) -> PathBuf {
        self.install_dir(target).join("lib")
    }

    /// Package staging directory.
    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(format!("{}-staging", self.package_name))
    }

    /// Final archive in the invocation directory.
    pub fn archive_path(&self) -> PathBuf {
        self.root.join(&self.archive_file)
    }

    /// Every path a previous run may have left behind for these targets.
    pub fn previous_outputs(&self, targets: &TargetSet) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = targets.iter().map(|t| self.build_dir(&t.name)).collect();
        paths.push(self.output_root());
        paths.push(self.staging_dir());
        paths.push(self.archive_path());
        paths
    }
}

fn absolute_root(root: PathBuf) -> PathBuf {
    let root = if root.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        root
    };
    std::path::absolute(&root).unwrap_or(root)
}
