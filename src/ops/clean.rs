//! Removal of previous build outputs.
//!
//! Used both by `multibuild clean` and as the pre-clean step of every build,
//! so a build never starts on top of stale generator state or libraries.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::layout::Layout;
use crate::core::target::TargetSet;
use crate::util::fs::{remove_dir_all_if_exists, remove_file_if_exists};
use crate::util::shell::{Shell, Status};

/// Options for the clean command.
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// List what would be removed without touching anything.
    pub dry_run: bool,
}

/// Delete every previous output of `targets` that exists.
///
/// Returns the paths that existed (and, unless `dry_run`, were removed), in
/// layout order.
pub fn clean(
    layout: &Layout,
    targets: &TargetSet,
    options: &CleanOptions,
    shell: &Shell,
) -> Result<Vec<PathBuf>> {
    let existing: Vec<PathBuf> = layout
        .previous_outputs(targets)
        .into_iter()
        .filter(|p| p.symlink_metadata().is_ok())
        .collect();

    for path in &existing {
        let shown = path.strip_prefix(layout.root()).unwrap_or(path);
        if options.dry_run {
            shell.status(Status::Info, format!("would remove {}", shown.display()));
            continue;
        }

        if path.is_dir() {
            remove_dir_all_if_exists(path)?;
        } else {
            remove_file_if_exists(path)?;
        }
        tracing::debug!("removed {}", path.display());
        shell.status(Status::Removed, shown.display());
    }

    Ok(existing)
}
