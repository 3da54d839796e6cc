//! Post-build summary of the installed outputs.
//!
//! Purely diagnostic: nothing here can fail the run.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::core::phase::TargetOutcome;
use crate::util::fs::list_files;
use crate::util::process::{CommandRunner, ProcessBuilder};
use crate::util::shell::format_duration;
use crate::util::tools::Availability;

/// How the recursive listing was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSource {
    /// Output of the `tree` tool.
    Tree,
    /// Plain directory walk.
    Walk,
}

/// Human-readable summary of a successful run.
#[derive(Debug, Clone)]
pub struct Summary {
    pub output_root: PathBuf,
    pub listing: String,
    pub source: ListingSource,
}

impl Summary {
    /// Render the per-target table followed by the listing.
    pub fn render(&self, outcomes: &[TargetOutcome]) -> String {
        let mut out = String::new();

        out.push_str("Build summary:\n");
        for outcome in outcomes {
            let timings: Vec<String> = outcome
                .phases
                .iter()
                .map(|p| format!("{} {}", p.phase, format_duration(p.duration)))
                .collect();
            let _ = writeln!(
                out,
                "  {:<12} {}  ({})",
                outcome.target,
                outcome.install_dir.display(),
                timings.join(", ")
            );
        }

        let _ = writeln!(out, "\nOutput directory: {}", self.output_root.display());
        out.push_str(&self.listing);
        if !self.listing.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

/// Produce the listing of `output_root`, preferring the `tree` tool.
///
/// Falls back to a directory walk when `tree` is missing, cannot be run,
/// or exits non-zero.
pub fn summarize(runner: &dyn CommandRunner, tree: &Availability, output_root: &Path) -> Summary {
    if let Some(path) = tree.path() {
        let cmd = ProcessBuilder::new(path).arg(output_root);
        match runner.run(&cmd) {
            Ok(output) if output.is_success() => {
                return Summary {
                    output_root: output_root.to_path_buf(),
                    listing: output.stdout,
                    source: ListingSource::Tree,
                };
            }
            Ok(output) => {
                tracing::debug!("`{}` exited with {:?}, walking instead", cmd, output.code);
            }
            Err(e) => {
                tracing::debug!("could not run `{}`: {:#}", cmd, e);
            }
        }
    } else {
        tracing::debug!("no tree tool, walking {}", output_root.display());
    }

    Summary {
        output_root: output_root.to_path_buf(),
        listing: walk_listing(output_root),
        source: ListingSource::Walk,
    }
}

fn walk_listing(root: &Path) -> String {
    let files = list_files(root);
    if files.is_empty() {
        return "  (no files)\n".to_string();
    }

    let mut listing = String::new();
    for file in files {
        let _ = writeln!(listing, "  {}", file.display());
    }
    listing
}
