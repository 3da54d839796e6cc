//! External tool detection.
//!
//! Optional tools are looked up once, before they are needed, and the result
//! is carried around as a plain availability value. Callers branch on that
//! value instead of running a tool and swallowing its failure.

use std::path::PathBuf;

use crate::core::manifest::ToolSettings;

/// Job count used when the number of CPU cores cannot be determined.
pub const DEFAULT_JOBS: usize = 4;

/// Looks up executables by name.
pub trait ToolProbe {
    fn find(&self, name: &str) -> Option<PathBuf>;
}

/// Probe backed by a `PATH` search.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathProbe;

impl ToolProbe for PathProbe {
    fn find(&self, name: &str) -> Option<PathBuf> {
        match which::which(name) {
            Ok(path) => {
                tracing::debug!("found `{}` at {}", name, path.display());
                Some(path)
            }
            Err(e) => {
                tracing::debug!("`{}` not found: {}", name, e);
                None
            }
        }
    }
}

impl<P: ToolProbe + ?Sized> ToolProbe for &P {
    fn find(&self, name: &str) -> Option<PathBuf> {
        (**self).find(name)
    }
}

/// Availability of a single optional tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available(PathBuf),
    Missing { name: String },
}

impl Availability {
    fn probe(probe: &dyn ToolProbe, name: &str) -> Self {
        match probe.find(name) {
            Some(path) => Availability::Available(path),
            None => Availability::Missing {
                name: name.to_string(),
            },
        }
    }

    /// Path of the tool, if it was found.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Availability::Available(path) => Some(path),
            Availability::Missing { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }
}

/// Optional collaborators detected before a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    /// Directory tree listing tool used by the summary.
    pub tree: Availability,
    /// Archive tool used by the package step.
    pub archiver: Availability,
}

impl Capabilities {
    /// Detect optional tools named in the manifest's tool table.
    pub fn detect(probe: &dyn ToolProbe, tools: &ToolSettings) -> Self {
        let caps = Capabilities {
            tree: Availability::probe(probe, &tools.tree),
            archiver: Availability::probe(probe, &tools.archiver),
        };
        tracing::debug!(?caps, "detected optional tools");
        caps
    }
}

/// Number of parallel jobs to hand to the external build tool.
///
/// An explicit request wins; otherwise the available CPU count is used,
/// falling back to [`DEFAULT_JOBS`] when the OS cannot report it.
pub fn resolve_jobs(requested: Option<usize>) -> usize {
    if let Some(jobs) = requested.filter(|&j| j > 0) {
        return jobs;
    }

    match std::thread::available_parallelism() {
        Ok(n) => n.get(),
        Err(e) => {
            tracing::debug!("could not detect CPU count ({}), using {}", e, DEFAULT_JOBS);
            DEFAULT_JOBS
        }
    }
}
