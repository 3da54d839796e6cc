//! Build phases and their recorded results.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// One step of a target's build pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Configure,
    Build,
    Install,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; 3] = [Phase::Configure, Phase::Build, Phase::Install];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Configure => "configure",
            Phase::Build => "build",
            Phase::Install => "install",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of running one phase for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseResult {
    pub phase: Phase,
    /// Exit code of the external process; `None` if it was killed.
    pub exit_code: Option<i32>,
    /// Where this phase wrote its output (working dir or install dir).
    pub output: PathBuf,
    #[serde(serialize_with = "serialize_millis", rename = "duration_ms")]
    pub duration: Duration,
    /// Last lines the tool wrote to stderr, usually warnings.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr_tail: String,
}

impl PhaseResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// All phase results of one successfully built target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetOutcome {
    pub target: String,
    pub phases: Vec<PhaseResult>,
    pub install_dir: PathBuf,
}

impl TargetOutcome {
    /// Total time spent in external tools for this target.
    pub fn duration(&self) -> Duration {
        self.phases.iter().map(|p| p.duration).sum()
    }
}
