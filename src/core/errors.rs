//! Fatal and recoverable error types for a build run.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::phase::Phase;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error raised while setting up or running a multi-target build.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum BuildError {
    /// Missing or invalid configuration. Raised before any target runs.
    #[error("{message}")]
    #[diagnostic(code(multibuild::configuration))]
    Configuration {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// An external phase process returned failure.
    #[error("{phase} failed for target `{target}` ({})", describe_exit(.exit_code))]
    #[diagnostic(
        code(multibuild::phase),
        help("Run `multibuild build --verbose` to see the full tool output")
    )]
    Phase {
        target: String,
        phase: Phase,
        /// `None` if the process was killed or never started.
        exit_code: Option<i32>,
        /// Tail of the tool's stderr, or the spawn error.
        detail: String,
    },

    /// An optional helper tool is not installed. Never fatal.
    #[error("`{tool}` not found; {purpose}")]
    #[diagnostic(code(multibuild::optional_tool), severity(Warning))]
    OptionalToolMissing { tool: String, purpose: String },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated without an exit code".to_string(),
    }
}

impl BuildError {
    /// Shorthand for a configuration error without a help line.
    pub fn config(message: impl Into<String>) -> Self {
        BuildError::Configuration {
            message: message.into(),
            help: None,
        }
    }

    /// Shorthand for a configuration error with a help line.
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        BuildError::Configuration {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BuildError::Configuration { message, help } => {
                let mut diag = Diagnostic::error(message.clone());
                if let Some(help) = help {
                    diag = diag.with_suggestion(help.clone());
                }
                diag
            }

            BuildError::Phase { detail, .. } => {
                let mut diag = Diagnostic::error(self.to_string());
                if !detail.trim().is_empty() {
                    diag = diag.with_context(detail.trim_end().to_string());
                }
                diag.with_suggestion(suggestions::PHASE_FAILED)
                    .with_suggestion(suggestions::RUN_DOCTOR)
            }

            BuildError::OptionalToolMissing { .. } => Diagnostic::warning(self.to_string()),
        }
    }
}
