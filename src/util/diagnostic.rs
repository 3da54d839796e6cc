//! User-friendly diagnostic messages.
//!
//! Every fatal error is printed with its root cause, any context lines, and
//! the concrete steps that would fix it.

use std::fmt;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when the toolchain root is not configured.
    pub const SET_TOOLCHAIN: &str = "Set the toolchain variable, pass `--toolchain <PATH>`, \
         or add `[toolchain] root` to .multibuild/config.toml";

    /// Suggestion when a phase fails.
    pub const PHASE_FAILED: &str = "Run `multibuild build --verbose` to see the full tool output";

    /// Suggestion when an unknown target is requested.
    pub const UNKNOWN_TARGET: &str = "Run `multibuild targets` to see configured targets";

    /// Suggestion when the environment looks broken.
    pub const RUN_DOCTOR: &str = "Run `multibuild doctor` to check the environment";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    fn with_severity(message: impl Into<String>, severity: Severity) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(message, Severity::Error)
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(message, Severity::Warning)
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        for ctx in &self.context {
            for line in ctx.lines() {
                output.push_str(&format!("   | {}\n", line));
            }
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("build failed for target `x86`")
            .with_context("phase: configure\nexit code: 1")
            .with_suggestion(suggestions::PHASE_FAILED);

        let output = diag.format(false);
        assert!(output.starts_with("error: build failed for target `x86`"));
        assert!(output.contains("   | phase: configure"));
        assert!(output.contains("   | exit code: 1"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. Run `multibuild build --verbose`"));
    }

    #[test]
    fn test_warning_has_no_help_block_without_suggestions() {
        let output = Diagnostic::warning("`zip` not found").format(false);
        assert_eq!(output, "warning: `zip` not found\n");
    }
}
