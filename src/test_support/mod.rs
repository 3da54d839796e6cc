//! Test utilities and mocks for multibuild unit tests.
//!
//! Provides a [`MockRunner`] standing in for external processes and a
//! [`MockProbe`] standing in for `PATH` lookups, so the whole orchestration
//! can be exercised without CMake, `tree` or `zip` installed.
//!
//! # Example
//!
//! ```rust,ignore
//! let mock = MockRunner::new().with_install_libs(["libllama.so"]);
//! mock.expect_contains("--build", ProcessOutput::failure(2, "boom"));
//! let probe = MockProbe::with_tools(["zip"]);
//! ```

pub mod fixtures;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::util::process::{CommandRunner, ProcessBuilder, ProcessOutput};
use crate::util::tools::ToolProbe;

pub use fixtures::*;

/// Pattern for matching commands in MockRunner.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command contains substring.
    Contains(String),
    /// Match using a regex pattern.
    Regex(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::Contains(s) => cmd.contains(s.as_str()),
            CommandPattern::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(cmd))
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone)]
enum Reaction {
    Output(ProcessOutput),
    SpawnError,
}

#[derive(Debug, Default)]
struct MockState {
    expectations: Vec<(CommandPattern, Reaction)>,
    calls: Vec<String>,
}

/// Mock process runner.
///
/// Unmatched commands succeed with empty output. Side effects of the real
/// tools that later steps depend on are simulated:
/// - `--install ... --prefix <dir>` creates `<dir>/lib/<file>` for each
///   configured install library, plus `<dir>/include/api.h`;
/// - a program named `zip` writes the archive path given after `-q`.
///
/// Side effects only happen for commands that succeed.
#[derive(Debug, Default)]
pub struct MockRunner {
    state: Mutex<MockState>,
    install_libs: Vec<String>,
}

impl MockRunner {
    /// Create a new mock runner with no install libraries.
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// Files the simulated install phase drops into `<prefix>/lib/`.
    pub fn with_install_libs<I, S>(mut self, libs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.install_libs = libs.into_iter().map(Into::into).collect();
        self
    }

    /// Return `output` for commands containing `substring`.
    pub fn expect_contains(&self, substring: &str, output: ProcessOutput) -> &Self {
        self.push(
            CommandPattern::Contains(substring.to_string()),
            Reaction::Output(output),
        )
    }

    /// Return `output` for commands matching `regex`.
    pub fn expect_regex(&self, regex: &str, output: ProcessOutput) -> &Self {
        self.push(
            CommandPattern::Regex(regex.to_string()),
            Reaction::Output(output),
        )
    }

    /// Fail to spawn commands containing `substring`.
    pub fn fail_spawn_contains(&self, substring: &str) -> &Self {
        self.push(
            CommandPattern::Contains(substring.to_string()),
            Reaction::SpawnError,
        )
    }

    fn push(&self, pattern: CommandPattern, reaction: Reaction) -> &Self {
        if let Ok(mut state) = self.state.lock() {
            state.expectations.push((pattern, reaction));
        }
        self
    }

    /// All commands run so far, as display strings.
    pub fn calls(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.calls.clone())
            .unwrap_or_default()
    }

    /// Number of commands run so far.
    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    fn simulate(&self, cmd: &ProcessBuilder) -> Result<()> {
        if let Some(prefix) = cmd.arg_after("--prefix") {
            let lib_dir = Path::new(prefix).join("lib");
            std::fs::create_dir_all(&lib_dir)?;
            for lib in &self.install_libs {
                std::fs::write(lib_dir.join(lib), format!("ELF {}", lib))?;
            }
            let include = Path::new(prefix).join("include");
            std::fs::create_dir_all(&include)?;
            std::fs::write(include.join("api.h"), "int api(void);\n")?;
        }

        let program = cmd
            .get_program()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if program == "zip" {
            if let Some(archive) = cmd.arg_after("-q") {
                std::fs::write(archive, b"PK\x05\x06")?;
            }
        }
        Ok(())
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        let full_cmd = cmd.display_command();

        let reaction = {
            let mut state = match self.state.lock() {
                Ok(state) => state,
                Err(_) => bail!("mock runner state poisoned"),
            };
            state.calls.push(full_cmd.clone());
            state
                .expectations
                .iter()
                .find(|(pattern, _)| pattern.matches(&full_cmd))
                .map(|(_, reaction)| reaction.clone())
        };

        match reaction {
            Some(Reaction::SpawnError) => bail!("failed to spawn `{}`", full_cmd),
            Some(Reaction::Output(output)) => {
                if output.is_success() {
                    self.simulate(cmd)?;
                }
                Ok(output)
            }
            None => {
                self.simulate(cmd)?;
                Ok(ProcessOutput::success(""))
            }
        }
    }
}

/// Mock tool probe: only the listed tools exist.
#[derive(Debug, Clone, Default)]
pub struct MockProbe {
    tools: HashSet<String>,
}

impl MockProbe {
    /// A probe that finds nothing.
    pub fn empty() -> Self {
        MockProbe::default()
    }

    /// A probe that finds exactly these tools, under `/usr/bin`.
    pub fn with_tools<I, S>(tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockProbe {
            tools: tools.into_iter().map(Into::into).collect(),
        }
    }
}

impl ToolProbe for MockProbe {
    fn find(&self, name: &str) -> Option<PathBuf> {
        self.tools
            .contains(name)
            .then(|| PathBuf::from("/usr/bin").join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_pattern() {
        assert!(CommandPattern::Exact("cmake --version".into()).matches("cmake --version"));
        assert!(CommandPattern::Contains("--build".into()).matches("cmake --build b"));
        let word = CommandPattern::Regex(r"-DANDROID_ABI=x86\b".into());
        assert!(word.matches("cmake -DANDROID_ABI=x86 -X"));
        let end = CommandPattern::Regex(r"-DANDROID_ABI=x86$".into());
        assert!(!end.matches("cmake -DANDROID_ABI=x86_64"));
    }

    #[test]
    fn test_mock_runner_records_and_matches() {
        let mock = MockRunner::new();
        mock.expect_contains("fail", ProcessOutput::failure(3, "nope"));

        let ok = mock.run(&ProcessBuilder::new("cmake").arg("ok")).unwrap();
        let bad = mock.run(&ProcessBuilder::new("cmake").arg("fail")).unwrap();

        assert!(ok.is_success());
        assert_eq!(bad.code, Some(3));
        assert_eq!(mock.calls(), vec!["cmake ok", "cmake fail"]);
    }

    #[test]
    fn test_mock_runner_simulates_install() {
        let tmp = TempDir::new().unwrap();
        let prefix = tmp.path().join("out/x86");
        let mock = MockRunner::new().with_install_libs(["libllama.so"]);

        mock.run(
            &ProcessBuilder::new("cmake")
                .arg("--install")
                .arg("b")
                .arg("--prefix")
                .arg(&prefix),
        )
        .unwrap();

        assert!(prefix.join("lib/libllama.so").is_file());
        assert!(prefix.join("include/api.h").is_file());
    }

    #[test]
    fn test_mock_probe() {
        let probe = MockProbe::with_tools(["zip"]);
        assert_eq!(probe.find("zip"), Some(PathBuf::from("/usr/bin/zip")));
        assert_eq!(probe.find("tree"), None);
        assert_eq!(MockProbe::empty().find("zip"), None);
    }
}
