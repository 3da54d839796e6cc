//! Environment and toolchain health checks.
//!
//! The `doctor` command performs fast environment checks to verify
//! that everything a build needs is available and properly configured.
//!
//! ## Usage
//!
//! ```bash
//! multibuild doctor           # Quick check
//! multibuild doctor --verbose # Detailed output
//! ```
//!
//! ## Checks Performed
//!
//! - Toolchain root (required)
//! - CMake toolchain file inside the root (optional)
//! - CMake (required)
//! - `tree` and `zip` (optional)
//! - Parallel job count

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::builder::environment::{BuildEnvironment, ToolchainLookup};
use crate::core::manifest::BuildManifest;
use crate::util::process::{CommandRunner, ProcessBuilder};
use crate::util::tools::{resolve_jobs, ToolProbe};

/// Result of a single health check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,

    /// Whether the check passed
    pub passed: bool,

    /// Human-readable status message
    pub message: String,

    /// Path to the tool (if applicable)
    pub path: Option<PathBuf>,

    /// Version string (if applicable)
    pub version: Option<String>,

    /// How long the check took
    #[serde(skip)]
    pub duration: Duration,

    /// Whether this check is required or optional
    pub required: bool,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: true,
            message: message.into(),
            path: None,
            version: None,
            duration: Duration::ZERO,
            required: true,
        }
    }

    /// Create a failing check result.
    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            passed: false,
            ..CheckResult::pass(name, message)
        }
    }

    /// Mark this check as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Summary of all health checks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DoctorReport {
    /// Individual check results
    pub checks: Vec<CheckResult>,

    /// Total time taken
    #[serde(skip)]
    pub total_duration: Duration,

    /// Environment information
    pub environment: BTreeMap<String, String>,
}

impl DoctorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    /// Check if all required checks passed.
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    pub fn required_failed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.required && !c.passed)
            .count()
    }

    pub fn get(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Options for the doctor command.
#[derive(Debug, Clone, Default)]
pub struct DoctorOptions {
    /// Job count from the user configuration.
    pub jobs: Option<usize>,
}

/// Run all checks. Never fails; problems are reported as failed checks.
pub fn doctor(
    manifest: &BuildManifest,
    lookup: &ToolchainLookup,
    options: &DoctorOptions,
    runner: &dyn CommandRunner,
    probe: &dyn ToolProbe,
) -> DoctorReport {
    let start = Instant::now();
    let mut report = DoctorReport::new();

    report
        .environment
        .insert("os".to_string(), std::env::consts::OS.to_string());
    report
        .environment
        .insert("arch".to_string(), std::env::consts::ARCH.to_string());
    report.environment.insert(
        "targets".to_string(),
        manifest.targets.names().join(", "),
    );

    for check in check_toolchain(manifest, lookup) {
        report.add(check);
    }
    report.add(check_cmake(&manifest.tools.cmake, runner, probe));
    report.add(
        check_optional_tool(&manifest.tools.tree, "summary falls back to a plain listing", probe),
    );
    report.add(
        check_optional_tool(&manifest.tools.archiver, "archive will not be created", probe),
    );

    let jobs = resolve_jobs(options.jobs);
    report.add(CheckResult::pass("Jobs", format!("{} parallel job(s)", jobs)).optional());

    report.total_duration = start.elapsed();
    report
}

fn check_toolchain(manifest: &BuildManifest, lookup: &ToolchainLookup) -> Vec<CheckResult> {
    let start = Instant::now();

    let env = match BuildEnvironment::resolve(lookup, &manifest.toolchain) {
        Ok(env) => env,
        Err(e) => {
            let check = CheckResult::fail("Toolchain", e.to_string());
            return vec![check.with_duration(start.elapsed())];
        }
    };

    let root = CheckResult::pass(
        "Toolchain",
        format!("toolchain root from {}", env.origin()),
    )
    .with_path(env.root().to_path_buf())
    .with_duration(start.elapsed());

    let file = env.toolchain_file().to_path_buf();
    let file_check = if file.is_file() {
        CheckResult::pass("Toolchain file", "CMake toolchain file found")
    } else {
        CheckResult::fail(
            "Toolchain file",
            "CMake toolchain file missing; CMake will report it at configure time",
        )
    }
    .with_path(file)
    .optional();

    vec![root, file_check]
}

fn check_cmake(name: &str, runner: &dyn CommandRunner, probe: &dyn ToolProbe) -> CheckResult {
    let start = Instant::now();

    let Some(path) = probe.find(name) else {
        return CheckResult::fail("CMake", format!("`{}` not found in PATH", name))
            .with_duration(start.elapsed());
    };

    let version = match runner.run(&ProcessBuilder::new(&path).arg("--version")) {
        Ok(output) if output.is_success() => output
            .stdout
            .lines()
            .next()
            .unwrap_or("")
            .trim()
            .to_string(),
        _ => "unknown version".to_string(),
    };

    CheckResult::pass("CMake", "CMake is available")
        .with_path(path)
        .with_version(version)
        .with_duration(start.elapsed())
}

fn check_optional_tool(name: &str, consequence: &str, probe: &dyn ToolProbe) -> CheckResult {
    match probe.find(name) {
        Some(path) => CheckResult::pass(name, format!("`{}` is available", name)).with_path(path),
        None => CheckResult::fail(name, format!("`{}` not found; {}", name, consequence)),
    }
    .optional()
}

/// Format the doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    let mut output = String::new();

    output.push_str("Multibuild Doctor\n");
    output.push_str("=================\n\n");

    if verbose {
        output.push_str("Environment:\n");
        for (key, value) in &report.environment {
            output.push_str(&format!("  {}: {}\n", key, value));
        }
        output.push('\n');
    }

    output.push_str("Checks:\n");
    for check in &report.checks {
        let status = if check.passed { "[OK]" } else { "[!!]" };
        let required = if check.required { "" } else { " (optional)" };
        output.push_str(&format!("  {} {}{}\n", status, check.name, required));

        if verbose || !check.passed {
            output.push_str(&format!("      {}\n", check.message));
        }
        if verbose {
            if let Some(path) = &check.path {
                output.push_str(&format!("      Path: {}\n", path.display()));
            }
            if let Some(version) = &check.version {
                output.push_str(&format!("      Version: {}\n", version));
            }
        }
    }
    output.push('\n');

    let failed = report.failed_count();
    let required_failed = report.required_failed_count();
    output.push_str(&format!(
        "Summary: {} passed, {} failed\n",
        report.passed_count(),
        failed
    ));

    if required_failed > 0 {
        output.push_str(&format!(
            "\n{} required check(s) failed. Builds will not succeed.\n",
            required_failed
        ));
    } else if failed > 0 {
        output.push_str(&format!(
            "\nAll required checks passed. {} optional check(s) failed.\n",
            failed
        ));
    } else {
        output.push_str("\nAll checks passed. Ready to build.\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockProbe, MockRunner, Workspace};
    use crate::util::process::ProcessOutput;

    #[test]
    fn test_check_result_optional() {
        let check = CheckResult::fail("zip", "missing").optional();
        assert!(!check.passed);
        assert!(!check.required);
    }

    #[test]
    fn test_doctor_report_optional_failed() {
        let mut report = DoctorReport::new();
        report.add(CheckResult::pass("CMake", "ok"));
        report.add(CheckResult::fail("tree", "missing").optional());

        assert!(report.all_required_passed());
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.required_failed_count(), 0);
    }

    #[test]
    fn test_healthy_environment() {
        let ws = Workspace::new();
        let manifest = BuildManifest::default();
        let lookup = ToolchainLookup {
            cli: Some(ws.toolchain.clone()),
            ..Default::default()
        };
        let runner = MockRunner::new();
        runner.expect_contains(
            "--version",
            ProcessOutput::success("cmake version 3.28.1\n\nCMake suite\n"),
        );
        let probe = MockProbe::with_tools(["cmake", "tree", "zip"]);

        let report = doctor(&manifest, &lookup, &DoctorOptions { jobs: Some(3) }, &runner, &probe);

        assert!(report.all_required_passed());
        assert_eq!(report.failed_count(), 0);
        assert_eq!(
            report.get("CMake").and_then(|c| c.version.as_deref()),
            Some("cmake version 3.28.1")
        );
        assert_eq!(report.get("Jobs").map(|c| c.message.as_str()), Some("3 parallel job(s)"));
        assert!(format_report(&report, false).contains("All checks passed"));
    }

    #[test]
    fn test_missing_toolchain_and_cmake_fail_required_checks() {
        let report = doctor(
            &BuildManifest::default(),
            &ToolchainLookup::default(),
            &DoctorOptions::default(),
            &MockRunner::new(),
            &MockProbe::with_tools(["zip"]),
        );

        assert!(!report.all_required_passed());
        assert!(!report.get("Toolchain").unwrap().passed);
        assert!(!report.get("CMake").unwrap().passed);
        assert!(report.get("zip").unwrap().passed);
        assert!(!report.get("tree").unwrap().required);

        let text = format_report(&report, false);
        assert!(text.contains("[!!] Toolchain"));
        assert!(text.contains("[!!] tree (optional)"));
        assert!(text.contains("required check(s) failed"));
    }

    #[test]
    fn test_missing_toolchain_file_is_reported() {
        let ws = Workspace::new();
        let bare = ws.root().join("bare-ndk");
        std::fs::create_dir(&bare).unwrap();
        let lookup = ToolchainLookup {
            cli: Some(bare),
            ..Default::default()
        };

        let report = doctor(
            &BuildManifest::default(),
            &lookup,
            &DoctorOptions::default(),
            &MockRunner::new(),
            &MockProbe::with_tools(["cmake"]),
        );

        assert!(report.get("Toolchain").unwrap().passed);
        let file = report.get("Toolchain file").unwrap();
        assert!(!file.passed);
        assert!(!file.required);

        let text = format_report(&report, false);
        assert!(text.contains("[!!] Toolchain file (optional)"));
    }
}
