//! Implementation of `multibuild build`.
//!
//! One linear pass: validate the toolchain, select targets, remove previous
//! outputs, run every target's phases in manifest order, then summarize and
//! package. The first phase failure aborts the run; later targets, the
//! summary and the package step never start.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::builder::cmake::CMakeInvocation;
use crate::builder::environment::{BuildEnvironment, ToolchainLookup};
use crate::builder::runner::TargetRunner;
use crate::core::layout::Layout;
use crate::core::manifest::BuildManifest;
use crate::core::phase::TargetOutcome;
use crate::ops::clean::{clean, CleanOptions};
use crate::ops::package::{usage_instructions, PackageOutcome, Packager};
use crate::ops::summary::{summarize, Summary};
use crate::util::process::CommandRunner;
use crate::util::shell::{format_duration, Shell, Status};
use crate::util::tools::{resolve_jobs, Capabilities, ToolProbe};

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Invocation directory; every output path hangs off it.
    pub root: PathBuf,

    /// Specific targets to build (empty = all, in manifest order)
    pub targets: Vec<String>,

    /// Number of parallel jobs for the build phase
    pub jobs: Option<usize>,

    /// Skip the package step
    pub no_package: bool,
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub outcomes: Vec<TargetOutcome>,
    pub summary: Summary,
    pub package: PackageOutcome,
    pub duration: Duration,
}

/// External collaborators of a build.
pub struct BuildContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub probe: &'a dyn ToolProbe,
    pub shell: &'a Shell,
}

/// Run a full multi-target build.
pub fn build(
    manifest: &BuildManifest,
    lookup: &ToolchainLookup,
    options: &BuildOptions,
    ctx: &BuildContext<'_>,
) -> Result<BuildReport> {
    let start = Instant::now();
    let shell = ctx.shell;

    let env = BuildEnvironment::resolve(lookup, &manifest.toolchain)?;
    let targets = manifest.targets.select(&options.targets)?;
    let layout = Layout::new(&options.root, manifest);
    let caps = Capabilities::detect(ctx.probe, &manifest.tools);
    let jobs = resolve_jobs(options.jobs);

    tracing::info!(
        "building {} target(s) with {} job(s): {}",
        targets.len(),
        jobs,
        targets.names().join(", ")
    );

    let removed = clean(&layout, &targets, &CleanOptions::default(), &Shell::quiet())?;
    if !removed.is_empty() {
        shell.status(
            Status::Cleaning,
            format!("{} previous output(s)", removed.len()),
        );
    }

    let runner = TargetRunner::new(ctx.runner, shell);
    let mut outcomes = Vec::with_capacity(targets.len());

    for target in &targets {
        shell.json_event(&serde_json::json!({
            "reason": "target-started",
            "target": target.name,
        }));

        let invocation = CMakeInvocation::new(
            manifest,
            &env,
            target,
            layout.root(),
            layout.build_dir(&target.name),
            layout.install_dir(&target.name),
        )
        .jobs(jobs);

        let outcome = runner.run(&target.name, &invocation)?;

        shell.status(
            Status::Installed,
            format!(
                "{} in {}",
                target.name,
                format_duration(outcome.duration())
            ),
        );
        shell.json_event(&serde_json::json!({
            "reason": "target-finished",
            "target": target.name,
            "install_dir": outcome.install_dir,
            "phases": outcome.phases,
        }));
        outcomes.push(outcome);
    }

    let summary = summarize(ctx.runner, &caps.tree, &layout.output_root());
    shell.print_block(&summary.render(&outcomes));

    let package = if !manifest.package.enabled || options.no_package {
        shell.status(Status::Skipped, "packaging (disabled)");
        PackageOutcome::Disabled
    } else {
        Packager::new(ctx.runner, shell, &manifest.package, &layout)
            .package(&targets, &caps.archiver)
    };

    if let PackageOutcome::Created {
        archive,
        checksum,
        size,
        libraries,
    } = &package
    {
        shell.status(
            Status::Created,
            format!(
                "{} ({} libraries, {} bytes)",
                archive.display(),
                libraries.len(),
                size
            ),
        );
        shell.note(format!("sha256 {}", checksum));
        shell.print_block(&usage_instructions(archive));
        shell.json_event(&serde_json::json!({
            "reason": "package-created",
            "archive": archive,
            "sha256": checksum,
            "size": size,
            "libraries": libraries,
        }));
    }

    let duration = start.elapsed();
    shell.status(
        Status::Finished,
        format!(
            "{} target(s) in {}",
            outcomes.len(),
            format_duration(duration)
        ),
    );
    shell.json_event(&serde_json::json!({
        "reason": "build-finished",
        "success": true,
        "targets": targets.names(),
        "package": package,
        "duration_ms": duration.as_millis() as u64,
    }));

    Ok(BuildReport {
        outcomes,
        summary,
        package,
        duration,
    })
}
