//! Android archive assembly.
//!
//! Lays out a staging directory that mirrors the `.aar` structure and hands
//! it to the external `zip` tool:
//!
//! ```text
//! <name>-staging/
//!   AndroidManifest.xml
//!   R.txt
//!   classes.jar
//!   jni/<target>/*.so
//! ```
//!
//! Packaging never fails a run: a missing or failing archiver, or an I/O
//! error while staging or hashing, demotes it to a warning.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::errors::BuildError;
use crate::core::layout::Layout;
use crate::core::manifest::PackageSettings;
use crate::core::target::TargetSet;
use crate::util::fs::{
    ensure_dir, file_size, glob_files, remove_dir_all_if_exists, remove_file_if_exists,
    write_string,
};
use crate::util::hash::sha256_file;
use crate::util::process::{CommandRunner, ProcessBuilder};
use crate::util::shell::{Shell, Status};
use crate::util::tools::Availability;

/// Result of the package step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum PackageOutcome {
    /// Archive written.
    Created {
        archive: PathBuf,
        checksum: String,
        size: u64,
        /// Library paths inside the archive, e.g. `jni/x86/libllama.so`.
        libraries: Vec<PathBuf>,
    },
    /// Packaging was attempted but could not complete. Not a failure.
    Skipped { reason: String },
    /// Packaging turned off.
    Disabled,
}

/// Staging directory contents, ready for compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staging {
    pub dir: PathBuf,
    /// Copied libraries, relative to `dir`.
    pub libraries: Vec<PathBuf>,
    /// Targets that had no library files.
    pub empty_targets: Vec<String>,
}

/// Assembles the archive from the installed libraries of every target.
pub struct Packager<'a> {
    runner: &'a dyn CommandRunner,
    shell: &'a Shell,
    settings: &'a PackageSettings,
    layout: &'a Layout,
}

impl<'a> Packager<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        shell: &'a Shell,
        settings: &'a PackageSettings,
        layout: &'a Layout,
    ) -> Self {
        Packager {
            runner,
            shell,
            settings,
            layout,
        }
    }

    /// Stage and compress. Only call once every target has installed.
    pub fn package(&self, targets: &TargetSet, archiver: &Availability) -> PackageOutcome {
        match self.try_package(targets, archiver) {
            Ok(outcome) => outcome,
            Err(e) => self.skip(format!("{:#}", e)),
        }
    }

    fn try_package(&self, targets: &TargetSet, archiver: &Availability) -> Result<PackageOutcome> {
        let staging = self.stage(targets)?;
        for target in &staging.empty_targets {
            self.shell.warn(format!(
                "no shared libraries installed for `{}`; jni/{}/ is empty",
                target, target
            ));
        }

        let archive = self.layout.archive_path();
        remove_file_if_exists(&archive)?;

        let Some(zip) = archiver.path() else {
            let err = BuildError::OptionalToolMissing {
                tool: self.archiver_name(archiver),
                purpose: format!(
                    "archive not created, staged files left in {}",
                    staging.dir.display()
                ),
            };
            return Ok(self.skip(err.to_string()));
        };

        self.shell.status(Status::Packaging, archive.display());
        let cmd = ProcessBuilder::new(zip)
            .cwd(&staging.dir)
            .arg("-r")
            .arg("-q")
            .arg(&archive)
            .arg(".");
        tracing::debug!("{}", cmd.display_command());

        let output = match self.runner.run(&cmd) {
            Ok(output) => output,
            Err(e) => return Ok(self.skip(format!("could not run archiver: {:#}", e))),
        };
        if !output.is_success() {
            return Ok(self.skip(format!(
                "archiver exited with {}: {}",
                output
                    .code
                    .map_or_else(|| "a signal".to_string(), |c| format!("code {}", c)),
                output.stderr_tail(5)
            )));
        }
        if !archive.is_file() {
            return Ok(self.skip(format!(
                "archiver succeeded but {} was not written",
                archive.display()
            )));
        }

        let checksum = sha256_file(&archive)?;
        let size = file_size(&archive);
        tracing::info!("created {} ({} bytes, sha256 {})", archive.display(), size, checksum);

        Ok(PackageOutcome::Created {
            archive,
            checksum,
            size,
            libraries: staging.libraries,
        })
    }

    /// Recreate the staging directory from the install directories.
    pub fn stage(&self, targets: &TargetSet) -> Result<Staging> {
        let dir = self.layout.staging_dir();
        remove_dir_all_if_exists(&dir)?;
        ensure_dir(&dir)?;

        write_string(&dir.join("AndroidManifest.xml"), &android_manifest(self.settings))?;
        write_string(&dir.join("R.txt"), "")?;
        write_string(&dir.join("classes.jar"), "")?;

        let patterns: Vec<String> = self
            .settings
            .extensions
            .iter()
            .map(|ext| format!("*.{}", ext.trim_start_matches('.')))
            .collect();

        let mut libraries = Vec::new();
        let mut empty_targets = Vec::new();

        for target in targets {
            let jni = Path::new("jni").join(&target.name);
            ensure_dir(&dir.join(&jni))?;

            let lib_dir = self.layout.lib_dir(&target.name);
            let found = if lib_dir.is_dir() {
                glob_files(&lib_dir, &patterns)?
            } else {
                Vec::new()
            };

            if found.is_empty() {
                empty_targets.push(target.name.clone());
                continue;
            }

            for lib in found {
                let Some(file_name) = lib.file_name() else {
                    continue;
                };
                let rel = jni.join(file_name);
                std::fs::copy(&lib, dir.join(&rel))
                    .with_context(|| format!("failed to copy {} into staging", lib.display()))?;
                libraries.push(rel);
            }
        }

        tracing::debug!(
            "staged {} libraries in {}",
            libraries.len(),
            dir.display()
        );

        Ok(Staging {
            dir,
            libraries,
            empty_targets,
        })
    }

    fn skip(&self, reason: String) -> PackageOutcome {
        self.shell.warn(format!("packaging skipped: {}", reason));
        self.shell.json_event(&serde_json::json!({
            "reason": "package-skipped",
            "message": reason,
        }));
        PackageOutcome::Skipped { reason }
    }

    fn archiver_name(&self, archiver: &Availability) -> String {
        match archiver {
            Availability::Missing { name } => name.clone(),
            Availability::Available(path) => path.display().to_string(),
        }
    }
}

/// `AndroidManifest.xml` declaring the namespace and platform levels.
pub fn android_manifest(settings: &PackageSettings) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="{}">
    <uses-sdk android:minSdkVersion="{}" android:targetSdkVersion="{}" />
</manifest>
"#,
        settings.namespace, settings.min_platform, settings.target_platform
    )
}

/// How to consume the archive from an Android app module.
pub fn usage_instructions(archive: &Path) -> String {
    let file = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "To use it in an Android project:\n  \
         1. copy {file} to app/libs/\n  \
         2. add to app/build.gradle.kts dependencies:\n       \
         implementation(files(\"libs/{file}\"))\n"
    )
}
