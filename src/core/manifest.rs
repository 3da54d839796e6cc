//! `Multibuild.toml` parsing and the immutable build description.
//!
//! The manifest is optional. Without one, the built-in description is used:
//! the four Android ABIs, the NDK toolchain file, and an `.aar` package.
//!
//! ```toml
//! source = "."
//!
//! [toolchain]
//! env = "ANDROID_NDK"
//!
//! [[target]]
//! name = "arm64-v8a"
//! flags = ["-march=armv8.2-a+dotprod"]
//!
//! [features]
//! shared-libs = true
//! build-type = "Release"
//!
//! [defines]
//! GGML_VULKAN = "OFF"
//!
//! [package]
//! name = "llama-android"
//! min-platform = 28
//! ```

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::errors::BuildError;
use crate::core::target::{Target, TargetSet};
use crate::util::fs::read_to_string;

/// Manifest file name looked up in the invocation directory.
pub const MANIFEST_FILE: &str = "Multibuild.toml";

/// Where to find the toolchain and its CMake integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ToolchainSettings {
    /// Environment variable holding the toolchain root.
    pub env: String,
    /// CMake toolchain file, relative to the toolchain root.
    pub file: PathBuf,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        ToolchainSettings {
            env: "ANDROID_NDK".to_string(),
            file: PathBuf::from("build/cmake/android.toolchain.cmake"),
        }
    }
}

/// Target-invariant configure options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct FeatureOptions {
    pub shared_libs: bool,
    pub examples: bool,
    pub tools: bool,
    pub tests: bool,
    pub server: bool,
    pub common: bool,
    pub curl: bool,
    pub openmp: bool,
    pub llamafile: bool,
    pub build_type: String,
}

impl Default for FeatureOptions {
    fn default() -> Self {
        FeatureOptions {
            shared_libs: true,
            examples: false,
            tools: false,
            tests: false,
            server: false,
            common: true,
            curl: false,
            openmp: false,
            llamafile: false,
            build_type: "Release".to_string(),
        }
    }
}

fn on_off(value: bool) -> String {
    let value = if value { "ON" } else { "OFF" };
    value.to_string()
}

impl FeatureOptions {
    /// CMake cache entries for these options, in a fixed order.
    pub fn defines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("BUILD_SHARED_LIBS", on_off(self.shared_libs)),
            ("LLAMA_BUILD_EXAMPLES", on_off(self.examples)),
            ("LLAMA_BUILD_TOOLS", on_off(self.tools)),
            ("LLAMA_BUILD_TESTS", on_off(self.tests)),
            ("LLAMA_BUILD_SERVER", on_off(self.server)),
            ("LLAMA_BUILD_COMMON", on_off(self.common)),
            ("LLAMA_CURL", on_off(self.curl)),
            ("GGML_OPENMP", on_off(self.openmp)),
            ("GGML_LLAMAFILE", on_off(self.llamafile)),
            ("CMAKE_BUILD_TYPE", self.build_type.clone()),
        ]
    }
}

/// Output directory naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct OutputSettings {
    /// Root of the per-target install directories.
    pub dir: PathBuf,
    /// Prefix of the per-target working directories.
    pub build_prefix: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            dir: PathBuf::from("android-libs"),
            build_prefix: "build-".to_string(),
        }
    }
}

/// Final archive settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct PackageSettings {
    /// Whether to assemble an archive at all.
    pub enabled: bool,
    /// Archive base name; the file is `<name>.aar`.
    pub name: String,
    /// Android package namespace written to the manifest.
    pub namespace: String,
    pub min_platform: u32,
    pub target_platform: u32,
    /// File extensions counted as shared libraries.
    pub extensions: Vec<String>,
}

impl Default for PackageSettings {
    fn default() -> Self {
        PackageSettings {
            enabled: true,
            name: "llama-android".to_string(),
            namespace: "com.example.llama".to_string(),
            min_platform: 28,
            target_platform: 34,
            extensions: vec!["so".to_string()],
        }
    }
}

impl PackageSettings {
    pub fn archive_file_name(&self) -> String {
        format!("{}.aar", self.name)
    }

    fn validate(&self) -> Result<(), BuildError> {
        if self.name.trim().is_empty() || self.name.contains(['/', '\\']) {
            return Err(BuildError::config(format!(
                "invalid package name `{}`",
                self.name
            )));
        }
        if self.min_platform > self.target_platform {
            return Err(BuildError::config(format!(
                "package min-platform ({}) is newer than target-platform ({})",
                self.min_platform, self.target_platform
            )));
        }
        if self.extensions.is_empty() {
            return Err(BuildError::config("package extensions must not be empty"));
        }
        Ok(())
    }
}

/// Names of the external programs to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ToolSettings {
    pub cmake: String,
    pub tree: String,
    pub archiver: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        ToolSettings {
            cmake: "cmake".to_string(),
            tree: "tree".to_string(),
            archiver: "zip".to_string(),
        }
    }
}

/// Raw `Multibuild.toml` layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawManifest {
    source: Option<PathBuf>,
    toolchain: ToolchainSettings,
    target: Option<Vec<Target>>,
    features: FeatureOptions,
    defines: BTreeMap<String, String>,
    output: OutputSettings,
    package: PackageSettings,
    tools: ToolSettings,
}

/// Immutable description of a multi-target build.
///
/// Everything the orchestrator needs to know besides the toolchain location
/// and the command-line overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildManifest {
    /// CMake source directory, relative to the invocation root.
    pub source: PathBuf,
    pub toolchain: ToolchainSettings,
    pub targets: TargetSet,
    pub features: FeatureOptions,
    /// Extra CMake cache entries, appended after the feature options.
    pub defines: BTreeMap<String, String>,
    pub output: OutputSettings,
    pub package: PackageSettings,
    pub tools: ToolSettings,
}

impl Default for BuildManifest {
    fn default() -> Self {
        BuildManifest {
            source: PathBuf::from("."),
            toolchain: ToolchainSettings::default(),
            targets: TargetSet::android_default(),
            features: FeatureOptions::default(),
            defines: BTreeMap::new(),
            output: OutputSettings::default(),
            package: PackageSettings::default(),
            tools: ToolSettings::default(),
        }
    }
}

impl BuildManifest {
    /// Parse a manifest from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let raw: RawManifest = toml::from_str(contents).context("invalid manifest")?;

        let targets = match raw.target {
            Some(targets) => TargetSet::new(targets)?,
            None => TargetSet::android_default(),
        };

        if raw.features.build_type.trim().is_empty() {
            return Err(BuildError::config("features.build-type must not be empty").into());
        }
        if !is_below_root(&raw.output.dir) {
            return Err(BuildError::config(format!(
                "output.dir `{}` must be a relative path below the invocation directory",
                raw.output.dir.display()
            ))
            .into());
        }
        let prefix = &raw.output.build_prefix;
        if prefix.contains(['/', '\\']) || !is_below_root(Path::new(&format!("{}x", prefix))) {
            return Err(BuildError::config(format!(
                "output.build-prefix `{}` must be a plain file name prefix",
                prefix
            ))
            .into());
        }
        raw.package.validate()?;

        Ok(BuildManifest {
            source: raw.source.unwrap_or_else(|| PathBuf::from(".")),
            toolchain: raw.toolchain,
            targets,
            features: raw.features,
            defines: raw.defines,
            output: raw.output,
            package: raw.package,
            tools: raw.tools,
        })
    }

    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;
        Self::parse(&contents).with_context(|| format!("failed to load {}", path.display()))
    }

    /// Load `Multibuild.toml` from `root`, or use the built-in description.
    pub fn discover(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILE);
        if path.exists() {
            tracing::debug!("using manifest {}", path.display());
            Self::load(&path)
        } else {
            tracing::debug!("no {} found, using built-in targets", MANIFEST_FILE);
            Ok(Self::default())
        }
    }

    /// Same manifest with a different target table.
    pub fn with_targets(mut self, targets: TargetSet) -> Self {
        self.targets = targets;
        self
    }
}

/// Non-empty relative path made only of normal components.
fn is_below_root(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}
