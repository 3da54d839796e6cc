//! Toolchain location and its validation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::core::errors::BuildError;
use crate::core::manifest::ToolchainSettings;
use crate::util::diagnostic::suggestions;

/// Where the toolchain root came from, for messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolchainOrigin {
    CommandLine,
    Environment(String),
    ConfigFile,
}

impl std::fmt::Display for ToolchainOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolchainOrigin::CommandLine => write!(f, "--toolchain"),
            ToolchainOrigin::Environment(var) => write!(f, "${}", var),
            ToolchainOrigin::ConfigFile => write!(f, "config file"),
        }
    }
}

/// Candidate toolchain roots, highest precedence first.
#[derive(Debug, Clone, Default)]
pub struct ToolchainLookup {
    pub cli: Option<PathBuf>,
    pub env_value: Option<OsString>,
    pub config: Option<PathBuf>,
}

impl ToolchainLookup {
    /// Read the environment variable named by the manifest from this process.
    pub fn from_process(
        cli: Option<PathBuf>,
        settings: &ToolchainSettings,
        config: Option<PathBuf>,
    ) -> Self {
        ToolchainLookup {
            cli,
            env_value: std::env::var_os(&settings.env),
            config,
        }
    }
}

/// A validated toolchain root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEnvironment {
    root: PathBuf,
    toolchain_file: PathBuf,
    origin: ToolchainOrigin,
}

impl BuildEnvironment {
    /// Resolve and validate the toolchain root.
    ///
    /// Fails if no candidate is set or the chosen path is not an existing
    /// directory. Touches nothing on disk.
    pub fn resolve(
        lookup: &ToolchainLookup,
        settings: &ToolchainSettings,
    ) -> Result<Self, BuildError> {
        let env_value = lookup
            .env_value
            .as_ref()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let (root, origin) = if let Some(path) = &lookup.cli {
            (path.clone(), ToolchainOrigin::CommandLine)
        } else if let Some(path) = env_value {
            (path, ToolchainOrigin::Environment(settings.env.clone()))
        } else if let Some(path) = &lookup.config {
            (path.clone(), ToolchainOrigin::ConfigFile)
        } else {
            return Err(BuildError::config_with_help(
                format!("toolchain root is not set (${} is empty)", settings.env),
                suggestions::SET_TOOLCHAIN,
            ));
        };

        if !root.exists() {
            return Err(BuildError::config_with_help(
                format!(
                    "toolchain root from {} does not exist: {}",
                    origin,
                    root.display()
                ),
                suggestions::SET_TOOLCHAIN,
            ));
        }
        if !root.is_dir() {
            return Err(BuildError::config(format!(
                "toolchain root from {} is not a directory: {}",
                origin,
                root.display()
            )));
        }

        let toolchain_file = root.join(&settings.file);
        if !toolchain_file.is_file() {
            tracing::warn!(
                "CMake toolchain file not found at {}; configure will likely fail",
                toolchain_file.display()
            );
        }

        tracing::info!("using toolchain {} (from {})", root.display(), origin);

        Ok(BuildEnvironment {
            root,
            toolchain_file,
            origin,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// CMake toolchain file inside the root. May not exist.
    pub fn toolchain_file(&self) -> &Path {
        &self.toolchain_file
    }

    pub fn origin(&self) -> &ToolchainOrigin {
        &self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings() -> ToolchainSettings {
        ToolchainSettings::default()
    }

    #[test]
    fn test_unset_is_configuration_error() {
        let err = BuildEnvironment::resolve(&ToolchainLookup::default(), &settings()).unwrap_err();
        assert!(matches!(err, BuildError::Configuration { .. }));
        assert!(err.to_string().contains("$ANDROID_NDK"));
    }

    #[test]
    fn test_empty_env_value_counts_as_unset() {
        let lookup = ToolchainLookup {
            env_value: Some(OsString::new()),
            ..Default::default()
        };
        assert!(BuildEnvironment::resolve(&lookup, &settings()).is_err());
    }

    #[test]
    fn test_missing_path_is_configuration_error() {
        let tmp = TempDir::new().unwrap();
        let lookup = ToolchainLookup {
            env_value: Some(tmp.path().join("nope").into_os_string()),
            ..Default::default()
        };
        let err = BuildEnvironment::resolve(&lookup, &settings()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_file_instead_of_directory() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("ndk.txt");
        std::fs::write(&file, "").unwrap();
        let lookup = ToolchainLookup {
            cli: Some(file),
            ..Default::default()
        };
        let err = BuildEnvironment::resolve(&lookup, &settings()).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_precedence_cli_env_config() {
        let tmp = TempDir::new().unwrap();
        let cli = tmp.path().join("cli");
        let env = tmp.path().join("env");
        let cfg = tmp.path().join("cfg");
        for dir in [&cli, &env, &cfg] {
            std::fs::create_dir(dir).unwrap();
        }

        let mut lookup = ToolchainLookup {
            cli: Some(cli.clone()),
            env_value: Some(env.clone().into_os_string()),
            config: Some(cfg.clone()),
        };
        let resolved = BuildEnvironment::resolve(&lookup, &settings()).unwrap();
        assert_eq!(resolved.root(), cli);
        assert_eq!(resolved.origin(), &ToolchainOrigin::CommandLine);

        lookup.cli = None;
        let resolved = BuildEnvironment::resolve(&lookup, &settings()).unwrap();
        assert_eq!(resolved.root(), env);
        assert_eq!(
            resolved.origin(),
            &ToolchainOrigin::Environment("ANDROID_NDK".to_string())
        );

        lookup.env_value = None;
        let resolved = BuildEnvironment::resolve(&lookup, &settings()).unwrap();
        assert_eq!(resolved.root(), cfg);
        assert_eq!(
            resolved.toolchain_file(),
            cfg.join("build/cmake/android.toolchain.cmake")
        );
    }
}
