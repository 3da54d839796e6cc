//! Command implementations

pub mod build;
pub mod clean;
pub mod completions;
pub mod doctor;
pub mod targets;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use multibuild::core::manifest::BuildManifest;
use multibuild::util::config::{global_config_path, load_config, project_config_path};
use multibuild::util::Config;

/// Inputs shared by every command: the invocation directory, its manifest
/// and the merged user configuration.
pub struct Session {
    pub root: PathBuf,
    pub manifest: BuildManifest,
    pub config: Config,
}

impl Session {
    pub fn load(manifest_path: Option<&Path>) -> Result<Self> {
        let root = std::env::current_dir().context("failed to determine current directory")?;

        let manifest = match manifest_path {
            Some(path) => BuildManifest::load(path)?,
            None => BuildManifest::discover(&root)?,
        };

        let config = load_config(global_config_path().as_deref(), &project_config_path(&root));
        tracing::debug!(?config, "loaded configuration");

        Ok(Session {
            root,
            manifest,
            config,
        })
    }
}
