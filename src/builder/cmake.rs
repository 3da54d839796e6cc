//! CMake command lines for the configure, build and install phases.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::builder::environment::BuildEnvironment;
use crate::core::manifest::{BuildManifest, FeatureOptions};
use crate::core::phase::Phase;
use crate::core::target::Target;
use crate::util::process::ProcessBuilder;

/// The three CMake invocations of one target.
#[derive(Debug, Clone)]
pub struct CMakeInvocation {
    cmake: PathBuf,
    cwd: PathBuf,
    source_dir: PathBuf,
    build_dir: PathBuf,
    install_dir: PathBuf,
    configure_args: Vec<String>,
    build_type: String,
    jobs: usize,
}

impl CMakeInvocation {
    /// Create the invocation for one target.
    pub fn new(
        manifest: &BuildManifest,
        env: &BuildEnvironment,
        target: &Target,
        cwd: &Path,
        build_dir: PathBuf,
        install_dir: PathBuf,
    ) -> Self {
        let mut configure_args = vec![
            format!(
                "-DCMAKE_TOOLCHAIN_FILE={}",
                env.toolchain_file().display()
            ),
            format!("-DANDROID_ABI={}", target.name),
            format!("-DANDROID_PLATFORM=android-{}", manifest.package.min_platform),
        ];

        if let Some(flags) = target.flags_string() {
            configure_args.push(format!("-DCMAKE_C_FLAGS={}", flags));
            configure_args.push(format!("-DCMAKE_CXX_FLAGS={}", flags));
        }

        configure_args.extend(feature_args(&manifest.features, &manifest.defines));

        CMakeInvocation {
            cmake: PathBuf::from(&manifest.tools.cmake),
            cwd: cwd.to_path_buf(),
            source_dir: cwd.join(&manifest.source),
            build_dir,
            install_dir,
            configure_args,
            build_type: manifest.features.build_type.clone(),
            jobs: 1,
        }
    }

    /// Set the parallel job count for the build phase.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Directory a phase writes its output to.
    pub fn output_of(&self, phase: Phase) -> &Path {
        match phase {
            Phase::Configure | Phase::Build => &self.build_dir,
            Phase::Install => &self.install_dir,
        }
    }

    /// Command line for a phase.
    pub fn command(&self, phase: Phase) -> ProcessBuilder {
        match phase {
            Phase::Configure => self.configure(),
            Phase::Build => self.compile(),
            Phase::Install => self.install(),
        }
    }

    fn base(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake).cwd(&self.cwd)
    }

    fn configure(&self) -> ProcessBuilder {
        self.base()
            .arg("-S")
            .arg(&self.source_dir)
            .arg("-B")
            .arg(&self.build_dir)
            .args(&self.configure_args)
    }

    fn compile(&self) -> ProcessBuilder {
        self.base()
            .arg("--build")
            .arg(&self.build_dir)
            .arg("--config")
            .arg(&self.build_type)
            .arg("-j")
            .arg(self.jobs.to_string())
    }

    fn install(&self) -> ProcessBuilder {
        self.base()
            .arg("--install")
            .arg(&self.build_dir)
            .arg("--prefix")
            .arg(&self.install_dir)
            .arg("--config")
            .arg(&self.build_type)
    }
}

/// `-D` arguments for the feature options followed by the extra defines.
pub fn feature_args(features: &FeatureOptions, extra: &BTreeMap<String, String>) -> Vec<String> {
    features
        .defines()
        .into_iter()
        .map(|(key, value)| format!("-D{}={}", key, value))
        .chain(extra.iter().map(|(key, value)| format!("-D{}={}", key, value)))
        .collect()
}
