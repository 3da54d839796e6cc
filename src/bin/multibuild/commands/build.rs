//! `multibuild build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use crate::commands::Session;
use multibuild::builder::environment::ToolchainLookup;
use multibuild::ops::{build, BuildContext, BuildOptions};
use multibuild::util::{PathProbe, Shell, SystemRunner};

pub fn execute(args: BuildArgs, session: Session, shell: &Shell) -> Result<()> {
    let Session {
        root,
        mut manifest,
        config,
    } = session;

    if let Some(source) = args.source {
        manifest.source = source;
    }

    let lookup = ToolchainLookup::from_process(
        args.toolchain,
        &manifest.toolchain,
        config.toolchain.root.clone(),
    );

    // Jobs: CLI > config > None (auto-detect)
    let options = BuildOptions {
        root,
        targets: args.target,
        jobs: args.jobs.or(config.build.jobs),
        no_package: args.no_package,
    };

    let ctx = BuildContext {
        runner: &SystemRunner,
        probe: &PathProbe,
        shell,
    };

    build(&manifest, &lookup, &options, &ctx)?;
    Ok(())
}
