//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use multibuild::util::shell::ColorChoice;

/// multibuild - build a CMake project for every target ABI and package the result
#[derive(Parser)]
#[command(name = "multibuild")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Enable verbose output (tool output and debug logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Output format for messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    /// Path to the build manifest (default: ./Multibuild.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Arguments for `build` when no subcommand is given
    #[command(flatten)]
    pub build: BuildArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure, build and install every target, then package (default)
    Build(BuildArgs),

    /// List the configured targets and their configure defines
    Targets,

    /// Remove build directories, installed outputs and the archive
    Clean(CleanArgs),

    /// Check the toolchain and external tools
    Doctor,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Clone, Default)]
pub struct BuildArgs {
    /// Toolchain root (overrides the environment variable and config)
    #[arg(long, value_name = "PATH")]
    pub toolchain: Option<PathBuf>,

    /// Build only these targets (repeatable)
    #[arg(long, value_name = "NAME")]
    pub target: Vec<String>,

    /// Number of parallel jobs for the build phase
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Stop after installing; do not create the archive
    #[arg(long)]
    pub no_package: bool,

    /// CMake source directory (overrides the manifest)
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Only list what would be removed
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_build() {
        let cli = Cli::parse_from(["multibuild", "--target", "x86", "-j", "3"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.build.target, ["x86"]);
        assert_eq!(cli.build.jobs, Some(3));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["multibuild", "clean", "--dry-run", "--message-format", "json"]);
        assert_eq!(cli.message_format, MessageFormat::Json);
        assert!(matches!(cli.command, Some(Commands::Clean(CleanArgs { dry_run: true }))));
    }
}
