//! multibuild CLI - build a CMake project once per target ABI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};
use commands::Session;
use multibuild::core::BuildError;
use multibuild::util::diagnostic::emit;
use multibuild::util::Shell;

fn main() {
    let cli = Cli::parse();
    let json = cli.message_format == MessageFormat::Json;

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("multibuild=debug")
    } else if cli.quiet || json {
        EnvFilter::new("multibuild=warn")
    } else {
        EnvFilter::new("multibuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color, json);

    if let Err(e) = run(cli, &shell) {
        report_error(&shell, &e);
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    let manifest = cli.manifest;
    let session = || Session::load(manifest.as_deref());

    match cli.command {
        None => commands::build::execute(cli.build, session()?, shell),
        Some(Commands::Build(args)) => commands::build::execute(args, session()?, shell),
        Some(Commands::Targets) => commands::targets::execute(session()?, shell),
        Some(Commands::Clean(args)) => commands::clean::execute(args, session()?, shell),
        Some(Commands::Doctor) => commands::doctor::execute(session()?, shell),
        Some(Commands::Completions(args)) => commands::completions::execute(args),
    }
}

/// Print a fatal error: typed build errors as diagnostics, anything else
/// with its context chain.
fn report_error(shell: &Shell, err: &anyhow::Error) {
    if shell.is_json() {
        shell.error(format!("{:#}", err));
        return;
    }

    match err.downcast_ref::<BuildError>() {
        Some(build_err) if err.chain().count() == 1 => {
            emit(&build_err.to_diagnostic(), shell.use_color());
        }
        _ => eprintln!("error: {:#}", err),
    }
}
