//! `multibuild clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use crate::commands::Session;
use multibuild::core::Layout;
use multibuild::ops::{clean, CleanOptions};
use multibuild::util::shell::{Shell, Status};

pub fn execute(args: CleanArgs, session: Session, shell: &Shell) -> Result<()> {
    let layout = Layout::new(&session.root, &session.manifest);
    let options = CleanOptions {
        dry_run: args.dry_run,
    };

    let paths = clean(&layout, &session.manifest.targets, &options, shell)?;

    if paths.is_empty() {
        shell.status(Status::Info, "nothing to clean");
    }
    shell.json_event(&serde_json::json!({
        "reason": "clean-finished",
        "dry_run": args.dry_run,
        "paths": paths,
    }));

    Ok(())
}
