//! `multibuild targets` command

use anyhow::Result;

use crate::commands::Session;
use multibuild::builder::cmake::feature_args;
use multibuild::util::Shell;

pub fn execute(session: Session, shell: &Shell) -> Result<()> {
    let manifest = &session.manifest;
    let defines = feature_args(&manifest.features, &manifest.defines);

    if shell.is_json() {
        let targets: Vec<_> = manifest
            .targets
            .iter()
            .map(|t| serde_json::json!({ "name": t.name, "flags": t.flags }))
            .collect();
        shell.json_event(&serde_json::json!({
            "reason": "targets",
            "targets": targets,
            "defines": defines,
        }));
        return Ok(());
    }

    let width = manifest
        .targets
        .iter()
        .map(|t| t.name.len())
        .max()
        .unwrap_or(0);

    for target in &manifest.targets {
        println!(
            "{:<width$}  {}",
            target.name,
            target.flags_string().unwrap_or_default(),
            width = width
        );
    }

    println!();
    println!("Configure defines (all targets):");
    for define in defines {
        println!("  {}", define);
    }

    Ok(())
}
