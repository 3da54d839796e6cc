//! `multibuild doctor` command

use anyhow::Result;

use crate::commands::Session;
use multibuild::builder::environment::ToolchainLookup;
use multibuild::ops::{doctor, format_report, DoctorOptions};
use multibuild::util::{PathProbe, Shell, SystemRunner};

pub fn execute(session: Session, shell: &Shell) -> Result<()> {
    let lookup = ToolchainLookup::from_process(
        None,
        &session.manifest.toolchain,
        session.config.toolchain.root.clone(),
    );
    let options = DoctorOptions {
        jobs: session.config.build.jobs,
    };

    let report = doctor(&session.manifest, &lookup, &options, &SystemRunner, &PathProbe);

    if shell.is_json() {
        shell.json_event(&serde_json::json!({
            "reason": "doctor-report",
            "report": report,
            "success": report.all_required_passed(),
        }));
    } else {
        print!("{}", format_report(&report, shell.is_verbose()));
    }

    // Exit with error code if required checks failed
    if !report.all_required_passed() {
        std::process::exit(1);
    }

    Ok(())
}
