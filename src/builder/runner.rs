//! Runs the configure, build and install phases of a single target.

use std::time::Instant;

use crate::builder::cmake::CMakeInvocation;
use crate::core::errors::BuildError;
use crate::core::phase::{Phase, PhaseResult, TargetOutcome};
use crate::util::process::CommandRunner;
use crate::util::shell::{format_duration, Shell, Status};

/// Lines of tool stderr kept in a phase error.
const STDERR_TAIL_LINES: usize = 20;

/// Executes one target's phases in order, stopping at the first failure.
pub struct TargetRunner<'a> {
    runner: &'a dyn CommandRunner,
    shell: &'a Shell,
}

impl<'a> TargetRunner<'a> {
    pub fn new(runner: &'a dyn CommandRunner, shell: &'a Shell) -> Self {
        TargetRunner { runner, shell }
    }

    /// Run configure, build and install for `target`.
    pub fn run(
        &self,
        target: &str,
        invocation: &CMakeInvocation,
    ) -> Result<TargetOutcome, BuildError> {
        let mut phases = Vec::with_capacity(Phase::ALL.len());

        for phase in Phase::ALL {
            let result = self.run_phase(target, phase, invocation)?;
            phases.push(result);
        }

        Ok(TargetOutcome {
            target: target.to_string(),
            phases,
            install_dir: invocation.install_dir().to_path_buf(),
        })
    }

    fn run_phase(
        &self,
        target: &str,
        phase: Phase,
        invocation: &CMakeInvocation,
    ) -> Result<PhaseResult, BuildError> {
        let cmd = invocation.command(phase);
        tracing::debug!(abi = target, phase = %phase, "{}", cmd.display_command());

        let spinner = self.shell.spinner(phase_status(phase), target);
        let start = Instant::now();
        let output = self.runner.run(&cmd);
        let duration = start.elapsed();
        spinner.finish();

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                self.emit_phase(target, phase, None, duration.as_millis());
                return Err(BuildError::Phase {
                    target: target.to_string(),
                    phase,
                    exit_code: None,
                    detail: format!("{:#}", e),
                });
            }
        };

        if self.shell.is_verbose() {
            self.shell.print_block(&output.stdout);
            self.shell.print_block(&output.stderr);
        }

        self.emit_phase(target, phase, output.code, duration.as_millis());

        if !output.is_success() {
            tracing::debug!("{} stderr:\n{}", phase, output.stderr);
            return Err(BuildError::Phase {
                target: target.to_string(),
                phase,
                exit_code: output.code,
                detail: output.stderr_tail(STDERR_TAIL_LINES),
            });
        }

        tracing::info!(
            "{} {} finished in {}",
            target,
            phase,
            format_duration(duration)
        );

        Ok(PhaseResult {
            phase,
            exit_code: output.code,
            output: invocation.output_of(phase).to_path_buf(),
            duration,
            stderr_tail: output.stderr_tail(STDERR_TAIL_LINES),
        })
    }

    fn emit_phase(&self, target: &str, phase: Phase, code: Option<i32>, millis: u128) {
        self.shell.json_event(&serde_json::json!({
            "reason": "phase-finished",
            "target": target,
            "phase": phase,
            "exit_code": code,
            "duration_ms": millis as u64,
        }));
    }
}

fn phase_status(phase: Phase) -> Status {
    match phase {
        Phase::Configure => Status::Configuring,
        Phase::Build => Status::Building,
        Phase::Install => Status::Installing,
    }
}
