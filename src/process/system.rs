use super::{CommandLine, CommandOutput, ProcessError, ProcessRunner, RunOptions, StdioMode};
use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, info, warn};

/// Runs commands as child processes of the current process
///
/// Every call blocks until the child exits. No timeout is applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn run(
        &self,
        command: &CommandLine,
        options: &RunOptions,
    ) -> Result<CommandOutput, ProcessError> {
        let rendered = command.to_string();
        info!(command = %rendered, "executing command");

        let mut process = command.to_command();
        if let Some(cwd) = &options.cwd {
            process.current_dir(resolve_cwd(cwd));
        }
        process.envs(&options.env);

        debug!(cwd = ?options.cwd, stdio = ?options.stdio, "spawning process");

        let result = match options.stdio {
            StdioMode::Inherit => process
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map(|status| CommandOutput {
                    status: status.code(),
                    ..Default::default()
                }),
            StdioMode::Capture => process
                .stdin(Stdio::null())
                .output()
                .map(|output| CommandOutput {
                    status: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }),
        };

        let output = match result {
            Ok(output) => output,
            Err(source) => {
                let error = ProcessError::Spawn {
                    command: rendered,
                    source,
                };
                return settle_failure(error, CommandOutput::default(), options);
            }
        };

        if !output.success() {
            if !output.stderr.is_empty() {
                debug!(stderr = %output.stderr, "command stderr");
            }
            let error = ProcessError::Failed {
                command: rendered,
                status: output.status,
                stderr: output.stderr.clone(),
            };
            return settle_failure(error, output, options);
        }

        if !output.stdout.is_empty() {
            debug!(stdout = %output.stdout.trim_end(), "command output");
        }

        Ok(output)
    }
}

/// Applies the ignore-failure policy shared by every runner
pub(crate) fn settle_failure(
    error: ProcessError,
    output: CommandOutput,
    options: &RunOptions,
) -> Result<CommandOutput, ProcessError> {
    if options.ignore_failure {
        warn!("[ignored] {}", error);
        Ok(output)
    } else {
        Err(error)
    }
}

fn resolve_cwd(cwd: &Path) -> PathBuf {
    if cwd.is_absolute() {
        return cwd.to_path_buf();
    }
    env::current_dir()
        .map(|current| current.join(cwd))
        .unwrap_or_else(|_| cwd.to_path_buf())
}
