//! Command lines, run options and process errors

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

const INDENT: &str = "    | ";

/// A program invocation or a shell script to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
    shell: bool,
}

impl CommandLine {
    /// Spawns `program` directly, without a shell
    pub fn program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            shell: false,
        }
    }

    /// Runs `script` through the platform shell (`/bin/sh -c` or `cmd /C`)
    pub fn shell(script: impl Into<String>) -> Self {
        Self {
            program: script.into(),
            args: Vec::new(),
            shell: true,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends a `key value` pair, e.g. `.flag("-t", "app")`
    pub fn flag(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arg(key).arg(value)
    }

    pub fn get_program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn is_shell(&self) -> bool {
        self.shell
    }

    /// Converts into a ready-to-spawn `std::process::Command`
    pub(crate) fn to_command(&self) -> std::process::Command {
        if self.shell {
            let (shell, shell_args) = platform_shell();
            let mut command = std::process::Command::new(shell);
            command.args(shell_args).arg(self.to_string());
            command
        } else {
            let mut command = std::process::Command::new(&self.program);
            command.args(&self.args);
            command
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn platform_shell() -> (&'static str, &'static [&'static str]) {
    ("/bin/sh", &["-c"])
}

#[cfg(windows)]
fn platform_shell() -> (&'static str, &'static [&'static str]) {
    ("cmd", &["/C"])
}

/// How the child's standard streams are wired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StdioMode {
    /// Child shares the caller's terminal
    #[default]
    Inherit,
    /// stdout and stderr are collected into [`CommandOutput`]
    Capture,
}

/// Options applied to a single process run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Working directory, resolved against the current directory when relative
    pub cwd: Option<PathBuf>,
    /// Extra environment variables layered over the inherited environment
    pub env: BTreeMap<String, String>,
    /// Log failures and return normally instead of erroring
    pub ignore_failure: bool,
    pub stdio: StdioMode,
}

impl RunOptions {
    pub fn captured() -> Self {
        Self {
            stdio: StdioMode::Capture,
            ..Default::default()
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn ignoring_failure(mut self) -> Self {
        self.ignore_failure = true;
        self
    }
}

/// Result of a finished process
///
/// `stdout`/`stderr` are empty when the streams were inherited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process never ran or was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Errors raised while running external commands
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program could not be started
    #[error("Command '{command}' has failed:\n{}", indent_message(&.source.to_string()))]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The program ran and exited unsuccessfully
    #[error("Command '{command}' has failed:\n{}", indent_message(&status_message(.status, .stderr)))]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
}

impl ProcessError {
    /// Exit code of the failed process, if it ran to completion
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessError::Spawn { .. } => None,
            ProcessError::Failed { status, .. } => *status,
        }
    }
}

fn status_message(status: &Option<i32>, stderr: &str) -> String {
    let mut message = match status {
        Some(code) => format!("Status {}", code),
        None => "Terminated by signal".to_string(),
    };
    let stderr = stderr.trim_end();
    if !stderr.is_empty() {
        message.push('\n');
        message.push_str(stderr);
    }
    message
}

fn indent_message(message: &str) -> String {
    message
        .split('\n')
        .map(|line| format!("{}{}", INDENT, line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_display() {
        let command = CommandLine::program("docker")
            .arg("build")
            .flag("-t", "app")
            .arg(".dockercontexts/app");

        assert_eq!(command.to_string(), "docker build -t app .dockercontexts/app");
        assert_eq!(command.get_program(), "docker");
        assert_eq!(command.get_args(), ["build", "-t", "app", ".dockercontexts/app"]);
        assert!(!command.is_shell());
    }

    #[test]
    fn test_shell_command_line() {
        let command = CommandLine::shell("echo").args(["hello", "world"]);
        assert!(command.is_shell());
        assert_eq!(command.to_string(), "echo hello world");
    }

    #[test]
    fn test_run_options_builders() {
        let options = RunOptions::captured()
            .with_cwd("/tmp")
            .with_env("KEY", "value")
            .ignoring_failure();

        assert_eq!(options.stdio, StdioMode::Capture);
        assert_eq!(options.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(options.env.get("KEY").map(String::as_str), Some("value"));
        assert!(options.ignore_failure);
        assert_eq!(RunOptions::default().stdio, StdioMode::Inherit);
    }

    #[test]
    fn test_failed_error_message_is_indented() {
        let error = ProcessError::Failed {
            command: "docker build -t app ctx".to_string(),
            status: Some(1),
            stderr: "step 1 failed\nno such image\n".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Command 'docker build -t app ctx' has failed:\n    | Status 1\n    | step 1 failed\n    | no such image"
        );
        assert_eq!(error.exit_code(), Some(1));
    }

    #[test]
    fn test_spawn_error_message() {
        let error = ProcessError::Spawn {
            command: "missing-tool".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };

        let message = error.to_string();
        assert!(message.starts_with("Command 'missing-tool' has failed:\n    | "));
        assert!(message.contains("No such file or directory"));
        assert_eq!(error.exit_code(), None);
    }

    #[test]
    fn test_signal_status_message() {
        assert_eq!(status_message(&None, ""), "Terminated by signal");
    }

    #[test]
    fn test_command_output_success() {
        let ok = CommandOutput {
            status: Some(0),
            ..Default::default()
        };
        assert!(ok.success());
        assert!(!CommandOutput::default().success());
    }
}
