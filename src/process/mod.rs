//! Synchronous process execution
//!
//! [`ProcessRunner`] is the seam through which the image builder reaches the
//! external build tool. [`SystemProcessRunner`] spawns real child processes;
//! [`MockProcessRunner`] records calls and replays scripted exit codes.
//!
//! Failures (spawn errors and non-zero exits) are returned as
//! [`ProcessError`] unless [`RunOptions::ignore_failure`] is set, in which
//! case they are logged with an `[ignored]` prefix and the output is returned.

mod mock;
mod system;
mod types;

pub use mock::{MockOutcome, MockProcessRunner};
pub use system::SystemProcessRunner;
pub use types::{CommandLine, CommandOutput, ProcessError, RunOptions, StdioMode};

/// Executes commands and reports their outcome
pub trait ProcessRunner: Send + Sync {
    /// Runs `command` to completion
    fn run(&self, command: &CommandLine, options: &RunOptions)
        -> Result<CommandOutput, ProcessError>;
}
