use super::system::settle_failure;
use super::{CommandLine, CommandOutput, ProcessError, ProcessRunner, RunOptions};
use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

/// Scripted outcome for one call to [`MockProcessRunner::run`]
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Exit {
        status: i32,
        stdout: String,
        stderr: String,
    },
    SpawnError(String),
}

impl MockOutcome {
    pub fn success() -> Self {
        Self::exit(0)
    }

    pub fn exit(status: i32) -> Self {
        MockOutcome::Exit {
            status,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockOutcome::Exit {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Process runner that records invocations instead of spawning anything
///
/// Outcomes are consumed in order; once exhausted every call succeeds.
#[derive(Debug, Default)]
pub struct MockProcessRunner {
    outcomes: Mutex<VecDeque<MockOutcome>>,
    invocations: Mutex<Vec<(CommandLine, RunOptions)>>,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(self, outcome: MockOutcome) -> Self {
        self.push_outcome(outcome);
        self
    }

    pub fn push_outcome(&self, outcome: MockOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn invocations(&self) -> Vec<(CommandLine, RunOptions)> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<CommandLine> {
        self.invocations()
            .into_iter()
            .map(|(command, _)| command)
            .collect()
    }
}

impl ProcessRunner for MockProcessRunner {
    fn run(
        &self,
        command: &CommandLine,
        options: &RunOptions,
    ) -> Result<CommandOutput, ProcessError> {
        self.invocations
            .lock()
            .unwrap()
            .push((command.clone(), options.clone()));

        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(MockOutcome::success);

        match outcome {
            MockOutcome::Exit {
                status,
                stdout,
                stderr,
            } => {
                let output = CommandOutput {
                    status: Some(status),
                    stdout,
                    stderr,
                };
                if output.success() {
                    return Ok(output);
                }
                let error = ProcessError::Failed {
                    command: command.to_string(),
                    status: output.status,
                    stderr: output.stderr.clone(),
                };
                settle_failure(error, output, options)
            }
            MockOutcome::SpawnError(message) => {
                let error = ProcessError::Spawn {
                    command: command.to_string(),
                    source: io::Error::new(io::ErrorKind::NotFound, message),
                };
                settle_failure(error, CommandOutput::default(), options)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_invocations() {
        let runner = MockProcessRunner::new();
        let command = CommandLine::program("docker").arg("version");

        runner.run(&command, &RunOptions::default()).unwrap();

        assert_eq!(runner.commands(), vec![command]);
    }

    #[test]
    fn test_outcomes_in_order() {
        let runner = MockProcessRunner::new()
            .with_outcome(MockOutcome::failure(2, "bad"))
            .with_outcome(MockOutcome::SpawnError("missing".to_string()));
        let command = CommandLine::program("tool");

        let first = runner.run(&command, &RunOptions::default()).unwrap_err();
        assert_eq!(first.exit_code(), Some(2));
        assert!(first.to_string().contains("bad"));

        let second = runner.run(&command, &RunOptions::default()).unwrap_err();
        assert!(matches!(second, ProcessError::Spawn { .. }));

        assert!(runner.run(&command, &RunOptions::default()).is_ok());
        assert_eq!(runner.invocations().len(), 3);
    }

    #[test]
    fn test_ignore_failure() {
        let runner = MockProcessRunner::new().with_outcome(MockOutcome::exit(1));
        let output = runner
            .run(
                &CommandLine::program("tool"),
                &RunOptions::default().ignoring_failure(),
            )
            .unwrap();

        assert_eq!(output.status, Some(1));
    }
}
