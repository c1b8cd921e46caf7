use std::io::ErrorKind;
use std::process::Stdio;

use compio::io::compat::AsyncStream;
use compio::process::{ChildStderr, ChildStdout, Command};
use futures::{AsyncBufReadExt, StreamExt, io::BufReader};
use snafu::{ResultExt, Snafu, ensure};
use tracing::debug;

/// A command line handed to the host operating system unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCommand {
    program: String,
    args: Vec<String>,
}

impl HostCommand {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = String>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Runs the program to completion, forwarding its output line by line.
    pub async fn run(&self) -> Result<(), HostCommandError> {
        debug!("Spawning host command '{}' {:?}", self.program, self.args);
        let mut handle = self.create_command().spawn().map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                HostCommandError::UnknownCommand {
                    program: self.program.clone(),
                }
            } else {
                HostCommandError::SpawnError {
                    program: self.program.clone(),
                    source,
                }
            }
        })?;

        let stdout = handle.stdout.take();
        let stderr = handle.stderr.take();
        let (_, _, status) = futures::join!(
            forward_stdout(stdout, self.program.clone()),
            forward_stderr(stderr, self.program.clone()),
            handle.wait()
        );

        let status = status.context(WaitSnafu {
            program: self.program.clone(),
        })?;
        debug!("Host command '{}' finished with {}", self.program, status);
        ensure!(
            status.success(),
            UnsuccessfulExecutionSnafu {
                program: self.program.clone(),
                status: status.code().unwrap_or(-1),
            }
        );
        Ok(())
    }

    /// Both output streams are piped so they can be forwarded line by line.
    fn create_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        let _ = cmd.stdout(Stdio::piped());
        let _ = cmd.stderr(Stdio::piped());
        cmd
    }
}

async fn forward_stdout(stdout: Option<ChildStdout>, program: String) {
    let Some(stdout) = stdout else { return };
    let reader = BufReader::new(AsyncStream::new(stdout));
    let mut lines = reader.lines();

    while let Some(line_result) = lines.next().await {
        match line_result {
            Ok(line) => println!("{line}"),
            Err(e) => debug!("Error reading stdout of '{}': {}", program, e),
        }
    }
}

async fn forward_stderr(stderr: Option<ChildStderr>, program: String) {
    let Some(stderr) = stderr else { return };
    let reader = BufReader::new(AsyncStream::new(stderr));
    let mut lines = reader.lines();

    while let Some(line_result) = lines.next().await {
        match line_result {
            Ok(line) => eprintln!("{line}"),
            Err(e) => debug!("Error reading stderr of '{}': {}", program, e),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum HostCommandError {
    #[snafu(display("unknown command: {}", program))]
    UnknownCommand { program: String },
    #[snafu(display("{}: failed to start", program))]
    SpawnError {
        program: String,
        source: std::io::Error,
    },
    #[snafu(display("{}: failed to wait for completion", program))]
    WaitError {
        program: String,
        source: std::io::Error,
    },
    #[snafu(display("{}: exited with status {}", program, status))]
    UnsuccessfulExecution { program: String, status: i32 },
}

#[cfg(all(test, target_family = "unix"))]
mod tests {
    use super::*;

    #[compio::test]
    async fn test_successful_command() {
        let command = HostCommand::new("true", Vec::new());
        assert!(command.run().await.is_ok());
    }

    #[compio::test]
    async fn test_command_with_output() {
        let command = HostCommand::new("echo", vec!["hello".to_string()]);
        assert!(command.run().await.is_ok());
    }

    #[compio::test]
    async fn test_failing_command_reports_status() {
        let command = HostCommand::new("sh", vec!["-c".to_string(), "exit 3".to_string()]);
        match command.run().await {
            Err(HostCommandError::UnsuccessfulExecution { program, status }) => {
                assert_eq!(program, "sh");
                assert_eq!(status, 3);
            }
            other => panic!("Expected UnsuccessfulExecution, got {other:?}"),
        }
    }

    #[compio::test]
    async fn test_unknown_command() {
        let command = HostCommand::new("definitely-not-a-real-program-1f4e", Vec::new());
        let error = command.run().await.unwrap_err();
        assert!(matches!(error, HostCommandError::UnknownCommand { .. }));
        assert_eq!(
            error.to_string(),
            "unknown command: definitely-not-a-real-program-1f4e"
        );
    }
}
