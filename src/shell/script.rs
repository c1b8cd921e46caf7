use std::io::Write;
use std::path::Path;

use compio::fs;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::filesystem::Vfs;
use crate::shell::dispatcher::{Outcome, Shell, ShellError};
use crate::shell::prompt::Prompt;

/// How a startup script ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    Completed,
    Exited,
}

/// Runs a startup script line by line.
///
/// Each non-blank line is echoed after the prompt, as if typed, and then
/// executed. The first failing line stops the script.
pub async fn run_script(
    shell: &mut Shell,
    script_path: &Path,
    prompt: &Prompt,
    out: &mut impl Write,
) -> Result<ScriptOutcome, ScriptError> {
    let script_display = script_path.display().to_string();
    debug!("Reading startup script: {}", script_display);
    let bytes = fs::read(script_path).await.context(ReadSnafu {
        script_path: &script_display,
    })?;
    let contents = String::from_utf8_lossy(&bytes);

    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = index + 1;

        let echo = prompt.render(shell.vfs().map(Vfs::pwd));
        writeln!(out, "{echo}{line}").context(OutputSnafu)?;

        match shell
            .execute(line)
            .await
            .context(LineFailedSnafu { line: line_number })?
        {
            Outcome::Output(lines) => {
                for output in lines {
                    writeln!(out, "{output}").context(OutputSnafu)?;
                }
            }
            Outcome::Exit => {
                info!("Startup script requested exit at line {}", line_number);
                return Ok(ScriptOutcome::Exited);
            }
        }
    }

    debug!("Startup script {} completed", script_display);
    Ok(ScriptOutcome::Completed)
}

#[derive(Debug, Snafu)]
pub enum ScriptError {
    #[snafu(display("script: failed to read {}", script_path))]
    ReadError {
        script_path: String,
        source: std::io::Error,
    },
    #[snafu(display("error on line {}: {}", line, source))]
    LineFailedError { line: usize, source: ShellError },
    #[snafu(display("script: failed to write output"))]
    OutputError { source: std::io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::tree::{EntryType, Record, Tree};
    use tempfile::NamedTempFile;

    fn sample_shell() -> Shell {
        let tree = Tree::from_records(vec![
            Record::new("/home", EntryType::Dir, ""),
            Record::new("/home/a.txt", EntryType::File, "aGVsbG8="),
        ])
        .expect("sample tree should build");
        Shell::new(Some(Vfs::new(tree)))
    }

    fn script_file(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        write!(temp_file, "{}", contents).expect("Failed to write to temp file");
        temp_file
    }

    #[compio::test]
    async fn test_script_runs_every_line() {
        let script = script_file("cd /home\n\npwd\ncat a.txt\n");
        let mut shell = sample_shell();
        let mut out = Vec::new();

        let outcome = run_script(&mut shell, script.path(), &Prompt::new("u", "h"), &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, ScriptOutcome::Completed);
        assert_eq!(shell.vfs().map(Vfs::pwd), Some("/home"));
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("cd /home"));
        assert!(printed.contains("/home\n"));
        assert!(printed.contains("hello\n"));
    }

    #[compio::test]
    async fn test_script_stops_at_first_error() {
        let script = script_file("cd /home\ncd missing\ntouch never.txt\n");
        let mut shell = sample_shell();
        let mut out = Vec::new();

        let error = run_script(&mut shell, script.path(), &Prompt::new("u", "h"), &mut out)
            .await
            .unwrap_err();

        match &error {
            ScriptError::LineFailedError { line, .. } => assert_eq!(*line, 2),
            other => panic!("Expected LineFailedError, got {other:?}"),
        }
        assert_eq!(
            error.to_string(),
            "error on line 2: cd: no such file or directory: missing"
        );
        let vfs = shell.vfs().unwrap();
        assert!(vfs.resolve("/home/never.txt").is_err());
    }

    #[compio::test]
    async fn test_script_exit_stops_execution() {
        let script = script_file("exit\ntouch /home/never.txt\n");
        let mut shell = sample_shell();
        let mut out = Vec::new();

        let outcome = run_script(&mut shell, script.path(), &Prompt::new("u", "h"), &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, ScriptOutcome::Exited);
        assert!(shell.vfs().unwrap().resolve("/home/never.txt").is_err());
    }

    #[compio::test]
    async fn test_missing_script() {
        let mut shell = sample_shell();
        let mut out = Vec::new();
        let result = run_script(
            &mut shell,
            Path::new("/this/path/does/not/exist.sh"),
            &Prompt::new("u", "h"),
            &mut out,
        )
        .await;
        assert!(matches!(result, Err(ScriptError::ReadError { .. })));
    }
}
