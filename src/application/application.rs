use std::io::{BufRead, Write};

use colored::Colorize;
use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::RuntimeConfig;
use crate::filesystem::{SourceError, Vfs};
use crate::shell::{Outcome, Prompt, ScriptError, ScriptOutcome, Shell, run_script};

pub struct Application;

impl Application {
    pub async fn run(runtime_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let runtime_config: RuntimeConfig = runtime_config.into();
        info!(
            "conf: vfs_path={:?}, start_script={:?}",
            runtime_config.vfs_path, runtime_config.script_path
        );

        let vfs = match &runtime_config.vfs_path {
            Some(vfs_path) => {
                let vfs = Vfs::load(vfs_path, runtime_config.format)
                    .await
                    .context(VfsLoadSnafu)?;
                debug!("Loaded VFS with {} nodes", vfs.tree().node_count());
                Some(vfs)
            }
            None => {
                warn!("No VFS source given, filesystem builtins are unavailable");
                None
            }
        };
        let mut shell = Shell::new(vfs);
        let prompt = Prompt::from_env();

        if let Some(script_path) = &runtime_config.script_path {
            let mut stdout = std::io::stdout();
            let outcome = run_script(&mut shell, script_path, &prompt, &mut stdout)
                .await
                .context(ScriptSnafu)?;
            if outcome == ScriptOutcome::Exited {
                return Ok(());
            }
        }

        Self::interact(&mut shell, &prompt).await
    }

    /// Reads commands from stdin until `exit` or end of input.
    async fn interact(shell: &mut Shell, prompt: &Prompt) -> Result<(), ApplicationError> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        let mut line = String::new();

        loop {
            write!(stdout, "{}", prompt.render(shell.vfs().map(Vfs::pwd))).context(TerminalSnafu)?;
            stdout.flush().context(TerminalSnafu)?;

            line.clear();
            if stdin.lock().read_line(&mut line).context(TerminalSnafu)? == 0 {
                debug!("End of input");
                writeln!(stdout).context(TerminalSnafu)?;
                return Ok(());
            }

            match shell.execute(&line).await {
                Ok(Outcome::Output(lines)) => {
                    for output in lines {
                        writeln!(stdout, "{output}").context(TerminalSnafu)?;
                    }
                }
                Ok(Outcome::Exit) => return Ok(()),
                Err(e) => eprintln!("{}", e.to_string().red()),
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading the virtual filesystem"))]
    VfsLoadError { source: SourceError },
    #[snafu(display("Critical failure encountered during startup script"))]
    ScriptError { source: ScriptError },
    #[snafu(display("Critical failure encountered while talking to the terminal"))]
    TerminalError { source: std::io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::SourceFormat;
    use std::path::PathBuf;

    #[compio::test]
    async fn test_missing_vfs_source_is_fatal() {
        let config = RuntimeConfig {
            vfs_path: Some(PathBuf::from("/this/path/does/not/exist.csv")),
            script_path: None,
            format: SourceFormat::Auto,
        };
        let result = Application::run(config).await;
        assert!(matches!(result, Err(ApplicationError::VfsLoadError { .. })));
    }

    #[compio::test]
    async fn test_failing_script_is_fatal() {
        let mut vfs_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(vfs_file, "path,type,content\n/,dir,\n/home,dir,").unwrap();
        let mut script_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(script_file, "cd /home\ncd /nowhere").unwrap();

        let config = RuntimeConfig {
            vfs_path: Some(vfs_file.path().to_path_buf()),
            script_path: Some(script_file.path().to_path_buf()),
            format: SourceFormat::Auto,
        };
        match Application::run(config).await {
            Err(ApplicationError::ScriptError { source }) => {
                assert_eq!(
                    source.to_string(),
                    "error on line 2: cd: no such file or directory: nowhere"
                );
            }
            other => panic!("Expected ScriptError, got {other:?}"),
        }
    }

    #[compio::test]
    async fn test_script_exit_ends_session() {
        let mut script_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(script_file, "exit").unwrap();

        let config = RuntimeConfig {
            vfs_path: None,
            script_path: Some(script_file.path().to_path_buf()),
            format: SourceFormat::Auto,
        };
        assert!(Application::run(config).await.is_ok());
    }
}
