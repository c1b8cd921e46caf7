use snafu::prelude::*;
use tracing::debug;

use crate::filesystem::{Vfs, VfsError};
use crate::shell::builtin::{Builtin, WordCount};
use crate::shell::host::{HostCommand, HostCommandError};
use crate::shell::parser::{ParseError, parse_args};

/// What the caller should do after a line has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Lines produced by a builtin; empty for host commands and silent builtins.
    Output(Vec<String>),
    Exit,
}

/// Routes command lines either to the virtual filesystem or to the host.
#[derive(Debug, Default)]
pub struct Shell {
    vfs: Option<Vfs>,
}

impl Shell {
    pub fn new(vfs: Option<Vfs>) -> Self {
        Self { vfs }
    }

    pub fn vfs(&self) -> Option<&Vfs> {
        self.vfs.as_ref()
    }

    pub async fn execute(&mut self, input: &str) -> Result<Outcome, ShellError> {
        let args = parse_args(input.trim()).context(ParseSnafu)?;
        let Some((name, rest)) = args.split_first() else {
            return Ok(Outcome::Output(Vec::new()));
        };

        match Builtin::from_name(name) {
            Some(builtin) => {
                debug!("Running builtin '{}' with {:?}", builtin, rest);
                self.run_builtin(builtin, rest)
            }
            None => {
                let command = HostCommand::new(name.as_str(), rest.iter().cloned());
                command.run().await.context(HostSnafu)?;
                Ok(Outcome::Output(Vec::new()))
            }
        }
    }

    fn loaded(&mut self) -> Result<&mut Vfs, ShellError> {
        self.vfs.as_mut().context(UninitializedSnafu)
    }

    fn run_builtin(&mut self, builtin: Builtin, args: &[String]) -> Result<Outcome, ShellError> {
        let command = builtin.to_string();

        let output = match builtin {
            Builtin::Exit => return Ok(Outcome::Exit),
            Builtin::Pwd => vec![self.loaded()?.pwd().to_string()],
            Builtin::Cd => {
                let vfs = self.loaded()?;
                let target = args
                    .first()
                    .context(MissingOperandSnafu { command: &command })?;
                vfs.cd(target).context(VfsSnafu { command: &command })?;
                Vec::new()
            }
            Builtin::Ls => {
                let target = args.first().map_or(".", String::as_str);
                self.loaded()?
                    .ls(target)
                    .context(VfsSnafu { command: &command })?
            }
            Builtin::Touch => {
                let vfs = self.loaded()?;
                ensure!(!args.is_empty(), MissingOperandSnafu { command: &command });
                for target in args {
                    vfs.touch(target).context(VfsSnafu { command: &command })?;
                }
                Vec::new()
            }
            Builtin::Wc => {
                let vfs = self.loaded()?;
                ensure!(!args.is_empty(), MissingOperandSnafu { command: &command });
                let mut total = WordCount::default();
                let mut lines = Vec::with_capacity(args.len() + 1);
                for target in args {
                    let counts = WordCount::of(&read_file(vfs, target, &command)?);
                    total += counts;
                    lines.push(counts.render(target));
                }
                if args.len() > 1 {
                    lines.push(total.render("total"));
                }
                lines
            }
            Builtin::Cat => {
                let vfs: &Vfs = self.loaded()?;
                ensure!(!args.is_empty(), MissingOperandSnafu { command: &command });
                args.iter()
                    .map(|target| read_file(vfs, target, &command))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(Outcome::Output(output))
    }
}

fn read_file(vfs: &Vfs, target: &str, command: &str) -> Result<String, ShellError> {
    let (id, _) = vfs.resolve(target).context(VfsSnafu { command })?;
    ensure!(
        !vfs.node(id).is_directory(),
        IsADirectorySnafu { command, path: target }
    );
    vfs.decode_file(id).context(VfsSnafu { command })
}

#[derive(Debug, Snafu)]
pub enum ShellError {
    #[snafu(display("vfs not initialized"))]
    Uninitialized,
    #[snafu(display("{}", source))]
    ParseError { source: ParseError },
    #[snafu(display("{}: path required", command))]
    MissingOperand { command: String },
    #[snafu(display("{}: {}: is a directory", command, path))]
    IsADirectory { command: String, path: String },
    #[snafu(display("{}: {}", command, source))]
    VfsError { command: String, source: VfsError },
    #[snafu(display("{}", source))]
    HostError { source: HostCommandError },
}
