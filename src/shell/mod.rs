//! Command dispatch: VFS-aware builtins, host execution and startup scripts.

mod builtin;
mod dispatcher;
mod host;
mod parser;
mod prompt;
mod script;

pub use dispatcher::{Outcome, Shell, ShellError};
pub use prompt::Prompt;
pub use script::{ScriptError, ScriptOutcome, run_script};
