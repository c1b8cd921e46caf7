use std::path::PathBuf;

use crate::cli::Cli;
use crate::filesystem::SourceFormat;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub vfs_path: Option<PathBuf>,
    pub script_path: Option<PathBuf>,
    pub format: SourceFormat,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            vfs_path: cli.vfs,
            script_path: cli.script,
            format: cli.format,
        }
    }
}
