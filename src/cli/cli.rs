use std::path::PathBuf;

use clap::Parser;

use crate::application::data::{ColorChoice, LogLevel};
use crate::filesystem::SourceFormat;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Interactive shell over an in-memory virtual filesystem")]
pub struct Cli {
    /// Serialized VFS source: a path,type,content CSV table or a JSON/YAML document
    #[clap(long, short)]
    pub vfs: Option<PathBuf>,

    /// Script executed line by line before the interactive session starts
    #[clap(long, short)]
    pub script: Option<PathBuf>,

    /// Format of the VFS source
    #[clap(long, default_value = "auto", value_enum)]
    pub format: SourceFormat,

    /// Diagnostics written to stderr
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// When to colour the prompt and error messages
    #[clap(long, default_value = "auto", value_enum)]
    pub color: ColorChoice,
}
