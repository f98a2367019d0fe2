use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index every Java file below a path, reading `<file>.resolved.json` snapshots
    Index {
        path: PathBuf,

        /// Classpath handed to the frontend, entries separated by `;` or the platform separator
        #[arg(short, long, default_value = "")]
        classpath: String,

        /// Write facts as JSON lines to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of files indexed at the same time
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Format of the run summary printed on stderr
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Pretty-print serialized names; `\t` escapes are accepted for tabs
    Names {
        #[arg(required = true)]
        serialized: Vec<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Serialized names typed on a command line usually carry `\t` instead of
/// real tabs.
pub fn unescape_name(input: &str) -> String {
    if input.contains('\t') {
        input.to_string()
    } else {
        input.replace("\\t", "\t")
    }
}
