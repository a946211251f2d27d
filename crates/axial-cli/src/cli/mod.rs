use clap::Parser;

pub mod commands;
pub mod global;

pub use commands::{ClassifyArgs, Commands, PathArgs};
pub use global::{GlobalFlags, OutputFormat};

/// Top-level CLI parser for the `axial` binary.
#[derive(Debug, Parser)]
#[command(
    name = "axial",
    version,
    about = "Axial - theme classification of analyst feedback on alert verdicts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only, no progress bar)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}
