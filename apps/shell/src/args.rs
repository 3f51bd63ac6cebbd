//! # CLI Argument Definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "settle")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Validate settings files against the Github client scope tree")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Build a node's settings from a file and print the resolved values
    Check {
        /// Settings file (TOML, JSON or YAML); a `[logging]` table configures the logger
        file: PathBuf,
        /// Dotted node path below the client, e.g. `repos.list`
        #[arg(short, long, default_value = "")]
        node: String,
        /// Environment prefix for overrides (`PREFIX__KEY=value`)
        #[arg(short, long)]
        prefix: Option<String>,
        /// TOML message catalog replacing the built-in messages
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
    /// Print the declared options, memos and validator count of a node
    Shape {
        #[arg(short, long, default_value = "")]
        node: String,
    },
    /// List every node of the client tree
    Tree {},
}
