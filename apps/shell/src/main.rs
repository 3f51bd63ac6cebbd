#![allow(clippy::print_stdout)]

mod args;
mod commands;
mod github;

use crate::args::{Cli, Command};
use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Check { file, node, prefix, catalog } => {
            let (_logger, report) =
                commands::check(&commands::Check { file, node, prefix, catalog })?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        },
        Command::Shape { node } => {
            println!("{}", serde_json::to_string_pretty(&commands::shape(&node)?)?);
        },
        Command::Tree {} => {
            for path in commands::tree()? {
                println!("{path}");
            }
        },
    }

    Ok(())
}
