use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{CkcCommand, DebugCkcCommand, InspectSpcCommand};

/// Key security module operator tool.
#[derive(Parser)]
#[command(name = "ksm", version)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer an SPC with a CKC.
    Ckc(CkcCommand),
    /// Decrypt an SPC and list its records.
    InspectSpc(InspectSpcCommand),
    /// Print the structure of a CKC.
    DebugCkc(DebugCkcCommand),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Command::Ckc(cmd) => cmd.run(),
            Command::InspectSpc(cmd) => cmd.run(),
            Command::DebugCkc(cmd) => cmd.run(),
        }
    }
}
