use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::credentials::{read_message, ServerArgs};

/// Decrypt an SPC and list its records.
///
/// Prints tags and lengths only; record values stay private.
#[derive(Args)]
pub struct InspectSpcCommand {
    #[command(flatten)]
    server: ServerArgs,

    /// SPC file sent by the client.
    #[arg(long)]
    spc: PathBuf,

    /// SPC is base64 text.
    #[arg(long)]
    base64: bool,
}

impl InspectSpcCommand {
    pub fn run(self) -> Result<()> {
        let ksm = self.server.load()?;
        let raw = read_message(&self.spc, self.base64)?;
        let spc = ksm.parse_spc(&raw).context("failed to parse SPC")?;

        println!("SPC version {}", spc.version().as_u32());
        println!("  certificate:    {}", hex::encode(spc.certificate_hash()));
        println!("  iv:             {}", hex::encode(spc.session_iv()));
        println!("  wrapped key:    {} bytes", spc.encrypted_session_key().len());
        println!("  payload length: {}", spc.spc_payload().len());
        println!("  records:        {}", spc.records().len());
        for record in spc.records() {
            println!(
                "    {} {:<26} block {:>5}  value {:>5}",
                record.tag(),
                record.tag().name().unwrap_or("-"),
                record.block_length(),
                record.value_length()
            );
        }

        let requested = spc.return_request()?;
        println!();
        println!("Return request ({}):", requested.len());
        for tag in requested {
            println!("  {} {}", tag, tag.name().unwrap_or("-"));
        }

        if let Some(version) = spc.protocol_version_used()? {
            println!();
            println!("Protocol version used: {}", version);
        }
        Ok(())
    }
}
