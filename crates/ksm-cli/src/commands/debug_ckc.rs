use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::credentials::{read_message, ServerArgs};

/// Print the structure of a CKC.
///
/// With the SPC it answers and the server credentials, the payload is
/// decrypted and its records listed as well.
#[derive(Args)]
pub struct DebugCkcCommand {
    /// CKC file.
    #[arg(long)]
    ckc: PathBuf,

    /// SPC the CKC answers.
    #[arg(long, requires_all = ["cert", "key"])]
    spc: Option<PathBuf>,

    /// PEM-encoded X.509 server certificate.
    #[arg(long, requires = "spc")]
    cert: Option<PathBuf>,

    /// PEM-encoded RSA private key.
    #[arg(long, requires = "spc")]
    key: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(long, requires = "spc")]
    config: Option<PathBuf>,

    /// Inputs are base64 text.
    #[arg(long)]
    base64: bool,
}

impl DebugCkcCommand {
    pub fn run(self) -> Result<()> {
        let ckc = read_message(&self.ckc, self.base64)?;

        let summary = match (self.spc, self.cert, self.key) {
            (Some(spc_path), Some(cert), Some(key)) => {
                let ksm = ServerArgs {
                    cert,
                    key,
                    config: self.config,
                }
                .load()?;
                let spc = ksm
                    .parse_spc(&read_message(&spc_path, self.base64)?)
                    .context("failed to parse SPC")?;
                let keys = ksm.session_keys(&spc).context("failed to recover session keys")?;
                ksm.debug_ckc(&ckc, Some(&keys))
            }
            _ => ksm_server::debug_decode(&ckc, None),
        }
        .context("failed to decode CKC")?;

        print!("{}", summary);
        Ok(())
    }
}
