use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use ksm_server::{ContentKey, ContentKeyProvider, FixedContentKey, RandomContentKey};
use tracing::info;

use crate::credentials::{read_message, write_message, ServerArgs};

/// Answer an SPC with a CKC.
#[derive(Args)]
pub struct CkcCommand {
    #[command(flatten)]
    server: ServerArgs,

    /// SPC file sent by the client.
    #[arg(long)]
    spc: PathBuf,

    /// Where to write the CKC.
    #[arg(short, long)]
    out: PathBuf,

    /// Content key as 32 hex digits. A random key is issued when omitted.
    #[arg(long, requires = "content_iv")]
    content_key: Option<String>,

    /// Content IV as 32 hex digits.
    #[arg(long, requires = "content_key")]
    content_iv: Option<String>,

    /// SPC is read as base64 text and the CKC written as base64 text.
    #[arg(long)]
    base64: bool,
}

impl CkcCommand {
    pub fn run(self) -> Result<()> {
        let ksm = self.server.load()?;
        let spc = read_message(&self.spc, self.base64)?;

        let provider: Box<dyn ContentKeyProvider> = match (&self.content_key, &self.content_iv) {
            (Some(key), Some(iv)) => Box::new(FixedContentKey::new(parse_content_key(key, iv)?)),
            (None, None) => Box::new(RandomContentKey),
            _ => bail!("--content-key and --content-iv go together"),
        };

        let ckc = ksm
            .generate_ckc(&spc, provider.as_ref())
            .context("failed to generate CKC")?;
        write_message(&self.out, &ckc, self.base64)?;

        info!(
            spc_length = spc.len(),
            ckc_length = ckc.len(),
            out = %self.out.display(),
            "CKC written"
        );
        Ok(())
    }
}

fn parse_content_key(key: &str, iv: &str) -> Result<ContentKey> {
    let key = hex::decode(key).context("content key is not hex")?;
    let iv = hex::decode(iv).context("content IV is not hex")?;
    ContentKey::from_slices(&key, &iv).context("content key and IV must be 16 bytes each")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_key() {
        let key = parse_content_key(
            "000102030405060708090a0b0c0d0e0f",
            "f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff",
        )
        .unwrap();
        assert_eq!(key.key()[15], 0x0f);
        assert_eq!(key.iv()[0], 0xf0);

        assert!(parse_content_key("0001", "f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff").is_err());
        assert!(parse_content_key("zz", "00").is_err());
    }
}
