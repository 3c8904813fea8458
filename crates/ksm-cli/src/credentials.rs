//! Loading server credentials and configuration from disk

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use clap::Args;
use ksm_server::{Ksm, KsmConfig, ServerCertificate, ServerCredentials};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use tracing::debug;

/// Server certificate, private key and configuration shared by every command
#[derive(Args)]
pub struct ServerArgs {
    /// PEM-encoded X.509 server certificate.
    #[arg(long)]
    pub cert: PathBuf,

    /// PEM-encoded RSA private key (PKCS#1 or PKCS#8).
    #[arg(long)]
    pub key: PathBuf,

    /// JSON configuration file. Defaults apply to missing fields.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ServerArgs {
    pub fn load(&self) -> Result<Ksm> {
        let credentials = load_credentials(&self.cert, &self.key)?;
        let config = match &self.config {
            Some(path) => load_config(path)?,
            None => KsmConfig::default(),
        };
        Ksm::with_config(credentials, config).context("invalid configuration")
    }
}

pub fn load_credentials(cert_path: &Path, key_path: &Path) -> Result<ServerCredentials> {
    let cert_pem = std::fs::read_to_string(cert_path)
        .with_context(|| format!("failed to read certificate {}", cert_path.display()))?;
    let certificate = parse_certificate(&cert_pem)
        .with_context(|| format!("failed to parse certificate {}", cert_path.display()))?;

    let key_pem = std::fs::read_to_string(key_path)
        .with_context(|| format!("failed to read private key {}", key_path.display()))?;
    let private_key = parse_private_key(&key_pem)
        .with_context(|| format!("failed to parse private key {}", key_path.display()))?;

    let credentials = ServerCredentials::new(certificate, private_key);
    debug!(
        certificate_hash = %hex::encode(credentials.certificate().hash()),
        "credentials loaded"
    );
    Ok(credentials)
}

pub fn load_config(path: &Path) -> Result<KsmConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    KsmConfig::from_json(&json).with_context(|| format!("failed to load config {}", path.display()))
}

fn parse_certificate(pem_text: &str) -> Result<ServerCertificate> {
    let block = pem::parse(pem_text)?;
    if block.tag() != "CERTIFICATE" {
        bail!("expected a CERTIFICATE block, found {}", block.tag());
    }
    Ok(ServerCertificate::from_der(block.into_contents()))
}

fn parse_private_key(pem_text: &str) -> Result<RsaPrivateKey> {
    match RsaPrivateKey::from_pkcs1_pem(pem_text) {
        Ok(key) => Ok(key),
        Err(pkcs1_err) => RsaPrivateKey::from_pkcs8_pem(pem_text).map_err(|pkcs8_err| {
            anyhow::anyhow!("not a PKCS#1 ({pkcs1_err}) or PKCS#8 ({pkcs8_err}) RSA key")
        }),
    }
}

/// Read an SPC or CKC, decoding base64 text when asked
pub fn read_message(path: &Path, base64: bool) -> Result<Vec<u8>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if !base64 {
        return Ok(bytes);
    }
    let text = String::from_utf8(bytes).context("base64 input is not UTF-8")?;
    let compact: String = text.split_whitespace().collect();
    BASE64
        .decode(compact)
        .with_context(|| format!("{} is not valid base64", path.display()))
}

pub fn write_message(path: &Path, bytes: &[u8], base64: bool) -> Result<()> {
    let contents = if base64 {
        BASE64.encode(bytes).into_bytes()
    } else {
        bytes.to_vec()
    };
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
