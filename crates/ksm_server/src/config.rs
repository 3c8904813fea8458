//! Server configuration
//!
//! Loaded once at startup and injected into [`crate::Ksm`]; the core reads no
//! environment variables and no files.

use ksm_protocol::SpcVersion;
use serde::{Deserialize, Serialize};

use crate::error::KsmError;

/// Upper bound on random extra padding blocks per CKC record
pub const MAX_EXTRA_PADDING_BLOCKS: usize = 15;

/// What to do when an SPC repeats a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateTagPolicy {
    /// Keep the last record seen for the tag
    #[default]
    LastWriteWins,
    /// Fail the SPC as malformed
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KsmConfig {
    /// SPC frame versions accepted (1 = RSA-1024, 2 = RSA-2048)
    pub supported_spc_versions: Vec<u32>,
    /// Values of ProtocolVersionUsed accepted when the client sends one
    pub supported_protocol_versions: Vec<u32>,
    pub duplicate_tags: DuplicateTagPolicy,
    /// Extra random blocks added to each CKC record, chosen per record in `0..=n`
    pub max_extra_padding_blocks: usize,
    /// Version written in the CKC header
    pub ckc_version: u32,
    /// Session key derivation: `aes-ecb` or `aes-cmac`
    pub key_derivation: String,
}

impl Default for KsmConfig {
    fn default() -> Self {
        Self {
            supported_spc_versions: vec![1, 2],
            supported_protocol_versions: vec![1],
            duplicate_tags: DuplicateTagPolicy::default(),
            max_extra_padding_blocks: 3,
            ckc_version: 1,
            key_derivation: "aes-ecb".to_string(),
        }
    }
}

impl KsmConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, KsmError> {
        let config: KsmConfig =
            serde_json::from_str(json).map_err(|e| KsmError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), KsmError> {
        if self.supported_spc_versions.is_empty() {
            return Err(KsmError::config("supported_spc_versions is empty"));
        }
        if let Some(v) = self
            .supported_spc_versions
            .iter()
            .find(|v| SpcVersion::from_u32(**v).is_none())
        {
            return Err(KsmError::config(format!("unknown SPC version {}", v)));
        }
        if self.supported_protocol_versions.is_empty() {
            return Err(KsmError::config("supported_protocol_versions is empty"));
        }
        if self.max_extra_padding_blocks > MAX_EXTRA_PADDING_BLOCKS {
            return Err(KsmError::config(format!(
                "max_extra_padding_blocks {} exceeds {}",
                self.max_extra_padding_blocks, MAX_EXTRA_PADDING_BLOCKS
            )));
        }
        if ksm_crypto::derivation_by_name(&self.key_derivation).is_none() {
            return Err(KsmError::config(format!(
                "unknown key derivation '{}'",
                self.key_derivation
            )));
        }
        Ok(())
    }

    pub(crate) fn accepts_spc_version(&self, version: SpcVersion) -> bool {
        self.supported_spc_versions.contains(&version.as_u32())
    }
}
