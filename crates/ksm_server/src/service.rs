//! The key security module as a long-lived service
//!
//! Holds the credentials, the derivation strategy and the configuration.
//! Immutable after construction, so one instance can serve any number of
//! concurrent requests.

use ksm_crypto::{derivation_by_name, KeyDerivation, SessionKeys};
use tracing::{debug, info};

use crate::ckc::CkcBuilder;
use crate::config::KsmConfig;
use crate::content_key::ContentKeyProvider;
use crate::debug::{debug_decode, CkcSummary};
use crate::error::KsmError;
use crate::keypair::ServerCredentials;
use crate::spc::{ParsedSpc, SpcParser};

pub struct Ksm {
    credentials: ServerCredentials,
    derivation: Box<dyn KeyDerivation>,
    config: KsmConfig,
}

impl Ksm {
    /// A service with the default configuration
    pub fn new(credentials: ServerCredentials) -> Self {
        let config = KsmConfig::default();
        Self {
            credentials,
            derivation: Box::new(ksm_crypto::AesEcbDerivation),
            config,
        }
    }

    /// A service with a validated configuration
    pub fn with_config(credentials: ServerCredentials, config: KsmConfig) -> Result<Self, KsmError> {
        config.validate()?;
        let derivation = derivation_by_name(&config.key_derivation).ok_or_else(|| KsmError::Config {
            reason: format!("unknown key derivation '{}'", config.key_derivation),
        })?;
        info!(
            derivation = derivation.name(),
            spc_versions = ?config.supported_spc_versions,
            duplicate_tags = ?config.duplicate_tags,
            "key security module configured"
        );
        Ok(Self {
            credentials,
            derivation,
            config,
        })
    }

    /// Replace the derivation strategy
    pub fn with_derivation(mut self, derivation: Box<dyn KeyDerivation>) -> Self {
        self.derivation = derivation;
        self
    }

    pub fn config(&self) -> &KsmConfig {
        &self.config
    }

    pub fn credentials(&self) -> &ServerCredentials {
        &self.credentials
    }

    pub fn derivation(&self) -> &dyn KeyDerivation {
        self.derivation.as_ref()
    }

    fn parser(&self) -> SpcParser<'_> {
        SpcParser::new(
            self.credentials.certificate(),
            self.credentials.private_key(),
            self.derivation.as_ref(),
            &self.config,
        )
    }

    fn builder(&self) -> CkcBuilder<'_> {
        CkcBuilder::new(
            self.credentials.private_key(),
            self.derivation.as_ref(),
            &self.config,
        )
    }

    pub fn parse_spc(&self, raw_spc: &[u8]) -> Result<ParsedSpc, KsmError> {
        self.parser().parse(raw_spc)
    }

    pub fn build_ckc(
        &self,
        parsed: &ParsedSpc,
        provider: &dyn ContentKeyProvider,
    ) -> Result<Vec<u8>, KsmError> {
        self.builder().build(parsed, provider)
    }

    /// Parse an SPC and answer it
    pub fn generate_ckc(
        &self,
        raw_spc: &[u8],
        provider: &dyn ContentKeyProvider,
    ) -> Result<Vec<u8>, KsmError> {
        let parsed = self.parse_spc(raw_spc)?;
        let ckc = self.build_ckc(&parsed, provider)?;
        debug!(spc_length = raw_spc.len(), ckc_length = ckc.len(), "exchange complete");
        Ok(ckc)
    }

    /// Session keys a CKC for this SPC is encrypted under
    pub fn session_keys(&self, parsed: &ParsedSpc) -> Result<SessionKeys, KsmError> {
        self.builder().session_keys(parsed)
    }

    pub fn debug_ckc(&self, ckc: &[u8], keys: Option<&SessionKeys>) -> Result<CkcSummary, KsmError> {
        debug_decode(ckc, keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_ksm_is_shareable() {
        assert_send_sync::<Ksm>();
    }
}
