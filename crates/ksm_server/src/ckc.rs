//! CKC assembly
//!
//! Unwraps the inner session key, proves the client's integrity record,
//! fetches the content key and answers exactly what the return request asks
//! for, in the order asked.

use ksm_crypto::{
    aes_cbc_encrypt, aes_ecb_encrypt_block, calculate_cmac, generate_iv, random_bytes,
    random_count, verify_cmac, AesEcbDerivation, KeyDerivation, SessionKeys, BLOCK_SIZE,
};
use ksm_protocol::binary::{length_to_u32, BinaryWrite};
use ksm_protocol::{encode_records, CkcFrame, Tag, TllvRecord, TLLV_ALIGNMENT};
use rsa::RsaPrivateKey;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::config::KsmConfig;
use crate::content_key::ContentKeyProvider;
use crate::error::KsmError;
use crate::spc::ParsedSpc;
use crate::types::ContentKey;
use crate::unwrap::unwrap_session_secret;

/// Builds CKCs answering parsed SPCs
pub struct CkcBuilder<'a> {
    private_key: &'a RsaPrivateKey,
    derivation: &'a dyn KeyDerivation,
    config: &'a KsmConfig,
}

impl<'a> CkcBuilder<'a> {
    pub fn new(
        private_key: &'a RsaPrivateKey,
        derivation: &'a dyn KeyDerivation,
        config: &'a KsmConfig,
    ) -> Self {
        Self {
            private_key,
            derivation,
            config,
        }
    }

    /// Unwrap SessionKey_R1 and derive both session keys from it
    pub fn session_keys(&self, parsed: &ParsedSpc) -> Result<SessionKeys, KsmError> {
        let wrapped = parsed.require(Tag::SESSION_KEY_R1)?;
        let r1 = unwrap_session_secret(wrapped.value(), self.private_key)
            .map_err(|_| KsmError::AuthenticationFailed)?;
        Ok(SessionKeys::derive(self.derivation, &r1))
    }

    pub fn build(
        &self,
        parsed: &ParsedSpc,
        provider: &dyn ContentKeyProvider,
    ) -> Result<Vec<u8>, KsmError> {
        let keys = self.session_keys(parsed)?;

        let session_key = parsed.require(Tag::SESSION_KEY_R1)?;
        let integrity = parsed.require(Tag::SESSION_KEY_R1_INTEGRITY)?;
        if verify_cmac(&keys.integrity, session_key.value(), integrity.value()).is_err() {
            warn!("session key integrity check: fail");
            return Err(KsmError::IntegrityCheckFailed);
        }
        debug!("session key integrity check: pass");

        let context = parsed.asset_context()?;
        let content_key = provider.issue(&context).map_err(|e| {
            warn!(error = %e, "content key provider failed");
            KsmError::ContentKeyUnavailable {
                reason: e.to_string(),
            }
        })?;

        let requested = parsed.return_request()?;
        let values = self.response_values(parsed, &requested, &keys, &content_key)?;

        let records = values
            .into_iter()
            .map(|(tag, value)| self.pad(tag, value))
            .collect::<Result<Vec<_>, _>>()?;
        let stream = Zeroizing::new(encode_records(&records)?);

        let iv = generate_iv();
        let payload = aes_cbc_encrypt(&keys.encryption, &iv, &stream)?;
        debug!(
            records = records.len(),
            payload_length = payload.len(),
            "CKC assembled"
        );

        CkcFrame::new(self.config.ckc_version, iv, payload)
            .to_bytes()
            .map_err(|e| KsmError::malformed_ckc(e.to_string()))
    }

    /// Unpadded values for each requested tag, in request order
    fn response_values(
        &self,
        parsed: &ParsedSpc,
        requested: &[Tag],
        keys: &SessionKeys,
        content_key: &ContentKey,
    ) -> Result<Vec<(Tag, Vec<u8>)>, KsmError> {
        let mut values = Vec::with_capacity(requested.len());

        for &tag in requested {
            let value = match tag {
                Tag::ENCRYPTED_CONTENT_KEY => encrypted_content_key(keys, content_key)?,
                Tag::ANTI_REPLAY_SEED => {
                    let seed: [u8; BLOCK_SIZE] = parsed
                        .require(Tag::ANTI_REPLAY_SEED)?
                        .value()
                        .try_into()
                        .map_err(|_| KsmError::malformed_spc("anti-replay seed is not 16 bytes"))?;
                    aes_ecb_encrypt_block(&keys.encryption, &seed).to_vec()
                }
                // Filled in once every other value is known
                Tag::SESSION_KEY_R1_INTEGRITY => Vec::new(),
                other => match parsed.get(other) {
                    Some(record) => record.value().to_vec(),
                    None => {
                        return Err(KsmError::malformed_spc(format!(
                            "return request names tag {} which cannot be produced",
                            other
                        )))
                    }
                },
            };
            values.push((tag, value));
        }

        if requested.contains(&Tag::SESSION_KEY_R1_INTEGRITY) {
            let mac = response_integrity(keys, &values)?;
            for (tag, value) in values.iter_mut() {
                if *tag == Tag::SESSION_KEY_R1_INTEGRITY {
                    *value = mac.to_vec();
                }
            }
        }

        Ok(values)
    }

    /// Random filler up to the next block, plus up to the configured extra blocks
    fn pad(&self, tag: Tag, value: Vec<u8>) -> Result<TllvRecord, KsmError> {
        let to_boundary = (TLLV_ALIGNMENT - value.len() % TLLV_ALIGNMENT) % TLLV_ALIGNMENT;
        let extra = random_count(self.config.max_extra_padding_blocks) * TLLV_ALIGNMENT;
        let padding = random_bytes(to_boundary + extra);
        Ok(TllvRecord::with_padding(tag, value, padding)?)
    }
}

/// `wrap_iv ‖ AES-CBC(key ‖ iv)` under the session encryption key
fn encrypted_content_key(keys: &SessionKeys, content_key: &ContentKey) -> Result<Vec<u8>, KsmError> {
    let mut plaintext = Zeroizing::new(Vec::with_capacity(2 * BLOCK_SIZE));
    plaintext.extend_from_slice(content_key.key());
    plaintext.extend_from_slice(content_key.iv());

    let wrap_iv = generate_iv();
    let ciphertext = aes_cbc_encrypt(&keys.encryption, &wrap_iv, &plaintext)?;

    let mut value = Vec::with_capacity(BLOCK_SIZE + ciphertext.len());
    value.extend_from_slice(&wrap_iv);
    value.extend_from_slice(&ciphertext);
    Ok(value)
}

/// CMAC over `tag ‖ value_length ‖ value` of every other response record
pub fn response_integrity(
    keys: &SessionKeys,
    values: &[(Tag, Vec<u8>)],
) -> Result<[u8; 16], KsmError> {
    let mut covered = Vec::new();
    for (tag, value) in values {
        if *tag == Tag::SESSION_KEY_R1_INTEGRITY {
            continue;
        }
        covered.extend_from_slice(&tag.to_be_bytes());
        covered.extend_from_slice(&value_length_field(value.len())?);
        covered.extend_from_slice(value);
    }
    Ok(calculate_cmac(&keys.integrity, &covered))
}

fn value_length_field(len: usize) -> Result<[u8; 4], KsmError> {
    length_to_u32(len)
        .map(u32::to_be_bytes)
        .map_err(|e| KsmError::malformed_ckc(e.to_string()))
}

/// Build a CKC with the default derivation and configuration
pub fn build_ckc(
    parsed: &ParsedSpc,
    private_key: &RsaPrivateKey,
    provider: &dyn ContentKeyProvider,
) -> Result<Vec<u8>, KsmError> {
    let config = KsmConfig::default();
    CkcBuilder::new(private_key, &AesEcbDerivation, &config).build(parsed, provider)
}
