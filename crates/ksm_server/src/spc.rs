//! SPC parsing
//!
//! Turns a raw SPC into a [`ParsedSpc`]. Every step is a hard gate: the caller
//! either gets a complete container or an error, never anything in between.

use std::collections::HashMap;

use ksm_crypto::{
    aes_cbc_decrypt, constant_time_eq, AesEcbDerivation, KeyDerivation, KeyPurpose,
};
use ksm_protocol::{
    decode_records, first_duplicate, index_by_tag, FrameError, SpcFrame, SpcVersion, Tag,
    TllvRecord, CERTIFICATE_HASH_SIZE, IV_SIZE,
};
use rsa::RsaPrivateKey;
use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::config::{DuplicateTagPolicy, KsmConfig};
use crate::error::KsmError;
use crate::keypair::ServerCertificate;
use crate::types::AssetContext;
use crate::unwrap::unwrap_session_secret;

/// A decrypted, validated SPC
///
/// The SessionKey_R1 record is still wrapped; the CKC builder unwraps it.
pub struct ParsedSpc {
    version: SpcVersion,
    certificate_hash: [u8; CERTIFICATE_HASH_SIZE],
    session_iv: [u8; IV_SIZE],
    encrypted_session_key: Vec<u8>,
    spc_payload: Zeroizing<Vec<u8>>,
    records: Vec<TllvRecord>,
    tllvs: HashMap<Tag, usize>,
}

impl ParsedSpc {
    pub fn version(&self) -> SpcVersion {
        self.version
    }

    pub fn certificate_hash(&self) -> &[u8; CERTIFICATE_HASH_SIZE] {
        &self.certificate_hash
    }

    pub fn session_iv(&self) -> &[u8; IV_SIZE] {
        &self.session_iv
    }

    /// RSA ciphertext from the outer frame
    pub fn encrypted_session_key(&self) -> &[u8] {
        &self.encrypted_session_key
    }

    /// Decrypted record stream, padding included
    pub fn spc_payload(&self) -> &[u8] {
        &self.spc_payload
    }

    /// All records in wire order, duplicates included
    pub fn records(&self) -> &[TllvRecord] {
        &self.records
    }

    /// The record in effect for each tag
    pub fn tllvs(&self) -> HashMap<Tag, &TllvRecord> {
        self.tllvs
            .iter()
            .map(|(tag, position)| (*tag, &self.records[*position]))
            .collect()
    }

    pub fn get(&self, tag: Tag) -> Option<&TllvRecord> {
        self.tllvs.get(&tag).map(|position| &self.records[*position])
    }

    /// Like [`get`](Self::get), but a missing tag is a malformed SPC
    pub fn require(&self, tag: Tag) -> Result<&TllvRecord, KsmError> {
        self.get(tag).ok_or_else(|| {
            KsmError::malformed_spc(format!(
                "missing tag {} ({})",
                tag,
                tag.name().unwrap_or("unknown")
            ))
        })
    }

    pub fn asset_context(&self) -> Result<AssetContext, KsmError> {
        Ok(AssetContext {
            asset_id: self.require(Tag::ASSET_ID)?.value().to_vec(),
            transaction_id: self.require(Tag::TRANSACTION_ID)?.value().to_vec(),
        })
    }

    /// Tags the client wants in the CKC, in order
    pub fn return_request(&self) -> Result<Vec<Tag>, KsmError> {
        let record = self.require(Tag::RETURN_REQUEST)?;
        let tags = Tag::parse_list(record.value()).ok_or_else(|| {
            KsmError::malformed_spc(format!(
                "return request of {} bytes is not a list of {}-byte tags",
                record.value_length(),
                Tag::SIZE
            ))
        })?;
        if tags.is_empty() {
            return Err(KsmError::malformed_spc("return request is empty"));
        }
        Ok(tags)
    }

    pub fn protocol_version_used(&self) -> Result<Option<u32>, KsmError> {
        self.get(Tag::PROTOCOL_VERSION_USED)
            .map(|record| be_u32(record.value(), Tag::PROTOCOL_VERSION_USED))
            .transpose()
    }

    pub fn protocol_versions_supported(&self) -> Result<Vec<u32>, KsmError> {
        let Some(record) = self.get(Tag::PROTOCOL_VERSIONS_SUPPORTED) else {
            return Ok(Vec::new());
        };
        if record.value_length() % 4 != 0 {
            return Err(KsmError::malformed_spc(
                "protocol versions supported is not a list of u32",
            ));
        }
        record
            .value()
            .chunks_exact(4)
            .map(|chunk| be_u32(chunk, Tag::PROTOCOL_VERSIONS_SUPPORTED))
            .collect()
    }
}

impl Drop for ParsedSpc {
    fn drop(&mut self) {
        self.records.zeroize();
    }
}

fn be_u32(bytes: &[u8], tag: Tag) -> Result<u32, KsmError> {
    let raw: [u8; 4] = bytes.try_into().map_err(|_| {
        KsmError::malformed_spc(format!(
            "tag {} holds {} bytes, expected 4",
            tag,
            bytes.len()
        ))
    })?;
    Ok(u32::from_be_bytes(raw))
}

/// Parses SPCs for one server certificate and key
pub struct SpcParser<'a> {
    certificate: &'a ServerCertificate,
    private_key: &'a RsaPrivateKey,
    derivation: &'a dyn KeyDerivation,
    config: &'a KsmConfig,
}

impl<'a> SpcParser<'a> {
    pub fn new(
        certificate: &'a ServerCertificate,
        private_key: &'a RsaPrivateKey,
        derivation: &'a dyn KeyDerivation,
        config: &'a KsmConfig,
    ) -> Self {
        Self {
            certificate,
            private_key,
            derivation,
            config,
        }
    }

    pub fn parse(&self, raw_spc: &[u8]) -> Result<ParsedSpc, KsmError> {
        let (frame, trailing) = SpcFrame::parse(raw_spc).map_err(|e| match e {
            FrameError::UnknownVersion(version) => KsmError::UnsupportedVersion {
                context: "SPC",
                version,
            },
            other => KsmError::malformed_spc(other.to_string()),
        })?;

        if !self.config.accepts_spc_version(frame.version) {
            warn!(version = frame.version.as_u32(), "SPC version disabled by configuration");
            return Err(KsmError::UnsupportedVersion {
                context: "SPC",
                version: frame.version.as_u32(),
            });
        }
        if trailing > 0 {
            debug!(trailing, "ignoring bytes after SPC payload");
        }
        debug!(
            version = frame.version.as_u32(),
            payload_length = frame.payload.len(),
            "SPC frame accepted"
        );

        if !constant_time_eq(&frame.certificate_hash, self.certificate.hash()) {
            warn!("SPC names a different server certificate");
            return Err(KsmError::AuthenticationFailed);
        }

        let r1 = unwrap_session_secret(&frame.encrypted_session_key, self.private_key)
            .map_err(|_| KsmError::AuthenticationFailed)?;
        let session_enc_key = self.derivation.derive(&r1, KeyPurpose::Encryption);
        drop(r1);

        let spc_payload = aes_cbc_decrypt(&session_enc_key, &frame.session_iv, &frame.payload)?;
        drop(session_enc_key);

        let records = decode_records(&spc_payload).map_err(|e| {
            debug!(error = %e, "decrypted SPC payload is not a record stream");
            KsmError::AuthenticationFailed
        })?;
        debug!(records = records.len(), "SPC payload decoded");

        if let Some(tag) = first_duplicate(&records) {
            match self.config.duplicate_tags {
                DuplicateTagPolicy::Reject => {
                    warn!(%tag, "duplicate tag in SPC");
                    return Err(KsmError::malformed_spc(format!("duplicate tag {}", tag)));
                }
                DuplicateTagPolicy::LastWriteWins => {
                    debug!(%tag, "duplicate tag in SPC, keeping the last record");
                }
            }
        }

        let tllvs = index_by_tag(&records);
        let parsed = ParsedSpc {
            version: frame.version,
            certificate_hash: frame.certificate_hash,
            session_iv: frame.session_iv,
            encrypted_session_key: frame.encrypted_session_key,
            spc_payload,
            records,
            tllvs,
        };

        for tag in Tag::MANDATORY_SPC {
            parsed.require(tag)?;
        }

        if let Some(version) = parsed.protocol_version_used()? {
            if !self.config.supported_protocol_versions.contains(&version) {
                warn!(version, "unsupported protocol version used");
                return Err(KsmError::UnsupportedVersion {
                    context: "protocol",
                    version,
                });
            }
        }

        for record in parsed.records().iter().filter(|r| !r.tag().is_known()) {
            debug!(tag = %record.tag(), value_length = record.value_length(), "unknown tag preserved");
        }

        Ok(parsed)
    }
}

/// Parse an SPC with the default derivation and configuration
pub fn parse_spc(
    raw_spc: &[u8],
    certificate: &ServerCertificate,
    private_key: &RsaPrivateKey,
) -> Result<ParsedSpc, KsmError> {
    let config = KsmConfig::default();
    SpcParser::new(certificate, private_key, &AesEcbDerivation, &config).parse(raw_spc)
}
