//! Structural dump of a CKC for operators
//!
//! Diagnostic only. Values are never printed, just tags and lengths.

use std::fmt;

use ksm_crypto::{aes_cbc_decrypt, SessionKeys};
use ksm_protocol::{decode_records, CkcFrame, Tag, IV_SIZE};

use crate::error::KsmError;

/// One record of a decrypted CKC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    pub tag: Tag,
    pub name: Option<&'static str>,
    pub block_length: u32,
    pub value_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CkcSummary {
    pub version: u32,
    pub iv: [u8; IV_SIZE],
    pub payload_length: usize,
    /// Present only when session keys were supplied
    pub records: Option<Vec<RecordSummary>>,
}

impl CkcSummary {
    /// Tags in response order, if the payload was decrypted
    pub fn tags(&self) -> Option<Vec<Tag>> {
        self.records
            .as_ref()
            .map(|records| records.iter().map(|r| r.tag).collect())
    }
}

impl fmt::Display for CkcSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CKC version {}", self.version)?;
        writeln!(f, "  iv:             {}", hex::encode(self.iv))?;
        writeln!(f, "  payload length: {}", self.payload_length)?;
        match &self.records {
            None => writeln!(f, "  records:        (encrypted)"),
            Some(records) => {
                writeln!(f, "  records:        {}", records.len())?;
                for record in records {
                    writeln!(
                        f,
                        "    {} {:<26} block {:>5}  value {:>5}",
                        record.tag,
                        record.name.unwrap_or("-"),
                        record.block_length,
                        record.value_length
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// Decode a CKC header and, given the session keys, its record list
pub fn debug_decode(ckc: &[u8], keys: Option<&SessionKeys>) -> Result<CkcSummary, KsmError> {
    let frame = CkcFrame::parse(ckc).map_err(|e| KsmError::malformed_ckc(e.to_string()))?;

    let records = match keys {
        None => None,
        Some(keys) => {
            let plaintext = aes_cbc_decrypt(&keys.encryption, &frame.iv, &frame.payload)?;
            let records = decode_records(&plaintext).map_err(|e| {
                KsmError::malformed_ckc(format!("payload does not decrypt to records: {}", e))
            })?;
            Some(
                records
                    .iter()
                    .map(|record| RecordSummary {
                        tag: record.tag(),
                        name: record.tag().name(),
                        block_length: record.block_length(),
                        value_length: record.value_length(),
                    })
                    .collect(),
            )
        }
    };

    Ok(CkcSummary {
        version: frame.version,
        iv: frame.iv,
        payload_length: frame.payload.len(),
        records,
    })
}
