//! Server certificate and private key
//!
//! Both arrive already decoded; PEM handling lives with the caller.

use ksm_protocol::{SpcVersion, CERTIFICATE_HASH_SIZE};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::{Digest, Sha1};

/// DER-encoded server certificate with its SHA-1 fingerprint
///
/// Clients put the fingerprint in every SPC to name the certificate they
/// encrypted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCertificate {
    der: Vec<u8>,
    hash: [u8; CERTIFICATE_HASH_SIZE],
}

impl ServerCertificate {
    pub fn from_der(der: Vec<u8>) -> Self {
        let mut hash = [0u8; CERTIFICATE_HASH_SIZE];
        hash.copy_from_slice(&Sha1::digest(&der));
        Self { der, hash }
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// SHA-1 of the DER encoding
    pub fn hash(&self) -> &[u8; CERTIFICATE_HASH_SIZE] {
        &self.hash
    }
}

/// The server's long-lived credentials, shared read-only by every request
pub struct ServerCredentials {
    certificate: ServerCertificate,
    private_key: RsaPrivateKey,
}

impl ServerCredentials {
    pub fn new(certificate: ServerCertificate, private_key: RsaPrivateKey) -> Self {
        Self {
            certificate,
            private_key,
        }
    }

    pub fn certificate(&self) -> &ServerCertificate {
        &self.certificate
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey::from(&self.private_key)
    }

    /// SPC version whose wrapped key matches this key's modulus, if any
    pub fn spc_version(&self) -> Option<SpcVersion> {
        match self.private_key.size() {
            128 => Some(SpcVersion::V1),
            256 => Some(SpcVersion::V2),
            _ => None,
        }
    }
}
