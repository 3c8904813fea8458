//! Common test utilities for the KSM integration tests
//!
//! The [`Client`] plays the device side of the exchange: it wraps the outer
//! R1 and the inner R1' for the server, builds SPCs and opens the CKCs that
//! come back. The two secrets always differ.

#![allow(dead_code)]

use ksm_crypto::{
    aes_cbc_decrypt, aes_cbc_encrypt, calculate_cmac, generate_iv, random_bytes,
    AesEcbDerivation, KeyDerivation, KeyEncapsulation, RsaOaepKem, SessionKeys, SessionSecret,
};
use ksm_protocol::binary::BinaryWrite;
use ksm_protocol::{
    decode_records, encode_records, CkcFrame, SpcFrame, SpcVersion, Tag, TllvError, TllvRecord,
    CERTIFICATE_HASH_SIZE,
};
use ksm_server::{ServerCertificate, ServerCredentials};
use rand::rngs::OsRng;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::{RsaPrivateKey, RsaPublicKey};

pub const CERT_PEM: &str = include_str!("../fixtures/server_cert.pem");
pub const KEY_PEM: &str = include_str!("../fixtures/server_key.pem");

/// Sample SPC encrypted to the fixture certificate
pub const SPC1: &[u8] = include_bytes!("../fixtures/spc1.bin");

/// R1 wrapped in the outer frame of [`SPC1`]
pub const SPC1_R1: [u8; 16] = [
    0xd0, 0xb7, 0xe0, 0xa1, 0xc5, 0xf3, 0xa8, 0xe6, 0x1b, 0x2c, 0x4d, 0x5e, 0x6f, 0x70, 0x81, 0x92,
];

/// The RSA-2048 server behind [`SPC2`]
pub const CERT_2048_PEM: &str = include_str!("../fixtures/server2048_cert.pem");
pub const KEY_2048_PEM: &str = include_str!("../fixtures/server2048_key.pem");

/// Version 2 SPC with a 1984-byte payload, encrypted to the RSA-2048 certificate
pub const SPC2: &[u8] = include_bytes!("../fixtures/spc2.bin");
pub const SPC2_R1: [u8; 16] = [
    0x2b, 0x0e, 0x3c, 0x9f, 0x41, 0xd6, 0xa7, 0x58, 0x1e, 0x2f, 0x3a, 0x4b, 0x5c, 0x6d, 0x7e, 0x8f,
];
/// R1' wrapped in the SessionKey_R1 record of [`SPC2`]
pub const SPC2_INNER_R1: [u8; 16] = [
    0xa1, 0xb2, 0xc3, 0xd4, 0xe5, 0xf6, 0x07, 0x18, 0x29, 0x3a, 0x4b, 0x5c, 0x6d, 0x7e, 0x8f, 0x90,
];

/// Version 1 SPC with a 3952-byte payload, encrypted to the fixture certificate
pub const SPC3: &[u8] = include_bytes!("../fixtures/spc3.bin");
pub const SPC3_R1: [u8; 16] = [
    0x5e, 0x0f, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e, 0x6f, 0x70, 0x81, 0x92, 0xa3, 0xb4, 0xc5, 0xd6, 0xe7,
];
pub const SPC3_INNER_R1: [u8; 16] = [
    0xc0, 0xff, 0xee, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc,
];

/// Byte offsets in a version 1 SPC header
pub const SPC_VERSION_OFFSET: usize = 0;
pub const SPC_WRAPPED_KEY_OFFSET: usize = 24;
pub const SPC_V1_CERT_HASH_OFFSET: usize = 152;
pub const SPC_V1_PAYLOAD_LENGTH_OFFSET: usize = 172;

fn pem_credentials(certificate_pem: &str, key_pem: &str) -> ServerCredentials {
    let certificate = pem::parse(certificate_pem).expect("fixture certificate");
    let private_key = RsaPrivateKey::from_pkcs1_pem(key_pem).expect("fixture key");
    ServerCredentials::new(
        ServerCertificate::from_der(certificate.into_contents()),
        private_key,
    )
}

/// The 1024-bit test key pair in `tests/fixtures`
pub fn fixture_credentials() -> ServerCredentials {
    pem_credentials(CERT_PEM, KEY_PEM)
}

/// The 2048-bit test key pair in `tests/fixtures`
pub fn fixture_2048_credentials() -> ServerCredentials {
    pem_credentials(CERT_2048_PEM, KEY_2048_PEM)
}

/// Fresh credentials with a key of `bits` and an opaque certificate blob
pub fn generated_credentials(bits: usize) -> ServerCredentials {
    let private_key = RsaPrivateKey::new(&mut OsRng, bits).expect("key generation");
    let der = format!("test certificate rsa-{}", bits).into_bytes();
    ServerCredentials::new(ServerCertificate::from_der(der), private_key)
}

/// Overwrite a big-endian u32 in an encoded message
pub fn set_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

pub fn tag_list(tags: &[Tag]) -> Vec<u8> {
    tags.iter().flat_map(|tag| tag.to_be_bytes()).collect()
}

/// Replace the value of every record with `tag`
pub fn set_value(records: &mut [(Tag, Vec<u8>)], tag: Tag, value: Vec<u8>) {
    for (record_tag, record_value) in records.iter_mut() {
        if *record_tag == tag {
            *record_value = value.clone();
        }
    }
}

pub fn without(records: &[(Tag, Vec<u8>)], tag: Tag) -> Vec<(Tag, Vec<u8>)> {
    records.iter().filter(|(t, _)| *t != tag).cloned().collect()
}

/// Decrypt a CKC payload with `keys` and decode its records
pub fn open_ckc_with(keys: &SessionKeys, ckc: &[u8]) -> Result<Vec<TllvRecord>, TllvError> {
    let frame = CkcFrame::parse(ckc).expect("CKC frame");
    let stream = aes_cbc_decrypt(&keys.encryption, &frame.iv, &frame.payload).unwrap();
    decode_records(&stream)
}

/// Device side of the exchange
pub struct Client {
    public_key: RsaPublicKey,
    certificate_hash: [u8; CERTIFICATE_HASH_SIZE],
    version: SpcVersion,
    outer_r1: SessionSecret,
    outer_keys: SessionKeys,
    r1: SessionSecret,
    keys: SessionKeys,
    pub anti_replay_seed: [u8; 16],
    pub r2: Vec<u8>,
    pub asset_id: Vec<u8>,
    pub transaction_id: Vec<u8>,
    pub return_request: Vec<Tag>,
}

impl Client {
    pub fn new(credentials: &ServerCredentials) -> Self {
        Self::with_derivation(credentials, &AesEcbDerivation)
    }

    pub fn with_derivation(credentials: &ServerCredentials, derivation: &dyn KeyDerivation) -> Self {
        let outer_r1 = SessionSecret::new(rand::random());
        let mut inner = rand::random::<[u8; 16]>();
        while &inner == outer_r1.as_bytes() {
            inner = rand::random();
        }
        let r1 = SessionSecret::new(inner);
        Self {
            public_key: credentials.public_key(),
            certificate_hash: *credentials.certificate().hash(),
            version: credentials.spc_version().expect("1024 or 2048-bit key"),
            outer_keys: SessionKeys::derive(derivation, &outer_r1),
            keys: SessionKeys::derive(derivation, &r1),
            outer_r1,
            r1,
            anti_replay_seed: rand::random(),
            r2: random_bytes(21),
            asset_id: b"asset-0001".to_vec(),
            transaction_id: vec![0x14, 0x73, 0xe5, 0xcc, 0x53, 0xe1, 0xe5, 0xd6],
            return_request: vec![
                Tag::ENCRYPTED_CONTENT_KEY,
                Tag::ANTI_REPLAY_SEED,
                Tag::R2,
                Tag::SESSION_KEY_R1_INTEGRITY,
                Tag::TRANSACTION_ID,
            ],
        }
    }

    /// Keys from the inner R1', which protect the CKC
    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// Keys from the outer R1, which protect only the SPC payload
    pub fn outer_keys(&self) -> &SessionKeys {
        &self.outer_keys
    }

    pub fn version(&self) -> SpcVersion {
        self.version
    }

    fn wrap(&self, secret: &SessionSecret) -> Vec<u8> {
        RsaOaepKem::with_sha1()
            .wrap(secret.as_bytes(), &self.public_key)
            .expect("RSA-OAEP wrap")
    }

    /// R1' for the SessionKey_R1 record
    pub fn wrapped_r1(&self) -> Vec<u8> {
        self.wrap(&self.r1)
    }

    /// R1 for the outer frame
    pub fn wrapped_outer_r1(&self) -> Vec<u8> {
        self.wrap(&self.outer_r1)
    }

    /// Every record a well-formed SPC carries
    pub fn records(&self) -> Vec<(Tag, Vec<u8>)> {
        let session_key = self.wrapped_r1();
        let integrity = calculate_cmac(&self.keys.integrity, &session_key);
        vec![
            (Tag::SESSION_KEY_R1_INTEGRITY, integrity.to_vec()),
            (Tag::SESSION_KEY_R1, session_key),
            (Tag::ANTI_REPLAY_SEED, self.anti_replay_seed.to_vec()),
            (Tag::R2, self.r2.clone()),
            (Tag::ASSET_ID, self.asset_id.clone()),
            (Tag::TRANSACTION_ID, self.transaction_id.clone()),
            (Tag::PROTOCOL_VERSION_USED, vec![0, 0, 0, 1]),
            (Tag::PROTOCOL_VERSIONS_SUPPORTED, vec![0, 0, 0, 1]),
            (Tag::RETURN_REQUEST, tag_list(&self.return_request)),
        ]
    }

    pub fn spc(&self) -> Vec<u8> {
        self.spc_from(&self.records())
    }

    /// Encrypt and frame an arbitrary record list
    pub fn spc_from(&self, records: &[(Tag, Vec<u8>)]) -> Vec<u8> {
        let records: Vec<TllvRecord> = records
            .iter()
            .map(|(tag, value)| {
                let filler = (16 - value.len() % 16) % 16 + 16;
                TllvRecord::with_padding(*tag, value.clone(), random_bytes(filler)).unwrap()
            })
            .collect();
        let stream = encode_records(&records).unwrap();

        let session_iv = generate_iv();
        let payload = aes_cbc_encrypt(&self.outer_keys.encryption, &session_iv, &stream).unwrap();
        SpcFrame {
            version: self.version,
            reserved: 0,
            session_iv,
            encrypted_session_key: self.wrapped_outer_r1(),
            certificate_hash: self.certificate_hash,
            payload,
        }
        .to_bytes()
        .unwrap()
    }

    /// Decrypt a CKC into its frame and records
    pub fn open_ckc(&self, ckc: &[u8]) -> (CkcFrame, Vec<TllvRecord>) {
        let frame = CkcFrame::parse(ckc).expect("CKC frame");
        let records = open_ckc_with(&self.keys, ckc).expect("CKC records");
        (frame, records)
    }

    /// Content key and IV from an EncryptedContentKey value
    pub fn content_key(&self, value: &[u8]) -> ([u8; 16], [u8; 16]) {
        assert_eq!(value.len(), 48);
        let mut wrap_iv = [0u8; 16];
        wrap_iv.copy_from_slice(&value[..16]);
        let plain = aes_cbc_decrypt(&self.keys.encryption, &wrap_iv, &value[16..]).unwrap();

        let mut key = [0u8; 16];
        let mut iv = [0u8; 16];
        key.copy_from_slice(&plain[..16]);
        iv.copy_from_slice(&plain[16..]);
        (key, iv)
    }

    /// Integrity value the server must return for these response records
    pub fn expected_integrity(&self, records: &[TllvRecord]) -> [u8; 16] {
        let mut covered = Vec::new();
        for record in records {
            if record.tag() == Tag::SESSION_KEY_R1_INTEGRITY {
                continue;
            }
            covered.extend_from_slice(&record.tag().to_be_bytes());
            covered.extend_from_slice(&(record.value_length() as u32).to_be_bytes());
            covered.extend_from_slice(record.value());
        }
        calculate_cmac(&self.keys.integrity, &covered)
    }
}
