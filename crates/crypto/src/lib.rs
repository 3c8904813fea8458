//! Cryptographic primitives for the SPC/CKC key exchange
//!
//! - Zeroizing key types for the session secret and derived keys
//! - AES-128 CBC and single-block ECB helpers
//! - AES-CMAC integrity values with constant-time verification
//! - Session key derivation strategies
//! - RSA-OAEP key encapsulation
//!
//! # Security Features
//!
//! - **Zeroization**: key material uses `zeroize` to clear memory on drop
//! - **Constant-time comparison**: integrity checks use `subtle::ConstantTimeEq`
//!
//! # Example
//!
//! ```
//! use ksm_crypto::{AesEcbDerivation, SessionKeys, SessionSecret, aes_cbc_decrypt, aes_cbc_encrypt, generate_iv};
//!
//! let r1 = SessionSecret::new([0x3d; 16]);
//! let keys = SessionKeys::derive(&AesEcbDerivation, &r1);
//!
//! let iv = generate_iv();
//! let ciphertext = aes_cbc_encrypt(&keys.encryption, &iv, &[0u8; 32]).unwrap();
//! let plaintext = aes_cbc_decrypt(&keys.encryption, &iv, &ciphertext).unwrap();
//! assert_eq!(plaintext.as_slice(), &[0u8; 32]);
//! ```

pub mod helpers;
pub mod integrity;
pub mod kdf;
pub mod kem;
pub mod types;

// Re-export commonly used types
pub use helpers::{
    aes_cbc_decrypt, aes_cbc_encrypt, aes_ecb_decrypt_block, aes_ecb_encrypt_block, generate_iv,
    generate_key, random_bytes, random_count, CryptoError, BLOCK_SIZE,
};
pub use integrity::{
    calculate_cmac, calculate_cmac_parts, constant_time_eq, verify_cmac, IntegrityError, CMAC_SIZE,
};
pub use kdf::{
    derivation_by_name, AesEcbDerivation, CmacDerivation, KeyDerivation, KeyPurpose, SessionKeys,
};
pub use kem::rsa::{OaepHash, RsaOaepKem};
pub use kem::{KemError, KeyEncapsulation};
pub use types::{KeyError, SessionSecret, SymmetricKey, KEY_SIZE};

pub use rsa;
pub use sha1;
