//! AES-128 block helpers and randomness
//!
//! CBC and single-block ECB are built directly on the `aes` block cipher.
//! Payloads are always pre-padded TLLV streams, so no padding scheme is
//! applied here. Expanded key schedules are cleared when the cipher drops.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;
use rand::{rngs::OsRng, Rng, RngCore};
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

use crate::types::{SymmetricKey, KEY_SIZE};

/// AES block size
pub const BLOCK_SIZE: usize = 16;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Input of {len} bytes is not a non-empty multiple of the AES block size")]
    UnalignedInput { len: usize },
}

fn check_aligned(data: &[u8]) -> Result<(), CryptoError> {
    if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::UnalignedInput { len: data.len() });
    }
    Ok(())
}

fn cipher(key: &SymmetricKey) -> Aes128 {
    Aes128::new(key.as_bytes().into())
}

/// AES-128-CBC encryption without padding
pub fn aes_cbc_encrypt(
    key: &SymmetricKey,
    iv: &[u8; BLOCK_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    check_aligned(plaintext)?;

    let cipher = cipher(key);
    let mut ciphertext = Vec::with_capacity(plaintext.len());
    let mut prev = *iv;

    for chunk in plaintext.chunks_exact(BLOCK_SIZE) {
        let mut block = GenericArray::clone_from_slice(chunk);
        block
            .iter_mut()
            .zip(prev.iter())
            .for_each(|(b, p)| *b ^= p);
        cipher.encrypt_block(&mut block);
        prev.copy_from_slice(&block);
        ciphertext.extend_from_slice(&block);
    }

    Ok(ciphertext)
}

/// AES-128-CBC decryption without padding
///
/// The plaintext is returned in a zeroizing buffer.
pub fn aes_cbc_decrypt(
    key: &SymmetricKey,
    iv: &[u8; BLOCK_SIZE],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    check_aligned(ciphertext)?;

    let cipher = cipher(key);
    let mut plaintext = Zeroizing::new(Vec::with_capacity(ciphertext.len()));
    let mut prev: &[u8] = iv;

    for chunk in ciphertext.chunks_exact(BLOCK_SIZE) {
        let mut block = GenericArray::clone_from_slice(chunk);
        cipher.decrypt_block(&mut block);
        block
            .iter_mut()
            .zip(prev.iter())
            .for_each(|(b, p)| *b ^= p);
        plaintext.extend_from_slice(&block);
        block.as_mut_slice().zeroize();
        prev = chunk;
    }

    Ok(plaintext)
}

/// Encrypt one block with AES-128-ECB
pub fn aes_ecb_encrypt_block(key: &SymmetricKey, input: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    let mut block = GenericArray::from(*input);
    cipher(key).encrypt_block(&mut block);
    block.into()
}

/// Decrypt one block with AES-128-ECB
pub fn aes_ecb_decrypt_block(key: &SymmetricKey, input: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    let mut block = GenericArray::from(*input);
    cipher(key).decrypt_block(&mut block);
    block.into()
}

/// Generate a random IV for CBC
pub fn generate_iv() -> [u8; BLOCK_SIZE] {
    let mut iv = [0u8; BLOCK_SIZE];
    OsRng.fill_bytes(&mut iv);
    iv
}

/// Generate a random AES-128 key
pub fn generate_key() -> SymmetricKey {
    let mut key = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut key);
    SymmetricKey(key)
}

/// Random filler bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Uniform random count in `0..=max`
pub fn random_count(max: usize) -> usize {
    OsRng.gen_range(0..=max)
}
