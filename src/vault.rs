// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential vault: password-based encryption of wallet private keys.
//!
//! Keys are derived with PBKDF2-HMAC-SHA256 (10,000 iterations) from the
//! user's password and a per-call random salt, then the private key is
//! sealed with AES-256-GCM under a per-call random nonce. Ciphertext,
//! salt and nonce are stored base64-encoded on the wallet record.
//!
//! ## Security Notes
//!
//! - Salt and nonce are freshly generated on every `encrypt` call and
//!   never reused; two encryptions of the same key under the same
//!   password produce unrelated ciphertexts.
//! - A failed GCM tag check is the only signal for a wrong password.
//!   There is no separate password hash to compare against.
//! - Plaintext keys and passwords are NEVER logged.

use std::num::NonZeroU32;

use base64ct::{Base64, Encoding};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};

/// PBKDF2 iteration count. Matches the wallet records already in storage;
/// changing it invalidates every stored ciphertext.
const PBKDF2_ITERATIONS: u32 = 10_000;

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// Derived AES key length in bytes (AES-256).
const KEY_LEN: usize = 32;

/// Errors from vault operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Ciphertext, salt or nonce is not valid base64.
    #[error("malformed base64 input: {0}")]
    Encoding(String),

    /// Salt or nonce has the wrong length.
    #[error("invalid {field} length")]
    InvalidLength { field: &'static str },

    /// GCM open failed: wrong password or tampered ciphertext.
    /// The cipher cannot distinguish the two, and neither do we.
    #[error("decryption failed")]
    Decrypt,

    /// The decrypted key material is not valid UTF-8.
    #[error("decrypted key is not valid UTF-8")]
    InvalidPlaintext,

    /// The system RNG failed to produce bytes.
    #[error("random generator failure")]
    Rng,
}

/// An encrypted private key with its derivation parameters, all base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedKey {
    /// AES-256-GCM ciphertext including the authentication tag.
    pub ciphertext: String,
    /// PBKDF2 salt.
    pub salt: String,
    /// GCM nonce (stored as "iv" on the wallet record).
    pub iv: String,
}

/// Stateless vault over the system RNG.
pub struct KeyVault {
    rng: SystemRandom,
}

impl Default for KeyVault {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyVault {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }

    /// Encrypt a plaintext private key under a password.
    ///
    /// Generates a fresh random salt and nonce, derives a 256-bit key and
    /// seals the plaintext with AES-256-GCM.
    pub fn encrypt(&self, plaintext_key: &str, password: &str) -> Result<EncryptedKey, CryptoError> {
        let mut salt = [0u8; SALT_LEN];
        self.rng.fill(&mut salt).map_err(|_| CryptoError::Rng)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng.fill(&mut nonce_bytes).map_err(|_| CryptoError::Rng)?;

        let key = derive_key(password, &salt);
        let sealing_key = LessSafeKey::new(
            UnboundKey::new(&AES_256_GCM, &key).map_err(|_| CryptoError::Rng)?,
        );

        let mut buffer = plaintext_key.as_bytes().to_vec();
        sealing_key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::empty(),
                &mut buffer,
            )
            .map_err(|_| CryptoError::Rng)?;

        Ok(EncryptedKey {
            ciphertext: Base64::encode_string(&buffer),
            salt: Base64::encode_string(&salt),
            iv: Base64::encode_string(&nonce_bytes),
        })
    }

    /// Decrypt a stored ciphertext with the password and stored parameters.
    ///
    /// Returns [`CryptoError::Decrypt`] when the password is wrong or the
    /// ciphertext was tampered with.
    pub fn decrypt(
        &self,
        ciphertext: &str,
        password: &str,
        salt: &str,
        iv: &str,
    ) -> Result<String, CryptoError> {
        let salt_bytes = decode_b64(salt)?;
        if salt_bytes.len() != SALT_LEN {
            return Err(CryptoError::InvalidLength { field: "salt" });
        }

        let nonce_bytes = decode_b64(iv)?;
        let nonce_arr: [u8; NONCE_LEN] = nonce_bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidLength { field: "iv" })?;

        let mut buffer = decode_b64(ciphertext)?;

        let key = derive_key(password, &salt_bytes);
        let opening_key = LessSafeKey::new(
            UnboundKey::new(&AES_256_GCM, &key).map_err(|_| CryptoError::Decrypt)?,
        );

        let plaintext = opening_key
            .open_in_place(
                Nonce::assume_unique_for_key(nonce_arr),
                Aad::empty(),
                &mut buffer,
            )
            .map_err(|_| CryptoError::Decrypt)?;

        String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::InvalidPlaintext)
    }
}

/// PBKDF2-HMAC-SHA256 key derivation.
fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        NonZeroU32::new(PBKDF2_ITERATIONS).expect("non-zero iteration count"),
        salt,
        password.as_bytes(),
        &mut key,
    );
    key
}

fn decode_b64(input: &str) -> Result<Vec<u8>, CryptoError> {
    Base64::decode_vec(input).map_err(|e| CryptoError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const TEST_PASSWORD: &str = "correct horse battery staple";

    #[test]
    fn encrypt_decrypt_round_trip() {
        let vault = KeyVault::new();
        let sealed = vault.encrypt(TEST_KEY, TEST_PASSWORD).unwrap();

        let opened = vault
            .decrypt(&sealed.ciphertext, TEST_PASSWORD, &sealed.salt, &sealed.iv)
            .unwrap();

        assert_eq!(opened, TEST_KEY);
    }

    #[test]
    fn wrong_password_fails_decrypt() {
        let vault = KeyVault::new();
        let sealed = vault.encrypt(TEST_KEY, TEST_PASSWORD).unwrap();

        let result = vault.decrypt(&sealed.ciphertext, "not the password", &sealed.salt, &sealed.iv);

        assert!(matches!(result, Err(CryptoError::Decrypt)));
    }

    #[test]
    fn fresh_salt_and_iv_every_call() {
        let vault = KeyVault::new();
        let first = vault.encrypt(TEST_KEY, TEST_PASSWORD).unwrap();
        let second = vault.encrypt(TEST_KEY, TEST_PASSWORD).unwrap();

        assert_ne!(first.ciphertext, second.ciphertext);
        assert_ne!(first.salt, second.salt);
        assert_ne!(first.iv, second.iv);
    }

    #[test]
    fn tampered_ciphertext_fails_decrypt() {
        let vault = KeyVault::new();
        let sealed = vault.encrypt(TEST_KEY, TEST_PASSWORD).unwrap();

        let mut raw = Base64::decode_vec(&sealed.ciphertext).unwrap();
        raw[0] ^= 0x01;
        let tampered = Base64::encode_string(&raw);

        let result = vault.decrypt(&tampered, TEST_PASSWORD, &sealed.salt, &sealed.iv);
        assert!(matches!(result, Err(CryptoError::Decrypt)));
    }

    #[test]
    fn malformed_base64_is_encoding_error() {
        let vault = KeyVault::new();
        let result = vault.decrypt("%%%not-base64%%%", TEST_PASSWORD, "also bad", "nope");
        assert!(matches!(result, Err(CryptoError::Encoding(_))));
    }

    #[test]
    fn wrong_salt_length_rejected() {
        let vault = KeyVault::new();
        let sealed = vault.encrypt(TEST_KEY, TEST_PASSWORD).unwrap();
        let short_salt = Base64::encode_string(b"short");

        let result = vault.decrypt(&sealed.ciphertext, TEST_PASSWORD, &short_salt, &sealed.iv);
        assert!(matches!(
            result,
            Err(CryptoError::InvalidLength { field: "salt" })
        ));
    }
}
