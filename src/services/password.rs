// SPDX-License-Identifier: MIT

//! Password handling: one-way bcrypt hash for login verification plus an
//! authenticated reversible copy for the admin recovery view.
//!
//! Encrypted format: 12-byte random nonce ‖ 16-byte GCM tag ‖ ciphertext,
//! base64-encoded. Decryption verifies the tag before returning plaintext,
//! so any tampered byte fails authentication.

use crate::error::AppError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Encrypts and verifies user passwords with a process-wide symmetric key.
#[derive(Clone)]
pub struct PasswordVault {
    key: Vec<u8>,
    rng: SystemRandom,
}

impl PasswordVault {
    /// Create a vault from a 32-byte AES-256-GCM key.
    pub fn new(key: &[u8]) -> Result<Self, AppError> {
        if key.len() != AES_256_GCM.key_len() {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Password key must be {} bytes, got {}",
                AES_256_GCM.key_len(),
                key.len()
            )));
        }
        Ok(Self {
            key: key.to_vec(),
            rng: SystemRandom::new(),
        })
    }

    /// Hash a password for login verification.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a stored bcrypt hash.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        bcrypt::verify(password, hash)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password verification failed: {}", e)))
    }

    /// Encrypt plaintext, returning base64 of nonce ‖ tag ‖ ciphertext.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, AppError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Nonce generation failed")))?;

        let key = self.sealing_key()?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut ciphertext = plaintext.as_bytes().to_vec();
        let tag = key
            .seal_in_place_separate_tag(nonce, Aad::empty(), &mut ciphertext)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Password encryption failed")))?;

        let mut out = Vec::with_capacity(NONCE_LEN + TAG_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(tag.as_ref());
        out.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(out))
    }

    /// Decrypt a stored blob, verifying the authentication tag.
    pub fn decrypt(&self, encrypted_b64: &str) -> Result<String, AppError> {
        let data = BASE64
            .decode(encrypted_b64)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Encrypted password is not base64")))?;

        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Encrypted password too short"
            )));
        }

        let (nonce_bytes, rest) = data.split_at(NONCE_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);

        // ring expects ciphertext ‖ tag, the stored layout is nonce ‖ tag ‖ ct
        let mut in_out = ciphertext.to_vec();
        in_out.extend_from_slice(tag);

        let key = self.sealing_key()?;
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid nonce length")))?;

        let plaintext = key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| {
                AppError::Internal(anyhow::anyhow!("Password decryption failed authentication"))
            })?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("UTF-8 decode failed: {}", e)))
    }

    fn sealing_key(&self) -> Result<LessSafeKey, AppError> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid AES key")))?;
        Ok(LessSafeKey::new(unbound))
    }
}
