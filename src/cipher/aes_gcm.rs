// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    cipher::Kdf,
    errors::{Error, Result},
};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    AeadCore, Aes256Gcm as Aes256GcmImpl, Nonce,
};
use tracing::error;
use zeroize::Zeroizing;

/// AES-256-GCM with the nonce prepended to the ciphertext.
///
/// The stored share format seals with an empty additional-data string and a
/// random nonce of the AEAD's native size (12 bytes).
pub struct Aes256Gcm {
    aead: Aes256GcmImpl,
}

impl Aes256Gcm {
    /// Build a cipher from a raw 32-byte key.
    pub fn new(key: &[u8]) -> Result<Self> {
        let aead = Aes256GcmImpl::new_from_slice(key).map_err(|_| {
            error!("AES-256-GCM requires a 32-byte key, got {} bytes", key.len());
            Error::BadInput("AES-256-GCM requires a 32-byte key".into())
        })?;
        Ok(Self { aead })
    }

    /// Build a cipher by stretching `passphrase` with the stored KDF
    /// parameters.
    pub fn with_passphrase(passphrase: &str, kdf: &Kdf) -> Result<Self> {
        let key = kdf.derive_key(passphrase)?;
        Self::new(&key)
    }

    /// Seal `msg`, returning `nonce ∥ ciphertext ∥ tag`.
    pub fn encrypt(&self, msg: &[u8]) -> Result<Vec<u8>> {
        let nonce = Aes256GcmImpl::generate_nonce(&mut OsRng);
        let ciphertext = self
            .aead
            .encrypt(&nonce, msg)
            .map_err(|_| Error::BadInput("AES-256-GCM encryption failed".into()))?;
        let mut out = nonce.to_vec();
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Open `nonce ∥ ciphertext ∥ tag`. Tag verification failure means a
    /// wrong passphrase or a tampered share and is reported as such.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let nonce_size = 12;
        if ciphertext.len() < nonce_size {
            error!("Ciphertext shorter than the AEAD nonce");
            return Err(Error::DecryptAuthFailed);
        }
        let (nonce, body) = ciphertext.split_at(nonce_size);
        let plaintext = self
            .aead
            .decrypt(Nonce::from_slice(nonce), body)
            .map_err(|_| Error::DecryptAuthFailed)?;
        Ok(Zeroizing::new(plaintext))
    }
}
