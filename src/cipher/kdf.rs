// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    errors::{Error, Result},
    utils,
};
use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};
use tracing::error;
use zeroize::Zeroizing;

/// Hash identifier for HMAC-SHA-256, as recorded in share files.
pub const HASH_SHA256: u32 = 5;
/// Hash identifier for HMAC-SHA-512, as recorded in share files.
pub const HASH_SHA512: u32 = 7;

/// PBKDF2 parameters stored next to an encrypted share.
///
/// `length`, `iterations`, `salt` and `hash_type` uniquely fix the PBKDF2
/// instance; the recorded hash identifier is honored and anything other than
/// SHA-256 or SHA-512 is rejected. `hash_name` is informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kdf {
    pub length: usize,
    pub iterations: u32,
    /// Hex-encoded random salt, `0x` prefixed.
    pub salt: String,
    pub hash_type: u32,
    #[serde(default)]
    pub hash_name: Option<String>,
}

impl Kdf {
    /// Stretch a passphrase into `length` key bytes.
    pub fn derive_key(&self, passphrase: &str) -> Result<Zeroizing<Vec<u8>>> {
        let salt = utils::decode(&self.salt)?;
        let mut key = Zeroizing::new(vec![0u8; self.length]);
        match self.hash_type {
            HASH_SHA256 => {
                pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), &salt, self.iterations, &mut key)
            }
            HASH_SHA512 => {
                pbkdf2_hmac::<Sha512>(passphrase.as_bytes(), &salt, self.iterations, &mut key)
            }
            other => {
                error!("KDF record names unsupported hash identifier {other}");
                return Err(Error::UnknownKdfHash(other));
            }
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_kdf(hash_type: u32) -> Kdf {
        Kdf {
            length: 32,
            iterations: 1024,
            salt: "0x000102030405060708090a0b0c0d0e0f".into(),
            hash_type,
            hash_name: None,
        }
    }

    #[test]
    fn derivation_is_deterministic_per_hash() {
        let sha256_key = test_kdf(HASH_SHA256).derive_key("passphrase").unwrap();
        let sha512_key = test_kdf(HASH_SHA512).derive_key("passphrase").unwrap();
        assert_eq!(sha256_key.len(), 32);
        assert_eq!(sha512_key.len(), 32);
        assert_ne!(sha256_key, sha512_key);
        assert_eq!(
            *sha256_key,
            *test_kdf(HASH_SHA256).derive_key("passphrase").unwrap()
        );
    }

    #[test]
    fn unknown_hash_identifier_is_fatal() {
        let err = test_kdf(6).derive_key("passphrase").unwrap_err();
        assert!(matches!(err, Error::UnknownKdfHash(6)));
    }

    #[test]
    fn kdf_record_parses_from_group_json() {
        let kdf: Kdf = serde_json::from_str(
            r#"{"length":32,"iterations":100000,"salt":"0xdeadbeef","hash_type":5,"hash_name":"SHA-256"}"#,
        )
        .unwrap();
        assert_eq!(kdf.hash_type, HASH_SHA256);
        assert_eq!(kdf.hash_name.as_deref(), Some("SHA-256"));
    }
}
