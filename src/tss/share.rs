// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    cipher::Aes256Gcm,
    curve::{CurveOps, PointOps, ScalarOps},
    errors::{Error, Result},
    group::{Participant, ShareInfo},
    utils,
};
use serde::Deserialize;
use tracing::info;
use zeroize::{Zeroize, Zeroizing};

/// A decrypted secret share: the Shamir abscissa and the share value.
///
/// The share value is wiped from memory when the share is dropped.
pub struct Share<C: CurveOps> {
    pub id: C::Scalar,
    pub xi: C::Scalar,
}

impl<C: CurveOps> Drop for Share<C> {
    fn drop(&mut self) {
        self.xi.zeroize();
    }
}

impl<C: CurveOps> std::fmt::Debug for Share<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Share")
            .field("id", &self.id)
            .field("xi", &"[redacted]")
            .finish()
    }
}

impl<C: CurveOps> Clone for Share<C> {
    fn clone(&self) -> Self {
        Share { id: self.id, xi: self.xi }
    }
}

/// A participant's share public key at its Shamir abscissa.
pub struct SharePub<C: CurveOps> {
    pub id: C::Scalar,
    pub point: C::Point,
}

impl<C: CurveOps> Clone for SharePub<C> {
    fn clone(&self) -> Self {
        SharePub { id: self.id, point: self.point }
    }
}

impl<C: CurveOps> std::fmt::Debug for SharePub<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharePub")
            .field("id", &self.id)
            .field("point", &self.point)
            .finish()
    }
}

/// Inner envelope of version 2 and 3 share ciphertexts. The wrapper carries
/// no cryptographic weight (the inner bytes are already plaintext after the
/// AEAD opens) but is preserved for compatibility with issued share files.
#[derive(Deserialize)]
struct ShareEnvelope {
    #[serde(with = "utils::base64_bytes")]
    encrypted_share: Vec<u8>,
}

/// Decrypt the stored share ciphertext and peel the version-specific
/// envelope, returning the raw big-endian share value.
pub fn decrypt_share(
    share_info: &ShareInfo,
    version: i32,
    passphrase: &str,
) -> Result<Zeroizing<Vec<u8>>> {
    let kdf = share_info
        .kdf
        .as_ref()
        .ok_or_else(|| Error::StructuralInvariant("encrypted share KDF is missing".into()))?;
    let cipher = Aes256Gcm::with_passphrase(passphrase, kdf)?;
    let plaintext = cipher.decrypt(&share_info.encrypted_share)?;

    if version >= 2 {
        let envelope: ShareEnvelope = serde_json::from_slice(&plaintext)
            .map_err(|e| Error::InputShape(format!("share envelope does not parse: {e}")))?;
        Ok(Zeroizing::new(envelope.encrypted_share))
    } else {
        Ok(plaintext)
    }
}

/// Decrypt a share and bind it to its abscissa.
pub fn build_share<C: CurveOps>(
    share_info: &ShareInfo,
    version: i32,
    passphrase: &str,
) -> Result<Share<C>> {
    let plaintext = decrypt_share(share_info, version, passphrase)?;
    let id = C::Scalar::from_decimal(&share_info.share_id)?;
    let xi = C::Scalar::reduce_be_bytes(&plaintext)?;
    Ok(Share { id, xi })
}

/// Parse a participant record into its share public key and abscissa.
pub fn build_share_pub<C: CurveOps>(participant: &Participant) -> Result<SharePub<C>> {
    let bytes = utils::decode(&participant.share_pubkey)?;
    let point = C::Point::from_bytes(&bytes)?;
    let id = C::Scalar::from_decimal(&participant.share_id)?;
    Ok(SharePub { id, point })
}

/// Decrypt the share and check that its public image matches the share
/// public key stored in the group file.
pub fn verify_share_pubkey<C: CurveOps>(
    share_info: &ShareInfo,
    version: i32,
    passphrase: &str,
) -> Result<()> {
    let share = build_share::<C>(share_info, version, passphrase)?;
    let derived = C::Point::mul_base(&share.xi);
    info!(
        "Derived share public key: {}",
        utils::encode(&derived.to_compressed())
    );

    let stored = C::Point::from_bytes(&utils::decode(&share_info.share_pubkey)?)?;
    if derived != stored {
        return Err(Error::SharePublicKeyMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cipher::{Kdf, HASH_SHA256},
        secp256k1::Secp256k1,
    };

    const PASSPHRASE: &str = "very secret passphrase";

    fn kdf() -> Kdf {
        Kdf {
            length: 32,
            iterations: 256,
            salt: "0x101112131415161718191a1b1c1d1e1f".into(),
            hash_type: HASH_SHA256,
            hash_name: None,
        }
    }

    fn share_info(version: i32, xi: &[u8], share_id: &str) -> ShareInfo {
        let cipher = Aes256Gcm::with_passphrase(PASSPHRASE, &kdf()).unwrap();
        let plaintext = if version >= 2 {
            use base64::Engine;
            let inner = base64::engine::general_purpose::STANDARD.encode(xi);
            format!(r#"{{"encrypted_share":"{inner}"}}"#).into_bytes()
        } else {
            xi.to_vec()
        };
        let scalar = <Secp256k1 as CurveOps>::Scalar::reduce_be_bytes(xi).unwrap();
        let pubkey = <Secp256k1 as CurveOps>::Point::mul_base(&scalar);
        ShareInfo {
            node_id: "node-1".into(),
            share_id: share_id.into(),
            share_pubkey: utils::encode(&pubkey.to_compressed()),
            encrypted_share: cipher.encrypt(&plaintext).unwrap(),
            kdf: Some(kdf()),
        }
    }

    #[test]
    fn v1_share_round_trips() {
        let info = share_info(1, &[0x13u8; 32], "7");
        let share = build_share::<Secp256k1>(&info, 1, PASSPHRASE).unwrap();
        assert_eq!(share.xi.to_be_bytes(), [0x13u8; 32]);
        assert_eq!(
            share.id,
            <Secp256k1 as CurveOps>::Scalar::from_u64(7)
        );
    }

    #[test]
    fn v2_share_peels_the_json_envelope() {
        let info = share_info(2, &[0x27u8; 32], "9");
        let share = build_share::<Secp256k1>(&info, 2, PASSPHRASE).unwrap();
        assert_eq!(share.xi.to_be_bytes(), [0x27u8; 32]);
    }

    #[test]
    fn wrong_passphrase_is_an_auth_failure() {
        let info = share_info(1, &[0x13u8; 32], "7");
        let err = build_share::<Secp256k1>(&info, 1, "not the passphrase").unwrap_err();
        assert!(matches!(err, Error::DecryptAuthFailed));
    }

    #[test]
    fn tampered_ciphertext_is_an_auth_failure() {
        let mut info = share_info(1, &[0x13u8; 32], "7");
        info.encrypted_share[20] ^= 0x01;
        let err = build_share::<Secp256k1>(&info, 1, PASSPHRASE).unwrap_err();
        assert!(matches!(err, Error::DecryptAuthFailed));
    }

    #[test]
    fn tampered_salt_is_an_auth_failure() {
        let mut info = share_info(1, &[0x13u8; 32], "7");
        info.kdf.as_mut().unwrap().salt = "0x101112131415161718191a1b1c1d1e10".into();
        let err = build_share::<Secp256k1>(&info, 1, PASSPHRASE).unwrap_err();
        assert!(matches!(err, Error::DecryptAuthFailed));
    }

    #[test]
    fn share_pubkey_verification() {
        let info = share_info(1, &[0x13u8; 32], "7");
        verify_share_pubkey::<Secp256k1>(&info, 1, PASSPHRASE).unwrap();

        let mut wrong = share_info(1, &[0x13u8; 32], "7");
        wrong.share_pubkey = share_info(1, &[0x14u8; 32], "7").share_pubkey;
        let err = verify_share_pubkey::<Secp256k1>(&wrong, 1, PASSPHRASE).unwrap_err();
        assert!(matches!(err, Error::SharePublicKeyMismatch));
    }
}
