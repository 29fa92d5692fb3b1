//! Non-hardened child key derivation over Ed25519.
//!
//! This is the custody scheme's own minimal derivation, not SLIP-10: only
//! indices below 2^31 are derivable, the HMAC input is always the 33-byte
//! public encoding (even for private parents), and the additive-tweak rules
//! otherwise mirror BIP32. Substituting any other Ed25519 scheme would break
//! compatibility with issued share files.

use super::{hmac_sha512, path::FIRST_HARDENED_CHILD, EDDSA_PRIVATE_VERSION, EDDSA_PUBLIC_VERSION};
use crate::{
    curve::{PointOps, ScalarOps},
    edwards::EdPoint,
    errors::{Error, Result},
    utils,
};
use curve25519_dalek::scalar::Scalar as EdScalar;
use zeroize::Zeroize;

/// An extended key over Ed25519 with the `cprv`/`cpub` version bytes.
#[derive(Clone)]
pub struct EddsaExtendedKey {
    pub(crate) depth: u8,
    pub(crate) parent_fingerprint: [u8; 4],
    pub(crate) child_number: u32,
    pub(crate) chain_code: [u8; 32],
    pub(crate) material: EddsaMaterial,
}

#[derive(Clone)]
pub(crate) enum EddsaMaterial {
    Private(EdScalar),
    Public(EdPoint),
}

impl Drop for EddsaExtendedKey {
    fn drop(&mut self) {
        if let EddsaMaterial::Private(key) = &mut self.material {
            key.zeroize();
        }
        self.chain_code.zeroize();
    }
}

impl EddsaExtendedKey {
    pub(crate) fn new_root_private(key: EdScalar, chain_code: [u8; 32]) -> Self {
        Self {
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
            chain_code,
            material: EddsaMaterial::Private(key),
        }
    }

    pub(crate) fn new_root_public(point: EdPoint, chain_code: [u8; 32]) -> Self {
        Self {
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
            chain_code,
            material: EddsaMaterial::Public(point),
        }
    }

    pub(crate) fn is_private(&self) -> bool {
        matches!(self.material, EddsaMaterial::Private(_))
    }

    pub(crate) fn version(&self) -> [u8; 4] {
        if self.is_private() {
            EDDSA_PRIVATE_VERSION
        } else {
            EDDSA_PUBLIC_VERSION
        }
    }

    fn public_point(&self) -> EdPoint {
        match &self.material {
            EddsaMaterial::Private(key) => EdPoint::mul_base(key),
            EddsaMaterial::Public(point) => *point,
        }
    }

    pub(crate) fn public_key(&self) -> Self {
        Self {
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
            chain_code: self.chain_code,
            material: EddsaMaterial::Public(self.public_point()),
        }
    }

    /// Raw key bytes: the 32-byte big-endian scalar for private keys, the
    /// 33-byte prefixed compressed point for public keys.
    pub(crate) fn key_bytes(&self) -> Vec<u8> {
        match &self.material {
            EddsaMaterial::Private(key) => key.to_be_bytes().to_vec(),
            EddsaMaterial::Public(point) => point.to_compressed(),
        }
    }

    /// The 33-byte key field of the 78-byte serialization. Private keys pad
    /// with a leading zero to match the public encoding length.
    pub(crate) fn serialized_key(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        match &self.material {
            EddsaMaterial::Private(key) => out[1..].copy_from_slice(&key.to_be_bytes()),
            EddsaMaterial::Public(point) => out.copy_from_slice(&point.to_compressed()),
        }
        out
    }

    /// Derive the non-hardened child key at `index`.
    pub(crate) fn new_child(&self, index: u32) -> Result<Self> {
        // Hardened derivation is undefined for this scheme, whether the
        // parent is private or public.
        if index >= FIRST_HARDENED_CHILD {
            return Err(Error::HardenedChildForEd25519);
        }

        let parent_pub = self.public_point().to_compressed();
        let mut data = Vec::with_capacity(37);
        data.extend_from_slice(&parent_pub);
        data.extend_from_slice(&index.to_be_bytes());

        let intermediary = hmac_sha512(&self.chain_code, &data);
        let (left, right) = super::split_intermediary(&intermediary);
        let tweak = EdScalar::reduce_be_bytes(left.as_slice())?;
        let chain_code: [u8; 32] = (*right).into();

        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&utils::hash160(&parent_pub)[..4]);

        let material = match &self.material {
            EddsaMaterial::Private(key) => {
                let child = ScalarOps::add(&tweak, key);
                if ScalarOps::is_zero(&child) {
                    return Err(Error::InvalidChildKey);
                }
                EddsaMaterial::Private(child)
            }
            EddsaMaterial::Public(point) => {
                EddsaMaterial::Public(EdPoint::mul_base(&tweak).add(point))
            }
        };

        Ok(Self {
            depth: self.depth + 1,
            parent_fingerprint,
            child_number: index,
            chain_code,
            material,
        })
    }

    /// Rebuild a key from its deserialized fields.
    pub(crate) fn from_parts(
        is_private: bool,
        key: &[u8; 33],
        depth: u8,
        parent_fingerprint: [u8; 4],
        child_number: u32,
        chain_code: [u8; 32],
    ) -> Result<Self> {
        let material = if is_private {
            let scalar = EdScalar::reduce_be_bytes(&key[1..])?;
            EddsaMaterial::Private(scalar)
        } else {
            EddsaMaterial::Public(EdPoint::from_bytes(key.as_slice())?)
        };
        Ok(Self {
            depth,
            parent_fingerprint,
            child_number,
            chain_code,
            material,
        })
    }
}
