//! Standard BIP32 child key derivation over secp256k1.

use super::{hmac_sha512, path::FIRST_HARDENED_CHILD, ECDSA_PRIVATE_VERSION, ECDSA_PUBLIC_VERSION};
use crate::{
    curve::{PointOps, ScalarOps},
    errors::{Error, Result},
    secp256k1::{scalar_from_canonical_bytes, K256Point},
    utils,
};
use k256::Scalar as K256Scalar;
use zeroize::Zeroize;

/// A BIP32 extended key over secp256k1, using the mainnet version bytes.
#[derive(Clone)]
pub struct EcdsaExtendedKey {
    pub(crate) depth: u8,
    pub(crate) parent_fingerprint: [u8; 4],
    pub(crate) child_number: u32,
    pub(crate) chain_code: [u8; 32],
    pub(crate) material: EcdsaMaterial,
}

#[derive(Clone)]
pub(crate) enum EcdsaMaterial {
    Private(K256Scalar),
    Public(K256Point),
}

impl Drop for EcdsaExtendedKey {
    fn drop(&mut self) {
        if let EcdsaMaterial::Private(key) = &mut self.material {
            key.zeroize();
        }
        self.chain_code.zeroize();
    }
}

impl EcdsaExtendedKey {
    /// Wrap a reconstructed root scalar into a depth-0 extended private key.
    pub(crate) fn new_root_private(key: K256Scalar, chain_code: [u8; 32]) -> Self {
        Self {
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
            chain_code,
            material: EcdsaMaterial::Private(key),
        }
    }

    /// Wrap a reconstructed root point into a depth-0 extended public key.
    pub(crate) fn new_root_public(point: K256Point, chain_code: [u8; 32]) -> Self {
        Self {
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
            chain_code,
            material: EcdsaMaterial::Public(point),
        }
    }

    pub(crate) fn is_private(&self) -> bool {
        matches!(self.material, EcdsaMaterial::Private(_))
    }

    pub(crate) fn version(&self) -> [u8; 4] {
        if self.is_private() {
            ECDSA_PRIVATE_VERSION
        } else {
            ECDSA_PUBLIC_VERSION
        }
    }

    fn public_point(&self) -> K256Point {
        match &self.material {
            EcdsaMaterial::Private(key) => K256Point::mul_base(key),
            EcdsaMaterial::Public(point) => *point,
        }
    }

    /// The `Neuter` operation: the public version of this key.
    pub(crate) fn public_key(&self) -> Self {
        Self {
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
            chain_code: self.chain_code,
            material: EcdsaMaterial::Public(self.public_point()),
        }
    }

    /// Raw key bytes: the 32-byte big-endian scalar for private keys, the
    /// 33-byte SEC1 compressed point for public keys.
    pub(crate) fn key_bytes(&self) -> Vec<u8> {
        match &self.material {
            EcdsaMaterial::Private(key) => key.to_be_bytes().to_vec(),
            EcdsaMaterial::Public(point) => point.to_compressed(),
        }
    }

    /// The 33-byte key field of the 78-byte serialization.
    pub(crate) fn serialized_key(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        match &self.material {
            EcdsaMaterial::Private(key) => out[1..].copy_from_slice(&key.to_be_bytes()),
            EcdsaMaterial::Public(point) => out.copy_from_slice(&point.to_compressed()),
        }
        out
    }

    /// Derive the child key at `index` as outlined by BIP32.
    pub(crate) fn new_child(&self, index: u32) -> Result<Self> {
        let hardened = index >= FIRST_HARDENED_CHILD;
        if hardened && !self.is_private() {
            return Err(Error::HardenedChildFromPublic);
        }
        let parent_pub = self.public_point().to_compressed();

        let mut data = Vec::with_capacity(37);
        match &self.material {
            EcdsaMaterial::Private(key) if hardened => {
                data.push(0x00);
                data.extend_from_slice(&key.to_be_bytes());
            }
            _ => data.extend_from_slice(&parent_pub),
        }
        data.extend_from_slice(&index.to_be_bytes());

        let intermediary = hmac_sha512(&self.chain_code, &data);
        let (left, right) = super::split_intermediary(&intermediary);
        // parse256(I_L) must lie strictly below the group order.
        let tweak_bytes: [u8; 32] = (*left).into();
        let tweak = scalar_from_canonical_bytes(&tweak_bytes).ok_or(Error::InvalidChildKey)?;
        let chain_code: [u8; 32] = (*right).into();

        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&utils::hash160(&parent_pub)[..4]);

        let material = match &self.material {
            EcdsaMaterial::Private(key) => {
                let child = ScalarOps::add(&tweak, key);
                if ScalarOps::is_zero(&child) {
                    return Err(Error::InvalidChildKey);
                }
                EcdsaMaterial::Private(child)
            }
            EcdsaMaterial::Public(point) => {
                let child = K256Point::mul_base(&tweak).add(point);
                if child.is_identity() {
                    return Err(Error::InvalidChildKey);
                }
                EcdsaMaterial::Public(child)
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
            let scalar_bytes: [u8; 32] = key[1..].try_into().expect("sliced to 32 bytes");
            let scalar =
                scalar_from_canonical_bytes(&scalar_bytes).ok_or(Error::ScalarOutOfRange)?;
            EcdsaMaterial::Private(scalar)
        } else {
            EcdsaMaterial::Public(K256Point::from_bytes(key.as_slice())?)
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
