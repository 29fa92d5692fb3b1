//! Child key derivation.
//!
//! A single [`ExtendedKey`] sum type covers both supported curves: standard
//! BIP32 over secp256k1 (hardened and non-hardened), and the custody
//! scheme's non-hardened-only Ed25519 variant with its own version bytes.
//! All call sites dispatch at the variant boundary.

mod ecdsa;
mod eddsa;
pub mod path;

pub use ecdsa::EcdsaExtendedKey;
pub use eddsa::EddsaExtendedKey;
pub use path::{format_path, parse_path, FIRST_HARDENED_CHILD};

use crate::{
    curve::{CurveKind, CurveOps},
    edwards::{Ed25519, EdPoint},
    errors::{Error, Result},
    secp256k1::{K256Point, Secp256k1},
    utils,
};
use generic_array::{
    typenum::{U32, U64},
    GenericArray,
};
use hmac::Mac;

type HmacSha512 = hmac::Hmac<sha2::Sha512>;

/// Version bytes of a mainnet BIP32 extended private key (`xprv…`).
pub const ECDSA_PRIVATE_VERSION: [u8; 4] = [0x04, 0x88, 0xad, 0xe4];
/// Version bytes of a mainnet BIP32 extended public key (`xpub…`).
pub const ECDSA_PUBLIC_VERSION: [u8; 4] = [0x04, 0x88, 0xb2, 0x1e];
/// Version bytes of an Ed25519 extended private key (`cprv…`).
pub const EDDSA_PRIVATE_VERSION: [u8; 4] = [0x02, 0xe8, 0xda, 0x54];
/// Version bytes of an Ed25519 extended public key (`cpub…`).
pub const EDDSA_PUBLIC_VERSION: [u8; 4] = [0x02, 0xe8, 0xde, 0x90];

pub(crate) fn hmac_sha512(key: &[u8], data: &[u8]) -> GenericArray<u8, U64> {
    let hmac = HmacSha512::new_from_slice(key)
        .expect("this never fails: hmac can handle keys of any size");
    hmac.chain_update(data).finalize().into_bytes()
}

/// Splits the 64-byte HMAC output `I` into `I_L = I[..32]` and
/// `I_R = I[32..]`.
pub(crate) fn split_intermediary(
    i: &GenericArray<u8, U64>,
) -> (&GenericArray<u8, U32>, &GenericArray<u8, U32>) {
    generic_array::sequence::Split::split(i)
}

/// An extended key of either supported curve.
#[derive(Clone)]
pub enum ExtendedKey {
    Secp256k1(EcdsaExtendedKey),
    Ed25519(EddsaExtendedKey),
}

impl ExtendedKey {
    /// Derive the child key at `index`.
    pub fn new_child(&self, index: u32) -> Result<ExtendedKey> {
        match self {
            ExtendedKey::Secp256k1(key) => Ok(ExtendedKey::Secp256k1(key.new_child(index)?)),
            ExtendedKey::Ed25519(key) => Ok(ExtendedKey::Ed25519(key.new_child(index)?)),
        }
    }

    /// Derive along a whole path. The empty path returns the key unchanged.
    pub fn derive_path(&self, path: &str) -> Result<ExtendedKey> {
        let mut key = self.clone();
        for index in parse_path(path)? {
            key = key.new_child(index)?;
        }
        Ok(key)
    }

    /// The public version of this key.
    pub fn public_key(&self) -> ExtendedKey {
        match self {
            ExtendedKey::Secp256k1(key) => ExtendedKey::Secp256k1(key.public_key()),
            ExtendedKey::Ed25519(key) => ExtendedKey::Ed25519(key.public_key()),
        }
    }

    pub fn is_private(&self) -> bool {
        match self {
            ExtendedKey::Secp256k1(key) => key.is_private(),
            ExtendedKey::Ed25519(key) => key.is_private(),
        }
    }

    pub fn curve_kind(&self) -> CurveKind {
        match self {
            ExtendedKey::Secp256k1(_) => CurveKind::Secp256k1,
            ExtendedKey::Ed25519(_) => CurveKind::Ed25519,
        }
    }

    /// Raw key bytes: 32-byte big-endian scalar for private keys, 33-byte
    /// compressed point for public keys.
    pub fn key_bytes(&self) -> Vec<u8> {
        match self {
            ExtendedKey::Secp256k1(key) => key.key_bytes(),
            ExtendedKey::Ed25519(key) => key.key_bytes(),
        }
    }

    pub fn chain_code(&self) -> [u8; 32] {
        match self {
            ExtendedKey::Secp256k1(key) => key.chain_code,
            ExtendedKey::Ed25519(key) => key.chain_code,
        }
    }

    /// The 82-byte serialization: the 78-byte BIP32 body followed by the
    /// 4-byte double-SHA-256 checksum.
    pub fn serialize(&self) -> Vec<u8> {
        let (version, depth, fingerprint, child_number, chain_code, key) = match self {
            ExtendedKey::Secp256k1(key) => (
                key.version(),
                key.depth,
                key.parent_fingerprint,
                key.child_number,
                key.chain_code,
                key.serialized_key(),
            ),
            ExtendedKey::Ed25519(key) => (
                key.version(),
                key.depth,
                key.parent_fingerprint,
                key.child_number,
                key.chain_code,
                key.serialized_key(),
            ),
        };
        let mut buf = Vec::with_capacity(82);
        buf.extend_from_slice(&version);
        buf.push(depth);
        buf.extend_from_slice(&fingerprint);
        buf.extend_from_slice(&child_number.to_be_bytes());
        buf.extend_from_slice(&chain_code);
        buf.extend_from_slice(&key);
        let checksum = utils::sha256d_checksum(&buf);
        buf.extend_from_slice(&checksum);
        buf
    }

    /// Encode in the standard Bitcoin base58 alphabet.
    pub fn b58_serialize(&self) -> String {
        bs58::encode(self.serialize()).into_string()
    }

    /// Decode a base58 extended key, dispatching on the version bytes.
    pub fn b58_deserialize(data: &str) -> Result<ExtendedKey> {
        let bytes = bs58::decode(data)
            .into_vec()
            .map_err(|e| Error::Base58(e.to_string()))?;
        if bytes.len() != 82 {
            return Err(Error::Base58(format!(
                "serialized keys should be exactly 82 bytes, got {}",
                bytes.len()
            )));
        }
        let expected = utils::sha256d_checksum(&bytes[..78]);
        if bytes[78..] != expected {
            return Err(Error::Base58("checksum does not match".into()));
        }

        let version: [u8; 4] = bytes[0..4].try_into().expect("sliced to 4 bytes");
        let depth = bytes[4];
        let fingerprint: [u8; 4] = bytes[5..9].try_into().expect("sliced to 4 bytes");
        let child_number = u32::from_be_bytes(bytes[9..13].try_into().expect("sliced to 4 bytes"));
        let chain_code: [u8; 32] = bytes[13..45].try_into().expect("sliced to 32 bytes");
        let key: [u8; 33] = bytes[45..78].try_into().expect("sliced to 33 bytes");

        match version {
            ECDSA_PRIVATE_VERSION | ECDSA_PUBLIC_VERSION => {
                let is_private = version == ECDSA_PRIVATE_VERSION;
                Ok(ExtendedKey::Secp256k1(EcdsaExtendedKey::from_parts(
                    is_private,
                    &key,
                    depth,
                    fingerprint,
                    child_number,
                    chain_code,
                )?))
            }
            EDDSA_PRIVATE_VERSION | EDDSA_PUBLIC_VERSION => {
                let is_private = version == EDDSA_PRIVATE_VERSION;
                Ok(ExtendedKey::Ed25519(EddsaExtendedKey::from_parts(
                    is_private,
                    &key,
                    depth,
                    fingerprint,
                    child_number,
                    chain_code,
                )?))
            }
            other => Err(Error::UnknownKeyVersion(other)),
        }
    }
}

impl std::fmt::Display for ExtendedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.b58_serialize())
    }
}

impl std::fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_private() {
            write!(f, "ExtendedKey({} private, [redacted])", self.curve_kind())
        } else {
            write!(f, "ExtendedKey({})", self.b58_serialize())
        }
    }
}

/// Construction of extended keys from reconstructed curve elements, chosen
/// by the curve of the group.
pub trait CurveExtended: CurveOps {
    /// Wrap a root scalar into a depth-0 extended private key.
    fn extended_private(key: Self::Scalar, chain_code: [u8; 32]) -> ExtendedKey;

    /// Wrap a root point into a depth-0 extended public key.
    fn extended_public(point: Self::Point, chain_code: [u8; 32]) -> ExtendedKey;
}

impl CurveExtended for Secp256k1 {
    fn extended_private(key: k256::Scalar, chain_code: [u8; 32]) -> ExtendedKey {
        ExtendedKey::Secp256k1(EcdsaExtendedKey::new_root_private(key, chain_code))
    }

    fn extended_public(point: K256Point, chain_code: [u8; 32]) -> ExtendedKey {
        ExtendedKey::Secp256k1(EcdsaExtendedKey::new_root_public(point, chain_code))
    }
}

impl CurveExtended for Ed25519 {
    fn extended_private(key: curve25519_dalek::scalar::Scalar, chain_code: [u8; 32]) -> ExtendedKey {
        ExtendedKey::Ed25519(EddsaExtendedKey::new_root_private(key, chain_code))
    }

    fn extended_public(point: EdPoint, chain_code: [u8; 32]) -> ExtendedKey {
        ExtendedKey::Ed25519(EddsaExtendedKey::new_root_public(point, chain_code))
    }
}
