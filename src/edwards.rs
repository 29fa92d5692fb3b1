//! Ed25519 curve adaptor backed by the `curve25519-dalek` crate.
//!
//! The custody scheme uses the twisted Edwards curve in a Weierstrass
//! flavour: scalars are big-endian integers modulo the group order `L`, and
//! points travel as a 33-byte `0x00 ∥ compressed-Edwards-Y` encoding so they
//! line up with the 33-byte SEC1 encoding used on secp256k1. Both quirks are
//! required for wire compatibility with existing share files.

use crate::{
    curve::{CurveKind, CurveOps, PointOps, ScalarOps},
    errors::{Error, Result},
};
use curve25519_dalek::{
    edwards::{CompressedEdwardsY, EdwardsPoint},
    scalar::Scalar as EdScalar,
    traits::Identity,
};
use tracing::error;
use zeroize::Zeroize;

/// Marker type selecting the Ed25519 instantiation of [`CurveOps`].
pub struct Ed25519;

impl CurveOps for Ed25519 {
    const KIND: CurveKind = CurveKind::Ed25519;
    type Scalar = EdScalar;
    type Point = EdPoint;
}

/// Wrapper around [`EdwardsPoint`] carrying the 33-byte wire codec.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Zeroize)]
pub struct EdPoint(pub(crate) EdwardsPoint);

impl PointOps for EdPoint {
    type Scalar = EdScalar;

    /// Accepts the standard 32-byte compressed encoding and the 33-byte
    /// prefixed form used inside extended keys.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let compressed = match bytes.len() {
            32 => bytes,
            33 => &bytes[1..],
            _ => {
                error!("Ed25519 point encoding must be 32 or 33 bytes");
                return Err(Error::PointNotOnCurve);
            }
        };
        let point = CompressedEdwardsY::from_slice(compressed)
            .ok()
            .and_then(|y| y.decompress());
        match point {
            Some(point) => Ok(Self(point)),
            None => {
                error!("Failed to decode bytes as an Ed25519 curve point");
                Err(Error::PointNotOnCurve)
            }
        }
    }

    fn to_compressed(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(33);
        out.push(0x00);
        out.extend_from_slice(self.0.compress().as_bytes());
        out
    }

    fn mul_base(scalar: &Self::Scalar) -> Self {
        Self(EdwardsPoint::mul_base(scalar))
    }

    fn mul(&self, scalar: &Self::Scalar) -> Self {
        Self(self.0 * scalar)
    }

    fn add(&self, other: &Self) -> Self {
        Self(self.0 + other.0)
    }

    fn is_identity(&self) -> bool {
        self.0 == EdwardsPoint::identity()
    }
}

impl ScalarOps for EdScalar {
    fn zero() -> Self {
        EdScalar::ZERO
    }

    fn one() -> Self {
        EdScalar::ONE
    }

    fn from_u64(x: u64) -> Self {
        EdScalar::from(x)
    }

    fn reduce_be_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > 32 {
            error!("Scalar encoding longer than 32 bytes");
            return Err(Error::ScalarOutOfRange);
        }
        let mut le = [0u8; 32];
        for (i, b) in bytes.iter().rev().enumerate() {
            le[i] = *b;
        }
        let scalar = EdScalar::from_bytes_mod_order(le);
        le.zeroize();
        Ok(scalar)
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn sub(&self, other: &Self) -> Self {
        self - other
    }

    fn mul(&self, other: &Self) -> Self {
        self * other
    }

    fn invert(&self) -> Option<Self> {
        if self == &EdScalar::ZERO {
            None
        } else {
            Some(EdScalar::invert(self))
        }
    }

    fn is_zero(&self) -> bool {
        self == &EdScalar::ZERO
    }

    fn to_be_bytes(&self) -> [u8; 32] {
        let mut be = self.to_bytes();
        be.reverse();
        be
    }
}
