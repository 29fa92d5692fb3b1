//! Elliptic curve abstraction.
//!
//! The recovery flows are written once, generically, against the traits in
//! this module; [`crate::secp256k1`] and [`crate::edwards`] provide the two
//! supported instantiations. All scalar arithmetic happens modulo the curve
//! *group order* (`n` for secp256k1, `L` for Ed25519), never the field prime,
//! and is delegated to the underlying curve crates so that operations on
//! secret scalars stay constant-time.

use crate::errors::{Error, Result};
use std::fmt::Debug;
use zeroize::Zeroize;

/// The curves supported by the recovery toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    Secp256k1,
    Ed25519,
}

impl CurveKind {
    /// Resolve the curve name used in group records.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "secp256k1" => Ok(CurveKind::Secp256k1),
            "ed25519" => Ok(CurveKind::Ed25519),
            other => Err(Error::UnsupportedCurve(other.to_string())),
        }
    }

    /// The curve name as it appears in group records.
    pub fn name(&self) -> &'static str {
        match self {
            CurveKind::Secp256k1 => "secp256k1",
            CurveKind::Ed25519 => "ed25519",
        }
    }

    /// The on-wire signing scheme code: `1` for ECDSA-TSS over secp256k1,
    /// `2` for EdDSA-TSS over Ed25519. Zero is reserved and invalid.
    pub fn scheme_type(&self) -> i32 {
        match self {
            CurveKind::Secp256k1 => 1,
            CurveKind::Ed25519 => 2,
        }
    }
}

impl std::fmt::Display for CurveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalar field arithmetic modulo the curve group order.
pub trait ScalarOps: Clone + Copy + Debug + PartialEq + Eq + Zeroize {
    /// The zero scalar.
    fn zero() -> Self;

    /// The one scalar.
    fn one() -> Self;

    /// Convert a small integer to a scalar.
    fn from_u64(x: u64) -> Self;

    /// Interpret up to 32 big-endian bytes as a scalar, reduced modulo the
    /// group order. Longer inputs are rejected.
    fn reduce_be_bytes(bytes: &[u8]) -> Result<Self>;

    /// Parse a decimal string by radix-10 accumulation in the field. Share
    /// ids are stored this way in group records.
    fn from_decimal(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InputShape(format!("invalid share id {s:?}")));
        }
        let ten = Self::from_u64(10);
        let mut acc = Self::zero();
        for b in s.bytes() {
            acc = acc.mul(&ten).add(&Self::from_u64(u64::from(b - b'0')));
        }
        Ok(acc)
    }

    /// Add two scalars.
    fn add(&self, other: &Self) -> Self;

    /// Subtract two scalars.
    fn sub(&self, other: &Self) -> Self;

    /// Multiply two scalars.
    fn mul(&self, other: &Self) -> Self;

    /// Invert the scalar, if it is non-zero.
    fn invert(&self) -> Option<Self>;

    /// True if and only if the scalar is zero.
    fn is_zero(&self) -> bool;

    /// Canonical 32-byte big-endian representation.
    fn to_be_bytes(&self) -> [u8; 32];
}

/// Group operations on curve points.
pub trait PointOps: Clone + Copy + Debug + PartialEq + Sized {
    /// The scalar type acting on this group.
    type Scalar: ScalarOps;

    /// Decode a point from its wire encoding, verifying it lies on the
    /// curve. Each curve accepts the encodings its group records use.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;

    /// The 33-byte compressed wire encoding.
    fn to_compressed(&self) -> Vec<u8>;

    /// Multiply the group generator by a scalar.
    fn mul_base(scalar: &Self::Scalar) -> Self;

    /// Multiply this point by a scalar.
    fn mul(&self, scalar: &Self::Scalar) -> Self;

    /// Add two points.
    fn add(&self, other: &Self) -> Self;

    /// True if and only if this is the identity point.
    fn is_identity(&self) -> bool;
}

/// A supported curve: its scalar field and point group, bundled.
pub trait CurveOps: 'static {
    /// Which curve this is.
    const KIND: CurveKind;

    /// The scalar type.
    type Scalar: ScalarOps;

    /// The point type.
    type Point: PointOps<Scalar = Self::Scalar>;
}
