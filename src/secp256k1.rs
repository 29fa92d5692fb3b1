//! secp256k1 curve adaptor backed by the `k256` crate.

use crate::{
    curve::{CurveKind, CurveOps, PointOps, ScalarOps},
    errors::{Error, Result},
};
use k256::{
    elliptic_curve::{
        ops::Reduce,
        sec1::{FromEncodedPoint, ToEncodedPoint},
        PrimeField,
    },
    AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar as K256Scalar, U256,
};
use tracing::error;
use zeroize::Zeroize;

/// Marker type selecting the secp256k1 instantiation of [`CurveOps`].
pub struct Secp256k1;

impl CurveOps for Secp256k1 {
    const KIND: CurveKind = CurveKind::Secp256k1;
    type Scalar = K256Scalar;
    type Point = K256Point;
}

/// Wrapper around [`k256::ProjectivePoint`] carrying the codecs the group
/// records use.
///
/// Note that this type derives [`Debug`]; if a [`K256Point`] ends up inside a
/// private type, `Debug` should be manually implemented with the field of
/// this type explicitly redacted.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Zeroize)]
pub struct K256Point(pub(crate) ProjectivePoint);

impl K256Point {
    /// Decode a SEC1-encoded point, accepting both the 33-byte compressed
    /// and the 65-byte uncompressed forms. The identity encoding is
    /// rejected.
    pub fn try_from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| {
            error!("Failed to parse bytes as a SEC1 point encoding");
            Error::PointNotOnCurve
        })?;
        let point: Option<AffinePoint> = AffinePoint::from_encoded_point(&encoded).into();
        match point {
            Some(point) if !encoded.is_identity() => Ok(Self(point.into())),
            _ => {
                error!("Failed to decode bytes as a secp256k1 curve point");
                Err(Error::PointNotOnCurve)
            }
        }
    }
}

impl PointOps for K256Point {
    type Scalar = K256Scalar;

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::try_from_sec1_bytes(bytes)
    }

    fn to_compressed(&self) -> Vec<u8> {
        self.0.to_affine().to_encoded_point(true).as_bytes().to_vec()
    }

    fn mul_base(scalar: &Self::Scalar) -> Self {
        Self(ProjectivePoint::GENERATOR * scalar)
    }

    fn mul(&self, scalar: &Self::Scalar) -> Self {
        Self(self.0 * scalar)
    }

    fn add(&self, other: &Self) -> Self {
        Self(self.0 + other.0)
    }

    fn is_identity(&self) -> bool {
        self.0 == ProjectivePoint::IDENTITY
    }
}

impl ScalarOps for K256Scalar {
    fn zero() -> Self {
        K256Scalar::ZERO
    }

    fn one() -> Self {
        K256Scalar::ONE
    }

    fn from_u64(x: u64) -> Self {
        K256Scalar::from(x)
    }

    fn reduce_be_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > 32 {
            error!("Scalar encoding longer than 32 bytes");
            return Err(Error::ScalarOutOfRange);
        }
        let mut padded = [0u8; 32];
        padded[32 - bytes.len()..].copy_from_slice(bytes);
        let scalar = <K256Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(padded));
        padded.zeroize();
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
        K256Scalar::invert(self).into()
    }

    fn is_zero(&self) -> bool {
        self == &K256Scalar::ZERO
    }

    fn to_be_bytes(&self) -> [u8; 32] {
        self.to_repr().into()
    }
}

/// Parse a canonical 32-byte big-endian scalar, rejecting values at or above
/// the group order. Used where reduction would silently accept bad input,
/// such as BIP32 tweaks.
pub(crate) fn scalar_from_canonical_bytes(bytes: &[u8; 32]) -> Option<K256Scalar> {
    <K256Scalar as PrimeField>::from_repr(FieldBytes::from(*bytes)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUB_COMPRESSED: &str =
        "0x039f4db6ea8ea62401f76f018b959d267bfb285391130fc8520bacb6a029df643a";
    const PUB_UNCOMPRESSED: &str =
        "0x049f4db6ea8ea62401f76f018b959d267bfb285391130fc8520bacb6a029df643a\
         f196a29d5575ca26cb965e73a4f4b022c7263edb22f2c96480ce0e89f7492b75";

    #[test]
    fn point_codec_accepts_compressed_and_uncompressed() {
        let compressed = crate::utils::decode(PUB_COMPRESSED).unwrap();
        let uncompressed = crate::utils::decode(PUB_UNCOMPRESSED).unwrap();

        let p1 = K256Point::from_bytes(&compressed).unwrap();
        let p2 = K256Point::from_bytes(&uncompressed).unwrap();
        assert_eq!(p1, p2);
        assert_eq!(p1.to_compressed(), compressed);
    }

    #[test]
    fn point_codec_rejects_invalid_encodings() {
        // x out of field range.
        let mut bad = vec![0x03u8];
        bad.extend_from_slice(&[0xffu8; 32]);
        assert!(K256Point::from_bytes(&bad).is_err());
        // Bad SEC1 tag.
        assert!(K256Point::from_bytes(&[0u8; 33]).is_err());
        // Identity encoding.
        assert!(K256Point::from_bytes(&[0u8; 1]).is_err());
    }

    #[test]
    fn scalar_reduces_modulo_group_order() {
        // n + 1 reduces to 1.
        let order_plus_one =
            crate::utils::decode("0xfffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364142")
                .unwrap();
        let reduced = K256Scalar::reduce_be_bytes(&order_plus_one).unwrap();
        assert_eq!(reduced, K256Scalar::ONE);
        assert!(K256Scalar::reduce_be_bytes(&[0u8; 33]).is_err());
    }

    #[test]
    fn short_scalar_encodings_are_left_padded() {
        let scalar = K256Scalar::reduce_be_bytes(&[0x2a]).unwrap();
        assert_eq!(scalar, K256Scalar::from(0x2au64));
    }
}
