// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use super::{Share, SharePub};
use crate::{
    curve::{CurveOps, PointOps, ScalarOps},
    errors::{Error, Result},
};

/// The Lagrange coefficient at zero for abscissa `i`:
/// `λ_i = Π_{j≠i} id_j · (id_j − id_i)^{-1} (mod n)`.
///
/// All abscissae must be distinct modulo the group order; the inverse then
/// always exists.
fn lagrange_coefficient<C: CurveOps>(ids: &[C::Scalar], i: usize) -> Result<C::Scalar> {
    let mut coeff = C::Scalar::one();
    for (j, id) in ids.iter().enumerate() {
        if j == i {
            continue;
        }
        let inv = id
            .sub(&ids[i])
            .invert()
            .ok_or_else(|| Error::DuplicateShareId(hex::encode(ids[i].to_be_bytes())))?;
        coeff = coeff.mul(&id.mul(&inv));
    }
    Ok(coeff)
}

fn ensure_distinct_ids<C: CurveOps>(ids: &[C::Scalar]) -> Result<()> {
    for (i, id) in ids.iter().enumerate() {
        if ids[i + 1..].contains(id) {
            return Err(Error::DuplicateShareId(hex::encode(id.to_be_bytes())));
        }
    }
    Ok(())
}

/// Recover the secret `s = Σ_i x_i · λ_i (mod n)` from `k ≥ t` shares.
///
/// The caller is responsible for checking `k` against the group threshold;
/// all supplied shares participate in the interpolation.
pub fn reconstruct_secret<C: CurveOps>(shares: &[Share<C>]) -> Result<C::Scalar> {
    let ids: Vec<C::Scalar> = shares.iter().map(|s| s.id).collect();
    ensure_distinct_ids::<C>(&ids)?;

    let mut secret = C::Scalar::zero();
    for (i, share) in shares.iter().enumerate() {
        let coeff = lagrange_coefficient::<C>(&ids, i)?;
        secret = secret.add(&share.xi.mul(&coeff));
    }
    Ok(secret)
}

/// Recover the root public key `P = Σ_i λ_i · P_i` from share public keys.
pub fn reconstruct_public<C: CurveOps>(
    share_pubs: &[SharePub<C>],
    threshold: usize,
) -> Result<C::Point> {
    if threshold < 1 {
        return Err(Error::BadInput("threshold must be at least 1".into()));
    }
    if threshold > share_pubs.len() {
        return Err(Error::ThresholdNotMet {
            want: threshold,
            got: share_pubs.len(),
        });
    }
    let ids: Vec<C::Scalar> = share_pubs.iter().map(|s| s.id).collect();
    ensure_distinct_ids::<C>(&ids)?;

    let mut public: Option<C::Point> = None;
    for (i, share) in share_pubs.iter().enumerate() {
        let coeff = lagrange_coefficient::<C>(&ids, i)?;
        let term = share.point.mul(&coeff);
        public = Some(match public {
            Some(acc) => acc.add(&term),
            None => term,
        });
    }
    // A zero root secret has no valid public image.
    let public = public.expect("threshold check guarantees at least one share");
    if public.is_identity() {
        return Err(Error::PointNotOnCurve);
    }
    Ok(public)
}
