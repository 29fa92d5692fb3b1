// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use super::{load_and_check, GroupSource, PassphrasePrompt};
use crate::{
    ckd::CurveExtended,
    curve::CurveKind,
    edwards::Ed25519,
    errors::{Error, Result},
    group::{Group, GroupInfo},
    secp256k1::Secp256k1,
    tss,
};
use tracing::info;

/// Verify a set of recovery group files without reconstructing the secret:
/// the root public key must be reconstructible from every threshold-sized
/// participant subset, and each file's decrypted share must match its stored
/// share public key.
pub fn verify(files: &[GroupSource], group_id: &str, prompt: &mut PassphrasePrompt) -> Result<()> {
    let groups = load_and_check(files, group_id)?;

    for (source, group) in files.iter().zip(&groups) {
        info!("Start to verify recovery group file {}", source.name);
        match CurveKind::from_name(&group.group_info.curve)? {
            CurveKind::Secp256k1 => verify_group::<Secp256k1>(source, group, prompt)?,
            CurveKind::Ed25519 => verify_group::<Ed25519>(source, group, prompt)?,
        }
        info!("Recovery group file {} passed", source.name);
    }
    info!("All recovery group files passed");
    Ok(())
}

fn verify_group<C: CurveExtended>(
    source: &GroupSource,
    group: &Group,
    prompt: &mut PassphrasePrompt,
) -> Result<()> {
    info!("Start to reconstruct the root public key from share public keys");
    verify_reconstructed_pubkey::<C>(&group.group_info)?;
    info!("Root public key reconstruction passed");

    info!("Start to derive the share public key from the share secret");
    let passphrase = prompt(&source.name)?;
    tss::verify_share_pubkey::<C>(&group.share_info, group.version, &passphrase)?;
    info!("Share public key derivation passed");
    Ok(())
}

/// Reconstruct the root public key from every threshold-sized subset of the
/// participants, enumerated as the first `t-1` entries plus each remaining
/// entry in turn, and compare against the stored extended public key.
fn verify_reconstructed_pubkey<C: CurveExtended>(info: &GroupInfo) -> Result<()> {
    let threshold = info.threshold as usize;
    let chaincode = info.chaincode_bytes()?;
    let parts = &info.participants;

    for rotating in (threshold - 1)..parts.len() {
        let mut indexes: Vec<usize> = (0..threshold - 1).collect();
        indexes.push(rotating);
        let index_list = indexes
            .iter()
            .map(|i| format!("(no.{}) ", i + 1))
            .collect::<String>();
        info!("Using participants {index_list}to reconstruct the root extended public key");

        let share_pubs = indexes
            .iter()
            .map(|&i| tss::build_share_pub::<C>(&parts[i]))
            .collect::<Result<Vec<_>>>()?;
        let point = tss::reconstruct_public::<C>(&share_pubs, threshold)?;
        let extended = C::extended_public(point, chaincode);
        info!("Reconstructed root extended public key: {extended}");

        if extended.b58_serialize() != info.root_extended_pubkey {
            return Err(Error::ReconstructionMismatch);
        }
    }
    Ok(())
}
