// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use super::{csv, load_and_check, GroupSource, PassphrasePrompt, RecoverOptions};
use crate::{
    ckd::{CurveExtended, ExtendedKey},
    curve::CurveKind,
    edwards::Ed25519,
    errors::{Error, Result},
    group::Group,
    secp256k1::Secp256k1,
    tss, utils,
};
use tracing::info;

/// Reconstruct the root private key from the supplied group files and derive
/// the requested child keys.
///
/// Every file is parsed, validated and cross-checked before the first
/// passphrase is requested. Exactly one share is taken from each file; fewer
/// files than the group threshold is fatal.
pub fn recover(
    files: &[GroupSource],
    options: &RecoverOptions,
    prompt: &mut PassphrasePrompt,
) -> Result<()> {
    let groups = load_and_check(files, &options.group_id)?;

    let threshold = groups[0].group_info.threshold as usize;
    if threshold > groups.len() {
        return Err(Error::ThresholdNotMet {
            want: threshold,
            got: groups.len(),
        });
    }

    let root = match CurveKind::from_name(&groups[0].group_info.curve)? {
        CurveKind::Secp256k1 => reconstruct_root::<Secp256k1>(files, &groups, prompt)?,
        CurveKind::Ed25519 => reconstruct_root::<Ed25519>(files, &groups, prompt)?,
    };

    if options.show_root_private {
        info!(
            "Reconstructed root private key: {}",
            utils::encode(&root.key_bytes())
        );
        info!("Reconstructed root extended private key: {root}");
    }

    if !options.paths.is_empty() {
        for path in &options.paths {
            derive_path(&root, path)?;
        }
        return Ok(());
    }

    if let Some(csv_file) = &options.csv_file {
        csv::derive_csv(&root, csv_file, &options.csv_output_dir)?;
    }
    Ok(())
}

/// Collect one decrypted share per file and interpolate the root scalar,
/// then cross-check its public image against the stored extended public key.
fn reconstruct_root<C: CurveExtended>(
    files: &[GroupSource],
    groups: &[Group],
    prompt: &mut PassphrasePrompt,
) -> Result<ExtendedKey> {
    let mut shares: Vec<tss::Share<C>> = Vec::with_capacity(groups.len());
    for (source, group) in files.iter().zip(groups) {
        let passphrase = prompt(&source.name)?;
        shares.push(tss::build_share::<C>(
            &group.share_info,
            group.version,
            &passphrase,
        )?);
    }

    let info = &groups[0].group_info;
    let secret = tss::reconstruct_secret::<C>(&shares)?;
    let extended = C::extended_private(secret, info.chaincode_bytes()?);

    let extended_pub = extended.public_key();
    info!("Reconstructed root extended public key: {extended_pub}");
    if extended_pub.b58_serialize() != info.root_extended_pubkey {
        return Err(Error::ReconstructionMismatch);
    }
    Ok(extended)
}

/// Derive one path from the root key and log the resulting child keys.
pub fn derive_path(key: &ExtendedKey, path: &str) -> Result<ExtendedKey> {
    if path.is_empty() {
        return Err(Error::MalformedPath("path is empty".into()));
    }
    let derived = key.derive_path(path)?;
    if derived.is_private() {
        info!(
            "Path: {path} derived child private key: {}",
            utils::encode(&derived.key_bytes())
        );
        info!("Path: {path} derived child extended private key: {derived}");
    }
    info!(
        "Path: {path} derived child extended public key: {}",
        derived.public_key()
    );
    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::ScalarOps;
    use crate::recovery::test_fixtures::{deal_group, fixture_prompt, PASSPHRASES};
    use std::path::PathBuf;
    use zeroize::Zeroizing;

    const SECRET: &str = "0xca82cd1cee09478cfd275fd427b5abacdfe9a0f7c6c4c96edf003d3b42ff027f";

    fn options() -> RecoverOptions {
        RecoverOptions {
            group_id: "group-e2e".into(),
            show_root_private: false,
            paths: vec!["m/44'/0'/0'/0/0".into()],
            csv_file: None,
            csv_output_dir: PathBuf::from("recovery"),
        }
    }

    fn reconstructed_secret<C: CurveExtended>(files: &[GroupSource]) -> C::Scalar {
        let groups = load_and_check(files, "group-e2e").unwrap();
        let mut prompt = fixture_prompt();
        let root = reconstruct_root::<C>(files, &groups, &mut prompt).unwrap();
        C::Scalar::reduce_be_bytes(&root.key_bytes()).unwrap()
    }

    #[test]
    fn recovers_from_any_two_of_three_files() {
        let files = deal_group::<Secp256k1>(SECRET, 1);
        let expected =
            <Secp256k1 as crate::curve::CurveOps>::Scalar::reduce_be_bytes(
                &crate::utils::decode(SECRET).unwrap(),
            )
            .unwrap();

        for subset in [
            vec![files[0].clone(), files[1].clone()],
            vec![files[0].clone(), files[2].clone()],
            vec![files[1].clone(), files[2].clone()],
            files.clone(),
        ] {
            assert_eq!(reconstructed_secret::<Secp256k1>(&subset), expected);
            recover(&subset, &options(), &mut fixture_prompt()).unwrap();
        }
    }

    #[test]
    fn recovers_an_ed25519_group_with_v2_envelope() {
        let files = deal_group::<Ed25519>(SECRET, 2);
        let mut opts = options();
        opts.paths = vec!["m/0/1".into()];
        recover(&files[1..], &opts, &mut fixture_prompt()).unwrap();
    }

    #[test]
    fn hardened_paths_fail_for_ed25519_groups() {
        let files = deal_group::<Ed25519>(SECRET, 2);
        let err = recover(&files, &options(), &mut fixture_prompt()).unwrap_err();
        assert!(matches!(err, Error::HardenedChildForEd25519));
    }

    #[test]
    fn fewer_files_than_threshold_is_fatal() {
        let files = deal_group::<Secp256k1>(SECRET, 1);
        let err = recover(&files[..1], &options(), &mut fixture_prompt()).unwrap_err();
        assert!(matches!(err, Error::ThresholdNotMet { want: 2, got: 1 }));
    }

    #[test]
    fn root_pubkey_mismatch_is_fatal() {
        let mut files = deal_group::<Secp256k1>(SECRET, 1);
        let other = deal_group::<Secp256k1>(
            "0x00000000000000000000000000000000000000000000000000000000000000a7",
            1,
        );
        let donor: crate::group::Group = serde_json::from_slice(&other[0].bytes).unwrap();
        for file in &mut files {
            let mut group: crate::group::Group = serde_json::from_slice(&file.bytes).unwrap();
            group.group_info.root_extended_pubkey =
                donor.group_info.root_extended_pubkey.clone();
            file.bytes = serde_json::to_vec(&group).unwrap();
        }
        let err = recover(&files, &options(), &mut fixture_prompt()).unwrap_err();
        assert!(matches!(err, Error::ReconstructionMismatch));
    }

    #[test]
    fn chaincode_mismatch_aborts_before_any_passphrase() {
        let mut files = deal_group::<Secp256k1>(SECRET, 1);
        let mut group: crate::group::Group = serde_json::from_slice(&files[1].bytes).unwrap();
        group.group_info.chaincode = crate::utils::encode(&[0x43u8; 32]);
        files[1].bytes = serde_json::to_vec(&group).unwrap();

        let mut prompted = false;
        let mut prompt = |_name: &str| {
            prompted = true;
            Ok(Zeroizing::new(PASSPHRASES[0].to_string()))
        };
        let err = recover(&files, &options(), &mut prompt).unwrap_err();
        assert!(matches!(err, Error::CrossFileInvariant(_)));
        assert!(!prompted, "no passphrase may be read before cross-file checks pass");
    }
}
