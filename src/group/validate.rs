// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Structural and cross-file invariants on recovery group records.

use super::Group;
use crate::{
    curve::CurveKind,
    errors::{Error, Result},
};

fn invariant(msg: impl Into<String>) -> Error {
    Error::StructuralInvariant(msg.into())
}

fn mismatch(msg: impl Into<String>) -> Error {
    Error::CrossFileInvariant(msg.into())
}

/// Enforce every invariant a single group record must satisfy on its own.
pub fn validate_structure(group: &Group) -> Result<()> {
    let info = &group.group_info;
    let share = &group.share_info;

    if !(1..=3).contains(&group.version) {
        return Err(invariant(format!("unsupported record version {}", group.version)));
    }
    if info.id.is_empty() {
        return Err(invariant("group id is empty"));
    }
    if info.root_extended_pubkey.is_empty() {
        return Err(invariant("root extended public key is empty"));
    }
    if info.chaincode.is_empty() {
        return Err(invariant("chaincode is empty"));
    }
    info.chaincode_bytes()?;

    let kind = CurveKind::from_name(&info.curve)?;
    if info.scheme_type != kind.scheme_type() {
        return Err(invariant(format!(
            "scheme type {} does not match curve {}",
            info.scheme_type, info.curve
        )));
    }

    if info.threshold < 1 {
        return Err(invariant(format!("threshold {} is less than 1", info.threshold)));
    }
    if info.threshold as usize > info.participants.len() {
        return Err(invariant(format!(
            "{} participants is less than threshold {}",
            info.participants.len(),
            info.threshold
        )));
    }

    if share.node_id.is_empty() {
        return Err(invariant("share info node id is empty"));
    }
    if share.share_id.is_empty() {
        return Err(invariant("share info share id is empty"));
    }
    if share.share_pubkey.is_empty() {
        return Err(invariant("share info share public key is empty"));
    }
    if share.encrypted_share.is_empty() {
        return Err(invariant("encrypted share is empty"));
    }
    if share.kdf.is_none() {
        return Err(invariant("encrypted share KDF is missing"));
    }

    let parts = &info.participants;
    let mut holder_found = false;
    for (i, part) in parts.iter().enumerate() {
        if part.node_id.is_empty() {
            return Err(invariant(format!("participant (no.{}) node id is empty", i + 1)));
        }
        if part.share_id.is_empty() {
            return Err(invariant(format!("participant (no.{}) share id is empty", i + 1)));
        }
        if part.share_pubkey.is_empty() {
            return Err(invariant(format!(
                "participant (no.{}) share public key is empty",
                i + 1
            )));
        }
        for (j, other) in parts.iter().enumerate() {
            if i == j {
                continue;
            }
            if part.node_id == other.node_id {
                return Err(invariant(format!(
                    "participants (no.{} and no.{}) node ids must differ",
                    i + 1,
                    j + 1
                )));
            }
            if part.share_id == other.share_id {
                return Err(invariant(format!(
                    "participants (no.{} and no.{}) share ids must differ",
                    i + 1,
                    j + 1
                )));
            }
            if part.share_pubkey == other.share_pubkey {
                return Err(invariant(format!(
                    "participants (no.{} and no.{}) share public keys must differ",
                    i + 1,
                    j + 1
                )));
            }
        }
        if part.node_id == share.node_id {
            if part.share_id != share.share_id {
                return Err(invariant(format!(
                    "participant (no.{}) share id mismatches the share info",
                    i + 1
                )));
            }
            if part.share_pubkey != share.share_pubkey {
                return Err(invariant(format!(
                    "participant (no.{}) share public key mismatches the share info",
                    i + 1
                )));
            }
            holder_found = true;
        }
    }
    if !holder_found {
        return Err(invariant("share info does not match any participant"));
    }
    Ok(())
}

/// Enforce the invariants two group files must jointly satisfy before their
/// shares may be combined: the group description must be identical, while the
/// holder-specific share info must differ.
pub fn check_cross_file(first: &Group, second: &Group) -> Result<()> {
    let (a, b) = (&first.group_info, &second.group_info);
    if a.id != b.id {
        return Err(mismatch("group ids differ"));
    }
    if a.scheme_type != b.scheme_type {
        return Err(mismatch("group types differ"));
    }
    if a.root_extended_pubkey != b.root_extended_pubkey {
        return Err(mismatch("root extended public keys differ"));
    }
    if a.chaincode != b.chaincode {
        return Err(mismatch("group chaincodes differ"));
    }
    if a.curve != b.curve {
        return Err(mismatch("group curves differ"));
    }
    if a.threshold != b.threshold {
        return Err(mismatch("group thresholds differ"));
    }

    // Participant sets must be equal as sets of exact triples, checked in
    // both directions.
    if a.participants.len() != b.participants.len() {
        return Err(mismatch("participant counts differ"));
    }
    for part in &a.participants {
        if !b.participants.contains(part) {
            return Err(mismatch(format!(
                "participant (node id: {}) missing from the other file",
                part.node_id
            )));
        }
    }
    for part in &b.participants {
        if !a.participants.contains(part) {
            return Err(mismatch(format!(
                "participant (node id: {}) missing from the other file",
                part.node_id
            )));
        }
    }

    let (sa, sb) = (&first.share_info, &second.share_info);
    if sa.node_id == sb.node_id {
        return Err(mismatch("share node ids must differ"));
    }
    if sa.share_id == sb.share_id {
        return Err(mismatch("share ids must differ"));
    }
    if sa.share_pubkey == sb.share_pubkey {
        return Err(mismatch("share public keys must differ"));
    }
    Ok(())
}
