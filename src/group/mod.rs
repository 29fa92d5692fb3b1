// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! On-disk recovery group records.
//!
//! Every participant in a signing committee holds one group file per group:
//! an immutable description of the group (shared by all participants) plus
//! that participant's own encrypted share. Three JSON shapes are accepted,
//! tried in order: a `{"recovery_groups": [...]}` wrapper, a bare array of
//! groups, and a bare single group object.

mod validate;

pub use validate::{check_cross_file, validate_structure};

use crate::{
    cipher::Kdf,
    errors::{Error, Result},
    utils,
};
use serde::{Deserialize, Serialize};

/// One recovery group record as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Record format version. Versions 1 through 3 are understood; the
    /// version selects the share ciphertext envelope.
    pub version: i32,
    pub group_info: GroupInfo,
    pub share_info: ShareInfo,
}

/// Description of the signing group, identical across all participants'
/// files for the same group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInfo {
    pub id: String,
    #[serde(default)]
    pub created_time: String,
    /// Signing scheme code: 1 = ECDSA-TSS, 2 = EdDSA-TSS.
    #[serde(rename = "type")]
    pub scheme_type: i32,
    #[serde(rename = "root_extended_public_key")]
    pub root_extended_pubkey: String,
    /// Hex-encoded 32-byte chaincode.
    pub chaincode: String,
    pub curve: String,
    pub threshold: i32,
    pub participants: Vec<Participant>,
}

impl GroupInfo {
    /// Decode the group chaincode into its 32-byte form.
    pub fn chaincode_bytes(&self) -> Result<[u8; 32]> {
        let bytes = utils::decode(&self.chaincode)?;
        bytes.try_into().map_err(|_| {
            Error::StructuralInvariant("group chaincode is not 32 bytes".into())
        })
    }
}

/// One participant's public entry in the group description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub node_id: String,
    /// Decimal string of the positive Shamir abscissa.
    pub share_id: String,
    /// Hex-encoded compressed share public key.
    #[serde(rename = "share_public_key")]
    pub share_pubkey: String,
}

/// The holder's own share: identification plus the encrypted share value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareInfo {
    pub node_id: String,
    pub share_id: String,
    #[serde(rename = "share_public_key")]
    pub share_pubkey: String,
    /// `nonce ∥ ciphertext ∥ tag`, base64 in JSON.
    #[serde(with = "utils::base64_bytes")]
    pub encrypted_share: Vec<u8>,
    pub kdf: Option<Kdf>,
}

#[derive(Deserialize)]
struct GroupsWrapper {
    recovery_groups: Vec<Group>,
}

/// Parse a group file, accepting any of the three on-disk shapes.
pub fn parse_groups(bytes: &[u8]) -> Result<Vec<Group>> {
    if let Ok(wrapper) = serde_json::from_slice::<GroupsWrapper>(bytes) {
        return Ok(wrapper.recovery_groups);
    }
    if let Ok(groups) = serde_json::from_slice::<Vec<Group>>(bytes) {
        return Ok(groups);
    }
    match serde_json::from_slice::<Group>(bytes) {
        Ok(group) => Ok(vec![group]),
        Err(e) => Err(Error::InputShape(format!(
            "group file does not match any accepted shape: {e}"
        ))),
    }
}

/// Select the group with the given id from a parsed file.
pub fn select_group(groups: Vec<Group>, group_id: &str) -> Result<Group> {
    groups
        .into_iter()
        .find(|g| g.group_info.id == group_id)
        .ok_or_else(|| Error::GroupNotFound(group_id.to_string()))
}
