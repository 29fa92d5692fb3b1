// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Top-level recovery flows.
//!
//! Two commands are supported: `verify` checks a set of recovery group files
//! without reconstructing the secret, and `recover` reconstructs the root
//! private key and derives child keys. Both validate and cross-check every
//! file before the first passphrase is requested, and both receive
//! passphrases through a caller-supplied prompt so the core never touches
//! the terminal.

pub mod csv;
mod recover;
mod verify;

pub use recover::{derive_path, recover};
pub use verify::verify;

use crate::{
    errors::{Error, Result},
    group::{self, Group},
};
use std::path::PathBuf;
use tracing::info;
use zeroize::Zeroizing;

/// A group file already read into memory, keeping its on-disk name for
/// prompts and log lines.
#[derive(Debug, Clone)]
pub struct GroupSource {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Inputs of the `recover` flow. All flags travel in this explicit value;
/// the library holds no process-wide state.
#[derive(Debug, Clone)]
pub struct RecoverOptions {
    pub group_id: String,
    pub show_root_private: bool,
    pub paths: Vec<String>,
    pub csv_file: Option<PathBuf>,
    pub csv_output_dir: PathBuf,
}

/// Passphrase prompt callback: receives the group file name, returns the
/// passphrase for that file's share.
pub type PassphrasePrompt<'a> = dyn FnMut(&str) -> Result<Zeroizing<String>> + 'a;

/// Parse every file, select the target group, validate each record and
/// cross-check all pairs. No passphrase is needed for any of this.
fn load_and_check(files: &[GroupSource], group_id: &str) -> Result<Vec<Group>> {
    if files.is_empty() {
        return Err(Error::BadInput("no recovery group files".into()));
    }
    if group_id.is_empty() {
        return Err(Error::BadInput("no group id".into()));
    }
    let mut groups: Vec<Group> = Vec::with_capacity(files.len());
    for source in files {
        let parsed = group::parse_groups(&source.bytes)?;
        let selected = group::select_group(parsed, group_id)?;
        group::validate_structure(&selected)?;
        for (i, previous) in groups.iter().enumerate() {
            group::check_cross_file(previous, &selected)?;
            info!("Compared {} against group file no.{}", source.name, i + 1);
        }
        info!("Group parameters of {} check out", source.name);
        groups.push(selected);
    }
    Ok(groups)
}
