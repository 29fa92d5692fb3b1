// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Batch derivation driven by an address CSV.
//!
//! Two input schemas are accepted, distinguished by header arity and the
//! `curve` column at position 3:
//!
//! - v0 (7 columns): `wallet name, coin, address, memo, address label,
//!   HD path, child public key`
//! - v1 (8 columns): `wallet name, coin, address, curve, memo,
//!   address label, HD path, child public key`
//!
//! v0 rows default to secp256k1; Ed25519 rows require v1. The output file
//! carries the input columns plus `hex private key`, `extended private key`
//! and `extended public key`, and an existing output path is never
//! overwritten.

use crate::{
    ckd::ExtendedKey,
    curve::CurveKind,
    errors::{Error, Result},
    utils,
};
use std::{
    fs::{File, OpenOptions},
    io::{Read, Write},
    path::{Path, PathBuf},
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{error, info, warn};

/// Derive keys for every row of `input`, writing the augmented CSV into
/// `output_dir`. Returns the output path.
pub fn derive_csv(key: &ExtendedKey, input: &Path, output_dir: &Path) -> Result<PathBuf> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| Error::BadInput(format!("cannot format timestamp: {e}")))?;
    let output = output_path(input, output_dir, &timestamp)?;
    derive_csv_into(key, input, &output)?;
    Ok(output)
}

/// Build `<dir>/<stem>-recovery-<timestamp>.<ext>` from the input file name.
fn output_path(input: &Path, output_dir: &Path, timestamp: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::BadInput(format!("bad csv file name {}", input.display())))?;
    let name = match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}-recovery-{timestamp}.{ext}"),
        None => format!("{stem}-recovery-{timestamp}"),
    };
    Ok(output_dir.join(name))
}

/// Run the derivation into an exact output path, refusing to overwrite.
fn derive_csv_into(key: &ExtendedKey, input: &Path, output: &Path) -> Result<()> {
    if output.exists() {
        return Err(Error::BadInput(format!(
            "file {} already exists, please back it up and remove it",
            output.display()
        )));
    }
    let reader = File::open(input)?;
    let writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(output)?;
    process(key, reader, writer)?;
    info!(
        "Deriving keys from {} to {} completed",
        input.display(),
        output.display()
    );
    Ok(())
}

struct AddressRow<'a> {
    curve: &'a str,
    hd_path: &'a str,
    child_pubkey: &'a str,
}

fn process<R: Read, W: Write>(key: &ExtendedKey, input: R, output: W) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    let mut writer = csv::Writer::from_writer(output);

    let mut records = reader.records();
    let header = records
        .next()
        .ok_or_else(|| Error::InputShape("csv file is empty".into()))??;
    if header.get(0) != Some("wallet name") {
        return Err(Error::InputShape(
            "first line of the csv file is not the title row".into(),
        ));
    }
    let schema_version = if header.len() == 7 {
        0
    } else if header.len() == 8 && header.get(3) == Some("curve") {
        1
    } else {
        return Err(Error::InputShape("csv title row not recognized".into()));
    };

    let mut title: Vec<&str> = header.iter().collect();
    title.extend(["hex private key", "extended private key", "extended public key"]);
    writer.write_record(&title)?;

    for record in records {
        let record = record?;
        let column = |i: usize| {
            record
                .get(i)
                .ok_or_else(|| Error::InputShape(format!("csv row has {} columns", record.len())))
        };
        let row = match schema_version {
            0 => AddressRow {
                curve: "secp256k1",
                hd_path: column(5)?,
                child_pubkey: column(6)?,
            },
            _ => AddressRow {
                curve: column(3)?,
                hd_path: column(6)?,
                child_pubkey: column(7)?,
            },
        };

        let mut private_hex = String::new();
        let mut extended_private = String::new();
        let mut extended_public = String::new();
        if CurveKind::from_name(row.curve).ok() == Some(key.curve_kind()) {
            match super::recover::derive_path(key, row.hd_path) {
                Ok(derived) => {
                    if derived.is_private() {
                        private_hex = utils::encode(&derived.key_bytes());
                        extended_private = derived.b58_serialize();
                    }
                    extended_public = derived.public_key().b58_serialize();
                }
                Err(e) => {
                    error!("Derive error: {e}, HD path: {}", row.hd_path);
                }
            }
        }

        let claimed: String = row
            .child_pubkey
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if !claimed.is_empty() && !extended_public.is_empty() && claimed != extended_public {
            warn!(
                "Derived child public key mismatch, HD path: {}",
                row.hd_path
            );
        }

        let mut line: Vec<&str> = record.iter().collect();
        line.extend([
            private_hex.as_str(),
            extended_private.as_str(),
            extended_public.as_str(),
        ]);
        writer.write_record(&line)?;
    }
    writer.flush()?;
    Ok(())
}
