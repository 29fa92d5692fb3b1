// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::errors::{Error, Result};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Encode bytes as lowercase hex with the `0x` prefix used throughout the
/// on-disk group records.
pub fn encode(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode a hex string, accepting an optional `0x`/`0X` prefix.
pub fn decode(s: &str) -> Result<Vec<u8>> {
    let stripped = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(stripped).map_err(|e| Error::InputShape(format!("invalid hex string: {e}")))
}

/// `RIPEMD160(SHA256(data))`, the hash used for extended key fingerprints.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    Ripemd160::digest(sha).into()
}

/// First four bytes of `SHA256(SHA256(data))`, the Base58Check checksum.
pub fn sha256d_checksum(data: &[u8]) -> [u8; 4] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut checksum = [0u8; 4];
    checksum.copy_from_slice(&second[..4]);
    checksum
}

/// Serde adaptor for byte fields carried as standard base64 strings in the
/// group file JSON.
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &[u8],
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// Returns an rng to be used for testing. The seed is printed to stderr
    /// so a failing run can be reproduced with [`init_testing_with_seed`].
    pub(crate) fn init_testing() -> StdRng {
        let seed: [u8; 32] = rand::rngs::OsRng.gen();
        eprintln!(
            "To re-run a failing test with the same randomness, use init_testing_with_seed() with:"
        );
        eprintln!("\t{seed:?}");
        StdRng::from_seed(seed)
    }

    /// A seeded version of [`init_testing`] for reproducing failures.
    #[allow(unused)]
    pub(crate) fn init_testing_with_seed(seed: [u8; 32]) -> StdRng {
        StdRng::from_seed(seed)
    }
}
