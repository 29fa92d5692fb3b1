// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Offline recovery toolkit for a threshold-signature custody scheme.
//!
//! Each participant in a signing committee holds an encrypted secret share
//! of a root private key; the committee never assembles the key during
//! normal operation. When a quorum of recovery group files and their
//! passphrases are brought together, this crate:
//!
//! 1. parses and cross-validates the per-participant group records,
//! 2. optionally verifies the root public key and every participant's share
//!    public key without reconstructing the secret ([`recovery::verify`]),
//! 3. reconstructs the root private key via Lagrange interpolation over the
//!    curve's scalar field ([`recovery::recover`]),
//! 4. derives child extended keys along BIP32-style paths, including a
//!    non-hardened variant for Ed25519 ([`ckd`]), and
//! 5. optionally renders derived public keys as blockchain addresses
//!    ([`wallet`]).
//!
//! The crate is strictly single-threaded and synchronous: every operation
//! takes its inputs as parameters and returns fresh outputs, secrets live in
//! zero-on-drop buffers, and nothing is retried internally. Terminal
//! interaction (passphrase prompts) stays in the binary; the library
//! receives passphrases through callbacks.

pub mod cipher;
pub mod ckd;
pub mod curve;
pub mod edwards;
pub mod errors;
pub mod group;
pub mod recovery;
pub mod secp256k1;
pub mod tss;
pub mod utils;
pub mod wallet;

pub use ckd::ExtendedKey;
pub use curve::CurveKind;
pub use errors::{Error, Result};
