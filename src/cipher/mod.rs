// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Passphrase-based share encryption: PBKDF2 key stretching and AES-256-GCM
//! authenticated encryption.

mod aes_gcm;
mod kdf;

pub use aes_gcm::Aes256Gcm;
pub use kdf::{Kdf, HASH_SHA256, HASH_SHA512};
