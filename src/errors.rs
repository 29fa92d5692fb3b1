//! Error types shared across the recovery toolkit.
//!
//! Every error is fatal to the command that produced it: the library never
//! retries and never recovers internally. The CLI prints the error to the log
//! stream and exits non-zero.

use thiserror::Error;

/// The default `Result` type used in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the recovery toolkit.
#[derive(Debug, Error)]
pub enum Error {
    /// File could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input did not match any accepted shape (JSON group file, CSV header,
    /// malformed derivation path segment and friends).
    #[error("unrecognized input: {0}")]
    InputShape(String),

    /// The requested group id is not present in the recovery files.
    #[error("group {0} not found in recovery group files")]
    GroupNotFound(String),

    /// A single group record violates a structural invariant.
    #[error("invalid group record: {0}")]
    StructuralInvariant(String),

    /// Two recovery group files that must describe the same group disagree.
    #[error("recovery group files mismatch: {0}")]
    CrossFileInvariant(String),

    /// AEAD authentication failed: wrong passphrase or tampered ciphertext.
    #[error("share decryption failed: wrong passphrase or corrupted ciphertext")]
    DecryptAuthFailed,

    /// The KDF record names a hash this implementation does not know.
    #[error("unsupported KDF hash identifier {0}")]
    UnknownKdfHash(u32),

    /// The group names a curve this implementation does not support.
    #[error("unsupported curve {0:?}")]
    UnsupportedCurve(String),

    /// The leading four bytes of a serialized extended key are not a known
    /// key version.
    #[error("unknown extended key version 0x{}", hex::encode(.0))]
    UnknownKeyVersion([u8; 4]),

    /// Bytes did not decode to a point on the expected curve.
    #[error("point is not on the curve")]
    PointNotOnCurve,

    /// A scalar encoding was too long or outside the scalar field.
    #[error("scalar out of range for the curve order")]
    ScalarOutOfRange,

    /// A derivation path could not be parsed.
    #[error("malformed derivation path: {0}")]
    MalformedPath(String),

    /// Hardened derivation was requested on an Ed25519 key.
    #[error("hardened child derivation is not supported for ed25519 keys")]
    HardenedChildForEd25519,

    /// Hardened derivation was requested from a public-only secp256k1 key.
    #[error("cannot derive a hardened child from a public key")]
    HardenedChildFromPublic,

    /// The BIP32 tweak was out of range or produced a zero child key.
    #[error("derived child key is invalid for this index, use the next one")]
    InvalidChildKey,

    /// Two shares carry the same abscissa.
    #[error("duplicate share id 0x{0}")]
    DuplicateShareId(String),

    /// Fewer shares were supplied than the group threshold requires.
    #[error("{got} shares provided but the group threshold is {want}")]
    ThresholdNotMet { want: usize, got: usize },

    /// The reconstructed root public key differs from the one stored in the
    /// group file.
    #[error("reconstructed root public key does not match the recovery group file")]
    ReconstructionMismatch,

    /// The public key derived from a decrypted share differs from the share
    /// public key stored in the group file.
    #[error("derived share public key does not match the share info")]
    SharePublicKeyMismatch,

    /// Base58 decoding or checksum verification failed.
    #[error("base58 decode failed: {0}")]
    Base58(String),

    /// Address encoding failed for the requested chain.
    #[error("address generation failed: {0}")]
    Address(String),

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The caller supplied arguments the toolkit cannot work with.
    #[error("{0}")]
    BadInput(String),
}
