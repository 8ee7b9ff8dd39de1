use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlsError {
    #[error("invalid public key bytes")]
    InvalidPublicKey,

    #[error("invalid signature bytes")]
    InvalidSignature,

    #[error("invalid private key bytes")]
    InvalidPrivateKey,

    #[error("expected {expected} bytes, got {len}")]
    InvalidByteLength { len: usize, expected: usize },

    #[error("invalid hex string")]
    InvalidHexString,

    #[error("batch verification entries and coefficients length mismatch: {entries} vs {coefficients}")]
    BatchLengthMismatch { entries: usize, coefficients: usize },

    #[error("cannot aggregate an empty slice")]
    EmptyAggregate,
}
