use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SlashingError {
    #[error("attestation has no attesting indices")]
    EmptyAttestingIndices,
}
