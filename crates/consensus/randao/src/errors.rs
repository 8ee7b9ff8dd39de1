use thiserror::Error;

#[derive(Error, Debug)]
pub enum RandaoError {
    #[error("proposer reveal signature failed verification for epoch {epoch}")]
    InvalidReveal { epoch: u64 },

    #[error(transparent)]
    Bls(#[from] corebeam_bls::BlsError),
}
