use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchVerifyError {
    #[error(transparent)]
    Bls(#[from] corebeam_bls::BlsError),
}
