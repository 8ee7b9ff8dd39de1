use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    ForkChoice(#[from] corebeam_fork_choice::ForkChoiceError),

    #[error(transparent)]
    Finality(#[from] corebeam_finality::FinalityError),

    #[error(transparent)]
    Registry(#[from] corebeam_registry::RegistryError),

    #[error(transparent)]
    Committee(#[from] corebeam_committee::CommitteeError),

    #[error(transparent)]
    Randao(#[from] corebeam_randao::RandaoError),

    #[error(transparent)]
    BatchVerify(#[from] corebeam_batch_verify::BatchVerifyError),
}
