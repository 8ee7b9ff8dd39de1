use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("validator index {0} out of bounds")]
    UnknownValidator(u64),

    #[error("validator {0} is not active at epoch {1}")]
    NotActive(u64, u64),

    #[error("validator {0} has not been active long enough to exit voluntarily")]
    TooYoungToExit(u64),

    #[error("validator {0} is already exiting")]
    AlreadyExiting(u64),
}
