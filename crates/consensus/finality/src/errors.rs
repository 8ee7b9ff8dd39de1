use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FinalityError {
    #[error("slot {0} already finalized")]
    SlotAlreadyFinalized(u64),

    #[error("execution is not valid for the proposed block")]
    InvalidExecution,

    #[error("no round open for slot {0}")]
    UnknownRound(u64),

    #[error("validator {0} already voted in this round")]
    DuplicateVote(u64),

    #[error("min_participation must be in (0, 1]")]
    InvalidParticipation,

    #[error("supermajority percentage must be in (0, 100]")]
    InvalidPercentage,
}
