use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommitteeError {
    #[error("no active validators to assign committees from")]
    EmptyActiveSet,

    #[error("epoch {0} has not been computed yet")]
    EpochNotCached(u64),

    #[error("sync period {0} has not been computed yet")]
    SyncPeriodNotCached(u64),

    #[error("slot {slot} falls outside the cached epoch {epoch}")]
    SlotOutsideEpoch { slot: u64, epoch: u64 },

    #[error("committee index {index} out of range for {committees_per_slot} committees per slot")]
    CommitteeIndexOutOfRange { index: u64, committees_per_slot: u64 },

    #[error(transparent)]
    Shuffle(#[from] corebeam_shuffle::ShuffleError),
}
