use alloy_primitives::B256;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ForkChoiceError {
    #[error("block {0} already present")]
    DuplicateBlock(B256),

    #[error("parent {0} not found")]
    UnknownParent(B256),

    #[error("block {0} not found")]
    UnknownBlock(B256),

    #[error("empty store has no head")]
    EmptyStore,

    #[error("stale attestation from validator {validator}: target epoch {target_epoch} <= existing {existing_epoch}")]
    StaleAttestation { validator: u64, target_epoch: u64, existing_epoch: u64 },

    #[error("slot regression: new slot {new_slot} <= current slot {current_slot}")]
    SlotRegression { new_slot: u64, current_slot: u64 },
}
