use corebeam_primitives::constants::{
    EPOCHS_PER_SYNC_PERIOD, MAX_COMMITTEES_PER_SLOT, MAX_EFFECTIVE_BALANCE, SLOTS_PER_EPOCH,
    SYNC_COMMITTEE_SIZE, TARGET_COMMITTEE_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitteeConfig {
    pub slots_per_epoch: u64,
    pub target_committee_size: u64,
    pub max_committees_per_slot: u64,
    pub sync_committee_size: u64,
    pub epochs_per_sync_period: u64,
    pub max_effective_balance: u64,
}

impl Default for CommitteeConfig {
    fn default() -> Self {
        Self {
            slots_per_epoch: SLOTS_PER_EPOCH,
            target_committee_size: TARGET_COMMITTEE_SIZE,
            max_committees_per_slot: MAX_COMMITTEES_PER_SLOT,
            sync_committee_size: SYNC_COMMITTEE_SIZE,
            epochs_per_sync_period: EPOCHS_PER_SYNC_PERIOD,
            max_effective_balance: MAX_EFFECTIVE_BALANCE,
        }
    }
}
